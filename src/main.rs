// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::Parser;

use millecal::{Millecal, MillecalError, Verdict};

/// The calibration should be run again with the new payloads.
const ITERATE_EXIT_CODE: i32 = 2;

fn main() {
    // We don't return Result from main because it prints the debug
    // representation of the error. The code below prints the "display" or
    // human readable representation of the error.
    let code = match try_main() {
        Ok(None | Some(Verdict::Accept)) => 0,
        Ok(Some(Verdict::Iterate)) => ITERATE_EXIT_CODE,
        Ok(Some(Verdict::Failure(_))) => 1,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };
    std::process::exit(code);
}

fn try_main() -> Result<Option<Verdict>, MillecalError> {
    Millecal::parse().run()
}
