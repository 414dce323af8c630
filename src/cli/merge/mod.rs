// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Run the global fit and merge its corrections into a conditions database.


use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;

use super::common::{
    display_warnings, get_all_matches_from_glob, InfoPrinter, Warn, ARG_FILE_HELP,
};
use crate::{
    algorithm::{AcceptanceGate, MillepedeAlgorithm, Verdict},
    constants::{DEFAULT_MAX_CHI2_PER_NDF, DEFAULT_MAX_PULL, DEFAULT_PEDE_METHOD},
    fit::{GlobalFit, PedeExecutable, PedeResultFiles, Steering},
    iov::{ExpRun, IovParseError},
    label::Subsystem,
    store::LocalDatabase,
    MillecalError,
};

const DEFAULT_DATABASE_DIR: &str = "localdb";
const DEFAULT_PEDE_BINARY: &str = "pede";
const DEFAULT_WORK_DIR: &str = "pede_work";

lazy_static::lazy_static! {
    static ref DATABASE_HELP: String =
        format!("The local conditions database directory to read payloads from and write corrected payloads to. It is created if it doesn't exist. Default: {DEFAULT_DATABASE_DIR}");

    static ref PEDE_HELP: String =
        format!("The pede executable to run. Default: {DEFAULT_PEDE_BINARY}");

    static ref WORK_DIR_HELP: String =
        format!("The directory pede is run in. Default: {DEFAULT_WORK_DIR}");

    static ref METHOD_HELP: String =
        format!("The pede solution method. Default: '{DEFAULT_PEDE_METHOD}'");

    static ref MAX_CHI2_HELP: String =
        format!("Another iteration is requested if chi2/ndf of the pulls is at least this. Default: {DEFAULT_MAX_CHI2_PER_NDF}");

    static ref MAX_PULL_HELP: String =
        format!("Another iteration is requested if any |pull| is greater than this. Default: {DEFAULT_MAX_PULL}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct MergeArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    #[serde(skip)]
    args_file: Option<PathBuf>,

    /// Glob patterns of the binary derivative files to fit.
    #[clap(short, long, multiple_values(true), help_heading = "INPUT FILES")]
    input: Option<Vec<String>>,

    /// Millepede constraint files to use in the fit.
    #[clap(short, long, multiple_values(true), help_heading = "INPUT FILES")]
    constraints: Option<Vec<PathBuf>>,

    /// The experiment/run pairs in the input data, e.g. "12,345".
    #[clap(short, long, multiple_values(true), help_heading = "INPUT FILES")]
    runs: Option<Vec<String>>,

    #[clap(short, long, help = DATABASE_HELP.as_str(), help_heading = "CONDITIONS")]
    database: Option<PathBuf>,

    /// Use an existing pede result file instead of running pede.
    #[clap(long, help_heading = "PEDE")]
    results: Option<PathBuf>,

    /// The pede exit-status file to use with --results. Default: millepede.end
    /// next to the result file.
    #[clap(long, requires = "results", help_heading = "PEDE")]
    end: Option<PathBuf>,

    #[clap(long, help = PEDE_HELP.as_str(), help_heading = "PEDE")]
    pede: Option<PathBuf>,

    #[clap(long, help = WORK_DIR_HELP.as_str(), help_heading = "PEDE")]
    work_dir: Option<PathBuf>,

    #[clap(long, help = METHOD_HELP.as_str(), help_heading = "PEDE")]
    method: Option<String>,

    /// Subtract the fitted corrections from the payloads instead of adding
    /// them.
    #[clap(long, help_heading = "MERGING")]
    #[serde(default)]
    invert_sign: bool,

    #[clap(long, help = MAX_CHI2_HELP.as_str(), help_heading = "MERGING")]
    max_chi2_per_ndf: Option<f64>,

    #[clap(long, help = MAX_PULL_HELP.as_str(), help_heading = "MERGING")]
    max_pull: Option<f64>,
}

/// Where the fit result comes from.
#[derive(Debug)]
enum FitSource {
    Existing(PedeResultFiles),
    Run(PedeExecutable),
}

#[derive(Debug)]
pub(super) struct MergeParams {
    steering: Steering,
    runs: Vec<ExpRun>,
    database: PathBuf,
    fit: FitSource,
    algorithm: MillepedeAlgorithm,
}

impl MergeArgs {
    /// Consolidate the command-line arguments with those of the arguments
    /// file, preferring the command line.
    pub(super) fn merge(self) -> Result<MergeArgs, MillecalError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;
        let arg_file = match cli_args.args_file {
            Some(f) => f,
            None => return Ok(cli_args),
        };
        let file_args: MergeArgs = unpack_arg_file!(arg_file);

        Ok(MergeArgs {
            args_file: None,
            input: cli_args.input.or(file_args.input),
            constraints: cli_args.constraints.or(file_args.constraints),
            runs: cli_args.runs.or(file_args.runs),
            database: cli_args.database.or(file_args.database),
            results: cli_args.results.or(file_args.results),
            end: cli_args.end.or(file_args.end),
            pede: cli_args.pede.or(file_args.pede),
            work_dir: cli_args.work_dir.or(file_args.work_dir),
            method: cli_args.method.or(file_args.method),
            invert_sign: cli_args.invert_sign || file_args.invert_sign,
            max_chi2_per_ndf: cli_args.max_chi2_per_ndf.or(file_args.max_chi2_per_ndf),
            max_pull: cli_args.max_pull.or(file_args.max_pull),
        })
    }

    fn parse(self) -> Result<MergeParams, MillecalError> {
        debug!("{:#?}", self);

        let MergeArgs {
            args_file: _,
            input,
            constraints,
            runs,
            database,
            results,
            end,
            pede,
            work_dir,
            method,
            invert_sign,
            max_chi2_per_ndf,
            max_pull,
        } = self;

        let mut files = vec![];
        for pattern in input.unwrap_or_default() {
            files.extend(get_all_matches_from_glob(&pattern)?);
        }
        // Files matched by more than one pattern are only fitted once.
        let files: Vec<PathBuf> = files.into_iter().unique().collect();

        let constraint_files = constraints.unwrap_or_default();
        for c in &constraint_files {
            if !c.exists() {
                return Err(MergeArgsError::ConstraintFileMissing(c.clone()).into());
            }
        }

        let mut runs = runs
            .unwrap_or_default()
            .iter()
            .map(|r| r.parse())
            .collect::<Result<Vec<ExpRun>, IovParseError>>()?;
        runs.sort_unstable();
        runs.dedup();

        let gate = AcceptanceGate {
            max_chi2_per_ndf: max_chi2_per_ndf.unwrap_or(DEFAULT_MAX_CHI2_PER_NDF),
            max_pull: max_pull.unwrap_or(DEFAULT_MAX_PULL),
        };
        for (name, value) in [
            ("--max-chi2-per-ndf", gate.max_chi2_per_ndf),
            ("--max-pull", gate.max_pull),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(MergeArgsError::BadThreshold { name, value }.into());
            }
        }

        let fit = match results {
            Some(res) => {
                if pede.is_some() || work_dir.is_some() || method.is_some() {
                    "pede isn't run when --results is given; ignoring pede options".warn();
                }
                FitSource::Existing(PedeResultFiles { res, end })
            }
            None => FitSource::Run(PedeExecutable {
                binary: pede.unwrap_or_else(|| PathBuf::from(DEFAULT_PEDE_BINARY)),
                work_dir: work_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_WORK_DIR)),
            }),
        };

        let mut steering = Steering::new(files);
        steering.constraint_files = constraint_files;
        if let Some(m) = method {
            steering.method = m;
        }
        let algorithm = MillepedeAlgorithm { invert_sign, gate };
        let database = database.unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_DIR));

        let mut printer = InfoPrinter::new("Merge set up".into());
        printer.push_block(vec![
            format!("{} input files", steering.files.len()).into(),
            format!("{} constraint files", steering.constraint_files.len()).into(),
        ]);
        printer.push_line(
            format!(
                "Runs: {}",
                if runs.is_empty() {
                    "none".to_string()
                } else {
                    runs.iter().map(|r| format!("({r})")).join(" ")
                }
            )
            .into(),
        );
        printer.push_line(match &fit {
            FitSource::Existing(f) => format!("Using pede results {}", f.res.display()).into(),
            FitSource::Run(p) => format!(
                "Running {} in {} ({})",
                p.binary.display(),
                p.work_dir.display(),
                steering.method
            )
            .into(),
        });
        printer.push_block(vec![
            format!("Database: {}", database.display()).into(),
            format!(
                "Corrections are {}",
                if invert_sign { "subtracted" } else { "added" }
            )
            .into(),
            format!(
                "Iterate if chi2/ndf >= {} or |pull| > {}",
                gate.max_chi2_per_ndf, gate.max_pull
            )
            .into(),
        ]);
        printer.display();
        display_warnings();

        Ok(MergeParams {
            steering,
            runs,
            database,
            fit,
            algorithm,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<Option<Verdict>, MillecalError> {
        debug!("Converting arguments into parameters");
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(None);
        }

        params.run().map(Some)
    }
}

impl MergeParams {
    fn run(self) -> Result<Verdict, MillecalError> {
        let MergeParams {
            steering,
            runs,
            database,
            mut fit,
            algorithm,
        } = self;

        let mut db = LocalDatabase::open(database)?;
        let fit: &mut dyn GlobalFit = match &mut fit {
            FitSource::Existing(f) => f,
            FitSource::Run(f) => f,
        };
        let outcome = algorithm.calibrate(&steering, runs.as_slice(), fit, &mut db)?;

        let mut printer = InfoPrinter::new(format!("Verdict: {}", outcome.verdict).into());
        if let Some(summary) = &outcome.summary {
            let mut block = vec![format!("{} determined parameters", summary.n()).into()];
            if let Some(c) = summary.chi2_per_ndf() {
                block.push(format!("chi2/ndf = {c:.4}").into());
            }
            if let Some(m) = summary.max_pull() {
                block.push(
                    format!("largest |pull| = {:.4} (label {})", m.pull.abs(), m.label).into(),
                );
            }
            printer.push_block(block);
            printer.push_block(
                Subsystem::iter()
                    .map(|s| format!("{s}: {} parameters", summary.count(s)).into())
                    .collect(),
            );
        }
        if !outcome.written.is_empty() {
            printer.push_block(
                outcome
                    .written
                    .iter()
                    .map(|(s, iov)| format!("Wrote {} for {iov}", s.payload_name()).into())
                    .collect(),
            );
        }
        printer.display();

        Ok(outcome.verdict)
    }
}

#[derive(Error, Debug)]
pub(super) enum MergeArgsError {
    #[error("Constraint file {0} doesn't exist")]
    ConstraintFileMissing(PathBuf),

    #[error("{name} must be a positive number, but got {value}")]
    BadThreshold { name: &'static str, value: f64 },
}
