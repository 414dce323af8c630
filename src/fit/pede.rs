// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Talking to pede, the Millepede II solver.
//!
//! pede is driven by a steering file and leaves two files in its working
//! directory: `millepede.res`, with one line per global parameter, and
//! `millepede.end`, whose first token is an exit code.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, info, trace, warn};

use super::{FitError, FitResult, GlobalFit, ParameterResult};
use crate::constants::{DEFAULT_PEDE_METHOD, PEDE_MAX_SUCCESS_EXIT_CODE};

pub const PEDE_RESULT_FILENAME: &str = "millepede.res";
pub const PEDE_END_FILENAME: &str = "millepede.end";
pub const PEDE_STEERING_FILENAME: &str = "steer.txt";
const PEDE_LOG_FILENAME: &str = "pede.log";

/// The contents of a pede steering file.
#[derive(Debug, Clone, PartialEq)]
pub struct Steering {
    /// Binary files of local/global derivatives.
    pub files: Vec<PathBuf>,

    /// Text files of linear constraints.
    pub constraint_files: Vec<PathBuf>,

    /// The solution method, e.g. "inversion 3 0.1".
    pub method: String,

    /// Any other steering commands, written verbatim.
    pub commands: Vec<String>,
}

impl Steering {
    pub fn new(files: Vec<PathBuf>) -> Steering {
        Steering {
            files,
            constraint_files: vec![],
            method: DEFAULT_PEDE_METHOD.to_string(),
            commands: vec![],
        }
    }

    pub fn write<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "Cfiles")?;
        for f in self.files.iter().chain(self.constraint_files.iter()) {
            writeln!(w, "{}", f.display())?;
        }
        writeln!(w)?;
        writeln!(w, "method {}", self.method)?;
        for c in &self.commands {
            writeln!(w, "{c}")?;
        }
        writeln!(w, "end")?;
        Ok(())
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, file: P) -> std::io::Result<()> {
        let mut w = BufWriter::new(File::create(file)?);
        self.write(&mut w)?;
        w.flush()
    }

    /// A copy with every relative path made absolute against `base`.
    fn with_absolute_paths(&self, base: &Path) -> Steering {
        let abs = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                base.join(p)
            }
        };
        Steering {
            files: self.files.iter().map(abs).collect(),
            constraint_files: self.constraint_files.iter().map(abs).collect(),
            method: self.method.clone(),
            commands: self.commands.clone(),
        }
    }
}

/// Read a `millepede.res` file.
///
/// After the header, each line is `label value presigma [differ error ...]`.
/// A parameter is determined when it has a finite, positive error and it
/// wasn't fixed (fixed parameters have a negative presigma).
pub fn read_results<P: AsRef<Path>>(file: P) -> Result<Vec<ParameterResult>, FitError> {
    let file = file.as_ref();
    let reader = BufReader::new(File::open(file)?);
    let mut results = vec![];
    let mut seen_header = false;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !seen_header {
            if !trimmed.starts_with("Parameter") {
                return Err(FitError::MissingResultHeader {
                    file: file.to_path_buf(),
                });
            }
            seen_header = true;
            continue;
        }

        let bad = || FitError::BadResultLine {
            file: file.to_path_buf(),
            line_num: i + 1,
            line: line.clone(),
        };
        let mut columns = trimmed.split_whitespace();
        let label: i64 = columns.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
        let floats = columns
            .map(|c| c.parse::<f64>().map_err(|_| bad()))
            .collect::<Result<Vec<_>, _>>()?;
        let (correction, presigma) = match floats[..] {
            [v, p, ..] => (v, p),
            _ => return Err(bad()),
        };
        let error = floats.get(3).copied();
        let determined =
            presigma >= 0.0 && matches!(error, Some(e) if e.is_finite() && e > 0.0);

        results.push(ParameterResult {
            label,
            determined,
            correction,
            error: error.unwrap_or(0.0),
        });
    }

    if !seen_header {
        return Err(FitError::MissingResultHeader {
            file: file.to_path_buf(),
        });
    }
    debug!("Read {} parameters from {}", results.len(), file.display());
    Ok(results)
}

/// Read the exit code out of a `millepede.end` file. A missing file gives
/// `None`.
pub fn read_exit_code<P: AsRef<Path>>(file: P) -> Result<Option<i32>, FitError> {
    let file = file.as_ref();
    if !file.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(file)?;
    let first = contents.split_whitespace().next().unwrap_or_default();
    let code = first.parse().map_err(|_| FitError::BadExitCode {
        file: file.to_path_buf(),
        got: first.to_string(),
    })?;
    trace!("pede exit code from {}: {code}", file.display());
    Ok(Some(code))
}

fn exit_code_is_success(code: Option<i32>) -> bool {
    matches!(code, Some(c) if c <= PEDE_MAX_SUCCESS_EXIT_CODE)
}

fn read_outputs(res: &Path, end: &Path) -> Result<FitResult, FitError> {
    let code = read_exit_code(end)?;
    if !exit_code_is_success(code) {
        match code {
            Some(c) => warn!("pede finished with exit code {c}"),
            None => warn!("No pede exit status at {}", end.display()),
        }
        return Ok(FitResult::failed());
    }
    Ok(FitResult {
        success: true,
        parameters: read_results(res)?,
    })
}

/// A fit that has already been done; its outputs are read from disk.
#[derive(Debug, Clone)]
pub struct PedeResultFiles {
    pub res: PathBuf,

    /// If not given, `millepede.end` next to the result file is used.
    pub end: Option<PathBuf>,
}

impl PedeResultFiles {
    fn end_file(&self) -> PathBuf {
        self.end
            .clone()
            .unwrap_or_else(|| self.res.with_file_name(PEDE_END_FILENAME))
    }
}

impl GlobalFit for PedeResultFiles {
    fn fit(&mut self, _steering: &Steering) -> Result<FitResult, FitError> {
        info!("Using existing pede results in {}", self.res.display());
        read_outputs(&self.res, &self.end_file())
    }
}

/// Runs a pede executable in a working directory.
#[derive(Debug, Clone)]
pub struct PedeExecutable {
    pub binary: PathBuf,
    pub work_dir: PathBuf,
}

impl GlobalFit for PedeExecutable {
    fn fit(&mut self, steering: &Steering) -> Result<FitResult, FitError> {
        std::fs::create_dir_all(&self.work_dir)?;
        // pede runs inside the working directory.
        let steering = steering.with_absolute_paths(&std::env::current_dir()?);
        let steer_file = self.work_dir.join(PEDE_STEERING_FILENAME);
        steering.write_to_file(&steer_file)?;

        // Remove the outputs of any previous run.
        for f in [PEDE_RESULT_FILENAME, PEDE_END_FILENAME] {
            let f = self.work_dir.join(f);
            if f.exists() {
                std::fs::remove_file(f)?;
            }
        }

        info!(
            "Running {} in {}",
            self.binary.display(),
            self.work_dir.display()
        );
        let log = File::create(self.work_dir.join(PEDE_LOG_FILENAME))?;
        let status = Command::new(&self.binary)
            .arg(PEDE_STEERING_FILENAME)
            .current_dir(&self.work_dir)
            .stdout(log.try_clone()?)
            .stderr(log)
            .status()
            .map_err(|err| FitError::Spawn {
                binary: self.binary.clone(),
                err,
            })?;
        debug!("pede process finished: {status}");

        read_outputs(
            &self.work_dir.join(PEDE_RESULT_FILENAME),
            &self.work_dir.join(PEDE_END_FILENAME),
        )
    }
}
