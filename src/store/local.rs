// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A conditions store kept in a local directory.
//!
//! The directory contains an index file, `database.txt`, with one line per
//! stored payload revision:
//!
//! ```text
//! VXDAlignment 3 12,0,12,-1
//! ```
//!
//! and one JSON file per revision, e.g. `VXDAlignment_rev_3.json`. When
//! several lines match a query, the last one wins. Lines starting with '#'
//! are comments.

use std::{
    borrow::Cow,
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use log::{debug, trace};

use super::{ConditionsStore, StoreError};
use crate::{
    iov::{ExpRun, Iov},
    label::Subsystem,
    payloads::Payload,
};

pub const DATABASE_INDEX_FILENAME: &str = "database.txt";

#[derive(Debug, Clone, PartialEq)]
struct IndexEntry {
    name: String,
    revision: u32,
    iov: Iov,
}

pub struct LocalDatabase {
    dir: PathBuf,
    index: Vec<IndexEntry>,
}

impl LocalDatabase {
    /// Open the database in `dir`, creating the directory if necessary.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<LocalDatabase, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let index_file = dir.join(DATABASE_INDEX_FILENAME);
        let index = if index_file.exists() {
            read_index(&index_file)?
        } else {
            vec![]
        };
        debug!(
            "Opened local database {} with {} payload revisions",
            dir.display(),
            index.len()
        );
        Ok(LocalDatabase { dir, index })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn payload_file(&self, name: &str, revision: u32) -> PathBuf {
        self.dir.join(format!("{name}_rev_{revision}.json"))
    }

    /// The (revision, IOV) pairs stored for a payload name, oldest first.
    pub fn revisions(&self, name: &str) -> Vec<(u32, Iov)> {
        self.index
            .iter()
            .filter(|e| e.name == name)
            .map(|e| (e.revision, e.iov))
            .collect()
    }
}

impl ConditionsStore for LocalDatabase {
    fn get_payload(
        &self,
        subsystem: Subsystem,
        exp_run: ExpRun,
        _event: u32,
    ) -> Result<Option<(Cow<'_, Payload>, Iov)>, StoreError> {
        let name = subsystem.payload_name();
        let i = match self
            .index
            .iter()
            .rposition(|e| e.name == name && e.iov.contains(exp_run))
        {
            Some(i) => i,
            None => return Ok(None),
        };
        let entry = &self.index[i];
        let later = self.index[i + 1..]
            .iter()
            .filter(|e| e.name == name)
            .map(|e| e.iov);
        let iov = entry.iov.effective(later, exp_run);

        let file = self.payload_file(name, entry.revision);
        trace!("Reading {} for run {exp_run}", file.display());
        let contents = fs::read_to_string(&file)?;
        let payload = Payload::from_json(subsystem, &contents)
            .map_err(|err| StoreError::BadPayloadFile { file, err })?;
        Ok(Some((Cow::Owned(payload), iov)))
    }

    fn put_payload(&mut self, payload: Payload, iov: Iov) -> Result<(), StoreError> {
        let name = payload.subsystem().payload_name();
        let revision = self
            .index
            .iter()
            .filter(|e| e.name == name)
            .map(|e| e.revision)
            .max()
            .unwrap_or(0)
            + 1;

        let file = self.payload_file(name, revision);
        fs::write(&file, payload.to_json()?)?;

        let mut index = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(DATABASE_INDEX_FILENAME))?;
        writeln!(index, "{name} {revision} {iov}")?;
        debug!("Wrote {} valid for {iov}", file.display());

        self.index.push(IndexEntry {
            name: name.to_string(),
            revision,
            iov,
        });
        Ok(())
    }
}

fn read_index(file: &Path) -> Result<Vec<IndexEntry>, StoreError> {
    let mut index = vec![];
    let reader = BufReader::new(File::open(file)?);
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let bad = || StoreError::BadIndexLine {
            file: file.to_path_buf(),
            line_num: i + 1,
            line: line.clone(),
        };
        let mut split = trimmed.split_whitespace();
        let (name, revision, iov) = match (split.next(), split.next(), split.next(), split.next())
        {
            (Some(n), Some(r), Some(i), None) => (n, r, i),
            _ => return Err(bad()),
        };
        index.push(IndexEntry {
            name: name.to_string(),
            revision: revision.parse().map_err(|_| bad())?,
            iov: iov.parse().map_err(|_| bad())?,
        });
    }
    Ok(index)
}
