// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::borrow::Cow;

use super::{ConditionsStore, StoreError};
use crate::{
    iov::{ExpRun, Iov},
    label::Subsystem,
    payloads::Payload,
};

/// A store that lives in memory. Payloads added later shadow earlier ones
/// where their intervals overlap, and the interval handed out with a payload
/// is the part of it that isn't shadowed.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Vec<(Payload, Iov)>,
    written: Vec<(Payload, Iov)>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Add a payload without counting it as a write.
    pub fn insert(&mut self, payload: Payload, iov: Iov) {
        self.entries.push((payload, iov));
    }

    pub fn entries(&self) -> &[(Payload, Iov)] {
        &self.entries
    }

    /// The payloads stored by `put_payload`, oldest first.
    pub fn written(&self) -> &[(Payload, Iov)] {
        &self.written
    }

    pub fn num_writes(&self) -> usize {
        self.written.len()
    }
}

impl ConditionsStore for MemoryStore {
    fn get_payload(
        &self,
        subsystem: Subsystem,
        exp_run: ExpRun,
        _event: u32,
    ) -> Result<Option<(Cow<'_, Payload>, Iov)>, StoreError> {
        let i = match self
            .entries
            .iter()
            .rposition(|(p, iov)| p.subsystem() == subsystem && iov.contains(exp_run))
        {
            Some(i) => i,
            None => return Ok(None),
        };
        let (payload, iov) = &self.entries[i];
        let later = self.entries[i + 1..]
            .iter()
            .filter(|(p, _)| p.subsystem() == subsystem)
            .map(|(_, iov)| *iov);
        Ok(Some((Cow::Borrowed(payload), iov.effective(later, exp_run))))
    }

    fn put_payload(&mut self, payload: Payload, iov: Iov) -> Result<(), StoreError> {
        self.entries.push((payload.clone(), iov));
        self.written.push((payload, iov));
        Ok(())
    }
}
