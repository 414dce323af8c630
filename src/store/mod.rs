// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Conditions stores: where calibration payloads are read from and written
//! to, each tagged with an interval of validity.
//!
//! A store only stores. Working out which interval a new payload should be
//! tagged with is the caller's job.

mod error;
mod local;
mod memory;

pub use error::StoreError;
pub use local::{LocalDatabase, DATABASE_INDEX_FILENAME};
pub use memory::MemoryStore;

use std::borrow::Cow;

use crate::{
    iov::{ExpRun, Iov},
    label::Subsystem,
    payloads::Payload,
};

pub trait ConditionsStore {
    /// Get the payload of `subsystem` valid for the given event, along with
    /// the interval it is in effect for. That interval is the stored one
    /// less anything shadowed by payloads stored later, so payloads returned
    /// for different runs never have overlapping intervals. Stores that keep
    /// payloads in memory may
    /// hand out a borrow; callers that want to modify the payload must clone
    /// it.
    fn get_payload(
        &self,
        subsystem: Subsystem,
        exp_run: ExpRun,
        event: u32,
    ) -> Result<Option<(Cow<'_, Payload>, Iov)>, StoreError>;

    /// Store a payload, valid for `iov`.
    fn put_payload(&mut self, payload: Payload, iov: Iov) -> Result<(), StoreError>;
}
