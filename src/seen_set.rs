// Copyright (C) 2025 The Asyncrawler Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashSet;

use crate::transaction::Transaction;

/// Dedup of requests already queued for processing in this run.
///
/// Only fingerprints are retained, never the original Transactions — for
/// large crawls that would waste memory holding bodies and headers for
/// every URL ever seen when all that's needed is "have I queued this?".
/// Mutated and read only by the `ScrapeWorker`, so no lock is required.
#[derive(Debug, Default)]
pub struct SeenSet {
    fingerprints: HashSet<u128>,
}

impl SeenSet {
    pub fn new() -> Self {
        SeenSet { fingerprints: HashSet::new() }
    }

    pub fn contains(&self, txn: &Transaction) -> bool {
        self.fingerprints.contains(&txn.fingerprint())
    }

    /// Returns `true` if this is the first time `txn` has been marked
    /// seen (i.e. it was newly inserted).
    pub fn insert(&mut self, txn: &Transaction) -> bool {
        self.fingerprints.insert(txn.fingerprint())
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }
}
