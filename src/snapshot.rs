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

//! Resumable-crawl queue snapshots, stored under a reserved key in the
//! same persistent store used for cached responses.

use serde::{Deserialize, Serialize};

use crate::queue::TransactionQueue;
use crate::store::{PersistentStore, SNAPSHOT_KEY};
use crate::transaction::Transaction;

#[derive(Serialize, Deserialize)]
struct QueueSnapshot {
    downloads: Vec<Transaction>,
    scrapes: Vec<Transaction>,
}

/// Drains `download` and `scrape` into the store under `SNAPSHOT_KEY`. The
/// cache queue is deliberately not snapshotted — any Transaction pending
/// there is either freshly downloaded (and will be persisted by the cache
/// worker regardless) or a cache hit already durable in the store.
pub fn save_queue(store: &mut PersistentStore, download: &[Transaction], scrape: &[Transaction]) -> crate::error::Result<()> {
    let snapshot = QueueSnapshot { downloads: download.to_vec(), scrapes: scrape.to_vec() };
    store.put(SNAPSHOT_KEY, &snapshot)
}

pub fn clear_queue(store: &mut PersistentStore) -> crate::error::Result<()> {
    store.del(SNAPSHOT_KEY)
}

/// Restores a previously saved snapshot into `download` and `scrape`,
/// returning `true` if anything was restored. A missing or unreadable
/// snapshot is treated as "nothing to resume", not an error.
pub async fn load_queue(store: &mut PersistentStore, download: &TransactionQueue, scrape: &TransactionQueue) -> bool {
    let Ok(snapshot) = store.get::<QueueSnapshot>(SNAPSHOT_KEY) else {
        return false;
    };
    let restored = snapshot.downloads.len() + snapshot.scrapes.len();
    for txn in snapshot.downloads {
        download.push(txn).await;
    }
    for txn in snapshot.scrapes {
        scrape.push(txn).await;
    }
    restored > 0
}
