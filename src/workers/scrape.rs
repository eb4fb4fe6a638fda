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

//! Invokes user callbacks for completed Transactions and dedupes
//! children against the run's `SeenSet`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::callback::CallbackRegistry;
use crate::queue::{crawl_complete, TransactionQueue, IDLE_POLL};
use crate::seen_set::SeenSet;

/// Runs until shutdown, returning the accumulated `SeenSet` so the
/// orchestrator can inspect it (mainly for tests and diagnostics).
pub async fn run(
    download: TransactionQueue,
    cache: TransactionQueue,
    scrape: TransactionQueue,
    callbacks: CallbackRegistry,
    mut seen: SeenSet,
    running: Arc<AtomicBool>,
) -> SeenSet {
    debug!("start scrape");
    loop {
        if scrape.is_empty().await {
            if !running.load(Ordering::SeqCst) || crawl_complete(&download, &cache, &scrape).await {
                break;
            }
            tokio::time::sleep(IDLE_POLL).await;
            continue;
        }

        let txn = scrape.pop().await;
        // Every Transaction reaching this worker is marked seen here,
        // regardless of whether it arrived via a fresh fetch or a cache
        // hit (see the seen-set population note).
        seen.insert(&txn);

        if let Some(name) = txn.callback_name.clone() {
            match callbacks.get(&name) {
                Some(cb) => {
                    let txn_for_cb = txn.clone();
                    let children = match tokio::task::spawn_blocking(move || cb(&txn_for_cb)).await {
                        Ok(children) => children,
                        Err(e) => {
                            warn!("callback '{}' panicked for {}: {}", name, txn.url, e);
                            Vec::new()
                        }
                    };
                    for child in children {
                        if seen.insert(&child) {
                            cache.push(child).await;
                        }
                    }
                }
                None => warn!("no callback registered for '{}': {}", name, txn.url),
            }
        }
        scrape.task_done();
    }
    debug!("done scrape");
    seen
}
