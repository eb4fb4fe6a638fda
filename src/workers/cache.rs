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

//! Mediates between the cache queue and the persistent store. The sole
//! writer of the store, so it owns the store outright rather than sharing
//! it behind a lock; every blocking SQLite call is dispatched onto the
//! runtime's blocking pool and the store handed back afterward.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::queue::{crawl_complete, TransactionQueue, IDLE_POLL};
use crate::store::PersistentStore;
use crate::transaction::Transaction;

/// Runs `f` against `store` on the blocking pool, returning both the
/// store (moved back) and `f`'s result.
async fn blocking<F, T>(store: PersistentStore, f: F) -> (PersistentStore, T)
where
    F: FnOnce(&mut PersistentStore) -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut store = store;
        let result = f(&mut store);
        (store, result)
    })
    .await
    .expect("cache worker blocking task panicked")
}

/// Runs until shutdown, returning the store so the orchestrator can
/// snapshot or flush it afterward.
pub async fn run(
    mut store: PersistentStore,
    download: TransactionQueue,
    cache: TransactionQueue,
    scrape: TransactionQueue,
    running: Arc<AtomicBool>,
) -> PersistentStore {
    debug!("start cache");
    loop {
        if cache.is_empty().await {
            if !running.load(Ordering::SeqCst) || crawl_complete(&download, &cache, &scrape).await {
                break;
            }
            tokio::time::sleep(IDLE_POLL).await;
            continue;
        }

        let txn = cache.pop().await;
        let key = txn.fingerprint().to_string();

        if txn.made() {
            debug!("save cache: {}", txn.url);
            let to_store = txn.clone();
            let put_key = key.clone();
            let (s, result) = blocking(store, move |s| s.put(&put_key, &to_store)).await;
            store = s;
            if let Err(e) = result {
                error!("cache write error for {}: {}", txn.url, e);
            }
        } else {
            let lookup_key = key.clone();
            let (s, cached) = blocking(store, move |s| {
                if s.contains(&lookup_key).unwrap_or(false) {
                    s.get::<Transaction>(&lookup_key).ok()
                } else {
                    None
                }
            })
            .await;
            store = s;

            match cached {
                Some(mut cached) => {
                    cached.merge(&txn);
                    if !cached.made() || cached.is_error() {
                        debug!("revalidating: {}", cached.url);
                        cached.num_errors = 0;
                        download.push(cached).await;
                    } else {
                        info!("cache hit: {}", cached.url);
                        scrape.push(cached).await;
                    }
                }
                None => {
                    debug!("cache miss: {}", txn.url);
                    download.push(txn).await;
                }
            }
        }
        cache.task_done();
    }
    debug!("done cache");
    store
}
