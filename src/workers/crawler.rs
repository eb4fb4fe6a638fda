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

//! Pulls from the download queue, fetches, and fans results into the
//! cache and scrape queues.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::fetcher::{self, HttpClient};
use crate::proxy::ProxyPool;
use crate::queue::{crawl_complete, TransactionQueue, IDLE_POLL};

#[allow(clippy::too_many_arguments)]
pub async fn run(
    id: usize,
    client: HttpClient,
    download: TransactionQueue,
    cache: TransactionQueue,
    scrape: TransactionQueue,
    proxies: Arc<Mutex<ProxyPool>>,
    max_retries: u32,
    timeout: Duration,
    running: Arc<AtomicBool>,
) {
    debug!("start crawler {}", id);
    loop {
        if download.is_empty().await {
            if !running.load(Ordering::SeqCst) || crawl_complete(&download, &cache, &scrape).await {
                break;
            }
            tokio::time::sleep(IDLE_POLL).await;
            continue;
        }

        let mut txn = download.pop().await;
        if !txn.made() || txn.can_retry(max_retries) {
            let (proxy, user_agent) = {
                let mut pool = proxies.lock().await;
                let proxy = pool.select(&txn.url);
                let user_agent = pool.user_agent(proxy.as_deref());
                (proxy, user_agent)
            };

            fetcher::fetch(&client, &mut txn, proxy.as_deref(), &user_agent, timeout).await;

            {
                let mut pool = proxies.lock().await;
                if txn.is_error() {
                    pool.note_failure(proxy.as_deref());
                } else {
                    pool.note_success(proxy.as_deref());
                }
            }

            if txn.is_error() {
                info!("download error: {} ({})", txn.url, txn.status);
                txn.num_errors += 1;
                download.push(txn).await;
            } else {
                info!("download: {} ({})", txn.url, txn.status);
                cache.push(txn.clone()).await;
                scrape.push(txn).await;
            }
        } else {
            info!("download fail (not retryable): {} ({})", txn.url, txn.status);
            cache.push(txn).await;
        }
        download.task_done();
    }
    debug!("done crawler {}", id);
}
