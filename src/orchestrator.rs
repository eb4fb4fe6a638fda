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

//! Wires the three queues, the store, the proxy pool, and the worker
//! pool together, and owns the startup/shutdown/snapshot protocol.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::callback::CallbackRegistry;
use crate::config::Config;
use crate::error::Result;
use crate::fetcher;
use crate::proxy::ProxyPool;
use crate::queue::TransactionQueue;
use crate::snapshot;
use crate::store::PersistentStore;
use crate::transaction::Transaction;
use crate::workers::{cache, crawler, scrape};
use crate::writer::ResultWriter;

/// Everything the user supplies to describe a crawl: where to start, how
/// to interpret responses, and where results go.
pub struct Crawl {
    pub start: Transaction,
    pub callbacks: CallbackRegistry,
    pub writer: Box<dyn ResultWriter>,
}

pub struct Orchestrator {
    config: Config,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        Orchestrator { config }
    }

    pub async fn run(self, mut crawl: Crawl) -> Result<()> {
        let store_path = self.config.resolved_store_path();
        let mut store = PersistentStore::open(
            &store_path,
            self.config.compress_level,
            self.config.freshness_secs,
            self.config.max_operations,
        )?;

        let download = TransactionQueue::new();
        let cache_queue = TransactionQueue::new();
        let scrape_queue = TransactionQueue::new();

        if self.config.queue_mode && snapshot::load_queue(&mut store, &download, &scrape_queue).await {
            info!(
                "loaded queue - downloads: {} scrapes: {}",
                download.len().await,
                scrape_queue.len().await
            );
            crawl.writer.set_mode("a");
        } else {
            cache_queue.push(crawl.start.clone()).await;
        }

        let proxy_path = self.config.proxy_file.as_deref().map(Path::new);
        let proxies = Arc::new(Mutex::new(ProxyPool::build(
            self.config.proxy.as_deref(),
            &self.config.proxies,
            proxy_path,
            self.config.proxy_max_errors,
        )));

        let running = Arc::new(AtomicBool::new(true));
        {
            let running = running.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("shutting down asyncrawler - press Ctrl+C again to terminate immediately");
                    running.store(false, Ordering::SeqCst);
                }
            });
        }

        let client = fetcher::build_client(self.config.max_connections);
        let timeout = Duration::from_secs(self.config.timeout_secs);

        let mut crawler_handles = Vec::with_capacity(self.config.max_workers);
        for id in 0..self.config.max_workers {
            crawler_handles.push(tokio::spawn(crawler::run(
                id,
                client.clone(),
                download.clone(),
                cache_queue.clone(),
                scrape_queue.clone(),
                proxies.clone(),
                self.config.max_retries,
                timeout,
                running.clone(),
            )));
        }

        let cache_handle = tokio::spawn(cache::run(
            store,
            download.clone(),
            cache_queue.clone(),
            scrape_queue.clone(),
            running.clone(),
        ));
        let scrape_handle = tokio::spawn(scrape::run(
            download.clone(),
            cache_queue.clone(),
            scrape_queue.clone(),
            crawl.callbacks,
            crate::seen_set::SeenSet::new(),
            running.clone(),
        ));

        for handle in crawler_handles {
            let _ = handle.await;
        }
        let mut store = cache_handle.await.expect("cache worker panicked");
        let _seen = scrape_handle.await.expect("scrape worker panicked");

        if self.config.queue_mode {
            let remaining_downloads = download.drain_all().await;
            let remaining_scrapes = scrape_queue.drain_all().await;
            info!("caching queue state");
            snapshot::save_queue(&mut store, &remaining_downloads, &remaining_scrapes)?;
        } else {
            info!("clearing queue state");
            snapshot::clear_queue(&mut store)?;
        }
        store.flush()?;

        Ok(())
    }
}
