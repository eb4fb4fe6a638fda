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

//! A concurrent web crawling framework: LIFO download/cache/scrape
//! queues driven by a pool of fetchers and two dedicated workers, a
//! SQLite-backed persistent cache, proxy rotation, and resumable crawl
//! state.

pub mod callback;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod orchestrator;
pub mod proxy;
pub mod queue;
pub mod seen_set;
pub mod snapshot;
pub mod store;
pub mod transaction;
pub mod workers;
pub mod writer;

pub use callback::CallbackRegistry;
pub use config::Config;
pub use error::{CrawlError, Result};
pub use orchestrator::{Crawl, Orchestrator};
pub use transaction::Transaction;
