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

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use tracing::warn;

/// A small pool of plausible desktop user agents used to give each proxy a
/// stable identity. Not meant to be exhaustive — just varied enough that a
/// downstream server doesn't see every request from the same UA string.
const USER_AGENT_POOL: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
];

fn generate_user_agent() -> String {
    let mut rng = rand::thread_rng();
    USER_AGENT_POOL
        .choose(&mut rng)
        .copied()
        .unwrap_or(USER_AGENT_POOL[0])
        .to_string()
}

/// Normalizes a proxy string by prepending a default `http://` scheme when
/// the caller didn't specify one.
fn normalize(proxy: &str) -> String {
    if proxy.starts_with("http://") || proxy.starts_with("https://") {
        proxy.to_string()
    } else {
        format!("http://{proxy}")
    }
}

/// Proxy selection, consecutive-failure eviction, and sticky per-proxy user
/// agents.
///
/// Mutated by `CrawlerWorker`s via `note_success`/`note_failure`; callers
/// sharing a `ProxyPool` across concurrently running fetcher tasks must
/// wrap it in a mutex (see `Orchestrator`).
#[derive(Debug, Default)]
pub struct ProxyPool {
    proxies: Vec<String>,
    /// Consecutive failures per proxy; reset to zero on success.
    errors: HashMap<String, u32>,
    max_errors: u32,
    agents: HashMap<String, String>,
    /// User agent handed out for the direct (no proxy) connection.
    direct_agent: Option<String>,
}

impl ProxyPool {
    pub fn new(max_errors: u32) -> Self {
        ProxyPool {
            proxies: Vec::new(),
            errors: HashMap::new(),
            max_errors,
            agents: HashMap::new(),
            direct_agent: None,
        }
    }

    /// Builds a pool from an optional primary proxy, an explicit list, and
    /// an optional proxy file (one proxy per line). A missing file is
    /// logged and otherwise ignored, matching the source's tolerance for
    /// an absent `proxies.txt`.
    pub fn build(
        primary: Option<&str>,
        extra: &[String],
        proxy_file: Option<&Path>,
        max_errors: u32,
    ) -> Self {
        let mut pool = ProxyPool::new(max_errors);
        if let Some(p) = primary {
            pool.add(p);
        }
        for p in extra {
            pool.add(p);
        }
        if let Some(path) = proxy_file {
            match fs::read_to_string(path) {
                Ok(contents) => {
                    for line in contents.lines() {
                        let line = line.trim();
                        if !line.is_empty() {
                            pool.add(line);
                        }
                    }
                }
                Err(e) => {
                    warn!("proxy file {:?} could not be read: {}", path, e);
                }
            }
        }
        pool
    }

    fn add(&mut self, proxy: &str) {
        self.proxies.push(normalize(proxy));
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Returns a uniform-random proxy, or `None` for a direct connection
    /// when the pool is empty.
    pub fn select(&self, _url: &str) -> Option<String> {
        let mut rng = rand::thread_rng();
        self.proxies.choose(&mut rng).cloned()
    }

    /// Resets the consecutive-failure counter for `proxy`.
    pub fn note_success(&mut self, proxy: Option<&str>) {
        if let Some(p) = proxy {
            self.errors.insert(p.to_string(), 0);
        }
    }

    /// Increments the consecutive-failure counter for `proxy`, evicting it
    /// from the pool once it exceeds `max_errors`.
    pub fn note_failure(&mut self, proxy: Option<&str>) {
        let Some(p) = proxy else { return };
        let count = self.errors.entry(p.to_string()).or_insert(0);
        *count += 1;
        if *count > self.max_errors {
            warn!("evicting proxy {} after {} consecutive failures", p, count);
            self.proxies.retain(|existing| existing != p);
        }
    }

    /// Returns a stable user agent for `proxy`, generating and memoizing
    /// one on first use. `None` (direct connection) gets its own memoized
    /// agent too.
    pub fn user_agent(&mut self, proxy: Option<&str>) -> String {
        match proxy {
            Some(p) => self
                .agents
                .entry(p.to_string())
                .or_insert_with(generate_user_agent)
                .clone(),
            None => self
                .direct_agent
                .get_or_insert_with(generate_user_agent)
                .clone(),
        }
    }
}
