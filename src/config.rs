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

//! YAML-file configuration, overlaid with CLI flags.

use serde::Deserialize;
use std::{fs, path::PathBuf};

use crate::error::{CrawlError, Result};

/// Main configuration structure, loaded from an optional YAML file and
/// overlaid with CLI flags. Defines every tunable of the crawl pipeline.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Number of concurrent crawler (fetcher) tasks.
    pub max_workers: usize,

    /// Connection pool size for the shared HTTP client.
    pub max_connections: usize,

    /// Retries allowed for a retryable failure before the transaction is
    /// cached as a terminal error.
    pub max_retries: u32,

    /// Per-fetch timeout, in seconds.
    pub timeout_secs: u64,

    /// Path to the SQLite-backed persistent store. Defaults to a hidden
    /// directory next to the running executable.
    pub store_path: Option<String>,

    /// Gzip compression level (1-9) applied to serialized cache entries.
    pub compress_level: u32,

    /// Commit to the backing store every this many writes.
    pub max_operations: u64,

    /// How long, in seconds, a cache entry stays fresh. `None` disables
    /// expiry entirely.
    pub freshness_secs: Option<u64>,

    /// A single primary proxy, used alongside any in `proxies` or
    /// `proxy_file`.
    pub proxy: Option<String>,

    #[serde(default)]
    pub proxies: Vec<String>,

    /// One proxy per line; a missing file is logged and ignored rather
    /// than treated as fatal.
    pub proxy_file: Option<String>,

    /// Consecutive failures before a proxy is evicted from the pool.
    pub proxy_max_errors: u32,

    /// Populated from the `--queue` CLI flag after loading, never read
    /// from the file itself.
    #[serde(skip)]
    pub queue_mode: bool,

    /// Populated from the `--debug` CLI flag after loading.
    #[serde(skip)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_workers: 10,
            max_connections: 10,
            max_retries: 1,
            timeout_secs: 60,
            store_path: None,
            compress_level: 6,
            max_operations: 1000,
            freshness_secs: None,
            proxy: None,
            proxies: Vec::new(),
            proxy_file: None,
            proxy_max_errors: 20,
            queue_mode: false,
            debug: false,
        }
    }
}

impl Config {
    /// Loads configuration from a YAML file if `path` is given and
    /// exists; falls back to defaults when no path is given. A path that
    /// is given but missing or malformed is a hard configuration error.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(p) if std::path::Path::new(p).exists() => {
                let contents = fs::read_to_string(p)?;
                serde_yaml::from_str::<Config>(&contents)?
            }
            Some(p) => {
                return Err(CrawlError::Config(format!("config file '{p}' does not exist")));
            }
            None => Config::default(),
        };

        if config.compress_level == 0 || config.compress_level > 9 {
            return Err(CrawlError::Config("compress_level must be between 1 and 9".into()));
        }
        if config.max_workers == 0 {
            return Err(CrawlError::Config("max_workers must be at least 1".into()));
        }

        config.compress_level = config.compress_level.clamp(1, 9);
        Ok(config)
    }

    /// Resolves the store path, defaulting to a hidden directory
    /// co-located with the running executable.
    pub fn resolved_store_path(&self) -> PathBuf {
        match &self.store_path {
            Some(p) => PathBuf::from(p),
            None => hidden_path("cache.db"),
        }
    }
}

/// Returns `.<binary-name>/<filename>` next to the running executable,
/// creating the hidden directory if needed. Falls back to the bare
/// filename if the directory can't be created.
pub fn hidden_path(filename: &str) -> PathBuf {
    let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("asyncrawler"));
    let stem = exe.file_stem().and_then(|s| s.to_str()).unwrap_or("asyncrawler");
    let parent = exe.parent().unwrap_or_else(|| std::path::Path::new("."));
    let hidden_dir = parent.join(format!(".{stem}"));
    if fs::create_dir_all(&hidden_dir).is_ok() {
        hidden_dir.join(filename)
    } else {
        PathBuf::from(filename)
    }
}
