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

use std::fmt;

/// Errors that can escape a worker loop and reach the orchestrator.
///
/// Worker loops themselves catch and log everything else; only conditions
/// the orchestrator must react to (an unwritable store, bad config) are
/// modeled here.
#[derive(Debug)]
pub enum CrawlError {
    /// The persistent store could not be opened, read, or written.
    Store(String),
    /// The configuration file was missing, malformed, or failed validation.
    Config(String),
    /// The proxy list file could not be read.
    ProxyFile(String),
    /// A generic I/O failure outside the store (e.g. the result writer).
    Io(std::io::Error),
}

impl fmt::Display for CrawlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlError::Store(msg) => write!(f, "persistent store error: {msg}"),
            CrawlError::Config(msg) => write!(f, "configuration error: {msg}"),
            CrawlError::ProxyFile(msg) => write!(f, "proxy file error: {msg}"),
            CrawlError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CrawlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CrawlError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CrawlError {
    fn from(e: std::io::Error) -> Self {
        CrawlError::Io(e)
    }
}

impl From<rusqlite::Error> for CrawlError {
    fn from(e: rusqlite::Error) -> Self {
        CrawlError::Store(e.to_string())
    }
}

impl From<serde_yaml::Error> for CrawlError {
    fn from(e: serde_yaml::Error) -> Self {
        CrawlError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CrawlError>;
