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

use std::collections::BTreeMap;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// A decoded HTTP response body, tagged by how the `Fetcher` interpreted
/// the response `content-type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
    Bytes(Vec<u8>),
}

/// The request/response unit passed through the download, cache, and
/// scrape queues.
///
/// `headers` is a `BTreeMap` rather than a `HashMap` so that
/// [`Transaction::fingerprint`] is deterministic across processes: hashing
/// a `HashMap`'s iteration order would make the fingerprint depend on
/// hasher seed, breaking the "equal requests hash equal" contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    /// Absent means GET; present means POST with this body.
    pub body_in: Option<Vec<u8>>,
    /// 0 means the request has never been attempted.
    pub status: u16,
    pub body_out: Option<ResponseBody>,
    pub num_errors: u32,
    pub callback_name: Option<String>,
    /// User annotation fields carried verbatim through the pipeline.
    pub annotations: serde_json::Map<String, serde_json::Value>,
}

impl Transaction {
    /// A fresh, unattempted GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Transaction {
            url: url.into(),
            headers: BTreeMap::new(),
            body_in: None,
            status: 0,
            body_out: None,
            num_errors: 0,
            callback_name: None,
            annotations: serde_json::Map::new(),
        }
    }

    /// A fresh, unattempted POST request.
    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Transaction {
            body_in: Some(body),
            ..Transaction::get(url)
        }
    }

    pub fn with_callback(mut self, name: impl Into<String>) -> Self {
        self.callback_name = Some(name.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// After a request is made the status will not be 0.
    pub fn made(&self) -> bool {
        self.status > 0
    }

    /// A 4xx response is the client's fault and is never retried.
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Retries are allowed while under the budget and the failure isn't a
    /// non-retryable 4xx.
    pub fn can_retry(&self, max_retries: u32) -> bool {
        self.num_errors < max_retries && !(400..500).contains(&self.status)
    }

    /// Overlays every non-empty field of `other` onto `self`.
    ///
    /// Used by the `CacheWorker` to carry the requesting Transaction's
    /// callback name onto the stored copy it found in the persistent
    /// store, and by nothing else in the pipeline — but the overlay is
    /// defined over every field so the behavior generalizes the way the
    /// original dynamic-attribute merge did.
    pub fn merge(&mut self, other: &Transaction) {
        if !other.url.is_empty() {
            self.url = other.url.clone();
        }
        if !other.headers.is_empty() {
            self.headers = other.headers.clone();
        }
        if other.body_in.is_some() {
            self.body_in = other.body_in.clone();
        }
        if other.status != 0 {
            self.status = other.status;
        }
        if other.body_out.is_some() {
            self.body_out = other.body_out.clone();
        }
        if other.num_errors != 0 {
            self.num_errors = other.num_errors;
        }
        if other.callback_name.is_some() {
            self.callback_name = other.callback_name.clone();
        }
        for (k, v) in &other.annotations {
            if !v.is_null() {
                self.annotations.insert(k.clone(), v.clone());
            }
        }
    }

    /// Deterministic MD5-based hash of request identity: URL, headers, and
    /// request body. Response state never factors in, so a re-fetch maps
    /// to the same cache entry.
    pub fn fingerprint(&self) -> u128 {
        let mut hasher = Md5::new();
        hasher.update(self.url.as_bytes());
        hasher.update(b" ");
        for (k, v) in &self.headers {
            hasher.update(k.as_bytes());
            hasher.update(b":");
            hasher.update(v.as_bytes());
            hasher.update(b";");
        }
        hasher.update(b" ");
        if let Some(body) = &self.body_in {
            hasher.update(body);
        }
        let digest = hasher.finalize();
        u128::from_be_bytes(digest.into())
    }
}
