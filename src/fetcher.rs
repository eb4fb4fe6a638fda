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

//! Issues a single HTTP request for a `Transaction` and decodes the
//! response back into it, mirroring the source's `fetch()` coroutine.

use std::time::Duration;

use bytes::Bytes;
use hyper::client::HttpConnector;
use hyper::header::{CONTENT_TYPE, HOST, USER_AGENT};
use hyper::{Body, Client, Method, Request, Uri};
use tracing::error;

use crate::transaction::{ResponseBody, Transaction};

/// Synthetic status assigned when the request never reaches the server
/// (DNS failure, connection refused, timeout). Kept distinct from any real
/// HTTP status and from `0` (never attempted).
const TRANSPORT_ERROR_STATUS: u16 = 512;

pub type HttpClient = Client<HttpConnector>;

pub fn build_client(max_connections: usize) -> HttpClient {
    let mut connector = HttpConnector::new();
    connector.set_keepalive(Some(Duration::from_secs(90)));
    connector.enforce_http(false);
    Client::builder().pool_max_idle_per_host(max_connections).build(connector)
}

/// Performs the fetch described by `txn`, mutating its `status` and
/// `body_out` in place. Never returns an `Err` for ordinary network
/// failures — those map to `TRANSPORT_ERROR_STATUS`, matching the
/// source's "catch everything, fall back to a sentinel status" policy so
/// the worker loop above never needs its own try/catch around a fetch.
pub async fn fetch(
    client: &HttpClient,
    txn: &mut Transaction,
    proxy: Option<&str>,
    user_agent: &str,
    timeout: Duration,
) {
    let request = match build_request(txn, proxy, user_agent) {
        Ok(r) => r,
        Err(e) => {
            error!("fetch error: {}: {}", e, txn.url);
            txn.status = TRANSPORT_ERROR_STATUS;
            return;
        }
    };

    match tokio::time::timeout(timeout, client.request(request)).await {
        Ok(Ok(response)) => {
            txn.status = response.status().as_u16();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            match hyper::body::to_bytes(response.into_body()).await {
                Ok(bytes) => txn.body_out = Some(decode_body(&content_type, bytes)),
                Err(e) => {
                    error!("fetch error reading body: {}: {}", e, txn.url);
                    txn.status = if txn.status > 0 { txn.status } else { TRANSPORT_ERROR_STATUS };
                }
            }
        }
        Ok(Err(e)) => {
            error!("fetch error: {}: {}", e, txn.url);
            txn.status = if txn.status > 0 { txn.status } else { TRANSPORT_ERROR_STATUS };
        }
        Err(_) => {
            error!("fetch timed out after {:?}: {}", timeout, txn.url);
            txn.status = if txn.status > 0 { txn.status } else { TRANSPORT_ERROR_STATUS };
        }
    }
}

/// GET when `body_in` is absent, POST otherwise. A proxy is applied by
/// rewriting the request into absolute-form against the proxy host and
/// restoring the original `Host` header, the plain-HTTP proxying
/// technique the hyper client supports without an additional connector
/// crate.
pub fn build_request(txn: &Transaction, proxy: Option<&str>, user_agent: &str) -> Result<Request<Body>, String> {
    let target: Uri = txn.url.parse().map_err(|e| format!("invalid url: {e}"))?;
    let method = if txn.body_in.is_some() { Method::POST } else { Method::GET };

    let mut builder = Request::builder().method(method);

    let uri = match proxy {
        Some(proxy_url) => {
            let proxy_uri: Uri = proxy_url.parse().map_err(|e| format!("invalid proxy url: {e}"))?;
            builder = builder.header(
                HOST,
                target.authority().map(|a| a.as_str()).unwrap_or_default(),
            );
            Uri::builder()
                .scheme(proxy_uri.scheme_str().unwrap_or("http"))
                .authority(proxy_uri.authority().cloned().ok_or("proxy missing host")?)
                .path_and_query(target.to_string())
                .build()
                .map_err(|e| format!("invalid proxied uri: {e}"))?
        }
        None => target,
    };
    builder = builder.uri(uri);

    for (key, value) in &txn.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    if !txn.headers.contains_key("User-Agent") {
        builder = builder.header(USER_AGENT, user_agent);
    }

    let body = match &txn.body_in {
        Some(bytes) => Body::from(bytes.clone()),
        None => Body::empty(),
    };
    builder.body(body).map_err(|e| format!("could not build request: {e}"))
}

pub fn decode_body(content_type: &str, bytes: Bytes) -> ResponseBody {
    if content_type.contains("json") {
        match serde_json::from_slice(&bytes) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(String::from_utf8_lossy(&bytes).into_owned()),
        }
    } else if content_type.contains("text") {
        ResponseBody::Text(String::from_utf8_lossy(&bytes).into_owned())
    } else {
        ResponseBody::Bytes(bytes.to_vec())
    }
}
