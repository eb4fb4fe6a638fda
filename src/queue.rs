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

//! The LIFO work queue shared by the download, cache, and scrape stages.
//!
//! The original implementation split each queue into a cooperative
//! (coroutine) side and a blocking (OS-thread) side backed by the same
//! underlying structure, because its cache and scrape workers ran on
//! dedicated threads next to synchronous storage and user code. This
//! port collapses that split: every stage here is an ordinary
//! asynchronous task, and the handful of genuinely blocking calls
//! (SQLite, user callbacks) are individually dispatched to the runtime's
//! blocking pool instead. One `TransactionQueue` type therefore serves
//! fetchers, the cache worker, and the scrape worker alike.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};
use tokio::time::Duration;

use crate::transaction::Transaction;

struct Inner {
    items: Mutex<VecDeque<Transaction>>,
    notify: Notify,
    unfinished: AtomicUsize,
}

/// A depth-first (LIFO) queue of Transactions with Python
/// `queue.Queue`-style `task_done`/join bookkeeping: a queue is only
/// "drained" once it's both empty and has no outstanding unfinished
/// items, which is what the termination protocol polls on.
#[derive(Clone)]
pub struct TransactionQueue {
    inner: Arc<Inner>,
}

impl TransactionQueue {
    pub fn new() -> Self {
        TransactionQueue {
            inner: Arc::new(Inner {
                items: Mutex::new(VecDeque::new()),
                notify: Notify::new(),
                unfinished: AtomicUsize::new(0),
            }),
        }
    }

    /// Pushes onto the stack and marks one item as in flight.
    pub async fn push(&self, txn: Transaction) {
        self.inner.unfinished.fetch_add(1, Ordering::SeqCst);
        self.inner.items.lock().await.push_back(txn);
        self.inner.notify.notify_one();
    }

    /// Waits for an item to become available, then pops it (LIFO: the
    /// most recently pushed item first).
    pub async fn pop(&self) -> Transaction {
        loop {
            {
                let mut items = self.inner.items.lock().await;
                if let Some(txn) = items.pop_back() {
                    return txn;
                }
            }
            self.inner.notify.notified().await;
        }
    }

    /// Non-blocking pop, used by the idle/termination probe.
    pub async fn try_pop(&self) -> Option<Transaction> {
        self.inner.items.lock().await.pop_back()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.items.lock().await.is_empty()
    }

    pub async fn len(&self) -> usize {
        self.inner.items.lock().await.len()
    }

    /// Call once processing of a popped item (and any re-pushes it
    /// caused) has concluded.
    pub fn task_done(&self) {
        self.inner.unfinished.fetch_sub(1, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn unfinished_count(&self) -> usize {
        self.inner.unfinished.load(Ordering::SeqCst)
    }

    pub async fn is_drained(&self) -> bool {
        self.is_empty().await && self.unfinished_count() == 0
    }

    /// Drains every item currently on the queue into a `Vec`, in pop
    /// order, marking each as done. Used by `save_queue` to snapshot
    /// queue contents without leaving dangling unfinished counts.
    pub async fn drain_all(&self) -> Vec<Transaction> {
        let mut out = Vec::new();
        let mut items = self.inner.items.lock().await;
        while let Some(txn) = items.pop_back() {
            out.push(txn);
            self.inner.unfinished.fetch_sub(1, Ordering::SeqCst);
        }
        out
    }
}

impl Default for TransactionQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// The crawl is complete iff every queue is empty and has no items still
/// being processed. A worker that finds its own queue empty must check
/// this joint condition before exiting, since another queue's in-flight
/// item may yet produce work for it.
pub async fn crawl_complete(dl: &TransactionQueue, cache: &TransactionQueue, scrape: &TransactionQueue) -> bool {
    dl.is_drained().await && cache.is_drained().await && scrape.is_drained().await
}

/// Ceiling on how long an idle worker waits before re-checking the joint
/// termination condition.
pub const IDLE_POLL: Duration = Duration::from_secs(1);
