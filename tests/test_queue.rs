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

#[cfg(test)]
mod tests {
    use asyncrawler::queue::{crawl_complete, TransactionQueue};
    use asyncrawler::Transaction;
    use tokio::time::Duration;

    #[tokio::test]
    async fn lifo_pop_order() {
        let q = TransactionQueue::new();
        q.push(Transaction::get("http://example.com/1")).await;
        q.push(Transaction::get("http://example.com/2")).await;
        let first = q.pop().await;
        assert_eq!(first.url, "http://example.com/2");
        q.task_done();
    }

    #[tokio::test]
    async fn empty_and_no_unfinished_is_drained() {
        let q = TransactionQueue::new();
        assert!(q.is_drained().await);
        q.push(Transaction::get("http://example.com/1")).await;
        assert!(!q.is_drained().await);
        let txn = q.pop().await;
        assert!(!q.is_drained().await, "popped but not yet task_done");
        q.task_done();
        let _ = txn;
        assert!(q.is_drained().await);
    }

    #[tokio::test]
    async fn pop_waits_for_a_push() {
        let q = TransactionQueue::new();
        let q2 = q.clone();
        let handle = tokio::spawn(async move { q2.pop().await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        q.push(Transaction::get("http://example.com/a")).await;
        let txn = handle.await.unwrap();
        assert_eq!(txn.url, "http://example.com/a");
    }

    #[tokio::test]
    async fn crawl_complete_requires_all_three_drained() {
        let dl = TransactionQueue::new();
        let cache = TransactionQueue::new();
        let scrape = TransactionQueue::new();
        assert!(crawl_complete(&dl, &cache, &scrape).await);
        cache.push(Transaction::get("http://example.com/a")).await;
        assert!(!crawl_complete(&dl, &cache, &scrape).await);
    }

    #[tokio::test]
    async fn drain_all_resets_unfinished_count() {
        let q = TransactionQueue::new();
        q.push(Transaction::get("http://example.com/1")).await;
        q.push(Transaction::get("http://example.com/2")).await;
        let drained = q.drain_all().await;
        assert_eq!(drained.len(), 2);
        assert!(q.is_drained().await);
    }
}
