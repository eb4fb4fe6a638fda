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

//! Stand-in for the source's dynamic "look up a method by name on the
//! crawl object" dispatch. `Transaction::callback_name` only ever carries
//! a string, so it survives serialization into the persistent store and
//! the queue snapshot; the closures themselves live only in the
//! in-process registry the user builds when describing their crawl.

use std::collections::HashMap;
use std::sync::Arc;

use crate::transaction::Transaction;

pub type Callback = Arc<dyn Fn(&Transaction) -> Vec<Transaction> + Send + Sync>;

#[derive(Clone, Default)]
pub struct CallbackRegistry {
    callbacks: HashMap<String, Callback>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        CallbackRegistry { callbacks: HashMap::new() }
    }

    /// Registers `f` under `name`. A `Transaction` referencing this name
    /// will be dispatched here by the `ScrapeWorker`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&Transaction) -> Vec<Transaction> + Send + Sync + 'static,
    ) {
        self.callbacks.insert(name.into(), Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<Callback> {
        self.callbacks.get(name).cloned()
    }
}
