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
    use asyncrawler::seen_set::SeenSet;
    use asyncrawler::Transaction;

    #[test]
    fn second_insert_of_same_fingerprint_reports_not_new() {
        let mut seen = SeenSet::new();
        let a = Transaction::get("http://example.com/a");
        let b = Transaction::get("http://example.com/a");
        assert!(seen.insert(&a));
        assert!(!seen.insert(&b));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn distinct_urls_are_independent() {
        let mut seen = SeenSet::new();
        seen.insert(&Transaction::get("http://example.com/a"));
        assert!(!seen.contains(&Transaction::get("http://example.com/b")));
    }
}
