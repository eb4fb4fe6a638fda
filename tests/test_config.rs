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
    use asyncrawler::config::Config;

    #[test]
    fn missing_path_falls_back_to_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.max_workers, 10);
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn nonexistent_explicit_path_is_an_error() {
        assert!(Config::load(Some("/nonexistent/config.yaml")).is_err());
    }

    #[test]
    fn invalid_compress_level_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "compress_level: 0\n").unwrap();
        assert!(Config::load(Some(path.to_str().unwrap())).is_err());
    }

    #[test]
    fn yaml_overrides_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "max_workers: 4\nmax_retries: 3\n").unwrap();
        let config = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.max_workers, 4);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout_secs, 60);
    }
}
