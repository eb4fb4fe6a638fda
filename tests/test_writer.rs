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
    use asyncrawler::writer::{CsvResultWriter, ResultWriter};
    use std::io::Read;

    #[test]
    fn write_mode_writes_header_then_truncates_on_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        {
            let mut w = CsvResultWriter::new(&path, vec!["url".into(), "title".into()]);
            w.writerow(&vec![("url".into(), "http://a".into()), ("title".into(), "A".into())]).unwrap();
        }
        let mut contents = String::new();
        std::fs::File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "url,title\nhttp://a,A\n");
    }

    #[test]
    fn append_mode_skips_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "url,title\nhttp://a,A\n").unwrap();

        let mut w = CsvResultWriter::new(&path, vec!["url".into(), "title".into()]);
        w.set_mode("a");
        w.writerow(&vec![("url".into(), "http://b".into()), ("title".into(), "B".into())]).unwrap();

        let mut contents = String::new();
        std::fs::File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "url,title\nhttp://a,A\nhttp://b,B\n");
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut w = CsvResultWriter::new(&path, vec!["title".into()]);
        w.writerow(&vec![("title".into(), "a, b".into())]).unwrap();

        let mut contents = String::new();
        std::fs::File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "title\n\"a, b\"\n");
    }
}
