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

//! The `writer: { mode, writerow }` side of the user crawl contract. Out
//! of core per the project's scope notes — richer sinks are the user's
//! responsibility — but a minimal CSV reference implementation is kept
//! here so a crawl is runnable end to end without every user writing
//! their own.

use std::fs::OpenOptions;
use std::io::Write;

use crate::error::Result;

/// A row of scraped results, keyed by column name so callbacks don't need
/// to know column ordering.
pub type Record = Vec<(String, String)>;

pub trait ResultWriter: Send {
    /// `"w"` truncates and (re)writes the header; `"a"` appends without
    /// one. The orchestrator switches a writer into append mode when
    /// resuming from a queue snapshot.
    fn set_mode(&mut self, mode: &str);
    fn writerow(&mut self, record: &Record) -> Result<()>;
}

/// Writes rows to a CSV file, opened lazily on first `writerow` so
/// constructing a writer never touches the filesystem by itself.
pub struct CsvResultWriter {
    path: std::path::PathBuf,
    header: Vec<String>,
    mode: String,
    file: Option<std::fs::File>,
}

impl CsvResultWriter {
    pub fn new(path: impl Into<std::path::PathBuf>, header: Vec<String>) -> Self {
        CsvResultWriter { path: path.into(), header, mode: "w".to_string(), file: None }
    }

    fn ensure_open(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }
        let append = self.mode.contains('a');
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&self.path)?;
        if !append {
            writeln!(file, "{}", csv_row(&self.header))?;
        }
        self.file = Some(file);
        Ok(())
    }

    fn field_value(&self, record: &Record, column: &str) -> String {
        record
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    }
}

impl ResultWriter for CsvResultWriter {
    fn set_mode(&mut self, mode: &str) {
        self.mode = mode.to_string();
    }

    fn writerow(&mut self, record: &Record) -> Result<()> {
        self.ensure_open()?;
        let row: Vec<String> = self.header.iter().map(|col| self.field_value(record, col)).collect();
        if let Some(file) = &mut self.file {
            writeln!(file, "{}", csv_row(&row))?;
        }
        Ok(())
    }
}

fn csv_row(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| {
            if f.contains(',') || f.contains('"') || f.contains('\n') {
                format!("\"{}\"", f.replace('"', "\"\""))
            } else {
                f.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
