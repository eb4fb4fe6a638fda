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

use std::process::exit;

use asyncrawler::config::Config;
use asyncrawler::{CallbackRegistry, Crawl, Orchestrator, Transaction};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use asyncrawler::writer::CsvResultWriter;

/// CLI arguments accepted by the crawler binary. Anything crawl-specific
/// (seed URL, callback wiring) is expected to come from a user-authored
/// `main` that builds a `Crawl` and calls `Orchestrator::run` directly;
/// this binary is a runnable reference crawl.
#[derive(Parser, Debug)]
#[command(
    name = "asyncrawler",
    version = "0.1.0",
    about = "Concurrent web crawling framework with persistent HTTP response caching"
)]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(long)]
    config: Option<String>,

    /// Resume from (and save) a queue snapshot across runs.
    #[arg(long)]
    queue: bool,

    /// Raise log verbosity to debug regardless of `LOG_LEVEL`.
    #[arg(long)]
    debug: bool,

    /// Seed URL for the reference crawl.
    #[arg(long, default_value = "http://example.com")]
    start_url: String,
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| default_level.into()))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to load config: {e}");
            exit(1);
        }
    };
    config.queue_mode = args.queue;
    config.debug = args.debug;

    init_logging(config.debug);

    let mut callbacks = CallbackRegistry::new();
    callbacks.register("echo", |txn: &Transaction| {
        tracing::info!("scraped: {} ({})", txn.url, txn.status);
        Vec::new()
    });

    let crawl = Crawl {
        start: Transaction::get(&args.start_url).with_callback("echo"),
        callbacks,
        writer: Box::new(CsvResultWriter::new("results.csv", vec!["url".into(), "status".into()])),
    };

    let orchestrator = Orchestrator::new(config);
    if let Err(e) = orchestrator.run(crawl).await {
        error!("asyncrawler exited with error: {}", e);
        exit(1);
    }
}
