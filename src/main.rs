/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Command-line front-end: parses arguments, initializes logging, and hands
//! off to [`gridshuffle::run`].

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use gridshuffle::{Config, EdgeType};

/// Partitions a binary edge list into a 2-D block grid for an out-of-core
/// graph engine.
#[derive(Parser, Debug)]
#[command(name = "gridshuffle", version, about)]
struct Cli {
    /// Path to the flat binary edge list.
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Output directory for the block grid; recreated if it already exists.
    #[arg(long, short = 'o')]
    output: PathBuf,

    /// Number of vertices in the graph.
    #[arg(long, short = 'v')]
    vertices: u32,

    /// Number of partitions per axis. Defaults to `max(1, vertices / 64)`.
    #[arg(long, short = 'p')]
    partitions: Option<usize>,

    /// Edge record layout on disk.
    #[arg(long, short = 't', value_enum, default_value = "unweighted")]
    edge_type: EdgeType,

    /// Number of shuffle worker threads. Defaults to the detected hardware
    /// concurrency.
    #[arg(long, short = 'w')]
    threads: Option<usize>,
}

fn main() -> Result<()> {
    init_env_logger();

    let cli = Cli::parse();
    let config = Config {
        input_path: cli.input,
        output_path: cli.output,
        vertices: cli.vertices,
        partitions: cli.partitions,
        edge_type: cli.edge_type,
        num_workers: cli.threads,
    };

    gridshuffle::run(&config)
}

fn init_env_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
