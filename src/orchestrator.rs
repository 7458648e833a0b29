/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Wires together the reader, the worker pool, the block grid, and the
//! linearization pass into one end-to-end run.
//!
//! See the module-level sequence in the crate documentation: resolve
//! parameters, recreate the output directory, spawn workers, drain the
//! reader, join, flush and sync the grid, linearize twice, write `meta`.

use std::thread;

use anyhow::{Context, Result};
use dsi_progress_logger::prelude::*;

use crate::blockset::BlockFileSet;
use crate::config::Config;
use crate::linearize::{self, Order};
use crate::meta;
use crate::queue;
use crate::reader::{self, BufferPool};
use crate::worker;

/// Runs a full shuffle: validates `config`, then partitions its input file
/// into a block grid under `config.output_path` and linearizes it.
pub fn run(config: &Config) -> Result<()> {
    let params = config.resolve().context("invalid configuration")?;
    log::info!(
        "vertices={} partitions={} edges={} edge_type={:?} workers={} io_size={}",
        params.vertices,
        params.partitions,
        params.edges,
        params.edge_type,
        params.num_workers,
        params.io_size,
    );

    let blocks = BlockFileSet::create(
        &params.output_path,
        params.partitions,
        params.edge_unit,
        params.grid_buffer_cap,
    )
    .context("failed to set up block grid")?;

    // Two buffer slots per worker, mirroring the toolkit's usual rule of
    // thumb that the reader should be able to stay one chunk ahead of every
    // worker without blocking.
    let pool = BufferPool::new(params.num_workers * 2, params.io_size)
        .context("failed to allocate scratch buffer pool")?;
    let (tx, rx) = queue::channel(params.num_workers * 2);

    let mut pl = ProgressLogger::default();
    pl.display_memory(true)
        .item_name("edge")
        .expected_updates(Some(params.edges as usize));
    pl.start("shuffling edges into the block grid");

    let shuffle_result: Result<()> = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(params.num_workers);
        for _ in 0..params.num_workers {
            let rx = rx.clone();
            let params = &params;
            let pool = &pool;
            let blocks = &blocks;
            handles.push(scope.spawn(move || worker::run(params, pool, &rx, blocks)));
        }
        drop(rx);

        let read_result = reader::run(&params.input_path, &pool, &tx, params.num_workers);
        drop(tx);

        let mut result = read_result;
        for handle in handles {
            let worker_result = handle
                .join()
                .unwrap_or_else(|_| Err(anyhow::anyhow!("a worker thread panicked")));
            if result.is_ok() {
                result = worker_result;
            }
        }
        result
    });
    shuffle_result.context("shuffle phase failed")?;
    pl.done();

    blocks.finalize().context("failed to finalize block grid")?;

    let mut pl = ProgressLogger::default();
    pl.display_memory(true)
        .item_name("view")
        .expected_updates(Some(2));
    pl.start("linearizing the block grid");
    linearize::linearize(&params.output_path, params.partitions, Order::Column)
        .context("failed to linearize column view")?;
    pl.update();
    linearize::linearize(&params.output_path, params.partitions, Order::Row)
        .context("failed to linearize row view")?;
    pl.update();
    pl.done();

    meta::write(&params.output_path, &params).context("failed to write meta file")?;

    log::info!("done: output written to {:?}", params.output_path);
    Ok(())
}
