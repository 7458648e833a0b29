/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The shuffle worker loop: count, prefix-sum, scatter, drain.
//!
//! Each worker owns one local scratch buffer and two `partitions^2`-length
//! arrays for its entire lifetime, reused across every chunk it handles so a
//! chunk never allocates. For a chunk of `bytes` length the four passes are:
//!
//! 1. **Count** — scan the chunk once, incrementing a per-`(i, j)` counter
//!    for every edge routed to that block.
//! 2. **Prefix sum** — turn the counts into cumulative end offsets into the
//!    scratch buffer, and a parallel array of write cursors starting at each
//!    segment's beginning.
//! 3. **Scatter** — scan the chunk again, copying each edge to its cursor
//!    position in the scratch buffer and advancing the cursor.
//! 4. **Drain** — walk the `partitions^2` segments of the now block-sorted
//!    scratch buffer in order, handing each to [`BlockFileSet::append`].

use anyhow::{ensure, Context, Result};
use crossbeam_channel::Receiver;

use crate::blockset::BlockFileSet;
use crate::config::Params;
use crate::partition::partition_of;
use crate::queue::Task;
use crate::reader::BufferPool;
use crate::record::read_pair;

/// Runs one worker's loop until it receives [`Task::Sentinel`].
pub fn run(params: &Params, pool: &BufferPool, rx: &Receiver<Task>, blocks: &BlockFileSet) -> Result<()> {
    let partitions = params.partitions;
    let edge_unit = params.edge_unit;
    let num_cells = partitions * partitions;

    let mut offset = vec![0usize; num_cells];
    let mut cursor = vec![0usize; num_cells];
    let mut scratch = vec![0u8; pool.slot_size()];

    loop {
        let (slot, bytes) = match rx.recv().context("worker channel closed unexpectedly")? {
            Task::Chunk { slot, bytes } => (slot, bytes),
            Task::Sentinel => break,
        };

        // SAFETY: this worker holds ownership of `slot` until `pool.release`
        // below; no other thread touches it meanwhile.
        let input = unsafe { pool.slot_mut(slot) };
        let input = &input[..bytes];

        offset.iter_mut().for_each(|c| *c = 0);
        let mut pos = 0;
        while pos < bytes {
            let (src, dst) = read_pair(input, pos);
            let i = partition_of(src, params.vertices, partitions);
            let j = partition_of(dst, params.vertices, partitions);
            offset[i * partitions + j] += edge_unit;
            pos += edge_unit;
        }

        cursor[0] = 0;
        for ij in 1..num_cells {
            cursor[ij] = offset[ij - 1];
            offset[ij] += cursor[ij];
        }
        ensure!(
            num_cells == 0 || offset[num_cells - 1] == bytes,
            "scatter offsets did not cover the whole chunk"
        );

        let mut pos = 0;
        while pos < bytes {
            let (src, dst) = read_pair(input, pos);
            let i = partition_of(src, params.vertices, partitions);
            let j = partition_of(dst, params.vertices, partitions);
            let ij = i * partitions + j;
            let dest = cursor[ij];
            scratch[dest..dest + edge_unit].copy_from_slice(&input[pos..pos + edge_unit]);
            cursor[ij] += edge_unit;
            pos += edge_unit;
        }

        pool.release(slot);

        let mut start = 0;
        for ij in 0..num_cells {
            debug_assert_eq!(cursor[ij], offset[ij]);
            let i = ij / partitions;
            let j = ij % partitions;
            blocks.append(i, j, &scratch[start..offset[ij]])?;
            start = offset[ij];
        }
    }
    Ok(())
}
