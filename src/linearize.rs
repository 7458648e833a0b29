/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Concatenates the block grid into the two linear views the downstream
//! engine actually reads: `column` (column-major, `j` outer / `i` inner) and
//! `row` (row-major, `i` outer / `j` inner), each paired with an offset
//! index of `partitions^2 + 1` little-endian... native-endian `u64` entries,
//! one per block boundary plus a trailing total.
//!
//! Each block file is mapped read-only and sequentially advised; the
//! destination is a plain buffered writer, since unlike the shuffle this
//! pass never contends on destination position.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use dsi_progress_logger::prelude::*;
use mmap_rs::{MmapFlags, MmapOptions};

use crate::blockset::BlockFileSet;

/// Which traversal order to linearize the grid in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// `j` outer, `i` inner: `(0,0) (1,0) ... (P-1,0) (0,1) ...`
    Column,
    /// `i` outer, `j` inner: `(0,0) (0,1) ... (0,P-1) (1,0) ...`
    Row,
}

impl Order {
    fn name(self) -> &'static str {
        match self {
            Order::Column => "column",
            Order::Row => "row",
        }
    }

    /// The `(i, j)` grid coordinates in this order's traversal sequence.
    fn sequence(self, partitions: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(partitions * partitions);
        match self {
            Order::Column => {
                for j in 0..partitions {
                    for i in 0..partitions {
                        out.push((i, j));
                    }
                }
            }
            Order::Row => {
                for i in 0..partitions {
                    for j in 0..partitions {
                        out.push((i, j));
                    }
                }
            }
        }
        out
    }
}

/// Writes `output_dir/{name}` and `output_dir/{name}_offset` for `order`,
/// where `name` is `"column"` or `"row"`.
pub fn linearize(output_dir: &Path, partitions: usize, order: Order) -> Result<()> {
    let data_path = output_dir.join(order.name());
    let offset_path = output_dir.join(format!("{}_offset", order.name()));

    let mut data_out = BufWriter::new(
        File::create(&data_path).with_context(|| format!("failed to create {data_path:?}"))?,
    );
    let mut offset_out = BufWriter::new(
        File::create(&offset_path)
            .with_context(|| format!("failed to create {offset_path:?}"))?,
    );

    let mut pl = ProgressLogger::default();
    pl.display_memory(true)
        .item_name("block")
        .expected_updates(Some(partitions * partitions));
    pl.start(format!("linearizing {} grid", order.name()));

    let mut offset: u64 = 0;
    for (i, j) in order.sequence(partitions) {
        offset_out
            .write_all(&offset.to_ne_bytes())
            .context("failed to write offset entry")?;

        let block_path = BlockFileSet::block_path(output_dir, i, j);
        let len = copy_block(&block_path, &mut data_out)?;
        offset += len;
        pl.update();
    }
    offset_out
        .write_all(&offset.to_ne_bytes())
        .context("failed to write trailing offset entry")?;

    data_out.flush().context("failed to flush linearized data")?;
    offset_out.flush().context("failed to flush offset index")?;
    pl.done();
    Ok(())
}

/// Maps `block_path` read-only and copies its contents to `out`, returning
/// its length. A zero-length block (no edges routed to it) is a no-op.
fn copy_block(block_path: &Path, out: &mut impl Write) -> Result<u64> {
    let len = std::fs::metadata(block_path)
        .with_context(|| format!("failed to stat block {block_path:?}"))?
        .len();
    if len == 0 {
        return Ok(0);
    }

    let file =
        File::open(block_path).with_context(|| format!("failed to open block {block_path:?}"))?;
    let mmap = unsafe {
        MmapOptions::new(len as usize)
            .with_context(|| format!("failed to reserve mapping for {block_path:?}"))?
            .with_flags(MmapFlags::SEQUENTIAL)
            .with_file(file, 0)
            .map()
            .with_context(|| format!("failed to map block {block_path:?}"))?
    };
    out.write_all(&mmap)
        .with_context(|| format!("failed to copy block {block_path:?} into linearized output"))?;
    Ok(len)
}
