/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The `partitions x partitions` grid of append-only block files, and the
//! small per-block buffers that coalesce single-edge writes.
//!
//! Workers scatter most of a chunk into segments of several edges each,
//! which are cheap to write directly. What's left over — a single edge that
//! happened to be the only one routed to some block in this chunk — would
//! otherwise cost one tiny `write(2)` per edge. Each block keeps a small
//! cell (capacity [`crate::config::GRID_BUFFER_CAP`] bytes) that accumulates
//! these singletons and flushes once full, turning many tiny writes into
//! occasional large ones.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};

struct BlockCell {
    file: File,
    cell: Vec<u8>,
    cap: usize,
}

impl BlockCell {
    fn open(path: &Path, cap: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to create block file {path:?}"))?;
        Ok(Self {
            file,
            cell: Vec::with_capacity(cap),
            cap,
        })
    }

    /// Appends `data` to this block, directly if it's more than one edge
    /// wide, or via the coalescing cell if it's exactly one edge wide.
    fn append(&mut self, data: &[u8], edge_unit: usize) -> Result<()> {
        if data.len() > edge_unit {
            self.file.write_all(data).context("block write failed")?;
        } else if data.len() == edge_unit {
            self.cell.extend_from_slice(data);
            if self.cell.len() + edge_unit > self.cap {
                self.flush_cell()?;
            }
        }
        Ok(())
    }

    fn flush_cell(&mut self) -> Result<()> {
        if !self.cell.is_empty() {
            self.file
                .write_all(&self.cell)
                .context("block cell flush failed")?;
            self.cell.clear();
        }
        Ok(())
    }
}

/// The full `partitions x partitions` set of block files.
pub struct BlockFileSet {
    cells: Vec<Mutex<BlockCell>>,
    partitions: usize,
    edge_unit: usize,
}

impl BlockFileSet {
    /// Creates `output_dir/block-i-j` for every `(i, j)` in the grid,
    /// replacing the directory if it already exists.
    pub fn create(output_dir: &Path, partitions: usize, edge_unit: usize, cap: usize) -> Result<Self> {
        if output_dir.exists() {
            std::fs::remove_dir_all(output_dir)
                .with_context(|| format!("failed to clear existing output dir {output_dir:?}"))?;
        }
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("failed to create output dir {output_dir:?}"))?;

        let mut cells = Vec::with_capacity(partitions * partitions);
        for i in 0..partitions {
            for j in 0..partitions {
                let path = output_dir.join(format!("block-{i}-{j}"));
                cells.push(Mutex::new(BlockCell::open(&path, cap)?));
            }
        }
        Ok(Self {
            cells,
            partitions,
            edge_unit,
        })
    }

    /// Appends `data` to block `(i, j)`. Safe to call concurrently for
    /// different or identical `(i, j)` from any number of threads.
    pub fn append(&self, i: usize, j: usize, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let mut cell = self.cells[i * self.partitions + j]
            .lock()
            .expect("block mutex poisoned");
        cell.append(data, self.edge_unit)
    }

    /// Flushes every block's coalescing cell and fsyncs every block file.
    /// Must be called once, after every worker has finished scattering.
    pub fn finalize(self) -> Result<()> {
        for cell in &self.cells {
            let mut cell = cell.lock().expect("block mutex poisoned");
            cell.flush_cell()?;
            cell.file.sync_all().context("block file sync failed")?;
        }
        Ok(())
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// The path a finalized grid would have written for block `(i, j)`.
    pub fn block_path(output_dir: &Path, i: usize, j: usize) -> std::path::PathBuf {
        output_dir.join(format!("block-{i}-{j}"))
    }
}
