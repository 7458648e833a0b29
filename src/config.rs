/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Raw, invoker-supplied configuration and its resolution into [`Params`].
//!
//! [`Config`] is what a caller (the CLI, or a library user) builds directly.
//! [`Config::resolve`] is the only place configuration errors are raised; by
//! the time a [`Params`] exists, every downstream component can trust it
//! without re-validating.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::record::EdgeType;

/// The page size assumed for alignment purposes. 4 KiB on every platform
/// this crate targets.
pub const PAGESIZE: usize = 4096;

/// The recommended chunk size for sequential reads and shuffle scratch,
/// before alignment to [`PAGESIZE`] and the edge unit.
pub const IOSIZE_RECOMMENDED: usize = 8 * 1024 * 1024;

/// The capacity, in bytes, of each per-block coalescing cell.
pub const GRID_BUFFER_CAP: usize = 768;

/// The constant used to derive a default partition count from the vertex
/// count when the caller does not supply one.
pub const CHUNKSIZE: u32 = 64;

/// Raw configuration as supplied by a caller (CLI flags, or a library user
/// building one directly).
#[derive(Debug, Clone)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub vertices: u32,
    pub partitions: Option<usize>,
    pub edge_type: EdgeType,
    pub num_workers: Option<usize>,
}

/// Resolved, validated shuffle parameters. Every component downstream of
/// [`Config::resolve`] consumes this and never re-derives any of it.
#[derive(Debug, Clone)]
pub struct Params {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub vertices: u32,
    pub partitions: usize,
    pub edge_type: EdgeType,
    pub edge_unit: usize,
    pub edges: u64,
    pub io_size: usize,
    pub num_workers: usize,
    pub grid_buffer_cap: usize,
}

impl Config {
    /// Validates and resolves this configuration, stat'ing the input file to
    /// determine the edge count.
    pub fn resolve(&self) -> Result<Params, ConfigError> {
        if self.vertices == 0 {
            return Err(ConfigError::ZeroVertices);
        }
        if let Some(0) = self.partitions {
            return Err(ConfigError::ZeroPartitions(0));
        }
        if let Some(0) = self.num_workers {
            return Err(ConfigError::ZeroWorkers(0));
        }

        let edge_unit = self.edge_type.edge_unit();

        let input_size = input_file_size(&self.input_path)
            .ok_or_else(|| ConfigError::InputNotReadable(self.input_path.clone()))?;

        if input_size % edge_unit as u64 != 0 {
            return Err(ConfigError::MisalignedInput {
                path: self.input_path.clone(),
                input_size,
                edge_unit,
            });
        }
        let edges = input_size / edge_unit as u64;

        let partitions = self
            .partitions
            .unwrap_or_else(|| default_partitions(self.vertices));

        let num_workers = self.num_workers.unwrap_or_else(|| num_cpus::get().max(1));

        let io_size = align_io_size(IOSIZE_RECOMMENDED, edge_unit);

        Ok(Params {
            input_path: self.input_path.clone(),
            output_path: self.output_path.clone(),
            vertices: self.vertices,
            partitions,
            edge_type: self.edge_type,
            edge_unit,
            edges,
            io_size,
            num_workers,
            grid_buffer_cap: GRID_BUFFER_CAP,
        })
    }
}

fn input_file_size(path: &Path) -> Option<u64> {
    std::fs::metadata(path).ok().map(|m| m.len())
}

/// `max(1, vertices / CHUNKSIZE)`: a zero-partition grid is never useful, so
/// small vertex counts are clamped up to a single partition.
fn default_partitions(vertices: u32) -> usize {
    ((vertices / CHUNKSIZE).max(1)) as usize
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Rounds `recommended` down to the nearest common multiple of [`PAGESIZE`]
/// and `edge_unit`, so that every chunk is both page-aligned and holds a
/// whole number of edge records. Never rounds below one such unit.
fn align_io_size(recommended: usize, edge_unit: usize) -> usize {
    let unit = PAGESIZE / gcd(PAGESIZE, edge_unit) * edge_unit;
    if recommended < unit {
        unit
    } else {
        (recommended / unit) * unit
    }
}
