/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Configuration-time errors.
//!
//! Everything past configuration (I/O failures, invariant violations)
//! propagates as a plain [`anyhow::Error`] with added context, in keeping
//! with the rest of the crate. Only the class of error a caller might want
//! to handle specially — "you gave me nonsense before I touched the disk" —
//! gets its own type.

use std::path::PathBuf;

use thiserror::Error;

/// A configuration error, raised by [`crate::config::Config::resolve`]
/// before the shuffle does any real work.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("vertex count must be at least 1")]
    ZeroVertices,

    #[error("partition count must be at least 1, got {0}")]
    ZeroPartitions(usize),

    #[error("worker count must be at least 1, got {0}")]
    ZeroWorkers(usize),

    #[error("input file {0:?} does not exist or is not readable")]
    InputNotReadable(PathBuf),

    #[error(
        "input size {input_size} is not a multiple of the edge unit {edge_unit} for file {path:?}"
    )]
    MisalignedInput {
        path: PathBuf,
        input_size: u64,
        edge_unit: usize,
    },
}
