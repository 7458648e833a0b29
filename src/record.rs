/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The on-disk edge record and the scalar types that compose it.

use clap::ValueEnum;

/// A vertex identifier.
pub type VertexId = u32;

/// An edge weight.
pub type Weight = f32;

/// The on-disk width, in bytes, of a single `VertexId`.
pub const VERTEX_ID_SIZE: usize = std::mem::size_of::<VertexId>();

/// The on-disk width, in bytes, of a single `Weight`.
pub const WEIGHT_SIZE: usize = std::mem::size_of::<Weight>();

/// Whether edge records on disk carry a trailing weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EdgeType {
    /// `[src][dst]`, 8 bytes per edge.
    Unweighted = 0,
    /// `[src][dst][weight]`, 12 bytes per edge.
    Weighted = 1,
}

impl EdgeType {
    /// The fixed on-disk width of one edge record for this edge type.
    pub fn edge_unit(self) -> usize {
        match self {
            EdgeType::Unweighted => VERTEX_ID_SIZE * 2,
            EdgeType::Weighted => VERTEX_ID_SIZE * 2 + WEIGHT_SIZE,
        }
    }

    /// The numeric code written to `meta` and accepted on the command line.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Reads the `(src, dst)` pair at `pos` in `buf`.
#[inline]
pub fn read_pair(buf: &[u8], pos: usize) -> (VertexId, VertexId) {
    let src = VertexId::from_ne_bytes(buf[pos..pos + VERTEX_ID_SIZE].try_into().unwrap());
    let dst = VertexId::from_ne_bytes(
        buf[pos + VERTEX_ID_SIZE..pos + 2 * VERTEX_ID_SIZE]
            .try_into()
            .unwrap(),
    );
    (src, dst)
}
