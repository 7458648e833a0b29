/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_patterns)]
#![deny(unused_doc_comments)]

//! The heavy lifting lives in [`orchestrator::run`], which wires together a
//! single sequential reader ([`reader`]), a pool of shuffle workers
//! ([`worker`]) fed through a bounded queue ([`queue`]), a set of append-only
//! block files with per-block coalescing buffers ([`blockset`]), and a final
//! linearization pass ([`linearize`]) that concatenates the block grid into
//! row-major and column-major views for the downstream engine.

pub mod blockset;
pub mod config;
pub mod error;
pub mod linearize;
pub mod meta;
pub mod orchestrator;
pub mod partition;
pub mod queue;
pub mod reader;
pub mod record;
pub mod worker;

pub use config::Config;
pub use error::ConfigError;
pub use orchestrator::run;
pub use record::{EdgeType, VertexId, Weight};
