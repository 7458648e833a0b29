/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The `meta` file: the one-line summary the downstream engine reads first
//! to learn how to interpret everything else in the output directory.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Params;

/// Writes `output_dir/meta` as a single line: `edge_type vertices edges
/// partitions`, space-separated.
pub fn write(output_dir: &Path, params: &Params) -> Result<()> {
    let path = output_dir.join("meta");
    let mut file =
        File::create(&path).with_context(|| format!("failed to create meta file {path:?}"))?;
    write!(
        file,
        "{} {} {} {}",
        params.edge_type.code(),
        params.vertices,
        params.edges,
        params.partitions
    )
    .with_context(|| format!("failed to write meta file {path:?}"))?;
    file.sync_all().context("failed to sync meta file")?;
    Ok(())
}
