/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! End-to-end scenarios against the public API, exercising the worked
//! examples and the boundary/error cases around them.

use gridshuffle::{Config, EdgeType};

fn write_unweighted(path: &std::path::Path, pairs: &[(u32, u32)]) {
    let mut bytes = Vec::with_capacity(pairs.len() * 8);
    for &(s, d) in pairs {
        bytes.extend_from_slice(&s.to_ne_bytes());
        bytes.extend_from_slice(&d.to_ne_bytes());
    }
    std::fs::write(path, bytes).unwrap();
}

fn write_weighted(path: &std::path::Path, edges: &[(u32, u32, f32)]) {
    let mut bytes = Vec::with_capacity(edges.len() * 12);
    for &(s, d, w) in edges {
        bytes.extend_from_slice(&s.to_ne_bytes());
        bytes.extend_from_slice(&d.to_ne_bytes());
        bytes.extend_from_slice(&w.to_ne_bytes());
    }
    std::fs::write(path, bytes).unwrap();
}

fn read_offsets(path: &std::path::Path) -> Vec<u64> {
    std::fs::read(path)
        .unwrap()
        .chunks(8)
        .map(|c| u64::from_ne_bytes(c.try_into().unwrap()))
        .collect()
}

/// S1: edge_type=0, V=4, P=2.
#[test]
fn s1_four_vertices_two_partitions() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let output = dir.path().join("out");
    write_unweighted(&input, &[(0, 0), (0, 3), (1, 2), (3, 1), (2, 2), (3, 3)]);

    let config = Config {
        input_path: input,
        output_path: output.clone(),
        vertices: 4,
        partitions: Some(2),
        edge_type: EdgeType::Unweighted,
        num_workers: Some(2),
    };
    gridshuffle::run(&config).unwrap();

    assert_eq!(
        std::fs::read_to_string(output.join("meta")).unwrap(),
        "0 4 6 2"
    );

    // block (0,0)={(0,0)}, (0,1)={(0,3),(1,2)}, (1,0)={(3,1)}, (1,1)={(2,2),(3,3)}
    let sizes = [
        ((0, 0), 8u64),
        ((0, 1), 16),
        ((1, 0), 8),
        ((1, 1), 16),
    ];
    for ((i, j), expected) in sizes {
        assert_eq!(
            std::fs::metadata(output.join(format!("block-{i}-{j}")))
                .unwrap()
                .len(),
            expected
        );
    }

    // Column order is j outer, i inner: (0,0) (1,0) (0,1) (1,1).
    let column_offset = read_offsets(&output.join("column_offset"));
    assert_eq!(column_offset, vec![0, 8, 16, 32, 48]);
    // Row order is i outer, j inner: (0,0) (0,1) (1,0) (1,1).
    let row_offset = read_offsets(&output.join("row_offset"));
    assert_eq!(row_offset, vec![0, 8, 24, 32, 48]);

    assert_eq!(
        std::fs::metadata(output.join("column")).unwrap().len(),
        48
    );
    assert_eq!(std::fs::metadata(output.join("row")).unwrap().len(), 48);

    let mut block00 = std::fs::read(output.join("block-0-0")).unwrap();
    block00.sort();
    assert_eq!(block00, [0u32.to_ne_bytes(), 0u32.to_ne_bytes()].concat());
}

/// S2: edge_type=1, V=3, P=3, identity partitioning.
#[test]
fn s2_weighted_identity_partitioning() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let output = dir.path().join("out");
    write_weighted(&input, &[(0, 1, 1.0), (1, 2, 2.0), (2, 0, 3.0)]);

    let config = Config {
        input_path: input,
        output_path: output.clone(),
        vertices: 3,
        partitions: Some(3),
        edge_type: EdgeType::Weighted,
        num_workers: Some(4),
    };
    gridshuffle::run(&config).unwrap();

    assert_eq!(
        std::fs::read_to_string(output.join("meta")).unwrap(),
        "1 3 3 3"
    );
    assert_eq!(
        std::fs::metadata(output.join("column")).unwrap().len(),
        36
    );
    let column_offset = read_offsets(&output.join("column_offset"));
    assert_eq!(column_offset.len(), 10);
    assert_eq!(*column_offset.last().unwrap(), 36);

    for (i, j) in [(0, 1), (1, 2), (2, 0)] {
        assert_eq!(
            std::fs::metadata(output.join(format!("block-{i}-{j}")))
                .unwrap()
                .len(),
            12
        );
    }
}

/// S3: empty input, single partition.
#[test]
fn s3_empty_input_single_partition() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let output = dir.path().join("out");
    std::fs::write(&input, []).unwrap();

    let config = Config {
        input_path: input,
        output_path: output.clone(),
        vertices: 1,
        partitions: Some(1),
        edge_type: EdgeType::Unweighted,
        num_workers: Some(1),
    };
    gridshuffle::run(&config).unwrap();

    assert_eq!(
        std::fs::read_to_string(output.join("meta")).unwrap(),
        "0 1 0 1"
    );
    assert_eq!(std::fs::metadata(output.join("column")).unwrap().len(), 0);
    assert_eq!(read_offsets(&output.join("column_offset")), vec![0, 0]);
}

/// S4: a larger pseudo-random edge set, checking the structural invariants
/// rather than exact byte layout (partition coverage, conservation of edge
/// count, meta agreement).
#[test]
fn s4_larger_random_graph_holds_invariants() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let output = dir.path().join("out");

    let vertices = 1024u32;
    let mut state = 0x2545f4914f6cdd1du64;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % vertices as u64) as u32
    };
    let edges: Vec<(u32, u32)> = (0..20_000).map(|_| (next(), next())).collect();
    write_unweighted(&input, &edges);

    let config = Config {
        input_path: input,
        output_path: output.clone(),
        vertices,
        partitions: Some(8),
        edge_type: EdgeType::Unweighted,
        num_workers: Some(4),
    };
    gridshuffle::run(&config).unwrap();

    let meta = std::fs::read_to_string(output.join("meta")).unwrap();
    assert_eq!(meta, format!("0 {} {} 8", vertices, edges.len()));

    let mut total_block_bytes = 0u64;
    for i in 0..8 {
        for j in 0..8 {
            total_block_bytes += std::fs::metadata(output.join(format!("block-{i}-{j}")))
                .unwrap()
                .len();
        }
    }
    assert_eq!(total_block_bytes, edges.len() as u64 * 8);

    let column_offset = read_offsets(&output.join("column_offset"));
    let row_offset = read_offsets(&output.join("row_offset"));
    assert_eq!(*column_offset.last().unwrap(), total_block_bytes);
    assert_eq!(*row_offset.last().unwrap(), total_block_bytes);
}

/// S5: different worker counts must agree on the linearized totals (no
/// edges dropped or duplicated, grid shape identical).
#[test]
fn s5_worker_count_does_not_change_totals() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.bin");
    let edges: Vec<(u32, u32)> = (0..5000u32).map(|v| (v % 97, (v * 31) % 97)).collect();
    write_unweighted(&input, &edges);

    let mut totals = Vec::new();
    for workers in [1usize, 2, 6] {
        let output = dir.path().join(format!("out-{workers}"));
        let config = Config {
            input_path: input.clone(),
            output_path: output.clone(),
            vertices: 97,
            partitions: Some(4),
            edge_type: EdgeType::Unweighted,
            num_workers: Some(workers),
        };
        gridshuffle::run(&config).unwrap();
        totals.push((
            std::fs::read_to_string(output.join("meta")).unwrap(),
            std::fs::metadata(output.join("column")).unwrap().len(),
            std::fs::metadata(output.join("row")).unwrap().len(),
        ));
    }
    assert!(totals.iter().all(|t| *t == totals[0]));
}

#[test]
fn rejects_zero_vertices_as_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.bin");
    std::fs::write(&input, []).unwrap();

    let config = Config {
        input_path: input,
        output_path: dir.path().join("out"),
        vertices: 0,
        partitions: None,
        edge_type: EdgeType::Unweighted,
        num_workers: None,
    };
    let err = gridshuffle::run(&config).unwrap_err();
    assert!(err.to_string().contains("invalid configuration"));
}

#[test]
fn rejects_input_size_not_a_multiple_of_edge_unit() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.bin");
    std::fs::write(&input, [0u8; 13]).unwrap();

    let config = Config {
        input_path: input,
        output_path: dir.path().join("out"),
        vertices: 4,
        partitions: Some(2),
        edge_type: EdgeType::Unweighted,
        num_workers: Some(1),
    };
    let err = gridshuffle::run(&config).unwrap_err();
    assert!(err.to_string().contains("invalid configuration"));
}

#[test]
fn rejects_a_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        input_path: dir.path().join("does-not-exist.bin"),
        output_path: dir.path().join("out"),
        vertices: 4,
        partitions: Some(2),
        edge_type: EdgeType::Unweighted,
        num_workers: Some(1),
    };
    assert!(gridshuffle::run(&config).is_err());
}
