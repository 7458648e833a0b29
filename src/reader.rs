/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The single sequential reader and the anonymous buffer pool it fills.
//!
//! One thread owns the input file descriptor and reads it start to finish in
//! `io_size`-sized chunks, each landing in a slot of [`BufferPool`]. A slot is
//! handed to a worker as a [`Task::Chunk`](crate::queue::Task::Chunk) and
//! returned to the pool once the worker has scattered its contents into the
//! block files, so the pool never needs more than `num_slots` chunks of
//! memory regardless of input size.

use std::cell::UnsafeCell;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use mmap_rs::{MmapFlags, MmapMut, MmapOptions};

use crate::queue::Task;

/// A fixed-size pool of equally-sized scratch buffers backed by a single
/// anonymous mapping, handed out to the reader and returned by workers
/// through a free list.
///
/// Ownership of a slot's bytes is tracked entirely through the free-list
/// channel: a thread may only call [`slot_mut`](Self::slot_mut) on a slot
/// index it has `acquire`d and not yet `release`d. The pool itself does not
/// enforce this; it relies on the reader/worker protocol to hand out each
/// slot to exactly one thread at a time.
pub struct BufferPool {
    mmap: UnsafeCell<MmapMut>,
    slot_size: usize,
    num_slots: usize,
    free_tx: Sender<usize>,
    free_rx: Receiver<usize>,
}

// SAFETY: access to the underlying mapping is partitioned into disjoint
// `slot_size` regions and handed out one at a time through the free list, so
// concurrent callers never observe overlapping mutable slices.
unsafe impl Sync for BufferPool {}

impl BufferPool {
    /// Allocates `num_slots` buffers of `slot_size` bytes each as a single
    /// anonymous mapping.
    pub fn new(num_slots: usize, slot_size: usize) -> Result<Self> {
        let total = num_slots
            .checked_mul(slot_size)
            .context("buffer pool size overflowed")?;
        let mmap = unsafe {
            MmapOptions::new(total)
                .context("failed to reserve buffer pool mapping")?
                .with_flags(MmapFlags::NO_RESERVE)
                .map_mut()
                .context("failed to map buffer pool")?
        };
        let (free_tx, free_rx) = bounded(num_slots);
        for slot in 0..num_slots {
            free_tx.send(slot).expect("channel sized for num_slots");
        }
        Ok(Self {
            mmap: UnsafeCell::new(mmap),
            slot_size,
            num_slots,
            free_tx,
            free_rx,
        })
    }

    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    /// Blocks until a slot is free and removes it from circulation.
    pub fn acquire(&self) -> usize {
        self.free_rx
            .recv()
            .expect("buffer pool outlived its own sender")
    }

    /// Returns a slot to circulation once its contents have been consumed.
    pub fn release(&self, slot: usize) {
        self.free_tx
            .send(slot)
            .expect("buffer pool outlived its own receiver");
    }

    /// Borrows the bytes of `slot` mutably.
    ///
    /// # Safety
    /// The caller must currently hold logical ownership of `slot` (obtained
    /// from [`acquire`](Self::acquire) and not yet returned via
    /// [`release`](Self::release)), and must not alias this slice with any
    /// other live borrow of the same slot.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn slot_mut(&self, slot: usize) -> &mut [u8] {
        debug_assert!(slot < self.num_slots);
        let base = (*self.mmap.get()).as_mut_ptr();
        let start = slot * self.slot_size;
        std::slice::from_raw_parts_mut(base.add(start), self.slot_size)
    }
}

/// Reads `path` start to finish, handing each chunk to a worker via `tx`,
/// then pushes one [`Task::Sentinel`] per worker so every worker loop
/// terminates.
///
/// Chunks are always a whole number of `edge_unit`-sized records: `pool`'s
/// slot size is a multiple of `edge_unit` (see
/// [`crate::config::align_io_size`]) and validated input sizes are multiples
/// of `edge_unit` too, so the final short chunk is still aligned.
pub fn run(path: &Path, pool: &BufferPool, tx: &Sender<Task>, num_workers: usize) -> Result<()> {
    let mut file =
        File::open(path).with_context(|| format!("failed to open input file {path:?}"))?;

    loop {
        let slot = pool.acquire();
        // SAFETY: this thread just acquired `slot` and releases it only
        // after the read below, or immediately on EOF.
        let buf = unsafe { pool.slot_mut(slot) };
        let bytes = read_fill(&mut file, buf)?;
        if bytes == 0 {
            pool.release(slot);
            break;
        }
        tx.send(Task::Chunk { slot, bytes })
            .context("failed to hand off chunk: all workers gone")?;
    }

    for _ in 0..num_workers {
        tx.send(Task::Sentinel)
            .context("failed to send sentinel: all workers gone")?;
    }
    Ok(())
}

/// Fills `buf` from `file` with repeated `read` calls, stopping at EOF.
/// Returns the number of bytes actually read, which may be shorter than
/// `buf` on the final chunk.
fn read_fill(file: &mut File, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file
            .read(&mut buf[filled..])
            .context("failed to read input file")?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
