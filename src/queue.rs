/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The bounded task queue handing chunks from the reader to the workers.
//!
//! A hand-rolled mutex-and-condvar ring buffer would do the same job; a
//! bounded [`crossbeam_channel`] gives the same backpressure with less code
//! and no risk of missed wakeups.

use crossbeam_channel::{bounded, Receiver, Sender};

/// One unit of work handed from the reader to a worker.
#[derive(Debug, Clone, Copy)]
pub enum Task {
    /// A chunk of raw edge bytes, `bytes` long, read into the buffer slot at
    /// `slot`.
    Chunk { slot: usize, bytes: usize },
    /// Tells a worker there is no more work. The reader pushes one sentinel
    /// per worker after it reaches end of input.
    Sentinel,
}

/// Creates a bounded task queue with room for `capacity` in-flight tasks.
///
/// `capacity` is normally the number of buffer slots in the reader's pool:
/// the reader cannot fill a slot that is already in flight, so the channel
/// and the pool provide the same backpressure redundantly by construction.
pub fn channel(capacity: usize) -> (Sender<Task>, Receiver<Task>) {
    bounded(capacity)
}
