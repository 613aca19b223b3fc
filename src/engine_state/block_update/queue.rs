//! Pending block writes and the chunks to refresh once they land.

use std::collections::{HashSet, VecDeque};

use crate::engine_state::voxels::chunk::ChunkPos;
use crate::engine_state::voxels::world::BlockPos;

/// FIFO queue of block positions plus the set of chunks touched by the batch.
///
/// Positions may repeat; chunks may not.
#[derive(Default, Debug)]
pub struct WorkQueue {
    blocks: VecDeque<BlockPos>,
    chunks: HashSet<ChunkPos>,
}

impl WorkQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a block position.
    pub fn enqueue(&mut self, position: BlockPos) {
        self.blocks.push_back(position);
    }

    /// Adds a chunk to refresh on completion.
    ///
    /// # Returns
    /// `false` if the chunk was already queued.
    pub fn enqueue_chunk(&mut self, chunk: ChunkPos) -> bool {
        self.chunks.insert(chunk)
    }

    /// Removes up to `limit` positions from the front of the queue.
    ///
    /// Returns fewer, or none, when the queue holds fewer.
    pub fn drain_up_to(&mut self, limit: usize) -> Vec<BlockPos> {
        let count = limit.min(self.blocks.len());
        self.blocks.drain(..count).collect()
    }

    /// Whether no block positions are left.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of queued block positions.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Number of distinct chunks queued for refresh.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// The chunks queued for refresh, in no particular order.
    pub fn chunks(&self) -> impl Iterator<Item = &ChunkPos> {
        self.chunks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    #[test]
    fn drains_in_fifo_order_with_duplicates() {
        let mut queue = WorkQueue::new();
        for x in [3, 1, 3, 2] {
            queue.enqueue(Point3::new(x, 0, 0));
        }

        let first: Vec<i32> = queue.drain_up_to(3).iter().map(|p| p.x).collect();
        assert_eq!(first, vec![3, 1, 3]);
        assert_eq!(queue.len(), 1);

        let rest = queue.drain_up_to(10);
        assert_eq!(rest, vec![Point3::new(2, 0, 0)]);
        assert!(queue.is_empty());
        assert!(queue.drain_up_to(10).is_empty());
    }

    #[test]
    fn chunks_are_a_set() {
        let mut queue = WorkQueue::new();
        assert!(queue.enqueue_chunk(ChunkPos::new(0, 0)));
        assert!(!queue.enqueue_chunk(ChunkPos::new(0, 0)));
        assert!(queue.enqueue_chunk(ChunkPos::new(0, 1)));
        assert_eq!(queue.chunk_count(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn zero_limit_drains_nothing() {
        let mut queue = WorkQueue::new();
        queue.enqueue(Point3::new(0, 0, 0));
        assert!(queue.drain_up_to(0).is_empty());
        assert_eq!(queue.len(), 1);
    }
}
