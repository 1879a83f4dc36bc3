/// Ordered accumulator for encoded recording fragments.
///
/// Chunks are kept in exact arrival order and flushed into one contiguous
/// buffer when the recording finishes. Out-of-order assembly corrupts the
/// clip, so there is no reordering, deduplication, or overflow dropping;
/// the clip length is already bounded by the recording ceiling.
///
/// Shared between the device callback and the session as
/// `Arc<parking_lot::Mutex<ChunkAssembler>>`.
#[derive(Debug, Default)]
pub struct ChunkAssembler {
    chunks: Vec<Vec<u8>>,
}

impl ChunkAssembler {
    pub fn new() -> Self {
        Self { chunks: Vec::new() }
    }

    /// Append a chunk. Empty chunks are ignored, matching recorder
    /// implementations that only deliver non-empty data events.
    pub fn push(&mut self, chunk: Vec<u8>) {
        if chunk.is_empty() {
            return;
        }
        self.chunks.push(chunk);
    }

    /// Number of chunks accumulated so far.
    pub fn count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total payload bytes across all chunks.
    pub fn total_bytes(&self) -> usize {
        self.chunks.iter().map(|c| c.len()).sum()
    }

    /// Concatenate all chunks in arrival order and clear the accumulator.
    ///
    /// Returns `None` when no chunks were collected.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.chunks.is_empty() {
            return None;
        }
        let mut data = Vec::with_capacity(self.total_bytes());
        for chunk in self.chunks.drain(..) {
            data.extend_from_slice(&chunk);
        }
        Some(data)
    }

    /// Discard everything without producing a clip.
    pub fn clear(&mut self) {
        self.chunks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_concatenates_in_arrival_order() {
        let mut assembler = ChunkAssembler::new();
        assembler.push(b"AAA".to_vec());
        assembler.push(b"B".to_vec());
        assembler.push(b"CC".to_vec());

        assert_eq!(assembler.count(), 3);
        assert_eq!(assembler.total_bytes(), 6);
        assert_eq!(assembler.finish(), Some(b"AAABCC".to_vec()));
    }

    #[test]
    fn finish_clears_the_accumulator() {
        let mut assembler = ChunkAssembler::new();
        assembler.push(vec![1, 2]);

        assert!(assembler.finish().is_some());
        assert!(assembler.is_empty());
        assert_eq!(assembler.finish(), None);
    }

    #[test]
    fn finish_with_no_chunks_yields_nothing() {
        let mut assembler = ChunkAssembler::new();
        assert_eq!(assembler.finish(), None);
    }

    #[test]
    fn empty_chunks_are_ignored() {
        let mut assembler = ChunkAssembler::new();
        assembler.push(Vec::new());
        assembler.push(b"X".to_vec());

        assert_eq!(assembler.count(), 1);
        assert_eq!(assembler.finish(), Some(b"X".to_vec()));
    }

    #[test]
    fn clear_discards_without_clip() {
        let mut assembler = ChunkAssembler::new();
        assembler.push(b"stale".to_vec());
        assembler.clear();

        assert!(assembler.is_empty());
        assert_eq!(assembler.finish(), None);
    }
}
