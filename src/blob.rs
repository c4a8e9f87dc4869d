//! Sequential cursor over the song blob.
//!
//! No bounds checking beyond ordinary slice indexing: the blob is trusted producer
//! output, so a malformed blob panics here rather than being validated or recovered
//! from (see §4.1/§7 of SPEC_FULL.md).

pub struct BlobReader<'a> {
    blob: &'a [u8],
    cursor: usize,
}

impl<'a> BlobReader<'a> {
    pub fn new(blob: &'a [u8]) -> Self {
        Self { blob, cursor: 0 }
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn read_byte(&mut self) -> u8 {
        let b = self.blob[self.cursor];
        self.cursor += 1;
        b
    }

    pub fn read_i32(&mut self) -> i32 {
        let bytes: [u8; 4] = self.blob[self.cursor..self.cursor + 4].try_into().unwrap();
        self.cursor += 4;
        i32::from_ne_bytes(bytes)
    }

    pub fn read_f32(&mut self) -> f32 {
        let bytes: [u8; 4] = self.blob[self.cursor..self.cursor + 4].try_into().unwrap();
        self.cursor += 4;
        f32::from_ne_bytes(bytes)
    }

    pub fn read_f64(&mut self) -> f64 {
        let bytes: [u8; 8] = self.blob[self.cursor..self.cursor + 8].try_into().unwrap();
        self.cursor += 8;
        f64::from_ne_bytes(bytes)
    }

    /// Returns a view of the next `n` bytes and advances the cursor past them.
    /// The returned slice borrows from the original blob, not from `self`.
    pub fn read_chunk(&mut self, n: usize) -> &'a [u8] {
        let chunk = &self.blob[self.cursor..self.cursor + n];
        self.cursor += n;
        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_fields_in_order() {
        let mut blob = Vec::new();
        blob.extend_from_slice(&42u8.to_ne_bytes());
        blob.extend_from_slice(&(-7i32).to_ne_bytes());
        blob.extend_from_slice(&1.5f32.to_ne_bytes());
        blob.extend_from_slice(&3.25f64.to_ne_bytes());
        blob.extend_from_slice(&[0xAA, 0xBB, 0xCC]);

        let mut reader = BlobReader::new(&blob);
        assert_eq!(reader.read_byte(), 42);
        assert_eq!(reader.read_i32(), -7);
        assert_eq!(reader.read_f32(), 1.5);
        assert_eq!(reader.read_f64(), 3.25);
        assert_eq!(reader.read_chunk(3), &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn chunk_advances_cursor() {
        let blob = [1u8, 2, 3, 4, 5];
        let mut reader = BlobReader::new(&blob);
        let _ = reader.read_chunk(2);
        assert_eq!(reader.position(), 2);
        assert_eq!(reader.read_byte(), 3);
    }

    #[test]
    #[should_panic]
    fn out_of_range_read_panics_rather_than_reading_uninit_memory() {
        let blob = [1u8];
        let mut reader = BlobReader::new(&blob);
        reader.read_i32();
    }
}
