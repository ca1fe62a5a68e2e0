// Merkle-Damgård hashes with their chaining state exposed.
//
// Both hashes compress 64 byte blocks into a state of big-endian words and
// finish with the same padding: 0x80, zeros, then the message length in bits
// as a big-endian u64. Since the digest is nothing more than the final state,
// a hasher can be rebuilt from a digest and carry on hashing, which is all a
// length-extension attack needs.
mod sha1;
mod sha256;

pub use sha1::Sha1;
pub use sha256::Sha256;

const BLOCK_SIZE: usize = 64;
const LENGTH_SIZE: usize = 8;

pub trait Hasher<const N: usize>: Default {
    fn update(&mut self, data: &[u8]);

    fn digest(self) -> [u8; N];

    fn digest_message(message: &[u8]) -> [u8; N] {
        let mut hasher = Self::default();
        hasher.update(message);
        hasher.digest()
    }

    fn update_and_digest(mut self, message: &[u8]) -> [u8; N] {
        self.update(message);
        self.digest()
    }
}

pub trait LengthExtendable<const N: usize>: Hasher<N> {
    /// Rebuild a hasher whose chaining state is `digest`, as if it had
    /// already processed `processed_len` bytes.
    ///
    /// `processed_len` should be a whole number of blocks: a digest is only
    /// ever taken after the padding has filled the last block.
    fn from_digest(digest: &[u8; N], processed_len: u64) -> Self;

    /// The padding the hash appends to a message of `message_len` bytes.
    fn padding(message_len: u64) -> Vec<u8> {
        md_padding(message_len)
    }
}

pub fn md_padding(message_len: u64) -> Vec<u8> {
    let block = BLOCK_SIZE as u64;
    let zeros = ((block + 55 - message_len % block) % block) as usize;
    let mut padding = Vec::with_capacity(1 + zeros + LENGTH_SIZE);
    padding.push(0x80);
    padding.resize(1 + zeros, 0);
    padding.extend_from_slice(&message_len.wrapping_mul(8).to_be_bytes());
    padding
}

/// Collects input into whole blocks and counts the bytes seen.
#[derive(Debug, Clone)]
struct BlockBuffer {
    buffer: [u8; BLOCK_SIZE],
    buffer_len: usize,
    processed: u64,
}

impl BlockBuffer {
    fn with_processed(processed: u64) -> Self {
        Self {
            buffer: [0u8; BLOCK_SIZE],
            buffer_len: 0,
            processed,
        }
    }

    fn update(&mut self, mut data: &[u8], mut compress: impl FnMut(&[u8; BLOCK_SIZE])) {
        self.processed = self.processed.wrapping_add(data.len() as u64);

        if self.buffer_len > 0 {
            let to_copy = (BLOCK_SIZE - self.buffer_len).min(data.len());
            self.buffer[self.buffer_len..self.buffer_len + to_copy]
                .copy_from_slice(&data[..to_copy]);
            self.buffer_len += to_copy;
            data = &data[to_copy..];

            if self.buffer_len < BLOCK_SIZE {
                return;
            }
            compress(&self.buffer);
            self.buffer_len = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_SIZE);
        for block in &mut blocks {
            let mut full = [0u8; BLOCK_SIZE];
            full.copy_from_slice(block);
            compress(&full);
        }
        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffer_len = rest.len();
    }

    fn finish(mut self, mut compress: impl FnMut(&[u8; BLOCK_SIZE])) {
        let padding = md_padding(self.processed);
        self.update(&padding, &mut compress);
        debug_assert_eq!(self.buffer_len, 0);
    }
}

fn words_from_be<const W: usize>(bytes: &[u8]) -> [u32; W] {
    let mut words = [0u32; W];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    words
}

fn words_to_be<const N: usize>(words: &[u32]) -> [u8; N] {
    let mut out = [0u8; N];
    for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    out
}
