use super::{words_from_be, words_to_be, BlockBuffer, Hasher, LengthExtendable, BLOCK_SIZE};

const INITIALISATION_CONSTANTS: [u32; 5] =
    [0x67452301, 0xEFCDAB89, 0x98BADCFE, 0x10325476, 0xC3D2E1F0];
const SHA1_LEN: usize = 20;

#[derive(Debug, Clone)]
pub struct Sha1 {
    state: [u32; 5],
    buffer: BlockBuffer,
}

impl Default for Sha1 {
    fn default() -> Self {
        Self {
            state: INITIALISATION_CONSTANTS,
            buffer: BlockBuffer::with_processed(0),
        }
    }
}

impl Hasher<SHA1_LEN> for Sha1 {
    fn update(&mut self, data: &[u8]) {
        self.buffer
            .update(data, |block| process_chunk(&mut self.state, block));
    }

    fn digest(mut self) -> [u8; SHA1_LEN] {
        let state = &mut self.state;
        self.buffer.finish(|block| process_chunk(state, block));
        words_to_be(&self.state)
    }
}

impl LengthExtendable<SHA1_LEN> for Sha1 {
    fn from_digest(digest: &[u8; SHA1_LEN], processed_len: u64) -> Self {
        Self {
            state: words_from_be(digest),
            buffer: BlockBuffer::with_processed(processed_len),
        }
    }
}

fn process_chunk(state: &mut [u32; 5], chunk: &[u8; BLOCK_SIZE]) {
    let mut w = [0u32; 80];
    w[..16].copy_from_slice(&words_from_be::<16>(chunk));
    for i in 16..80 {
        w[i] = (w[i - 3] ^ w[i - 8] ^ w[i - 14] ^ w[i - 16]).rotate_left(1);
    }

    let [mut a, mut b, mut c, mut d, mut e] = *state;
    for (i, &word) in w.iter().enumerate() {
        let (f, k) = match i {
            0..=19 => ((b & c) | ((!b) & d), 0x5A827999),
            20..=39 => (b ^ c ^ d, 0x6ED9EBA1),
            40..=59 => ((b & c) | (b & d) | (c & d), 0x8F1BBCDC),
            _ => (b ^ c ^ d, 0xCA62C1D6),
        };

        let temp = a
            .rotate_left(5)
            .wrapping_add(f)
            .wrapping_add(e)
            .wrapping_add(k)
            .wrapping_add(word);
        e = d;
        d = c;
        c = b.rotate_left(30);
        b = a;
        a = temp;
    }

    for (s, v) in state.iter_mut().zip([a, b, c, d, e]) {
        *s = s.wrapping_add(v);
    }
}
