/// MT19937 pseudo-random number generator

const N: usize = 624;
const M: usize = 397;
const W: u32 = 32;
const UMASK: u32 = 0xffffffff << (W - 1);
const LMASK: u32 = 0xffffffff >> 1;
const A: u32 = 0x9908b0df;
const U: u32 = 11;
const S: u32 = 7;
const T: u32 = 15;
const L: u32 = 18;
const B: u32 = 0x9d2c5680;
const C: u32 = 0xefc60000;
const F: u32 = 1812433253;

pub const MT19937_STATE_LEN: usize = N;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mt19937 {
    state: [u32; N],
    index: usize,
}

impl Mt19937 {
    pub fn new(seed: u32) -> Self {
        Self::from_state(seed_state(seed))
    }

    /// A generator positioned at a twist boundary: the next call to
    /// [`Mt19937::generate`] twists `state` before producing output.
    pub fn from_state(state: [u32; N]) -> Self {
        Self { state, index: 0 }
    }

    pub fn generate(&mut self) -> u32 {
        if self.index == 0 {
            self.twist();
        }
        let value = temper(self.state[self.index]);
        self.index = (self.index + 1) % N;
        value
    }

    fn twist(&mut self) {
        for i in 0..N {
            let x = (self.state[i] & UMASK) | (self.state[(i + 1) % N] & LMASK);
            let mut x_a = x >> 1;
            if x & 1 != 0 {
                x_a ^= A;
            }
            self.state[i] = self.state[(i + M) % N] ^ x_a;
        }
    }
}

fn seed_state(seed: u32) -> [u32; N] {
    let mut state = [0; N];
    state[0] = seed;
    for i in 1..N {
        let prev = state[i - 1];
        state[i] = F.wrapping_mul(prev ^ (prev >> (W - 2))).wrapping_add(i as u32);
    }
    state
}

pub fn temper(x: u32) -> u32 {
    let mut y = x ^ (x >> U);
    y ^= (y << S) & B;
    y ^= (y << T) & C;
    y ^ (y >> L)
}

/// Exact inverse of [`temper`].
pub fn untemper(value: u32) -> u32 {
    let mut v = invert_right_shift_xor(value, L);
    v = invert_left_shift_and_xor(v, T, C);
    v = invert_left_shift_and_xor(v, S, B);
    invert_right_shift_xor(v, U)
}

// Reverses x = y ^ (y >> shift).
// Bitwise, with bit 0 the most significant:
//      x[i] = y[i] ^ y[i - shift]
// The top `shift` bits of y pass through unchanged, and every bit after that
// can be recovered from one already known:
//      y[i] = x[i] ^ y[i - shift]
fn invert_right_shift_xor(x: u32, shift: u32) -> u32 {
    let mut y = x;
    for i in (0..(32 - shift)).rev() {
        let recovered_bit = (y >> (i + shift)) & 1;
        y ^= recovered_bit << i;
    }
    y
}

// Reverses x = y ^ ((y << shift) & mask).
// The low `shift` bits of y pass through unchanged; above that
//      y[i] = x[i] ^ (y[i - shift] & mask[i])
// counting from the least significant bit.
fn invert_left_shift_and_xor(x: u32, shift: u32, mask: u32) -> u32 {
    let mut y = x;
    for i in shift..32 {
        let recovered_bit = y >> (i - shift);
        let mask_bit = mask >> i;
        y ^= ((recovered_bit & mask_bit) & 1) << i;
    }
    y
}

/// Stream cipher keyed by a 16 bit seed. Each generator output is used as 4
/// little-endian keystream bytes.
pub fn mt19937_stream_xor(seed: u16, data: &[u8]) -> Vec<u8> {
    let mut rng = Mt19937::new(seed.into());
    let mut output = Vec::with_capacity(data.len());
    for chunk in data.chunks(4) {
        let keystream = rng.generate().to_le_bytes();
        output.extend(chunk.iter().zip(keystream).map(|(b, k)| b ^ k));
    }
    output
}
