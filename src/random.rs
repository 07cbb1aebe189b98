use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Where RND gets its bytes from. Injected so tests can pin the sequence.
pub trait RandomSource {
    fn next_byte(&mut self) -> u8;
}

impl RandomSource for StdRng {
    fn next_byte(&mut self) -> u8 {
        self.gen::<u8>()
    }
}

/// a fixed sequence for `Some(seed)`, OS entropy otherwise
pub fn std_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// replays a fixed list of bytes, round and round
#[cfg(test)]
pub struct Replay {
    bytes: Vec<u8>,
    pos: usize,
}

#[cfg(test)]
impl Replay {
    pub fn new(bytes: &[u8]) -> Self {
        Replay {
            bytes: bytes.to_vec(),
            pos: 0,
        }
    }
}

#[cfg(test)]
impl RandomSource for Replay {
    fn next_byte(&mut self) -> u8 {
        let b = self.bytes[self.pos % self.bytes.len()];
        self.pos += 1;
        b
    }
}
