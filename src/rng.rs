use crate::types::Direction;

/// Seeded mulberry32 generator. Every random choice made by the engine goes
/// through this so that a run is fully reproducible from its seed.
#[derive(Clone, Debug)]
pub struct Rng {
    seed: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn next_f32(&mut self) -> f32 {
        self.seed = self.seed.wrapping_add(0x6d2b79f5);
        let mut t = self.seed;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        let out = t ^ (t >> 14);
        (out as f64 / 4_294_967_296.0) as f32
    }

    pub fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.next_f32() * len as f32).floor().min((len - 1) as f32) as usize
    }

    /// Fisher-Yates over the four directions.
    pub fn shuffled_directions(&mut self) -> [Direction; 4] {
        let mut dirs = Direction::ALL;
        for i in (1..dirs.len()).rev() {
            let j = self.pick_index(i + 1);
            dirs.swap(i, j);
        }
        dirs
    }
}
