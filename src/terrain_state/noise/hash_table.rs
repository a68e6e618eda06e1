//! # Permutation Table
//!
//! The single source of randomness for every noise kernel: the integers
//! 0..256 shuffled once from the world seed and stored twice in a row so that
//! nested lookups like `get(get(x) + y)` never need a second wrap.

/// Mask applied to lattice coordinates before the first lookup.
pub const HASH_MASK: i32 = 255;

/// Number of distinct entries before duplication.
const TABLE_SIZE: usize = 256;

/// A seeded 512-entry permutation table.
#[derive(Clone)]
pub struct HashTable {
    entries: [u8; TABLE_SIZE * 2],
}

impl HashTable {
    /// Builds the table with a Fisher-Yates shuffle driven by `seed`.
    ///
    /// # Arguments
    /// * `seed` - Usually [`crate::terrain_state::generation::Seed::hash`]
    ///
    /// # Returns
    /// A table whose second half mirrors its first.
    pub fn new(seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut permutation: [u8; TABLE_SIZE] = std::array::from_fn(|i| i as u8);
        for i in (1..TABLE_SIZE).rev() {
            let j = rng.usize(..=i);
            permutation.swap(i, j);
        }

        let mut entries = [0u8; TABLE_SIZE * 2];
        entries[..TABLE_SIZE].copy_from_slice(&permutation);
        entries[TABLE_SIZE..].copy_from_slice(&permutation);
        HashTable { entries }
    }

    /// Looks up entry `index`, masked to the table length.
    ///
    /// Any integer is accepted. Negative and oversized indices wrap, so
    /// callers never have to pre-validate input magnitude.
    #[inline]
    pub fn get(&self, index: i32) -> i32 {
        self.entries[(index & (TABLE_SIZE as i32 * 2 - 1)) as usize] as i32
    }

    /// The first few entries, handy for logging a world's identity.
    pub fn prefix(&self, len: usize) -> &[u8] {
        &self.entries[..len.min(TABLE_SIZE)]
    }
}

impl std::fmt::Debug for HashTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashTable")
            .field("prefix", &self.prefix(8))
            .finish()
    }
}
