//! Memoised face texture placement.
//!
//! A chunk mesh repeats the same handful of (material, direction, size)
//! combinations many times, so each build keeps a small LRU of the palette
//! lookups it has already made.

use std::num::NonZeroUsize;

use lru::LruCache;

use crate::terrain_state::generation::{FaceUvs, Palette};
use crate::terrain_state::voxels::{BlockCode, BlockSide};

/// Entries kept per build.
pub const UV_CACHE_CAPACITY: usize = 256;

type UvKey = (BlockCode, BlockSide, u32, u32);

/// An LRU of [`Palette::face_uvs`] results keyed by code, side, width and height.
pub struct UvCache<'a> {
    palette: &'a Palette,
    entries: LruCache<UvKey, FaceUvs>,
    hits: usize,
    misses: usize,
}

impl<'a> UvCache<'a> {
    /// Creates an empty cache over `palette`.
    pub fn new(palette: &'a Palette, capacity: usize) -> Self {
        UvCache {
            palette,
            entries: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            hits: 0,
            misses: 0,
        }
    }

    /// Texture placement of a `width` x `height` face.
    ///
    /// # Returns
    /// `None` for codes without a colour (air and null).
    pub fn face_uvs(&mut self, code: BlockCode, side: BlockSide, width: u32, height: u32) -> Option<FaceUvs> {
        let key = (code, side, width, height);
        if let Some(uvs) = self.entries.get(&key) {
            self.hits += 1;
            return Some(*uvs);
        }
        self.misses += 1;
        let uvs = self.palette.face_uvs(code, side, width, height)?;
        self.entries.put(key, uvs);
        Some(uvs)
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Lookups that went to the palette.
    pub fn misses(&self) -> usize {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain_state::generation::Seed;
    use crate::terrain_state::voxels::AIR;

    #[test]
    fn repeated_keys_hit() {
        let palette = Palette::generate(&Seed::from("uv"));
        let mut cache = UvCache::new(&palette, 4);
        let first = cache.face_uvs(3, BlockSide::TOP, 2, 5).unwrap();
        let second = cache.face_uvs(3, BlockSide::TOP, 2, 5).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, palette.face_uvs(3, BlockSide::TOP, 2, 5).unwrap());
        assert_eq!((cache.hits(), cache.misses()), (1, 1));

        cache.face_uvs(3, BlockSide::BOTTOM, 2, 5).unwrap();
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn colourless_codes_miss() {
        let palette = Palette::generate(&Seed::from("uv"));
        let mut cache = UvCache::new(&palette, 4);
        assert_eq!(cache.face_uvs(AIR, BlockSide::TOP, 1, 1), None);
    }
}
