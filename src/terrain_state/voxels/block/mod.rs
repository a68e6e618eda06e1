//! # Block Module
//!
//! Block codes and their decoded form.
//!
//! Voxels are stored as a compact [`BlockCode`]. The code space is split as
//! follows:
//!
//! | Code                        | Meaning                          |
//! |-----------------------------|----------------------------------|
//! | `0..32`                     | rock, palette slot = code        |
//! | `32..64`                    | glass, palette slot = code - 32  |
//! | [`AIR`] (`u16::MAX - 1`)    | empty space                      |
//! | [`NULL`] (`u16::MAX`)       | no data, e.g. an unloaded chunk  |
//!
//! Every other value decodes as [`BlockType::NULL`], so a corrupted or
//! foreign code can never render as a material.

pub mod block_side;

/// The integer type voxels are stored as.
pub type BlockCode = u16;

/// Number of entries in each of the rock and glass palette families.
pub const PALETTE_LENGTH: BlockCode = 32;

/// Sentinel for "no data here".
pub const NULL: BlockCode = u16::MAX;

/// Sentinel for empty space.
pub const AIR: BlockCode = u16::MAX - 1;

/// Decoded block code.
///
/// Behaviour that used to hang off block subclasses (solidity, face
/// visibility, colour) dispatches on this tag instead.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// No data: an unloaded neighbour or an invalid code.
    NULL,
    /// Empty space.
    AIR,
    /// Opaque rock with its palette slot.
    ROCK(u8),
    /// Transparent glass with its palette slot.
    GLASS(u8),
}

impl BlockType {
    /// Decodes a stored code.
    pub fn from_code(code: BlockCode) -> Self {
        match code {
            AIR => BlockType::AIR,
            c if c < PALETTE_LENGTH => BlockType::ROCK(c as u8),
            c if c < PALETTE_LENGTH * 2 => BlockType::GLASS((c - PALETTE_LENGTH) as u8),
            _ => BlockType::NULL,
        }
    }

    /// Encodes back into a stored code. Slots wrap into the palette.
    pub fn code(self) -> BlockCode {
        match self {
            BlockType::NULL => NULL,
            BlockType::AIR => AIR,
            BlockType::ROCK(slot) => slot as BlockCode % PALETTE_LENGTH,
            BlockType::GLASS(slot) => slot as BlockCode % PALETTE_LENGTH + PALETTE_LENGTH,
        }
    }

    /// Rock or glass.
    pub fn is_solid(self) -> bool {
        matches!(self, BlockType::ROCK(_) | BlockType::GLASS(_))
    }

    /// Rock only.
    pub fn is_opaque(self) -> bool {
        matches!(self, BlockType::ROCK(_))
    }

    /// Index into the 64-entry palette, `None` for the sentinels.
    pub fn palette_slot(self) -> Option<usize> {
        match self {
            BlockType::ROCK(slot) => Some(slot as usize % PALETTE_LENGTH as usize),
            BlockType::GLASS(slot) => {
                Some((slot as usize % PALETTE_LENGTH as usize) + PALETTE_LENGTH as usize)
            }
            BlockType::NULL | BlockType::AIR => None,
        }
    }
}

impl From<BlockCode> for BlockType {
    fn from(code: BlockCode) -> Self {
        BlockType::from_code(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_codes_decode_exhaustively() {
        for code in 0..PALETTE_LENGTH * 2 {
            let block = BlockType::from_code(code);
            match block {
                BlockType::ROCK(slot) => assert!(code < PALETTE_LENGTH && slot as u16 == code),
                BlockType::GLASS(slot) => {
                    assert!(code >= PALETTE_LENGTH && slot as u16 == code - PALETTE_LENGTH)
                }
                other => panic!("code {code} decoded as {other:?}"),
            }
            assert_eq!(block.code(), code);
            assert_ne!(code, NULL);
            assert_ne!(code, AIR);
        }
    }

    #[test]
    fn sentinels_are_distinct_and_stable() {
        assert_ne!(NULL, AIR);
        assert_eq!(BlockType::from_code(NULL), BlockType::NULL);
        assert_eq!(BlockType::from_code(AIR), BlockType::AIR);
        assert_eq!(BlockType::NULL.code(), NULL);
        assert_eq!(BlockType::AIR.code(), AIR);
    }

    #[test]
    fn foreign_codes_are_null() {
        for code in [64, 100, 4096, u16::MAX - 2] {
            assert_eq!(BlockType::from_code(code), BlockType::NULL);
        }
    }

    #[test]
    fn only_materials_have_palette_slots() {
        assert_eq!(BlockType::ROCK(3).palette_slot(), Some(3));
        assert_eq!(BlockType::GLASS(3).palette_slot(), Some(35));
        assert_eq!(BlockType::AIR.palette_slot(), None);
        assert!(!BlockType::NULL.is_solid());
        assert!(BlockType::GLASS(0).is_solid() && !BlockType::GLASS(0).is_opaque());
    }
}
