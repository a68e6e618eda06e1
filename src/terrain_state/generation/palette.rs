//! # Palette
//!
//! The world's 64 block colours: a 32-step rock gradient and a 32-step glass
//! gradient, each running between two seed-picked HSV endpoints.
//!
//! Colours are laid out in a 64×3 atlas. Row 0 holds top faces, row 1 side
//! faces and row 2 bottom faces, each progressively darker, so a face's tile
//! index is `row * 64 + slot`.

use image::{Rgb, RgbImage};

use crate::terrain_state::noise::interpolation::lerp;
use crate::terrain_state::voxels::{BlockCode, BlockSide, BlockType, PALETTE_LENGTH};

use super::Seed;

const SLOTS: usize = PALETTE_LENGTH as usize * 2;
const SHADES: [f32; 3] = [1.0, 0.82, 0.6];

/// Texture placement of one quad.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceUvs {
    /// Atlas tile: shade row times 64 plus palette slot.
    pub tile: u32,
    /// Corner coordinates in tile-repeat space, counter-clockwise from the
    /// minimum corner.
    pub uvs: [[f32; 2]; 4],
}

/// The 64-entry colour table of a world.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: [Rgb<u8>; SLOTS],
}

fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> Rgb<u8> {
    let hue = hue.rem_euclid(1.0) * 6.0;
    let sector = hue.floor();
    let f = hue - sector;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * f);
    let t = value * (1.0 - saturation * (1.0 - f));
    let (r, g, b) = match sector as u8 {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };
    let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb([channel(r), channel(g), channel(b)])
}

fn gradient(seed: &Seed, family: &str, saturation: (f64, f64), value: (f64, f64)) -> Vec<Rgb<u8>> {
    let fraction = |name: &str| seed.fraction(&format!("palette.{family}.{name}"));
    let start_hue = fraction("hue");
    let end_hue = start_hue + lerp(-0.25, 0.25, fraction("hue_shift"));
    let start = (lerp(saturation.0, saturation.1, fraction("sat_start")), lerp(value.0, value.1, fraction("val_start")));
    let end = (lerp(saturation.0, saturation.1, fraction("sat_end")), lerp(value.0, value.1, fraction("val_end")));

    (0..PALETTE_LENGTH)
        .map(|slot| {
            let t = f64::from(slot) / f64::from(PALETTE_LENGTH - 1);
            hsv_to_rgb(
                lerp(start_hue, end_hue, t),
                lerp(start.0, end.0, t),
                lerp(start.1, end.1, t),
            )
        })
        .collect()
}

impl Palette {
    /// Synthesises the rock and glass gradients for a seed.
    pub fn generate(seed: &Seed) -> Self {
        let mut colors = [Rgb([0, 0, 0]); SLOTS];
        let rock = gradient(seed, "rock", (0.15, 0.45), (0.35, 0.8));
        let glass = gradient(seed, "glass", (0.45, 0.9), (0.6, 1.0));
        for (slot, color) in rock.into_iter().chain(glass).enumerate() {
            colors[slot] = color;
        }
        Palette { colors }
    }

    /// Colour of a block code, `None` for air and null.
    pub fn get_color(&self, code: BlockCode) -> Option<Rgb<u8>> {
        BlockType::from_code(code)
            .palette_slot()
            .map(|slot| self.colors[slot])
    }

    /// Every colour, rock slots first.
    pub fn colors(&self) -> &[Rgb<u8>] {
        &self.colors
    }

    /// Atlas tile of a block face.
    pub fn tile_index(&self, code: BlockCode, side: BlockSide) -> Option<u32> {
        BlockType::from_code(code)
            .palette_slot()
            .map(|slot| side.shade_row() * SLOTS as u32 + slot as u32)
    }

    /// Tile and repeat-space coordinates for a `width` × `height` face.
    ///
    /// Returns `None` for codes without a colour.
    pub fn face_uvs(&self, code: BlockCode, side: BlockSide, width: u32, height: u32) -> Option<FaceUvs> {
        let tile = self.tile_index(code, side)?;
        let (w, h) = (width as f32, height as f32);
        Some(FaceUvs {
            tile,
            uvs: [[0.0, 0.0], [w, 0.0], [w, h], [0.0, h]],
        })
    }

    /// Renders the atlas: 64 columns, one shade row per face class.
    pub fn atlas_image(&self) -> RgbImage {
        RgbImage::from_fn(SLOTS as u32, SHADES.len() as u32, |x, y| {
            let Rgb([r, g, b]) = self.colors[x as usize];
            let shade = SHADES[y as usize];
            let scale = |c: u8| (f32::from(c) * shade).round() as u8;
            Rgb([scale(r), scale(g), scale(b)])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain_state::voxels::{AIR, NULL};

    #[test]
    fn palettes_are_seeded() {
        let a = Palette::generate(&Seed::from("amber"));
        assert_eq!(a, Palette::generate(&Seed::from("amber")));
        assert_ne!(a, Palette::generate(&Seed::from("jade")));
    }

    #[test]
    fn sentinels_have_no_colour() {
        let palette = Palette::generate(&Seed::from("amber"));
        assert_eq!(palette.get_color(AIR), None);
        assert_eq!(palette.get_color(NULL), None);
        assert!(palette.face_uvs(AIR, BlockSide::TOP, 1, 1).is_none());
        for code in 0..PALETTE_LENGTH * 2 {
            assert_eq!(palette.get_color(code), Some(palette.colors()[code as usize]));
        }
    }

    #[test]
    fn tiles_follow_shade_rows() {
        let palette = Palette::generate(&Seed::from("amber"));
        let glass = BlockType::GLASS(3).code();
        assert_eq!(palette.tile_index(glass, BlockSide::TOP), Some(35));
        assert_eq!(palette.tile_index(glass, BlockSide::LEFT), Some(64 + 35));
        assert_eq!(palette.tile_index(glass, BlockSide::BOTTOM), Some(128 + 35));

        let uvs = palette.face_uvs(0, BlockSide::FRONT, 3, 2).unwrap();
        assert_eq!(uvs.uvs, [[0.0, 0.0], [3.0, 0.0], [3.0, 2.0], [0.0, 2.0]]);
    }

    #[test]
    fn atlas_rows_darken() {
        let palette = Palette::generate(&Seed::from("amber"));
        let atlas = palette.atlas_image();
        assert_eq!(atlas.dimensions(), (64, 3));
        assert_eq!(*atlas.get_pixel(5, 0), palette.colors()[5]);
        let top: u32 = atlas.get_pixel(40, 0).0.iter().map(|c| u32::from(*c)).sum();
        let bottom: u32 = atlas.get_pixel(40, 2).0.iter().map(|c| u32::from(*c)).sum();
        assert!(bottom <= top);
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Rgb([255, 0, 0]));
        assert_eq!(hsv_to_rgb(0.5, 1.0, 1.0), Rgb([0, 255, 255]));
        assert_eq!(hsv_to_rgb(0.5, 0.0, 0.5), Rgb([128, 128, 128]));
    }
}
