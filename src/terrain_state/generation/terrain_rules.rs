//! # Terrain Rules
//!
//! Turns field values at a voxel into a block code.
//!
//! The rules form a priority chain; the first band a voxel falls in decides
//! its material:
//!
//! 1. Below the floor level: floor material, always solid
//! 2. At or below the terrain surface: ground rock unless a cave carves it,
//!    except inside the beach band where carving is suppressed
//! 3. At or below the mountain surface: carved by caves (more readily deep
//!    inside tall mountains, see [`TerrainRules::hollow`]), otherwise glass
//!    veins, stripe voids or rock
//! 4. Inside the formation band of the cave field, near the surface:
//!    floating formation
//! 5. Inside the island band of the pattern field, high up: floating island
//! 6. Air

use std::f64::consts::E;

use serde::{Deserialize, Serialize};

use crate::terrain_state::voxels::{BlockCode, BlockType, AIR, PALETTE_LENGTH};

use super::personality::{ModPattern, Personality};

/// Mountain voxels this far below the mountain surface count as interior.
pub const HOLLOW_DEPTH: i32 = 4;

/// Fraction of the world height above which hollowing tapers off.
pub const CEILING_TAPER: f64 = 0.85;

/// Fixed heights and amplitudes of the terrain, in voxels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Voxels below this height are always solid.
    pub floor_level: i32,
    /// Mean terrain surface height.
    pub base_height: i32,
    /// Terrain surface swing around the base height.
    pub terrain_amplitude: f64,
    /// Height mountains add on top of the terrain at full strength.
    pub mountain_amplitude: f64,
    /// Mountain noise (mapped to [0, 1]) below which there is no mountain.
    pub mountain_threshold: f64,
    /// Centre of the beach band.
    pub beach_height: i32,
    /// Half-width of the beach band.
    pub beach_band: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            floor_level: 4,
            base_height: 40,
            terrain_amplitude: 24.0,
            mountain_amplitude: 64.0,
            mountain_threshold: 0.55,
            beach_height: 36,
            beach_band: 3,
        }
    }
}

/// Surface heights of one (x, z) column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnHeights {
    /// Terrain surface.
    pub terrain: i32,
    /// Mountain surface, never below the terrain surface.
    pub mountain: i32,
}

/// Everything the rules read at one voxel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelInput {
    /// World height of the voxel.
    pub y: i32,
    /// Surface heights of its column.
    pub heights: ColumnHeights,
    /// Normalised cave density.
    pub cave: f64,
    /// Normalised pattern density.
    pub pattern: f64,
    /// Normalised stripe density.
    pub stripe: f64,
}

/// The rule chain bound to one world's configuration and personality.
#[derive(Clone, Copy, Debug)]
pub struct TerrainRules<'a> {
    terrain: &'a TerrainConfig,
    personality: &'a Personality,
    world_height: i32,
}

fn wrap_slot(slot: f64) -> u8 {
    (slot.floor() as i64).rem_euclid(i64::from(PALETTE_LENGTH)) as u8
}

impl<'a> TerrainRules<'a> {
    /// Binds the rules.
    ///
    /// # Arguments
    /// * `terrain` - Fixed heights
    /// * `personality` - Seed-derived thresholds and toggles
    /// * `world_height` - Column height in voxels
    pub fn new(terrain: &'a TerrainConfig, personality: &'a Personality, world_height: i32) -> Self {
        TerrainRules {
            terrain,
            personality,
            world_height: world_height.max(1),
        }
    }

    /// Surface heights from the raw height-field samples, both in [-1, 1].
    pub fn heights(&self, terrain_noise: f64, mountain_noise: f64) -> ColumnHeights {
        let terrain = (f64::from(self.terrain.base_height) + self.terrain.terrain_amplitude * terrain_noise).round() as i32;

        let threshold = self.terrain.mountain_threshold.clamp(0.0, 0.999);
        let strength = (((mountain_noise + 1.0) / 2.0 - threshold).max(0.0) / (1.0 - threshold))
            .powf(self.personality.peak_exponent);
        let mountain = terrain + (self.terrain.mountain_amplitude * strength).round() as i32;

        ColumnHeights { terrain, mountain }
    }

    /// How much readier interior mountain voxels are to be carved at `y`.
    ///
    /// Grows as a power of altitude, then eases back to zero over the top
    /// of the world along `ln(1 + u(e - 1))`.
    pub fn hollow(&self, y: i32) -> f64 {
        let p = self.personality;
        let t = (f64::from(y) / f64::from(self.world_height)).clamp(0.0, 1.0);
        let mut value = t.powf(p.hollow_exponent) * p.hollow_strength;
        if t > CEILING_TAPER {
            let u = (1.0 - t) / (1.0 - CEILING_TAPER);
            value *= (1.0 + u * (E - 1.0)).ln();
        }
        value
    }

    fn stripe(&self, input: &VoxelInput) -> f64 {
        if self.personality.has(ModPattern::MirrorStripes) {
            (2.0 * input.stripe - 1.0).abs()
        } else {
            input.stripe
        }
    }

    fn pattern(&self, input: &VoxelInput) -> f64 {
        if self.personality.has(ModPattern::InvertPattern) {
            1.0 - input.pattern
        } else {
            input.pattern
        }
    }

    fn rock(&self, input: &VoxelInput) -> BlockCode {
        let p = self.personality;
        let mut slot = f64::from(p.rock_offset);
        if p.has(ModPattern::HeightGradient) {
            slot += f64::from(input.y) / f64::from(self.world_height) * f64::from(PALETTE_LENGTH);
        }
        if p.has(ModPattern::StripedRock) {
            slot += self.stripe(input) * p.mod_scale;
        }
        BlockType::ROCK(wrap_slot(slot)).code()
    }

    fn glass(&self, input: &VoxelInput) -> BlockCode {
        let p = self.personality;
        let mut slot = f64::from(p.glass_offset);
        if p.has(ModPattern::PatternGradient) {
            slot += self.pattern(input) * p.mod_scale;
        }
        BlockType::GLASS(wrap_slot(slot)).code()
    }

    fn floating(&self, input: &VoxelInput, glass: bool) -> BlockCode {
        if glass {
            self.glass(input)
        } else {
            self.rock(input)
        }
    }

    /// The block at one voxel.
    pub fn block_at(&self, input: &VoxelInput) -> BlockCode {
        let p = self.personality;
        let y = input.y;
        let heights = input.heights;

        if y < self.terrain.floor_level {
            return self.floating(input, p.has(ModPattern::FloorGlass));
        }

        let in_beach = (y - self.terrain.beach_height).abs() <= self.terrain.beach_band;

        if y <= heights.terrain {
            return if in_beach || input.cave <= p.cave_break {
                self.rock(input)
            } else {
                AIR
            };
        }

        if y <= heights.mountain {
            let protected = in_beach && p.has(ModPattern::SolidBeaches);
            let hollow = if y < heights.mountain - HOLLOW_DEPTH && p.has(ModPattern::HollowMountains) {
                self.hollow(y)
            } else {
                0.0
            };
            if !protected && input.cave > p.cave_break - hollow {
                return AIR;
            }
            if p.has(ModPattern::GlassVeins) && self.pattern(input) > p.pattern_break - p.glass_increase {
                return self.glass(input);
            }
            if !protected && p.has(ModPattern::StripeVoids) && self.stripe(input) > p.stripe_break {
                return AIR;
            }
            return self.rock(input);
        }

        let (low, high) = p.formation_band;
        if y <= heights.mountain + p.formation_reach && input.cave >= low && input.cave < high {
            return self.floating(input, p.has(ModPattern::GlassFormations));
        }

        let (low, high) = p.island_band;
        let pattern = self.pattern(input);
        if f64::from(y) >= p.island_altitude * f64::from(self.world_height) && pattern >= low && pattern < high {
            return self.floating(input, p.has(ModPattern::GlassIslands));
        }

        AIR
    }
}
