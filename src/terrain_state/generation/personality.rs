//! # Terrain Personality
//!
//! Every threshold the terrain rules compare against is picked once per
//! world from its seed. The same seed always produces the same personality;
//! each parameter draws from its own seed fraction, so ranges can be tuned
//! independently.

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

use crate::terrain_state::noise::FloatRange;
use crate::terrain_state::voxels::PALETTE_LENGTH;

use super::Seed;

/// Optional rule variations, toggled per world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModPattern {
    /// Rock slot follows the stripe field.
    StripedRock = 0,
    /// High pattern density inside mountains becomes glass.
    GlassVeins,
    /// High stripe density inside mountains becomes air.
    StripeVoids,
    /// The pattern field is inverted before it is compared.
    InvertPattern,
    /// Floating formations are glass instead of rock.
    GlassFormations,
    /// Floating islands are glass instead of rock.
    GlassIslands,
    /// Rock slot climbs the palette with altitude.
    HeightGradient,
    /// Glass slot follows the pattern field.
    PatternGradient,
    /// The stripe field is folded around its midpoint.
    MirrorStripes,
    /// Beach suppression also protects mountain interiors.
    SolidBeaches,
    /// Mountain interiors hollow out with altitude.
    HollowMountains,
    /// The floor layer is glass.
    FloorGlass,
}

impl ModPattern {
    /// Every toggle in bit order.
    pub const ALL: [ModPattern; 12] = [
        ModPattern::StripedRock,
        ModPattern::GlassVeins,
        ModPattern::StripeVoids,
        ModPattern::InvertPattern,
        ModPattern::GlassFormations,
        ModPattern::GlassIslands,
        ModPattern::HeightGradient,
        ModPattern::PatternGradient,
        ModPattern::MirrorStripes,
        ModPattern::SolidBeaches,
        ModPattern::HollowMountains,
        ModPattern::FloorGlass,
    ];

    /// Name used for seed salts and logging.
    pub fn name(self) -> &'static str {
        match self {
            ModPattern::StripedRock => "striped_rock",
            ModPattern::GlassVeins => "glass_veins",
            ModPattern::StripeVoids => "stripe_voids",
            ModPattern::InvertPattern => "invert_pattern",
            ModPattern::GlassFormations => "glass_formations",
            ModPattern::GlassIslands => "glass_islands",
            ModPattern::HeightGradient => "height_gradient",
            ModPattern::PatternGradient => "pattern_gradient",
            ModPattern::MirrorStripes => "mirror_stripes",
            ModPattern::SolidBeaches => "solid_beaches",
            ModPattern::HollowMountains => "hollow_mountains",
            ModPattern::FloorGlass => "floor_glass",
        }
    }
}

/// The ranges personality parameters are drawn from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityRanges {
    /// Cave density above which voxels are carved.
    pub cave_break: FloatRange,
    /// Pattern density above which mountain voxels turn to glass.
    pub pattern_break: FloatRange,
    /// Stripe density above which mountain voxels turn to air.
    pub stripe_break: FloatRange,
    /// Exponent of the hollow curve over altitude.
    pub hollow_exponent: FloatRange,
    /// Hollow factor at the top of the curve.
    pub hollow_strength: FloatRange,
    /// Extra glass allowance subtracted from the pattern break.
    pub glass_increase: FloatRange,
    /// How many palette slots a full field swing spans.
    pub mod_scale: FloatRange,
    /// Horizontal stretch of the height fields.
    pub stretch: FloatRange,
    /// Vertical squish of the density fields.
    pub squish: FloatRange,
    /// Exponent shaping mountain peaks.
    pub peak_exponent: FloatRange,
    /// Width of the cave-density band that forms floating formations.
    pub formation_width: FloatRange,
    /// How far above the terrain surface formations reach, in voxels.
    pub formation_reach: FloatRange,
    /// Lower edge of the pattern-density band that forms islands.
    pub island_low: FloatRange,
    /// Width of the island band.
    pub island_width: FloatRange,
    /// Fraction of the world height islands start at.
    pub island_altitude: FloatRange,
    /// Probability of each mod pattern being enabled.
    pub pattern_chance: f64,
}

impl Default for PersonalityRanges {
    fn default() -> Self {
        PersonalityRanges {
            cave_break: FloatRange::new(0.55, 0.7),
            pattern_break: FloatRange::new(0.45, 0.65),
            stripe_break: FloatRange::new(0.4, 0.6),
            hollow_exponent: FloatRange::new(1.5, 3.0),
            hollow_strength: FloatRange::new(0.1, 0.35),
            glass_increase: FloatRange::new(0.0, 0.15),
            mod_scale: FloatRange::new(4.0, 12.0),
            stretch: FloatRange::new(0.8, 1.4),
            squish: FloatRange::new(0.6, 1.2),
            peak_exponent: FloatRange::new(1.0, 2.0),
            formation_width: FloatRange::new(0.02, 0.06),
            formation_reach: FloatRange::new(6.0, 20.0),
            island_low: FloatRange::new(0.7, 0.8),
            island_width: FloatRange::new(0.03, 0.08),
            island_altitude: FloatRange::new(0.6, 0.8),
            pattern_chance: 0.5,
        }
    }
}

/// A world's resolved terrain parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Personality {
    /// Cave carving threshold, normalised density.
    pub cave_break: f64,
    /// Glass threshold inside mountains.
    pub pattern_break: f64,
    /// Stripe-void threshold inside mountains.
    pub stripe_break: f64,
    /// Hollow curve exponent.
    pub hollow_exponent: f64,
    /// Hollow curve height.
    pub hollow_strength: f64,
    /// Glass allowance.
    pub glass_increase: f64,
    /// Palette slots per full field swing.
    pub mod_scale: f64,
    /// Horizontal stretch of the height fields.
    pub stretch: f64,
    /// Vertical squish of the density fields.
    pub squish: f64,
    /// Mountain peak exponent.
    pub peak_exponent: f64,
    /// Cave-density band forming floating formations.
    pub formation_band: (f64, f64),
    /// Voxels above the surface formations may reach.
    pub formation_reach: i32,
    /// Pattern-density band forming islands.
    pub island_band: (f64, f64),
    /// Fraction of world height islands start at.
    pub island_altitude: f64,
    /// First rock palette slot.
    pub rock_offset: u8,
    /// First glass palette slot.
    pub glass_offset: u8,
    patterns: BitArr!(for 12, in u16),
}

impl Personality {
    /// Resolves every range with its own seed fraction.
    pub fn derive(seed: &Seed, ranges: &PersonalityRanges) -> Self {
        let at = |range: &FloatRange, name: &str| range.at(seed.fraction(name));

        let cave_break = at(&ranges.cave_break, "personality.cave_break");
        let formation_width = at(&ranges.formation_width, "personality.formation_width");
        let island_low = at(&ranges.island_low, "personality.island_low");
        let island_width = at(&ranges.island_width, "personality.island_width");

        let mut patterns = bitarr![u16, Lsb0; 0; 12];
        for pattern in ModPattern::ALL {
            let salt = format!("pattern.{}", pattern.name());
            patterns.set(pattern as usize, seed.fraction(&salt) < ranges.pattern_chance);
        }

        let slot = |name: &str| (seed.fraction(name) * f64::from(PALETTE_LENGTH)) as u8 % PALETTE_LENGTH as u8;

        Personality {
            cave_break,
            pattern_break: at(&ranges.pattern_break, "personality.pattern_break"),
            stripe_break: at(&ranges.stripe_break, "personality.stripe_break"),
            hollow_exponent: at(&ranges.hollow_exponent, "personality.hollow_exponent"),
            hollow_strength: at(&ranges.hollow_strength, "personality.hollow_strength"),
            glass_increase: at(&ranges.glass_increase, "personality.glass_increase"),
            mod_scale: at(&ranges.mod_scale, "personality.mod_scale"),
            stretch: at(&ranges.stretch, "personality.stretch"),
            squish: at(&ranges.squish, "personality.squish"),
            peak_exponent: at(&ranges.peak_exponent, "personality.peak_exponent"),
            formation_band: (cave_break - formation_width, cave_break),
            formation_reach: at(&ranges.formation_reach, "personality.formation_reach").round() as i32,
            island_band: (island_low, island_low + island_width),
            island_altitude: at(&ranges.island_altitude, "personality.island_altitude"),
            rock_offset: slot("personality.rock_offset"),
            glass_offset: slot("personality.glass_offset"),
            patterns,
        }
    }

    /// Whether a toggle is on.
    pub fn has(&self, pattern: ModPattern) -> bool {
        self.patterns[pattern as usize]
    }

    /// Forces a toggle.
    pub fn set(&mut self, pattern: ModPattern, enabled: bool) {
        self.patterns.set(pattern as usize, enabled);
    }

    /// Names of the enabled toggles.
    pub fn enabled_patterns(&self) -> Vec<&'static str> {
        ModPattern::ALL
            .iter()
            .filter(|pattern| self.has(**pattern))
            .map(|pattern| pattern.name())
            .collect()
    }
}
