//! # World Context
//!
//! Everything derived once from a world's configuration and seed: the
//! permutation table, palette, personality and resolved noise fields.
//! A context is immutable after construction and shared by every task
//! through an `Arc`.

use std::sync::Arc;

use log::info;

use crate::config::WorldConfig;
use crate::error::TerrainResult;
use crate::terrain_state::noise::{BoundNoise, FractalNoise, HashTable, NoiseOptions};

use super::{
    palette::Palette,
    personality::Personality,
    sample_set::FieldKind,
    terrain_rules::{TerrainConfig, TerrainRules},
    Seed,
};

/// Every field with its seed-dependent choices made.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldSet {
    /// 2D terrain surface height.
    pub terrain_height: FractalNoise,
    /// 2D mountain height.
    pub mountain_height: FractalNoise,
    /// 3D cave density.
    pub cave: FractalNoise,
    /// 3D pattern density.
    pub pattern: FractalNoise,
    /// 3D stripe density.
    pub stripe: FractalNoise,
    /// 2D spawn intensity.
    pub spawn: FractalNoise,
}

impl FieldSet {
    /// The dense field of a kind.
    pub fn dense(&self, kind: FieldKind) -> &FractalNoise {
        match kind {
            FieldKind::Cave => &self.cave,
            FieldKind::Pattern => &self.pattern,
            FieldKind::Stripe => &self.stripe,
        }
    }
}

/// Everything derived from a world's seed and configuration.
///
/// Built once per world and shared with every task through an `Arc`. Two
/// contexts with different seeds can coexist in one process.
#[derive(Debug)]
pub struct WorldContext {
    /// The hashed seed.
    pub seed: Seed,
    /// Permutation table shared by every noise kernel.
    pub table: Arc<HashTable>,
    /// Block colours.
    pub palette: Palette,
    /// Seed-derived terrain thresholds.
    pub personality: Personality,
    /// Resolved noise fields.
    pub fields: FieldSet,
    /// Fixed terrain heights.
    pub terrain: TerrainConfig,
    /// Vertical coarse sampling stride.
    pub sample_rate: i32,
    /// Chunks per column.
    pub height_in_chunks: i32,
}

fn resolve(seed: &Seed, name: &str, options: &NoiseOptions) -> FractalNoise {
    options.resolve(seed.fraction(&format!("field.{name}")))
}

impl WorldContext {
    /// Validates `config` and derives the world from it.
    pub fn new(config: &WorldConfig) -> TerrainResult<Self> {
        config.validate()?;

        let seed = Seed::from(&config.seed);
        let personality = Personality::derive(&seed, &config.personality);
        let f = &config.fields;

        // Height fields sample (x, z) through their first two axes.
        let mut terrain_height = resolve(&seed, "terrain_height", &f.terrain_height);
        let mut mountain_height = resolve(&seed, "mountain_height", &f.mountain_height);
        for field in [&mut terrain_height, &mut mountain_height] {
            field.stretch[0] /= personality.stretch;
            field.stretch[1] /= personality.stretch;
        }
        let mut cave = resolve(&seed, "cave", &f.cave);
        let mut pattern = resolve(&seed, "pattern", &f.pattern);
        let mut stripe = resolve(&seed, "stripe", &f.stripe);
        for field in [&mut cave, &mut pattern, &mut stripe] {
            field.stretch[1] *= personality.squish;
        }

        let context = WorldContext {
            table: Arc::new(HashTable::new(seed.hash())),
            palette: Palette::generate(&seed),
            fields: FieldSet {
                terrain_height,
                mountain_height,
                cave,
                pattern,
                stripe,
                spawn: resolve(&seed, "spawn", &f.spawn),
            },
            personality,
            terrain: config.terrain.clone(),
            sample_rate: config.sample_rate,
            height_in_chunks: config.height_in_chunks,
            seed,
        };

        info!(
            "Created world {} (seed value {:.6}), personality patterns: {:?}",
            config.seed,
            context.seed.value(),
            context.personality.enabled_patterns()
        );
        Ok(context)
    }

    /// World height in voxels.
    pub fn world_height(&self) -> i32 {
        self.height_in_chunks * crate::terrain_state::voxels::CHUNK_DIMENSION
    }

    /// The terrain rules of this world.
    pub fn rules(&self) -> TerrainRules<'_> {
        TerrainRules::new(&self.terrain, &self.personality, self.world_height())
    }

    /// A dense field bound to this world's table, usable as a `noise::NoiseFn`.
    pub fn bound_field(&self, kind: FieldKind) -> BoundNoise {
        BoundNoise::new(self.table.clone(), *self.fields.dense(kind))
    }
}

#[cfg(test)]
mod tests {
    use noise::NoiseFn;

    use super::*;
    use crate::terrain_state::generation::SeedSource;
    use crate::terrain_state::noise::NoiseMethod;

    fn config(seed: &str) -> WorldConfig {
        WorldConfig {
            seed: SeedSource::Text(seed.into()),
            ..Default::default()
        }
    }

    #[test]
    fn contexts_are_independent() {
        let a = WorldContext::new(&config("north")).unwrap();
        let b = WorldContext::new(&config("south")).unwrap();
        let again = WorldContext::new(&config("north")).unwrap();
        assert_ne!(a.table.prefix(16), b.table.prefix(16));
        assert_eq!(a.table.prefix(16), again.table.prefix(16));
        assert_eq!(a.fields, again.fields);
        assert_eq!(a.palette, again.palette);
    }

    #[test]
    fn personality_shapes_the_fields() {
        let context = WorldContext::new(&config("north")).unwrap();
        let squish = context.personality.squish;
        assert!((context.fields.cave.stretch[1] - squish).abs() < 1e-12);
        let stretch = context.personality.stretch;
        assert!((context.fields.terrain_height.stretch[0] - 1.0 / stretch).abs() < 1e-12);
        assert_eq!(context.fields.terrain_height.method, NoiseMethod::PERLIN_2D);
    }

    #[test]
    fn bound_fields_agree_with_direct_sampling() {
        let context = WorldContext::new(&config("north")).unwrap();
        let bound = context.bound_field(FieldKind::Cave);
        let point = cgmath::Point3::new(12.0, 40.0, -7.0);
        let direct = context.fields.cave.sample(&context.table, point).value;
        assert_eq!(bound.get([12.0, 40.0, -7.0]), direct);
    }

    #[test]
    fn invalid_configs_fail() {
        let bad = WorldConfig {
            sample_rate: 5,
            ..Default::default()
        };
        assert!(WorldContext::new(&bad).is_err());
    }
}
