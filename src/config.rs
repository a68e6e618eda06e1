//! # World Configuration
//!
//! Everything a world is built from, loadable from JSON. Every field has a
//! default, so a document only needs the values it changes:
//!
//! ```json
//! { "seed": "TESTSEED1", "height_in_chunks": 6, "multithreading": false }
//! ```

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};
use crate::terrain_state::generation::{PersonalityRanges, SeedSource, TerrainConfig};
use crate::terrain_state::noise::{FloatRange, NoiseMethod, NoiseMethodType, NoiseOptions};
use crate::terrain_state::voxels::CHUNK_DIMENSION;

/// Noise configuration of every field the generator reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// 2D terrain surface height.
    pub terrain_height: NoiseOptions,
    /// 2D mountain height.
    pub mountain_height: NoiseOptions,
    /// 3D cave density.
    pub cave: NoiseOptions,
    /// 3D pattern (glass) density.
    pub pattern: NoiseOptions,
    /// 3D stripe density.
    pub stripe: NoiseOptions,
    /// 2D spawn intensity.
    pub spawn: NoiseOptions,
}

impl Default for FieldConfig {
    fn default() -> Self {
        use NoiseMethodType::*;
        FieldConfig {
            terrain_height: NoiseOptions::new(
                NoiseMethod::PERLIN_2D,
                FloatRange::new(0.004, 0.008),
                4,
                2.0,
                0.5,
                1.0,
            )
            .with_drift(0.5, 0.002),
            mountain_height: NoiseOptions::new(
                NoiseMethod::new(Simplex, 2),
                FloatRange::new(0.002, 0.004),
                3,
                2.0,
                0.5,
                1.0,
            ),
            cave: NoiseOptions::new(NoiseMethod::SIMPLEX_3D, FloatRange::new(0.02, 0.035), 3, 2.0, 0.5, 100.0),
            pattern: NoiseOptions::new(
                NoiseMethod::new(SimplexValue, 3),
                FloatRange::new(0.03, 0.06),
                2,
                2.0,
                0.5,
                100.0,
            ),
            stripe: NoiseOptions::new(NoiseMethod::new(Value, 3), FloatRange::new(0.05, 0.1), 2, 2.0, 0.5, 100.0)
                .with_stretch([0.1, 1.0, 0.1]),
            spawn: NoiseOptions::new(NoiseMethod::PERLIN_2D, FloatRange::new(0.01, 0.02), 2, 2.0, 0.5, 255.0)
                .with_drift(0.3, 0.005),
        }
    }
}

impl FieldConfig {
    /// Every field with its name, in a fixed order.
    pub fn named(&self) -> [(&'static str, &NoiseOptions); 6] {
        [
            ("terrain_height", &self.terrain_height),
            ("mountain_height", &self.mountain_height),
            ("cave", &self.cave),
            ("pattern", &self.pattern),
            ("stripe", &self.stripe),
            ("spawn", &self.spawn),
        ]
    }
}

/// Top-level world configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed, integer or text.
    pub seed: SeedSource,
    /// Chunks per column.
    pub height_in_chunks: i32,
    /// Vertical coarse sampling stride; horizontal stride is twice this.
    pub sample_rate: i32,
    /// Run tasks on worker threads instead of inline.
    pub multithreading: bool,
    /// Worker thread count; derived from the machine when absent.
    pub worker_count: Option<usize>,
    /// Time a task may run per step, in microseconds. Zero is unbounded.
    pub step_budget_micros: u64,
    /// Inline work per frame, in microseconds. Zero is unbounded.
    pub frame_budget_micros: u64,
    /// Chunks remembered as recently meshed.
    pub mesh_cache_capacity: usize,
    /// Fixed terrain heights.
    pub terrain: TerrainConfig,
    /// Noise fields.
    pub fields: FieldConfig,
    /// Personality parameter ranges.
    pub personality: PersonalityRanges,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            seed: SeedSource::default(),
            height_in_chunks: 8,
            sample_rate: 4,
            multithreading: true,
            worker_count: None,
            step_budget_micros: 2_000,
            frame_budget_micros: 8_000,
            mesh_cache_capacity: 256,
            terrain: TerrainConfig::default(),
            fields: FieldConfig::default(),
            personality: PersonalityRanges::default(),
        }
    }
}

impl WorldConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(text: &str) -> TerrainResult<Self> {
        let config: WorldConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> TerrainResult<Self> {
        let path = path.as_ref();
        info!("Loading world configuration from {}", path.display());
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Serialises back to pretty JSON.
    pub fn to_json_string(&self) -> TerrainResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// World height in voxels.
    pub fn world_height(&self) -> i32 {
        self.height_in_chunks * CHUNK_DIMENSION
    }

    /// Rejects values the generator cannot honour.
    pub fn validate(&self) -> TerrainResult<()> {
        let invalid = |reason: String| Err(TerrainError::InvalidConfig(reason));

        if self.height_in_chunks < 1 {
            return invalid(format!("height_in_chunks must be at least 1, got {}", self.height_in_chunks));
        }
        if self.sample_rate < 1 || CHUNK_DIMENSION % (self.sample_rate * 2) != 0 {
            return invalid(format!(
                "sample_rate {} must be positive with twice it dividing the chunk size {CHUNK_DIMENSION}",
                self.sample_rate
            ));
        }
        if self.worker_count == Some(0) && self.multithreading {
            return invalid("worker_count must be positive when multithreading".into());
        }
        if self.mesh_cache_capacity == 0 {
            return invalid("mesh_cache_capacity must be positive".into());
        }

        let terrain = &self.terrain;
        if terrain.floor_level < 0 || terrain.floor_level >= self.world_height() {
            return invalid(format!(
                "floor_level {} must lie inside the world height {}",
                terrain.floor_level,
                self.world_height()
            ));
        }
        if !(0.0..1.0).contains(&terrain.mountain_threshold) {
            return invalid(format!("mountain_threshold {} must be in [0, 1)", terrain.mountain_threshold));
        }
        if terrain.beach_band < 0 {
            return invalid("beach_band must not be negative".into());
        }
        if !(0.0..=1.0).contains(&self.personality.pattern_chance) {
            return invalid("personality.pattern_chance must be in [0, 1]".into());
        }

        for (name, options) in self.fields.named() {
            options.validate(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        WorldConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_documents_fill_in_defaults() {
        let config = WorldConfig::from_json_str(r#"{ "seed": "TESTSEED1", "height_in_chunks": 6 }"#).unwrap();
        assert_eq!(config.seed, SeedSource::Text("TESTSEED1".into()));
        assert_eq!(config.height_in_chunks, 6);
        assert_eq!(config.sample_rate, 4);
        assert_eq!(config.fields, FieldConfig::default());

        let numeric = WorldConfig::from_json_str(r#"{ "seed": 42 }"#).unwrap();
        assert_eq!(numeric.seed, SeedSource::Number(42));
    }

    #[test]
    fn round_trips_through_json() {
        let config = WorldConfig::default();
        let text = config.to_json_string().unwrap();
        assert_eq!(WorldConfig::from_json_str(&text).unwrap(), config);
    }

    #[test]
    fn bad_values_are_rejected() {
        let reject = |text: &str| {
            assert!(matches!(
                WorldConfig::from_json_str(text),
                Err(TerrainError::InvalidConfig(_))
            ))
        };
        reject(r#"{ "sample_rate": 3 }"#);
        reject(r#"{ "sample_rate": 0 }"#);
        reject(r#"{ "height_in_chunks": 0 }"#);
        reject(r#"{ "terrain": { "mountain_threshold": 1.0 } }"#);
        reject(r#"{ "fields": { "cave": { "method": { "kind": "simplex", "dimensions": 3 }, "frequency": { "min": 0.02, "max": 0.03 }, "octaves": 9, "lacunarity": 2.0, "persistence": 0.5, "scale": 100.0 } } }"#);
        reject(r#"{ "fields": { "cave": { "method": { "kind": "simplex", "dimensions": 3 }, "frequency": { "min": 0.02, "max": 0.03 }, "octaves": 2, "lacunarity": 2.0, "persistence": -1.0, "scale": 100.0 } } }"#);
        reject(r#"{ "fields": { "stripe": { "method": { "kind": "value", "dimensions": 3 }, "frequency": { "min": 0.02, "max": 0.03 }, "octaves": 3, "lacunarity": 2.0, "persistence": 0.0, "scale": 10.0 } } }"#);
    }

    #[test]
    fn malformed_documents_are_config_errors() {
        assert!(matches!(
            WorldConfig::from_json_str("{ seed"),
            Err(TerrainError::Config(_))
        ));
    }
}
