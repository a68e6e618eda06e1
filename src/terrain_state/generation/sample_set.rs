//! # Sample Sets
//!
//! The density fields and spawn data generated for one column, and the pool
//! their buffers are recycled through.

use cgmath::Point3;
use phf::phf_map;

use crate::core::{BufferPool, MtResource};

use super::{context::FieldSet, region::Region, sample_region::SampleRegion};

/// The dense fields a column samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Cave voids and floating formations.
    Cave,
    /// Glass veins and islands.
    Pattern,
    /// Rock banding and stripe voids.
    Stripe,
}

static FIELD_NAMES: phf::Map<&'static str, FieldKind> = phf_map! {
    "cave" => FieldKind::Cave,
    "pattern" => FieldKind::Pattern,
    "glass" => FieldKind::Pattern,
    "stripe" => FieldKind::Stripe,
};

impl FieldKind {
    /// Every dense field, in sampling order.
    pub const ALL: [FieldKind; 3] = [FieldKind::Cave, FieldKind::Pattern, FieldKind::Stripe];

    /// Looks a field up by name. `"glass"` is accepted for the pattern field.
    pub fn from_name(name: &str) -> Option<FieldKind> {
        FIELD_NAMES.get(name).copied()
    }

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Cave => "cave",
            FieldKind::Pattern => "pattern",
            FieldKind::Stripe => "stripe",
        }
    }
}

/// Recycled buffers for coarse samples and dense grids.
#[derive(Debug, Default)]
pub struct SamplePool {
    pub(crate) samples: BufferPool<f64>,
    pub(crate) dense: BufferPool<i32>,
}

impl SamplePool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers waiting for reuse.
    pub fn available(&self) -> usize {
        self.samples.available() + self.dense.available()
    }

    /// Buffers allocated so far.
    pub fn allocations(&self) -> usize {
        self.samples.allocations() + self.dense.allocations()
    }
}

/// The three dense fields of one column, each shareable with its tasks.
#[derive(Clone)]
pub struct SampleSet {
    region: Region,
    cave: MtResource<SampleRegion>,
    pattern: MtResource<SampleRegion>,
    stripe: MtResource<SampleRegion>,
}

impl std::fmt::Debug for SampleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleSet")
            .field("region", &self.region)
            .field("complete", &self.is_complete())
            .finish()
    }
}

impl SampleSet {
    /// Checks out buffers for every field over `region`.
    pub fn new(region: Region, sample_rate: i32, fields: &FieldSet, pool: &mut SamplePool) -> Self {
        SampleSet {
            region,
            cave: MtResource::new(SampleRegion::new(region, sample_rate, fields.cave, pool)),
            pattern: MtResource::new(SampleRegion::new(region, sample_rate, fields.pattern, pool)),
            stripe: MtResource::new(SampleRegion::new(region, sample_rate, fields.stripe, pool)),
        }
    }

    /// A set of empty, complete fields.
    pub fn empty() -> Self {
        let origin = Point3::new(0, 0, 0);
        SampleSet {
            region: Region { min: origin, max: origin },
            cave: MtResource::new(SampleRegion::empty()),
            pattern: MtResource::new(SampleRegion::empty()),
            stripe: MtResource::new(SampleRegion::empty()),
        }
    }

    /// The sampled region.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Shared handle to one field.
    pub fn field(&self, kind: FieldKind) -> &MtResource<SampleRegion> {
        match kind {
            FieldKind::Cave => &self.cave,
            FieldKind::Pattern => &self.pattern,
            FieldKind::Stripe => &self.stripe,
        }
    }

    /// Whether every field has been expanded.
    pub fn is_complete(&self) -> bool {
        FieldKind::ALL
            .iter()
            .all(|kind| self.field(*kind).get().is_complete())
    }

    /// Returns the buffers to `pool`.
    ///
    /// A field still referenced elsewhere, for instance by a task that has
    /// not yet been dropped, is left to be freed normally.
    pub fn release(self, pool: &mut SamplePool) {
        for region in [self.cave, self.pattern, self.stripe] {
            if let Ok(region) = region.try_unwrap() {
                region.release(pool);
            }
        }
    }
}

/// Spawn data for one horizontal cell of a column.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpawnCell {
    /// Spawn noise at the cell, in [-1, 1].
    pub value: f64,
    /// First air voxel above solid ground, scanning up from the floor.
    pub height: Option<i32>,
    /// Spawn noise frequency at the cell after drift.
    pub frequency: f64,
    /// Spawn noise quantized with the spawn field's scale.
    pub intensity: u8,
}

/// Per-cell spawn data for a column footprint.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnMap {
    size: usize,
    cells: Vec<SpawnCell>,
}

impl SpawnMap {
    /// A `size` × `size` map of default cells.
    pub fn new(size: usize) -> Self {
        SpawnMap {
            size,
            cells: vec![SpawnCell::default(); size * size],
        }
    }

    /// Edge length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cell at local `(x, z)`, if inside.
    pub fn get(&self, x: usize, z: usize) -> Option<&SpawnCell> {
        (x < self.size && z < self.size)
            .then(|| &self.cells[x + self.size * z])
    }

    /// Mutable cell at local `(x, z)`, if inside.
    pub fn get_mut(&mut self, x: usize, z: usize) -> Option<&mut SpawnCell> {
        if x < self.size && z < self.size {
            Some(&mut self.cells[x + self.size * z])
        } else {
            None
        }
    }

    /// Every cell, x fastest.
    pub fn cells(&self) -> &[SpawnCell] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_resolve() {
        assert_eq!(FieldKind::from_name("cave"), Some(FieldKind::Cave));
        assert_eq!(FieldKind::from_name("glass"), Some(FieldKind::Pattern));
        assert_eq!(FieldKind::from_name("pattern"), Some(FieldKind::Pattern));
        assert_eq!(FieldKind::from_name("stripe"), Some(FieldKind::Stripe));
        assert_eq!(FieldKind::from_name("mountain"), None);
        for kind in FieldKind::ALL {
            assert_eq!(FieldKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn empty_sets_are_complete() {
        let set = SampleSet::empty();
        assert!(set.is_complete());
        let mut pool = SamplePool::new();
        set.release(&mut pool);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn spawn_map_bounds() {
        let mut map = SpawnMap::new(4);
        map.get_mut(3, 2).unwrap().height = Some(9);
        assert_eq!(map.get(3, 2).unwrap().height, Some(9));
        assert!(map.get(4, 0).is_none());
        assert!(map.get_mut(0, 4).is_none());
        assert_eq!(map.cells().len(), 16);
    }
}
