//! Greedy meshing over per-slice visibility masks.
//!
//! For each axis `d` the grid is cut into slices `w = -1 .. size - 1`. Slice
//! `w` is the plane between voxel layers `w` and `w + 1`, and its mask has
//! one cell per (u, v) position:
//!
//! * `0`: no face
//! * `code + 1`: a face owned by the voxel at `w`, looking toward `+d`
//! * `-(code + 1)`: a face owned by the voxel at `w + 1`, looking toward `-d`
//!
//! Voxels outside the grid come from the [`BlockLookup`]. A face owned by an
//! outside voxel belongs to the neighbouring chunk and is never emitted here.
//!
//! Each mask is merged into maximal same-value rectangles, widest first,
//! and consumed cells are cleared so no rectangle is seen twice. The
//! collision surface reruns the merge on a copy of the mask that keeps only
//! each cell's sign.

use cgmath::{Point3, Vector3};

use crate::terrain_state::{
    generation::Palette,
    voxels::{BlockCode, BlockGrid, BlockLookup, BlockType},
};

use super::{
    face::{Face, MaskRect},
    mesh::{MeshData, MeshPass},
};
use crate::terrain_state::meshing::uv_cache::{UvCache, UV_CACHE_CAPACITY};

/// Merges a slice mask into rectangles, clearing it as it goes.
///
/// # Arguments
/// * `mask` - Row-major mask, `width * height` cells, `i` varying fastest
/// * `width` - Cells per row
/// * `height` - Number of rows
pub fn merge_mask(mask: &mut [i32], width: usize, height: usize) -> Vec<MaskRect> {
    let mut rects = Vec::new();
    for j in 0..height {
        let mut i = 0;
        while i < width {
            let n = i + j * width;
            let value = mask[n];
            if value == 0 {
                i += 1;
                continue;
            }

            let mut w = 1;
            while i + w < width && mask[n + w] == value {
                w += 1;
            }

            let mut h = 1;
            'grow: while j + h < height {
                for k in 0..w {
                    if mask[n + k + h * width] != value {
                        break 'grow;
                    }
                }
                h += 1;
            }

            for l in 0..h {
                mask[n + l * width..n + l * width + w].fill(0);
            }
            rects.push(MaskRect {
                i,
                j,
                width: w,
                height: h,
                value,
            });
            i += w;
        }
    }
    rects
}

/// Mask value of the boundary between `near` (layer `w`) and `far` (layer `w + 1`).
///
/// `near_inside` and `far_inside` say whether each voxel belongs to the grid
/// being meshed; faces owned by outside voxels are suppressed.
fn mask_value(pass: MeshPass, near: BlockCode, far: BlockCode, near_inside: bool, far_inside: bool) -> i32 {
    let (a, b) = (BlockType::from_code(near), BlockType::from_code(far));
    if near_inside && pass.is_target(a) && pass.is_exposed_to(b) {
        i32::from(near) + 1
    } else if far_inside && pass.is_target(b) && pass.is_exposed_to(a) {
        -(i32::from(far) + 1)
    } else {
        0
    }
}

/// Builds one pass of a grid's mesh.
///
/// # Arguments
/// * `grid` - Block codes to mesh
/// * `origin` - World coordinate of the grid's minimum corner
/// * `pass` - Which material to mesh
/// * `lookup` - Answers for voxels outside the grid, in world coordinates
/// * `palette` - Source of face texture placement
pub fn greedy<L: BlockLookup + ?Sized>(
    grid: &BlockGrid,
    origin: Point3<i32>,
    pass: MeshPass,
    lookup: &L,
    palette: &Palette,
) -> MeshData {
    let mut mesh = MeshData::new(origin, pass);
    let mut uv_cache = UvCache::new(palette, UV_CACHE_CAPACITY);
    let dims = grid.dimensions();
    let offset = Vector3::new(origin.x, origin.y, origin.z);

    let voxel = |p: Point3<i32>| -> (BlockCode, bool) {
        if grid.contains(p) {
            (grid.get(p), true)
        } else {
            (lookup.block_at(p + offset), false)
        }
    };

    for d in 0..3 {
        let u = (d + 1) % 3;
        let v = (d + 2) % 3;
        let (size_u, size_v) = (dims[u].max(0) as usize, dims[v].max(0) as usize);
        let mut mask = vec![0i32; size_u * size_v];
        let mut collider_mask = vec![0i32; size_u * size_v];

        for w in -1..dims[d] {
            let mut any = false;
            for j in 0..size_v {
                for i in 0..size_u {
                    let mut near = Point3::new(0, 0, 0);
                    near[d] = w;
                    near[u] = i as i32;
                    near[v] = j as i32;
                    let mut far = near;
                    far[d] += 1;

                    let (a, a_inside) = voxel(near);
                    let (b, b_inside) = voxel(far);
                    let value = mask_value(pass, a, b, a_inside, b_inside);
                    mask[i + j * size_u] = value;
                    any |= value != 0;
                }
            }
            if !any {
                continue;
            }

            for (signed, value) in collider_mask.iter_mut().zip(&mask) {
                *signed = value.signum();
            }

            for rect in merge_mask(&mut mask, size_u, size_v) {
                let code = (rect.value.abs() - 1) as BlockCode;
                let face = Face::from_rect(d, w, &rect, code);
                let Some(uvs) = uv_cache.face_uvs(code, face.side, face.width, face.height) else {
                    continue;
                };
                mesh.add_face(face, &uvs);
            }
            for rect in merge_mask(&mut collider_mask, size_u, size_v) {
                mesh.add_collider_face(&Face::from_rect(d, w, &rect, 0));
            }
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain_state::generation::Seed;
    use crate::terrain_state::voxels::{BlockSide, AIR, NULL, PALETTE_LENGTH};

    const ROCK: BlockCode = 5;
    const OTHER_ROCK: BlockCode = 9;
    const GLASS: BlockCode = PALETTE_LENGTH + 2;

    fn palette() -> Palette {
        Palette::generate(&Seed::from("mesher"))
    }

    fn grid(size: i32) -> BlockGrid {
        BlockGrid::new(Vector3::new(size, size, size), AIR)
    }

    fn air(_: Point3<i32>) -> BlockCode {
        AIR
    }

    fn null(_: Point3<i32>) -> BlockCode {
        NULL
    }

    fn build(grid: &BlockGrid, pass: MeshPass, lookup: fn(Point3<i32>) -> BlockCode) -> MeshData {
        greedy(grid, Point3::new(0, 0, 0), pass, &lookup, &palette())
    }

    #[test]
    fn merge_consumes_rectangles() {
        #[rustfmt::skip]
        let mut mask = vec![
            1, 1, 0,
            1, 1, 2,
            0, -1, -1,
        ];
        let rects = merge_mask(&mut mask, 3, 3);
        assert!(mask.iter().all(|v| *v == 0));
        assert_eq!(rects.len(), 3);
        assert_eq!(rects[0], MaskRect { i: 0, j: 0, width: 2, height: 2, value: 1 });
        assert_eq!(rects[1], MaskRect { i: 2, j: 1, width: 1, height: 1, value: 2 });
        assert_eq!(rects[2], MaskRect { i: 1, j: 2, width: 2, height: 1, value: -1 });
    }

    #[test]
    fn single_rock_has_six_unit_faces() {
        let mut grid = grid(2);
        grid.set(Point3::new(0, 0, 0), ROCK);
        let mesh = build(&grid, MeshPass::Opaque, air);

        assert_eq!(mesh.quad_count(), 6);
        assert!(mesh.faces.iter().all(|f| f.width == 1 && f.height == 1 && f.code == ROCK));
        let mut sides: Vec<_> = mesh.faces.iter().map(|f| f.side as u32).collect();
        sides.sort_unstable();
        assert_eq!(sides, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangles.len(), 36);
    }

    #[test]
    fn adjacent_rocks_share_no_internal_face() {
        let mut grid = grid(2);
        grid.set(Point3::new(0, 0, 0), ROCK);
        grid.set(Point3::new(1, 0, 0), ROCK);
        let mesh = build(&grid, MeshPass::Opaque, air);

        // The shared x = 1 plane is hidden; the four long sides merge into 2x1 quads.
        assert!(!mesh
            .faces
            .iter()
            .any(|f| f.side.axis() == 0 && f.ll.x == 1));
        assert_eq!(mesh.quad_count(), 6);
        let long = mesh.faces.iter().filter(|f| f.area() == 2).count();
        assert_eq!(long, 4);
    }

    #[test]
    fn different_rocks_do_not_merge_or_show_between() {
        let mut grid = grid(2);
        grid.set(Point3::new(0, 0, 0), ROCK);
        grid.set(Point3::new(1, 0, 0), OTHER_ROCK);
        let mesh = build(&grid, MeshPass::Opaque, air);
        assert_eq!(mesh.quad_count(), 10);
        assert!(!mesh.faces.iter().any(|f| f.side.axis() == 0 && f.ll.x == 1));
        // Material identity is erased for collisions, so those still merge.
        assert_eq!(mesh.collider_quad_count(), 6);
    }

    #[test]
    fn slab_merges_into_single_quads() {
        let mut grid = BlockGrid::new(Vector3::new(4, 3, 4), AIR);
        for x in 0..4 {
            for z in 0..4 {
                grid.set(Point3::new(x, 1, z), ROCK);
            }
        }
        let mesh = build(&grid, MeshPass::Opaque, air);

        let top: Vec<_> = mesh.faces.iter().filter(|f| f.side == BlockSide::TOP).collect();
        let bottom: Vec<_> = mesh.faces.iter().filter(|f| f.side == BlockSide::BOTTOM).collect();
        assert_eq!(top.len(), 1);
        assert_eq!(bottom.len(), 1);
        assert_eq!((top[0].width, top[0].height), (4, 4));
        assert_eq!((bottom[0].width, bottom[0].height), (4, 4));
        assert_eq!(top[0].ll.y, 2);
        assert_eq!(bottom[0].ll.y, 1);
        assert_eq!(mesh.quad_count(), 6);
    }

    #[test]
    fn null_neighbours_never_produce_faces() {
        let mut grid = grid(2);
        grid.set(Point3::new(0, 0, 0), ROCK);
        let mesh = build(&grid, MeshPass::Opaque, null);

        // Only the three faces looking into the grid remain.
        assert_eq!(mesh.quad_count(), 3);
        assert!(mesh.faces.iter().all(|f| f.side.is_positive()));

        let full = BlockGrid::new(Vector3::new(2, 2, 2), ROCK);
        assert!(build(&full, MeshPass::Opaque, null).is_empty());
    }

    #[test]
    fn solid_neighbours_hide_boundary_faces() {
        let full = BlockGrid::new(Vector3::new(2, 2, 2), ROCK);
        let rock = |_: Point3<i32>| ROCK;
        let mesh = greedy(&full, Point3::new(0, 0, 0), MeshPass::Opaque, &rock, &palette());
        assert!(mesh.is_empty());

        let open = build(&full, MeshPass::Opaque, air);
        assert_eq!(open.quad_count(), 6);
        assert!(open.faces.iter().all(|f| f.area() == 4));
    }

    #[test]
    fn lookups_use_world_coordinates() {
        let full = BlockGrid::new(Vector3::new(2, 2, 2), ROCK);
        // Only the voxel above the grid at world (10, 22, 30) is air.
        let lookup = |p: Point3<i32>| if p == Point3::new(10, 22, 30) { AIR } else { ROCK };
        let mesh = greedy(&full, Point3::new(10, 20, 30), MeshPass::Opaque, &lookup, &palette());
        assert_eq!(mesh.quad_count(), 1);
        assert_eq!(mesh.faces[0].side, BlockSide::TOP);
        assert_eq!(mesh.faces[0].ll, Point3::new(0, 2, 0));
    }

    #[test]
    fn glass_only_shows_against_air() {
        let mut grid = grid(2);
        grid.set(Point3::new(0, 0, 0), ROCK);
        grid.set(Point3::new(1, 0, 0), GLASS);

        let transparent = build(&grid, MeshPass::Transparent, air);
        assert_eq!(transparent.quad_count(), 5);
        assert!(transparent.faces.iter().all(|f| f.code == GLASS));
        assert!(!transparent.faces.iter().any(|f| f.side == BlockSide::LEFT));

        // Rock still shows its face toward the glass.
        let opaque = build(&grid, MeshPass::Opaque, air);
        assert_eq!(opaque.quad_count(), 6);
        assert!(opaque.faces.iter().any(|f| f.side == BlockSide::RIGHT && f.ll.x == 1));
    }

    #[test]
    fn uvs_repeat_over_merged_faces() {
        let grid = BlockGrid::new(Vector3::new(3, 1, 1), ROCK);
        let mesh = build(&grid, MeshPass::Opaque, air);
        let palette = palette();
        for (index, face) in mesh.faces.iter().enumerate() {
            let expected = palette.face_uvs(ROCK, face.side, face.width, face.height).unwrap();
            let vertices = &mesh.vertices[index * 4..index * 4 + 4];
            assert!(vertices.iter().all(|v| v.texture_index == expected.tile));
            assert_eq!(vertices[2].tex_coords, [face.width as f32, face.height as f32]);
        }
        assert!(mesh.faces.iter().any(|f| f.area() == 3));
    }
}
