use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

const STAR_SPIKES: usize = 5;
const STAR_OUTER_FRACTION: f32 = 0.8;
const STAR_INNER_FRACTION: f32 = 0.45;

pub fn ease_out_quart(x: f32) -> f32 {
    1.0 - (1.0 - x).powi(4)
}

/// Five point star as a triangle fan around the origin, sized so `radius`
/// matches the footprint of the stroked canvas star it replaces.
pub fn star_mesh(radius: f32) -> Mesh {
    let outer = radius * STAR_OUTER_FRACTION;
    let inner = radius * STAR_INNER_FRACTION;
    let points = STAR_SPIKES * 2;
    let step = core::f32::consts::PI / STAR_SPIKES as f32;

    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(points + 1);
    positions.push([0.0, 0.0, 0.0]);
    for k in 0..points {
        let r = if k % 2 == 0 { outer } else { inner };
        let angle = core::f32::consts::FRAC_PI_2 + k as f32 * step;
        positions.push([angle.cos() * r, angle.sin() * r, 0.0]);
    }

    let normals = vec![[0.0, 0.0, 1.0]; positions.len()];
    let uvs = vec![[0.5, 0.5]; positions.len()];

    let mut indices: Vec<u32> = Vec::with_capacity(points * 3);
    for k in 0..points as u32 {
        indices.extend_from_slice(&[0, k + 1, (k + 1) % points as u32 + 1]);
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// Total outline length of a horizontal capsule with the given half extents.
/// `half.y` is the cap radius.
pub fn capsule_perimeter(half: Vec2) -> f32 {
    let straight = 2.0 * (half.x - half.y).max(0.0);
    2.0 * straight + core::f32::consts::TAU * half.y
}

/// Point on the outline of a horizontal capsule, parameterised by arc length.
/// Starts on the top edge at the left cap junction and runs clockwise
/// (top edge, right cap, bottom edge, left cap). Local coordinates, y up.
pub fn capsule_perimeter_point(half: Vec2, s: f32) -> Vec2 {
    let radius = half.y;
    let flat = (half.x - radius).max(0.0);
    let straight = 2.0 * flat;
    let cap = core::f32::consts::PI * radius;
    let s = s.rem_euclid(capsule_perimeter(half));

    if s < straight {
        // top edge, left to right
        return Vec2::new(-flat + s, radius);
    }
    let s = s - straight;
    if s < cap {
        // right cap, sweeping from +90 to -90 degrees
        let angle = core::f32::consts::FRAC_PI_2 - s / radius;
        return Vec2::new(flat, 0.0) + Vec2::new(angle.cos(), angle.sin()) * radius;
    }
    let s = s - cap;
    if s < straight {
        // bottom edge, right to left
        return Vec2::new(flat - s, -radius);
    }
    let s = s - straight;
    // left cap, sweeping from -90 to -270 degrees
    let angle = -core::f32::consts::FRAC_PI_2 - s / radius;
    Vec2::new(-flat, 0.0) + Vec2::new(angle.cos(), angle.sin()) * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_out_quart_hits_endpoints() {
        assert!(ease_out_quart(0.0).abs() < f32::EPSILON);
        assert!((ease_out_quart(1.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn ease_out_quart_is_monotonic() {
        let mut previous = ease_out_quart(0.0);
        for i in 1..=100 {
            let value = ease_out_quart(i as f32 / 100.0);
            assert!(value >= previous, "eased curve dipped at step {i}");
            previous = value;
        }
    }

    #[test]
    fn star_mesh_has_fan_topology() {
        let mesh = star_mesh(22.0);
        let positions = mesh
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|a| a.as_float3())
            .expect("star mesh should carry positions");
        // center plus five outer and five inner points
        assert_eq!(positions.len(), 11, "unexpected vertex count");
        let indices = mesh.indices().expect("star mesh should be indexed");
        assert_eq!(indices.len(), 30, "unexpected index count");
    }

    #[test]
    fn star_vertices_stay_within_radius() {
        let radius = 22.0;
        let mesh = star_mesh(radius);
        let positions = mesh
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|a| a.as_float3())
            .expect("star mesh should carry positions");
        for p in positions {
            let len = Vec2::new(p[0], p[1]).length();
            assert!(len <= radius + 1e-3, "vertex escaped the star radius");
        }
    }

    #[test]
    fn capsule_perimeter_matches_circle_when_round() {
        // a capsule with no straight section is a circle
        let half = Vec2::splat(23.0);
        let expected = core::f32::consts::TAU * 23.0;
        assert!((capsule_perimeter(half) - expected).abs() < 1e-3);
    }

    #[test]
    fn capsule_perimeter_point_stays_on_outline() {
        let half = Vec2::new(60.0, 23.0);
        let total = capsule_perimeter(half);
        let mut s = 0.0;
        while s < total {
            let p = capsule_perimeter_point(half, s);
            assert!(p.x.abs() <= half.x + 1e-3, "x escaped the capsule");
            assert!(p.y.abs() <= half.y + 1e-3, "y escaped the capsule");
            // every outline point is exactly one radius away from the spine
            let spine_x = p.x.clamp(-(half.x - half.y), half.x - half.y);
            let d = (p - Vec2::new(spine_x, 0.0)).length();
            assert!((d - half.y).abs() < 1e-3, "point left the outline at s={s}");
            s += 2.5;
        }
    }

    #[test]
    fn capsule_perimeter_point_starts_on_top_edge() {
        let half = Vec2::new(60.0, 23.0);
        let start = capsule_perimeter_point(half, 0.0);
        assert!((start.y - half.y).abs() < 1e-3, "start is not on the top edge");
    }
}
