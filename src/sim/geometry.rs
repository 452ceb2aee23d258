//! Polygon helpers for loop capture
//!
//! A polygon is a slice of vertices in order; the edge from the last vertex
//! back to the first is implicit.

use glam::Vec2;

/// Even-odd (ray casting) containment test
///
/// Casts a ray toward +x and counts edges whose y-extent straddles `point.y`
/// (half-open, so a shared vertex is counted once) and whose x-intercept lies
/// strictly right of `point.x`. An odd count means inside.
///
/// Boundary points follow the half-open rule: points on a left or bottom edge
/// are inside, points on a right or top edge are outside.
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y) {
            // Straddling guarantees a.y != b.y
            let x_cross = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if x_cross > point.x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Arithmetic mean of the vertices (not the area centroid)
pub fn centroid(points: &[Vec2]) -> Option<Vec2> {
    if points.is_empty() {
        return None;
    }
    let sum: Vec2 = points.iter().copied().sum();
    Some(sum / points.len() as f32)
}

/// Largest distance from `center` to any vertex
pub fn bounding_radius(center: Vec2, points: &[Vec2]) -> f32 {
    points
        .iter()
        .map(|p| p.distance(center))
        .fold(0.0, f32::max)
}

/// Bounding circle of a polygon: (centroid, radius)
pub fn bounding_circle(points: &[Vec2]) -> Option<(Vec2, f32)> {
    let center = centroid(points)?;
    Some((center, bounding_radius(center, points)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit_square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_unit_square_inside_outside() {
        let square = unit_square();
        assert!(point_in_polygon(Vec2::new(0.5, 0.5), &square));
        assert!(!point_in_polygon(Vec2::new(2.0, 2.0), &square));
        assert!(!point_in_polygon(Vec2::new(-0.5, 0.5), &square));
    }

    #[test]
    fn test_unit_square_boundary() {
        let square = unit_square();
        // Right and top edges are outside
        assert!(!point_in_polygon(Vec2::new(1.0, 0.5), &square));
        assert!(!point_in_polygon(Vec2::new(0.5, 1.0), &square));
        // Left and bottom edges are inside
        assert!(point_in_polygon(Vec2::new(0.0, 0.5), &square));
        assert!(point_in_polygon(Vec2::new(0.5, 0.0), &square));
    }

    #[test]
    fn test_concave_polygon() {
        // U shape opening upward
        let u = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(3.0, 3.0),
            Vec2::new(2.0, 3.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 3.0),
            Vec2::new(0.0, 3.0),
        ];
        assert!(point_in_polygon(Vec2::new(0.5, 2.0), &u));
        assert!(point_in_polygon(Vec2::new(2.5, 2.0), &u));
        assert!(!point_in_polygon(Vec2::new(1.5, 2.0), &u));
    }

    #[test]
    fn test_degenerate_polygon_contains_nothing() {
        let line = [Vec2::ZERO, Vec2::new(1.0, 1.0)];
        assert!(!point_in_polygon(Vec2::new(0.5, 0.5), &line));
        assert!(!point_in_polygon(Vec2::ZERO, &[]));
    }

    #[test]
    fn test_centroid_and_radius() {
        let square = unit_square();
        let (center, radius) = bounding_circle(&square).unwrap();
        assert!((center - Vec2::new(0.5, 0.5)).length() < 1e-6);
        assert!((radius - 0.5_f32.hypot(0.5)).abs() < 1e-6);
        assert!(centroid(&[]).is_none());
    }

    proptest! {
        #[test]
        fn prop_square_interior_is_inside(x in 0.01f32..0.99, y in 0.01f32..0.99) {
            prop_assert!(point_in_polygon(Vec2::new(x, y), &unit_square()));
        }

        #[test]
        fn prop_outside_bounding_circle_is_outside(angle in 0.0f32..std::f32::consts::TAU, extra in 0.01f32..10.0) {
            let square = unit_square();
            let (center, radius) = bounding_circle(&square).unwrap();
            let p = center + Vec2::new(angle.cos(), angle.sin()) * (radius + extra);
            prop_assert!(!point_in_polygon(p, &square));
        }
    }
}
