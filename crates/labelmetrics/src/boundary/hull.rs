//! Convex hulls of object boundaries, with Feret diameters.

use nalgebra::{Point2, Vector2};

use super::ChainCode;

/// Convex hull of a point set, vertices in counterclockwise order.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexHull {
    vertices: Vec<Point2<f64>>,
}

/// Feret diameters of a convex hull: extremal calipers distances and the
/// angles they occur at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeretDiameters {
    /// Largest distance between two boundary points.
    pub max: f64,
    /// Smallest caliper width.
    pub min: f64,
    /// Extent perpendicular to the minimum-width direction.
    pub perp_min: f64,
    /// Angle of the maximum diameter, radians in (−π/2, π/2].
    pub max_angle: f64,
    /// Angle of the minimum-width direction, radians in (−π/2, π/2].
    pub min_angle: f64,
}

impl ConvexHull {
    /// Convex hull of arbitrary points (Andrew's monotone chain).
    pub fn from_points(points: &[Point2<f64>]) -> Self {
        let mut pts: Vec<Point2<f64>> = points.to_vec();
        pts.sort_by(|a, b| (a.x, a.y).partial_cmp(&(b.x, b.y)).expect("finite coordinates"));
        pts.dedup();
        if pts.len() < 3 {
            return Self { vertices: pts };
        }
        let cross = |o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>| {
            (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
        };
        let mut lower: Vec<Point2<f64>> = Vec::with_capacity(pts.len());
        for p in &pts {
            while lower.len() >= 2
                && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0
            {
                lower.pop();
            }
            lower.push(*p);
        }
        let mut upper: Vec<Point2<f64>> = Vec::with_capacity(pts.len());
        for p in pts.iter().rev() {
            while upper.len() >= 2
                && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0
            {
                upper.pop();
            }
            upper.push(*p);
        }
        // The last point of each chain is the first point of the other.
        lower.pop();
        upper.pop();
        lower.extend(upper);
        Self { vertices: lower }
    }

    /// Convex hull of an object's boundary pixel corners.
    pub fn from_chain_code(chain: &ChainCode) -> Self {
        Self::from_points(&chain.boundary_corners())
    }

    /// Hull vertices, counterclockwise.
    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.vertices
    }

    /// Enclosed area (shoelace).
    pub fn area(&self) -> f64 {
        if self.vertices.len() < 3 {
            return 0.0;
        }
        let mut twice = 0.0;
        for (i, a) in self.vertices.iter().enumerate() {
            let b = &self.vertices[(i + 1) % self.vertices.len()];
            twice += a.x * b.y - b.x * a.y;
        }
        twice.abs() / 2.0
    }

    /// Boundary length of the hull polygon.
    pub fn perimeter(&self) -> f64 {
        match self.vertices.len() {
            0 | 1 => 0.0,
            2 => 2.0 * (self.vertices[1] - self.vertices[0]).norm(),
            _ => {
                let mut sum = 0.0;
                for (i, a) in self.vertices.iter().enumerate() {
                    let b = &self.vertices[(i + 1) % self.vertices.len()];
                    sum += (b - a).norm();
                }
                sum
            }
        }
    }

    /// Feret diameters via rotating calipers over the hull edges.
    pub fn feret(&self) -> FeretDiameters {
        let v = &self.vertices;
        if v.len() < 2 {
            return FeretDiameters {
                max: 0.0,
                min: 0.0,
                perp_min: 0.0,
                max_angle: 0.0,
                min_angle: 0.0,
            };
        }

        // Maximum diameter: farthest vertex pair.
        let mut max = 0.0;
        let mut max_dir = Vector2::new(1.0, 0.0);
        for i in 0..v.len() {
            for j in i + 1..v.len() {
                let d = v[j] - v[i];
                let n = d.norm();
                if n > max {
                    max = n;
                    max_dir = d;
                }
            }
        }

        if v.len() == 2 {
            return FeretDiameters {
                max,
                min: 0.0,
                perp_min: max,
                max_angle: axis_angle(max_dir),
                min_angle: axis_angle(perp(max_dir)),
            };
        }

        // Minimum width: smallest caliper distance over supporting edges.
        let mut min = f64::INFINITY;
        let mut perp_min = 0.0;
        let mut min_normal = Vector2::new(0.0, 1.0);
        for i in 0..v.len() {
            let a = v[i];
            let b = v[(i + 1) % v.len()];
            let edge = b - a;
            let len = edge.norm();
            if len == 0.0 {
                continue;
            }
            let u = edge / len;
            let n = perp(u);
            let mut lo_n = f64::INFINITY;
            let mut hi_n = f64::NEG_INFINITY;
            let mut lo_u = f64::INFINITY;
            let mut hi_u = f64::NEG_INFINITY;
            for p in v {
                let dn = (p - a).dot(&n);
                let du = (p - a).dot(&u);
                lo_n = lo_n.min(dn);
                hi_n = hi_n.max(dn);
                lo_u = lo_u.min(du);
                hi_u = hi_u.max(du);
            }
            let width = hi_n - lo_n;
            if width < min {
                min = width;
                perp_min = hi_u - lo_u;
                min_normal = n;
            }
        }

        FeretDiameters {
            max,
            min,
            perp_min,
            max_angle: axis_angle(max_dir),
            min_angle: axis_angle(min_normal),
        }
    }
}

/// Rotate a vector by +90 degrees.
fn perp(v: Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-v.y, v.x)
}

/// Angle of an undirected axis, normalized to (−π/2, π/2].
fn axis_angle(v: Vector2<f64>) -> f64 {
    let mut angle = v.y.atan2(v.x);
    if angle > std::f64::consts::FRAC_PI_2 {
        angle -= std::f64::consts::PI;
    } else if angle <= -std::f64::consts::FRAC_PI_2 {
        angle += std::f64::consts::PI;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
            // interior and duplicate points must not matter
            Point2::new(0.5, 0.5),
            Point2::new(1.0, 1.0),
        ]
    }

    #[test]
    fn square_hull() {
        let hull = ConvexHull::from_points(&unit_square());
        assert_eq!(hull.vertices().len(), 4);
        assert_relative_eq!(hull.area(), 1.0);
        assert_relative_eq!(hull.perimeter(), 4.0);
    }

    #[test]
    fn square_feret() {
        let hull = ConvexHull::from_points(&unit_square());
        let feret = hull.feret();
        assert_relative_eq!(feret.max, std::f64::consts::SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(feret.min, 1.0, epsilon = 1e-12);
        assert_relative_eq!(feret.perp_min, 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            feret.max_angle.abs(),
            std::f64::consts::FRAC_PI_4,
            epsilon = 1e-12
        );
    }

    #[test]
    fn rectangle_min_width_is_short_side() {
        let rect = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let feret = ConvexHull::from_points(&rect).feret();
        assert_relative_eq!(feret.min, 2.0, epsilon = 1e-12);
        assert_relative_eq!(feret.perp_min, 4.0, epsilon = 1e-12);
        assert_relative_eq!(feret.max, 20.0f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(feret.min_angle.abs(), std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn degenerate_hulls() {
        let single = ConvexHull::from_points(&[Point2::new(2.0, 3.0)]);
        assert_eq!(single.area(), 0.0);
        assert_eq!(single.perimeter(), 0.0);
        assert_eq!(single.feret().max, 0.0);

        let segment =
            ConvexHull::from_points(&[Point2::new(0.0, 0.0), Point2::new(3.0, 0.0)]);
        assert_relative_eq!(segment.perimeter(), 6.0);
        let feret = segment.feret();
        assert_relative_eq!(feret.max, 3.0);
        assert_relative_eq!(feret.min, 0.0);
    }

    #[test]
    fn hull_from_single_pixel_chain() {
        let chain = ChainCode {
            object_id: 1,
            start: [4, 4],
            codes: vec![],
            connectivity: 2,
        };
        let hull = ConvexHull::from_chain_code(&chain);
        assert_eq!(hull.vertices().len(), 4);
        assert_relative_eq!(hull.area(), 1.0);
        assert_relative_eq!(hull.perimeter(), 4.0);
    }

    #[test]
    fn collinear_points_collapse() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ];
        let hull = ConvexHull::from_points(&pts);
        assert_eq!(hull.area(), 0.0);
    }
}
