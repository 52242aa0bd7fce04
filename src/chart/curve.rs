//! Catmull-Rom interpolation emitted as cubic Bezier paths.

use kurbo::{BezPath, Point};

const EPSILON: f64 = 1e-12;

/// Round to 1/1000 of a unit so path data stays compact. Also folds -0 into 0.
fn snap(p: Point) -> Point {
    let round = |v: f64| (v * 1000.0).round() / 1000.0 + 0.0;
    Point::new(round(p.x), round(p.y))
}

/// Catmull-Rom spline through every point, parameterized by `alpha`
/// (0 uniform, 0.5 centripetal, 1 chordal).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatmullRom {
    alpha: f64,
}

impl CatmullRom {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    /// `|ab|^alpha` and its square.
    fn knot(&self, a: Point, b: Point) -> (f64, f64) {
        let pow2a = (a - b).hypot2().powf(self.alpha);
        (pow2a.sqrt(), pow2a)
    }

    /// Bezier control points for the segment `p1 -> p2`. Missing neighbours
    /// at either end pin that control point to the endpoint.
    fn controls(&self, p0: Option<Point>, p1: Point, p2: Point, p3: Option<Point>) -> (Point, Point) {
        let (l12, l12_2) = self.knot(p1, p2);

        let mut c1 = p1;
        if let Some(p0) = p0 {
            let (l01, l01_2) = self.knot(p0, p1);
            if l01 > EPSILON {
                let a = 2.0 * l01_2 + 3.0 * l01 * l12 + l12_2;
                let n = 3.0 * l01 * (l01 + l12);
                c1 = Point::new(
                    (p1.x * a - p0.x * l12_2 + p2.x * l01_2) / n,
                    (p1.y * a - p0.y * l12_2 + p2.y * l01_2) / n,
                );
            }
        }

        let mut c2 = p2;
        if let Some(p3) = p3 {
            let (l23, l23_2) = self.knot(p2, p3);
            if l23 > EPSILON {
                let b = 2.0 * l23_2 + 3.0 * l23 * l12 + l12_2;
                let m = 3.0 * l23 * (l23 + l12);
                c2 = Point::new(
                    (p2.x * b + p1.x * l23_2 - p3.x * l12_2) / m,
                    (p2.y * b + p1.y * l23_2 - p3.y * l12_2) / m,
                );
            }
        }

        (c1, c2)
    }

    /// Trace `points` into `path`, starting with a move (or a line when `connect`).
    pub fn trace(&self, points: &[Point], path: &mut BezPath, connect: bool) {
        let Some(&first) = points.first() else {
            return;
        };
        if connect {
            path.line_to(snap(first));
        } else {
            path.move_to(snap(first));
        }

        match points.len() {
            1 => {}
            2 => path.line_to(snap(points[1])),
            n => {
                for i in 0..n - 1 {
                    let p0 = i.checked_sub(1).map(|k| points[k]);
                    let p3 = points.get(i + 2).copied();
                    let (c1, c2) = self.controls(p0, points[i], points[i + 1], p3);
                    path.curve_to(snap(c1), snap(c2), snap(points[i + 1]));
                }
            }
        }
    }

    /// Closed band between `upper` and `lower`, both given left to right.
    /// The upper edge is traced forward and the lower edge backward.
    pub fn area(&self, upper: &[Point], lower: &[Point]) -> BezPath {
        let mut path = BezPath::new();
        if upper.is_empty() {
            return path;
        }
        self.trace(upper, &mut path, false);
        let reversed: Vec<Point> = lower.iter().rev().copied().collect();
        self.trace(&reversed, &mut path, true);
        path.close_path();
        path
    }
}
