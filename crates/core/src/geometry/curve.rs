//! Catmull-Rom splines through a list of control points.
//!
//! Evaluation follows the usual scene-graph conventions: `point(t)` spreads
//! `t` uniformly over the segments, while `point_at(u)` walks the curve by
//! arc length using a cached length table.

use glam::Vec3;

/// Number of samples used to approximate arc length.
pub const ARC_LENGTH_DIVISIONS: usize = 200;

const TANGENT_DELTA: f32 = 0.0001;

/// Parameterisation of the spline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum CurveType {
    /// Knot spacing from the square root of the chord length.
    #[default]
    Centripetal,
    /// Knot spacing from the chord length.
    Chordal,
    /// Uniform knots with an explicit tension.
    Uniform { tension: f32 },
}

/// Smooth curve passing through every control point.
#[derive(Debug, Clone, PartialEq)]
pub struct CatmullRomCurve3 {
    points: Vec<Vec3>,
    closed: bool,
    curve_type: CurveType,
    lengths: Vec<f32>,
}

impl CatmullRomCurve3 {
    /// Open centripetal curve. Needs at least two points to be evaluated.
    pub fn new(points: Vec<Vec3>) -> Self {
        Self::with_options(points, false, CurveType::Centripetal)
    }

    /// Closed centripetal curve.
    pub fn closed(points: Vec<Vec3>) -> Self {
        Self::with_options(points, true, CurveType::Centripetal)
    }

    pub fn with_options(points: Vec<Vec3>, closed: bool, curve_type: CurveType) -> Self {
        let mut curve = Self {
            points,
            closed,
            curve_type,
            lengths: Vec::new(),
        };
        curve.lengths = curve.compute_lengths(ARC_LENGTH_DIVISIONS);
        curve
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn curve_type(&self) -> CurveType {
        self.curve_type
    }

    /// Total arc length.
    pub fn length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// Point at parameter `t` in `[0, 1]`, uniform over the segments.
    pub fn point(&self, t: f32) -> Vec3 {
        let points = &self.points;
        let l = points.len();
        match l {
            0 => return Vec3::ZERO,
            1 => return points[0],
            _ => {}
        }

        let p = (l - usize::from(!self.closed)) as f32 * t;
        let mut int_point = p.floor() as isize;
        let mut weight = p - int_point as f32;

        if self.closed {
            int_point = int_point.rem_euclid(l as isize);
        } else if weight == 0.0 && int_point == l as isize - 1 {
            int_point = l as isize - 2;
            weight = 1.0;
        }
        let int_point = int_point.clamp(0, l as isize - 1) as usize;

        let p0 = if self.closed || int_point > 0 {
            points[(int_point + l - 1) % l]
        } else {
            points[0] * 2.0 - points[1]
        };
        let p1 = points[int_point % l];
        let p2 = points[(int_point + 1) % l];
        let p3 = if self.closed || int_point + 2 < l {
            points[(int_point + 2) % l]
        } else {
            points[l - 1] * 2.0 - points[l - 2]
        };

        let poly = match self.curve_type {
            CurveType::Centripetal | CurveType::Chordal => {
                let power = if self.curve_type == CurveType::Chordal {
                    0.5
                } else {
                    0.25
                };
                let mut dt0 = p0.distance_squared(p1).powf(power);
                let mut dt1 = p1.distance_squared(p2).powf(power);
                let mut dt2 = p2.distance_squared(p3).powf(power);

                // Coincident points would divide by zero.
                if dt1 < 1e-4 {
                    dt1 = 1.0;
                }
                if dt0 < 1e-4 {
                    dt0 = dt1;
                }
                if dt2 < 1e-4 {
                    dt2 = dt1;
                }
                CubicPoly3::nonuniform(p0, p1, p2, p3, dt0, dt1, dt2)
            }
            CurveType::Uniform { tension } => CubicPoly3::uniform(p0, p1, p2, p3, tension),
        };

        poly.calc(weight)
    }

    /// `divisions + 1` points evenly spread in parameter space.
    pub fn get_points(&self, divisions: usize) -> Vec<Vec3> {
        let divisions = divisions.max(1);
        (0..=divisions)
            .map(|d| self.point(d as f32 / divisions as f32))
            .collect()
    }

    /// `count` points from the first to the last control point inclusive.
    pub fn sample(&self, count: usize) -> Vec<Vec3> {
        match count {
            0 => Vec::new(),
            1 => vec![self.point(0.0)],
            _ => (0..count)
                .map(|i| self.point(i as f32 / (count - 1) as f32))
                .collect(),
        }
    }

    /// Point at arc-length fraction `u` in `[0, 1]`.
    pub fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.u_to_t(u))
    }

    /// Unit tangent at parameter `t`, estimated by central differences.
    pub fn tangent(&self, t: f32) -> Vec3 {
        let t1 = (t - TANGENT_DELTA).max(0.0);
        let t2 = (t + TANGENT_DELTA).min(1.0);
        (self.point(t2) - self.point(t1)).normalize_or_zero()
    }

    pub fn tangent_at(&self, u: f32) -> Vec3 {
        self.tangent(self.u_to_t(u))
    }

    /// Converts an arc-length fraction into the uniform parameter.
    pub fn u_to_t(&self, u: f32) -> f32 {
        let lengths = &self.lengths;
        let count = lengths.len();
        if count < 2 {
            return u;
        }

        let target = u * lengths[count - 1];
        let mut low: isize = 0;
        let mut high: isize = count as isize - 1;
        while low <= high {
            let i = low + (high - low) / 2;
            let comparison = lengths[i as usize] - target;
            if comparison < 0.0 {
                low = i + 1;
            } else if comparison > 0.0 {
                high = i - 1;
            } else {
                high = i;
                break;
            }
        }

        let i = high.max(0) as usize;
        if lengths[i] == target || i + 1 >= count {
            return i as f32 / (count - 1) as f32;
        }

        let before = lengths[i];
        let segment = lengths[i + 1] - before;
        let fraction = if segment > 0.0 {
            (target - before) / segment
        } else {
            0.0
        };
        (i as f32 + fraction) / (count - 1) as f32
    }

    fn compute_lengths(&self, divisions: usize) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(divisions + 1);
        lengths.push(0.0);
        let mut last = self.point(0.0);
        let mut sum = 0.0;
        for p in 1..=divisions {
            let current = self.point(p as f32 / divisions as f32);
            sum += current.distance(last);
            lengths.push(sum);
            last = current;
        }
        lengths
    }
}

/// Cubic Hermite polynomial per axis.
#[derive(Debug, Clone, Copy)]
struct CubicPoly3 {
    c0: Vec3,
    c1: Vec3,
    c2: Vec3,
    c3: Vec3,
}

impl CubicPoly3 {
    fn hermite(x0: Vec3, x1: Vec3, t0: Vec3, t1: Vec3) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    fn uniform(x0: Vec3, x1: Vec3, x2: Vec3, x3: Vec3, tension: f32) -> Self {
        Self::hermite(x1, x2, tension * (x2 - x0), tension * (x3 - x1))
    }

    fn nonuniform(x0: Vec3, x1: Vec3, x2: Vec3, x3: Vec3, dt0: f32, dt1: f32, dt2: f32) -> Self {
        let t1 = (x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1;
        let t2 = (x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2;
        Self::hermite(x1, x2, t1 * dt1, t2 * dt1)
    }

    fn calc(&self, t: f32) -> Vec3 {
        let t2 = t * t;
        let t3 = t2 * t;
        self.c0 + self.c1 * t + self.c2 * t2 + self.c3 * t3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(count: usize) -> CatmullRomCurve3 {
        CatmullRomCurve3::new(
            (0..count)
                .map(|i| Vec3::new((i as f32 / (count - 1) as f32) * 200.0 - 100.0, 0.0, 0.0))
                .collect(),
        )
    }

    #[test]
    fn open_curves_default_to_centripetal() {
        assert_eq!(CurveType::default(), CurveType::Centripetal);
        assert_eq!(line(3).curve_type(), CurveType::default());
    }

    #[test]
    fn passes_through_control_points() {
        let curve = CatmullRomCurve3::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 5.0, 0.0),
            Vec3::new(20.0, -5.0, 0.0),
            Vec3::new(30.0, 0.0, 0.0),
        ]);
        for (sampled, control) in curve.sample(4).iter().zip(curve.points()) {
            assert!(sampled.distance(*control) < 1e-3, "{sampled} vs {control}");
        }
    }

    #[test]
    fn straight_line_is_evenly_parameterised() {
        let curve = line(5);
        let points = curve.get_points(8);
        assert_eq!(points.len(), 9);
        for (i, point) in points.iter().enumerate() {
            let expected = -100.0 + 25.0 * i as f32;
            assert!((point.x - expected).abs() < 1e-3, "{} vs {expected}", point.x);
            assert!(point.y.abs() < 1e-5);
        }
        assert!((curve.length() - 200.0).abs() < 1e-2);
    }

    #[test]
    fn arc_length_mapping_hits_endpoints() {
        let curve = CatmullRomCurve3::new(vec![
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(50.0, 0.0, 0.0),
        ]);
        assert_eq!(curve.u_to_t(0.0), 0.0);
        assert!((curve.u_to_t(1.0) - 1.0).abs() < 1e-6);
        let mid = curve.point_at(0.5);
        assert!((mid.x - 25.0).abs() < 0.5, "{mid}");
    }

    #[test]
    fn closed_curve_wraps_back_to_start() {
        let curve = CatmullRomCurve3::closed(vec![
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
        ]);
        assert!(curve.point(0.0).distance(curve.point(1.0)) < 1e-4);
        assert!(curve.point(0.25).distance(Vec3::new(0.0, 1.0, 0.0)) < 1e-4);
    }

    #[test]
    fn tangent_follows_direction_of_travel() {
        let curve = line(3);
        let tangent = curve.tangent_at(0.5);
        assert!((tangent - Vec3::X).length() < 1e-3);
    }

    #[test]
    fn uniform_curve_supports_tension() {
        let curve = CatmullRomCurve3::with_options(
            vec![Vec3::ZERO, Vec3::X, Vec3::new(2.0, 1.0, 0.0)],
            false,
            CurveType::Uniform { tension: 0.5 },
        );
        assert!(curve.point(0.5).distance(Vec3::X) < 1e-5);
    }
}
