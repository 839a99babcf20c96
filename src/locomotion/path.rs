//! Closed wandering paths in the ground plane.
//!
//! A path is a closed centripetal Catmull-Rom curve through a handful of
//! control points, pre-sampled into a polyline so that root motion can look
//! up nodes by index in O(1). Paths are immutable once built and are shared
//! between creatures behind an `Arc`.

use glam::Vec3;
use rand::Rng;

use crate::error::SkitterError;
use crate::options::PathOptions;

/// Number of polyline samples taken when none is specified.
pub const DEFAULT_SAMPLES: usize = 100;

/// Fewest control points (and samples) a closed path may have.
pub const MIN_POINTS: usize = 4;

/// Centripetal parameterization exponent applied to squared distances
/// (alpha = 0.5 on distances).
const CENTRIPETAL_EXPONENT: f32 = 0.25;

/// Axis-aligned wander area in the XZ plane at a fixed height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathBounds {
    /// Smallest x coordinate.
    pub min_x: f32,
    /// Smallest z coordinate.
    pub min_z: f32,
    /// Largest x coordinate.
    pub max_x: f32,
    /// Largest z coordinate.
    pub max_z: f32,
    /// Height (y) of every generated point.
    pub elevation: f32,
}

impl PathBounds {
    /// Square area of half-width `half_extent` centred on the origin.
    #[must_use]
    pub fn square(half_extent: f32, elevation: f32) -> Self {
        Self {
            min_x: -half_extent,
            min_z: -half_extent,
            max_x: half_extent,
            max_z: half_extent,
            elevation,
        }
    }

    /// Centre of the area at path elevation.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.min_x + self.max_x) * 0.5,
            self.elevation,
            (self.min_z + self.max_z) * 0.5,
        )
    }

    fn validate(&self) -> Result<(), SkitterError> {
        let all_finite = [
            self.min_x,
            self.min_z,
            self.max_x,
            self.max_z,
            self.elevation,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return Err(SkitterError::InvalidConfiguration(
                "path bounds must be finite".to_owned(),
            ));
        }
        if self.max_x <= self.min_x || self.max_z <= self.min_z {
            return Err(SkitterError::InvalidConfiguration(format!(
                "path bounds are empty: x {}..{}, z {}..{}",
                self.min_x, self.max_x, self.min_z, self.max_z
            )));
        }
        Ok(())
    }
}

/// Cubic `c0 + c1·t + c2·t² + c3·t³` for one curve span.
#[derive(Clone, Copy)]
struct CubicSpan {
    c0: Vec3,
    c1: Vec3,
    c2: Vec3,
    c3: Vec3,
}

impl CubicSpan {
    /// Hermite span from `x0` to `x1` with tangents `t0`, `t1`.
    fn hermite(x0: Vec3, x1: Vec3, t0: Vec3, t1: Vec3) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    /// Non-uniform Catmull-Rom span between `p1` and `p2`.
    fn centripetal(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        let mut dt0 = p0.distance_squared(p1).powf(CENTRIPETAL_EXPONENT);
        let mut dt1 = p1.distance_squared(p2).powf(CENTRIPETAL_EXPONENT);
        let mut dt2 = p2.distance_squared(p3).powf(CENTRIPETAL_EXPONENT);

        // Coincident control points would divide by zero below.
        if dt1 < 1e-4 {
            dt1 = 1.0;
        }
        if dt0 < 1e-4 {
            dt0 = dt1;
        }
        if dt2 < 1e-4 {
            dt2 = dt1;
        }

        let t1 = (p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1;
        let t2 = (p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2;

        Self::hermite(p1, p2, t1 * dt1, t2 * dt1)
    }

    fn eval(&self, t: f32) -> Vec3 {
        let t2 = t * t;
        let t3 = t2 * t;
        self.c0 + self.c1 * t + self.c2 * t2 + self.c3 * t3
    }
}

/// An immutable closed path: control points plus the sampled polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    control: Vec<Vec3>,
    points: Vec<Vec3>,
}

impl Path {
    /// Build a closed path through explicit control points, sampled into
    /// `samples` polyline points.
    pub fn from_control_points(
        control: Vec<Vec3>,
        samples: usize,
    ) -> Result<Self, SkitterError> {
        if control.len() < MIN_POINTS {
            return Err(SkitterError::InvalidConfiguration(format!(
                "a closed path needs at least {MIN_POINTS} control points, \
                 got {}",
                control.len()
            )));
        }
        if samples < MIN_POINTS {
            return Err(SkitterError::InvalidConfiguration(format!(
                "a closed path needs at least {MIN_POINTS} samples, got \
                 {samples}"
            )));
        }
        if control.iter().any(|p| !p.is_finite()) {
            return Err(SkitterError::InvalidConfiguration(
                "control points must be finite".to_owned(),
            ));
        }

        let mut path = Self {
            control,
            points: Vec::with_capacity(samples),
        };
        path.points = (0..samples)
            .map(|i| path.point_at(i as f32 / samples as f32))
            .collect();
        Ok(path)
    }

    /// Evaluate the continuous closed curve at `u`; `u` wraps, so
    /// `point_at(1.0)` coincides with `point_at(0.0)`.
    #[must_use]
    pub fn point_at(&self, u: f32) -> Vec3 {
        let l = self.control.len();
        let p = u.rem_euclid(1.0) * l as f32;
        let mut span = p.floor() as usize;
        let mut weight = p - p.floor();
        // rem_euclid may round up to exactly 1.0
        if span >= l {
            span = 0;
            weight = 0.0;
        }

        let p0 = self.control[(span + l - 1) % l];
        let p1 = self.control[span];
        let p2 = self.control[(span + 1) % l];
        let p3 = self.control[(span + 2) % l];

        CubicSpan::centripetal(p0, p1, p2, p3).eval(weight)
    }

    /// Sampled polyline point at `index`, wrapping modulo the path length.
    #[must_use]
    pub fn point(&self, index: usize) -> Vec3 {
        self.points[index % self.points.len()]
    }

    /// Index of the node after `index` on the closed loop.
    #[must_use]
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.points.len()
    }

    /// Number of sampled polyline points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; construction rejects short paths.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The sampled polyline.
    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// The control points the curve passes through.
    #[must_use]
    pub fn control_points(&self) -> &[Vec3] {
        &self.control
    }

    /// Length of the closed polyline, including the wrap-around edge.
    #[must_use]
    pub fn total_length(&self) -> f32 {
        (0..self.points.len())
            .map(|i| self.point(i).distance(self.point(i + 1)))
            .sum()
    }
}

/// Generate a closed wandering path through `control_point_count` random
/// points inside `bounds`, sampled at [`DEFAULT_SAMPLES`] points.
pub fn generate_path(
    control_point_count: usize,
    bounds: &PathBounds,
    rng: &mut impl Rng,
) -> Result<Path, SkitterError> {
    generate_path_with_samples(
        control_point_count,
        DEFAULT_SAMPLES,
        bounds,
        rng,
    )
}

/// [`generate_path`] with counts and bounds taken from options.
pub fn generate_path_from_options(
    options: &PathOptions,
    rng: &mut impl Rng,
) -> Result<Path, SkitterError> {
    generate_path_with_samples(
        options.control_points,
        options.samples,
        &options.bounds(),
        rng,
    )
}

/// [`generate_path`] with an explicit sample count.
pub fn generate_path_with_samples(
    control_point_count: usize,
    samples: usize,
    bounds: &PathBounds,
    rng: &mut impl Rng,
) -> Result<Path, SkitterError> {
    if control_point_count < MIN_POINTS {
        return Err(SkitterError::InvalidConfiguration(format!(
            "a closed path needs at least {MIN_POINTS} control points, got \
             {control_point_count}"
        )));
    }
    bounds.validate()?;

    let mut control: Vec<Vec3> = (0..control_point_count)
        .map(|_| {
            Vec3::new(
                rng.random_range(bounds.min_x..=bounds.max_x),
                bounds.elevation,
                rng.random_range(bounds.min_z..=bounds.max_z),
            )
        })
        .collect();

    // Visit the points in angular order around the centre so the loop
    // circulates instead of criss-crossing the area.
    let center = bounds.center();
    control.sort_by(|a, b| {
        let angle_a = (a.z - center.z).atan2(a.x - center.x);
        let angle_b = (b.z - center.z).atan2(b.x - center.x);
        angle_a.total_cmp(&angle_b)
    });

    log::debug!(
        "generated path: {control_point_count} control points, {samples} \
         samples"
    );

    Path::from_control_points(control, samples)
}
