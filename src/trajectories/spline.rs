//! Interpolating B-spline curves in 3D.
//!
//! The curve parameter is the sample time itself: no arc-length or
//! normalisation is applied, so evaluating at `t` gives the position at time `t`
//! and the derivatives are true time derivatives (velocity, acceleration, jerk).

use std::cmp::Ordering;

use tracing::debug;

use crate::{
    error::{Result, TrajectoryError},
    math::Vec3,
};

/// highest degree used when fitting a trajectory, fewer samples lower it
pub const MAX_SPLINE_DEGREE: usize = 3;

/// A single B-spline curve: clamped knot vector, one 3D coefficient per basis function.
#[derive(Debug, Clone, PartialEq)]
pub struct ParametricSpline {
    knots: Vec<f64>,
    coefficients: Vec<Vec3>,
    degree: usize,
}

impl ParametricSpline {
    /// Fits the spline of the given degree passing exactly through every sample.
    ///
    /// `samples` must be sorted by strictly increasing time. Interior knots are
    /// placed on the sample times for odd degrees and halfway between them for
    /// even degrees, which yields a square and non-singular collocation system
    /// (the "not-a-knot" end conditions for cubics).
    pub fn interpolate(samples: &[(f64, Vec3)], degree: usize) -> Result<Self> {
        let m = samples.len();
        if m == 0 {
            return Err(TrajectoryError::EmptyTrajectory);
        }
        if degree == 0 || m <= degree {
            return Err(TrajectoryError::InsufficientSamples {
                required: (degree + 1).max(2),
                found: m,
            });
        }
        for pair in samples.windows(2) {
            if pair[0].0.partial_cmp(&pair[1].0) != Some(Ordering::Less) {
                return Err(TrajectoryError::InvalidParameter {
                    name: "time",
                    value: pair[1].0,
                });
            }
        }

        let times: Vec<f64> = samples.iter().map(|(t, _)| *t).collect();
        let knots = interpolation_knots(&times, degree);

        // collocation matrix, row i holds the degree + 1 basis functions alive at times[i]
        let rows: Vec<(usize, Vec<f64>)> = times
            .iter()
            .map(|&t| {
                let span = find_span(&knots, degree, t);
                (span - degree, basis_functions(&knots, degree, span, t))
            })
            .collect();
        let kl = rows
            .iter()
            .enumerate()
            .map(|(i, (first, _))| i.saturating_sub(*first))
            .max()
            .unwrap_or(0);
        let ku = rows
            .iter()
            .enumerate()
            .map(|(i, (first, _))| (first + degree).saturating_sub(i))
            .max()
            .unwrap_or(0);

        let mut matrix = BandMatrix::zeros(m, kl, ku);
        for (i, (first, basis)) in rows.iter().enumerate() {
            for (offset, value) in basis.iter().enumerate() {
                matrix.set(i, first + offset, *value);
            }
        }
        matrix.factorize()?;

        let mut coefficients: Vec<Vec3> = samples.iter().map(|(_, p)| *p).collect();
        matrix.solve(&mut coefficients);

        debug!(
            samples = m,
            degree,
            bandwidth = kl + ku + 1,
            "fitted interpolating spline"
        );
        Ok(Self {
            knots,
            coefficients,
            degree,
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn coefficients(&self) -> &[Vec3] {
        &self.coefficients
    }

    /// The parameter range covered by the knots, outside of it the end pieces are extended.
    pub fn domain(&self) -> (f64, f64) {
        (
            self.knots[self.degree],
            self.knots[self.knots.len() - self.degree - 1],
        )
    }

    /// de Boor's algorithm on the span containing `t` (or the closest end span).
    pub fn evaluate(&self, t: f64) -> Vec3 {
        let p = self.degree;
        let span = find_span(&self.knots, p, t);
        let mut d = self.coefficients[span - p..=span].to_vec();
        for r in 1..=p {
            for j in (r..=p).rev() {
                let i = span - p + j;
                let denom = self.knots[i + p + 1 - r] - self.knots[i];
                let alpha = if denom == 0. {
                    0.
                } else {
                    (t - self.knots[i]) / denom
                };
                d[j] = d[j - 1] * (1. - alpha) + d[j] * alpha;
            }
        }
        d[p]
    }

    /// The first derivative as a spline of one degree less, None for a piecewise constant spline.
    pub fn derivative(&self) -> Option<Self> {
        let p = self.degree;
        if p == 0 {
            return None;
        }
        let coefficients = self
            .coefficients
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                let denom = self.knots[i + p + 1] - self.knots[i + 1];
                if denom == 0. {
                    Vec3::zeros()
                } else {
                    (pair[1] - pair[0]) * (p as f64 / denom)
                }
            })
            .collect();
        Some(Self {
            knots: self.knots[1..self.knots.len() - 1].to_vec(),
            coefficients,
            degree: p - 1,
        })
    }
}

/// A fitted trajectory spline together with all of its derivatives.
///
/// Index `k` of the chain is the `k`-th time derivative, up to the spline degree
/// (where the derivative becomes piecewise constant).
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectorySpline {
    derivatives: Vec<ParametricSpline>,
}

impl TrajectorySpline {
    /// Fits with degree `min(MAX_SPLINE_DEGREE, N - 1)`.
    pub fn fit(samples: &[(f64, Vec3)]) -> Result<Self> {
        match samples.len() {
            0 => Err(TrajectoryError::EmptyTrajectory),
            1 => Err(TrajectoryError::InsufficientSamples {
                required: 2,
                found: 1,
            }),
            n => {
                let degree = MAX_SPLINE_DEGREE.min(n - 1);
                let spline = ParametricSpline::interpolate(samples, degree)?;
                let mut derivatives = vec![spline];
                while let Some(next) = derivatives.last().and_then(ParametricSpline::derivative) {
                    derivatives.push(next);
                }
                Ok(Self { derivatives })
            }
        }
    }

    pub fn degree(&self) -> usize {
        self.derivatives[0].degree()
    }

    pub fn spline(&self) -> &ParametricSpline {
        &self.derivatives[0]
    }

    pub fn domain(&self) -> (f64, f64) {
        self.derivatives[0].domain()
    }

    /// The `der`-th derivative spline, `der == 0` is the position spline.
    pub fn derivative(&self, der: usize) -> Result<&ParametricSpline> {
        self.derivatives
            .get(der)
            .ok_or(TrajectoryError::UnsupportedDerivativeOrder {
                requested: der,
                max: self.degree(),
            })
    }

    pub fn evaluate(&self, t: f64, der: usize) -> Result<Vec3> {
        Ok(self.derivative(der)?.evaluate(t))
    }

    pub fn evaluate_many(&self, times: &[f64], der: usize) -> Result<Vec<Vec3>> {
        let spline = self.derivative(der)?;
        Ok(times.iter().map(|&t| spline.evaluate(t)).collect())
    }
}

fn interpolation_knots(times: &[f64], degree: usize) -> Vec<f64> {
    let m = times.len();
    let first = times[0];
    let last = times[m - 1];
    let half = degree / 2;

    let mut knots = Vec::with_capacity(m + degree + 1);
    knots.extend(std::iter::repeat(first).take(degree + 1));
    for l in 0..m - degree - 1 {
        let knot = if degree % 2 == 1 {
            times[l + half + 1]
        } else {
            0.5 * (times[l + half] + times[l + half + 1])
        };
        knots.push(knot);
    }
    knots.extend(std::iter::repeat(last).take(degree + 1));
    knots
}

/// index `l` of the knot span `[knots[l], knots[l + 1])` containing `t`, clamped to the valid spans
fn find_span(knots: &[f64], degree: usize, t: f64) -> usize {
    let last_span = knots.len() - degree - 2;
    degree + knots[degree + 1..=last_span].partition_point(|&k| k <= t)
}

/// the `degree + 1` non-zero basis functions on `span` evaluated at `t`
fn basis_functions(knots: &[f64], degree: usize, span: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.; degree + 1];
    let mut left = vec![0.; degree + 1];
    let mut right = vec![0.; degree + 1];
    n[0] = 1.;
    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.;
        for r in 0..j {
            let temp = n[r] / (right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }
    n
}

/// Square band matrix, row `i` stores columns `i - kl` to `i + ku`.
struct BandMatrix {
    kl: usize,
    ku: usize,
    data: na::DMatrix<f64>,
}

impl BandMatrix {
    fn zeros(n: usize, kl: usize, ku: usize) -> Self {
        Self {
            kl,
            ku,
            data: na::DMatrix::zeros(n, kl + ku + 1),
        }
    }

    fn n(&self) -> usize {
        self.data.nrows()
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self.data[(i, j + self.kl - i)]
    }

    fn set(&mut self, i: usize, j: usize, value: f64) {
        let kl = self.kl;
        self.data[(i, j + kl - i)] = value;
    }

    // LU in place without pivoting, B-spline collocation matrices are totally positive
    fn factorize(&mut self) -> Result<()> {
        let n = self.n();
        for k in 0..n {
            let pivot = self.get(k, k);
            if pivot == 0. || !pivot.is_finite() {
                return Err(TrajectoryError::SingularFit);
            }
            let last_row = (k + self.kl).min(n - 1);
            let last_col = (k + self.ku).min(n - 1);
            for i in k + 1..=last_row {
                let factor = self.get(i, k) / pivot;
                self.set(i, k, factor);
                if factor == 0. {
                    continue;
                }
                for j in k + 1..=last_col {
                    let value = self.get(i, j) - factor * self.get(k, j);
                    self.set(i, j, value);
                }
            }
        }
        Ok(())
    }

    fn solve(&self, rhs: &mut [Vec3]) {
        let n = self.n();
        for i in 0..n {
            for j in i.saturating_sub(self.kl)..i {
                let lower = rhs[j] * self.get(i, j);
                rhs[i] -= lower;
            }
        }
        for i in (0..n).rev() {
            for j in i + 1..=(i + self.ku).min(n - 1) {
                let upper = rhs[j] * self.get(i, j);
                rhs[i] -= upper;
            }
            rhs[i] /= self.get(i, i);
        }
    }
}
