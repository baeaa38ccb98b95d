use tracing::trace;

use super::spline::ParametricSpline;
use crate::{
    error::{Result, TrajectoryError},
    math::{arange, Vec3},
};

/// Arguments of a sweep along a trajectory.
///
/// Three call shapes are supported:
/// - `SweepArgs::step(0.1)`: every 0.1 s over the trajectory interval;
/// - `SweepArgs::range(2.5, 4.5, 0.1)`: every 0.1 s between 2.5 s and 4.5 s;
/// - `SweepArgs::step(0.1).derivative(1)`: the velocity every 0.1 s over the interval.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SweepArgs {
    pub t_start: Option<f64>,
    pub t_end: Option<f64>,
    pub delta_t: Option<f64>,
    pub derivative: usize,
}

impl SweepArgs {
    pub fn step(delta_t: f64) -> Self {
        // a lone argument lands in t_start and is read back as the step
        Self {
            t_start: Some(delta_t),
            ..Default::default()
        }
    }

    pub fn range(t_start: f64, t_end: f64, delta_t: f64) -> Self {
        Self {
            t_start: Some(t_start),
            t_end: Some(t_end),
            delta_t: Some(delta_t),
            derivative: 0,
        }
    }

    /// Dispatches on the number of positional arguments: `[delta_t]` or `[t_start, t_end, delta_t]`.
    pub fn positional(args: &[f64]) -> Result<Self> {
        match *args {
            [delta_t] => Ok(Self::step(delta_t)),
            [t_start, t_end, delta_t] => Ok(Self::range(t_start, t_end, delta_t)),
            _ => Err(TrajectoryError::InvalidSweepArguments { count: args.len() }),
        }
    }

    pub fn derivative(mut self, der: usize) -> Self {
        self.derivative = der;
        self
    }

    /// Resolves the defaults against the trajectory interval, returns `(t_start, t_end, delta_t)`.
    ///
    /// Without a step, `t_start` is taken as the step and the whole interval is swept.
    /// A missing end defaults to the end of the interval. Both bounds must be finite.
    pub fn resolve(&self, interval: (f64, f64)) -> Result<(f64, f64, f64)> {
        let (mut t_start, mut t_end, mut delta_t) = (self.t_start, self.t_end, self.delta_t);
        if delta_t.is_none() {
            delta_t = t_start;
            t_start = Some(interval.0);
            t_end = Some(interval.1);
        }
        let t_end = t_end.unwrap_or(interval.1);
        let t_start = t_start.unwrap_or(interval.0);
        if let Some(time) = [t_start, t_end].into_iter().find(|t| !t.is_finite()) {
            return Err(TrajectoryError::NonFiniteTime { time });
        }
        match delta_t {
            Some(dt) if dt > 0. && dt.is_finite() => Ok((t_start, t_end, dt)),
            dt => Err(TrajectoryError::InvalidStep {
                delta_t: dt.unwrap_or(0.),
            }),
        }
    }
}

/// Lazy sequence of positions (or derivatives) at regular time steps.
///
/// Nothing is evaluated until the first call to `next`, which evaluates every
/// sample time in one batch. Later calls hand out the already computed values.
pub struct Sweep<'s> {
    spline: &'s ParametricSpline,
    times: Vec<f64>,
    batch: Option<std::vec::IntoIter<Vec3>>,
}

impl<'s> Sweep<'s> {
    pub(crate) fn new(
        spline: &'s ParametricSpline,
        t_start: f64,
        t_end: f64,
        delta_t: f64,
    ) -> Result<Self> {
        Ok(Self {
            spline,
            times: arange(t_start, t_end, delta_t)?.collect(),
            batch: None,
        })
    }

    /// The sample times of the sweep, in order.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Zips each yielded value with its sample time.
    pub fn timed(self) -> impl Iterator<Item = (f64, Vec3)> + 's {
        let times = self.times.clone();
        times.into_iter().zip(self)
    }

    fn batch(&mut self) -> &mut std::vec::IntoIter<Vec3> {
        let spline = self.spline;
        let times = &self.times;
        self.batch.get_or_insert_with(|| {
            trace!(samples = times.len(), "evaluating sweep batch");
            times
                .iter()
                .map(|&t| spline.evaluate(t))
                .collect::<Vec<_>>()
                .into_iter()
        })
    }
}

impl Iterator for Sweep<'_> {
    type Item = Vec3;

    fn next(&mut self) -> Option<Self::Item> {
        self.batch().next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match &self.batch {
            Some(batch) => batch.len(),
            None => self.times.len(),
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Sweep<'_> {}
