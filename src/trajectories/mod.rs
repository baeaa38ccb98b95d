pub mod circular;
pub mod sampled;
pub mod spline;
mod sweep;

pub use circular::{CircleParams, CircularTrajectory};
pub use sampled::SampledTrajectory;
pub use spline::{ParametricSpline, TrajectorySpline};
pub use sweep::{Sweep, SweepArgs};

use tracing::trace;

use crate::{error::Result, identity::IdentityKey, math::Vec3};

/// A continuous path of a point source, evaluated through its fitted spline.
pub trait Trajectory {
    /// `(t_min, t_max)` of the samples.
    fn interval(&self) -> Result<(f64, f64)>;

    /// The fitted spline, computed on first use and cached.
    fn spline(&self) -> Result<&TrajectorySpline>;

    fn identity_key(&self) -> IdentityKey;

    /// Position (`der == 0`) or its `der`-th time derivative at `t`.
    ///
    /// Times outside the interval are extrapolated from the first/last spline piece.
    fn location(&self, t: f64, der: usize) -> Result<Vec3> {
        let spline = self.spline()?;
        trace_extrapolation(spline, std::iter::once(t));
        spline.evaluate(t, der)
    }

    /// Same as `location` for many times at once, the output follows the input order.
    fn locations(&self, times: &[f64], der: usize) -> Result<Vec<Vec3>> {
        let spline = self.spline()?;
        trace_extrapolation(spline, times.iter().copied());
        spline.evaluate_many(times, der)
    }

    /// Positions (or derivatives) at regular time steps, see `SweepArgs`.
    fn sweep(&self, args: SweepArgs) -> Result<Sweep<'_>> {
        let (t_start, t_end, delta_t) = args.resolve(self.interval()?)?;
        let spline = self.spline()?.derivative(args.derivative)?;
        Sweep::new(spline, t_start, t_end, delta_t)
    }

    fn get_position(&self, t: f64) -> Result<Vec3> {
        self.location(t, 0)
    }

    fn get_velocity(&self, t: f64) -> Result<Vec3> {
        self.location(t, 1)
    }

    fn get_acceleration(&self, t: f64) -> Result<Vec3> {
        self.location(t, 2)
    }

    fn get_total_runtime(&self) -> Result<f64> {
        let (t_min, t_max) = self.interval()?;
        Ok(t_max - t_min)
    }
}

fn trace_extrapolation(spline: &TrajectorySpline, times: impl Iterator<Item = f64>) {
    let (t_min, t_max) = spline.domain();
    for t in times.filter(|&t| t < t_min || t > t_max) {
        trace!(t, t_min, t_max, "extrapolating trajectory");
    }
}
