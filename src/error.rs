use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TrajectoryError {
    /// no samples to fit or to take an interval from
    EmptyTrajectory,
    /// not enough samples for the spline degree
    InsufficientSamples { required: usize, found: usize },
    /// sweep step missing, not positive, not finite or too small for the span
    InvalidStep { delta_t: f64 },
    /// a circle turning at 0 rpm has no sampling period
    ZeroRotationRate,
    UnsupportedDerivativeOrder { requested: usize, max: usize },
    /// positional sweep call with an argument count other than 1 or 3
    InvalidSweepArguments { count: usize },
    NonFiniteTime { time: f64 },
    InvalidParameter { name: &'static str, value: f64 },
    /// the collocation system of the interpolating fit is singular
    SingularFit,
    /// a sweep or circle sampling would produce more values than allowed
    TooManySamples { requested: f64, max: usize },
}

impl fmt::Display for TrajectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrajectoryError::EmptyTrajectory => write!(f, "trajectory has no sampled points"),
            TrajectoryError::InsufficientSamples { required, found } => write!(
                f,
                "trajectory needs at least {} sampled points, found {}",
                required, found
            ),
            TrajectoryError::InvalidStep { delta_t } => {
                write!(f, "invalid sweep step {}", delta_t)
            }
            TrajectoryError::ZeroRotationRate => {
                write!(f, "circular trajectory can't be sampled at 0 rpm")
            }
            TrajectoryError::UnsupportedDerivativeOrder { requested, max } => write!(
                f,
                "derivative of order {} requested, spline supports up to {}",
                requested, max
            ),
            TrajectoryError::InvalidSweepArguments { count } => write!(
                f,
                "sweep takes 1 (delta_t) or 3 (t_start, t_end, delta_t) arguments, got {}",
                count
            ),
            TrajectoryError::NonFiniteTime { time } => {
                write!(f, "time must be finite, got {}", time)
            }
            TrajectoryError::InvalidParameter { name, value } => {
                write!(f, "invalid value {} for parameter `{}`", value, name)
            }
            TrajectoryError::SingularFit => {
                write!(f, "couldn't solve the spline interpolation system")
            }
            TrajectoryError::TooManySamples { requested, max } => write!(
                f,
                "{} samples requested, at most {} are allowed",
                requested, max
            ),
        }
    }
}

impl std::error::Error for TrajectoryError {}

pub type Result<T> = std::result::Result<T, TrajectoryError>;
