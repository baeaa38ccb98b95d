use crate::error::{Result, TrajectoryError};

pub type Vec3 = na::Vector3<f64>;

pub trait Distance {
    fn distance_to(&self, other: Self) -> f64;
}

impl Distance for Vec3 {
    fn distance_to(&self, other: Self) -> f64 {
        (other - self).norm()
    }
}

/// most values a single sweep or circle sampling may produce
pub const MAX_SAMPLES: usize = 1 << 20;

/// number of elements `start, start + step, ...` strictly below `stop`
///
/// Errors when the count can't be represented: a non-finite bound, a step too
/// small for the span, or more than `MAX_SAMPLES` values.
pub fn arange_len(start: f64, stop: f64, step: f64) -> Result<usize> {
    if !start.is_finite() || !stop.is_finite() {
        return Err(TrajectoryError::NonFiniteTime {
            time: if start.is_finite() { stop } else { start },
        });
    }
    if !(step > 0. && step.is_finite()) {
        return Err(TrajectoryError::InvalidStep { delta_t: step });
    }
    let n = ((stop - start) / step).ceil();
    if !n.is_finite() {
        return Err(TrajectoryError::InvalidStep { delta_t: step });
    }
    if n <= 0. {
        return Ok(0);
    }
    if n > MAX_SAMPLES as f64 {
        return Err(TrajectoryError::TooManySamples {
            requested: n,
            max: MAX_SAMPLES,
        });
    }
    Ok(n as usize)
}

/// `start, start + step, ...` strictly below `stop`, each value computed as `start + i * step`
pub fn arange(start: f64, stop: f64, step: f64) -> Result<impl Iterator<Item = f64>> {
    let len = arange_len(start, stop, step)?;
    Ok((0..len).map(move |i| start + i as f64 * step))
}
