use serde::{Deserialize, Serialize};
use std::{cell::OnceCell, f64::consts::TAU};
use tracing::debug;

use super::{sampled::SampledTrajectory, spline::TrajectorySpline, Trajectory};
use crate::{
    error::{Result, TrajectoryError},
    identity::{IdentityKey, IdentityKeyBuilder},
    math::{arange, arange_len, Vec3},
};

pub const DEFAULT_POINTS_PER_REVOLUTION: u32 = 16;
pub const DEFAULT_ROTATION_TIME: f64 = 1.;
/// samples are generated slightly past the rotation time so the last one isn't lost to rounding
pub const ROTATION_TIME_OVERRUN: f64 = 1.001;

/// Uniform circular motion in a plane parallel to xy.
#[derive(Deserialize, Serialize, PartialEq, Clone, Copy, Debug)]
#[serde(default)]
pub struct CircleParams {
    /// revolutions per minute, negative turns clockwise
    pub rpm: f64,
    /// center of rotation
    pub origin: Vec3,
    /// distance of the source from the center of rotation
    pub radius: f64,
    /// angle of the source at t = 0, in radians
    pub start_angle: f64,
    pub points_per_revolution: u32,
    /// duration covered by the samples, in seconds
    pub rotation_time: f64,
}

impl Default for CircleParams {
    fn default() -> Self {
        Self {
            rpm: 0.,
            origin: Vec3::zeros(),
            radius: 0.,
            start_angle: 0.,
            points_per_revolution: DEFAULT_POINTS_PER_REVOLUTION,
            rotation_time: DEFAULT_ROTATION_TIME,
        }
    }
}

impl CircleParams {
    pub fn with_rpm(mut self, rpm: f64) -> Self {
        self.rpm = rpm;
        self
    }

    pub fn with_origin(mut self, origin: impl Into<Vec3>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_start_angle(mut self, start_angle: f64) -> Self {
        self.start_angle = start_angle;
        self
    }

    pub fn with_points_per_revolution(mut self, points_per_revolution: u32) -> Self {
        self.points_per_revolution = points_per_revolution;
        self
    }

    pub fn with_rotation_time(mut self, rotation_time: f64) -> Self {
        self.rotation_time = rotation_time;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.rpm == 0. {
            return Err(TrajectoryError::ZeroRotationRate);
        }
        let finite = [
            ("rpm", self.rpm),
            ("origin.x", self.origin.x),
            ("origin.y", self.origin.y),
            ("origin.z", self.origin.z),
            ("radius", self.radius),
            ("start_angle", self.start_angle),
            ("rotation_time", self.rotation_time),
        ];
        if let Some((name, value)) = finite.into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(TrajectoryError::InvalidParameter { name, value });
        }
        if self.radius < 0. {
            return Err(TrajectoryError::InvalidParameter {
                name: "radius",
                value: self.radius,
            });
        }
        if self.rotation_time <= 0. {
            return Err(TrajectoryError::InvalidParameter {
                name: "rotation_time",
                value: self.rotation_time,
            });
        }
        if self.points_per_revolution == 0 {
            return Err(TrajectoryError::InvalidParameter {
                name: "points_per_revolution",
                value: 0.,
            });
        }
        arange_len(0., self.sampled_time(), self.time_step())?;
        Ok(())
    }

    /// seconds between two consecutive samples
    pub fn time_step(&self) -> f64 {
        60. / (self.rpm.abs() * self.points_per_revolution as f64)
    }

    fn sampled_time(&self) -> f64 {
        self.rotation_time * ROTATION_TIME_OVERRUN
    }

    /// the exact position on the circle at `t`
    pub fn position_at(&self, t: f64) -> Vec3 {
        let phi = t * self.rpm / 60. * TAU + self.start_angle;
        Vec3::new(
            self.radius * phi.cos() + self.origin.x,
            self.radius * phi.sin() + self.origin.y,
            self.origin.z,
        )
    }

    /// `(t, position)` every `time_step` from 0 to just past `rotation_time`.
    pub fn samples(&self) -> Result<Vec<(f64, Vec3)>> {
        self.validate()?;
        let samples: Vec<(f64, Vec3)> = arange(0., self.sampled_time(), self.time_step())?
            .map(|t| (t, self.position_at(t)))
            .collect();
        debug!(
            samples = samples.len(),
            rpm = self.rpm,
            radius = self.radius,
            "generated circular trajectory samples"
        );
        Ok(samples)
    }

    pub fn identity_key(&self) -> IdentityKey {
        IdentityKeyBuilder::new("circular")
            .float(self.rpm)
            .vec3(self.origin)
            .float(self.radius)
            .float(self.start_angle)
            .count(self.points_per_revolution as u64)
            .float(self.rotation_time)
            .finish()
    }
}

/// A trajectory generated from circle parameters.
///
/// Samples of the circle are generated on first use and fitted exactly like a
/// `SampledTrajectory`. The identity key only depends on the parameters, so it
/// is available without generating anything.
#[derive(Debug, Clone)]
pub struct CircularTrajectory {
    params: CircleParams,
    sampled: OnceCell<SampledTrajectory>,
}

impl CircularTrajectory {
    pub fn new(params: CircleParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            sampled: OnceCell::new(),
        })
    }

    pub fn params(&self) -> &CircleParams {
        &self.params
    }

    /// Replaces the parameters. On error the trajectory is left unchanged.
    pub fn set_params(&mut self, params: CircleParams) -> Result<()> {
        params.validate()?;
        if params != self.params {
            self.params = params;
            self.sampled.take();
        }
        Ok(())
    }

    /// The generated samples, as a plain sampled trajectory.
    pub fn sampled(&self) -> Result<&SampledTrajectory> {
        if let Some(sampled) = self.sampled.get() {
            return Ok(sampled);
        }
        let generated = SampledTrajectory::from_points(self.params.samples()?)?;
        Ok(self.sampled.get_or_init(|| generated))
    }

    pub fn is_sampled(&self) -> bool {
        self.sampled.get().is_some()
    }
}

impl PartialEq for CircularTrajectory {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params
    }
}

impl Trajectory for CircularTrajectory {
    fn interval(&self) -> Result<(f64, f64)> {
        self.sampled()?.interval()
    }

    fn spline(&self) -> Result<&TrajectorySpline> {
        self.sampled()?.spline()
    }

    fn identity_key(&self) -> IdentityKey {
        self.params.identity_key()
    }
}
