//! Continuous trajectories of moving point sources.
//!
//! A trajectory is described by timestamped 3D samples. An interpolating spline,
//! parameterized by time, gives the position and its derivatives at any instant.
//! `CircularTrajectory` generates the samples of a uniform circular motion
//! instead of taking them from the caller.
//!
//! # Examples
//!
//! ```
//! use source_trajectory::{
//!     trajectories::{CircleParams, CircularTrajectory, SweepArgs, Trajectory},
//!     TrajectoryError,
//! };
//!
//! fn main() -> Result<(), TrajectoryError> {
//!     let rotor = CircularTrajectory::new(
//!         CircleParams::default().with_rpm(60.).with_radius(1.),
//!     )?;
//!
//!     // one position every 10ms over the whole rotation
//!     for pos in rotor.sweep(SweepArgs::step(0.01))? {
//!         assert!((pos.norm() - 1.).abs() < 1e-2);
//!     }
//!
//!     // velocity at a single instant
//!     let vel = rotor.location(0.5, 1)?;
//!     assert!(vel.norm() > 6.);
//!     Ok(())
//! }
//! ```
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod identity;
pub mod math;
pub mod trajectories;

pub use error::TrajectoryError;
pub use identity::IdentityKey;
pub use math::Vec3;
pub use trajectories::{
    CircleParams, CircularTrajectory, SampledTrajectory, Sweep, SweepArgs, Trajectory,
};
