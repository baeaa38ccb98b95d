use std::{cell::OnceCell, cmp::Ordering, collections::BTreeMap};

use super::{spline::TrajectorySpline, Trajectory};
use crate::{
    error::{Result, TrajectoryError},
    identity::{IdentityKey, IdentityKeyBuilder},
    math::Vec3,
};

/// Map key for a sample time, always finite and never -0.0
#[derive(Debug, Clone, Copy, PartialEq)]
struct SampleTime(f64);

impl SampleTime {
    fn new(t: f64) -> Result<Self> {
        if !t.is_finite() {
            return Err(TrajectoryError::NonFiniteTime { time: t });
        }
        Ok(Self(if t == 0. { 0. } else { t }))
    }
}

impl Eq for SampleTime {}

impl PartialOrd for SampleTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SampleTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A trajectory through timestamped 3D samples.
///
/// The positions in between samples come from an interpolating spline fitted
/// with time as its parameter. The spline and the identity key are computed on
/// first use and dropped by every mutation of the samples.
///
/// The caches are not synchronized: the type is `Send` but not `Sync`.
#[derive(Debug, Clone, Default)]
pub struct SampledTrajectory {
    points: BTreeMap<SampleTime, Vec3>,
    spline: OnceCell<TrajectorySpline>,
    identity: OnceCell<IdentityKey>,
}

impl SampledTrajectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds from `(time, position)` pairs in any order, a repeated time keeps the last position.
    pub fn from_points<I, P>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, P)>,
        P: Into<Vec3>,
    {
        let mut trajectory = Self::new();
        trajectory.set_points(points)?;
        Ok(trajectory)
    }

    /// Replaces all the samples. On error the trajectory is left unchanged.
    pub fn set_points<I, P>(&mut self, points: I) -> Result<()>
    where
        I: IntoIterator<Item = (f64, P)>,
        P: Into<Vec3>,
    {
        let points = points
            .into_iter()
            .map(|(t, p)| Ok((SampleTime::new(t)?, p.into())))
            .collect::<Result<BTreeMap<_, _>>>()?;
        self.points = points;
        self.invalidate();
        Ok(())
    }

    /// Adds or replaces the sample at `t`, returns the replaced position.
    pub fn insert(&mut self, t: f64, pos: impl Into<Vec3>) -> Result<Option<Vec3>> {
        let key = SampleTime::new(t)?;
        let previous = self.points.insert(key, pos.into());
        self.invalidate();
        Ok(previous)
    }

    pub fn remove(&mut self, t: f64) -> Option<Vec3> {
        let removed = self.points.remove(&SampleTime::new(t).ok()?);
        if removed.is_some() {
            self.invalidate();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.invalidate();
    }

    pub fn get(&self, t: f64) -> Option<Vec3> {
        self.points.get(&SampleTime::new(t).ok()?).copied()
    }

    /// The samples in increasing time order.
    pub fn points(&self) -> impl Iterator<Item = (f64, Vec3)> + '_ {
        self.points.iter().map(|(t, p)| (t.0, *p))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn invalidate(&mut self) {
        self.spline.take();
        self.identity.take();
    }
}

impl PartialEq for SampledTrajectory {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl Trajectory for SampledTrajectory {
    fn interval(&self) -> Result<(f64, f64)> {
        match (self.points.first_key_value(), self.points.last_key_value()) {
            (Some((first, _)), Some((last, _))) => Ok((first.0, last.0)),
            _ => Err(TrajectoryError::EmptyTrajectory),
        }
    }

    fn spline(&self) -> Result<&TrajectorySpline> {
        if let Some(spline) = self.spline.get() {
            return Ok(spline);
        }
        let samples: Vec<(f64, Vec3)> = self.points().collect();
        let fitted = TrajectorySpline::fit(&samples)?;
        Ok(self.spline.get_or_init(|| fitted))
    }

    fn identity_key(&self) -> IdentityKey {
        *self.identity.get_or_init(|| {
            self.points()
                .fold(
                    IdentityKeyBuilder::new("sampled").count(self.points.len() as u64),
                    |key, (t, p)| key.float(t).vec3(p),
                )
                .finish()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{math::Distance, trajectories::SweepArgs};

    fn sample_map() -> Vec<(f64, [f64; 3])> {
        vec![
            (0.5, [1., 0., 0.]),
            (0., [0., 0., 0.]),
            (2., [0., 2., 1.]),
            (1.25, [1., 1., 0.5]),
            (3., [-1., 1., 1.]),
        ]
    }

    #[test]
    fn interval_spans_the_keys() {
        let traj = SampledTrajectory::from_points(sample_map()).unwrap();
        assert_eq!(traj.interval().unwrap(), (0., 3.));
        assert_eq!(
            SampledTrajectory::new().interval(),
            Err(TrajectoryError::EmptyTrajectory)
        );
    }

    #[test]
    fn points_are_time_sorted() {
        let traj = SampledTrajectory::from_points(sample_map()).unwrap();
        let times: Vec<f64> = traj.points().map(|(t, _)| t).collect();
        assert_eq!(times, vec![0., 0.5, 1.25, 2., 3.]);
    }

    #[test]
    fn passes_through_samples() {
        let traj = SampledTrajectory::from_points(sample_map()).unwrap();
        for (t, p) in sample_map() {
            let loc = traj.location(t, 0).unwrap();
            assert!(loc.distance_to(p.into()) < 1e-10, "at {}: {:?}", t, loc);
        }
    }

    #[test]
    fn degree_follows_sample_count() {
        let mut traj = SampledTrajectory::new();
        traj.insert(0., [0., 0., 0.]).unwrap();
        assert_eq!(
            traj.spline().map(|s| s.degree()),
            Err(TrajectoryError::InsufficientSamples {
                required: 2,
                found: 1
            })
        );
        traj.insert(1., [1., 0., 0.]).unwrap();
        assert_eq!(traj.spline().unwrap().degree(), 1);
        traj.insert(2., [1., 1., 0.]).unwrap();
        assert_eq!(traj.spline().unwrap().degree(), 2);
        traj.insert(3., [0., 1., 0.]).unwrap();
        traj.insert(4., [0., 0., 0.]).unwrap();
        assert_eq!(traj.spline().unwrap().degree(), 3);
    }

    #[test]
    fn mutation_refits_the_spline() {
        let mut traj = SampledTrajectory::from_points(sample_map()).unwrap();
        let before = traj.location(1.25, 0).unwrap();
        assert!(before.distance_to(Vec3::new(1., 1., 0.5)) < 1e-10);
        assert_eq!(
            traj.insert(1.25, [5., 5., 5.]).unwrap(),
            Some(Vec3::new(1., 1., 0.5))
        );
        assert!(traj.location(1.25, 0).unwrap().distance_to(Vec3::new(5., 5., 5.)) < 1e-10);
        assert_eq!(traj.remove(3.), Some(Vec3::new(-1., 1., 1.)));
        assert_eq!(traj.interval().unwrap(), (0., 2.));
    }

    #[test]
    fn spline_is_cached() {
        let traj = SampledTrajectory::from_points(sample_map()).unwrap();
        let a: *const TrajectorySpline = traj.spline().unwrap();
        let b: *const TrajectorySpline = traj.spline().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn identity_follows_content() {
        let a = SampledTrajectory::from_points(sample_map()).unwrap();
        let mut b = SampledTrajectory::from_points(sample_map().into_iter().rev()).unwrap();
        assert_eq!(a.identity_key(), b.identity_key());
        b.insert(0.5, [1., 0., 1e-9]).unwrap();
        assert_ne!(a.identity_key(), b.identity_key());
        b.insert(0.5, [1., 0., 0.]).unwrap();
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn negative_zero_is_the_same_time() {
        let mut traj = SampledTrajectory::new();
        traj.insert(0., [1., 0., 0.]).unwrap();
        traj.insert(-0., [2., 0., 0.]).unwrap();
        assert_eq!(traj.len(), 1);
        assert_eq!(traj.get(0.), Some(Vec3::new(2., 0., 0.)));
    }

    #[test]
    fn rejects_non_finite_times() {
        let mut traj = SampledTrajectory::from_points(sample_map()).unwrap();
        assert!(matches!(
            traj.insert(f64::NAN, [0., 0., 0.]),
            Err(TrajectoryError::NonFiniteTime { .. })
        ));
        assert!(traj.set_points(vec![(f64::INFINITY, [0., 0., 0.])]).is_err());
        assert_eq!(traj.len(), 5);
    }

    #[test]
    fn sweep_covers_the_interval() {
        let traj = SampledTrajectory::from_points(sample_map()).unwrap();
        let sweep = traj.sweep(SweepArgs::step(0.25)).unwrap();
        assert_eq!(sweep.len(), 12);
        let times = sweep.times().to_vec();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(times[0], 0.);
        assert!(*times.last().unwrap() < 3.);
        let positions: Vec<Vec3> = sweep.collect();
        assert!(positions[2].distance_to(Vec3::new(1., 0., 0.)) < 1e-10);
    }

    #[test]
    fn derivative_beyond_degree_is_rejected() {
        let traj = SampledTrajectory::from_points(vec![(0., [0., 0., 0.]), (1., [1., 1., 1.])]).unwrap();
        assert_eq!(traj.location(0.5, 1).unwrap(), Vec3::new(1., 1., 1.));
        assert_eq!(
            traj.location(0.5, 2),
            Err(TrajectoryError::UnsupportedDerivativeOrder {
                requested: 2,
                max: 1
            })
        );
        assert!(traj.sweep(SweepArgs::step(0.1).derivative(2)).is_err());
    }
}
