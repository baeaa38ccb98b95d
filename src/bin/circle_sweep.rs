use source_trajectory::{CircleParams, CircularTrajectory, SweepArgs, Trajectory, Vec3};
use tracing::info;
use tracing_subscriber::EnvFilter;

const RPM: f64 = 90.;
const RADIUS: f64 = 0.5;
const HEIGHT: f64 = 1.2;
const SWEEP_STEP: f64 = 0.05;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let rotor = CircularTrajectory::new(
        CircleParams::default()
            .with_rpm(RPM)
            .with_radius(RADIUS)
            .with_origin(Vec3::new(0., 0., HEIGHT)),
    )
    .expect("couldn't create the circular trajectory");

    let (t_min, t_max) = rotor.interval().expect("trajectory has no interval");
    info!(
        t_min,
        t_max,
        key = %rotor.identity_key(),
        "circular trajectory ready"
    );

    let positions = rotor
        .sweep(SweepArgs::step(SWEEP_STEP))
        .expect("couldn't sweep positions");
    let velocities = rotor
        .sweep(SweepArgs::step(SWEEP_STEP).derivative(1))
        .expect("couldn't sweep velocities");
    for ((t, pos), vel) in positions.timed().zip(velocities) {
        info!(
            t,
            x = pos.x,
            y = pos.y,
            z = pos.z,
            speed = vel.norm(),
            "source position"
        );
    }
}
