#![cfg(test)]

use core::cell::Cell;
use core::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::{DQuat, DVec3};

use crate::{
    presets, CachingOrbit, CelestialObject, CoordType, ElementsMode, Frame, FrameKind,
    KeplerOrbit, Orbit, OrbitError, OrbitalElements, PlayerFrame, PositionSource, Trajectory,
    Vsop87Orbit, AU, GRAVITATIONAL_CONSTANT, MJD_J2000, SECONDS_PER_DAY,
};

const ORBIT_POLL_ANGLES: usize = 1024;
const RANDOM_RUNS: usize = 256;


use assertions::*;
use polling::*;
use seeders::*;

fn unit_orbit() -> OrbitalElements {
    OrbitalElements::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
}

fn earth_orbit() -> OrbitalElements {
    let mut elements = presets::earth_elements();
    elements
        .setup(5.972e24, 1.989e30, MJD_J2000)
        .unwrap_or_else(|e| panic!("{e}"));
    elements
}

#[test]
fn unit_orbit_angle() {
    let orbit = unit_orbit();

    let tests = [
        ("unit orbit 1", 0.0 * PI, DVec3::new(1.0, 0.0, 0.0)),
        ("unit orbit 2", 0.5 * PI, DVec3::new(0.0, 1.0, 0.0)),
        ("unit orbit 3", 1.0 * PI, DVec3::new(-1.0, 0.0, 0.0)),
        ("unit orbit 4", 1.5 * PI, DVec3::new(0.0, -1.0, 0.0)),
        ("unit orbit 5", 2.0 * PI, DVec3::new(1.0, 0.0, 0.0)),
    ];

    for (what, angle, expected) in tests {
        assert_almost_eq_vec3(orbit.get_position_at_true_anomaly(angle), expected, what);
    }
}

#[test]
fn tilted_90deg() {
    let orbit = OrbitalElements::new(1.0, 0.0, FRAC_PI_2, 0.0, 0.0, 0.0, 0.0);

    assert_almost_eq_vec3(
        orbit.get_position_at_true_anomaly(FRAC_PI_2),
        DVec3::Z,
        "top of a polar orbit",
    );
    assert_almost_eq_vec3(
        orbit.get_orbital_plane_normal(),
        DVec3::new(0.0, -1.0, 0.0),
        "normal of a polar orbit",
    );
}

#[test]
fn circular_apsides_coincide() {
    let orbit = OrbitalElements::new(5.0, 0.0, 0.3, 0.2, 0.1, 0.0, 0.0);
    assert_eq!(orbit.get_periapsis(), 5.0);
    assert_eq!(orbit.get_apoapsis(), 5.0);
    assert_eq!(orbit.get_semi_minor_axis(), 5.0);
    assert_eq!(orbit.get_linear_eccentricity(), 0.0);
}

#[test]
fn almost_parabolic_periapsis_shrinks() {
    let mut previous = f64::INFINITY;
    for e in [0.9, 0.99, 0.999_999, 1.0 - 1e-9] {
        let orbit = OrbitalElements::new(1.0, e, 0.0, 0.0, 0.0, 0.0, 0.0);
        let periapsis = orbit.get_periapsis();
        assert!(periapsis < previous, "e = {e}");
        assert!(orbit.is_closed(), "e = {e}");
        previous = periapsis;
    }
    assert!(previous < 1e-8);
}

#[test]
fn hyperbolic_shape() {
    let orbit = OrbitalElements::new(-1e7, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    assert_almost_eq(orbit.get_periapsis(), 1e7, "hyperbolic periapsis");
    assert_eq!(orbit.get_apoapsis(), f64::INFINITY);
    assert_almost_eq(orbit.get_semi_latus_rectum(), 3e7, "hyperbolic p");
    assert!(!orbit.is_closed());

    // Asymptote: r grows without bound as nu approaches acos(-1/e)
    let asymptote = (-1.0f64 / 2.0).acos();
    assert!(orbit.get_radius_at_true_anomaly(asymptote - 1e-6) > 1e12);
}

#[test]
fn mu_dependent_queries_fail_before_setup() {
    let mut orbit = unit_orbit();

    assert_eq!(orbit.get_mean_motion(), Err(OrbitError::NotConfigured));
    assert_eq!(orbit.get_orbital_period(), Err(OrbitError::NotConfigured));
    assert_eq!(orbit.get_position_at_time(0.0), Err(OrbitError::NotConfigured));
    assert_eq!(orbit.update(0.0), Err(OrbitError::NotConfigured));
    assert_eq!(
        orbit.calculate(DVec3::X, DVec3::Y, 0.0),
        Err(OrbitError::NotConfigured)
    );

    // Geometry needs no masses
    assert_almost_eq_vec3(orbit.get_position_at_true_anomaly(0.0), DVec3::X, "geometry");
}

#[test]
fn invalid_masses_are_rejected() {
    let mut orbit = unit_orbit();
    let before = orbit.clone();

    assert!(matches!(
        orbit.setup(-1.0, 0.0, 0.0),
        Err(OrbitError::InvalidMass { .. })
    ));
    assert!(matches!(
        orbit.setup(0.0, f64::NAN, 0.0),
        Err(OrbitError::InvalidMass { .. })
    ));
    assert_eq!(orbit, before);
}

#[test]
fn setup_is_idempotent() {
    for _ in 0..RANDOM_RUNS {
        let mut once = random_elliptic();
        let (m, big_m) = random_masses();
        let epoch = random_epoch();

        once.setup(m, big_m, epoch).unwrap_or_else(|e| panic!("{e}"));
        let mut twice = once.clone();
        twice.setup(m, big_m, epoch).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(once, twice);
        assert_eq!(
            once.get_position_at_time(epoch + 1.0),
            twice.get_position_at_time(epoch + 1.0)
        );
    }
}

#[test]
fn reset_keeps_masses() {
    let mut orbit = earth_orbit();
    let mu = orbit.get_gravitational_parameter().unwrap_or_else(|e| panic!("{e}"));

    orbit
        .reset(2.0 * AU, 0.1, 0.0, 0.0, 0.0, 0.0, MJD_J2000)
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(orbit.get_gravitational_parameter(), Ok(mu));
    assert_eq!(orbit.mode(), ElementsMode::FromElements);

    let period = orbit.get_orbital_period().unwrap_or_else(|e| panic!("{e}"));
    assert_relative_eq(
        period,
        TAU * ((2.0 * AU).powi(3) / mu).sqrt(),
        1e-12,
        "period after reset",
    );
}

#[test]
fn configure_is_reset_then_setup() {
    let mut configured = unit_orbit();
    configured
        .configure(7e6, 0.1, 0.2, 0.3, 0.4, 0.5, 60_000.0, 10.0, 5.972e24)
        .unwrap_or_else(|e| panic!("{e}"));

    let mut manual = unit_orbit();
    manual
        .reset(7e6, 0.1, 0.2, 0.3, 0.4, 0.5, 60_000.0)
        .unwrap_or_else(|e| panic!("{e}"));
    manual
        .setup(10.0, 5.972e24, 60_000.0)
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(configured, manual);
}

#[test]
fn set_masses_rescales_mean_motion() {
    let mut orbit = earth_orbit();
    let n = orbit.get_mean_motion().unwrap_or_else(|e| panic!("{e}"));

    orbit
        .set_masses(0.0, 4.0 * (1.989e30 + 5.972e24))
        .unwrap_or_else(|e| panic!("{e}"));
    let quadrupled = orbit.get_mean_motion().unwrap_or_else(|e| panic!("{e}"));

    assert_relative_eq(quadrupled, 2.0 * n, 1e-12, "mean motion with 4x mass");
    assert_eq!(orbit.get_epoch(), MJD_J2000);
}

#[test]
fn earth_like_orbit_at_j2000() {
    let orbit = earth_orbit();
    let a = orbit.get_semi_major_axis();
    let e = orbit.get_eccentricity();

    let r = orbit
        .get_position_at_time(MJD_J2000)
        .unwrap_or_else(|e| panic!("{e}"))
        .length();
    assert!(r >= a * (1.0 - e) * (1.0 - 1e-12), "r = {r}");
    assert!(r <= a * (1.0 + e) * (1.0 + 1e-12), "r = {r}");

    let mu = GRAVITATIONAL_CONSTANT * (1.989e30 + 5.972e24);
    let period = orbit.get_orbital_period().unwrap_or_else(|e| panic!("{e}"));
    assert_relative_eq(period, TAU * (a.powi(3) / mu).sqrt(), 1e-6, "Earth period");
    assert_relative_eq(period / SECONDS_PER_DAY, 365.25, 1e-3, "Earth year");
}

#[test]
fn literal_earth_elements_at_epoch() {
    let mut orbit = OrbitalElements::new(
        AU,
        0.0167,
        0.0,
        0.0,
        114.2f64.to_radians(),
        100.5f64.to_radians(),
        MJD_J2000,
    );
    orbit
        .setup(0.0, 1.989e30, MJD_J2000)
        .unwrap_or_else(|e| panic!("{e}"));

    let r = orbit
        .get_position_at_time(MJD_J2000)
        .unwrap_or_else(|e| panic!("{e}"))
        .length();
    assert!(r >= orbit.get_periapsis() * (1.0 - 1e-12), "r = {r}");
    assert!(r <= orbit.get_apoapsis() * (1.0 + 1e-12), "r = {r}");
    // 13.7 degrees before perihelion
    assert!(r < AU, "r = {r}");

    let mu = GRAVITATIONAL_CONSTANT * 1.989e30;
    let period = orbit.get_orbital_period().unwrap_or_else(|e| panic!("{e}"));
    assert_relative_eq(period, TAU * (AU.powi(3) / mu).sqrt(), 1e-6, "period");
}

#[test]
fn earth_preset_keeps_the_tabulated_plane() {
    let elements = presets::earth_elements();
    assert!(elements.get_inclination() >= 0.0);

    // i = -0.00001531 deg, node 0
    let tilt = (-0.000_015_31f64).to_radians();
    let tabulated = DVec3::new(0.0, -tilt.sin(), tilt.cos());
    assert_almost_eq_vec3(
        elements.get_orbital_plane_normal(),
        tabulated,
        "Earth plane normal",
    );
    assert!(elements.get_orbital_plane_normal().y > 0.0);
}

#[test]
fn semi_major_axis_sign_must_match_eccentricity() {
    let not_conics = [
        (-7e6, 0.5),
        (0.0, 0.0),
        (7e6, 2.0),
        (-7e6, 1.0),
        (7e6, -0.1),
        (f64::NAN, 0.1),
        (7e6, f64::INFINITY),
    ];

    for (a, e) in not_conics {
        let what = format!("a = {a}, e = {e}");

        let mut orbit = OrbitalElements::new(a, e, 0.1, 0.2, 0.3, 0.4, MJD_J2000);
        assert!(
            matches!(
                orbit.setup(0.0, 5.972e24, MJD_J2000),
                Err(OrbitError::InvalidElements { .. })
            ),
            "{what}"
        );
        assert_eq!(
            orbit.get_velocity_at_time(MJD_J2000),
            Err(OrbitError::NotConfigured),
            "{what}"
        );

        let mut configured = earth_orbit();
        let before = configured.clone();
        assert!(
            matches!(
                configured.reset(a, e, 0.1, 0.2, 0.3, 0.4, MJD_J2000),
                Err(OrbitError::InvalidElements { .. })
            ),
            "{what}"
        );
        assert!(
            matches!(
                configured.configure(a, e, 0.1, 0.2, 0.3, 0.4, MJD_J2000, 0.0, 1.989e30),
                Err(OrbitError::InvalidElements { .. })
            ),
            "{what}"
        );
        assert_eq!(configured, before, "{what}");
    }

    for (a, e) in [(7e6, 0.0), (7e6, 0.99), (7e6, 1.0), (-7e6, 1.5)] {
        let mut orbit = OrbitalElements::new(a, e, 0.1, 0.2, 0.3, 0.4, MJD_J2000);
        orbit
            .setup(0.0, 5.972e24, MJD_J2000)
            .unwrap_or_else(|err| panic!("a = {a}, e = {e}: {err}"));
        let velocity = orbit
            .get_velocity_at_time(MJD_J2000 + 0.1)
            .unwrap_or_else(|err| panic!("a = {a}, e = {e}: {err}"));
        assert!(velocity.is_finite(), "a = {a}, e = {e}: {velocity:?}");
    }
}

#[test]
fn polled_radius_stays_between_apsides() {
    for _ in 0..16 {
        let orbit = random_elliptic();
        let (periapsis, apoapsis) = (orbit.get_periapsis(), orbit.get_apoapsis());

        for position in poll_orbit(&orbit) {
            let r = position.length();
            assert!(r >= periapsis * (1.0 - 1e-9), "{r} below {periapsis}");
            assert!(r <= apoapsis * (1.0 + 1e-9), "{r} above {apoapsis}");
        }
    }
}

#[test]
fn polled_hyperbola_never_comes_closer_than_periapsis() {
    for _ in 0..16 {
        let orbit = random_hyperbolic();
        let periapsis = orbit.get_periapsis();

        for position in poll_orbit(&orbit) {
            assert!(position.length() >= periapsis * (1.0 - 1e-9));
        }
    }
}

#[test]
fn elliptic_kepler_residual() {
    for _ in 0..RANDOM_RUNS * 16 {
        let e = rand::random_range(0.0..=0.99);
        let m = rand::random_range(0.0..TAU);
        let orbit = OrbitalElements::new(1.0, e, 0.0, 0.0, 0.0, 0.0, 0.0);

        let ea = orbit.get_eccentric_anomaly_at_mean_anomaly(m);
        assert!((0.0..TAU).contains(&ea), "E = {ea} out of range");

        let residual = angle_distance(ea - e * ea.sin(), m);
        assert!(residual < 1e-10, "e = {e}, M = {m}, residual = {residual}");
    }
}

#[test]
fn hyperbolic_kepler_residual() {
    for _ in 0..RANDOM_RUNS * 16 {
        let e = rand::random_range(1.01..10.0);
        let m = rand::random_range(-50.0..50.0);
        let orbit = OrbitalElements::new(-1.0, e, 0.0, 0.0, 0.0, 0.0, 0.0);

        let h = orbit.get_eccentric_anomaly_at_mean_anomaly(m);
        let residual = e * h.sinh() - h - m;
        assert!(
            residual.abs() < 1e-9 * (1.0 + m.abs()),
            "e = {e}, M = {m}, residual = {residual}"
        );
        assert_eq!(h.signum(), m.signum(), "e = {e}, M = {m}");
    }
}

#[test]
fn memoized_anomaly_matches_solver() {
    let mut orbit = OrbitalElements::new(1.0, 0.6, 0.0, 0.0, 0.0, 0.0, 0.0);

    for m in [0.1, 0.1, 2.0, 0.1] {
        let memoized = orbit.get_eccentric_anomaly(m);
        let solved = orbit.get_eccentric_anomaly_at_mean_anomaly(m);
        assert_eq!(memoized.to_bits(), solved.to_bits(), "M = {m}");
    }
}

#[test]
fn update_matches_pure_propagation() {
    for _ in 0..RANDOM_RUNS {
        let mut orbit = random_elliptic();
        let t = orbit.get_epoch() + rand::random_range(-100.0..100.0);

        let pure = orbit
            .get_state_vectors_at_time(t)
            .unwrap_or_else(|e| panic!("{e}"));
        let first = orbit.update(t).unwrap_or_else(|e| panic!("{e}"));
        let second = orbit.update(t).unwrap_or_else(|e| panic!("{e}"));

        assert_eq_vec3(first.position, pure.position, "memoized position");
        assert_eq_vec3(second.velocity, pure.velocity, "memoized velocity");
    }
}

#[test]
fn true_and_mean_anomaly_are_inverse() {
    for _ in 0..RANDOM_RUNS {
        let orbit = random_elliptic();
        let nu = rand::random_range(0.0..TAU);

        let m = orbit.get_mean_anomaly_at_true_anomaly(nu);
        let back = orbit.get_true_anomaly_at_mean_anomaly(m);
        assert!(angle_distance(nu, back) < 1e-8, "nu = {nu}, back = {back}");
    }

    for _ in 0..RANDOM_RUNS {
        let orbit = random_hyperbolic();
        let limit = (-1.0 / orbit.get_eccentricity()).acos();
        let nu = rand::random_range(-limit * 0.95..limit * 0.95);

        let m = orbit.get_mean_anomaly_at_true_anomaly(nu);
        let back = orbit.get_true_anomaly_at_mean_anomaly(m);
        assert!((nu - back).abs() < 1e-8, "nu = {nu}, back = {back}");
    }
}

#[test]
fn parabolic_trajectory() {
    let mut orbit = OrbitalElements::new(7e6, 1.0, 0.1, 0.2, 0.3, 0.3, MJD_J2000);
    orbit
        .setup(0.0, 5.972e24, MJD_J2000)
        .unwrap_or_else(|e| panic!("{e}"));
    let mu = orbit.get_gravitational_parameter().unwrap_or_else(|e| panic!("{e}"));

    assert!(orbit.is_parabolic());
    assert!(!orbit.is_closed());
    assert_eq!(orbit.get_periapsis(), 7e6);
    assert_eq!(orbit.get_orbital_period(), Ok(f64::INFINITY));

    let sv = orbit
        .get_state_vectors_at_time(MJD_J2000)
        .unwrap_or_else(|e| panic!("{e}"));
    assert_relative_eq(sv.position.length(), 7e6, 1e-12, "periapsis distance");
    assert_relative_eq(
        sv.velocity.length(),
        (2.0 * mu / 7e6).sqrt(),
        1e-12,
        "escape speed at periapsis",
    );

    // Energy stays zero along the trajectory
    for days in [-1.0, 0.5, 3.0] {
        let sv = orbit
            .get_state_vectors_at_time(MJD_J2000 + days)
            .unwrap_or_else(|e| panic!("{e}"));
        let energy = 0.5 * sv.velocity.length_squared() - mu / sv.position.length();
        assert!(
            energy.abs() < 1e-8 * mu / sv.position.length(),
            "energy {energy} after {days} days"
        );
    }
}

#[test]
fn vis_viva_matches_velocity() {
    for _ in 0..RANDOM_RUNS {
        let orbit = if rand::random_bool(0.5) {
            random_elliptic()
        } else {
            random_hyperbolic()
        };
        let t = orbit.get_epoch() + rand::random_range(-10.0..10.0);
        let sv = orbit
            .get_state_vectors_at_time(t)
            .unwrap_or_else(|e| panic!("{e}"));

        let speed = orbit
            .get_speed_at_radius(sv.position.length())
            .unwrap_or_else(|e| panic!("{e}"));
        assert_relative_eq(speed, sv.velocity.length(), 1e-8, "vis-viva speed");
    }
}

#[test]
fn circular_velocity_of_circular_orbit() {
    let orbit = random_circular();
    let sv = orbit
        .get_state_vectors_at_time(orbit.get_epoch())
        .unwrap_or_else(|e| panic!("{e}"));
    let circular = orbit
        .get_circular_velocity(orbit.get_semi_major_axis())
        .unwrap_or_else(|e| panic!("{e}"));
    assert_relative_eq(sv.velocity.length(), circular, 1e-12, "circular speed");
}

#[test]
fn periapsis_passage_time() {
    for _ in 0..RANDOM_RUNS {
        let orbit = if rand::random_bool(0.5) {
            random_elliptic()
        } else {
            random_hyperbolic()
        };
        let tp = orbit.get_time_of_periapsis().unwrap_or_else(|e| panic!("{e}"));
        if orbit.is_closed() {
            assert!(tp <= orbit.get_epoch());
        }

        let r = orbit
            .get_position_at_time(tp)
            .unwrap_or_else(|e| panic!("{e}"))
            .length();
        assert_relative_eq(r, orbit.get_periapsis(), 1e-6, "radius at periapsis passage");
    }
}

#[test]
fn nodes() {
    let equatorial = OrbitalElements::new(1.0, 0.1, 0.0, 1.0, 2.0, 0.0, 0.0);
    assert_eq!(equatorial.get_ascending_node(), None);
    assert_eq!(equatorial.get_descending_node(), None);

    let retrograde_equatorial = OrbitalElements::new(1.0, 0.1, PI, 1.0, 2.0, 0.0, 0.0);
    assert_eq!(retrograde_equatorial.get_ascending_node(), None);

    let inclined = OrbitalElements::new(1.0, 0.1, 0.5, FRAC_PI_2, 2.0, 0.0, 0.0);
    let ascending = inclined.get_ascending_node().unwrap_or_else(|| panic!("no node"));
    let descending = inclined.get_descending_node().unwrap_or_else(|| panic!("no node"));
    assert_almost_eq_vec3(ascending, DVec3::Y, "ascending node");
    assert_almost_eq_vec3(descending, -DVec3::Y, "descending node");
    assert!(ascending.dot(inclined.get_orbital_plane_normal()).abs() < 1e-12);
}

#[test]
fn state_vectors_round_trip() {
    for _ in 0..RANDOM_RUNS {
        let original = random_well_defined();
        let t = original.get_epoch() + rand::random_range(-5.0..5.0);
        let sv = original
            .get_state_vectors_at_time(t)
            .unwrap_or_else(|e| panic!("{e}"));

        let mut derived = OrbitalElements::default();
        let mu = original.get_gravitational_parameter().unwrap_or_else(|e| panic!("{e}"));
        derived
            .setup(0.0, mu / GRAVITATIONAL_CONSTANT, t)
            .unwrap_or_else(|e| panic!("{e}"));
        derived
            .calculate(sv.position, sv.velocity, t)
            .unwrap_or_else(|e| panic!("{e}"));

        let what = format!("{original:?}");
        assert_eq!(derived.mode(), ElementsMode::FromStateVectors);
        assert_eq!(derived.get_epoch(), t);
        assert_relative_eq(
            derived.get_semi_major_axis(),
            original.get_semi_major_axis(),
            1e-8,
            &what,
        );
        assert_almost_eq(derived.get_eccentricity(), original.get_eccentricity(), &what);
        assert_almost_eq(derived.get_inclination(), original.get_inclination(), &what);
        assert_almost_eq_angle(derived.get_long_asc_node(), original.get_long_asc_node(), &what);
        assert_almost_eq_angle(derived.get_arg_pe(), original.get_arg_pe(), &what);
        assert_same_trajectory(&original, &derived, t, &what);
    }
}

#[test]
fn equatorial_circular_state() {
    let mut orbit = OrbitalElements::default();
    orbit
        .setup(0.0, 5.972e24, MJD_J2000)
        .unwrap_or_else(|e| panic!("{e}"));
    let mu = orbit.get_gravitational_parameter().unwrap_or_else(|e| panic!("{e}"));

    let r = 7e6;
    let position = DVec3::new(0.0, r, 0.0);
    let velocity = DVec3::new(-(mu / r).sqrt(), 0.0, 0.0);
    orbit
        .calculate(position, velocity, MJD_J2000)
        .unwrap_or_else(|e| panic!("{e}"));

    assert!(orbit.get_eccentricity() < 1e-9);
    assert_eq!(orbit.get_inclination(), 0.0);
    assert_eq!(orbit.get_long_asc_node(), 0.0);
    assert_eq!(orbit.get_arg_pe(), 0.0);
    assert_almost_eq_angle(orbit.get_mean_longitude_at_epoch(), FRAC_PI_2, "mean longitude");
    assert_relative_eq(orbit.get_semi_major_axis(), r, 1e-12, "radius");

    let back = orbit
        .get_position_at_time(MJD_J2000)
        .unwrap_or_else(|e| panic!("{e}"));
    assert_close_vec3(back, position, r, 1e-12, "position after round trip");
}

#[test]
fn degenerate_states_are_rejected() {
    let mut orbit = earth_orbit();
    let before = orbit.clone();

    assert!(matches!(
        orbit.calculate(DVec3::ZERO, DVec3::Y, 0.0),
        Err(OrbitError::DegenerateState(_))
    ));
    assert!(matches!(
        orbit.calculate(DVec3::X * AU, DVec3::X * 1e4, 0.0),
        Err(OrbitError::DegenerateState(_))
    ));
    assert!(matches!(
        orbit.calculate(DVec3::splat(f64::NAN), DVec3::Y, 0.0),
        Err(OrbitError::DegenerateState(_))
    ));
    assert_eq!(orbit, before);
}

#[test]
fn hyperbolic_energy_is_positive() {
    let orbit = random_hyperbolic();
    let mu = orbit.get_gravitational_parameter().unwrap_or_else(|e| panic!("{e}"));
    let sv = orbit
        .get_state_vectors_at_time(orbit.get_epoch())
        .unwrap_or_else(|e| panic!("{e}"));

    let energy = 0.5 * sv.velocity.length_squared() - mu / sv.position.length();
    assert_relative_eq(
        energy,
        -mu / (2.0 * orbit.get_semi_major_axis()),
        1e-8,
        "specific orbital energy",
    );
}

mod caching {
    use super::*;

    /// Counts how often positions are computed.
    struct CountingSource {
        calls: Cell<usize>,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
            }
        }
    }

    impl PositionSource for CountingSource {
        fn calculate_position(&self, mjd: f64) -> crate::Result<DVec3> {
            self.calls.set(self.calls.get() + 1);
            Ok(DVec3::new(mjd.cos(), mjd.sin(), mjd) * 1e3)
        }

        fn period(&self) -> f64 {
            f64::INFINITY
        }

        fn bounding_radius(&self) -> f64 {
            f64::INFINITY
        }
    }

    #[test]
    fn identical_time_is_served_from_cache() {
        let mut orbit = CachingOrbit::new(CountingSource::new());

        let first = orbit.get_position(10.0).unwrap_or_else(|e| panic!("{e}"));
        let second = orbit.get_position(10.0).unwrap_or_else(|e| panic!("{e}"));

        assert_eq_vec3(first, second, "cached position");
        assert_eq!(orbit.source().calls.get(), 1);
    }

    #[test]
    fn new_time_evicts_both_values() {
        let mut orbit = CachingOrbit::new(CountingSource::new());

        orbit.get_position(1.0).unwrap_or_else(|e| panic!("{e}"));
        orbit.get_velocity(1.0).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(orbit.source().calls.get(), 3);

        orbit.get_velocity(1.0).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(orbit.source().calls.get(), 3);

        orbit.get_position(2.0).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(orbit.cache().last_time(), 2.0);
        orbit.get_position(1.0).unwrap_or_else(|e| panic!("{e}"));
        orbit.get_velocity(1.0).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(orbit.source().calls.get(), 7);
    }

    #[test]
    fn invalidate_forces_recomputation() {
        let mut orbit = CachingOrbit::new(CountingSource::new());

        orbit.get_position(5.0).unwrap_or_else(|e| panic!("{e}"));
        orbit.invalidate();
        assert_eq!(orbit.cache().last_time(), f64::NEG_INFINITY);

        orbit.get_position(5.0).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(orbit.source().calls.get(), 2);

        orbit.source_mut();
        orbit.get_position(5.0).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(orbit.source().calls.get(), 3);
    }

    #[test]
    fn finite_difference_velocity() {
        let source = CountingSource::new();
        let velocity = source
            .calculate_velocity(0.0)
            .unwrap_or_else(|e| panic!("{e}"));

        // d/dt of 1e3 * (cos t, sin t, t) at t = 0, per second
        let expected = DVec3::new(0.0, 1e3, 1e3) / SECONDS_PER_DAY;
        assert_close_vec3(velocity, expected, expected.length(), 1e-6, "velocity");
        assert!(!source.is_periodic());
    }

    #[test]
    fn earth_series_orbit() {
        let mut earth = CachingOrbit::new(Vsop87Orbit::new(&crate::series::earth::EARTH));

        let speed = earth
            .get_velocity(MJD_J2000)
            .unwrap_or_else(|e| panic!("{e}"))
            .length();
        assert!(speed > 29_200.0 && speed < 30_400.0, "speed = {speed}");

        assert!(earth.is_periodic());
        assert_relative_eq(earth.get_period(), 365.256_363, 1e-12, "period");
        assert!(earth.get_bounding_radius() > AU);
    }

    #[test]
    fn kepler_orbit_needs_masses() {
        assert_eq!(
            KeplerOrbit::new(unit_orbit()),
            Err(OrbitError::NotConfigured)
        );

        let elements = earth_orbit();
        let mut orbit =
            CachingOrbit::new(KeplerOrbit::new(elements.clone()).unwrap_or_else(|e| panic!("{e}")));

        assert_relative_eq(orbit.get_period(), 365.25, 1e-3, "period in days");
        assert_eq!(orbit.get_bounding_radius(), elements.get_apoapsis());

        let t = MJD_J2000 + 42.0;
        let expected = elements
            .get_state_vectors_at_time(t)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq_vec3(
            orbit.get_position(t).unwrap_or_else(|e| panic!("{e}")),
            expected.position,
            "cached Kepler position",
        );
        assert_eq_vec3(
            orbit.get_velocity(t).unwrap_or_else(|e| panic!("{e}")),
            expected.velocity,
            "cached Kepler velocity",
        );
    }
}

mod frames {
    use super::*;
    use crate::presets::SunEarthMoon;

    const ALL_COORD_TYPES: [CoordType; 6] = [
        CoordType::Universal,
        CoordType::Ecliptic,
        CoordType::Equatorial,
        CoordType::BodyFixed,
        CoordType::BodyMeanEquator,
        CoordType::ObjectSync,
    ];

    fn solar_system() -> (crate::ObjectRegistry, SunEarthMoon) {
        presets::sun_earth_moon().unwrap_or_else(|e| panic!("{e}"))
    }

    fn random_point() -> DVec3 {
        let direction = DVec3::new(
            rand::random_range(-1.0..1.0),
            rand::random_range(-1.0..1.0),
            rand::random_range(-1.0..1.0),
        );
        direction * 10f64.powf(rand::random_range(3.0..12.0))
    }

    #[test]
    fn universal_round_trip() {
        let (registry, bodies) = solar_system();

        for coord in ALL_COORD_TYPES {
            for (center, target) in [(bodies.earth, bodies.moon), (bodies.moon, bodies.earth)] {
                let player = PlayerFrame::create(coord, Some(center), Some(target), &registry)
                    .unwrap_or_else(|e| panic!("{coord}: {e}"));
                let frame = player.frame();

                for _ in 0..64 {
                    let p = random_point();
                    let t = random_epoch();
                    let universal = frame
                        .to_universal(p, t, &registry)
                        .unwrap_or_else(|e| panic!("{e}"));
                    let back = frame
                        .from_universal(universal, t, &registry)
                        .unwrap_or_else(|e| panic!("{e}"));

                    let scale = p.length().max(universal.length());
                    assert_close_vec3(back, p, scale, 1e-9, player.name());
                }
            }
        }
    }

    #[test]
    fn direction_and_attitude_round_trip() {
        let (registry, bodies) = solar_system();
        let frame = Frame::create(
            FrameKind::BodyFixed,
            Some(bodies.earth),
            Some(bodies.earth),
            &registry,
        )
        .unwrap_or_else(|e| panic!("{e}"));

        let t = MJD_J2000 + 1234.5;
        let direction = DVec3::new(0.3, -0.4, 0.5);
        let universal = frame
            .direction_to_universal(direction, t, &registry)
            .unwrap_or_else(|e| panic!("{e}"));
        let back = frame
            .direction_from_universal(universal, t, &registry)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_close_vec3(back, direction, 1.0, 1e-12, "direction");
        assert_almost_eq(universal.length(), direction.length(), "rotation keeps length");

        let attitude = DQuat::from_rotation_y(0.7);
        let back = frame
            .orientation_from_universal(
                frame
                    .orientation_to_universal(attitude, t, &registry)
                    .unwrap_or_else(|e| panic!("{e}")),
                t,
                &registry,
            )
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(back.angle_between(attitude) < 1e-6);
    }

    #[test]
    fn parent_chain() {
        let (registry, bodies) = solar_system();
        let frame = Frame::create(
            FrameKind::BodyFixed,
            Some(bodies.earth),
            Some(bodies.moon),
            &registry,
        )
        .unwrap_or_else(|e| panic!("{e}"));

        let mut kinds = Vec::new();
        let mut current = Some(&frame);
        while let Some(handle) = current {
            kinds.push(handle.kind());
            current = handle.parent();
        }

        assert_eq!(
            kinds,
            [
                FrameKind::BodyFixed,
                FrameKind::BodyMeanEquator,
                FrameKind::Ecliptic,
                FrameKind::Universal,
            ]
        );
        assert_eq!(frame.center(), Some(bodies.earth));
        assert_eq!(frame.target(), Some(bodies.moon));
    }

    #[test]
    fn ecliptic_frame_follows_center() {
        let (registry, bodies) = solar_system();
        let frame = Frame::create(FrameKind::Ecliptic, Some(bodies.earth), None, &registry)
            .unwrap_or_else(|e| panic!("{e}"));

        let t = MJD_J2000 + 100.0;
        let origin = frame
            .to_universal(DVec3::ZERO, t, &registry)
            .unwrap_or_else(|e| panic!("{e}"));
        let earth = registry
            .get_position(bodies.earth, t)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq_vec3(origin, earth, "ecliptic origin");
        assert_eq!(frame.name(), "Ecliptic (Earth)");
    }

    #[test]
    fn equatorial_matches_earth_mean_equator_at_j2000() {
        let (registry, bodies) = solar_system();
        let equatorial =
            Frame::create(FrameKind::Equatorial, Some(bodies.earth), None, &registry)
                .unwrap_or_else(|e| panic!("{e}"));
        let mean_equator = Frame::create(
            FrameKind::BodyMeanEquator,
            Some(bodies.earth),
            Some(bodies.earth),
            &registry,
        )
        .unwrap_or_else(|e| panic!("{e}"));

        let pole = equatorial
            .direction_to_universal(DVec3::Z, MJD_J2000, &registry)
            .unwrap_or_else(|e| panic!("{e}"));
        let spin_axis = mean_equator
            .direction_to_universal(DVec3::Z, MJD_J2000, &registry)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_close_vec3(pole, spin_axis, 1.0, 1e-12, "north pole");

        // The pole leans away from the ecliptic pole by the obliquity
        assert_almost_eq(pole.z.acos(), crate::J2000_OBLIQUITY, "obliquity");
    }

    #[test]
    fn body_fixed_frame_spins() {
        let (registry, bodies) = solar_system();
        let fixed = Frame::create(
            FrameKind::BodyFixed,
            Some(bodies.earth),
            Some(bodies.earth),
            &registry,
        )
        .unwrap_or_else(|e| panic!("{e}"));
        let mean_equator = fixed.parent().unwrap_or_else(|| panic!("no parent"));

        let rotation = presets::earth_rotation();
        for days in [0.0, 0.25, 10.3] {
            let t = MJD_J2000 + days;
            let meridian = fixed
                .direction_to_universal(DVec3::X, t, &registry)
                .unwrap_or_else(|e| panic!("{e}"));
            let local = mean_equator
                .direction_from_universal(meridian, t, &registry)
                .unwrap_or_else(|e| panic!("{e}"));

            let angle = rotation.rotation_angle(t);
            assert_close_vec3(
                local,
                DVec3::new(angle.cos(), angle.sin(), 0.0),
                1.0,
                1e-9,
                "prime meridian in mean equator frame",
            );
        }
    }

    #[test]
    fn object_sync_points_at_target() {
        let (registry, bodies) = solar_system();
        let frame = Frame::create(
            FrameKind::ObjectSync,
            Some(bodies.earth),
            Some(bodies.moon),
            &registry,
        )
        .unwrap_or_else(|e| panic!("{e}"));

        for days in [0.0, 7.0, 13.6] {
            let t = MJD_J2000 + days;
            let earth = registry.get_position(bodies.earth, t).unwrap_or_else(|e| panic!("{e}"));
            let moon = registry.get_position(bodies.moon, t).unwrap_or_else(|e| panic!("{e}"));
            let distance = (moon - earth).length();

            let universal = frame
                .to_universal(DVec3::X * distance, t, &registry)
                .unwrap_or_else(|e| panic!("{e}"));
            assert_close_vec3(universal, moon, distance, 1e-9, "moon along sync x axis");

            // The Moon's orbit is prograde, so the sync pole points north-ish
            let pole = frame
                .direction_to_universal(DVec3::Z, t, &registry)
                .unwrap_or_else(|e| panic!("{e}"));
            assert!(pole.z > 0.9, "pole = {pole:?}");
        }
    }

    #[test]
    fn missing_objects_are_reported() {
        let (registry, bodies) = solar_system();

        assert_eq!(
            PlayerFrame::create(CoordType::BodyFixed, Some(bodies.earth), None, &registry)
                .map(|player| player.coord_type()),
            Err(OrbitError::MissingTarget("body-fixed"))
        );
        assert_eq!(
            PlayerFrame::create(CoordType::ObjectSync, Some(bodies.earth), None, &registry)
                .map(|player| player.coord_type()),
            Err(OrbitError::MissingTarget("object sync"))
        );
        assert_eq!(
            PlayerFrame::create(CoordType::Equatorial, None, None, &registry)
                .map(|player| player.coord_type()),
            Err(OrbitError::MissingCenter("equatorial"))
        );
        assert_eq!(
            PlayerFrame::create(
                CoordType::BodyMeanEquator,
                Some(bodies.earth),
                Some(bodies.sun),
                &registry
            )
            .map(|player| player.coord_type()),
            Err(OrbitError::NoRotationModel(bodies.sun))
        );

        let universal = PlayerFrame::create(CoordType::Universal, None, None, &registry)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(universal.name(), "Universal");
        assert!(universal.frame().parent().is_none());
    }

    #[test]
    fn destroyed_objects_are_detected() {
        let (mut registry, bodies) = solar_system();
        let frame = Frame::create(
            FrameKind::ObjectSync,
            Some(bodies.earth),
            Some(bodies.moon),
            &registry,
        )
        .unwrap_or_else(|e| panic!("{e}"));

        let removed = registry.remove(bodies.moon);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].name, "Moon");

        assert_eq!(
            frame.to_universal(DVec3::ZERO, MJD_J2000, &registry),
            Err(OrbitError::ObjectDestroyed(bodies.moon))
        );
        assert!(!registry.contains(bodies.moon));

        // The freed slot is reused, but the old id stays dead
        let moon = registry
            .add(presets::the_moon(bodies.earth))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_ne!(moon, bodies.moon);
        assert!(registry.get(bodies.moon).is_err());
        assert!(registry.get(moon).is_ok());
    }

    #[test]
    fn removal_cascades_to_satellites() {
        let (mut registry, bodies) = solar_system();

        let removed = registry.remove(bodies.earth);
        let names: Vec<_> = removed.iter().map(|object| object.name.as_str()).collect();
        assert_eq!(names, ["Earth", "Moon"]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.satellites(bodies.sun), Ok(&[][..]));

        assert_eq!(
            registry.add(presets::the_moon(bodies.earth)),
            Err(OrbitError::ParentNotFound(bodies.earth))
        );
    }

    #[test]
    fn registry_sets_up_satellite_elements() {
        let (registry, bodies) = solar_system();
        let moon = registry.get(bodies.moon).unwrap_or_else(|e| panic!("{e}"));
        let Trajectory::Keplerian { elements, .. } = moon.trajectory() else {
            panic!("the moon should be on Keplerian elements");
        };

        let expected = GRAVITATIONAL_CONSTANT * (5.972e24 + 7.342e22);
        assert_eq!(elements.get_gravitational_parameter(), Ok(expected));

        for days in [0.0, 3.0, 20.0] {
            let t = MJD_J2000 + days;
            let earth = registry.get_position(bodies.earth, t).unwrap_or_else(|e| panic!("{e}"));
            let moon = registry.get_position(bodies.moon, t).unwrap_or_else(|e| panic!("{e}"));
            let distance = (moon - earth).length();
            assert!(distance >= elements.get_periapsis() * (1.0 - 1e-9));
            assert!(distance <= elements.get_apoapsis() * (1.0 + 1e-9));
        }

        assert_eq!(registry.find_by_name("Moon"), Some(bodies.moon));
        assert_eq!(registry.find_by_name("Pluto"), None);
    }

    #[test]
    fn fixed_objects_do_not_move() {
        let mut registry = crate::ObjectRegistry::new();
        let point = DVec3::new(1.0, 2.0, 3.0);
        let beacon = registry
            .add(CelestialObject::new("Beacon", 1.0, 1.0, Trajectory::Fixed(point)))
            .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(registry.get_position(beacon, 0.0), Ok(point));
        assert_eq!(registry.get_position(beacon, 1e5), Ok(point));
        assert_eq!(registry.get_velocity(beacon, 1e5), Ok(DVec3::ZERO));
    }

    #[test]
    fn frame_handle_counts() {
        let handle = Frame::universal();
        assert_eq!(handle.lock_count(), 1);

        let second = handle.lock();
        assert!(second.ptr_eq(&handle));
        assert_eq!(handle.lock_count(), 2);

        assert_eq!(second.release(), 1);
        assert_eq!(handle.release(), 0);
    }

    #[test]
    fn player_frame_switches() {
        let (registry, bodies) = solar_system();
        let mut player =
            PlayerFrame::create(CoordType::Ecliptic, Some(bodies.earth), None, &registry)
                .unwrap_or_else(|e| panic!("{e}"));

        let held = player.frame().lock();
        player
            .set_coord_type(CoordType::Equatorial, &registry)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(player.name(), "Equatorial (Earth)");
        assert_eq!(player.coord_type(), CoordType::Equatorial);
        assert_eq!(held.lock_count(), 1);

        player
            .set_objects(Some(bodies.earth), Some(bodies.moon), &registry)
            .unwrap_or_else(|e| panic!("{e}"));
        player
            .set_coord_type(CoordType::ObjectSync, &registry)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(player.name(), "Object sync (Earth, Moon)");
        assert_eq!(player.center(), Some(bodies.earth));
        assert_eq!(player.target(), Some(bodies.moon));

        // A failed switch keeps the active frame
        assert_eq!(
            player.set_objects(Some(bodies.earth), None, &registry),
            Err(OrbitError::MissingTarget("object sync"))
        );
        assert_eq!(player.name(), "Object sync (Earth, Moon)");
        assert_eq!(player.target(), Some(bodies.moon));
    }

    #[test]
    fn earth_series_stays_in_the_universal_frame() {
        let (registry, bodies) = solar_system();
        let period = crate::series::earth::EARTH.period_days;

        let start = registry
            .get_position(bodies.earth, MJD_J2000)
            .unwrap_or_else(|e| panic!("{e}"));
        for periods in [-100.0, 100.0] {
            let later = registry
                .get_position(bodies.earth, MJD_J2000 + periods * period)
                .unwrap_or_else(|e| panic!("{e}"));
            let angle = start.angle_between(later).to_degrees();
            assert!(angle < 0.05, "{periods} sidereal periods: {angle} deg apart");
        }
    }

    #[test]
    fn frame_queries_go_through_the_caches() {
        let (registry, bodies) = solar_system();
        let t = MJD_J2000 + 12.5;

        assert_eq!(registry.cached_time(bodies.sun), Ok(None));
        assert_eq!(registry.cached_time(bodies.earth), Ok(Some(f64::NEG_INFINITY)));

        let player = PlayerFrame::create(
            CoordType::ObjectSync,
            Some(bodies.earth),
            Some(bodies.moon),
            &registry,
        )
        .unwrap_or_else(|e| panic!("{e}"));
        player
            .frame()
            .to_universal(DVec3::X, t, &registry)
            .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(registry.cached_time(bodies.earth), Ok(Some(t)));
        assert_eq!(registry.cached_time(bodies.moon), Ok(Some(t)));

        let first = registry
            .get_position(bodies.moon, t)
            .unwrap_or_else(|e| panic!("{e}"));
        let second = registry
            .get_position(bodies.moon, t)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq_vec3(first, second, "cached Moon position");

        registry.invalidate_caches();
        assert_eq!(registry.cached_time(bodies.earth), Ok(Some(f64::NEG_INFINITY)));
        assert_eq!(registry.get_position(bodies.moon, t), Ok(first));
    }

    #[test]
    fn reparenting_moves_satellite_links() {
        let (mut registry, bodies) = solar_system();

        registry
            .set_trajectory(
                bodies.moon,
                Trajectory::Keplerian {
                    parent: bodies.sun,
                    elements: presets::earth_elements(),
                },
            )
            .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(registry.satellites(bodies.earth), Ok(&[][..]));
        assert_eq!(
            registry.satellites(bodies.sun),
            Ok(&[bodies.earth, bodies.moon][..])
        );

        let moon = registry.get(bodies.moon).unwrap_or_else(|e| panic!("{e}"));
        let Trajectory::Keplerian { elements, .. } = moon.trajectory() else {
            panic!("the moon should be on Keplerian elements");
        };
        assert_eq!(
            elements.get_gravitational_parameter(),
            Ok(GRAVITATIONAL_CONSTANT * (1.989e30 + 7.342e22))
        );

        let r = registry
            .get_position(bodies.moon, MJD_J2000 + 3.0)
            .unwrap_or_else(|e| panic!("{e}"))
            .length();
        assert!(r > 0.98 * AU && r < 1.02 * AU, "r = {r}");

        // The Moon no longer goes down with the Earth
        let removed = registry.remove(bodies.earth);
        assert_eq!(removed.len(), 1);
        assert!(registry.contains(bodies.moon));
    }

    #[test]
    fn parent_cycles_are_rejected() {
        let (mut registry, bodies) = solar_system();

        for parent in [bodies.sun, bodies.earth, bodies.moon] {
            assert_eq!(
                registry.set_trajectory(
                    bodies.sun,
                    Trajectory::Keplerian {
                        parent,
                        elements: presets::moon_elements(),
                    },
                ),
                Err(OrbitError::ParentCycle {
                    object: bodies.sun,
                    parent,
                })
            );
        }
        assert_eq!(
            registry.set_trajectory(
                bodies.earth,
                Trajectory::Series {
                    parent: bodies.moon,
                    series: &crate::series::earth::EARTH,
                },
            ),
            Err(OrbitError::ParentCycle {
                object: bodies.earth,
                parent: bodies.moon,
            })
        );

        assert_eq!(registry.satellites(bodies.sun), Ok(&[bodies.earth][..]));
        assert_eq!(registry.satellites(bodies.earth), Ok(&[bodies.moon][..]));
        assert!(registry.get_position(bodies.moon, MJD_J2000).is_ok());

        registry.remove(bodies.moon);
        assert_eq!(
            registry.set_trajectory(
                bodies.earth,
                Trajectory::Keplerian {
                    parent: bodies.moon,
                    elements: presets::moon_elements(),
                },
            ),
            Err(OrbitError::ParentNotFound(bodies.moon))
        );
    }

    #[test]
    fn mass_changes_reach_satellites() {
        let (mut registry, bodies) = solar_system();
        let heavier = 2.0 * 5.972e24;

        registry
            .set_mass(bodies.earth, heavier)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(registry.get(bodies.earth).map(|earth| earth.mass()), Ok(heavier));

        let moon = registry.get(bodies.moon).unwrap_or_else(|e| panic!("{e}"));
        let Trajectory::Keplerian { elements, .. } = moon.trajectory() else {
            panic!("the moon should be on Keplerian elements");
        };
        assert_eq!(
            elements.get_gravitational_parameter(),
            Ok(GRAVITATIONAL_CONSTANT * (heavier + 7.342e22))
        );

        assert!(matches!(
            registry.set_mass(bodies.earth, -1.0),
            Err(OrbitError::InvalidMass { .. })
        ));
        assert_eq!(registry.get(bodies.earth).map(|earth| earth.mass()), Ok(heavier));
    }

    #[test]
    fn unusable_rotation_models_are_rejected() {
        let (mut registry, bodies) = solar_system();
        let frozen = crate::RotationModel::uniform(0.0, 0.0, MJD_J2000, 0.1, 0.0);

        let top = CelestialObject::new("Top", 1.0, 1.0, Trajectory::Fixed(DVec3::ZERO))
            .with_rotation(frozen);
        assert_eq!(registry.add(top), Err(OrbitError::InvalidRotation(0.0)));

        registry
            .get_mut(bodies.earth)
            .unwrap_or_else(|e| panic!("{e}"))
            .rotation = Some(frozen);
        let created = PlayerFrame::create(
            CoordType::BodyFixed,
            Some(bodies.earth),
            Some(bodies.earth),
            &registry,
        );
        assert_eq!(created.err(), Some(OrbitError::InvalidRotation(0.0)));
    }
}
