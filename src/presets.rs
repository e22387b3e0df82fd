//! Ready-made bodies for tests, benches and quick setups.
//!
//! "The Sun is the star at the centre of the Solar System."
//!
//! \- [Wikipedia](https://en.wikipedia.org/wiki/Sun)

use glam::DVec3;

use crate::{
    series::earth::EARTH, CelestialObject, ObjectId, ObjectRegistry, OrbitalElements, Result,
    RotationModel, Trajectory, AU, J2000_OBLIQUITY, MJD_J2000,
};

/// Mean elements of the Earth-Moon barycentre at J2000, ecliptic J2000.
///
/// Masses are not set up; see [`OrbitalElements::setup`].
pub fn earth_elements() -> OrbitalElements {
    OrbitalElements::new(
        1.000_002_61 * AU,
        0.016_711_23,
        // Tabulated as i = -0.00001531 deg with the node at 0, which is
        // the same plane as a positive tilt with the node at 180 deg
        0.000_015_31f64.to_radians(),
        180f64.to_radians(),
        102.937_681_93f64.to_radians(),
        100.464_571_66f64.to_radians(),
        MJD_J2000,
    )
}

/// Mean elements of the Moon about the Earth at J2000, ecliptic J2000.
pub fn moon_elements() -> OrbitalElements {
    OrbitalElements::new(
        384_400e3,
        0.0549,
        5.145f64.to_radians(),
        125.08f64.to_radians(),
        (125.08f64 + 318.15).rem_euclid(360.0).to_radians(),
        218.316f64.to_radians(),
        MJD_J2000,
    )
}

/// The Earth's spin, with the precession of the equinoxes.
pub fn earth_rotation() -> RotationModel {
    RotationModel {
        // Greenwich mean sidereal time at J2000, 280.46061837 degrees
        rotation_offset: 4.894_961_212_735_792,
        // Westward, one turn in about 25 772 years
        precession_period: -25_772.0 * 365.25,
        ..RotationModel::uniform(0.997_269_68, 0.0, MJD_J2000, J2000_OBLIQUITY, 0.0)
    }
}

/// The Moon's synchronous spin. The prime meridian is only approximate.
pub fn moon_rotation() -> RotationModel {
    RotationModel::uniform(
        27.321_661,
        0.0,
        MJD_J2000,
        1.5424f64.to_radians(),
        (125.08f64 + 180.0).to_radians(),
    )
}

/// Returns the Sun, fixed at the universal origin.
pub fn the_sun() -> CelestialObject {
    CelestialObject::new("Sun", 1.989e30, 6.957e8, Trajectory::Fixed(DVec3::ZERO))
}

/// Returns the Earth on its VSOP87 series about `sun`.
pub fn the_earth(sun: ObjectId) -> CelestialObject {
    CelestialObject::new(
        "Earth",
        5.972e24,
        6.371e6,
        Trajectory::Series {
            parent: sun,
            series: &EARTH,
        },
    )
    .with_rotation(earth_rotation())
}

/// Returns the Moon on Keplerian elements about `earth`.
pub fn the_moon(earth: ObjectId) -> CelestialObject {
    CelestialObject::new(
        "Moon",
        7.342e22,
        1.7374e6,
        Trajectory::Keplerian {
            parent: earth,
            elements: moon_elements(),
        },
    )
    .with_rotation(moon_rotation())
}

/// The ids of the bodies added by [`sun_earth_moon`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SunEarthMoon {
    /// The Sun.
    pub sun: ObjectId,
    /// The Earth.
    pub earth: ObjectId,
    /// The Moon.
    pub moon: ObjectId,
}

/// Builds a registry with the Sun, the Earth and the Moon.
pub fn sun_earth_moon() -> Result<(ObjectRegistry, SunEarthMoon)> {
    let mut registry = ObjectRegistry::new();
    let sun = registry.add(the_sun())?;
    let earth = registry.add(the_earth(sun))?;
    let moon = registry.add(the_moon(earth))?;
    Ok((registry, SunEarthMoon { sun, earth, moon }))
}
