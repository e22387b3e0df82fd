use core::f64::consts::TAU;

use glam::{DVec2, DVec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    solvers, Matrix3x2, OrbitError, PropagationConfig, Result, StateVectors, MJD_J2000,
    PARABOLIC_TOLERANCE, SECONDS_PER_DAY,
};

/// How the current element set came about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ElementsMode {
    /// Set directly through [`OrbitalElements::new`], `reset` or `configure`.
    FromElements,
    /// Derived from a position and velocity by [`OrbitalElements::calculate`].
    FromStateVectors,
}

/// A classical Keplerian element set plus the values derived from it.
///
/// # Elements
/// - `a`: semi-major axis, in metres. Positive for elliptic orbits and
///   negative for hyperbolic ones. For parabolic trajectories
///   (`|e - 1| < PARABOLIC_TOLERANCE`) it holds the periapsis distance.
/// - `e`: eccentricity.
/// - `i`: inclination, in radians.
/// - `theta`: longitude of the ascending node, in radians.
/// - `omegab`: longitude of periapsis (`theta` plus the argument of
///   periapsis), in radians.
/// - `l`: mean longitude at epoch (`omegab` plus the mean anomaly at
///   epoch), in radians.
/// - `mjd_epoch`: the epoch these elements refer to, as a Modified Julian Date.
///
/// # Angles
/// Angles of closed orbits are returned in [0, 2π). Mean and eccentric
/// anomalies of open trajectories are signed and unbounded, negative
/// before periapsis passage.
///
/// The sign of `a` has to match the eccentricity. [`new`][Self::new]
/// accepts anything, but [`setup`][Self::setup], [`reset`][Self::reset],
/// [`configure`][Self::configure] and [`calculate`][Self::calculate]
/// return [`OrbitError::InvalidElements`] for a set that is not a conic,
/// so a configured element set is always a valid orbit.
///
/// # Setup
/// Everything that needs the gravitational parameter (mean motion, period,
/// anything at a given time, velocities) returns
/// [`OrbitError::NotConfigured`] until [`setup`][Self::setup] or
/// [`configure`][Self::configure] has supplied the masses. Purely
/// geometric values are always available.
///
/// # Example
/// ```
/// use orbit_frames::{OrbitalElements, OrbitError};
///
/// let mut elements = OrbitalElements::new(7.0e6, 0.01, 0.5, 0.2, 1.1, 2.0, 60_000.0);
/// assert_eq!(elements.get_orbital_period(), Err(OrbitError::NotConfigured));
///
/// elements.setup(1000.0, 5.972e24, 60_000.0).unwrap();
/// let period = elements.get_orbital_period().unwrap();
/// assert!((period - 5828.5).abs() < 1.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrbitalElements {
    a: f64,
    e: f64,
    i: f64,
    theta: f64,
    omegab: f64,
    l: f64,
    mjd_epoch: f64,

    mode: ElementsMode,
    shape: ShapeCache,
    masses: Option<MassCache>,
    #[cfg_attr(feature = "serde", serde(skip))]
    memo: KeplerMemo,
    config: PropagationConfig,
}

// -------- MEMO --------
// When adding a derived value, make sure `OrbitalElements::refresh()`
// recomputes it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct ShapeCache {
    arg_pe: f64,
    periapsis: f64,
    apoapsis: f64,
    semi_minor_axis: f64,
    semi_latus_rectum: f64,
    linear_eccentricity: f64,
    transformation_matrix: Matrix3x2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct MassCache {
    mass: f64,
    primary_mass: f64,
    mu: f64,
    /// Radians per second. For parabolic trajectories this is the rate of
    /// Barker's mean anomaly `D + D^3 / 3`.
    mean_motion: f64,
    period: f64,
}

/// The last mean anomaly solved for, and its eccentric anomaly.
#[derive(Clone, Copy, Debug)]
struct KeplerMemo {
    ma0: f64,
    ea0: f64,
}

impl Default for KeplerMemo {
    fn default() -> Self {
        Self::EMPTY
    }
}

// Two element sets are equal regardless of what they last solved for.
impl PartialEq for KeplerMemo {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl KeplerMemo {
    // NaN never compares equal, so an empty memo never hits.
    const EMPTY: Self = Self {
        ma0: f64::NAN,
        ea0: f64::NAN,
    };
}

impl Default for OrbitalElements {
    /// A circular orbit of radius 1 m in the reference plane, at J2000,
    /// without masses.
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, MJD_J2000)
    }
}

// Construction and configuration
impl OrbitalElements {
    /// Creates an element set. No masses are known yet, so mu-dependent
    /// queries fail until [`setup`][Self::setup] is called. The elements
    /// are checked there.
    ///
    /// See the struct documentation for the meaning and units of each
    /// parameter.
    pub fn new(a: f64, e: f64, i: f64, theta: f64, omegab: f64, l: f64, mjd_epoch: f64) -> Self {
        let mut elements = Self {
            a,
            e,
            i,
            theta,
            omegab,
            l,
            mjd_epoch,
            mode: ElementsMode::FromElements,
            shape: Self::get_shape(a, e, i, theta, omegab),
            masses: None,
            memo: KeplerMemo::EMPTY,
            config: PropagationConfig::default(),
        };
        elements.refresh();
        elements
    }

    /// Replaces the numeric settings, recomputing the mass-derived values.
    #[must_use]
    pub fn with_config(mut self, config: PropagationConfig) -> Self {
        self.config = config;
        if let Some(masses) = self.masses {
            self.masses = Some(self.get_mass_cache(masses.mass, masses.primary_mass));
        }
        self.memo = KeplerMemo::EMPTY;
        self
    }

    /// The numeric settings in use.
    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    /// Assigns the orbiting mass `m`, the primary mass `big_m` (both in kg)
    /// and the epoch, then derives `mu = G (M + m)`, the mean motion and
    /// the period.
    ///
    /// Calling this twice with the same arguments yields the same state.
    ///
    /// # Errors
    /// - [`OrbitError::InvalidElements`] if `a` and `e` do not describe a
    ///   conic (see [`check_conic`][Self::check_conic]).
    /// - [`OrbitError::InvalidMass`] if the masses are not finite or do not
    ///   sum to a positive value.
    ///
    /// On error the element set is left unchanged.
    pub fn setup(&mut self, m: f64, big_m: f64, mjd_epoch: f64) -> Result<()> {
        Self::check_conic(self.a, self.e)?;
        Self::check_masses(m, big_m)?;

        self.mjd_epoch = mjd_epoch;
        self.masses = Some(self.get_mass_cache(m, big_m));
        self.memo = KeplerMemo::EMPTY;
        Ok(())
    }

    /// Updates both masses without touching the epoch.
    ///
    /// # Errors
    /// As for [`setup`][Self::setup].
    pub fn set_masses(&mut self, m: f64, big_m: f64) -> Result<()> {
        self.setup(m, big_m, self.mjd_epoch)
    }

    /// Replaces the primary elements, keeping any known masses.
    ///
    /// # Errors
    /// [`OrbitError::InvalidElements`] if `a` and `e` do not describe a
    /// conic. The element set is left unchanged.
    #[allow(clippy::too_many_arguments)]
    pub fn reset(
        &mut self,
        a: f64,
        e: f64,
        i: f64,
        theta: f64,
        omegab: f64,
        l: f64,
        mjd_epoch: f64,
    ) -> Result<()> {
        Self::check_conic(a, e)?;

        self.a = a;
        self.e = e;
        self.i = i;
        self.theta = theta;
        self.omegab = omegab;
        self.l = l;
        self.mjd_epoch = mjd_epoch;
        self.mode = ElementsMode::FromElements;
        self.refresh();
        Ok(())
    }

    /// [`reset`][Self::reset] followed by [`setup`][Self::setup].
    ///
    /// # Errors
    /// As for [`setup`][Self::setup]. Both the elements and the masses are
    /// checked before anything is changed.
    #[allow(clippy::too_many_arguments)]
    pub fn configure(
        &mut self,
        a: f64,
        e: f64,
        i: f64,
        theta: f64,
        omegab: f64,
        l: f64,
        mjd_epoch: f64,
        m: f64,
        big_m: f64,
    ) -> Result<()> {
        Self::check_masses(m, big_m)?;
        self.reset(a, e, i, theta, omegab, l, mjd_epoch)?;
        self.setup(m, big_m, mjd_epoch)
    }

    /// Checks that `a` and `e` describe a conic section.
    ///
    /// - `0 <= e < 1`: an ellipse, `a > 0`.
    /// - `|e - 1| < PARABOLIC_TOLERANCE`: a parabola, `a` is the periapsis
    ///   distance and must be positive.
    /// - `e > 1`: a hyperbola, `a < 0`.
    ///
    /// # Errors
    /// [`OrbitError::InvalidElements`] otherwise, including for non-finite
    /// values.
    pub fn check_conic(a: f64, e: f64) -> Result<()> {
        let parabolic = (e - 1.0).abs() < PARABOLIC_TOLERANCE;
        let valid = a.is_finite()
            && e.is_finite()
            && e >= 0.0
            && if parabolic || e < 1.0 { a > 0.0 } else { a < 0.0 };

        if valid {
            Ok(())
        } else {
            Err(OrbitError::InvalidElements {
                semi_major_axis: a,
                eccentricity: e,
            })
        }
    }

    fn check_masses(m: f64, big_m: f64) -> Result<()> {
        let total = m + big_m;
        if total.is_finite() && total > 0.0 && m >= 0.0 && big_m >= 0.0 {
            Ok(())
        } else {
            Err(OrbitError::InvalidMass {
                mass: m,
                primary_mass: big_m,
            })
        }
    }

    fn refresh(&mut self) {
        self.shape = Self::get_shape(self.a, self.e, self.i, self.theta, self.omegab);
        if let Some(masses) = self.masses {
            self.masses = Some(self.get_mass_cache(masses.mass, masses.primary_mass));
        }
        self.memo = KeplerMemo::EMPTY;
    }

    fn get_shape(a: f64, e: f64, i: f64, theta: f64, omegab: f64) -> ShapeCache {
        let arg_pe = (omegab - theta).rem_euclid(TAU);
        let parabolic = (e - 1.0).abs() < PARABOLIC_TOLERANCE;

        let (periapsis, semi_latus_rectum) = if parabolic {
            (a, 2.0 * a)
        } else {
            (a * (1.0 - e), a * (1.0 - e * e))
        };

        let (apoapsis, semi_minor_axis, linear_eccentricity) = if parabolic {
            (f64::INFINITY, f64::INFINITY, f64::INFINITY)
        } else if e < 1.0 {
            (a * (1.0 + e), a * (1.0 - e * e).sqrt(), a * e)
        } else {
            (f64::INFINITY, a.abs() * (e * e - 1.0).sqrt(), a.abs() * e)
        };

        ShapeCache {
            arg_pe,
            periapsis,
            apoapsis,
            semi_minor_axis,
            semi_latus_rectum,
            linear_eccentricity,
            transformation_matrix: Matrix3x2::from_orbit_angles(i, arg_pe, theta),
        }
    }

    fn get_mass_cache(&self, m: f64, big_m: f64) -> MassCache {
        let mu = self.config.gravitational_constant * (big_m + m);

        let mean_motion = if self.is_parabolic() {
            2.0 * (mu / self.shape.semi_latus_rectum.powi(3)).sqrt()
        } else {
            (mu / self.a.abs().powi(3)).sqrt()
        };

        let period = if self.is_closed() {
            TAU / mean_motion
        } else {
            f64::INFINITY
        };

        MassCache {
            mass: m,
            primary_mass: big_m,
            mu,
            mean_motion,
            period,
        }
    }

    fn masses(&self) -> Result<&MassCache> {
        self.masses.as_ref().ok_or(OrbitError::NotConfigured)
    }
}

// Element and shape accessors
impl OrbitalElements {
    /// Gets the semi-major axis, in metres.
    ///
    /// Negative for hyperbolic trajectories; the periapsis distance for
    /// parabolic ones.
    #[inline]
    pub fn get_semi_major_axis(&self) -> f64 {
        self.a
    }

    /// Gets the eccentricity.
    #[inline]
    pub fn get_eccentricity(&self) -> f64 {
        self.e
    }

    /// Gets the inclination, in radians.
    #[inline]
    pub fn get_inclination(&self) -> f64 {
        self.i
    }

    /// Gets the longitude of the ascending node, in radians.
    #[inline]
    pub fn get_long_asc_node(&self) -> f64 {
        self.theta
    }

    /// Gets the longitude of periapsis, in radians.
    #[inline]
    pub fn get_long_periapsis(&self) -> f64 {
        self.omegab
    }

    /// Gets the argument of periapsis, in [0, 2π).
    #[inline]
    pub fn get_arg_pe(&self) -> f64 {
        self.shape.arg_pe
    }

    /// Gets the mean longitude at epoch, in radians.
    #[inline]
    pub fn get_mean_longitude_at_epoch(&self) -> f64 {
        self.l
    }

    /// Gets the epoch, as a Modified Julian Date.
    #[inline]
    pub fn get_epoch(&self) -> f64 {
        self.mjd_epoch
    }

    /// Gets how this element set was last configured.
    #[inline]
    pub fn mode(&self) -> ElementsMode {
        self.mode
    }

    /// Whether the orbit is a closed ellipse (e < 1).
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.e < 1.0 && !self.is_parabolic()
    }

    /// Whether the trajectory is treated as parabolic.
    #[inline]
    pub fn is_parabolic(&self) -> bool {
        (self.e - 1.0).abs() < PARABOLIC_TOLERANCE
    }

    /// Gets the periapsis distance, in metres.
    ///
    /// # Example
    /// ```
    /// use orbit_frames::OrbitalElements;
    ///
    /// let circular = OrbitalElements::new(2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    /// assert_eq!(circular.get_periapsis(), 2.0);
    /// assert_eq!(circular.get_apoapsis(), 2.0);
    /// ```
    #[inline]
    pub fn get_periapsis(&self) -> f64 {
        self.shape.periapsis
    }

    /// Gets the apoapsis distance, in metres. Infinite for open trajectories.
    #[inline]
    pub fn get_apoapsis(&self) -> f64 {
        self.shape.apoapsis
    }

    /// Gets the semi-minor axis, in metres.
    ///
    /// For hyperbolic trajectories this is the (positive) impact parameter
    /// `|a| sqrt(e^2 - 1)`; for parabolic ones it is infinite.
    #[inline]
    pub fn get_semi_minor_axis(&self) -> f64 {
        self.shape.semi_minor_axis
    }

    /// Gets the semi-latus rectum `p`, in metres.
    #[inline]
    pub fn get_semi_latus_rectum(&self) -> f64 {
        self.shape.semi_latus_rectum
    }

    /// Gets the linear eccentricity (centre to focus distance), in metres.
    #[inline]
    pub fn get_linear_eccentricity(&self) -> f64 {
        self.shape.linear_eccentricity
    }

    /// Gets the matrix that tilts perifocal coordinates into the reference frame.
    #[inline]
    pub fn get_transformation_matrix(&self) -> Matrix3x2 {
        self.shape.transformation_matrix
    }

    /// Gets the length of the radius vector at a true anomaly, in metres.
    ///
    /// ```text
    /// r = p / (1 + e cos(nu))
    /// ```
    ///
    /// Beyond the asymptotes of a hyperbola this is negative.
    pub fn get_radius_at_true_anomaly(&self, true_anomaly: f64) -> f64 {
        self.shape.semi_latus_rectum / (1.0 + self.e * true_anomaly.cos())
    }

    /// Gets the unit vector toward the ascending node.
    ///
    /// Returns `None` when the orbit lies in the reference plane and the
    /// node is undefined.
    pub fn get_ascending_node(&self) -> Option<DVec3> {
        if self.i.sin().abs() < self.config.degenerate_epsilon {
            return None;
        }
        let (sin_lan, cos_lan) = self.theta.sin_cos();
        Some(DVec3::new(cos_lan, sin_lan, 0.0))
    }

    /// Gets the unit vector toward the descending node.
    ///
    /// Returns `None` when the orbit lies in the reference plane.
    pub fn get_descending_node(&self) -> Option<DVec3> {
        self.get_ascending_node().map(|node| -node)
    }

    /// Gets the unit normal of the orbital plane (direction of the
    /// angular momentum).
    pub fn get_orbital_plane_normal(&self) -> DVec3 {
        let (sin_inc, cos_inc) = self.i.sin_cos();
        let (sin_lan, cos_lan) = self.theta.sin_cos();
        DVec3::new(sin_inc * sin_lan, -sin_inc * cos_lan, cos_inc)
    }
}

// Mass-dependent accessors
impl OrbitalElements {
    /// Gets the standard gravitational parameter `G (M + m)`, in m^3 s^-2.
    #[doc(alias = "get_mu")]
    pub fn get_gravitational_parameter(&self) -> Result<f64> {
        Ok(self.masses()?.mu)
    }

    /// Gets the mean motion, in radians per second.
    pub fn get_mean_motion(&self) -> Result<f64> {
        Ok(self.masses()?.mean_motion)
    }

    /// Gets the orbital period `2π sqrt(a^3 / mu)`, in seconds.
    ///
    /// Infinite for open trajectories.
    pub fn get_orbital_period(&self) -> Result<f64> {
        Ok(self.masses()?.period)
    }

    /// Gets the circular orbit speed at a distance from the primary, in m/s.
    pub fn get_circular_velocity(&self, radius: f64) -> Result<f64> {
        Ok((self.masses()?.mu / radius).sqrt())
    }

    /// Gets the speed at a distance from the primary along this orbit,
    /// from the vis-viva equation, in m/s.
    pub fn get_speed_at_radius(&self, radius: f64) -> Result<f64> {
        let mu = self.masses()?.mu;
        let inv_a = if self.is_parabolic() { 0.0 } else { self.a.recip() };
        Ok((mu * (2.0 / radius - inv_a)).sqrt())
    }

    /// Gets the time of the last periapsis passage at or before the epoch,
    /// as a Modified Julian Date. For open trajectories this is the single
    /// periapsis passage.
    pub fn get_time_of_periapsis(&self) -> Result<f64> {
        let n = self.masses()?.mean_motion;
        let mean_anomaly_at_epoch = self.get_mean_anomaly_at_epoch();
        Ok(self.mjd_epoch - mean_anomaly_at_epoch / n / SECONDS_PER_DAY)
    }
}

// Anomalies
impl OrbitalElements {
    fn get_mean_anomaly_at_epoch(&self) -> f64 {
        let mean_anomaly = self.l - self.omegab;
        if self.is_closed() {
            mean_anomaly.rem_euclid(TAU)
        } else {
            mean_anomaly
        }
    }

    /// Gets the mean anomaly at a Modified Julian Date.
    ///
    /// For parabolic trajectories this is Barker's `D + D^3 / 3`, with
    /// `D = tan(nu / 2)`.
    pub fn get_mean_anomaly_at_time(&self, mjd: f64) -> Result<f64> {
        let n = self.masses()?.mean_motion;
        let mean_anomaly =
            self.get_mean_anomaly_at_epoch() + n * (mjd - self.mjd_epoch) * SECONDS_PER_DAY;
        Ok(if self.is_closed() {
            mean_anomaly.rem_euclid(TAU)
        } else {
            mean_anomaly
        })
    }

    /// Gets the mean longitude at a Modified Julian Date.
    pub fn get_mean_longitude_at_time(&self, mjd: f64) -> Result<f64> {
        let mean_longitude = self.omegab + self.get_mean_anomaly_at_time(mjd)?;
        Ok(if self.is_closed() {
            mean_longitude.rem_euclid(TAU)
        } else {
            mean_longitude
        })
    }

    /// Solves Kepler's equation, remembering the last answer.
    ///
    /// Repeated calls with the same mean anomaly return the remembered
    /// eccentric anomaly without iterating. See
    /// [`get_eccentric_anomaly_at_mean_anomaly`][Self::get_eccentric_anomaly_at_mean_anomaly]
    /// for the conventions.
    pub fn get_eccentric_anomaly(&mut self, mean_anomaly: f64) -> f64 {
        if mean_anomaly == self.memo.ma0 {
            return self.memo.ea0;
        }
        let eccentric_anomaly = self.get_eccentric_anomaly_at_mean_anomaly(mean_anomaly);
        self.memo = KeplerMemo {
            ma0: mean_anomaly,
            ea0: eccentric_anomaly,
        };
        eccentric_anomaly
    }

    /// Solves Kepler's equation without touching the memo.
    ///
    /// - Elliptic: `M = E - e sin(E)`, returning `E` in [0, 2π).
    /// - Hyperbolic: `M = e sinh(H) - H`, returning the signed `H`.
    /// - Parabolic: `M = D + D^3 / 3`, returning `D = tan(nu / 2)`.
    ///
    /// # Example
    /// ```
    /// use orbit_frames::OrbitalElements;
    ///
    /// let orbit = OrbitalElements::new(1.0, 0.7, 0.0, 0.0, 0.0, 0.0, 0.0);
    /// let ea = orbit.get_eccentric_anomaly_at_mean_anomaly(1.0);
    /// assert!((ea - 0.7 * ea.sin() - 1.0).abs() < 1e-12);
    /// ```
    pub fn get_eccentric_anomaly_at_mean_anomaly(&self, mean_anomaly: f64) -> f64 {
        let tolerance = self.config.kepler_tolerance;
        let max_iters = self.config.kepler_max_iterations;

        if self.is_parabolic() {
            solvers::get_parabolic_anomaly(mean_anomaly)
        } else if self.e < 1.0 {
            solvers::get_elliptic_eccentric_anomaly(self.e, mean_anomaly, tolerance, max_iters)
        } else {
            solvers::get_hyperbolic_eccentric_anomaly(self.e, mean_anomaly, tolerance, max_iters)
        }
    }

    /// Gets the true anomaly for an eccentric (or parabolic) anomaly.
    ///
    /// Closed orbits return [0, 2π); open trajectories return a value in
    /// (-π, π).
    pub fn get_true_anomaly_at_eccentric_anomaly(&self, eccentric_anomaly: f64) -> f64 {
        let e = self.e;
        if self.is_parabolic() {
            2.0 * eccentric_anomaly.atan()
        } else if e < 1.0 {
            // https://en.wikipedia.org/wiki/True_anomaly#From_the_eccentric_anomaly
            let (s, c) = eccentric_anomaly.sin_cos();
            let beta = e / (1.0 + (1.0 - e * e).sqrt());

            (eccentric_anomaly + 2.0 * (beta * s / (1.0 - beta * c)).atan()).rem_euclid(TAU)
        } else {
            // tan(f/2) = sqrt((e+1)/(e-1)) * tanh(H/2)
            2.0 * (((e + 1.0) / (e - 1.0)).sqrt() * (eccentric_anomaly * 0.5).tanh()).atan()
        }
    }

    /// Gets the true anomaly for a mean anomaly.
    pub fn get_true_anomaly_at_mean_anomaly(&self, mean_anomaly: f64) -> f64 {
        self.get_true_anomaly_at_eccentric_anomaly(
            self.get_eccentric_anomaly_at_mean_anomaly(mean_anomaly),
        )
    }

    /// Gets the true anomaly at a Modified Julian Date.
    pub fn get_true_anomaly_at_time(&self, mjd: f64) -> Result<f64> {
        Ok(self.get_true_anomaly_at_mean_anomaly(self.get_mean_anomaly_at_time(mjd)?))
    }

    /// Gets the mean anomaly for a true anomaly, the inverse of
    /// [`get_true_anomaly_at_mean_anomaly`][Self::get_true_anomaly_at_mean_anomaly].
    pub fn get_mean_anomaly_at_true_anomaly(&self, true_anomaly: f64) -> f64 {
        let e = self.e;
        if self.is_parabolic() {
            let d = (true_anomaly * 0.5).tan();
            d + d * d * d / 3.0
        } else if e < 1.0 {
            let (sin_nu, cos_nu) = true_anomaly.sin_cos();
            let eccentric_anomaly = ((1.0 - e * e).sqrt() * sin_nu).atan2(e + cos_nu);
            (eccentric_anomaly - e * eccentric_anomaly.sin()).rem_euclid(TAU)
        } else {
            // H = 2 atanh(tan(f/2) * sqrt((e-1)/(e+1)))
            let eccentric_anomaly =
                2.0 * ((true_anomaly * 0.5).tan() * ((e - 1.0) / (e + 1.0)).sqrt()).atanh();
            e * eccentric_anomaly.sinh() - eccentric_anomaly
        }
    }
}

// Positions and velocities
impl OrbitalElements {
    /// Gets the position at a true anomaly, relative to the primary, in metres.
    pub fn get_position_at_true_anomaly(&self, true_anomaly: f64) -> DVec3 {
        let radius = self.get_radius_at_true_anomaly(true_anomaly);
        let (sin_nu, cos_nu) = true_anomaly.sin_cos();
        self.shape
            .transformation_matrix
            .dot_vec(DVec2::new(radius * cos_nu, radius * sin_nu))
    }

    /// Gets the velocity at a true anomaly, in m/s.
    ///
    /// ```text
    /// v_pqw = sqrt(mu / p) * (-sin(nu), e + cos(nu))
    /// ```
    pub fn get_velocity_at_true_anomaly(&self, true_anomaly: f64) -> Result<DVec3> {
        let mu = self.masses()?.mu;
        let mult = (mu / self.shape.semi_latus_rectum).sqrt();
        let (sin_nu, cos_nu) = true_anomaly.sin_cos();
        Ok(self
            .shape
            .transformation_matrix
            .dot_vec(DVec2::new(-sin_nu, self.e + cos_nu) * mult))
    }

    /// Gets the state vectors at a true anomaly.
    pub fn get_state_vectors_at_true_anomaly(&self, true_anomaly: f64) -> Result<StateVectors> {
        Ok(StateVectors {
            position: self.get_position_at_true_anomaly(true_anomaly),
            velocity: self.get_velocity_at_true_anomaly(true_anomaly)?,
        })
    }

    /// Gets the state vectors at a Modified Julian Date.
    pub fn get_state_vectors_at_time(&self, mjd: f64) -> Result<StateVectors> {
        self.get_state_vectors_at_true_anomaly(self.get_true_anomaly_at_time(mjd)?)
    }

    /// Gets the position at a Modified Julian Date, in metres.
    pub fn get_position_at_time(&self, mjd: f64) -> Result<DVec3> {
        Ok(self.get_position_at_true_anomaly(self.get_true_anomaly_at_time(mjd)?))
    }

    /// Gets the velocity at a Modified Julian Date, in m/s.
    pub fn get_velocity_at_time(&self, mjd: f64) -> Result<DVec3> {
        self.get_velocity_at_true_anomaly(self.get_true_anomaly_at_time(mjd)?)
    }

    /// Propagates to a Modified Julian Date, going through the Kepler memo.
    ///
    /// This is the per-tick entry point: a body whose elements are queried
    /// several times at the same instant solves Kepler's equation once.
    pub fn update(&mut self, mjd: f64) -> Result<StateVectors> {
        let mean_anomaly = self.get_mean_anomaly_at_time(mjd)?;
        let eccentric_anomaly = self.get_eccentric_anomaly(mean_anomaly);
        let true_anomaly = self.get_true_anomaly_at_eccentric_anomaly(eccentric_anomaly);
        self.get_state_vectors_at_true_anomaly(true_anomaly)
    }

    /// Replaces the elements with the osculating elements of a state, and
    /// moves the epoch to `mjd`.
    ///
    /// Masses must already be known, since they fix the gravitational
    /// parameter the state is interpreted with.
    ///
    /// # Degenerate geometry
    /// - Equatorial orbits (`i` ≈ 0 or π) have no node line; the longitude
    ///   of the ascending node is set to zero and the reference direction
    ///   becomes the x axis.
    /// - Circular orbits have no periapsis direction; the argument of
    ///   periapsis is set to zero and the true anomaly is measured from the
    ///   node (the argument of latitude).
    ///
    /// # Errors
    /// - [`OrbitError::NotConfigured`] before [`setup`][Self::setup].
    /// - [`OrbitError::DegenerateState`] for a zero or non-finite position,
    ///   or a purely radial velocity.
    /// - [`OrbitError::InvalidElements`] if the state does not round to a
    ///   usable conic, which can happen right at the parabolic boundary.
    ///
    /// On error the element set is left unchanged.
    ///
    /// # Reference
    /// <https://orbital-mechanics.space/classical-orbital-elements/orbital-elements-and-the-state-vector.html>
    pub fn calculate(&mut self, position: DVec3, velocity: DVec3, mjd: f64) -> Result<()> {
        let mu = self.masses()?.mu;
        let epsilon = self.config.degenerate_epsilon;

        if !position.is_finite() || !velocity.is_finite() {
            return Err(OrbitError::DegenerateState("non-finite state vector"));
        }

        let altitude = position.length();
        if altitude == 0.0 {
            return Err(OrbitError::DegenerateState("position at the primary's centre"));
        }

        let angular_momentum_vector = position.cross(velocity);
        let angular_momentum = angular_momentum_vector.length();
        if angular_momentum <= epsilon * altitude * velocity.length() || angular_momentum == 0.0 {
            return Err(OrbitError::DegenerateState("radial trajectory has no orbital plane"));
        }
        let plane_normal = angular_momentum_vector / angular_momentum;

        let inclination = plane_normal.z.clamp(-1.0, 1.0).acos();

        // z cross h, simplified
        let node_vector = DVec3::new(-angular_momentum_vector.y, angular_momentum_vector.x, 0.0);
        let node_length = node_vector.length();
        let (long_asc_node, reference) = if node_length > epsilon * angular_momentum {
            (
                node_vector.y.atan2(node_vector.x).rem_euclid(TAU),
                node_vector / node_length,
            )
        } else {
            (0.0, DVec3::X)
        };

        // Signed angle from one in-plane vector to another, about the normal.
        let angle_in_plane = |from: DVec3, to: DVec3| {
            plane_normal.dot(from.cross(to)).atan2(from.dot(to))
        };

        let eccentricity_vector =
            velocity.cross(angular_momentum_vector) / mu - position / altitude;
        let eccentricity = eccentricity_vector.length();

        let (arg_pe, true_anomaly) = if eccentricity > epsilon {
            (
                angle_in_plane(reference, eccentricity_vector).rem_euclid(TAU),
                angle_in_plane(eccentricity_vector, position),
            )
        } else {
            (0.0, angle_in_plane(reference, position))
        };

        let semi_latus_rectum = angular_momentum * angular_momentum / mu;
        let semi_major_axis = if (eccentricity - 1.0).abs() < PARABOLIC_TOLERANCE {
            semi_latus_rectum * 0.5
        } else {
            semi_latus_rectum / (1.0 - eccentricity * eccentricity)
        };
        Self::check_conic(semi_major_axis, eccentricity)?;

        self.a = semi_major_axis;
        self.e = eccentricity;
        self.i = inclination;
        self.theta = long_asc_node;
        self.omegab = (long_asc_node + arg_pe).rem_euclid(TAU);
        self.mjd_epoch = mjd;
        self.mode = ElementsMode::FromStateVectors;
        self.refresh();

        let mean_anomaly = self.get_mean_anomaly_at_true_anomaly(true_anomaly);
        self.l = if self.is_closed() {
            (self.omegab + mean_anomaly).rem_euclid(TAU)
        } else {
            self.omegab + mean_anomaly
        };

        Ok(())
    }
}
