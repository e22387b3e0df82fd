use glam::DVec3;

use crate::{
    series::Vsop87Series, OrbitalElements, PropagationConfig, Result, AU, SECONDS_PER_DAY,
};

/// Something that can compute where a body is at a given time.
///
/// Implementors only have to provide [`calculate_position`][Self::calculate_position]
/// and the two size/period hints; velocities fall back to a symmetric
/// finite difference of positions.
///
/// Positions are in metres and velocities in metres per second, relative
/// to whatever the source is centred on. Times are Modified Julian Dates.
pub trait PositionSource {
    /// Computes the position at `mjd`.
    fn calculate_position(&self, mjd: f64) -> Result<DVec3>;

    /// Computes the velocity at `mjd`.
    ///
    /// The default differentiates [`calculate_position`][Self::calculate_position]
    /// over `mjd ± velocity_step()`.
    fn calculate_velocity(&self, mjd: f64) -> Result<DVec3> {
        let step = self.velocity_step();
        let ahead = self.calculate_position(mjd + step)?;
        let behind = self.calculate_position(mjd - step)?;
        Ok((ahead - behind) / (2.0 * step * SECONDS_PER_DAY))
    }

    /// Half-width of the finite difference used by the default
    /// [`calculate_velocity`][Self::calculate_velocity], in days.
    fn velocity_step(&self) -> f64 {
        PropagationConfig::default().velocity_step_days
    }

    /// The orbital period, in days. Infinite for open trajectories.
    fn period(&self) -> f64;

    /// The largest distance from the centre the body reaches, in metres.
    fn bounding_radius(&self) -> f64;

    /// Whether the motion repeats with [`period`][Self::period].
    fn is_periodic(&self) -> bool {
        self.period().is_finite()
    }
}

/// Read access to an orbit, as used by the rest of the simulator.
///
/// Position and velocity queries take `&mut self` because implementations
/// are allowed to remember their last answer.
pub trait Orbit {
    /// Gets the position at `mjd`, in metres.
    fn get_position(&mut self, mjd: f64) -> Result<DVec3>;

    /// Gets the velocity at `mjd`, in m/s.
    fn get_velocity(&mut self, mjd: f64) -> Result<DVec3>;

    /// Gets the orbital period, in days.
    fn get_period(&self) -> f64;

    /// Gets the bounding radius, in metres.
    fn get_bounding_radius(&self) -> f64;

    /// Whether the orbit is periodic.
    fn is_periodic(&self) -> bool;
}

/// A single-slot cache of one position and one velocity at one time.
///
/// The slot is keyed on exact equality of the time. Asking about any other
/// time drops both cached vectors, so a position stored for `t1` is never
/// served alongside a velocity computed for `t2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCache {
    last_time: f64,
    position: Option<DVec3>,
    velocity: Option<DVec3>,
}

impl Default for OrbitCache {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitCache {
    /// An empty cache. No finite time matches it.
    pub const fn new() -> Self {
        Self {
            last_time: f64::NEG_INFINITY,
            position: None,
            velocity: None,
        }
    }

    /// The time the cached values belong to.
    pub fn last_time(&self) -> f64 {
        self.last_time
    }

    /// Empties the slot.
    pub fn invalidate(&mut self) {
        *self = Self::new();
    }

    fn seek(&mut self, mjd: f64) {
        if mjd != self.last_time {
            self.last_time = mjd;
            self.position = None;
            self.velocity = None;
        }
    }

    fn position_or_else(
        &mut self,
        mjd: f64,
        compute: impl FnOnce() -> Result<DVec3>,
    ) -> Result<DVec3> {
        self.seek(mjd);
        if let Some(position) = self.position {
            return Ok(position);
        }
        log::trace!("position cache miss at MJD {mjd}");
        let position = compute()?;
        self.position = Some(position);
        Ok(position)
    }

    fn velocity_or_else(
        &mut self,
        mjd: f64,
        compute: impl FnOnce() -> Result<DVec3>,
    ) -> Result<DVec3> {
        self.seek(mjd);
        if let Some(velocity) = self.velocity {
            return Ok(velocity);
        }
        log::trace!("velocity cache miss at MJD {mjd}");
        let velocity = compute()?;
        self.velocity = Some(velocity);
        Ok(velocity)
    }
}

/// Wraps a [`PositionSource`] so that repeated queries for the same
/// instant are answered from memory.
///
/// # Example
/// ```
/// use orbit_frames::{series::earth::EARTH, CachingOrbit, Orbit, Vsop87Orbit, MJD_J2000};
///
/// let mut earth = CachingOrbit::new(Vsop87Orbit::new(&EARTH));
///
/// let first = earth.get_position(MJD_J2000).unwrap();
/// let second = earth.get_position(MJD_J2000).unwrap();
/// assert_eq!(first, second);
/// ```
#[derive(Clone, Debug)]
pub struct CachingOrbit<S> {
    source: S,
    cache: OrbitCache,
}

impl<S: PositionSource> CachingOrbit<S> {
    /// Wraps a source with an empty cache.
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: OrbitCache::new(),
        }
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the wrapped source. The cache is emptied, since
    /// the source may change what it computes.
    pub fn source_mut(&mut self) -> &mut S {
        self.cache.invalidate();
        &mut self.source
    }

    /// The cache slot.
    pub fn cache(&self) -> &OrbitCache {
        &self.cache
    }

    /// Empties the cache.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Unwraps the source, discarding the cache.
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: PositionSource> Orbit for CachingOrbit<S> {
    fn get_position(&mut self, mjd: f64) -> Result<DVec3> {
        let source = &self.source;
        self.cache
            .position_or_else(mjd, || source.calculate_position(mjd))
    }

    fn get_velocity(&mut self, mjd: f64) -> Result<DVec3> {
        let source = &self.source;
        self.cache
            .velocity_or_else(mjd, || source.calculate_velocity(mjd))
    }

    fn get_period(&self) -> f64 {
        self.source.period()
    }

    fn get_bounding_radius(&self) -> f64 {
        self.source.bounding_radius()
    }

    fn is_periodic(&self) -> bool {
        self.source.is_periodic()
    }
}

/// A heliocentric orbit evaluated from a VSOP87 series.
#[derive(Clone, Copy, Debug)]
pub struct Vsop87Orbit {
    series: &'static Vsop87Series,
    velocity_step: f64,
}

impl Vsop87Orbit {
    /// Creates an orbit for a static series.
    pub fn new(series: &'static Vsop87Series) -> Self {
        Self {
            series,
            velocity_step: PropagationConfig::default().velocity_step_days,
        }
    }

    /// Uses the finite-difference step of `config` for velocities.
    #[must_use]
    pub fn with_config(mut self, config: &PropagationConfig) -> Self {
        self.velocity_step = config.velocity_step_days;
        self
    }

    /// The series this orbit evaluates.
    pub fn series(&self) -> &'static Vsop87Series {
        self.series
    }
}

impl PositionSource for Vsop87Orbit {
    fn calculate_position(&self, mjd: f64) -> Result<DVec3> {
        Ok(self.series.position(mjd))
    }

    fn velocity_step(&self) -> f64 {
        self.velocity_step
    }

    fn period(&self) -> f64 {
        self.series.period_days
    }

    fn bounding_radius(&self) -> f64 {
        self.series.bounding_radius_au * AU
    }
}

/// An orbit that propagates a configured [`OrbitalElements`] set.
///
/// Velocities are analytic rather than finite differences.
#[derive(Clone, Debug, PartialEq)]
pub struct KeplerOrbit {
    elements: OrbitalElements,
    period_days: f64,
}

impl KeplerOrbit {
    /// Wraps an element set whose masses are already known.
    ///
    /// # Errors
    /// [`OrbitError::NotConfigured`][crate::OrbitError::NotConfigured] if
    /// `setup` has not been called on `elements`.
    pub fn new(elements: OrbitalElements) -> Result<Self> {
        let period_days = elements.get_orbital_period()? / SECONDS_PER_DAY;
        Ok(Self {
            elements,
            period_days,
        })
    }

    /// The wrapped elements.
    pub fn elements(&self) -> &OrbitalElements {
        &self.elements
    }
}

impl PositionSource for KeplerOrbit {
    fn calculate_position(&self, mjd: f64) -> Result<DVec3> {
        self.elements.get_position_at_time(mjd)
    }

    fn calculate_velocity(&self, mjd: f64) -> Result<DVec3> {
        self.elements.get_velocity_at_time(mjd)
    }

    fn velocity_step(&self) -> f64 {
        self.elements.config().velocity_step_days
    }

    fn period(&self) -> f64 {
        self.period_days
    }

    fn bounding_radius(&self) -> f64 {
        self.elements.get_apoapsis()
    }

    fn is_periodic(&self) -> bool {
        self.elements.is_closed()
    }
}
