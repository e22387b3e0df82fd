//! The objects frames can be centred on or pointed at.
//!
//! Bodies live in an [`ObjectRegistry`] arena and are referred to by
//! [`ObjectId`]. An id carries a generation, so an id kept around after its
//! object was removed is detected instead of silently resolving to
//! whatever object took the slot next.

use core::{cell::RefCell, fmt};

use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    frame::ObjectStates, series::Vsop87Series, CachingOrbit, KeplerOrbit, Orbit, OrbitError,
    OrbitalElements, Result, RotationModel, Vsop87Orbit,
};

/// A handle to an object in an [`ObjectRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// How an object moves.
#[derive(Clone, Debug, PartialEq)]
pub enum Trajectory {
    /// Sits still at a point of the universal frame.
    Fixed(DVec3),
    /// Follows Keplerian elements about a parent object.
    Keplerian {
        /// The object being orbited.
        parent: ObjectId,
        /// The orbit, relative to the parent.
        elements: OrbitalElements,
    },
    /// Follows an analytic series about a parent object.
    Series {
        /// The object the series is centred on.
        parent: ObjectId,
        /// The series tables.
        series: &'static Vsop87Series,
    },
}

impl Trajectory {
    /// The object this trajectory is relative to, if any.
    pub fn parent(&self) -> Option<ObjectId> {
        match self {
            Trajectory::Fixed(_) => None,
            Trajectory::Keplerian { parent, .. } | Trajectory::Series { parent, .. } => {
                Some(*parent)
            }
        }
    }
}

/// A celestial body or spacecraft.
///
/// Once the object is in a registry its mass and trajectory can only be
/// changed through [`ObjectRegistry::set_mass`] and
/// [`ObjectRegistry::set_trajectory`], which keep the satellites and the
/// cached orbits consistent.
#[derive(Clone, Debug, PartialEq)]
pub struct CelestialObject {
    /// The name of the object.
    pub name: String,

    /// The mean radius of the object, in metres.
    pub radius: f64,

    /// How the object turns, if it matters.
    pub rotation: Option<RotationModel>,

    mass: f64,
    trajectory: Trajectory,
}

impl CelestialObject {
    /// Creates an object that does not rotate.
    ///
    /// `mass` is in kilograms.
    pub fn new(name: impl Into<String>, mass: f64, radius: f64, trajectory: Trajectory) -> Self {
        Self {
            name: name.into(),
            radius,
            rotation: None,
            mass,
            trajectory,
        }
    }

    /// Gives the object a rotation model.
    #[must_use]
    pub fn with_rotation(mut self, rotation: RotationModel) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// The mass of the object, in kilograms.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// How the object moves.
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }
}

/// The propagator behind a trajectory, with its single-slot cache.
///
/// Frames read objects through `&self`, so the caches sit in cells.
#[derive(Clone, Debug)]
enum Motion {
    Fixed(DVec3),
    Kepler(RefCell<CachingOrbit<KeplerOrbit>>),
    Series(RefCell<CachingOrbit<Vsop87Orbit>>),
}

impl Motion {
    fn new(trajectory: &Trajectory) -> Result<Self> {
        Ok(match trajectory {
            Trajectory::Fixed(point) => Motion::Fixed(*point),
            Trajectory::Keplerian { elements, .. } => Motion::Kepler(RefCell::new(
                CachingOrbit::new(KeplerOrbit::new(elements.clone())?),
            )),
            Trajectory::Series { series, .. } => {
                Motion::Series(RefCell::new(CachingOrbit::new(Vsop87Orbit::new(*series))))
            }
        })
    }

    fn position(&self, mjd: f64) -> Result<DVec3> {
        match self {
            Motion::Fixed(point) => Ok(*point),
            Motion::Kepler(orbit) => orbit.borrow_mut().get_position(mjd),
            Motion::Series(orbit) => orbit.borrow_mut().get_position(mjd),
        }
    }

    fn velocity(&self, mjd: f64) -> Result<DVec3> {
        match self {
            Motion::Fixed(_) => Ok(DVec3::ZERO),
            Motion::Kepler(orbit) => orbit.borrow_mut().get_velocity(mjd),
            Motion::Series(orbit) => orbit.borrow_mut().get_velocity(mjd),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Clone, Debug)]
struct Entry {
    object: CelestialObject,
    motion: Motion,
    satellites: Vec<ObjectId>,
}

// The motion is derived from the object's trajectory.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.object == other.object && self.satellites == other.satellites
    }
}

/// An arena of objects with their parent/satellite relations.
///
/// Every object's propagator keeps the last position and velocity it
/// computed, so the several frame queries made for one instant only
/// evaluate each orbit once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl ObjectRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of live objects.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no live objects.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds an object.
    ///
    /// Keplerian elements that have not been set up yet are given the
    /// object's and the parent's masses, at the elements' own epoch.
    ///
    /// # Errors
    /// - [`OrbitError::ParentNotFound`] if the trajectory's parent is not
    ///   a live object. The object is dropped.
    /// - [`OrbitError::InvalidMass`] or [`OrbitError::InvalidElements`] if
    ///   the elements cannot be set up.
    /// - [`OrbitError::InvalidRotation`] if the rotation model is unusable.
    pub fn add(&mut self, mut object: CelestialObject) -> Result<ObjectId> {
        if let Some(rotation) = &object.rotation {
            rotation.check()?;
        }
        self.prepare(&mut object.trajectory, object.mass)?;
        let motion = Motion::new(&object.trajectory)?;

        let parent = object.trajectory.parent();
        let entry = Entry {
            object,
            motion,
            satellites: Vec::new(),
        };

        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = Some(entry);
                ObjectId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                ObjectId {
                    index,
                    generation: 0,
                }
            }
        };
        self.len += 1;

        if let Some(parent) = parent {
            if let Some(entry) = self.entry_mut(parent) {
                entry.satellites.push(id);
            }
        }

        log::debug!(
            "added object {id} ({})",
            self.entry(id).map_or("?", |entry| entry.object.name.as_str())
        );
        Ok(id)
    }

    /// Checks the parent and sets up Keplerian elements that have no
    /// masses yet.
    fn prepare(&self, trajectory: &mut Trajectory, mass: f64) -> Result<()> {
        let Some(parent) = trajectory.parent() else {
            return Ok(());
        };
        let parent_mass = self
            .get(parent)
            .map_err(|_| OrbitError::ParentNotFound(parent))?
            .mass;

        if let Trajectory::Keplerian { elements, .. } = trajectory {
            if elements.get_gravitational_parameter().is_err() {
                let epoch = elements.get_epoch();
                elements.setup(mass, parent_mass, epoch)?;
            }
        }
        Ok(())
    }

    /// Replaces the trajectory of an object, moving it under a new parent
    /// if the trajectory says so.
    ///
    /// Keplerian elements without masses are set up as in
    /// [`add`][Self::add]. Satellites stay attached to the object.
    ///
    /// # Errors
    /// - [`OrbitError::ObjectDestroyed`] if `id` is not live.
    /// - [`OrbitError::ParentNotFound`] if the new parent is not live.
    /// - [`OrbitError::ParentCycle`] if the new parent is the object
    ///   itself or one of its satellites, at any depth.
    /// - [`OrbitError::InvalidMass`] or [`OrbitError::InvalidElements`] if
    ///   the elements cannot be set up.
    ///
    /// On error nothing is changed.
    pub fn set_trajectory(&mut self, id: ObjectId, mut trajectory: Trajectory) -> Result<()> {
        let mass = self.get(id)?.mass;
        let new_parent = trajectory.parent();

        if let Some(parent) = new_parent {
            if !self.contains(parent) {
                return Err(OrbitError::ParentNotFound(parent));
            }
            if self.ancestry(parent).any(|ancestor| ancestor == id) {
                return Err(OrbitError::ParentCycle { object: id, parent });
            }
        }

        self.prepare(&mut trajectory, mass)?;
        let motion = Motion::new(&trajectory)?;

        let old_parent = self.get(id)?.trajectory.parent();
        if let Some(old_parent) = old_parent {
            if let Some(entry) = self.entry_mut(old_parent) {
                entry.satellites.retain(|&satellite| satellite != id);
            }
        }
        if let Some(new_parent) = new_parent {
            if let Some(entry) = self.entry_mut(new_parent) {
                entry.satellites.push(id);
            }
        }

        let entry = self.entry_mut(id).ok_or(OrbitError::ObjectDestroyed(id))?;
        entry.object.trajectory = trajectory;
        entry.motion = motion;

        log::debug!(
            "object {id} ({}) moved from {old_parent:?} to {new_parent:?}",
            entry.object.name
        );
        Ok(())
    }

    /// Changes the mass of an object.
    ///
    /// The object's own Keplerian elements and those of its Keplerian
    /// satellites are given the new mass, so their gravitational
    /// parameters follow.
    ///
    /// # Errors
    /// - [`OrbitError::ObjectDestroyed`] if `id` is not live.
    /// - [`OrbitError::InvalidMass`] if the new mass cannot be used. On
    ///   error nothing is changed.
    pub fn set_mass(&mut self, id: ObjectId, mass: f64) -> Result<()> {
        let entry = self.entry(id).ok_or(OrbitError::ObjectDestroyed(id))?;
        let parent_mass = match entry.object.trajectory.parent() {
            Some(parent) => self.get(parent)?.mass,
            None => 0.0,
        };
        if !(mass.is_finite() && mass >= 0.0) {
            return Err(OrbitError::InvalidMass {
                mass,
                primary_mass: parent_mass,
            });
        }

        // Rebuild every affected trajectory first so a bad mass changes nothing.
        let mut updates = Vec::new();
        if let Trajectory::Keplerian { parent, elements } = &entry.object.trajectory {
            let mut elements = elements.clone();
            elements.set_masses(mass, parent_mass)?;
            let trajectory = Trajectory::Keplerian {
                parent: *parent,
                elements,
            };
            updates.push((id, Motion::new(&trajectory)?, trajectory));
        }
        for &satellite in &entry.satellites {
            let satellite_object = self.get(satellite)?;
            if let Trajectory::Keplerian { parent, elements } = &satellite_object.trajectory {
                let mut elements = elements.clone();
                elements.set_masses(satellite_object.mass, mass)?;
                let trajectory = Trajectory::Keplerian {
                    parent: *parent,
                    elements,
                };
                updates.push((satellite, Motion::new(&trajectory)?, trajectory));
            }
        }

        for (target, motion, trajectory) in updates {
            if let Some(entry) = self.entry_mut(target) {
                entry.object.trajectory = trajectory;
                entry.motion = motion;
            }
        }
        if let Some(entry) = self.entry_mut(id) {
            entry.object.mass = mass;
        }
        Ok(())
    }

    /// Removes an object and, recursively, everything orbiting it.
    ///
    /// Returns all removed objects, the requested one first. The ids of
    /// removed objects stop resolving: queries with them return
    /// [`OrbitError::ObjectDestroyed`].
    pub fn remove(&mut self, id: ObjectId) -> Vec<CelestialObject> {
        let Some(entry) = self.take(id) else {
            return Vec::new();
        };

        if let Some(parent) = entry.object.trajectory.parent() {
            if let Some(parent_entry) = self.entry_mut(parent) {
                parent_entry.satellites.retain(|&satellite| satellite != id);
            }
        }

        let mut removed = vec![entry.object];
        for &satellite in &entry.satellites {
            removed.append(&mut self.remove(satellite));
        }
        removed
    }

    fn take(&mut self, id: ObjectId) -> Option<Entry> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(entry)
    }

    fn entry(&self, id: ObjectId) -> Option<&Entry> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    fn entry_mut(&mut self, id: ObjectId) -> Option<&mut Entry> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    /// `id` followed by its parent, grandparent and so on. Stops at a dead
    /// id and after `len` steps.
    fn ancestry(&self, id: ObjectId) -> impl Iterator<Item = ObjectId> + '_ {
        core::iter::successors(Some(id), move |&current| {
            self.entry(current)
                .and_then(|entry| entry.object.trajectory.parent())
        })
        .take(self.len + 1)
    }

    /// Sums `quantity` over `id` and its ancestors.
    fn sum_over_ancestry(
        &self,
        id: ObjectId,
        quantity: impl Fn(&Motion) -> Result<DVec3>,
    ) -> Result<DVec3> {
        let mut total = DVec3::ZERO;
        let mut steps = 0;
        for ancestor in self.ancestry(id) {
            let entry = self
                .entry(ancestor)
                .ok_or(OrbitError::ObjectDestroyed(ancestor))?;
            total += quantity(&entry.motion)?;
            steps += 1;
            if steps > self.len {
                return Err(OrbitError::ParentCycle {
                    object: id,
                    parent: ancestor,
                });
            }
        }
        Ok(total)
    }

    /// Whether `id` refers to a live object.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.entry(id).is_some()
    }

    /// Gets an object.
    pub fn get(&self, id: ObjectId) -> Result<&CelestialObject> {
        self.entry(id)
            .map(|entry| &entry.object)
            .ok_or(OrbitError::ObjectDestroyed(id))
    }

    /// Gets an object mutably. Mass and trajectory have their own setters.
    pub fn get_mut(&mut self, id: ObjectId) -> Result<&mut CelestialObject> {
        self.entry_mut(id)
            .map(|entry| &mut entry.object)
            .ok_or(OrbitError::ObjectDestroyed(id))
    }

    /// Gets the objects directly orbiting `id`.
    pub fn satellites(&self, id: ObjectId) -> Result<&[ObjectId]> {
        self.entry(id)
            .map(|entry| entry.satellites.as_slice())
            .ok_or(OrbitError::ObjectDestroyed(id))
    }

    /// Finds the first object with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        self.iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    /// Iterates over all live objects.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &CelestialObject)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entry.as_ref().map(|entry| {
                (
                    ObjectId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    &entry.object,
                )
            })
        })
    }

    /// Drops every cached position and velocity.
    pub fn invalidate_caches(&self) {
        for entry in self.slots.iter().filter_map(|slot| slot.entry.as_ref()) {
            match &entry.motion {
                Motion::Fixed(_) => {}
                Motion::Kepler(orbit) => orbit.borrow_mut().invalidate(),
                Motion::Series(orbit) => orbit.borrow_mut().invalidate(),
            }
        }
    }

    /// The time the object's cached position and velocity belong to, or
    /// `None` for fixed objects, which have nothing to cache.
    pub fn cached_time(&self, id: ObjectId) -> Result<Option<f64>> {
        let entry = self.entry(id).ok_or(OrbitError::ObjectDestroyed(id))?;
        Ok(match &entry.motion {
            Motion::Fixed(_) => None,
            Motion::Kepler(orbit) => Some(orbit.borrow().cache().last_time()),
            Motion::Series(orbit) => Some(orbit.borrow().cache().last_time()),
        })
    }

    /// Gets the position of an object relative to its parent, in metres.
    pub fn get_relative_position(&self, id: ObjectId, mjd: f64) -> Result<DVec3> {
        self.entry(id)
            .ok_or(OrbitError::ObjectDestroyed(id))?
            .motion
            .position(mjd)
    }

    /// Gets the velocity of an object relative to its parent, in m/s.
    pub fn get_relative_velocity(&self, id: ObjectId, mjd: f64) -> Result<DVec3> {
        self.entry(id)
            .ok_or(OrbitError::ObjectDestroyed(id))?
            .motion
            .velocity(mjd)
    }

    /// Gets the absolute position of an object in the universal frame.
    ///
    /// Relative positions are summed up the parent chain; the top ancestor
    /// sits wherever its fixed trajectory puts it.
    pub fn get_position(&self, id: ObjectId, mjd: f64) -> Result<DVec3> {
        self.sum_over_ancestry(id, |motion| motion.position(mjd))
    }

    /// Gets the absolute velocity of an object in the universal frame.
    pub fn get_velocity(&self, id: ObjectId, mjd: f64) -> Result<DVec3> {
        self.sum_over_ancestry(id, |motion| motion.velocity(mjd))
    }
}

impl ObjectStates for ObjectRegistry {
    fn position(&self, id: ObjectId, mjd: f64) -> Result<DVec3> {
        self.get_position(id, mjd)
    }

    fn velocity(&self, id: ObjectId, mjd: f64) -> Result<DVec3> {
        self.get_velocity(id, mjd)
    }

    fn rotation(&self, id: ObjectId) -> Result<Option<RotationModel>> {
        Ok(self.get(id)?.rotation)
    }

    fn name(&self, id: ObjectId) -> Result<&str> {
        Ok(self.get(id)?.name.as_str())
    }
}

impl fmt::Display for ObjectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Object registry with {} objects", self.len)
    }
}
