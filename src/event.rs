use std::fmt::{self, Display};

use noisy_float::prelude::*;
use particle_id::ParticleID;
use serde::{Deserialize, Serialize};

use crate::four_vector::FourVector;

/// Particle status code
///
/// Follows the PYTHIA sign convention: a positive code marks a
/// particle remaining in the final state, a negative code one that has
/// decayed, branched, or been replaced.
#[derive(
    Deserialize,
    Serialize,
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
pub struct Status(pub i32);

impl Status {
    /// Whether the particle is stable and does not interact further
    pub const fn is_final(self) -> bool {
        self.0 > 0
    }
}

/// A single entry of the event record
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct Particle {
    pub id: ParticleID,
    pub status: Status,
    pub p: FourVector,
}

impl Particle {
    /// Whether the particle belongs to the final state
    pub fn is_final(&self) -> bool {
        self.status.is_final()
    }
}

/// Simulated collision event
///
/// The particle record keeps the order in which the event source
/// produced the particles.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Event {
    id: usize,
    pub weight: N64,
    particles: Vec<Particle>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// The full particle record
    pub fn particles(&self) -> &[Particle] {
        self.particles.as_slice()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventBuilder {
    id: usize,
    weight: N64,
    particles: Vec<Particle>,
}

impl EventBuilder {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            weight: n64(1.),
            particles: Vec::new(),
        }
    }

    pub fn with_capacity(id: usize, cap: usize) -> Self {
        Self {
            id,
            weight: n64(1.),
            particles: Vec::with_capacity(cap),
        }
    }

    pub fn add_particle(
        &mut self,
        id: ParticleID,
        status: Status,
        p: FourVector,
    ) -> &mut Self {
        self.particles.push(Particle { id, status, p });
        self
    }

    pub fn weight(&mut self, weight: N64) -> &mut Self {
        self.weight = weight;
        self
    }

    /// Multiply all energies and momenta by a common factor
    pub fn rescale_energies(&mut self, factor: N64) -> &mut Self {
        for particle in &mut self.particles {
            particle.p.rescale(factor);
        }
        self
    }

    pub fn build(self) -> Event {
        Event {
            id: self.id,
            weight: self.weight,
            particles: self.particles,
        }
    }
}

impl From<EventBuilder> for Event {
    fn from(b: EventBuilder) -> Self {
        b.build()
    }
}

/// Cross section estimate in mb
#[derive(
    Deserialize, Serialize, Copy, Clone, Debug, Default, PartialEq, PartialOrd,
)]
pub struct CrossSection {
    pub mean: f64,
    pub err: f64,
}

impl Display for CrossSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "σ = {:.3e} ± {:.3e} mb", self.mean, self.err)
    }
}
