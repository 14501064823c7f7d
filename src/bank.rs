// Secondary particle bank
//
// Reactions push the particles they create (annihilation photons, knock-on
// electrons, scattered adjoint photons) here; the transport loop drains it.

use crate::particle::{Particle, ParticleType};
use std::collections::VecDeque;

/// FIFO bank of particles still to be transported in a history.
#[derive(Debug)]
pub struct ParticleBank {
    queue: VecDeque<Particle>,
}

impl ParticleBank {
    pub fn new() -> Self {
        ParticleBank {
            queue: VecDeque::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ParticleBank {
            queue: VecDeque::with_capacity(capacity),
        }
    }

    /// Bank a secondary particle created by a reaction
    pub fn push(&mut self, particle: Particle) {
        self.queue.push_back(particle);
    }

    /// Next particle to transport, oldest first
    pub fn pop(&mut self) -> Option<Particle> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Number of banked particles of the given type
    pub fn count_of(&self, particle_type: ParticleType) -> usize {
        self.queue
            .iter()
            .filter(|p| p.particle_type == particle_type)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.queue.iter()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl Default for ParticleBank {
    fn default() -> Self {
        Self::new()
    }
}
