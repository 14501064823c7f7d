use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Electron rest mass energy in MeV.
pub const ELECTRON_REST_MASS_ENERGY: f64 = 0.51099891;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleType {
    #[serde(rename = "electron")]
    Electron,
    #[serde(rename = "positron")]
    Positron,
    #[serde(rename = "photon")]
    Photon,
    #[serde(rename = "adjoint_photon")]
    AdjointPhoton,
    #[serde(rename = "adjoint_electron")]
    AdjointElectron,
}

/// Phase-space state of a particle during a history. Energies are in MeV.
#[derive(Debug, Clone)]
pub struct Particle {
    pub particle_type: ParticleType,
    pub position: [f64; 3],
    pub direction: [f64; 3],
    pub energy: f64,
    pub weight: f64,
    pub alive: bool,
    pub collision_number: u32,
    /// Probes carry a contribution to a fixed energy and never spawn probes
    pub probe: bool,
}

impl Particle {
    pub fn new(particle_type: ParticleType, position: [f64; 3], direction: [f64; 3], energy: f64) -> Self {
        Self {
            particle_type,
            position,
            direction,
            energy,
            weight: 1.0,
            alive: true,
            collision_number: 0,
            probe: false,
        }
    }

    pub fn electron(energy: f64) -> Self {
        Self::new(ParticleType::Electron, [0.0; 3], [0.0, 0.0, 1.0], energy)
    }

    pub fn positron(energy: f64) -> Self {
        Self::new(ParticleType::Positron, [0.0; 3], [0.0, 0.0, 1.0], energy)
    }

    pub fn adjoint_photon(energy: f64) -> Self {
        Self::new(ParticleType::AdjointPhoton, [0.0; 3], [0.0, 0.0, 1.0], energy)
    }

    /// A secondary of another type born at this particle's position with its weight.
    pub fn spawn(&self, particle_type: ParticleType, direction: [f64; 3], energy: f64) -> Particle {
        Particle {
            particle_type,
            position: self.position,
            direction,
            energy,
            weight: self.weight,
            alive: true,
            collision_number: 0,
            probe: false,
        }
    }

    pub fn direction_vector(&self) -> Vector3<f64> {
        Vector3::new(self.direction[0], self.direction[1], self.direction[2])
    }

    pub fn set_direction(&mut self, direction: Vector3<f64>) {
        let unit = direction.normalize();
        self.direction = [unit.x, unit.y, unit.z];
    }

    /// Rotate the direction through a polar angle cosine `mu` and azimuth `phi`.
    pub fn rotate_direction(&mut self, mu: f64, phi: f64) {
        let rotated = rotate_direction_3d(&self.direction_vector(), mu, phi);
        self.set_direction(rotated);
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }
}

/// Rotate a direction vector by angle theta (cos(theta)=mu) around an arbitrary axis.
///
/// The returned direction has cosine `mu` relative to `u_old`; `phi` selects
/// the azimuth around it.
pub fn rotate_direction_3d(u_old: &Vector3<f64>, mu: f64, phi: f64) -> Vector3<f64> {
    let mu = mu.clamp(-1.0, 1.0);
    let sin_theta = (1.0 - mu * mu).max(0.0).sqrt();

    // Find a perpendicular vector to u_old
    let perp = if u_old.x.abs() < 0.99 {
        Vector3::new(1.0, 0.0, 0.0).cross(u_old).normalize()
    } else {
        Vector3::new(0.0, 1.0, 0.0).cross(u_old).normalize()
    };
    let ortho = u_old.cross(&perp);

    mu * u_old + sin_theta * phi.cos() * perp + sin_theta * phi.sin() * ortho
}
