pub mod data;

pub use data::particle::{Particle, ParticleClass};
pub use data::timing::PhaseTotals;
pub use data::vector::Vector2;
