use poolsim_data::{Particle, PhaseTotals};
use serde::{Deserialize, Serialize};

/// Everything that travels between two workers.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", content = "payload")]
pub enum Packet {
    /// Per-region counts, used by the sum-reduction (and the barrier).
    Sizes(Vec<u64>),
    /// Announces the batch that follows for `region`.
    BatchHeader { region: usize, len: usize },
    /// Particles belonging to (or mirrored from) `region`.
    Batch {
        region: usize,
        particles: Vec<Particle>,
    },
    /// A worker's phase timings, gathered at the end of a run.
    Timings(PhaseTotals),
}

impl Packet {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Packet::Sizes(_) => "Sizes",
            Packet::BatchHeader { .. } => "BatchHeader",
            Packet::Batch { .. } => "Batch",
            Packet::Timings(_) => "Timings",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolsim_data::{ParticleClass, Vector2};

    #[test]
    fn test_batch_wire_format_is_tagged() {
        let p = Particle::new(4, 1, ParticleClass::Small, 1.0, 0.5, Vector2::new(2.0, 3.0));
        let msg = Packet::Batch {
            region: 1,
            particles: vec![p],
        };
        let json = serde_json::to_string(&msg).expect("Failed to serialize");
        assert!(json.contains("\"type\":\"Batch\""));

        let parsed: Packet = serde_json::from_str(&json).expect("Failed to deserialize");
        match parsed {
            Packet::Batch { region, particles } => {
                assert_eq!(region, 1);
                assert_eq!(particles[0].id, 4);
            }
            other => panic!("Incorrect message variant: {}", other.kind()),
        }
    }
}
