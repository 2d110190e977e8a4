use crate::error::{Result, SimError};
use poolsim_data::Particle;

/// Particles bucketed by region id.
///
/// The outer vector always has one entry per region, so indexing by a valid
/// region id never fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionBuckets {
    buckets: Vec<Vec<Particle>>,
}

impl RegionBuckets {
    /// Empty buckets for `regions` regions.
    #[must_use]
    pub fn new(regions: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); regions],
        }
    }

    /// Empty buckets with room for `sizes[r]` particles in region `r`.
    #[must_use]
    pub fn allocate(sizes: &[u64]) -> Self {
        Self {
            buckets: sizes
                .iter()
                .map(|&size| Vec::with_capacity(size as usize))
                .collect(),
        }
    }

    /// Buckets particles by their destination region and commits it.
    pub fn redistribute<I>(regions: usize, particles: I) -> Result<Self>
    where
        I: IntoIterator<Item = Particle>,
    {
        let mut out = Self::new(regions);
        for mut particle in particles {
            let destination = particle.destination();
            if destination >= regions {
                return Err(SimError::protocol(format!(
                    "particle {} targets region {destination} of {regions}",
                    particle.id
                )));
            }
            particle.commit_region();
            out.buckets[destination].push(particle);
        }
        Ok(out)
    }

    /// Scatters region-tagged particles and checks every count against
    /// `sizes`.
    pub fn merge(particles: Vec<Particle>, sizes: &[u64]) -> Result<Self> {
        let mut out = Self::allocate(sizes);
        let regions = sizes.len();
        for particle in particles {
            let region = particle.region_id;
            if region >= regions {
                return Err(SimError::protocol(format!(
                    "particle {} tagged with region {region} of {regions}",
                    particle.id
                )));
            }
            out.buckets[region].push(particle);
        }

        for (region, (bucket, &expected)) in out.buckets.iter().zip(sizes).enumerate() {
            if bucket.len() as u64 != expected {
                return Err(SimError::CountMismatch {
                    region,
                    expected: expected as usize,
                    actual: bucket.len(),
                });
            }
        }
        Ok(out)
    }

    #[must_use]
    pub fn sizes(&self) -> Vec<u64> {
        self.buckets.iter().map(|b| b.len() as u64).collect()
    }

    #[inline]
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn get(&self, region: usize) -> &[Particle] {
        self.buckets.get(region).map_or(&[], Vec::as_slice)
    }

    /// Moves a region's particles out, leaving its bucket empty.
    pub fn take(&mut self, region: usize) -> Vec<Particle> {
        self.buckets
            .get_mut(region)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    pub fn push(&mut self, particle: Particle) -> Result<()> {
        let regions = self.buckets.len();
        match self.buckets.get_mut(particle.region_id) {
            Some(bucket) => {
                bucket.push(particle);
                Ok(())
            }
            None => Err(SimError::protocol(format!(
                "particle {} tagged with region {} of {regions}",
                particle.id, particle.region_id
            ))),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Particle])> {
        self.buckets.iter().map(Vec::as_slice).enumerate()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Vec<Particle>> {
        self.buckets
    }
}

/// Read-only copies of another region's particles.
#[derive(Debug, Clone, PartialEq)]
pub struct GhostSet {
    pub region: usize,
    pub particles: Vec<Particle>,
}
