use poolsim_core::exchange::{synchronize, RegionView};
use poolsim_core::{RegionBuckets, Topology};
use poolsim_data::{Particle, ParticleClass, Vector2};
use poolsim_net::{LocalCluster, Transport};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Hand-placed particle populations for multi-worker tests.
///
/// Positions are given in world coordinates. Each particle is handed to a
/// "computing" worker that is generally not its owner, the state right
/// after a physics step.
#[allow(dead_code)]
pub struct PoolBuilder {
    pool_length: usize,
    grid_size: f64,
    horizon: usize,
    particles: Vec<Particle>,
}

#[allow(dead_code)]
impl PoolBuilder {
    pub fn new(pool_length: usize, grid_size: f64) -> Self {
        Self {
            pool_length,
            grid_size,
            horizon: 0,
            particles: Vec::new(),
        }
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_particle(mut self, class: ParticleClass, mass: f64, radius: f64, x: f64, y: f64) -> Self {
        let id = self.particles.len() as u64;
        self.particles
            .push(Particle::new(id, 0, class, mass, radius, Vector2::new(x, y)));
        self
    }

    pub fn with_random_particles(mut self, count: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let world = self.grid_size * self.pool_length as f64;
        for _ in 0..count {
            let x = rng.gen_range(0.0..world);
            let y = rng.gen_range(0.0..world);
            self = self.with_particle(ParticleClass::Small, 1.0, 0.1, x, y);
        }
        self
    }

    pub fn build(self) -> Pool {
        let topology = Topology::new(self.pool_length, self.grid_size).expect("valid topology");
        let workers = topology.region_count();
        let mut scattered = vec![Vec::new(); workers];

        for (i, mut particle) in self.particles.into_iter().enumerate() {
            let (region, local) = topology.localize(particle.position);
            particle.position = local;
            particle.pending_region = Some(region);
            scattered[i % workers].push(particle);
        }

        Pool {
            topology,
            horizon: self.horizon,
            scattered,
        }
    }
}

pub struct Pool {
    pub topology: Topology,
    pub horizon: usize,
    /// Particles per computing worker, tagged with their destination region.
    pub scattered: Vec<Vec<Particle>>,
}

#[allow(dead_code)]
impl Pool {
    pub fn workers(&self) -> usize {
        self.topology.region_count()
    }

    pub fn total(&self) -> usize {
        self.scattered.iter().map(Vec::len).sum()
    }

    pub fn outgoing(&self, worker: usize) -> RegionBuckets {
        RegionBuckets::redistribute(self.workers(), self.scattered[worker].clone())
            .expect("destinations inside the pool")
    }

    /// Runs one exchange on every worker and returns the views by worker.
    pub fn synchronize(&self) -> Vec<RegionView> {
        self.run(|t, outgoing| synchronize(t, &self.topology, self.horizon, outgoing))
    }

    /// Runs two exchanges back to back with no physics in between.
    pub fn synchronize_twice(&self) -> Vec<(RegionView, RegionView)> {
        self.run(|t, outgoing| {
            let first = synchronize(t, &self.topology, self.horizon, outgoing)?;
            let again = first.clone().into_buckets()?;
            let second = synchronize(t, &self.topology, self.horizon, again)?;
            Ok((first, second))
        })
    }

    fn run<R, F>(&self, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(&poolsim_net::ChannelTransport, RegionBuckets) -> poolsim_core::Result<R> + Sync,
    {
        let cluster = LocalCluster::new(self.workers()).expect("cluster");
        cluster
            .run(|t| {
                let outgoing = self.outgoing(t.worker_id());
                f(&t, outgoing)
            })
            .expect("no worker panicked")
            .into_iter()
            .map(|r| r.expect("exchange succeeded"))
            .collect()
    }
}

#[allow(dead_code)]
pub fn sorted_ids(particles: &[Particle]) -> Vec<u64> {
    let mut ids: Vec<u64> = particles.iter().map(|p| p.id).collect();
    ids.sort_unstable();
    ids
}

#[allow(dead_code)]
pub fn total_momentum(particles: &[Particle]) -> Vector2 {
    particles
        .iter()
        .fold(Vector2::ZERO, |acc, p| acc + p.momentum())
}
