//! Per-timestep synchronization between workers.
//!
//! Worker `w` owns region `w`. Before each timestep every worker holds the
//! particles it computed last step, bucketed by the region they ended up
//! in. The exchange turns that into, on every worker, the authoritative
//! particle set of its own region plus read-only ghost copies of every
//! region within the horizon.
//!
//! The protocol is a fixed sequence of [`Phase`]s that every worker walks in
//! the same order. In each ownership or horizon pass exactly one region
//! sends and everyone else either receives from it or skips, so blocking
//! receives can never wait on each other in a cycle.

use crate::error::{Result, SimError};
use crate::store::{GhostSet, RegionBuckets};
use crate::topology::Topology;
use poolsim_data::Particle;
use poolsim_net::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Sum-reduce the per-region counts of every worker.
    Reconcile,
    /// Region `pass` hands each peer the particles that moved into its region.
    Ownership { pass: usize },
    /// Region `pass` mirrors its particles to every region within the horizon.
    Horizon { pass: usize },
    /// Record final per-region counts.
    Settle,
    Done,
}

/// What one worker sees after an exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionView {
    pub region: usize,
    /// Particles this worker alone may mutate.
    pub owned: Vec<Particle>,
    pub ghosts: Vec<GhostSet>,
    /// Own count at `region`, ghost counts at horizon regions, zero elsewhere.
    pub sizes: Vec<u64>,
}

impl RegionView {
    /// Owned particles as exchange input, e.g. to resynchronize without
    /// running physics in between.
    pub fn into_buckets(self) -> Result<RegionBuckets> {
        RegionBuckets::redistribute(self.sizes.len(), self.owned)
    }

    #[must_use]
    pub fn ghost_count(&self) -> usize {
        self.ghosts.iter().map(|g| g.particles.len()).sum()
    }
}

/// One worker's walk through the exchange phases.
pub struct ExchangeProtocol<'a, T: Transport> {
    transport: &'a T,
    topology: &'a Topology,
    horizon: usize,
    phase: Phase,
    outgoing: RegionBuckets,
    totals: Vec<u64>,
    received: Vec<Particle>,
    owned: Vec<Particle>,
    ghosts: Vec<GhostSet>,
    sizes: Vec<u64>,
}

impl<'a, T: Transport> ExchangeProtocol<'a, T> {
    pub fn new(
        transport: &'a T,
        topology: &'a Topology,
        horizon: usize,
        outgoing: RegionBuckets,
    ) -> Result<Self> {
        let regions = topology.region_count();
        if transport.worker_count() != regions {
            return Err(SimError::config(format!(
                "{} workers cannot own {regions} regions",
                transport.worker_count()
            )));
        }
        if outgoing.region_count() != regions {
            return Err(SimError::protocol(format!(
                "outgoing buckets cover {} regions, expected {regions}",
                outgoing.region_count()
            )));
        }
        Ok(Self {
            transport,
            topology,
            horizon,
            phase: Phase::Reconcile,
            outgoing,
            totals: Vec::new(),
            received: Vec::new(),
            owned: Vec::new(),
            ghosts: Vec::new(),
            sizes: Vec::new(),
        })
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Authoritative per-region totals, known once `Reconcile` has run.
    #[must_use]
    pub fn totals(&self) -> &[u64] {
        &self.totals
    }

    fn me(&self) -> usize {
        self.transport.worker_id()
    }

    fn regions(&self) -> usize {
        self.topology.region_count()
    }

    /// Executes the current phase and moves to the next one.
    pub fn step(&mut self) -> Result<Phase> {
        self.phase = match self.phase {
            Phase::Reconcile => {
                self.reconcile()?;
                Phase::Ownership { pass: 0 }
            }
            Phase::Ownership { pass } => {
                self.ownership_pass(pass)?;
                if pass + 1 < self.regions() {
                    Phase::Ownership { pass: pass + 1 }
                } else {
                    self.adopt()?;
                    Phase::Horizon { pass: 0 }
                }
            }
            Phase::Horizon { pass } => {
                self.horizon_pass(pass)?;
                if pass + 1 < self.regions() {
                    Phase::Horizon { pass: pass + 1 }
                } else {
                    Phase::Settle
                }
            }
            Phase::Settle => {
                self.settle();
                Phase::Done
            }
            Phase::Done => Phase::Done,
        };
        Ok(self.phase)
    }

    /// Runs every remaining phase.
    pub fn run(mut self) -> Result<RegionView> {
        while self.phase != Phase::Done {
            self.step()?;
        }
        Ok(RegionView {
            region: self.me(),
            owned: self.owned,
            ghosts: self.ghosts,
            sizes: self.sizes,
        })
    }

    fn reconcile(&mut self) -> Result<()> {
        self.totals = self.transport.all_reduce_sum(&self.outgoing.sizes())?;
        tracing::trace!(totals = ?self.totals, "reconciled region sizes");
        Ok(())
    }

    fn ownership_pass(&mut self, sender: usize) -> Result<()> {
        let me = self.me();
        if sender == me {
            for peer in (0..self.regions()).filter(|&w| w != me) {
                let batch = self.outgoing.take(peer);
                self.transport.send_batch(peer, peer, batch)?;
            }
            let kept = self.outgoing.take(me);
            self.received.extend(kept);
        } else {
            let batch = self.transport.recv_batch(sender, me)?;
            self.received.extend(batch);
        }
        Ok(())
    }

    /// Checks the collected particles against the reduced total for this
    /// worker's region and makes them the owned set.
    fn adopt(&mut self) -> Result<()> {
        let me = self.me();
        let mut expected = vec![0; self.regions()];
        expected[me] = self.totals[me];

        let received = std::mem::take(&mut self.received);
        let mut merged = RegionBuckets::merge(received, &expected)?;
        self.owned = merged.take(me);
        tracing::trace!(owned = self.owned.len(), "adopted region");
        Ok(())
    }

    fn horizon_pass(&mut self, sender: usize) -> Result<()> {
        let me = self.me();
        if sender == me {
            for peer in (0..self.regions()).filter(|&r| r != me) {
                if self.topology.within_horizon(me, peer, self.horizon) {
                    self.transport.send_batch(peer, me, self.owned.clone())?;
                }
            }
        } else if self.topology.within_horizon(sender, me, self.horizon) {
            let particles = self.transport.recv_batch(sender, sender)?;
            if let Some(stray) = particles.iter().find(|p| p.region_id != sender) {
                return Err(SimError::protocol(format!(
                    "ghost particle {} from region {sender} is tagged with region {}",
                    stray.id, stray.region_id
                )));
            }
            self.ghosts.push(GhostSet {
                region: sender,
                particles,
            });
        }
        Ok(())
    }

    fn settle(&mut self) {
        let mut sizes = vec![0; self.regions()];
        sizes[self.me()] = self.owned.len() as u64;
        for ghost in &self.ghosts {
            sizes[ghost.region] = ghost.particles.len() as u64;
        }
        self.sizes = sizes;
    }
}

/// Runs the full exchange for one worker.
pub fn synchronize<T: Transport>(
    transport: &T,
    topology: &Topology,
    horizon: usize,
    outgoing: RegionBuckets,
) -> Result<RegionView> {
    ExchangeProtocol::new(transport, topology, horizon, outgoing)?.run()
}
