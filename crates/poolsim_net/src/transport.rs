use crate::error::{Result, TransportError};
use crate::message::Packet;
use poolsim_data::{Particle, PhaseTotals};

/// Worker that roots every collective operation.
pub const ROOT_WORKER: usize = 0;

/// Point-to-point messaging between the workers of one run.
///
/// Implementations must deliver packets between any ordered pair of workers
/// in FIFO order and block in [`Transport::recv`] until a packet from that
/// specific peer is available. Everything else is derived from those two
/// primitives, which keeps all collectives deadlock-free as long as every
/// worker issues them in the same order.
pub trait Transport {
    /// Stable index of this worker in `[0, worker_count)`.
    fn worker_id(&self) -> usize;

    /// Number of workers in the run.
    fn worker_count(&self) -> usize;

    fn send(&self, to: usize, packet: Packet) -> Result<()>;

    fn recv(&self, from: usize) -> Result<Packet>;

    /// Element-wise sum of `local` across all workers, returned to everyone.
    ///
    /// Contributions are folded on [`ROOT_WORKER`] in increasing worker order
    /// and the total is broadcast back.
    fn all_reduce_sum(&self, local: &[u64]) -> Result<Vec<u64>> {
        let count = self.worker_count();
        if self.worker_id() != ROOT_WORKER {
            self.send(ROOT_WORKER, Packet::Sizes(local.to_vec()))?;
            return expect_sizes(self.recv(ROOT_WORKER)?, ROOT_WORKER, local.len());
        }

        let mut total = local.to_vec();
        for peer in (0..count).filter(|&p| p != ROOT_WORKER) {
            let part = expect_sizes(self.recv(peer)?, peer, total.len())?;
            for (acc, value) in total.iter_mut().zip(part) {
                *acc += value;
            }
        }
        for peer in (0..count).filter(|&p| p != ROOT_WORKER) {
            self.send(peer, Packet::Sizes(total.clone()))?;
        }
        Ok(total)
    }

    /// Returns once every worker has entered the barrier.
    fn barrier(&self) -> Result<()> {
        self.all_reduce_sum(&[]).map(|_| ())
    }

    /// Sends a size header followed by the particles of `region`.
    fn send_batch(&self, to: usize, region: usize, particles: Vec<Particle>) -> Result<()> {
        self.send(
            to,
            Packet::BatchHeader {
                region,
                len: particles.len(),
            },
        )?;
        self.send(to, Packet::Batch { region, particles })
    }

    /// Receives the header and payload sent by [`Transport::send_batch`].
    fn recv_batch(&self, from: usize, region: usize) -> Result<Vec<Particle>> {
        let len = match self.recv(from)? {
            Packet::BatchHeader { region: r, len } if r == region => len,
            Packet::BatchHeader { region: r, .. } => {
                return Err(TransportError::MalformedBatch {
                    peer: from,
                    detail: format!("header for region {r}, expected region {region}"),
                })
            }
            other => {
                return Err(TransportError::UnexpectedPacket {
                    peer: from,
                    expected: "BatchHeader",
                    got: other.kind(),
                })
            }
        };

        match self.recv(from)? {
            Packet::Batch { region: r, particles } if r == region && particles.len() == len => {
                Ok(particles)
            }
            Packet::Batch { region: r, particles } => Err(TransportError::MalformedBatch {
                peer: from,
                detail: format!(
                    "announced {len} particles for region {region}, got {} for region {r}",
                    particles.len()
                ),
            }),
            other => Err(TransportError::UnexpectedPacket {
                peer: from,
                expected: "Batch",
                got: other.kind(),
            }),
        }
    }

    /// Collects every worker's particles on the root, indexed by worker.
    ///
    /// Each worker tags its batch with its own id, which is also the id of
    /// the region it owns. Returns `None` on every worker except
    /// [`ROOT_WORKER`].
    fn gather_particles(&self, particles: Vec<Particle>) -> Result<Option<Vec<Vec<Particle>>>> {
        let me = self.worker_id();
        if me != ROOT_WORKER {
            self.send_batch(ROOT_WORKER, me, particles)?;
            return Ok(None);
        }

        let mut own = Some(particles);
        let mut gathered = Vec::with_capacity(self.worker_count());
        for peer in 0..self.worker_count() {
            if peer == ROOT_WORKER {
                gathered.push(own.take().unwrap_or_default());
            } else {
                gathered.push(self.recv_batch(peer, peer)?);
            }
        }
        Ok(Some(gathered))
    }

    /// Collects every worker's timings on the root, indexed by worker.
    fn gather_timings(&self, totals: PhaseTotals) -> Result<Option<Vec<PhaseTotals>>> {
        if self.worker_id() != ROOT_WORKER {
            self.send(ROOT_WORKER, Packet::Timings(totals))?;
            return Ok(None);
        }

        let mut gathered = Vec::with_capacity(self.worker_count());
        for peer in 0..self.worker_count() {
            if peer == ROOT_WORKER {
                gathered.push(totals);
                continue;
            }
            match self.recv(peer)? {
                Packet::Timings(t) => gathered.push(t),
                other => {
                    return Err(TransportError::UnexpectedPacket {
                        peer,
                        expected: "Timings",
                        got: other.kind(),
                    })
                }
            }
        }
        Ok(Some(gathered))
    }
}

fn expect_sizes(packet: Packet, peer: usize, len: usize) -> Result<Vec<u64>> {
    match packet {
        Packet::Sizes(sizes) if sizes.len() == len => Ok(sizes),
        Packet::Sizes(sizes) => Err(TransportError::MalformedBatch {
            peer,
            detail: format!("size vector of length {}, expected {len}", sizes.len()),
        }),
        other => Err(TransportError::UnexpectedPacket {
            peer,
            expected: "Sizes",
            got: other.kind(),
        }),
    }
}
