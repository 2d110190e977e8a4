use crate::error::{Result, TransportError};
use crate::message::Packet;
use crate::transport::Transport;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

/// One worker's endpoint in a [`LocalCluster`].
///
/// Holds a dedicated FIFO channel to and from every peer, so a blocking
/// receive from one peer is never satisfied by traffic from another.
pub struct ChannelTransport {
    id: usize,
    count: usize,
    outboxes: Vec<Sender<Packet>>,
    inboxes: Vec<Receiver<Packet>>,
}

impl ChannelTransport {
    fn check_peer(&self, peer: usize) -> Result<()> {
        if peer >= self.count {
            return Err(TransportError::UnknownPeer {
                peer,
                count: self.count,
            });
        }
        Ok(())
    }
}

impl Transport for ChannelTransport {
    fn worker_id(&self) -> usize {
        self.id
    }

    fn worker_count(&self) -> usize {
        self.count
    }

    fn send(&self, to: usize, packet: Packet) -> Result<()> {
        self.check_peer(to)?;
        tracing::trace!(to, kind = packet.kind(), "send");
        self.outboxes[to]
            .send(packet)
            .map_err(|_| TransportError::Disconnected { peer: to })
    }

    fn recv(&self, from: usize) -> Result<Packet> {
        self.check_peer(from)?;
        let packet = self.inboxes[from]
            .recv()
            .map_err(|_| TransportError::Disconnected { peer: from })?;
        tracing::trace!(from, kind = packet.kind(), "recv");
        Ok(packet)
    }
}

/// Runs a fixed number of workers on OS threads inside one process.
///
/// Workers share no memory; the only way state moves between them is the
/// per-pair channel matrix built by [`LocalCluster::transports`].
#[derive(Debug, Clone, Copy)]
pub struct LocalCluster {
    workers: usize,
}

impl LocalCluster {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(TransportError::Startup(
                "a cluster needs at least one worker".to_string(),
            ));
        }
        Ok(Self { workers })
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Builds the endpoints of a fully connected cluster, indexed by worker.
    #[must_use]
    pub fn transports(&self) -> Vec<ChannelTransport> {
        let n = self.workers;
        let mut outboxes: Vec<Vec<Sender<Packet>>> = (0..n).map(|_| Vec::with_capacity(n)).collect();
        let mut inboxes: Vec<Vec<Receiver<Packet>>> = Vec::with_capacity(n);

        for _to in 0..n {
            let mut row = Vec::with_capacity(n);
            for outbox in outboxes.iter_mut() {
                let (tx, rx) = mpsc::channel();
                outbox.push(tx);
                row.push(rx);
            }
            inboxes.push(row);
        }

        outboxes
            .into_iter()
            .zip(inboxes)
            .enumerate()
            .map(|(id, (outboxes, inboxes))| ChannelTransport {
                id,
                count: n,
                outboxes,
                inboxes,
            })
            .collect()
    }

    /// Runs `worker` once per worker, each on its own thread, and returns
    /// the results in worker order once all of them have finished.
    pub fn run<F, T>(&self, worker: F) -> Result<Vec<T>>
    where
        F: Fn(ChannelTransport) -> T + Sync,
        T: Send,
    {
        let transports = self.transports();
        let worker = &worker;

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(transports.len());
            for transport in transports {
                let id = transport.id;
                let handle = thread::Builder::new()
                    .name(format!("worker-{id}"))
                    .spawn_scoped(scope, move || worker(transport))
                    .map_err(|e| TransportError::Startup(e.to_string()))?;
                handles.push((id, handle));
            }

            handles
                .into_iter()
                .map(|(id, handle)| handle.join().map_err(|_| TransportError::WorkerPanicked(id)))
                .collect()
        })
    }
}
