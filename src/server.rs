//! Single-threaded event loop hosting the engine.
//!
//! Collaborator callbacks arrive as events on one channel and are dispatched
//! into the engine strictly sequentially, so handler invocations never
//! overlap even when the surrounding runtime is multi-threaded.

use crate::channel::{AllocationChannel, AllocationRequestHandler, LeaderCommitMonitor};
use crate::engine::AllocationEngine;
use crate::log::ReplicatedLog;
use crate::types::{AllocationEntry, NodeId, UniqueId};
use tokio::sync::{mpsc, watch};

/// An engine invocation queued by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Inbound allocation request delivered by the transport.
    Request {
        unique_id: UniqueId,
        preferred_node_id: NodeId,
    },
    /// A log entry became committed while the local node was leading.
    Committed(AllocationEntry),
}

/// Drives an [`AllocationEngine`] from an event channel.
pub struct AllocationServer<L, C> {
    engine: AllocationEngine<L, C>,
    events: mpsc::Receiver<ServerEvent>,
    shutdown: watch::Receiver<bool>,
}

impl<L, C> AllocationServer<L, C>
where
    L: ReplicatedLog,
    C: AllocationChannel,
{
    pub fn new(
        engine: AllocationEngine<L, C>,
        events: mpsc::Receiver<ServerEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            engine,
            events,
            shutdown,
        }
    }

    pub fn engine(&self) -> &AllocationEngine<L, C> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut AllocationEngine<L, C> {
        &mut self.engine
    }

    /// Runs until the event source closes or shutdown is signalled, then
    /// hands the engine back for inspection or reuse.
    pub async fn run(mut self) -> AllocationEngine<L, C> {
        tracing::info!("Starting allocation server loop");

        loop {
            tokio::select! {
                event = self.events.recv() => {
                    match event {
                        Some(ServerEvent::Request { unique_id, preferred_node_id }) => {
                            self.engine.handle_allocation_request(unique_id, preferred_node_id);
                        }
                        Some(ServerEvent::Committed(entry)) => {
                            self.engine.handle_log_commit_on_leader(entry);
                        }
                        None => {
                            tracing::info!("Event channel closed, stopping allocation server");
                            break;
                        }
                    }
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        tracing::info!("Shutdown requested, stopping allocation server");
                        break;
                    }
                }
            }
        }

        self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AllocationError;
    use crate::log::InMemoryLog;

    #[derive(Debug, Default)]
    struct RecordingChannel {
        broadcasts: Vec<(UniqueId, NodeId)>,
    }

    impl AllocationChannel for RecordingChannel {
        fn init(&mut self) -> Result<(), AllocationError> {
            Ok(())
        }

        fn broadcast_result(
            &mut self,
            unique_id: UniqueId,
            node_id: NodeId,
        ) -> Result<(), AllocationError> {
            self.broadcasts.push((unique_id, node_id));
            Ok(())
        }
    }

    fn uid(tag: u8) -> UniqueId {
        UniqueId::new([tag; 16])
    }

    #[tokio::test]
    async fn test_events_dispatch_in_order() {
        let mut log = InMemoryLog::new();
        log.set_leader(true);
        let engine = AllocationEngine::new(log, RecordingChannel::default());

        let (tx, rx) = mpsc::channel(16);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let server = AllocationServer::new(engine, rx, shutdown_rx);

        tx.send(ServerEvent::Request {
            unique_id: uid(1),
            preferred_node_id: NodeId::new(5),
        })
        .await
        .unwrap();
        tx.send(ServerEvent::Committed(AllocationEntry {
            unique_id: uid(1),
            node_id: NodeId::new(5),
        }))
        .await
        .unwrap();
        drop(tx);

        let engine = server.run().await;

        // The request proposed the allocation; the commit event broadcast it.
        assert_eq!(engine.log().len(), 1);
        assert_eq!(engine.channel().broadcasts, vec![(uid(1), NodeId::new(5))]);
    }

    #[tokio::test]
    async fn test_shutdown_signal_stops_loop() {
        let engine = AllocationEngine::new(InMemoryLog::new(), RecordingChannel::default());

        let (_tx, rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let server = AllocationServer::new(engine, rx, shutdown_rx);

        shutdown_tx.send(true).unwrap();

        // Must terminate even though the event sender stays alive.
        let engine = tokio::time::timeout(std::time::Duration::from_secs(1), server.run())
            .await
            .expect("server did not honor shutdown");
        assert!(engine.log().is_empty());
    }
}
