//! Distributed dynamic node-ID allocation.
//!
//! Assigns unicast node IDs to devices on a shared broadcast bus, keyed by
//! their hardware unique IDs. A small cluster of redundant allocators agrees
//! on every assignment through a replicated allocation log; this crate
//! implements the allocation decision engine, while the replication
//! machinery and the bus transport plug in behind trait seams.

pub mod builder;
pub mod channel;
pub mod engine;
pub mod log;
pub mod metrics;
pub mod selector;
pub mod server;
pub mod types;

pub use builder::EngineBuilder;
pub use channel::{AllocationChannel, AllocationRequestHandler, LeaderCommitMonitor};
pub use engine::{AllocationEngine, AllocationError, FailureReporter, TracingFailureReporter};
pub use log::{InMemoryLog, ReplicatedLog};
pub use metrics::{AllocationMetrics, MetricsSnapshot};
pub use server::{AllocationServer, ServerEvent};
pub use types::{AllocationEntry, ClusterSize, LogEntryInfo, NodeId, UniqueId};
