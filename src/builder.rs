//! Builder for wiring and initializing an [`AllocationEngine`].

use crate::channel::AllocationChannel;
use crate::engine::{AllocationEngine, AllocationError, FailureReporter};
use crate::log::ReplicatedLog;
use crate::types::ClusterSize;

/// Fluent construction of an [`AllocationEngine`].
///
/// The replicated log and the channel are required; the failure reporter
/// defaults to the tracing-backed one and the cluster size to `Unknown`.
/// `build()` also runs the ordered init sequence.
pub struct EngineBuilder<L, C> {
    log: Option<L>,
    channel: Option<C>,
    reporter: Option<Box<dyn FailureReporter>>,
    cluster_size: ClusterSize,
}

impl<L, C> EngineBuilder<L, C>
where
    L: ReplicatedLog,
    C: AllocationChannel,
{
    pub fn new() -> Self {
        Self {
            log: None,
            channel: None,
            reporter: None,
            cluster_size: ClusterSize::default(),
        }
    }

    /// Sets the replicated log (required).
    pub fn with_log(mut self, log: L) -> Self {
        self.log = Some(log);
        self
    }

    /// Sets the request/response channel (required).
    pub fn with_channel(mut self, channel: C) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Injects a failure sink other than the default tracing one.
    pub fn with_failure_reporter(mut self, reporter: Box<dyn FailureReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Sets the expected cluster size passed to log initialization.
    pub fn cluster_size(mut self, cluster_size: ClusterSize) -> Self {
        self.cluster_size = cluster_size;
        self
    }

    /// Builds the engine and runs the init sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or if either init
    /// step fails; no partially initialized engine is returned.
    pub fn build(self) -> Result<AllocationEngine<L, C>, AllocationError> {
        let log = self
            .log
            .ok_or_else(|| AllocationError::Log("replicated log is required".to_string()))?;
        let channel = self
            .channel
            .ok_or_else(|| AllocationError::Channel("allocation channel is required".to_string()))?;

        let mut engine = match self.reporter {
            Some(reporter) => AllocationEngine::with_reporter(log, channel, reporter),
            None => AllocationEngine::new(log, channel),
        };
        engine.init(self.cluster_size)?;

        Ok(engine)
    }
}

impl<L, C> Default for EngineBuilder<L, C>
where
    L: ReplicatedLog,
    C: AllocationChannel,
{
    fn default() -> Self {
        Self::new()
    }
}
