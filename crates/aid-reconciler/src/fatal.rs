use tracing::error;

/// Terminate the agent process. Only system-critical synchronization
/// failures reach this; the orchestrator's supervisor is expected to restart
/// the agent from a clean slate.
pub(crate) fn abort_agent(reason: &str) -> ! {
    error!(reason, "system-critical synchronization failure, terminating agent");
    std::process::abort();
}
