//! Logging seam for conversion jobs.
//!
//! Jobs report through an injected [`JobLogger`] instead of reaching for a
//! global, so callers and tests decide where messages go.

/// Sink for the messages a conversion job emits.
pub trait JobLogger: Send + Sync {
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn debug(&self, message: &str);
}

/// Forwards job messages to `tracing` under the `dcm2bids_core::job` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl JobLogger for TracingLogger {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "dcm2bids_core::job", "{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "dcm2bids_core::job", "{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: "dcm2bids_core::job", "{message}");
    }
}

impl<L: JobLogger + ?Sized> JobLogger for &L {
    fn warn(&self, message: &str) {
        (**self).warn(message);
    }

    fn info(&self, message: &str) {
        (**self).info(message);
    }

    fn debug(&self, message: &str) {
        (**self).debug(message);
    }
}
