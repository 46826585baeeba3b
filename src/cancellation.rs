use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use signal_hook::{
    consts::{SIGINT, SIGTERM},
    flag,
};

use crate::{error::ReconcileError, prelude::*};

/// Cooperative cancellation checked at every I/O boundary.
///
/// Clones share the same flag.
#[must_use]
#[derive(Clone, Default)]
pub struct Cancellation {
    is_cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Cancellation {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Raise the flag on `SIGINT` or `SIGTERM`.
    pub fn register_signals(&self) -> Result {
        for signal in [SIGINT, SIGTERM] {
            flag::register(signal, Arc::clone(&self.is_cancelled))?;
        }
        Ok(())
    }

    pub fn cancel(&self) {
        self.is_cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.is_cancelled.load(Ordering::Relaxed)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    pub fn check(&self) -> Result<(), ReconcileError> {
        if self.is_cancelled() {
            warn!("cancellation requested");
            Err(ReconcileError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_cancelled_by_default() {
        assert!(Cancellation::default().check().is_ok());
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let cancellation = Cancellation::default();
        cancellation.clone().cancel();
        assert!(matches!(cancellation.check(), Err(ReconcileError::Cancelled)));
    }

    #[test]
    fn expired_deadline_cancels() {
        let cancellation = Cancellation::default().with_timeout(Duration::ZERO);
        assert!(cancellation.is_cancelled());
    }
}
