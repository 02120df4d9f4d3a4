use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Cooperative cancellation flag shared between a batch and its controller.
///
/// Cloning yields another handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and wake any pausing batch.
    pub fn cancel(&self) {
        let (flag, wake) = &*self.inner;
        if let Ok(mut cancelled) = flag.lock() {
            *cancelled = true;
        }
        wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        let (flag, _) = &*self.inner;
        flag.lock().map(|c| *c).unwrap_or(true)
    }

    /// Sleep for up to `timeout`, returning early on cancellation.
    ///
    /// Returns whether the token is cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, wake) = &*self.inner;
        let Ok(guard) = flag.lock() else {
            return true;
        };
        if timeout.is_zero() {
            return *guard;
        }
        match wake.wait_timeout_while(guard, timeout, |cancelled| !*cancelled) {
            Ok((guard, _)) => *guard,
            Err(_) => true,
        }
    }
}
