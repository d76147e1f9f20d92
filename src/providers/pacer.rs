use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Enforces a minimum gap between consecutive calls to one provider.
///
/// The lock is held across the wait and the call itself, so calls through
/// the same pacer never overlap and the gap is measured from the end of the
/// previous call.
pub struct Pacer {
    name: String,
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(name: impl Into<String>, min_interval: Duration) -> Self {
        Self {
            name: name.into(),
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn from_millis(name: impl Into<String>, millis: u64) -> Self {
        Self::new(name, Duration::from_millis(millis))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub async fn run<F, Fut, T>(&self, call: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mut last = self.last_call.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!("Pacing {} for {:?}", self.name, wait);
                tokio::time::sleep(wait).await;
            }
        }
        let result = call().await;
        *last = Some(Instant::now());
        result
    }
}
