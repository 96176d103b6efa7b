use std::time::Duration;

use async_trait::async_trait;
use log::debug;

/// Client-side pacing between successive requests to the same API.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

/// Sleep for a fixed duration, regardless of what happened before.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    pub delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> FixedDelay {
        FixedDelay { delay }
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn pause(&self) {
        debug!("pausing for {:?}", self.delay);
        tokio::time::sleep(self.delay).await;
    }
}
