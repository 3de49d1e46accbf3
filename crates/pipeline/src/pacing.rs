//! Inter-stage pacing.
//!
//! The pipeline pauses between stages to stay under the gateway's burst
//! limits. The pause goes through [`Pacer`] so tests run without delay.

use std::time::Duration;

#[async_trait::async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, delay: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPacer;

#[async_trait::async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Never waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPacer;

#[async_trait::async_trait]
impl Pacer for NoPacer {
    async fn pause(&self, _delay: Duration) {}
}
