//! Wake-up signalling for blocking reads.
//!
//! Each namespace that supports blocking reads owns one [`ChangeSignal`].
//! Producers broadcast after every mutation, regardless of which key changed;
//! a waiter subscribes before checking its predicate and re-checks on every
//! wake, so a broadcast landing between the check and the wait is never lost.

use tokio::sync::watch;
use tokio::time::{timeout_at, Instant};

/// Generation counter broadcast to all blocked readers of a namespace.
#[derive(Debug)]
pub struct ChangeSignal {
    generation: watch::Sender<u64>,
}

impl ChangeSignal {
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);

        Self { generation }
    }

    /// Snapshots the current generation. Subscribe before checking the
    /// predicate; `wait` then resolves for any broadcast after this point.
    pub fn subscribe(&self) -> ChangeListener {
        ChangeListener {
            generation: self.generation.subscribe(),
        }
    }

    /// Wakes every subscribed listener.
    pub fn broadcast(&self) {
        self.generation.send_modify(|generation| *generation += 1);
    }
}

impl Default for ChangeSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// A single waiter's view of a [`ChangeSignal`].
#[derive(Debug)]
pub struct ChangeListener {
    generation: watch::Receiver<u64>,
}

impl ChangeListener {
    /// Waits for the next broadcast. Returns `false` when `deadline` expires
    /// first; `None` waits forever.
    pub async fn wait(&mut self, deadline: Option<Instant>) -> bool {
        match deadline {
            None => self.generation.changed().await.is_ok(),
            Some(deadline) => matches!(
                timeout_at(deadline, self.generation.changed()).await,
                Ok(Ok(()))
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::ChangeSignal;

    #[tokio::test]
    async fn test_wait_returns_false_on_deadline() {
        let signal = ChangeSignal::new();
        let mut listener = signal.subscribe();

        let deadline = Some(Instant::now() + Duration::from_millis(20));
        assert_eq!(listener.wait(deadline).await, false);
    }

    #[tokio::test]
    async fn test_broadcast_wakes_listener() {
        let signal = ChangeSignal::new();
        let mut listener = signal.subscribe();

        signal.broadcast();

        let deadline = Some(Instant::now() + Duration::from_secs(1));
        assert_eq!(listener.wait(deadline).await, true);
    }

    #[tokio::test]
    async fn test_broadcast_between_subscribe_and_wait_is_not_lost() {
        let signal = ChangeSignal::new();
        let mut listener = signal.subscribe();

        // The broadcast lands before the waiter starts waiting; the
        // generation counter still records it.
        signal.broadcast();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(listener.wait(None).await, true);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_listener() {
        let signal = ChangeSignal::new();
        let mut first = signal.subscribe();
        let mut second = signal.subscribe();

        signal.broadcast();

        let deadline = Some(Instant::now() + Duration::from_secs(1));
        assert_eq!(first.wait(deadline).await, true);
        assert_eq!(second.wait(deadline).await, true);
    }
}
