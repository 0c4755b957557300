//! Re-armable cooldown deadline

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Cooldown applied after a move
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(2);

/// Format a cooldown for an ADVERSARY_DEFENDING argument (e.g. `2000ms`)
pub fn format_cooldown(duration: Duration) -> String {
    format!("{}ms", duration.as_millis())
}

/// Per-player cooldown deadline
///
/// Resetting replaces the deadline; subscribers see every change and can
/// restart their wait. An unarmed timer counts as elapsed.
#[derive(Debug)]
pub struct CooldownTimer {
    deadline: watch::Sender<Option<Instant>>,
}

impl CooldownTimer {
    pub fn new() -> Self {
        let (deadline, _) = watch::channel(None);
        Self { deadline }
    }

    /// Arm the timer to elapse `duration` from now
    pub fn reset(&self, duration: Duration) {
        self.deadline.send_replace(Some(Instant::now() + duration));
    }

    pub fn deadline(&self) -> Option<Instant> {
        *self.deadline.borrow()
    }

    pub fn is_elapsed(&self) -> bool {
        self.deadline().is_none_or(|at| at <= Instant::now())
    }

    /// Receiver for deadline changes
    pub fn subscribe(&self) -> watch::Receiver<Option<Instant>> {
        self.deadline.subscribe()
    }
}

impl Default for CooldownTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cooldown() {
        assert_eq!(format_cooldown(DEFAULT_COOLDOWN), "2000ms");
        assert_eq!(format_cooldown(Duration::from_millis(250)), "250ms");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unarmed_is_elapsed() {
        let timer = CooldownTimer::new();
        assert!(timer.deadline().is_none());
        assert!(timer.is_elapsed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_and_elapse() {
        let timer = CooldownTimer::new();
        timer.reset(Duration::from_secs(2));
        assert!(!timer.is_elapsed());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(timer.is_elapsed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_reset() {
        let timer = CooldownTimer::new();
        let mut rx = timer.subscribe();

        timer.reset(Duration::from_secs(1));
        rx.changed().await.unwrap();
        let first = rx.borrow_and_update().unwrap();

        tokio::time::advance(Duration::from_millis(500)).await;
        timer.reset(Duration::from_secs(1));
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().unwrap() > first);
    }
}
