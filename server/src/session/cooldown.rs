//! Per-seat cooldown watcher

use duel_battle::Seat;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};

/// Report every expiry of a seat's cooldown timer to the coordinator.
///
/// Re-arming the timer restarts the wait. Each armed deadline is reported at
/// most once. Returns when the timer or the coordinator goes away; the
/// session aborts the task when combat ends.
pub(super) async fn watch_cooldown(
    seat: Seat,
    mut deadline: watch::Receiver<Option<Instant>>,
    elapsed: mpsc::Sender<Seat>,
) {
    loop {
        let armed = *deadline.borrow_and_update();

        let Some(at) = armed else {
            if deadline.changed().await.is_err() {
                return;
            }
            continue;
        };

        tokio::select! {
            _ = sleep_until(at) => {
                tracing::debug!(%seat, "Cooldown elapsed");
                if elapsed.send(seat).await.is_err() {
                    return;
                }
                if deadline.changed().await.is_err() {
                    return;
                }
            }
            changed = deadline.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}
