//! Channel set coupling two player connections into one match

use duel_battle::{Message, Outbox, Pair, Seat};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};
use uuid::Uuid;

/// Inbound frames buffered per player before the transport waits
const INBOUND_CAPACITY: usize = 32;

/// Something that happened on one of the two connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobbyEvent {
    /// A raw text frame from a player
    Message(Seat, String),
    /// The player's connection is gone
    Disconnected(Seat),
}

/// One-shot disconnect signal that can be awaited more than once
#[derive(Debug)]
struct Disconnect {
    rx: oneshot::Receiver<()>,
    fired: bool,
}

impl Disconnect {
    /// Resolves when the transport signals or drops its sender
    async fn wait(&mut self) {
        if self.fired {
            return;
        }
        let _ = (&mut self.rx).await;
        self.fired = true;
    }
}

/// Session side of one seat
#[derive(Debug)]
struct TrainerLink {
    username: String,
    inbound: mpsc::Receiver<String>,
    outbox: Outbox,
    disconnect: Disconnect,
}

impl TrainerLink {
    /// Discard inbound frames until the connection is gone.
    ///
    /// Keeps the transport reader from blocking on a full inbound channel
    /// before it can observe the socket closing.
    async fn drain_until_disconnect(&mut self) {
        loop {
            tokio::select! {
                _ = self.disconnect.wait() => return,
                frame = self.inbound.recv() => match frame {
                    Some(frame) => debug!(bytes = frame.len(), "Discarding frame after finish"),
                    None => return,
                },
            }
        }
    }
}

/// Transport side of one seat
///
/// The transport forwards text frames into `inbound`, writes everything from
/// `outbound` to the socket, fires `disconnect` when the connection ends, and
/// closes the socket once `shutdown` turns true.
#[derive(Debug)]
pub struct TrainerEndpoint {
    pub seat: Seat,
    pub inbound: mpsc::Sender<String>,
    pub outbound: mpsc::UnboundedReceiver<String>,
    pub disconnect: oneshot::Sender<()>,
    pub shutdown: watch::Receiver<bool>,
}

/// The two connections of one match
#[derive(Debug)]
pub struct Lobby {
    pub id: Uuid,
    pub started: bool,
    pub finished: bool,
    links: Pair<TrainerLink>,
    shutdown: watch::Sender<bool>,
    closed: bool,
}

impl Lobby {
    /// Create a lobby for two trainers, returning the transport endpoints
    pub fn open(usernames: Pair<String>) -> (Self, Pair<TrainerEndpoint>) {
        let (shutdown, _) = watch::channel(false);

        let Pair { home, away } = usernames.map(|seat, username| {
            let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);
            let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
            let (disconnect_tx, disconnect_rx) = oneshot::channel();

            let link = TrainerLink {
                username,
                inbound: inbound_rx,
                outbox: Outbox::new(outbound_tx),
                disconnect: Disconnect {
                    rx: disconnect_rx,
                    fired: false,
                },
            };
            let endpoint = TrainerEndpoint {
                seat,
                inbound: inbound_tx,
                outbound: outbound_rx,
                disconnect: disconnect_tx,
                shutdown: shutdown.subscribe(),
            };
            (link, endpoint)
        });

        let lobby = Self {
            id: Uuid::new_v4(),
            started: false,
            finished: false,
            links: Pair::new(home.0, away.0),
            shutdown,
            closed: false,
        };

        (lobby, Pair::new(home.1, away.1))
    }

    pub fn username(&self, seat: Seat) -> &str {
        &self.links[seat].username
    }

    pub fn outbox(&self, seat: Seat) -> &Outbox {
        &self.links[seat].outbox
    }

    /// Send the same envelope to both players
    pub fn broadcast(&self, message: &Message) {
        for (_, link) in self.links.iter() {
            link.outbox.send(message);
        }
    }

    /// Wait for the next frame or disconnect from either player.
    ///
    /// No seat is preferred when both have something ready. A closed inbound
    /// channel is reported as a disconnect of that seat.
    pub async fn next_event(&mut self) -> LobbyEvent {
        let Pair { home, away } = &mut self.links;

        tokio::select! {
            frame = home.inbound.recv() => match frame {
                Some(frame) => LobbyEvent::Message(Seat::Home, frame),
                None => LobbyEvent::Disconnected(Seat::Home),
            },
            frame = away.inbound.recv() => match frame {
                Some(frame) => LobbyEvent::Message(Seat::Away, frame),
                None => LobbyEvent::Disconnected(Seat::Away),
            },
            _ = home.disconnect.wait() => LobbyEvent::Disconnected(Seat::Home),
            _ = away.disconnect.wait() => LobbyEvent::Disconnected(Seat::Away),
        }
    }

    /// Wait until both connections have closed, discarding anything they send
    pub async fn wait_disconnects(&mut self) {
        let Pair { home, away } = &mut self.links;
        tokio::join!(home.drain_until_disconnect(), away.drain_until_disconnect());
    }

    /// Release the lobby's channels and tell the transport to close sockets.
    ///
    /// Returns false if the lobby was already closed.
    pub fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;

        for seat in Seat::BOTH {
            self.links[seat].inbound.close();
        }
        self.shutdown.send_replace(true);

        info!(
            lobby = %self.id,
            home = %self.username(Seat::Home),
            away = %self.username(Seat::Away),
            "Closed lobby"
        );
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_battle::MessageKind;
    use duel_protocol::parse_message;
    use std::time::Duration;

    fn open() -> (Lobby, Pair<TrainerEndpoint>) {
        Lobby::open(Pair::new("ash".to_string(), "gary".to_string()))
    }

    #[tokio::test]
    async fn test_open() {
        let (lobby, endpoints) = open();
        assert_eq!(lobby.username(Seat::Home), "ash");
        assert_eq!(lobby.username(Seat::Away), "gary");
        assert_eq!(endpoints.home.seat, Seat::Home);
        assert_eq!(endpoints.away.seat, Seat::Away);
        assert!(!lobby.started);
        assert!(!lobby.is_closed());
    }

    #[tokio::test]
    async fn test_next_event_message() {
        let (mut lobby, endpoints) = open();

        endpoints.away.inbound.send("hello".to_string()).await.unwrap();

        assert_eq!(
            lobby.next_event().await,
            LobbyEvent::Message(Seat::Away, "hello".to_string())
        );
    }

    #[tokio::test]
    async fn test_next_event_disconnect() {
        let (mut lobby, endpoints) = open();

        endpoints.home.disconnect.send(()).unwrap();

        assert_eq!(lobby.next_event().await, LobbyEvent::Disconnected(Seat::Home));
    }

    #[tokio::test]
    async fn test_dropped_endpoint_is_disconnect() {
        let (mut lobby, endpoints) = open();
        let Pair { home, away: _away } = endpoints;

        drop(home);

        assert_eq!(lobby.next_event().await, LobbyEvent::Disconnected(Seat::Home));
    }

    #[tokio::test]
    async fn test_broadcast() {
        let (lobby, mut endpoints) = open();

        lobby.broadcast(&Message::bare(MessageKind::Start));

        for endpoint in [&mut endpoints.home, &mut endpoints.away] {
            let frame = endpoint.outbound.recv().await.unwrap();
            assert_eq!(parse_message(&frame).unwrap().kind, MessageKind::Start);
        }
    }

    #[tokio::test]
    async fn test_wait_disconnects() {
        let (mut lobby, endpoints) = open();

        endpoints.home.disconnect.send(()).unwrap();
        endpoints.away.disconnect.send(()).unwrap();

        lobby.wait_disconnects().await;
    }

    #[tokio::test]
    async fn test_wait_disconnects_discards_backlog() {
        let (mut lobby, endpoints) = open();
        let Pair { home, away } = endpoints;

        // More frames than the inbound buffer holds, then the disconnect
        let writer = tokio::spawn(async move {
            for i in 0..INBOUND_CAPACITY * 2 {
                home.inbound.send(format!("frame {}", i)).await.unwrap();
            }
            home.disconnect.send(()).unwrap();
        });
        away.disconnect.send(()).unwrap();

        tokio::time::timeout(Duration::from_secs(5), lobby.wait_disconnects())
            .await
            .unwrap();
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_close_once() {
        let (mut lobby, endpoints) = open();
        let shutdown = endpoints.home.shutdown.clone();

        assert!(lobby.close());
        assert!(!lobby.close());
        assert!(lobby.is_closed());
        assert!(*shutdown.borrow());
        assert!(endpoints.away.inbound.is_closed());
    }
}
