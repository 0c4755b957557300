//! Websocket transport for player connections

use anyhow::{Context, Result, bail};
use duel_battle::{Item, Pokemon, Seat, TrainerBattleStatus};
use duel_protocol::{Message as Envelope, MessageKind, parse_message};
use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{WebSocketStream, accept_async, tungstenite::Message};
use tracing::{debug, warn};

use crate::lobby::TrainerEndpoint;
use crate::session::Entrant;

pub type WsStream = WebSocketStream<TcpStream>;

/// A connection that completed the JOIN handshake
pub struct PendingTrainer {
    pub ws: WsStream,
    pub entrant: Entrant,
}

/// Upgrade a TCP connection and read its JOIN frame
pub async fn accept_trainer(stream: TcpStream) -> Result<PendingTrainer> {
    let mut ws = accept_async(stream)
        .await
        .context("WebSocket handshake failed")?;

    let frame = loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => break text,
            Some(Ok(Message::Close(_))) | None => bail!("Connection closed before JOIN"),
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e).context("WebSocket error"),
        }
    };

    let envelope = parse_message(&frame).context("Failed to parse JOIN message")?;
    let entrant = parse_join(&envelope)?;

    Ok(PendingTrainer { ws, entrant })
}

/// JOIN [username, auth token, team json, items json]
pub fn parse_join(message: &Envelope) -> Result<Entrant> {
    if message.kind != MessageKind::Join {
        bail!("Expected JOIN, got {}", message.kind);
    }

    let [username, auth_token, team, items] = message.args.as_slice() else {
        bail!("JOIN needs 4 arguments, got {}", message.args.len());
    };

    if username.is_empty() {
        bail!("JOIN username cannot be empty");
    }

    let pokemons: Vec<Pokemon> = serde_json::from_str(team).context("Invalid team payload")?;
    if pokemons.is_empty() {
        bail!("Team of {} is empty", username);
    }
    if let Some(pokemon) = pokemons.iter().find(|p| !p.has_valid_stats()) {
        bail!("Pokemon {} of {} has invalid stats", pokemon.id, username);
    }

    let items: Vec<Item> = serde_json::from_str(items).context("Invalid items payload")?;
    if let Some(item) = items.iter().find(|i| !i.effect.is_valid()) {
        bail!("Item {} of {} has an invalid effect", item.id, username);
    }

    Ok(Entrant {
        status: TrainerBattleStatus::new(username.clone(), pokemons, items),
        auth_token: auth_token.clone(),
    })
}

/// Register a connection with its lobby seat.
///
/// Spawns a writer that forwards outbound envelopes to the socket and a
/// reader that forwards text frames inbound once the match has started. The
/// reader fires the seat's disconnect signal when the connection ends.
pub fn attach(endpoint: TrainerEndpoint, ws: WsStream, start: watch::Receiver<bool>) {
    let TrainerEndpoint {
        seat,
        inbound,
        mut outbound,
        disconnect,
        shutdown,
    } = endpoint;
    let (mut sink, mut stream) = ws.split();

    let mut writer_shutdown = shutdown.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                frame = outbound.recv() => {
                    let Some(frame) = frame else { break };
                    if let Err(e) = sink.send(Message::Text(frame)).await {
                        warn!(%seat, error = %e, "Failed to send frame");
                        break;
                    }
                }
                _ = writer_shutdown.changed() => break,
            }
        }
        let _ = sink.close().await;
    });

    tokio::spawn(async move {
        forward_inbound(seat, &mut stream, inbound, start, shutdown).await;
        let _ = disconnect.send(());
        debug!(%seat, "Connection ended");
    });
}

async fn forward_inbound(
    seat: Seat,
    stream: &mut SplitStream<WsStream>,
    inbound: mpsc::Sender<String>,
    mut start: watch::Receiver<bool>,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::select! {
        started = wait_for_start(&mut start) => if !started { return },
        _ = shutdown.changed() => return,
    }

    loop {
        tokio::select! {
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    if inbound.send(text).await.is_err() {
                        return;
                    }
                }
                Some(Ok(Message::Close(_))) | None => return,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(%seat, error = %e, "WebSocket error");
                    return;
                }
            },
            _ = shutdown.changed() => return,
        }
    }
}

/// Resolves true once the start signal fires, false if it never will
async fn wait_for_start(start: &mut watch::Receiver<bool>) -> bool {
    loop {
        if *start.borrow_and_update() {
            return true;
        }
        if start.changed().await.is_err() {
            return false;
        }
    }
}
