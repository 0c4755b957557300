//! Battles server: accepts connections and runs one session per pair

use anyhow::{Context, Result};
use duel_battle::{Pair, StandardRules};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::{ServerConfig, SessionConfig};
use crate::lobby::Lobby;
use crate::session::BattleSession;
use crate::transport::{self, PendingTrainer};

/// Joined trainers waiting to be paired
const JOINED_CAPACITY: usize = 64;

/// Listen for trainers and start a battle for every two that join
pub async fn serve(config: ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!(addr = %config.bind, "Starting battles server");

    let (joined_tx, joined_rx) = mpsc::channel(JOINED_CAPACITY);
    tokio::spawn(pair_trainers(joined_rx, config.session()));

    loop {
        let (stream, addr) = listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        let joined = joined_tx.clone();

        tokio::spawn(async move {
            match transport::accept_trainer(stream).await {
                Ok(trainer) => {
                    info!(%addr, username = %trainer.entrant.status.username, "Trainer joined");
                    let _ = joined.send(trainer).await;
                }
                Err(e) => warn!(%addr, error = %e, "Rejected connection"),
            }
        });
    }
}

/// Pair trainers in the order they joined
async fn pair_trainers(mut joined: mpsc::Receiver<PendingTrainer>, config: SessionConfig) {
    while let Some(home) = joined.recv().await {
        let Some(away) = joined.recv().await else {
            break;
        };
        start_match(Pair::new(home, away), &config);
    }
}

/// Open a lobby for two trainers and run their session in the background
pub fn start_match(trainers: Pair<PendingTrainer>, config: &SessionConfig) -> Uuid {
    let Pair { home, away } = trainers;

    let usernames = Pair::new(
        home.entrant.status.username.clone(),
        away.entrant.status.username.clone(),
    );
    let (lobby, endpoints) = Lobby::open(usernames);
    let lobby_id = lobby.id;

    let session = BattleSession::new(
        lobby,
        Pair::new(home.entrant, away.entrant),
        StandardRules::new(config.cooldown),
        config.clone(),
    );

    let start = session.subscribe_start();
    transport::attach(endpoints.home, home.ws, start.clone());
    transport::attach(endpoints.away, away.ws, start);

    tokio::spawn(async move {
        match session.run().await {
            Ok(winner) => info!(lobby = %lobby_id, %winner, "Battle finished"),
            Err(e) => error!(lobby = %lobby_id, error = %e, "Battle failed"),
        }
    });

    lobby_id
}
