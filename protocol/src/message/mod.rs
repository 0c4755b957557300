//! Message envelope exchanged with each player
//!
//! Every websocket text frame carries exactly one envelope encoded as a JSON
//! object: `{"kind":"ATTACK","args":[]}`.


use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Description sent in an ERROR envelope when a frame cannot be parsed
pub const ERR_INVALID_MESSAGE_FORMAT: &str = "invalid message format";

/// Description sent in an ERROR envelope when the kind is not handled
pub const ERR_INVALID_MESSAGE_TYPE: &str = "invalid message type";

/// Kind tag of an envelope
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageKind {
    /// server -> both: setup phase begins
    Start,
    /// client -> server: choose the active pokemon
    SelectPokemon,
    /// client -> server
    Attack,
    /// client -> server
    Defend,
    /// client -> server: consume an inventory item
    UseItem,
    /// server -> opponent: the adversary is defending, arg is the cooldown
    AdversaryDefending,
    /// server -> both: match concluded, arg is the winner
    Finish,
    /// server -> sender: malformed or unsupported input
    Error,
    /// server -> trainer: your own pokemon changed
    UpdatePlayerPokemon,
    /// server -> trainer: the adversary's pokemon changed
    UpdateAdversaryPokemon,
    /// server -> trainer: an item was consumed
    RemoveItem,
    /// client -> server: first frame on a connection
    Join,
    /// Any tag this crate does not know about
    Other(String),
}

impl MessageKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Start => "START",
            Self::SelectPokemon => "SELECT_POKEMON",
            Self::Attack => "ATTACK",
            Self::Defend => "DEFEND",
            Self::UseItem => "USE_ITEM",
            Self::AdversaryDefending => "ADVERSARY_DEFENDING",
            Self::Finish => "FINISH",
            Self::Error => "ERROR",
            Self::UpdatePlayerPokemon => "UPDATE_PLAYER_POKEMON",
            Self::UpdateAdversaryPokemon => "UPDATE_ADVERSARY_POKEMON",
            Self::RemoveItem => "REMOVE_ITEM",
            Self::Join => "JOIN",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for MessageKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "START" => Self::Start,
            "SELECT_POKEMON" => Self::SelectPokemon,
            "ATTACK" => Self::Attack,
            "DEFEND" => Self::Defend,
            "USE_ITEM" => Self::UseItem,
            "ADVERSARY_DEFENDING" => Self::AdversaryDefending,
            "FINISH" => Self::Finish,
            "ERROR" => Self::Error,
            "UPDATE_PLAYER_POKEMON" => Self::UpdatePlayerPokemon,
            "UPDATE_ADVERSARY_POKEMON" => Self::UpdateAdversaryPokemon,
            "REMOVE_ITEM" => Self::RemoveItem,
            "JOIN" => Self::Join,
            _ => Self::Other(tag),
        }
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A kind tag plus an ordered list of string arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Message {
    pub fn new(kind: MessageKind, args: Vec<String>) -> Self {
        Self { kind, args }
    }

    /// Envelope with no arguments
    pub fn bare(kind: MessageKind) -> Self {
        Self::new(kind, Vec::new())
    }

    /// ERROR envelope carrying a description
    pub fn error(description: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, vec![description.into()])
    }

    /// First argument, if any
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Serialize to the wire format (one JSON object)
    pub fn to_wire_format(&self) -> String {
        // Strings and a string list always serialize
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Parse a single websocket text frame into a message
pub fn parse_message(frame: &str) -> Result<Message, ParseError> {
    let frame = frame.trim();

    if frame.is_empty() {
        return Err(ParseError::EmptyMessage);
    }

    let message: Message =
        serde_json::from_str(frame).map_err(|e| ParseError::InvalidFormat(e.to_string()))?;

    if message.kind.as_str().is_empty() {
        return Err(ParseError::MissingField("kind".to_string()));
    }

    Ok(message)
}
