use thiserror::Error;

pub mod message;

pub use message::{
    ERR_INVALID_MESSAGE_FORMAT, ERR_INVALID_MESSAGE_TYPE, Message, MessageKind, parse_message,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid message format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Empty message")]
    EmptyMessage,
}
