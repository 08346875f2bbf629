pub mod chat;
pub mod config;
pub mod error;
pub mod messaging;

pub use chat::{ChatUser, SessionMessage, SessionMessageKind};
pub use config::EnvelopeConfig;
pub use error::ProtocolError;
pub use messaging::{
    encrypt_and_build_message, read_message, ChatMessage, ProcessedChatMessage, SessionCipher,
};
