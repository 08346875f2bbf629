use rand::Rng;

use crate::chat::ChatUser;
use crate::config::EnvelopeConfig;
use crate::error::ProtocolError;
use crate::messaging::cipher::SessionCipher;
use crate::messaging::envelope::{now_millis, ChatMessage, CiphertextMessage, ProcessedChatMessage};

/// Plaintext to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Binary(Vec<u8>),
}

impl MessageBody {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes.as_slice(),
        }
    }

    /// Text kept in the local record. Binary bodies are decoded lossily.
    pub fn into_display_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Binary(bytes) => String::from_utf8(bytes)
                .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()),
        }
    }
}

impl From<&str> for MessageBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for MessageBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<u8>> for MessageBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(bytes)
    }
}

/// A message about to be encrypted.
#[derive(Debug, Clone)]
pub struct OutgoingMessage<'a> {
    pub message: MessageBody,
    pub sender: &'a ChatUser,
    pub recipient: &'a ChatUser,
    /// Flag the envelope as also carrying session-establishment data.
    pub session_init: bool,
}

/// Wire envelope and its local plaintext twin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltMessage {
    pub msg: ChatMessage,
    pub processed: ProcessedChatMessage,
}

/// Pair a ciphertext with its plaintext record under a fresh id and the
/// current time.
///
/// `session_init` lands on the envelope only; the local record never
/// carries it.
pub fn build_message(
    encrypted: CiphertextMessage,
    decrypted: String,
    recipient_address: &str,
    sender_address: &str,
    session_init: bool,
    config: &EnvelopeConfig,
) -> BuiltMessage {
    let id = rand::thread_rng().gen_range(0..config.message_id_upper_bound.max(1));
    let timestamp = now_millis();

    let msg = ChatMessage {
        id,
        to: recipient_address.to_string(),
        from: sender_address.to_string(),
        message: encrypted,
        delivered: false,
        timestamp,
        session_init: session_init.then_some(true),
    };
    let processed = ProcessedChatMessage::for_envelope(&msg, decrypted);

    BuiltMessage { msg, processed }
}

/// Encrypt `outgoing` for the recipient's device and build the envelope pair.
pub async fn encrypt_and_build_message(
    cipher: &dyn SessionCipher,
    outgoing: OutgoingMessage<'_>,
    config: &EnvelopeConfig,
) -> Result<BuiltMessage, ProtocolError> {
    let OutgoingMessage {
        message,
        sender,
        recipient,
        session_init,
    } = outgoing;

    let remote = recipient.protocol_address()?;
    let ciphertext = cipher.encrypt(&remote, message.as_bytes()).await?;

    let built = build_message(
        ciphertext,
        message.into_display_text(),
        &remote.name,
        &sender.address,
        session_init,
        config,
    );

    tracing::debug!(
        message_id = built.msg.id,
        to = %remote,
        message_type = built.msg.message.message_type,
        session_init,
        "message encrypted"
    );

    Ok(built)
}
