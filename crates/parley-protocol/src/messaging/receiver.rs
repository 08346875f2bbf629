use crate::config::EnvelopeConfig;
use crate::error::ProtocolError;
use crate::messaging::cipher::{ProtocolAddress, SessionCipher};
use crate::messaging::envelope::{ChatMessage, ProcessedChatMessage, WireType};

/// Dispatch on the wire type, decrypt and decode as UTF-8.
pub async fn decrypt_message_text(
    msg: &ChatMessage,
    cipher: &dyn SessionCipher,
    sender: &ProtocolAddress,
) -> Result<String, ProtocolError> {
    let plaintext = match msg.message.wire_type()? {
        WireType::PreKey => {
            tracing::debug!(message_id = msg.id, from = %sender, "decrypting prekey message");
            cipher
                .decrypt_pre_key_message(sender, &msg.message.body)
                .await?
        }
        WireType::Whisper => {
            tracing::debug!(message_id = msg.id, from = %sender, "decrypting whisper message");
            cipher.decrypt_message(sender, &msg.message.body).await?
        }
    };

    String::from_utf8(plaintext).map_err(|e| ProtocolError::Decode(e.to_string()))
}

/// Read an inbound envelope into a displayable record.
///
/// Never fails: any error (unknown wire type, decrypt failure, bad UTF-8)
/// becomes a record flagged `failed` whose text is the configured
/// placeholder followed by the error.
pub async fn read_message(
    msg: &ChatMessage,
    cipher: &dyn SessionCipher,
    sender: &ProtocolAddress,
    config: &EnvelopeConfig,
) -> ProcessedChatMessage {
    match decrypt_message_text(msg, cipher, sender).await {
        Ok(text) => ProcessedChatMessage::for_envelope(msg, text),
        Err(e) => {
            tracing::warn!(
                message_id = msg.id,
                message_type = msg.message.message_type,
                from = %sender,
                error = %e,
                "failed to decrypt message"
            );
            let mut record = ProcessedChatMessage::for_envelope(
                msg,
                format!("{} Error: {e}", config.failure_placeholder),
            );
            record.mark_failed();
            record
        }
    }
}

/// Read a conversation's envelopes in order. One bad message yields one
/// failed record; the rest are still read.
pub async fn read_messages(
    msgs: &[ChatMessage],
    cipher: &dyn SessionCipher,
    sender: &ProtocolAddress,
    config: &EnvelopeConfig,
) -> Vec<ProcessedChatMessage> {
    let mut records = Vec::with_capacity(msgs.len());
    for msg in msgs {
        records.push(read_message(msg, cipher, sender, config).await);
    }
    records
}
