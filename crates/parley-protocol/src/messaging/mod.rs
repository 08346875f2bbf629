pub mod cipher;
pub mod envelope;
pub mod receiver;
pub mod sender;
#[cfg(test)]
pub(crate) mod test_cipher;

pub use cipher::{ProtocolAddress, SessionCipher};
pub use envelope::{ChatMessage, CiphertextMessage, ProcessedChatMessage, WireType};
pub use receiver::{read_message, read_messages};
pub use sender::{encrypt_and_build_message, BuiltMessage, MessageBody, OutgoingMessage};
