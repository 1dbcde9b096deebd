//! Protocol module containing the peer call vocabulary and the binary codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_envelope, encode_envelope, ProtocolError};
pub use messages::*;
