//! Binary framing for [`PeerEnvelope`]s.
//!
//! Wire format:
//! ```text
//! [magic:2][version:1][reserved:1][payload_len:4][payload:N]
//! ```
//! Total header size: 8 bytes. All multi-byte integers are big-endian.
//! The payload is the `bincode` encoding of the envelope.

use thiserror::Error;

use crate::protocol::messages::{
    PeerEnvelope, FRAME_MAGIC, HEADER_SIZE, MAX_PAYLOAD_SIZE, PROTOCOL_VERSION,
};

/// Errors that can occur during frame encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the header or the declared payload.
    #[error("truncated frame: need {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },

    /// The frame does not start with the expected magic number.
    #[error("bad frame magic: 0x{0:04X}")]
    BadMagic(u16),

    /// The protocol version in the header is not supported.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// The payload exceeds [`MAX_PAYLOAD_SIZE`].
    #[error("payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    /// The payload could not be (de)serialised.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes `envelope` into a complete frame.
///
/// # Errors
///
/// Returns [`ProtocolError::Malformed`] if serialisation fails and
/// [`ProtocolError::PayloadTooLarge`] if the payload would not be accepted by
/// [`decode_envelope`].
///
/// # Examples
///
/// ```rust
/// use kvm_core::protocol::{decode_envelope, encode_envelope, PeerCall, PeerEnvelope};
///
/// let envelope = PeerEnvelope::new("alpha".into(), PeerCall::AssumeControl);
/// let bytes = encode_envelope(&envelope).unwrap();
/// let (decoded, n) = decode_envelope(&bytes).unwrap();
/// assert_eq!(decoded, envelope);
/// assert_eq!(n, bytes.len());
/// ```
pub fn encode_envelope(envelope: &PeerEnvelope) -> Result<Vec<u8>, ProtocolError> {
    let payload =
        bincode::serialize(envelope).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(ProtocolError::PayloadTooLarge(payload.len()));
    }

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(&FRAME_MAGIC.to_be_bytes());
    buf.push(PROTOCOL_VERSION);
    buf.push(0x00); // reserved
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Decodes one envelope from the beginning of `bytes`.
///
/// Returns the envelope and the number of bytes consumed, so the caller can
/// advance a read cursor over a stream of frames.
///
/// # Errors
///
/// Returns [`ProtocolError`] if the frame is incomplete or malformed.
pub fn decode_envelope(bytes: &[u8]) -> Result<(PeerEnvelope, usize), ProtocolError> {
    if bytes.len() < HEADER_SIZE {
        return Err(ProtocolError::Truncated {
            needed: HEADER_SIZE,
            available: bytes.len(),
        });
    }

    let magic = u16::from_be_bytes([bytes[0], bytes[1]]);
    if magic != FRAME_MAGIC {
        return Err(ProtocolError::BadMagic(magic));
    }

    let version = bytes[2];
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::UnsupportedVersion(version));
    }

    // bytes[3] is reserved – ignored on decode

    let payload_len = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(ProtocolError::PayloadTooLarge(payload_len));
    }

    let total_needed = HEADER_SIZE + payload_len;
    if bytes.len() < total_needed {
        return Err(ProtocolError::Truncated {
            needed: total_needed,
            available: bytes.len(),
        });
    }

    let envelope = bincode::deserialize(&bytes[HEADER_SIZE..total_needed])
        .map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    Ok((envelope, total_needed))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::{Point, Rectangle};
    use crate::protocol::messages::{KeyCode, MouseButton, PeerCall, WheelDirection};

    fn envelope(call: PeerCall) -> PeerEnvelope {
        PeerEnvelope::new("Alpha".into(), call)
    }

    fn round_trip(call: PeerCall) {
        let original = envelope(call);
        let bytes = encode_envelope(&original).expect("encode must succeed");
        let (decoded, consumed) = decode_envelope(&bytes).expect("decode must succeed");
        assert_eq!(decoded, original);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode_envelope(&envelope(PeerCall::AssumeControl)).unwrap();
        assert_eq!(&bytes[0..2], &[0x4B, 0x4D]);
        assert_eq!(bytes[2], PROTOCOL_VERSION);
        assert_eq!(bytes[3], 0);
        let declared = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        assert_eq!(declared, bytes.len() - HEADER_SIZE);
    }

    #[test]
    fn test_calls_with_payload_survive_framing() {
        round_trip(PeerCall::MoveMouse(Point::new(-1280, 40)));
        round_trip(PeerCall::ReleaseMouseButton(MouseButton::X2));
        round_trip(PeerCall::Wheel {
            delta: -120,
            direction: WheelDirection::Horizontal,
        });
        round_trip(PeerCall::PressKeyboardButton(KeyCode(0x41)));
        round_trip(PeerCall::DisplaysChanged {
            displays: vec![Rectangle::new(-1280, 0, 1280, 1024), Rectangle::new(0, 0, 1920, 1080)],
            primary: Some(Rectangle::new(0, 0, 1920, 1080)),
        });
    }

    #[test]
    fn test_sender_spelling_is_preserved() {
        let bytes = encode_envelope(&envelope(PeerCall::ResignFromControl)).unwrap();
        let (decoded, _) = decode_envelope(&bytes).unwrap();
        assert_eq!(decoded.sender.as_str(), "Alpha");
    }

    #[test]
    fn test_decode_consumes_only_first_frame() {
        let mut stream = encode_envelope(&envelope(PeerCall::AssumeControl)).unwrap();
        let first_len = stream.len();
        stream.extend(encode_envelope(&envelope(PeerCall::RelinquishControl)).unwrap());

        let (first, n) = decode_envelope(&stream).unwrap();
        assert_eq!(first.call, PeerCall::AssumeControl);
        assert_eq!(n, first_len);

        let (second, _) = decode_envelope(&stream[n..]).unwrap();
        assert_eq!(second.call, PeerCall::RelinquishControl);
    }

    #[test]
    fn test_short_header_is_truncated() {
        let err = decode_envelope(&[0x4B, 0x4D, 0x01]).unwrap_err();
        assert_eq!(err, ProtocolError::Truncated { needed: HEADER_SIZE, available: 3 });
    }

    #[test]
    fn test_missing_payload_bytes_is_truncated() {
        let bytes = encode_envelope(&envelope(PeerCall::MoveMouse(Point::new(1, 2)))).unwrap();
        let cut = &bytes[..bytes.len() - 1];
        assert!(matches!(decode_envelope(cut), Err(ProtocolError::Truncated { .. })));
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let mut bytes = encode_envelope(&envelope(PeerCall::AssumeControl)).unwrap();
        bytes[0] = 0xFF;
        assert_eq!(decode_envelope(&bytes).unwrap_err(), ProtocolError::BadMagic(0xFF4D));
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let mut bytes = encode_envelope(&envelope(PeerCall::AssumeControl)).unwrap();
        bytes[2] = 0x09;
        assert_eq!(decode_envelope(&bytes).unwrap_err(), ProtocolError::UnsupportedVersion(9));
    }

    #[test]
    fn test_oversized_declared_length_is_rejected() {
        let mut bytes = vec![0x4B, 0x4D, PROTOCOL_VERSION, 0];
        bytes.extend_from_slice(&((MAX_PAYLOAD_SIZE as u32) + 1).to_be_bytes());
        assert_eq!(
            decode_envelope(&bytes).unwrap_err(),
            ProtocolError::PayloadTooLarge(MAX_PAYLOAD_SIZE + 1)
        );
    }

    #[test]
    fn test_garbage_payload_is_malformed() {
        let mut bytes = vec![0x4B, 0x4D, PROTOCOL_VERSION, 0];
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&[0xFF, 0xFF]);
        assert!(matches!(decode_envelope(&bytes), Err(ProtocolError::Malformed(_))));
    }
}
