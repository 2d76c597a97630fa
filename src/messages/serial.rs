//! Serialization and Deserialization for [Frame]
//!
//! On the wire a frame is sent as `(payload length) as u16` in big-endian, followed by the
//! bincode payload.

use crate::config;
use crate::messages::Frame;
use crate::print;


/// Serializes a `Frame` into a binary format.
///
/// Uses `bincode` for efficient serialization.
/// If serialization fails, the function logs the error and returns `None`.
///
/// ## Parameters
/// - `frame`: A reference to the `Frame` to be serialized.
///
/// ## Returns
/// - A `Vec<u8>` containing the serialized payload, without length prefix.
pub fn serialize_frame(frame: &Frame) -> Option<Vec<u8>> {
    match bincode::serialize(frame) {
        Ok(serialized_data) => Some(serialized_data),
        Err(e) => {
            print::err(format!("Serialization failed: {} (serial.rs, serialize_frame())", e));
            None
        }
    }
}

/// Deserializes a `Frame` from a binary format.
///
/// ## Parameters
/// - `data`: A byte slice (`&[u8]`) containing the payload, without length prefix.
///
/// ## Returns
/// - The `Frame`, or `None` if the payload could not be decoded. The error is logged.
pub fn deserialize_frame(data: &[u8]) -> Option<Frame> {
    match bincode::deserialize(data) {
        Ok(frame) => Some(frame),
        Err(e) => {
            print::err(format!("Deserialization failed: {} (serial.rs, deserialize_frame())", e));
            None
        }
    }
}

/// Serializes a `Frame` and puts the `u16` length prefix in front of it.
///
/// Returns `None` if serialization fails or the payload is larger than [config::MAX_FRAME_LEN].
pub fn encode_frame(frame: &Frame) -> Option<Vec<u8>> {
    let payload = serialize_frame(frame)?;
    if payload.len() > config::MAX_FRAME_LEN {
        print::err(format!("Frame too large for the wire: {} bytes", payload.len()));
        return None;
    }

    let mut buf = Vec::with_capacity(payload.len() + 2);
    buf.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    buf.extend_from_slice(&payload);
    Some(buf)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{Command, Target};
    use crate::model::DoorStatus;

    #[test]
    fn length_prefix_matches_payload() {
        let frame = Frame::Command(Command::Door { elevator: "Elevator-A".to_string(), action: DoorStatus::Open });
        let buf = encode_frame(&frame).expect("encode");
        let len = u16::from_be_bytes([buf[0], buf[1]]) as usize;
        assert_eq!(len, buf.len() - 2);
        assert_eq!(deserialize_frame(&buf[2..]), Some(frame));
    }

    #[test]
    fn register_frame_keeps_target() {
        let frame = Frame::Register(Target::Floor(4));
        let payload = serialize_frame(&frame).expect("serialize");
        match deserialize_frame(&payload) {
            Some(Frame::Register(Target::Floor(4))) => {}
            other => panic!("unexpected frame {:?}", other),
        }
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(deserialize_frame(&[0xff, 0xff, 0xff, 0xff, 0xff]), None);
    }

}
