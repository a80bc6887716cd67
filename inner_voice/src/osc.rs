//! OSC output over UDP.
//!
//! Single-float messages, one datagram each, fire-and-forget — the receiving
//! patch (Max/MSP, Ableton via a bridge) treats every value as the freshest
//! reading.

use anyhow::Result;
use rosc::{encoder, OscMessage, OscPacket, OscType};
use std::net::UdpSocket;

/// Default OSC target.
pub const OSC_DEFAULT_ADDR: &str = "127.0.0.1:7400";

/// Build a single-float OSC message for the given address path.
pub fn build_float_message(addr: &str, value: f32) -> OscMessage {
    OscMessage {
        addr: addr.to_string(),
        args: vec![OscType::Float(value)],
    }
}

/// Encode an OSC message into wire bytes.
pub fn encode_message(msg: &OscMessage) -> Result<Vec<u8>> {
    let packet = OscPacket::Message(msg.clone());
    let encoded = encoder::encode(&packet)?;
    Ok(encoded)
}

/// UDP OSC client bound to an ephemeral local port.
pub struct OscSender {
    socket: UdpSocket,
    target_addr: String,
}

impl OscSender {
    pub fn new(target_addr: &str) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        Ok(Self {
            socket,
            target_addr: target_addr.to_string(),
        })
    }

    pub fn target(&self) -> &str {
        &self.target_addr
    }

    /// Send one float to the given address path.
    pub fn send_float(&self, addr: &str, value: f32) -> Result<()> {
        let msg = build_float_message(addr, value);
        let data = encode_message(&msg)?;
        self.socket.send_to(&data, &self.target_addr)?;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_message_address() {
        let msg = build_float_message("/line/", 123.4);
        assert_eq!(msg.addr, "/line/");
    }

    #[test]
    fn float_message_single_arg() {
        let msg = build_float_message("/distances/", 42.5);
        assert_eq!(msg.args.len(), 1);
        assert_eq!(msg.args[0], OscType::Float(42.5));
    }

    #[test]
    fn encode_produces_padded_packet() {
        let msg = build_float_message("/distances/", 0.0);
        let encoded = encode_message(&msg).unwrap();
        assert!(!encoded.is_empty());
        // OSC packets are 4-byte aligned.
        assert_eq!(encoded.len() % 4, 0);
    }

    #[test]
    fn sender_binds_ephemeral_port() {
        let sender = OscSender::new(OSC_DEFAULT_ADDR).unwrap();
        assert_eq!(sender.target(), "127.0.0.1:7400");
        // Loopback send must not error even with nothing listening (UDP).
        sender.send_float("/line/", 1.0).unwrap();
    }
}
