//! ArtDMX (OpDmx) packet layout
//!
//! ```text
//! offset  size  field
//!      0     8  "Art-Net\0"
//!      8     2  OpCode 0x5000, low byte first
//!     10     2  ProtVer 14, high byte first
//!     12     1  Sequence
//!     13     1  Physical
//!     14     1  SubUni
//!     15     1  Net
//!     16     2  Length, high byte first
//!     18   512  Data
//! ```

use dmxflow_core::{PortAddress, CHANNELS_PER_UNIVERSE};

/// Packet ID
pub const ARTNET_ID: &[u8; 8] = b"Art-Net\0";

/// Default Art-Net UDP port
pub const ARTNET_PORT: u16 = 6454;

/// OpDmx opcode
pub const OP_DMX: u16 = 0x5000;

/// Protocol revision written into every packet
pub const PROTOCOL_VERSION: u16 = 14;

/// Size of the ArtDMX header
pub const HEADER_LEN: usize = 18;

/// Size of an encoded full-universe ArtDMX packet
pub const PACKET_LEN: usize = HEADER_LEN + CHANNELS_PER_UNIVERSE;

/// Build an ArtDMX packet for a full universe.
pub fn encode(
    address: PortAddress,
    sequence: u8,
    physical: u8,
    channels: &[u8; CHANNELS_PER_UNIVERSE],
) -> [u8; PACKET_LEN] {
    let mut packet = [0u8; PACKET_LEN];

    packet[0..8].copy_from_slice(ARTNET_ID);
    packet[8..10].copy_from_slice(&OP_DMX.to_le_bytes());
    packet[10..12].copy_from_slice(&PROTOCOL_VERSION.to_be_bytes());
    packet[12] = sequence;
    packet[13] = physical;
    packet[14] = address.sub_uni();
    packet[15] = address.net();
    packet[16..18].copy_from_slice(&(CHANNELS_PER_UNIVERSE as u16).to_be_bytes());
    packet[HEADER_LEN..].copy_from_slice(channels);

    packet
}

/// Fields of a received ArtDMX packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtDmx {
    /// Sequence byte, 0 when the sender does not sequence
    pub sequence: u8,
    /// Physical input port of the sender
    pub physical: u8,
    /// Universe the data belongs to
    pub address: PortAddress,
    /// Channel data, `Length` bytes
    pub channels: Vec<u8>,
}

/// Parse an ArtDMX packet. Returns `None` for anything that is not a
/// well-formed ArtDMX datagram.
pub fn decode(payload: &[u8]) -> Option<ArtDmx> {
    if payload.len() < HEADER_LEN || &payload[0..8] != ARTNET_ID {
        return None;
    }
    if u16::from_le_bytes([payload[8], payload[9]]) != OP_DMX {
        return None;
    }

    let length = u16::from_be_bytes([payload[16], payload[17]]) as usize;
    if length == 0 || length > CHANNELS_PER_UNIVERSE || payload.len() < HEADER_LEN + length {
        return None;
    }

    let flat = u16::from_le_bytes([payload[14], payload[15] & 0x7F]);
    let address = PortAddress::from_flat(flat).ok()?;

    Some(ArtDmx {
        sequence: payload[12],
        physical: payload[13],
        address,
        channels: payload[HEADER_LEN..HEADER_LEN + length].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artnet_packet_structure() {
        let packet = encode(PortAddress::default(), 0, 0, &[0u8; 512]);

        // Check header
        assert_eq!(&packet[0..8], b"Art-Net\0");

        // Check OpCode (little-endian)
        assert_eq!(packet[8], 0x00);
        assert_eq!(packet[9], 0x50);

        // Check protocol version (big-endian)
        assert_eq!(packet[10], 0);
        assert_eq!(packet[11], 14);

        // Check length (big-endian)
        assert_eq!(packet[16], 0x02);
        assert_eq!(packet[17], 0x00);

        assert_eq!(packet.len(), 18 + 512);
    }

    #[test]
    fn test_address_fields() {
        let address = PortAddress::new(1, 2, 3).unwrap();
        let packet = encode(address, 7, 2, &[0u8; 512]);
        assert_eq!(packet[12], 7);
        assert_eq!(packet[13], 2);
        assert_eq!(packet[14], 0x23);
        assert_eq!(packet[15], 0x01);
    }

    #[test]
    fn test_decode_encoded() {
        let mut channels = [0u8; 512];
        channels[0] = 255;
        channels[511] = 1;
        let address = PortAddress::new(0, 1, 4).unwrap();

        let dmx = decode(&encode(address, 42, 0, &channels)).unwrap();
        assert_eq!(dmx.sequence, 42);
        assert_eq!(dmx.address, address);
        assert_eq!(dmx.channels, channels.to_vec());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode(b"Art-Net").is_none());

        let mut packet = encode(PortAddress::default(), 1, 0, &[0u8; 512]);
        packet[8] = 0x00;
        packet[9] = 0x20; // OpPoll
        assert!(decode(&packet).is_none());

        let packet = encode(PortAddress::default(), 1, 0, &[0u8; 512]);
        assert!(decode(&packet[..100]).is_none());
    }

    #[test]
    fn test_decode_short_universe() {
        let mut packet = encode(PortAddress::default(), 1, 0, &[9u8; 512]).to_vec();
        packet[16..18].copy_from_slice(&24u16.to_be_bytes());
        packet.truncate(HEADER_LEN + 24);
        assert_eq!(decode(&packet).unwrap().channels, vec![9u8; 24]);
    }
}
