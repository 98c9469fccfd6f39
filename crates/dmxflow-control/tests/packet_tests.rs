use dmxflow_control::artnet::{decode, encode, PACKET_LEN};
use dmxflow_core::PortAddress;
use proptest::prelude::*;

#[test]
fn test_fixed_packet_bytes() {
    let mut channels = [0u8; 512];
    channels[0] = 0xFF;
    channels[1] = 0x80;
    channels[511] = 0x01;

    let packet = encode(PortAddress::new(1, 2, 3).unwrap(), 0x2A, 0x00, &channels);

    let expected_header: [u8; 18] = [
        b'A', b'r', b't', b'-', b'N', b'e', b't', 0x00, // ID
        0x00, 0x50, // OpDmx, low byte first
        0x00, 0x0E, // ProtVer 14
        0x2A, // Sequence
        0x00, // Physical
        0x23, // SubUni
        0x01, // Net
        0x02, 0x00, // Length 512
    ];
    assert_eq!(packet.len(), PACKET_LEN);
    assert_eq!(&packet[..18], &expected_header);
    assert_eq!(packet[18], 0xFF);
    assert_eq!(packet[19], 0x80);
    assert_eq!(packet[529], 0x01);
}

#[test]
fn test_highest_universe() {
    let packet = encode(PortAddress::new(127, 15, 15).unwrap(), 1, 0, &[0u8; 512]);
    assert_eq!(packet[14], 0xFF);
    assert_eq!(packet[15], 0x7F);
}

#[test]
fn test_encode_is_deterministic() {
    let channels = [7u8; 512];
    let address = PortAddress::from_flat(300).unwrap();
    assert_eq!(encode(address, 9, 1, &channels), encode(address, 9, 1, &channels));
}

proptest! {
    #[test]
    fn prop_single_channel_changes_single_byte(
        offset in 0usize..512,
        value in 1u8..=255,
        sequence in any::<u8>(),
    ) {
        let address = PortAddress::new(0, 0, 1).unwrap();
        let base = [0u8; 512];
        let mut changed = base;
        changed[offset] = value;

        let a = encode(address, sequence, 0, &base);
        let b = encode(address, sequence, 0, &changed);

        let differing: Vec<usize> = (0..PACKET_LEN).filter(|&i| a[i] != b[i]).collect();
        prop_assert_eq!(differing, vec![18 + offset]);
        prop_assert_eq!(b[18 + offset], value);
    }

    #[test]
    fn prop_decode_recovers_fields(
        flat in 0u16..=0x7FFF,
        sequence in any::<u8>(),
        physical in any::<u8>(),
        fill in any::<u8>(),
    ) {
        let address = PortAddress::from_flat(flat).unwrap();
        let dmx = decode(&encode(address, sequence, physical, &[fill; 512])).unwrap();
        prop_assert_eq!(dmx.address, address);
        prop_assert_eq!(dmx.sequence, sequence);
        prop_assert_eq!(dmx.physical, physical);
        prop_assert_eq!(dmx.channels.len(), 512);
    }
}
