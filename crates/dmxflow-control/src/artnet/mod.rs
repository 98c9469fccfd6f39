//! Art-Net protocol support (Art-Net 4, ArtDMX only)
//!
//! Art-Net carries DMX512 universes in UDP datagrams on port 6454. Each
//! ArtDMX packet holds one full universe plus a sequence byte receivers use
//! to detect reordering.

pub mod packet;
pub mod sequence;

pub use packet::{decode, encode, ArtDmx, ARTNET_PORT, PACKET_LEN};
pub use sequence::SequenceCounter;
