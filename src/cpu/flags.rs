//! F-register bit positions.
//!
//! Only Z and C are computed by this core. N and H are listed for the few
//! places a fixed flag pattern is assigned wholesale.

/// Zero flag (bit 7).
pub const Z: u8 = 7;
/// Add/subtract flag (bit 6). Not computed.
pub const N: u8 = 6;
/// Half-carry flag (bit 5). Not computed.
pub const H: u8 = 5;
/// Carry flag (bit 4).
pub const C: u8 = 4;
