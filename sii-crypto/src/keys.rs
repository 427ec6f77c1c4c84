//! Hardcoded encryption keys for SCS save containers.
//!
//! The game client ships a single static AES key for every ScsC save file.
//! It has been public knowledge in the modding community for years and is
//! embedded in every save editor, so there is no key management layer here.

/// AES-256 key used by ETS2 and ATS for encrypted (`ScsC`) save files.
pub const SII_AES_KEY: [u8; 32] = [
    0x2a, 0x5f, 0xcb, 0x17, 0x91, 0xd2, 0x2f, 0xb6, 0x02, 0x45, 0xb3, 0xd8, 0x36, 0x9e, 0xd0,
    0xb2, 0xc2, 0x73, 0x71, 0x56, 0x3f, 0xbf, 0x1f, 0x3c, 0x9e, 0xdf, 0x6b, 0x11, 0x82, 0x5a,
    0x5d, 0x0a,
];
