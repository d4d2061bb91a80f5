//! SharkPort rolling checksum
//!
//! Each byte is sign-extended and shifted left by the running total mod 24 before being added, so
//! the result depends on byte order as well as byte values.

/// Fold one byte into the running checksum.
#[must_use]
#[inline]
pub const fn rolling_checksum_step(checksum: u32, byte: u8) -> u32 {
    let value = byte as i8 as i32 as u32;
    checksum.wrapping_add(value << (checksum % 24))
}

#[must_use]
pub fn rolling_checksum(bytes: &[u8]) -> u32 {
    let mut checksum = RollingChecksum::new();
    checksum.update(bytes);
    checksum.value()
}

/// Incremental form of [`rolling_checksum`]. Feeding the header and then the payload produces
/// the same value as checksumming their concatenation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollingChecksum(u32);

impl RollingChecksum {
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.0 = bytes.iter().fold(self.0, |checksum, &byte| rolling_checksum_step(checksum, byte));
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_shifts_by_running_total() {
        assert_eq!(rolling_checksum_step(0, 0x05), 0x05);
        // 5 % 24 = 5
        assert_eq!(rolling_checksum_step(0x05, 0x01), 0x05 + (1 << 5));
        // 24 % 24 = 0
        assert_eq!(rolling_checksum_step(24, 0x03), 27);
    }

    #[test]
    fn bytes_are_sign_extended() {
        assert_eq!(rolling_checksum_step(0, 0xFF), 0xFFFF_FFFF);
        assert_eq!(rolling_checksum_step(0, 0x80), 0xFFFF_FF80);
        // 1 % 24 = 1; -1 << 1 = -2
        assert_eq!(rolling_checksum_step(1, 0xFF), 1_u32.wrapping_sub(2));
    }

    #[test]
    fn order_sensitive() {
        assert_eq!(rolling_checksum(&[0x01, 0x02]), 0x01 + (0x02 << 1));
        assert_eq!(rolling_checksum(&[0x02, 0x01]), 0x02 + (0x01 << 2));
        assert_ne!(rolling_checksum(&[0x01, 0x02]), rolling_checksum(&[0x02, 0x01]));

        let header = *b"ORDER TESTATSE\0\0\0\0\xA7\x30\x01\0\0\0\0\0\0\0";
        let mut swapped = header;
        swapped.swap(0, 5);
        assert_ne!(rolling_checksum(&header), rolling_checksum(&swapped));
    }

    #[test]
    fn incremental_matches_concatenated() {
        let header = [0x41, 0x42, 0x43, 0x00, 0x9C];
        let payload: Vec<u8> = (0..=255).collect();

        let mut incremental = RollingChecksum::new();
        incremental.update(&header);
        incremental.update(&payload);

        let concatenated: Vec<u8> = header.iter().chain(&payload).copied().collect();
        assert_eq!(incremental.value(), rolling_checksum(&concatenated));
    }
}
