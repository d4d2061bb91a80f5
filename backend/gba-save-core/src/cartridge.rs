//! GBA cartridge header fields used to identify which game a save belongs to

use gba_save_config::GbaSaveType;
use thiserror::Error;

const HEADER_END: usize = 0xC0;
const TITLE_ADDR: usize = 0xA0;
const TITLE_LEN: usize = 12;
const GAME_CODE_ADDR: usize = 0xAC;
const MAKER_CODE_ADDR: usize = 0xB0;
const COMPLEMENT_CHECK_ADDR: usize = 0xBD;

pub const IDENTITY_TITLE_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("ROM is too short to contain a header; expected at least {expected} bytes, was {actual} bytes")]
    RomTooShort { expected: usize, actual: usize },
}

/// Identity fields of the currently loaded cartridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartridgeIdentity {
    /// 12-byte game title immediately followed by the 4-byte game code
    pub title: [u8; IDENTITY_TITLE_LEN],
    /// Header complement check byte
    pub checksum: u8,
    /// First byte of the 2-byte maker code
    pub maker: u8,
}

impl CartridgeIdentity {
    /// Read identity fields from the ROM header.
    ///
    /// # Errors
    ///
    /// Returns an error if the ROM is too short to contain a complete header.
    pub fn from_rom(rom: &[u8]) -> Result<Self, CartridgeError> {
        if rom.len() < HEADER_END {
            return Err(CartridgeError::RomTooShort { expected: HEADER_END, actual: rom.len() });
        }

        let mut title = [0; IDENTITY_TITLE_LEN];
        title.copy_from_slice(&rom[TITLE_ADDR..TITLE_ADDR + IDENTITY_TITLE_LEN]);

        let identity = Self {
            title,
            checksum: rom[COMPLEMENT_CHECK_ADDR],
            maker: rom[MAKER_CODE_ADDR],
        };

        log::debug!(
            "Cartridge title '{}', game code '{}', checksum {:02X}, maker {:02X}",
            identity.title_lossy(),
            String::from_utf8_lossy(identity.game_code()),
            identity.checksum,
            identity.maker
        );

        Ok(identity)
    }

    /// The 12-byte game title without the game code
    #[must_use]
    pub fn short_title(&self) -> &[u8] {
        &self.title[..TITLE_LEN]
    }

    #[must_use]
    pub fn game_code(&self) -> &[u8] {
        &self.title[GAME_CODE_ADDR - TITLE_ADDR..]
    }

    #[must_use]
    pub fn title_lossy(&self) -> String {
        let title = self.short_title();
        let end = title.iter().position(|&b| b == 0).unwrap_or(title.len());
        String::from_utf8_lossy(&title[..end]).into_owned()
    }
}

// Save library identifiers that the official SDK links into ROMs
const SAVE_TYPE_IDS: &[(&[u8], GbaSaveType)] = &[
    (b"EEPROM_V", GbaSaveType::Eeprom8K),
    (b"SRAM_V", GbaSaveType::Sram),
    (b"FLASH1M_V", GbaSaveType::Flash128K),
    (b"FLASH512_V", GbaSaveType::Flash64K),
    (b"FLASH_V", GbaSaveType::Flash64K),
];

/// Guess the save memory type by searching the ROM for a save library identifier.
///
/// EEPROM size cannot be determined this way, so EEPROM games are always reported as 8KB.
#[must_use]
pub fn detect_save_type(rom: &[u8]) -> GbaSaveType {
    for &(id, save_type) in SAVE_TYPE_IDS {
        if rom.windows(id.len()).any(|window| window == id) {
            log::info!("Detected save type {save_type} from ROM identifier '{}'", id.escape_ascii());
            return save_type;
        }
    }

    log::info!("No save library identifier found in ROM; assuming no save memory");
    GbaSaveType::None
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn new_rom(title: &[u8; 12], game_code: &[u8; 4], maker: &[u8; 2]) -> Vec<u8> {
        let mut rom = vec![0; 0x200];
        rom[TITLE_ADDR..TITLE_ADDR + 12].copy_from_slice(title);
        rom[GAME_CODE_ADDR..GAME_CODE_ADDR + 4].copy_from_slice(game_code);
        rom[MAKER_CODE_ADDR..MAKER_CODE_ADDR + 2].copy_from_slice(maker);
        rom[COMPLEMENT_CHECK_ADDR] = 0xA7;
        rom
    }

    #[test]
    fn reads_header_fields() {
        let rom = new_rom(b"POKEMON EMER", b"BPEE", b"01");
        let identity = CartridgeIdentity::from_rom(&rom).unwrap();

        assert_eq!(&identity.title, b"POKEMON EMERBPEE");
        assert_eq!(identity.short_title(), b"POKEMON EMER");
        assert_eq!(identity.game_code(), b"BPEE");
        assert_eq!(identity.maker, b'0');
        assert_eq!(identity.checksum, 0xA7);
        assert_eq!(identity.title_lossy(), "POKEMON EMER");
    }

    #[test]
    fn short_rom() {
        assert!(matches!(
            CartridgeIdentity::from_rom(&[0; 0xBF]),
            Err(CartridgeError::RomTooShort { expected: 0xC0, actual: 0xBF })
        ));
    }

    #[test]
    fn detects_save_library() {
        let mut rom = new_rom(b"TEST\0\0\0\0\0\0\0\0", b"ATSE", b"01");
        assert_eq!(detect_save_type(&rom), GbaSaveType::None);

        rom.extend_from_slice(b"\0\0FLASH1M_V103\0\0");
        assert_eq!(detect_save_type(&rom), GbaSaveType::Flash128K);

        let mut rom = new_rom(b"TEST\0\0\0\0\0\0\0\0", b"ATSE", b"01");
        rom.extend_from_slice(b"FLASH512_V131");
        assert_eq!(detect_save_type(&rom), GbaSaveType::Flash64K);

        let mut rom = new_rom(b"TEST\0\0\0\0\0\0\0\0", b"ATSE", b"01");
        rom.extend_from_slice(b"EEPROM_V124");
        assert_eq!(detect_save_type(&rom), GbaSaveType::Eeprom8K);
    }
}
