//! GBA cartridge save memory types

use sharkport_proc_macros::{EnumAll, EnumDisplay};

pub const SRAM_LEN: usize = 32 * 1024;
pub const FLASH_64K_LEN: usize = 64 * 1024;
pub const FLASH_128K_LEN: usize = 128 * 1024;
pub const EEPROM_512_LEN: usize = 512;
pub const EEPROM_8K_LEN: usize = 8 * 1024;

/// Largest save memory of any supported type
pub const MAX_SAVE_LEN: usize = FLASH_128K_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumDisplay, EnumAll)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(sharkport_proc_macros::CustomValueEnum))]
pub enum GbaSaveType {
    /// Type has not been determined yet
    #[default]
    Autodetect,
    /// Cartridge explicitly has no save memory
    None,
    #[enum_display(name = "SRAM (32KB)")]
    Sram,
    #[enum_display(name = "Flash (64KB)")]
    Flash64K,
    #[enum_display(name = "Flash (128KB)")]
    Flash128K,
    #[enum_display(name = "EEPROM (512B)")]
    Eeprom512,
    #[enum_display(name = "EEPROM (8KB)")]
    Eeprom8K,
}

impl GbaSaveType {
    /// Save memory length in bytes. Types that cannot hold data have length 0.
    #[must_use]
    pub const fn len(self) -> usize {
        match self {
            Self::Autodetect | Self::None => 0,
            Self::Sram => SRAM_LEN,
            Self::Flash64K => FLASH_64K_LEN,
            Self::Flash128K => FLASH_128K_LEN,
            Self::Eeprom512 => EEPROM_512_LEN,
            Self::Eeprom8K => EEPROM_8K_LEN,
        }
    }

    /// Whether this is a concrete hardware type that save data can be written to.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        !matches!(self, Self::Autodetect | Self::None)
    }

    #[must_use]
    pub const fn is_eeprom(self) -> bool {
        matches!(self, Self::Eeprom512 | Self::Eeprom8K)
    }

    #[must_use]
    pub const fn is_flash(self) -> bool {
        matches!(self, Self::Flash64K | Self::Flash128K)
    }

    /// The larger type in the same chip family that should replace this type in order to hold
    /// `len` bytes, if there is one.
    ///
    /// Only 64KB flash has a larger variant that games can be moved to; every other type keeps its
    /// capacity and oversized data is truncated instead.
    #[must_use]
    pub const fn upgrade_for_len(self, len: usize) -> Option<Self> {
        match self {
            Self::Flash64K if len > FLASH_64K_LEN => Some(Self::Flash128K),
            _ => None,
        }
    }

    /// Guess the save type from the length of an existing save file.
    #[must_use]
    pub const fn from_len(len: usize) -> Option<Self> {
        match len {
            SRAM_LEN => Some(Self::Sram),
            FLASH_64K_LEN => Some(Self::Flash64K),
            FLASH_128K_LEN => Some(Self::Flash128K),
            EEPROM_512_LEN => Some(Self::Eeprom512),
            EEPROM_8K_LEN => Some(Self::Eeprom8K),
            _ => None,
        }
    }
}
