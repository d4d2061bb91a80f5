//! SharkPort save file import and export
//!
//! A SharkPort file is a sequence of little-endian length-prefixed fields:
//!
//! | Field      | Size   | Contents                              |
//! |------------|--------|---------------------------------------|
//! | magic      | 4 + 13 | `"SharkPortSave"`                     |
//! | format tag | 4      | always `0x000F0000`                   |
//! | title      | 4 + n  | cartridge title, usually 12 bytes     |
//! | timestamp  | 4 + n  | `MM/DD/YYYY hh:mm:ss AM/PM`           |
//! | comment    | 4 + n  | usually empty                         |
//! | payload    | 4 + n  | 28-byte region header, then save data |
//! | checksum   | 4      | rolling checksum of the payload field |
//!
//! Files are read in two passes: the first pass only validates the fixed fields and measures the
//! payload so that nothing is allocated until the declared size has been bounds checked.

mod checksum;
mod export;
mod extract;
mod import;
mod info;
mod scan;


pub use checksum::{RollingChecksum, rolling_checksum, rolling_checksum_step};
pub use export::{export_sharkport, export_sharkport_at};
pub use extract::{SharkPortPayload, extract_payload};
pub use import::{import_payload, import_sharkport};
pub use info::{SharkPortInfo, read_info};
pub use scan::measure_payload_size;

use crate::cartridge::{CartridgeIdentity, IDENTITY_TITLE_LEN};
use gba_save_config::{GbaSaveType, MAX_SAVE_LEN};
use std::io;
use std::io::{Read, Write};
use thiserror::Error;

pub const MAGIC: &[u8; 13] = b"SharkPortSave";
pub const FORMAT_TAG: u32 = 0x000F0000;
pub const REGION_HEADER_LEN: usize = 0x1C;
pub const MAX_PAYLOAD_LEN: usize = MAX_SAVE_LEN;

// Without checksum verification only the first 15 bytes of the title are compared
const UNVERIFIED_HEADER_COMPARE_LEN: usize = 0x0F;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("stream ended early")]
    Truncated,
    #[error("magic length is {0}, expected 13")]
    MagicLength(i32),
    #[error("magic string does not match")]
    Magic,
    #[error("format tag is {0:08X}, expected 000F0000")]
    FormatTag(u32),
    #[error("field has negative length {0}")]
    NegativeLength(i32),
    #[error("field of length {len} at offset {offset} extends past end of {stream_len}-byte stream")]
    FieldPastEnd { offset: u64, len: u32, stream_len: u64 },
    #[error("payload size {0} is outside of the valid range")]
    PayloadSize(u32),
}

#[derive(Debug, Error)]
pub enum SharkPortError {
    #[error("Malformed SharkPort file: {0}")]
    MalformedContainer(MalformedReason),
    #[error("SharkPort checksum mismatch; file has {expected:08X}, computed {actual:08X}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    #[error("SharkPort save belongs to a different game")]
    IdentityMismatch,
    #[error("Cannot import into save type {0}; a concrete save type must be selected first")]
    UnwritableSaveType(GbaSaveType),
    #[error("Save memory is empty; nothing to export")]
    EmptySaveMemory,
    #[error("Short write while exporting SharkPort file")]
    ShortWrite,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<MalformedReason> for SharkPortError {
    fn from(value: MalformedReason) -> Self {
        Self::MalformedContainer(value)
    }
}

/// Error from an operation that also writes through to the save memory's backing store.
#[derive(Debug, Error)]
pub enum ImportError<SErr> {
    #[error(transparent)]
    SharkPort(#[from] SharkPortError),
    #[error("Error persisting imported save data: {0}")]
    SaveWrite(SErr),
}

/// The 28-byte block preceding the save data, derived from the cartridge header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionHeader(pub [u8; REGION_HEADER_LEN]);

impl RegionHeader {
    #[must_use]
    pub fn for_cartridge(identity: &CartridgeIdentity) -> Self {
        let mut header = [0; REGION_HEADER_LEN];
        header[..IDENTITY_TITLE_LEN].copy_from_slice(&identity.title);
        header[0x12] = identity.checksum;
        header[0x13] = identity.maker;
        header[0x14] = 1;
        Self(header)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; REGION_HEADER_LEN] {
        &self.0
    }

    /// Whether this header identifies the same cartridge as `other`. A strict comparison checks
    /// every byte; a loose comparison only checks the first 15 bytes of the title.
    #[must_use]
    pub fn matches(&self, other: &Self, strict: bool) -> bool {
        let len = if strict { REGION_HEADER_LEN } else { UNVERIFIED_HEADER_COMPARE_LEN };
        self.0[..len] == other.0[..len]
    }
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), SharkPortError> {
    reader.read_exact(buf).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => MalformedReason::Truncated.into(),
        _ => SharkPortError::Io(err),
    })
}

fn read_array<const N: usize, R: Read>(reader: &mut R) -> Result<[u8; N], SharkPortError> {
    let mut buf = [0; N];
    read_exact(reader, &mut buf)?;
    Ok(buf)
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, SharkPortError> {
    read_array(reader).map(u32::from_le_bytes)
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32, SharkPortError> {
    read_array(reader).map(i32::from_le_bytes)
}

fn write_all<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<(), SharkPortError> {
    writer.write_all(bytes).map_err(|err| match err.kind() {
        io::ErrorKind::WriteZero => SharkPortError::ShortWrite,
        _ => SharkPortError::Io(err),
    })
}

fn write_u32<W: Write>(writer: &mut W, value: u32) -> Result<(), SharkPortError> {
    write_all(writer, &value.to_le_bytes())
}

/// Reorder EEPROM save data between the emulator's storage order and the order SharkPort files
/// use. Each 8-byte block is reversed, which swaps the block's two big-endian words and stores
/// them little-endian. The transform is its own inverse.
fn reorder_eeprom_blocks(dest: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dest.len() % 8, 0);

    for (i, byte) in dest.iter_mut().enumerate() {
        *byte = src[i ^ 7];
    }
}
