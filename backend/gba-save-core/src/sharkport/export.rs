use crate::cartridge::CartridgeIdentity;
use crate::savedata::SaveMemory;
use crate::sharkport::checksum::RollingChecksum;
use crate::sharkport::{
    FORMAT_TAG, MAGIC, REGION_HEADER_LEN, RegionHeader, SharkPortError, reorder_eeprom_blocks,
    write_all, write_u32,
};
use sharkport_common::frontend::SaveWriter;
use sharkport_common::timeutils;
use std::borrow::Cow;
use std::io::Write;
use time::OffsetDateTime;

fn write_field<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<(), SharkPortError> {
    write_u32(writer, bytes.len() as u32)?;
    write_all(writer, bytes)
}

/// Write save memory out as a SharkPort file, timestamped with the current local time.
///
/// # Errors
///
/// Returns an error if the save memory is empty or if any write fails. The writer may have
/// received a partial file in the latter case.
pub fn export_sharkport<W, S>(
    writer: &mut W,
    save: &SaveMemory<S>,
    identity: &CartridgeIdentity,
) -> Result<(), SharkPortError>
where
    W: Write,
    S: SaveWriter,
{
    export_sharkport_at(writer, save, identity, timeutils::current_local_time())
}

/// Write save memory out as a SharkPort file with the given timestamp.
///
/// # Errors
///
/// See [`export_sharkport`].
pub fn export_sharkport_at<W, S>(
    writer: &mut W,
    save: &SaveMemory<S>,
    identity: &CartridgeIdentity,
    timestamp: OffsetDateTime,
) -> Result<(), SharkPortError>
where
    W: Write,
    S: SaveWriter,
{
    if save.is_empty() {
        return Err(SharkPortError::EmptySaveMemory);
    }

    write_field(writer, MAGIC)?;
    write_u32(writer, FORMAT_TAG)?;
    write_field(writer, identity.short_title())?;
    write_field(writer, timeutils::format_12_hour_timestamp(timestamp).as_bytes())?;
    write_field(writer, &[])?;

    write_u32(writer, (REGION_HEADER_LEN + save.len()) as u32)?;

    let header = RegionHeader::for_cartridge(identity);
    write_all(writer, header.as_bytes())?;

    let data: Cow<'_, [u8]> = if save.save_type().is_eeprom() {
        let mut reordered = vec![0; save.len()];
        reorder_eeprom_blocks(&mut reordered, save.memory());
        Cow::Owned(reordered)
    } else {
        Cow::Borrowed(save.memory())
    };
    write_all(writer, &data)?;

    let mut checksum = RollingChecksum::new();
    checksum.update(header.as_bytes());
    checksum.update(&data);
    write_u32(writer, checksum.value())?;

    log::info!(
        "Exported {} bytes of {} save memory to SharkPort file",
        save.len(),
        save.save_type()
    );

    Ok(())
}
