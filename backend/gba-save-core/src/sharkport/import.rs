use crate::cartridge::CartridgeIdentity;
use crate::savedata::SaveMemory;
use crate::sharkport::{
    ImportError, RegionHeader, SharkPortError, SharkPortPayload, extract_payload,
    reorder_eeprom_blocks,
};
use gba_save_config::{EEPROM_512_LEN, EEPROM_8K_LEN};
use sharkport_common::frontend::SaveWriter;
use std::io::{Read, Seek};

/// Write decoded SharkPort save data into save memory.
///
/// The region header must match the one derived from `identity`; all 28 bytes are compared if
/// `verify_checksum` is set, otherwise only the title is. 64KB flash is upgraded to 128KB flash if
/// the payload needs it, and payloads larger than the save memory are truncated. Save memory is
/// left untouched if any check fails or if writing through to its backing store fails.
///
/// # Errors
///
/// Returns an error if the header does not match the cartridge, if the save type is not a
/// concrete hardware type, or if persisting to the backing store fails.
pub fn import_payload<S: SaveWriter>(
    save: &mut SaveMemory<S>,
    identity: &CartridgeIdentity,
    payload: SharkPortPayload,
    verify_checksum: bool,
) -> Result<(), ImportError<S::Err>> {
    let expected_header = RegionHeader::for_cartridge(identity);
    if !expected_header.matches(&payload.header, verify_checksum) {
        log::debug!(
            "Region header mismatch; expected {:02X?}, file has {:02X?}",
            expected_header.as_bytes(),
            payload.header.as_bytes()
        );
        return Err(SharkPortError::IdentityMismatch.into());
    }

    let save_type = save.save_type();
    if !save_type.is_writable() {
        return Err(SharkPortError::UnwritableSaveType(save_type).into());
    }

    let target_type = save_type.upgrade_for_len(payload.data.len()).unwrap_or(save_type);
    if target_type != save_type {
        log::info!("Upgrading save type from {save_type} to {target_type} to fit SharkPort save");
    }

    // Staged copy; the region is only replaced once the write-through succeeds
    let mut memory = save.resized_memory(target_type);

    let mut len = payload.data.len();
    if len > memory.len() {
        log::warn!(
            "SharkPort save data is {len} bytes but {target_type} save memory is only {} bytes; \
             truncating",
            memory.len()
        );
        len = memory.len();
    }

    let data = &payload.data[..len];
    if len == EEPROM_512_LEN || len == EEPROM_8K_LEN {
        reorder_eeprom_blocks(&mut memory[..len], data);
    } else {
        memory[..len].copy_from_slice(data);
    }

    save.commit(target_type, memory).map_err(ImportError::SaveWrite)?;

    if save.has_backing() {
        log::info!(
            "Imported {len} bytes of SharkPort data; persisted full {} byte {target_type} region",
            save.len()
        );
    } else {
        log::info!("Imported {len} bytes of SharkPort save data into {target_type} save memory");
    }

    Ok(())
}

/// Read a SharkPort file and import its save data into save memory. See [`import_payload`].
///
/// # Errors
///
/// Returns an error if the file cannot be decoded or if the import fails.
pub fn import_sharkport<R, S>(
    reader: &mut R,
    save: &mut SaveMemory<S>,
    identity: &CartridgeIdentity,
    verify_checksum: bool,
) -> Result<(), ImportError<S::Err>>
where
    R: Read + Seek,
    S: SaveWriter,
{
    if !verify_checksum {
        log::warn!("Importing SharkPort save without checksum verification");
    }

    let payload = extract_payload(reader, verify_checksum)?;
    import_payload(save, identity, payload, verify_checksum)
}
