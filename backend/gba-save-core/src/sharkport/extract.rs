use crate::sharkport::checksum::RollingChecksum;
use crate::sharkport::{
    MAX_PAYLOAD_LEN, MalformedReason, REGION_HEADER_LEN, RegionHeader, SharkPortError,
    measure_payload_size, read_array, read_exact, read_u32,
};
use std::io::{Read, Seek};

/// Save data decoded from a SharkPort file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharkPortPayload {
    pub header: RegionHeader,
    /// Save data exactly as stored in the file, before any save type specific reordering
    pub data: Vec<u8>,
    pub stored_checksum: u32,
}

/// Read the region header, save data, and checksum from a SharkPort file.
///
/// If `verify_checksum` is set, the stored checksum must match the checksum computed over the
/// region header and save data.
///
/// # Errors
///
/// Returns an error if the file is malformed, if the declared payload does not fit within the
/// valid range (more than 0 bytes of save data, at most the largest save type), or if checksum
/// verification was requested and fails.
pub fn extract_payload<R: Read + Seek>(
    reader: &mut R,
    verify_checksum: bool,
) -> Result<SharkPortPayload, SharkPortError> {
    let declared_len = measure_payload_size(reader)?;

    let Some(data_len) = (declared_len as usize)
        .checked_sub(REGION_HEADER_LEN)
        .filter(|&len| len != 0 && len <= MAX_PAYLOAD_LEN)
    else {
        return Err(MalformedReason::PayloadSize(declared_len).into());
    };

    let header = RegionHeader(read_array(reader)?);

    let mut data = vec![0; data_len];
    read_exact(reader, &mut data)?;

    let stored_checksum = read_u32(reader)?;

    if verify_checksum {
        let mut checksum = RollingChecksum::new();
        checksum.update(header.as_bytes());
        checksum.update(&data);

        if checksum.value() != stored_checksum {
            return Err(SharkPortError::ChecksumMismatch {
                expected: stored_checksum,
                actual: checksum.value(),
            });
        }
    }

    log::debug!("Extracted {data_len} bytes of SharkPort save data");

    Ok(SharkPortPayload { header, data, stored_checksum })
}
