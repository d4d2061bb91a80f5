use crate::sharkport::checksum::RollingChecksum;
use crate::sharkport::scan::{MetadataField, scan_container};
use crate::sharkport::{RegionHeader, SharkPortError, extract_payload, read_exact};
use std::fmt::{Display, Formatter};
use std::io::{Read, Seek};

/// Read-only summary of a SharkPort file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharkPortInfo {
    pub title: String,
    pub timestamp: String,
    pub comment: String,
    pub header: RegionHeader,
    pub data_len: usize,
    pub stored_checksum: u32,
    pub computed_checksum: u32,
}

impl SharkPortInfo {
    #[must_use]
    pub fn checksum_valid(&self) -> bool {
        self.stored_checksum == self.computed_checksum
    }
}

impl Display for SharkPortInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Timestamp: {}", self.timestamp)?;
        writeln!(f, "Comment: {}", self.comment)?;
        writeln!(f, "Region header: {:02X?}", self.header.as_bytes())?;
        writeln!(f, "Save data length: {} bytes", self.data_len)?;
        write!(
            f,
            "Checksum: {:08X} (computed {:08X}, {})",
            self.stored_checksum,
            self.computed_checksum,
            if self.checksum_valid() { "valid" } else { "INVALID" }
        )
    }
}

/// Read the metadata fields and payload of a SharkPort file without verifying the checksum.
///
/// # Errors
///
/// Returns an error if the file is malformed.
pub fn read_info<R: Read + Seek>(reader: &mut R) -> Result<SharkPortInfo, SharkPortError> {
    let mut fields: [String; 3] = Default::default();
    scan_container(reader, |reader, field, len| {
        let mut bytes = vec![0; len as usize];
        read_exact(reader, &mut bytes)?;

        let idx = match field {
            MetadataField::Title => 0,
            MetadataField::Timestamp => 1,
            MetadataField::Comment => 2,
        };
        fields[idx] = String::from_utf8_lossy(&bytes).trim_end_matches('\0').to_owned();

        Ok(())
    })?;

    let payload = extract_payload(reader, false)?;

    let mut checksum = RollingChecksum::new();
    checksum.update(payload.header.as_bytes());
    checksum.update(&payload.data);

    let [title, timestamp, comment] = fields;
    Ok(SharkPortInfo {
        title,
        timestamp,
        comment,
        header: payload.header,
        data_len: payload.data.len(),
        stored_checksum: payload.stored_checksum,
        computed_checksum: checksum.value(),
    })
}
