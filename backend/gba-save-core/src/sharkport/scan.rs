use crate::sharkport::{
    FORMAT_TAG, MAGIC, MalformedReason, SharkPortError, read_array, read_i32, read_u32,
};
use std::io::{Read, Seek, SeekFrom};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MetadataField {
    Title,
    Timestamp,
    Comment,
}

impl MetadataField {
    const ALL: [Self; 3] = [Self::Title, Self::Timestamp, Self::Comment];
}

fn read_field_len<R: Read>(reader: &mut R) -> Result<u32, SharkPortError> {
    let len = read_i32(reader)?;
    u32::try_from(len).map_err(|_| MalformedReason::NegativeLength(len).into())
}

/// Validate the fixed fields at the start of the stream and walk the three metadata fields.
///
/// `visit_field` is called with the stream positioned at the start of each metadata field's
/// contents and must leave the stream positioned at the end of it. Field lengths are checked
/// against the stream length before `visit_field` is called.
///
/// Returns the declared payload length, with the stream positioned right after the payload length
/// field.
pub(crate) fn scan_container<R, F>(
    reader: &mut R,
    mut visit_field: F,
) -> Result<u32, SharkPortError>
where
    R: Read + Seek,
    F: FnMut(&mut R, MetadataField, u32) -> Result<(), SharkPortError>,
{
    let stream_len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;

    let magic_len = read_i32(reader)?;
    if magic_len != MAGIC.len() as i32 {
        return Err(MalformedReason::MagicLength(magic_len).into());
    }

    let magic: [u8; MAGIC.len()] = read_array(reader)?;
    if &magic != MAGIC {
        return Err(MalformedReason::Magic.into());
    }

    let format_tag = read_u32(reader)?;
    if format_tag != FORMAT_TAG {
        return Err(MalformedReason::FormatTag(format_tag).into());
    }

    for field in MetadataField::ALL {
        let len = read_field_len(reader)?;
        let offset = reader.stream_position()?;
        if offset + u64::from(len) > stream_len {
            return Err(MalformedReason::FieldPastEnd { offset, len, stream_len }.into());
        }

        log::trace!("{field:?} field at offset {offset}, length {len}");
        visit_field(reader, field, len)?;
    }

    let payload_len = read_field_len(reader)?;
    log::debug!("SharkPort payload declared length {payload_len}");

    Ok(payload_len)
}

/// Validate the fixed fields of a SharkPort file and return the declared length of the payload
/// field, which includes the 28-byte region header.
///
/// Reads from the start of the stream regardless of its current position, and leaves the stream
/// positioned at the start of the region header. Does not read or allocate space for the payload.
///
/// # Errors
///
/// Returns an error if the magic string or format tag do not match, if any field length is
/// negative or runs past the end of the stream, or if the stream ends early.
pub fn measure_payload_size<R: Read + Seek>(reader: &mut R) -> Result<u32, SharkPortError> {
    scan_container(reader, |reader, _, len| {
        reader.seek(SeekFrom::Current(len.into()))?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn container_prefix(fields: [&[u8]; 3], payload_len: i32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&13_i32.to_le_bytes());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_TAG.to_le_bytes());
        for field in fields {
            bytes.extend_from_slice(&(field.len() as i32).to_le_bytes());
            bytes.extend_from_slice(field);
        }
        bytes.extend_from_slice(&payload_len.to_le_bytes());
        bytes
    }

    fn malformed(bytes: Vec<u8>) -> MalformedReason {
        match measure_payload_size(&mut Cursor::new(bytes)) {
            Err(SharkPortError::MalformedContainer(reason)) => reason,
            other => panic!("expected malformed container, got {other:?}"),
        }
    }

    #[test]
    fn measures_valid_prefix() {
        let bytes = container_prefix([b"POKEMON EMER", b"01/02/2003 04:05:06 PM", b""], 28 + 512);
        let mut cursor = Cursor::new(bytes);
        // Scanning always starts from the beginning
        cursor.set_position(10);

        assert_eq!(measure_payload_size(&mut cursor).unwrap(), 540);
        assert_eq!(cursor.position(), cursor.get_ref().len() as u64);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = container_prefix([b"", b"", b""], 100);
        bytes[0] = 12;
        assert_eq!(malformed(bytes), MalformedReason::MagicLength(12));

        let mut bytes = container_prefix([b"", b"", b""], 100);
        bytes[4] = b's';
        assert_eq!(malformed(bytes), MalformedReason::Magic);
    }

    #[test]
    fn rejects_bad_format_tag() {
        let mut bytes = container_prefix([b"", b"", b""], 100);
        bytes[17] = 1;
        assert_eq!(malformed(bytes), MalformedReason::FormatTag(0x000F0001));
    }

    #[test]
    fn rejects_truncated() {
        let bytes = container_prefix([b"TITLE", b"", b""], 100);
        for len in [0, 3, 10, 20, bytes.len() - 1] {
            assert_eq!(malformed(bytes[..len].to_vec()), MalformedReason::Truncated, "len {len}");
        }
    }

    #[test]
    fn rejects_field_past_end() {
        let mut bytes = container_prefix([b"", b"", b""], 100);
        // Title field claims 1000 bytes
        bytes[21..25].copy_from_slice(&1000_i32.to_le_bytes());
        assert_eq!(
            malformed(bytes.clone()),
            MalformedReason::FieldPastEnd { offset: 25, len: 1000, stream_len: bytes.len() as u64 }
        );
    }

    #[test]
    fn rejects_negative_lengths() {
        let mut bytes = container_prefix([b"", b"", b""], 100);
        bytes[21..25].copy_from_slice(&(-4_i32).to_le_bytes());
        assert_eq!(malformed(bytes), MalformedReason::NegativeLength(-4));

        let bytes = container_prefix([b"", b"", b""], -28);
        assert_eq!(malformed(bytes), MalformedReason::NegativeLength(-28));
    }
}
