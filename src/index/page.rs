//! Page artifact encoding
//!
//! Frames a bincode-encoded `IndexPage` with a magic/version/length/CRC header.

use crate::error::{LineError, Result};

use super::{IndexPage, HEADER_SIZE, MAGIC, VERSION};

/// Encode a page to its on-disk representation
pub fn encode_page(page: &IndexPage) -> Result<Vec<u8>> {
    let body = bincode::serialize(page)?;
    let crc = crc32fast::hash(&body);

    let mut bytes = Vec::with_capacity(HEADER_SIZE + body.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&VERSION.to_le_bytes());
    bytes.extend_from_slice(&(body.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&crc.to_le_bytes());
    bytes.extend_from_slice(&body);

    Ok(bytes)
}

/// Decode and validate a page artifact
pub fn decode_page(bytes: &[u8]) -> Result<IndexPage> {
    if bytes.len() < HEADER_SIZE {
        return Err(LineError::IndexCorruption(format!(
            "Incomplete page header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    if &bytes[0..4] != MAGIC {
        return Err(LineError::IndexCorruption(format!(
            "Invalid page magic: expected LIDX, got {:?}",
            &bytes[0..4]
        )));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != VERSION {
        return Err(LineError::IndexCorruption(format!(
            "Unsupported page version: {}",
            version
        )));
    }

    let body_len = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
    let stored_crc = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

    let body = &bytes[HEADER_SIZE..];
    if body.len() != body_len {
        return Err(LineError::IndexCorruption(format!(
            "Page body length mismatch: header says {}, found {}",
            body_len,
            body.len()
        )));
    }

    let crc = crc32fast::hash(body);
    if crc != stored_crc {
        return Err(LineError::IndexCorruption(format!(
            "Page checksum mismatch: expected {:08x}, got {:08x}",
            stored_crc, crc
        )));
    }

    let page: IndexPage = bincode::deserialize(body)?;

    // Offsets within a page never go backwards
    if page.offsets.windows(2).any(|w| w[0] > w[1]) {
        return Err(LineError::IndexCorruption(format!(
            "Page {} has decreasing offsets",
            page.page_number
        )));
    }

    Ok(page)
}
