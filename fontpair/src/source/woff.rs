//! Unwrapping of WOFF and WOFF2 containers into sfnt data.

use std::io::Read;

use skrifa::raw::{types::Tag, FontData as RawData, ReadError};

use crate::error::FontLoadError;

const WOFF_HEADER_LEN: usize = 44;
const WOFF_TABLE_RECORD_LEN: usize = 20;
const SFNT_HEADER_LEN: usize = 12;
const SFNT_TABLE_RECORD_LEN: usize = 16;

/// An entry of the WOFF table directory.
#[derive(Clone, Debug, PartialEq)]
struct WoffTable {
    tag: Tag,
    offset: usize,
    comp_length: usize,
    orig_length: usize,
    checksum: u32,
}

impl WoffTable {
    fn read(data: RawData, index: usize) -> Result<Self, ReadError> {
        let pos = WOFF_HEADER_LEN + index * WOFF_TABLE_RECORD_LEN;
        Ok(Self {
            tag: data.read_at(pos)?,
            offset: data.read_at::<u32>(pos + 4)? as usize,
            comp_length: data.read_at::<u32>(pos + 8)? as usize,
            orig_length: data.read_at::<u32>(pos + 12)? as usize,
            checksum: data.read_at(pos + 16)?,
        })
    }

    /// Returns the uncompressed table data.
    ///
    /// Tables whose compressed length equals the original length are
    /// stored as is.
    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>, FontLoadError> {
        let stored = self
            .offset
            .checked_add(self.comp_length)
            .and_then(|end| bytes.get(self.offset..end))
            .ok_or(FontLoadError::Read(ReadError::OutOfBounds))?;
        if self.comp_length == self.orig_length {
            return Ok(stored.to_vec());
        }
        if self.comp_length > self.orig_length {
            return Err(FontLoadError::InvalidWoff(self.tag));
        }
        let mut table = Vec::with_capacity(self.orig_length);
        flate2::read::ZlibDecoder::new(stored)
            .read_to_end(&mut table)
            .map_err(|source| FontLoadError::WoffTable {
                tag: self.tag,
                source,
            })?;
        if table.len() != self.orig_length {
            return Err(FontLoadError::InvalidWoff(self.tag));
        }
        Ok(table)
    }
}

/// Decodes a WOFF 1.0 file into sfnt data.
pub(crate) fn decode_woff(bytes: &[u8]) -> Result<Vec<u8>, FontLoadError> {
    let data = RawData::new(bytes);
    let flavor: u32 = data.read_at(4).map_err(FontLoadError::Read)?;
    let num_tables: u16 = data.read_at(12).map_err(FontLoadError::Read)?;
    let tables = (0..num_tables as usize)
        .map(|index| WoffTable::read(data, index))
        .collect::<Result<Vec<_>, _>>()
        .map_err(FontLoadError::Read)?;
    let decoded = tables
        .iter()
        .map(|table| table.decode(bytes).map(|contents| (table, contents)))
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("decoded {num_tables} WOFF tables");

    let (search_range, entry_selector, range_shift) = search_params(num_tables);
    let mut sfnt = Vec::with_capacity(
        SFNT_HEADER_LEN
            + tables.len() * SFNT_TABLE_RECORD_LEN
            + decoded.iter().map(|(_, t)| round4(t.len())).sum::<usize>(),
    );
    sfnt.extend_from_slice(&flavor.to_be_bytes());
    for value in [num_tables, search_range, entry_selector, range_shift] {
        sfnt.extend_from_slice(&value.to_be_bytes());
    }
    let mut position = SFNT_HEADER_LEN + tables.len() * SFNT_TABLE_RECORD_LEN;
    for (table, contents) in &decoded {
        sfnt.extend_from_slice(&table.tag.to_be_bytes());
        sfnt.extend_from_slice(&table.checksum.to_be_bytes());
        sfnt.extend_from_slice(&(position as u32).to_be_bytes());
        sfnt.extend_from_slice(&(contents.len() as u32).to_be_bytes());
        position += round4(contents.len());
    }
    for (_, contents) in &decoded {
        sfnt.extend_from_slice(contents);
        sfnt.resize(round4(sfnt.len()), 0);
    }
    Ok(sfnt)
}

/// Decodes a WOFF2 file into sfnt data.
pub(crate) fn decode_woff2(bytes: &[u8]) -> Result<Vec<u8>, FontLoadError> {
    let mut input = bytes;
    let sfnt = woff2_patched::convert_woff2_to_ttf(&mut input)
        .map_err(|e| FontLoadError::Woff2(e.to_string()))?;
    Ok(Vec::from(sfnt))
}

/// Binary search fields of the sfnt table directory.
fn search_params(num_tables: u16) -> (u16, u16, u16) {
    if num_tables == 0 {
        return (0, 0, 0);
    }
    let entry_selector = num_tables.ilog2();
    let search_range = 16u32 << entry_selector;
    let range_shift = num_tables as u32 * 16 - search_range;
    (search_range as u16, entry_selector as u16, range_shift as u16)
}

fn round4(len: usize) -> usize {
    (len + 3) & !3
}

#[cfg(test)]
mod tests {
    use skrifa::raw::{FontRef, TableProvider};

    use super::*;
    use crate::test_data;

    #[test]
    fn binary_search_assists() {
        // same values as a font with 22 tables
        assert_eq!(search_params(0x16), (256, 4, 96));
        assert_eq!(search_params(1), (16, 0, 0));
        assert_eq!(search_params(0), (0, 0, 0));
    }

    #[test]
    fn woff_tables_match_sfnt() {
        let sfnt = decode_woff(test_data::DEJAVU_SERIF_WOFF).unwrap();
        let decoded = FontRef::new(&sfnt).unwrap();
        let original = FontRef::new(test_data::DEJAVU_SERIF).unwrap();
        let records = original.table_directory.table_records();
        assert_eq!(decoded.table_directory.table_records().len(), records.len());
        for record in records {
            let tag = record.tag();
            assert_eq!(
                decoded.table_data(tag).map(|data| data.as_ref().to_vec()),
                original.table_data(tag).map(|data| data.as_ref().to_vec()),
                "table '{tag}'"
            );
        }
        assert_eq!(
            decoded.head().unwrap().units_per_em(),
            original.head().unwrap().units_per_em()
        );
    }

    #[test]
    fn truncated_woff_fails() {
        let woff = test_data::DEJAVU_SERIF_WOFF;
        assert!(matches!(
            decode_woff(&woff[..WOFF_HEADER_LEN + 8]),
            Err(FontLoadError::Read(_))
        ));
        assert!(decode_woff(&woff[..woff.len() / 2]).is_err());
    }

    #[test]
    fn woff2_decodes_to_sfnt() {
        let sfnt = decode_woff2(test_data::SOURCE_SERIF_WOFF2).unwrap();
        let font = FontRef::new(&sfnt).unwrap();
        assert_eq!(font.head().unwrap().units_per_em(), 1000);
        assert!(font.os2().is_ok());
    }

    #[test]
    fn bad_woff2_fails() {
        assert!(matches!(
            decode_woff2(b"wOF2\0\x01\0\0 not really"),
            Err(FontLoadError::Woff2(_))
        ));
    }
}
