//! IFF group and chunk framing.
//!
//! A PAK file is one `FORM` group; everything after the 12-byte group
//! preamble is a flat run of chunks. Framing integers are big endian,
//! payload integers are not. See the crate documentation for the layout.

use winnow::binary::be_u32;
use winnow::combinator::seq;
use winnow::prelude::*;
use winnow::token::{literal, take};

use crate::error::{FormatError, Result};

/// Form type identifying a PAK container, revision 1.
pub const FORM_TYPE: [u8; 4] = *b"PAC1";

/// Chunk carrying the archive header.
pub const CHUNK_HEAD: [u8; 4] = *b"HEAD";

/// Chunk carrying the entry data region.
pub const CHUNK_DATA: [u8; 4] = *b"DATA";

/// Chunk carrying the entry table.
pub const CHUNK_FILE: [u8; 4] = *b"FILE";

/// The decoded 12-byte group preamble at the start of a PAK file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormHeader {
    /// Size of everything after the size field, form type included.
    pub size: u32,
    /// The form type, [`FORM_TYPE`] for archives this crate accepts.
    pub form_type: [u8; 4],
}

/// A decoded 8-byte chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: [u8; 4],
    /// Payload size in bytes, not counting this header.
    pub size: u32,
}

fn form_header(s: &mut &[u8]) -> PResult<FormHeader> {
    seq!(FormHeader {
        _: literal("FORM"),
        size: be_u32,
        form_type: take(4u8).try_map(<[u8; 4]>::try_from),
    })
    .parse_next(s)
}

fn chunk_header(s: &mut &[u8]) -> PResult<ChunkHeader> {
    seq!(ChunkHeader {
        id: take(4u8).try_map(<[u8; 4]>::try_from),
        size: be_u32,
    })
    .parse_next(s)
}

impl FormHeader {
    /// Decode the group preamble, rejecting anything that is not a `FORM` group.
    pub fn parse(data: &[u8]) -> Result<FormHeader> {
        let mut buf = data;
        form_header(&mut buf).map_err(|_| FormatError::UnrecognizedSignature.into())
    }

    /// Byte length of the encoded preamble.
    pub const LEN: usize = 12;
}

impl ChunkHeader {
    /// Decode one chunk header.
    pub fn parse(data: &[u8]) -> Result<ChunkHeader> {
        let mut buf = data;
        chunk_header(&mut buf).map_err(|_| FormatError::UnrecognizedSignature.into())
    }

    /// Byte length of an encoded chunk header.
    pub const LEN: usize = 8;

    /// The chunk identifier as text, for diagnostics.
    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.id).into_owned()
    }
}

#[cfg(test)]
mod test {
    use tracing_test::traced_test;

    use crate::chunk::{ChunkHeader, FormHeader, FORM_TYPE};

    #[traced_test]
    #[test]
    fn read_form_header() {
        #[rustfmt::skip]
        let input = vec![
            b'F', b'O', b'R', b'M',  // ID
            0x00, 0x00, 0x00, 0x1C,  // Size
            b'P', b'A', b'C', b'1',  // Type
        ];

        let result = FormHeader::parse(input.as_slice()).unwrap();

        assert_eq!(
            result,
            FormHeader {
                size: 28,
                form_type: FORM_TYPE,
            }
        );
    }

    #[traced_test]
    #[test]
    fn read_form_header_rejects_other_groups() {
        #[rustfmt::skip]
        let input = vec![
            b'R', b'I', b'F', b'F',  // ID
            0x00, 0x00, 0x00, 0x1C,  // Size
            b'P', b'A', b'C', b'1',  // Type
        ];

        assert!(FormHeader::parse(input.as_slice()).is_err());
    }

    #[traced_test]
    #[test]
    fn read_form_header_rejects_short_input() {
        let input = vec![b'F', b'O', b'R', b'M', 0x00];

        assert!(FormHeader::parse(input.as_slice()).is_err());
    }

    #[traced_test]
    #[test]
    fn read_chunk_header() {
        #[rustfmt::skip]
        let input = vec![
            b'H', b'E', b'A', b'D',  // ID
            0x00, 0x00, 0x00, 0x10,  // Size
        ];

        let result = ChunkHeader::parse(input.as_slice()).unwrap();

        assert_eq!(
            result,
            ChunkHeader {
                id: *b"HEAD",
                size: 16,
            }
        );
        assert_eq!(result.name(), "HEAD");
    }
}
