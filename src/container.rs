//! The on-disk program container: `encoding | header | length-prefixed code`.

use crate::error::ContainerError;

/// Offset of the `encoding` byte.
const ENCODING_OFFSET: usize = 0;
/// Offset of the 9-byte header (`version:u8, entry_point:u64 LE`).
const HEADER_OFFSET: usize = 1;
const HEADER_LEN: usize = 9;
/// Offset of the `code_end:u64 LE` length prefix.
const CODE_END_OFFSET: usize = 10;
/// Offset at which the `code` payload begins.
const CODE_OFFSET: usize = 18;
/// Minimum valid container length.
pub const MIN_LEN: usize = CODE_OFFSET;

/// How the `code` payload is stored in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `code` is raw bytecode, stored verbatim.
    Raw,
    /// `code` is gzip-compressed bytecode; inflated before installation.
    Gzip,
}

impl Encoding {
    const fn as_u8(self) -> u8 {
        match self {
            Encoding::Raw => 0,
            Encoding::Gzip => 1,
        }
    }

    const fn from_u8(byte: u8) -> Result<Self, ContainerError> {
        match byte {
            0 => Ok(Encoding::Raw),
            1 => Ok(Encoding::Gzip),
            other => Err(ContainerError::UnsupportedEncoding(other)),
        }
    }
}

/// The 9-byte `version` + `entry_point` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Container format version.
    pub version: u8,
    /// Byte address the VM's PC is set to at boot.
    pub entry_point: u64,
}

impl Header {
    /// Builds a new header.
    pub const fn new(version: u8, entry_point: u64) -> Self {
        Self { version, entry_point }
    }

    fn encode(self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0] = self.version;
        out[1..9].copy_from_slice(&self.entry_point.to_le_bytes());
        out
    }

    fn decode(bytes: &[u8]) -> Self {
        let version = bytes[0];
        let mut entry = [0u8; 8];
        entry.copy_from_slice(&bytes[1..9]);
        Self {
            version,
            entry_point: u64::from_le_bytes(entry),
        }
    }
}

/// A fully encoded program container, ready to write to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    bytes: Vec<u8>,
}

impl Program {
    /// Assembles a container from its parts: `encoding | header | code`.
    pub fn new(encoding: Encoding, header: Header, code: &[u8]) -> Self {
        let code_end = (CODE_OFFSET + code.len()) as u64;

        let mut bytes = Vec::with_capacity(CODE_OFFSET + code.len());
        bytes.push(encoding.as_u8());
        bytes.extend_from_slice(&header.encode());
        bytes.extend_from_slice(&code_end.to_le_bytes());
        bytes.extend_from_slice(code);

        Self { bytes }
    }

    /// Wraps an already-validated byte buffer as a `Program` without copying.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ContainerError> {
        validate(&bytes)?;
        Ok(Self { bytes })
    }

    /// The raw container bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The container's `encoding` tag.
    pub fn encoding(&self) -> Result<Encoding, ContainerError> {
        Encoding::from_u8(self.bytes[ENCODING_OFFSET])
    }

    /// The container's header.
    pub fn header(&self) -> Header {
        Header::decode(&self.bytes[HEADER_OFFSET..HEADER_OFFSET + HEADER_LEN])
    }

    /// The declared end offset of the `code` payload within the container.
    pub fn code_end(&self) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.bytes[CODE_END_OFFSET..CODE_END_OFFSET + 8]);
        u64::from_le_bytes(buf)
    }

    /// The raw `code` payload, exactly as stored (still compressed, if the
    /// encoding is [`Encoding::Gzip`]).
    pub fn code(&self) -> &[u8] {
        &self.bytes[CODE_OFFSET..self.code_end() as usize]
    }

    /// The executable bytecode: [`Self::code`] inflated if the encoding is
    /// [`Encoding::Gzip`], returned verbatim if [`Encoding::Raw`].
    ///
    /// Requires the `gzip` feature to decode a [`Encoding::Gzip`] container;
    /// without it, such a container is rejected rather than silently treated
    /// as raw bytecode.
    pub fn decoded_code(&self) -> Result<Vec<u8>, ContainerError> {
        match self.encoding()? {
            Encoding::Raw => Ok(self.code().to_vec()),
            Encoding::Gzip => inflate(self.code()),
        }
    }
}

#[cfg(feature = "gzip")]
fn inflate(bytes: &[u8]) -> Result<Vec<u8>, ContainerError> {
    use std::io::Read;
    let mut decoder = flate2::read::GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| ContainerError::Gzip(e.to_string()))?;
    Ok(out)
}

#[cfg(not(feature = "gzip"))]
fn inflate(_bytes: &[u8]) -> Result<Vec<u8>, ContainerError> {
    Err(ContainerError::UnsupportedEncoding(Encoding::Gzip.as_u8()))
}

/// Checks that `bytes` is at least [`MIN_LEN`] long and that its `code_end`
/// field satisfies `18 <= code_end <= bytes.len()`.
pub fn validate(bytes: &[u8]) -> Result<(), ContainerError> {
    if bytes.len() < MIN_LEN {
        return Err(ContainerError::TooShort(bytes.len()));
    }

    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[CODE_END_OFFSET..CODE_END_OFFSET + 8]);
    let code_end = u64::from_le_bytes(buf);

    if code_end < CODE_OFFSET as u64 || code_end > bytes.len() as u64 {
        return Err(ContainerError::InvalidCodeEnd {
            code_end,
            len: bytes.len(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_raw_program() {
        let code = b"hello, world!".to_vec();
        let header = Header::new(1, 0x10);
        let program = Program::new(Encoding::Raw, header, &code);

        let reparsed = Program::from_bytes(program.as_bytes().to_vec()).unwrap();
        assert_eq!(reparsed.encoding().unwrap(), Encoding::Raw);
        assert_eq!(reparsed.header(), header);
        assert_eq!(reparsed.code(), &code[..]);
        assert_eq!(reparsed.decoded_code().unwrap(), code);
    }

    #[test]
    fn rejects_too_short_container() {
        let bytes = vec![0u8; 17];
        assert_eq!(validate(&bytes), Err(ContainerError::TooShort(17)));
    }

    #[test]
    fn rejects_code_end_out_of_range() {
        let mut bytes = vec![0u8; MIN_LEN];
        bytes[CODE_END_OFFSET..CODE_END_OFFSET + 8].copy_from_slice(&1000u64.to_le_bytes());
        assert_eq!(
            validate(&bytes),
            Err(ContainerError::InvalidCodeEnd {
                code_end: 1000,
                len: MIN_LEN
            })
        );
    }

    #[test]
    fn accepts_minimum_length_with_empty_code() {
        let program = Program::new(Encoding::Raw, Header::new(0, 0), &[]);
        assert_eq!(program.as_bytes().len(), MIN_LEN);
        assert!(program.code().is_empty());
    }

    #[test]
    fn unsupported_encoding_tag_is_rejected() {
        let mut bytes = Program::new(Encoding::Raw, Header::new(0, 0), &[1, 2, 3])
            .as_bytes()
            .to_vec();
        bytes[ENCODING_OFFSET] = 9;
        let program = Program::from_bytes(bytes).unwrap();
        assert_eq!(program.encoding(), Err(ContainerError::UnsupportedEncoding(9)));
    }

    #[cfg(not(feature = "gzip"))]
    #[test]
    fn gzip_without_feature_is_rejected_not_misread() {
        let program = Program::new(Encoding::Gzip, Header::new(0, 0), &[1, 2, 3]);
        assert_eq!(
            program.decoded_code(),
            Err(ContainerError::UnsupportedEncoding(Encoding::Gzip.as_u8()))
        );
    }
}
