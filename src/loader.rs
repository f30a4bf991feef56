//! Loads a container into a booted [`Vm`]: either from a standalone file, or
//! from the trailing envelope of an executable that has one bundled onto it.

use std::env;
use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::consts::EMBEDDED_MAGIC;
use crate::container::Program;
use crate::error::LoaderError;
use crate::interpreter::Vm;

/// Length of the trailing envelope: 8-byte magic + 8-byte little-endian length.
const TRAILER_LEN: u64 = EMBEDDED_MAGIC.len() as u64 + 8;

/// Reads the program container's bytes: first checks the current executable
/// for a bundled envelope, then falls back to reading `path` as a standalone
/// container file.
pub fn load_program_bytes(path: Option<&Path>) -> Result<Vec<u8>, LoaderError> {
    if let Some(bytes) = read_own_envelope()? {
        debug!(len = bytes.len(), "loaded program from embedded envelope");
        return Ok(bytes);
    }

    let path = path.ok_or_else(|| {
        LoaderError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no embedded program and no program path given",
        ))
    })?;
    let bytes = fs::read(path)?;
    debug!(path = %path.display(), len = bytes.len(), "loaded program from file");
    Ok(bytes)
}

/// Locates the `@%LVM2%\n` + length envelope at the very end of `file`, and
/// returns the program bytes it brackets, if present. Pure byte-slice logic,
/// independent of `current_exe`/argv so it can be exercised directly.
fn extract_envelope(file: &[u8]) -> Option<&[u8]> {
    let trailer_len = TRAILER_LEN as usize;
    if file.len() < trailer_len {
        return None;
    }

    let trailer = &file[file.len() - trailer_len..];
    let (magic, length_bytes) = trailer.split_at(EMBEDDED_MAGIC.len());
    if magic != EMBEDDED_MAGIC {
        return None;
    }

    let mut length_buf = [0u8; 8];
    length_buf.copy_from_slice(length_bytes);
    let program_len = u64::from_le_bytes(length_buf) as usize;

    let without_trailer = file.len() - trailer_len;
    if program_len > without_trailer {
        return None;
    }

    let program_start = without_trailer - program_len;
    Some(&file[program_start..without_trailer])
}

fn read_own_envelope() -> Result<Option<Vec<u8>>, LoaderError> {
    let exe = env::current_exe()?;
    let mut file = fs::File::open(&exe)?;
    let len = file.metadata()?.len();
    if len < TRAILER_LEN {
        return Ok(None);
    }

    file.seek(SeekFrom::Start(0))?;
    let mut whole = Vec::with_capacity(len as usize);
    file.read_to_end(&mut whole)?;

    Ok(extract_envelope(&whole).map(<[u8]>::to_vec))
}

/// Decodes `bytes` as a container and boots a fresh [`Vm`] from it.
pub fn load(bytes: Vec<u8>) -> Result<Vm, LoaderError> {
    let program = Program::from_bytes(bytes)?;
    let code = program.decoded_code()?;
    let entry = program.header().entry_point;

    let mut vm = Vm::new();
    vm.boot(code, entry);
    Ok(vm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Encoding, Header};

    #[test]
    fn extracts_a_bundled_envelope_from_the_tail_of_a_file() {
        let container = Program::new(Encoding::Raw, Header::new(1, 0), b"code").as_bytes().to_vec();

        let mut file = b"#!/fake/launcher\nbinary-stuff-here".to_vec();
        file.extend_from_slice(&container);
        file.extend_from_slice(&EMBEDDED_MAGIC);
        file.extend_from_slice(&(container.len() as u64).to_le_bytes());

        let extracted = extract_envelope(&file).unwrap();
        assert_eq!(extracted, &container[..]);
    }

    #[test]
    fn file_without_the_magic_suffix_has_no_envelope() {
        let file = vec![0u8; 64];
        assert!(extract_envelope(&file).is_none());
    }

    #[test]
    fn declared_length_longer_than_the_file_is_rejected() {
        let mut file = Vec::new();
        file.extend_from_slice(&EMBEDDED_MAGIC);
        file.extend_from_slice(&1_000_000u64.to_le_bytes());
        assert!(extract_envelope(&file).is_none());
    }

    #[test]
    fn load_boots_a_vm_at_the_containers_entry_point() {
        let code = vec![0u8; 26]; // one NOP
        let container = Program::new(Encoding::Raw, Header::new(1, 0), &code);
        let vm = load(container.as_bytes().to_vec()).unwrap();
        assert_eq!(vm.register(crate::consts::REG_PC), 0);
    }

    #[test]
    fn load_rejects_a_malformed_container() {
        assert!(load(vec![0u8; 4]).is_err());
    }
}
