//! The syscall bridge: guest-visible `errno` codes, the host-file table, and
//! the process-wide number-to-handler dispatch table.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::consts::{FIRST_DYNAMIC_FD, STDERR_FD, STDIN_FD, STDOUT_FD};
use crate::error::Fault;
use crate::interpreter::Vm;

/// No error: the call completed normally.
pub const EOK: u64 = 0;
/// The fd named by the call is not open.
pub const EINVALIDFD: u64 = 1;
/// A host write failed mid-syscall.
pub const EFILEWRITE: u64 = 2;
/// A host read failed mid-syscall.
pub const EFILEREAD: u64 = 3;

const SYS_READ: u64 = 0;
const SYS_WRITE: u64 = 1;
const SYS_OPEN: u64 = 2;
const SYS_CLOSE: u64 = 3;
const SYS_EXIT: u64 = 60;

/// A host-backed file, standard stream or otherwise.
enum HostFile {
    Stdin,
    Stdout,
    Stderr,
    File(File),
}

impl HostFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            HostFile::Stdin => std::io::stdin().read(buf),
            HostFile::Stdout | HostFile::Stderr => Ok(0),
            HostFile::File(f) => f.read(buf),
        }
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            HostFile::Stdin => Ok(0),
            HostFile::Stdout => std::io::stdout().write(buf),
            HostFile::Stderr => std::io::stderr().write(buf),
            HostFile::File(f) => f.write(buf),
        }
    }
}

/// The `fd -> host file` table, seeded at boot with the standard streams.
pub struct FileTable {
    files: HashMap<u64, HostFile>,
    next_fd: u64,
}

impl FileTable {
    /// A fresh table with `stdin=0, stdout=1, stderr=2` bound and the next
    /// free fd starting at 3.
    pub fn new() -> Self {
        let mut files = HashMap::new();
        files.insert(STDIN_FD, HostFile::Stdin);
        files.insert(STDOUT_FD, HostFile::Stdout);
        files.insert(STDERR_FD, HostFile::Stderr);
        Self {
            files,
            next_fd: FIRST_DYNAMIC_FD,
        }
    }

    fn open(&mut self, file: File) -> u64 {
        let fd = self.next_fd;
        self.next_fd += 1;
        self.files.insert(fd, HostFile::File(file));
        fd
    }

    /// Drops the table entry for `fd`. Closing an unknown or standard fd is
    /// not an error.
    fn close(&mut self, fd: u64) {
        self.files.remove(&fd);
    }
}

impl Default for FileTable {
    fn default() -> Self {
        Self::new()
    }
}

/// The result of dispatching one syscall: the `errno` to write back to the
/// guest, unless a fatal condition aborts the run entirely.
pub type SyscallResult = Result<u64, Fault>;

/// One syscall implementation: takes the VM (for register/memory access and
/// the file table) and returns an `errno`, or a fatal [`Fault`].
pub type Handler = fn(&mut Vm) -> SyscallResult;

/// The process-wide `syscall number -> handler` mapping.
///
/// Built once via [`SyscallTable::standard`] and shared read-only across every
/// `Vm` instance via `Arc`; tests may construct a stubbed table instead to
/// avoid touching real host I/O.
#[derive(Clone)]
pub struct SyscallTable {
    handlers: Arc<HashMap<u64, Handler>>,
}

impl SyscallTable {
    /// Builds a table from an explicit `number -> handler` mapping.
    pub fn new(handlers: HashMap<u64, Handler>) -> Self {
        Self {
            handlers: Arc::new(handlers),
        }
    }

    /// The standard table: READ, WRITE, OPEN, CLOSE, EXIT.
    pub fn standard() -> Self {
        let mut handlers: HashMap<u64, Handler> = HashMap::new();
        handlers.insert(SYS_READ, sys_read);
        handlers.insert(SYS_WRITE, sys_write);
        handlers.insert(SYS_OPEN, sys_open);
        handlers.insert(SYS_CLOSE, sys_close);
        handlers.insert(SYS_EXIT, sys_exit);
        Self::new(handlers)
    }

    /// Looks up the handler for `number`, if registered.
    pub fn get(&self, number: u64) -> Option<Handler> {
        self.handlers.get(&number).copied()
    }
}

/// Reads `fd` into guest memory at `buf_ptr`, up to `n` bytes.
///
/// Inputs: `SYS32=fd, SYS33=buf_ptr, SYS34=n`. Output: `SYS35=bytes_read`.
fn sys_read(vm: &mut Vm) -> SyscallResult {
    let fd = vm.sys_in(0);
    let buf_ptr = vm.sys_in(1);
    let n = vm.sys_in(2) as usize;

    let Some(file) = vm.files.files.get_mut(&fd) else {
        debug!(fd, "READ on unknown fd");
        return Ok(EINVALIDFD);
    };

    let mut scratch = vec![0u8; n.min(64 * 1024)];
    let mut total = 0u64;
    let mut remaining = n;
    while remaining > 0 {
        let want = remaining.min(scratch.len());
        match file.read(&mut scratch[..want]) {
            Ok(0) => break,
            Ok(read) => {
                vm.memory.write_at(buf_ptr + total, &scratch[..read])?;
                total += read as u64;
                remaining -= read;
            }
            Err(e) => {
                warn!(fd, error = %e, "READ failed");
                return Ok(EFILEREAD);
            }
        }
    }
    trace!(fd, total, "READ");
    vm.sys_out(total);
    Ok(EOK)
}

/// Writes `n` bytes from guest memory at `buf_ptr` to `fd`.
///
/// Inputs: `SYS32=fd, SYS33=buf_ptr, SYS34=n`. Output: `SYS35=bytes_written`.
fn sys_write(vm: &mut Vm) -> SyscallResult {
    let fd = vm.sys_in(0);
    let buf_ptr = vm.sys_in(1);
    let n = vm.sys_in(2);

    if !vm.files.files.contains_key(&fd) {
        debug!(fd, "WRITE on unknown fd");
        return Ok(EINVALIDFD);
    }

    let mut total = 0u64;
    let files = &mut vm.files;
    let result = vm.memory.iterate(buf_ptr, n, |_, slice| {
        let file = files.files.get_mut(&fd).expect("checked above");
        match file.write(slice) {
            Ok(written) => {
                total += written as u64;
                Ok(())
            }
            Err(_) => Err(()),
        }
    });

    match result {
        Ok(()) if total == n => {
            trace!(fd, total, "WRITE");
            vm.sys_out(total);
            Ok(EOK)
        }
        Ok(()) => {
            warn!(fd, total, n, "WRITE short");
            vm.sys_out(total);
            Ok(EFILEWRITE)
        }
        Err(fault) => Err(fault),
    }
}

/// Opens a NUL-terminated path from guest memory at `path_ptr`, with the
/// given `flags`/`mode` bitmasks, and binds the result to a fresh fd.
///
/// Inputs: `SYS32=path_ptr, SYS33=flags, SYS34=mode`. Output: `SYS35=fd`.
fn sys_open(vm: &mut Vm) -> SyscallResult {
    let path_ptr = vm.sys_in(0);
    let flags = vm.sys_in(1);
    let mode = vm.sys_in(2);

    let path_bytes = vm.memory.read_c_string(path_ptr)?;
    let path = String::from_utf8_lossy(&path_bytes).into_owned();

    let mut options = OpenOptions::new();
    options.read(flags & FLAG_READ != 0);
    options.write(flags & FLAG_WRITE != 0);
    options.create(flags & FLAG_CREATE != 0);
    options.append(flags & FLAG_APPEND != 0);
    options.truncate(flags & FLAG_TRUNCATE != 0);
    apply_unix_mode(&mut options, mode);

    match options.open(&path) {
        Ok(file) => {
            let fd = vm.files.open(file);
            trace!(%path, fd, "OPEN");
            vm.sys_out(fd);
            Ok(EOK)
        }
        Err(e) => {
            warn!(%path, error = %e, "OPEN failed");
            Ok(EFILEREAD)
        }
    }
}

/// Flag bits accepted by OPEN's `flags` operand.
const FLAG_READ: u64 = 1 << 0;
const FLAG_WRITE: u64 = 1 << 1;
const FLAG_CREATE: u64 = 1 << 2;
const FLAG_APPEND: u64 = 1 << 3;
const FLAG_TRUNCATE: u64 = 1 << 4;

#[cfg(unix)]
fn apply_unix_mode(options: &mut OpenOptions, mode: u64) {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(mode as u32);
}

#[cfg(not(unix))]
fn apply_unix_mode(_options: &mut OpenOptions, _mode: u64) {}

/// Closes `fd`. Idempotent: closing an unknown fd or a standard stream is not
/// an error.
///
/// Input: `SYS32=fd`.
fn sys_close(vm: &mut Vm) -> SyscallResult {
    let fd = vm.sys_in(0);
    vm.files.close(fd);
    trace!(fd, "CLOSE");
    Ok(EOK)
}

/// Terminates the run with `code` as the guest-visible exit status.
///
/// Input: `SYS32=code`.
fn sys_exit(vm: &mut Vm) -> SyscallResult {
    let code = vm.sys_in(0);
    debug!(code, "EXIT");
    vm.request_exit(code);
    Ok(EOK)
}
