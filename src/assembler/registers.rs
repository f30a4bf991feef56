//! Register-name table: `%R0..%R31`, `%SYS32..%SYS63`, `%PC`, `%SP`, `%SB`.

use crate::consts::{GENERAL_REGISTER_COUNT, REG_PC, REG_SB, REG_SP, REG_SYS_BASE, SYSCALL_REGISTER_COUNT};

/// Resolves a register name (without the leading `%`) to its id, `0..67`.
pub fn resolve(name: &str) -> Option<u64> {
    match name {
        "PC" => return Some(REG_PC as u64),
        "SP" => return Some(REG_SP as u64),
        "SB" => return Some(REG_SB as u64),
        _ => {}
    }

    if let Some(n) = name.strip_prefix('R') {
        let index: usize = n.parse().ok()?;
        if index < GENERAL_REGISTER_COUNT {
            return Some(index as u64);
        }
        return None;
    }

    if let Some(n) = name.strip_prefix("SYS") {
        let index: usize = n.parse().ok()?;
        if (REG_SYS_BASE..REG_SYS_BASE + SYSCALL_REGISTER_COUNT).contains(&index) {
            return Some(index as u64);
        }
        return None;
    }

    None
}
