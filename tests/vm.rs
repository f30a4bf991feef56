//! End-to-end scenarios: assemble real programs, run them on a real `Vm`,
//! and check the outcomes that matter to a guest — exit codes, host file
//! contents, and fatal faults.

use lvm::assembler::assemble;
use lvm::container::{Encoding, Header, Program};
use lvm::loader::load;
use lvm::{Fault, Vm};

fn boot(source: &str) -> Vm {
    let (code, entry) = assemble(source).unwrap();
    let mut vm = Vm::new();
    vm.boot(code, entry);
    vm
}

/// S1: a program that writes a greeting to stdout and exits cleanly.
#[test]
fn hello_world_writes_to_stdout_and_exits_zero() {
    let source = r#"
        DATA @msg "hello, world\n"
        MOV %SYS32, 1
        MOV %SYS33, @msg
        MOV %SYS34, 13
        SYSCALL %R0, 1
        MOV %SYS32, 0
        SYSCALL %R1, 60
    "#;
    let mut vm = boot(source);
    assert_eq!(vm.run().unwrap(), 0);
}

/// S2: a program that opens one host file for reading and another for
/// writing, and copies bytes between them through the syscall bridge.
#[test]
fn echo_copies_bytes_between_two_host_files() {
    let pid = std::process::id();
    let input_path = std::env::temp_dir().join(format!("lvm_test_echo_in_{pid}.bin"));
    let output_path = std::env::temp_dir().join(format!("lvm_test_echo_out_{pid}.bin"));
    std::fs::write(&input_path, b"echo-me").unwrap();
    let _ = std::fs::remove_file(&output_path);

    // Built with `format!` rather than a raw string literal: the DATA lines
    // need a real NUL byte after each path, which only a processed (non-raw)
    // string literal's `\0` escape can produce.
    let source = format!(
        "DATA @in_path \"{in_path}\0\"\n\
         DATA @out_path \"{out_path}\0\"\n\
         DATA @buf \"\0\0\0\0\0\0\0\"\n\
         MOV %SYS32, @in_path\n\
         MOV %SYS33, 1\n\
         MOV %SYS34, 0\n\
         SYSCALL %R0, 2\n\
         MOV %R1, %SYS35\n\
         MOV %SYS32, @out_path\n\
         MOV %SYS33, 22\n\
         MOV %SYS34, 420\n\
         SYSCALL %R2, 2\n\
         MOV %R3, %SYS35\n\
         MOV %SYS32, %R1\n\
         MOV %SYS33, @buf\n\
         MOV %SYS34, 7\n\
         SYSCALL %R4, 0\n\
         MOV %SYS32, %R3\n\
         MOV %SYS33, @buf\n\
         MOV %SYS34, 7\n\
         SYSCALL %R5, 1\n\
         MOV %SYS32, %R1\n\
         SYSCALL %R6, 3\n\
         MOV %SYS32, %R3\n\
         SYSCALL %R7, 3\n\
         MOV %SYS32, 0\n\
         SYSCALL %R8, 60\n",
        in_path = input_path.to_str().unwrap(),
        out_path = output_path.to_str().unwrap(),
    );

    let mut vm = boot(&source);
    let exit_code = vm.run().unwrap();

    let echoed = std::fs::read(&output_path).unwrap();
    let _ = std::fs::remove_file(&input_path);
    let _ = std::fs::remove_file(&output_path);

    assert_eq!(exit_code, 0);
    assert_eq!(echoed, b"echo-me");
}

/// S3: a short arithmetic pipeline, checked via the guest's own exit code.
#[test]
fn arithmetic_pipeline_computes_the_expected_value() {
    let source = r#"
        MOV %R0, 3
        MOV %R1, 4
        ADD %R2, %R0, %R1
        MOV %R3, 5
        MUL %R4, %R2, %R3
        MOV %R5, 6
        MOD %R6, %R4, %R5
        MOV %SYS32, %R6
        SYSCALL %R7, 60
    "#;
    let mut vm = boot(source);
    // (3 + 4) * 5 = 35; 35 % 6 = 5.
    assert_eq!(vm.run().unwrap(), 5);
}

/// S4: branching on a negative register value via JL, per the literal
/// branching scenario.
#[test]
fn negative_register_value_branches_via_jl() {
    let source = r#"
        MOV %R0, -5
        JL %R0, @l_neg
        MOV %SYS32, 1
        SYSCALL %R1, 60
        LABEL @l_neg
        MOV %SYS32, 2
        SYSCALL %R2, 60
    "#;
    let mut vm = boot(source);
    assert_eq!(vm.run().unwrap(), 2);
}

/// A countdown loop exercising CMP + JNE, checked by how many times it runs
/// rather than by the final register state alone.
#[test]
fn countdown_loop_runs_exactly_as_many_times_as_it_counts_down() {
    let source = r#"
        MOV %R0, 5
        MOV %R2, 0
        LABEL @loop
        SUB %R0, %R0, 1
        ADD %R2, %R2, 1
        CMP %R1, %R0, 0
        JNE %R1, @loop
        MOV %SYS32, %R2
        SYSCALL %R3, 60
    "#;
    let mut vm = boot(source);
    assert_eq!(vm.run().unwrap(), 5);
}

/// S5: jumping into unmapped memory is a fatal, guest-visible fault, not a
/// panic or a silently wrapped address.
#[test]
fn jumping_into_unmapped_memory_segfaults() {
    let source = "JMP 1000000\n";
    let mut vm = boot(source);
    assert!(matches!(vm.run(), Err(Fault::SegmentationFault(_))));
}

/// S6: the full pipeline — assemble, wrap in a container, decode the
/// container back, boot from it, and run.
#[test]
fn assembled_program_round_trips_through_a_container_and_runs() {
    let source = r#"
        MOV %SYS32, 9
        SYSCALL %R0, 60
    "#;
    let (code, entry) = assemble(source).unwrap();

    let container = Program::new(Encoding::Raw, Header::new(1, entry), &code);
    let reparsed = Program::from_bytes(container.as_bytes().to_vec()).unwrap();
    assert_eq!(reparsed.header().entry_point, entry);

    let mut vm = load(reparsed.as_bytes().to_vec()).unwrap();
    assert_eq!(vm.run().unwrap(), 9);
}
