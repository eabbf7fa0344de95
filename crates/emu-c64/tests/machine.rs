//! Machine wiring with synthetic ROM images on disk.

use std::fs;
use std::path::PathBuf;

use emu_c64::{C64, C64Config, C64Error, C64Model, ClockConfig, RomError};
use mos_6510::{CpuError, RunConfig, StopReason};

/// Write ROM images into a scratch directory and return their paths.
fn write_roms(tag: &str, kernal: &[u8]) -> (PathBuf, PathBuf, PathBuf) {
    let dir = std::env::temp_dir().join(format!("emu-c64-{tag}-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create scratch dir");

    let basic = dir.join("basic.rom");
    let chargen = dir.join("chargen.rom");
    let kernal_path = dir.join("kernal.rom");
    fs::write(&basic, vec![0xBA; 8192]).expect("write BASIC");
    fs::write(&chargen, vec![0xC8; 4096]).expect("write chargen");
    fs::write(&kernal_path, kernal).expect("write Kernal");
    (basic, chargen, kernal_path)
}

/// Kernal image with `program` at $E000 and the reset vector pointing at it.
fn kernal_with(program: &[u8]) -> Vec<u8> {
    let mut rom = vec![0xEA; 8192];
    rom[..program.len()].copy_from_slice(program);
    rom[0x1FFC] = 0x00;
    rom[0x1FFD] = 0xE0;
    rom
}

#[test]
fn test_program_in_kernal_writes_ram() {
    // LDA $A000; STA $0400; LDA #$2A; STA $0401; JMP *
    let program = [
        0xAD, 0x00, 0xA0, 0x8D, 0x00, 0x04, 0xA9, 0x2A, 0x8D, 0x01, 0x04, 0x4C, 0x0B, 0xE0,
    ];
    let (basic, chargen, kernal) = write_roms("ram", &kernal_with(&program));
    let config = C64Config::from_files(C64Model::C64Pal, &basic, &chargen, &kernal)
        .expect("load ROMs");

    let mut c64 = C64::new(config, ClockConfig::default().unthrottled());
    c64.power_on(RunConfig::default().with_limit(10))
        .expect("power on");
    let session = c64.wait().expect("session");

    assert_eq!(session.reason, StopReason::LimitReached);
    let memory = c64.memory().expect("powered off");
    assert_eq!(memory.peek(0x0400), 0xBA, "BASIC ROM mapped at $A000");
    assert_eq!(memory.peek(0x0401), 0x2A);
    assert_eq!(c64.cpu().expect("powered off").regs.pc, 0xE00B);
    c64.dump_memory(0x0400).expect("dump");
}

#[test]
fn test_strict_run_faults_on_jam() {
    let (basic, chargen, kernal) = write_roms("jam", &kernal_with(&[0xEA, 0x02]));
    let config = C64Config::from_files(C64Model::C64Ntsc, &basic, &chargen, &kernal)
        .expect("load ROMs");

    let mut c64 = C64::new(config, ClockConfig::for_model(C64Model::C64Ntsc));
    c64.power_on(RunConfig::default().strict()).expect("power on");
    let session = c64.wait().expect("session");

    assert_eq!(
        session.reason,
        StopReason::Fault(CpuError::IllegalOpcode {
            opcode: 0x02,
            pc: 0xE001
        })
    );
    assert_eq!(session.instructions, 2);
}

#[test]
fn test_short_rom_is_reported() {
    let (basic, chargen, kernal) = write_roms("short", &[0x00; 16]);

    let err = C64Config::from_files(C64Model::C64Pal, &basic, &chargen, &kernal)
        .expect_err("Kernal too short");

    assert!(matches!(
        err,
        RomError::TooShort {
            expected: 8192,
            actual: 16,
            ..
        }
    ));
    let err = C64Error::from(err);
    assert!(err.to_string().contains("16 bytes"));
}

#[test]
fn test_power_off_when_off_is_an_error() {
    let (basic, chargen, kernal) = write_roms("off", &kernal_with(&[]));
    let config = C64Config::from_files(C64Model::C64Pal, &basic, &chargen, &kernal)
        .expect("load ROMs");
    let mut c64 = C64::new(config, ClockConfig::default());

    assert!(matches!(c64.power_off(), Err(C64Error::NotRunning)));
    assert!(matches!(c64.wait(), Err(C64Error::NotRunning)));
}
