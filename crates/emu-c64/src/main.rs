//! Commodore 64 emulator binary.
//!
//! Loads the ROMs, powers the machine on, and runs until the instruction
//! limit is reached or the CPU faults. Without `--instructions` it runs
//! until interrupted. Progress goes to the log; set
//! `RUST_LOG=trace` for a per-instruction trace.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use emu_c64::{C64, C64Config, C64Error, C64Model, ClockConfig};
use log::{error, info};
use mos_6510::{DecodePolicy, RunConfig, StopReason};

#[derive(Debug, Parser)]
#[command(name = "emu-c64", version, about = "Commodore 64 emulator")]
struct Args {
    /// BASIC ROM image (8192 bytes)
    #[arg(long, default_value = "roms/basic.rom")]
    basic: PathBuf,

    /// Kernal ROM image (8192 bytes)
    #[arg(long, default_value = "roms/kernal.rom")]
    kernal: PathBuf,

    /// Character ROM image (4096 bytes)
    #[arg(long = "char", default_value = "roms/chargen.rom")]
    char_rom: PathBuf,

    /// NTSC timing instead of PAL
    #[arg(long)]
    ntsc: bool,

    /// Stop after this many instructions (default: run until interrupted)
    #[arg(long, value_name = "COUNT")]
    instructions: Option<u64>,

    /// Stop on the first illegal or unimplemented opcode
    #[arg(long)]
    strict: bool,

    /// Run as fast as possible
    #[arg(long)]
    unthrottled: bool,

    /// Dump the ROM images to the log
    #[arg(long)]
    dump_roms: bool,

    /// Dump memory from ADDR (hex) to the log after the run
    #[arg(long, value_name = "ADDR", value_parser = parse_address)]
    dump_memory: Option<u16>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

/// Accepts `C000`, `$C000` or `0xC000`.
fn parse_address(s: &str) -> Result<u16, String> {
    let digits = s
        .strip_prefix('$')
        .or_else(|| s.strip_prefix("0x"))
        .unwrap_or(s);
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid address {s:?}: {e}"))
}

fn run_config(args: &Args) -> RunConfig {
    RunConfig {
        policy: if args.strict {
            DecodePolicy::Strict
        } else {
            DecodePolicy::Permissive
        },
        instruction_limit: args.instructions,
    }
}

fn run(args: &Args) -> Result<StopReason, C64Error> {
    let model = if args.ntsc {
        C64Model::C64Ntsc
    } else {
        C64Model::C64Pal
    };
    let config = C64Config::from_files(model, &args.basic, &args.char_rom, &args.kernal)?;

    let mut clock = ClockConfig::for_model(model);
    if args.unthrottled {
        clock = clock.unthrottled();
    }
    let run_config = run_config(args);

    let mut c64 = C64::new(config, clock);
    if args.dump_roms {
        c64.dump_roms();
    }

    c64.power_on(run_config)?;
    let session = c64.wait()?;

    if let Some(cpu) = c64.cpu() {
        let regs = cpu.regs;
        info!(
            "PC:{:04X} A:{:02X} X:{:02X} Y:{:02X} S:{:02X} P:{:02X}",
            regs.pc,
            regs.a,
            regs.x,
            regs.y,
            regs.s,
            regs.p.bits()
        );
        info!("{} instructions, {} cycles", session.instructions, session.ticks);
    }
    if let Some(offset) = args.dump_memory {
        c64.dump_memory(offset)?;
    }

    Ok(session.reason)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(StopReason::Fault(err)) => {
            error!("CPU fault: {err}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            let mut source = err.source();
            while let Some(cause) = source {
                error!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
