//! Headless basic runner.
//!
//! Loads a ROM image, runs the machine until the test ROM's exit sentinel
//! (or a CPU fault), writes a per-instruction register trace to trace.txt
//! and forwards serial output to stdout. Log routing goes through
//! env_logger, so `RUST_LOG` controls what the core's diagnostics show.

use std::env;
use std::fs;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use gb_core::GameBoy;

/// The test ROMs in use spin at this address once they are done.
const EXIT_SENTINEL: u16 = 0xC8B0;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| String::from("gb-run"));
    let Some(rom_path) = args.next() else {
        eprintln!("{program}: missing required argument.");
        eprintln!("{program}: syntax: {program} rom_file");
        return ExitCode::FAILURE;
    };

    let rom_data = match fs::read(&rom_path) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("{program}: unable to open ROM file {rom_path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut gb = match GameBoy::new(&rom_data) {
        Ok(gb) => gb,
        Err(err) => {
            eprintln!("{program}: {rom_path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let trace_file = match File::create("trace.txt") {
        Ok(file) => file,
        Err(err) => {
            eprintln!("{program}: unable to create trace file: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut trace = BufWriter::new(trace_file);
    let mut stdout = io::stdout();

    loop {
        let reg = &gb.cpu().reg;
        let _ = writeln!(
            trace,
            "BC={:04X} DE={:04X} HL={:04X} AF={:04X} SP={:04X} PC={:04X}",
            reg.bc.value, reg.de.value, reg.hl.value, reg.af.value, reg.sp.value, reg.pc.value
        );

        if reg.pc.value == EXIT_SENTINEL {
            break;
        }

        gb.step();

        let serial = gb.bus_mut().take_serial();
        if !serial.is_empty() {
            let _ = stdout.write_all(&serial);
            let _ = stdout.flush();
        }

        // A fault has already been logged by the core; the step that hit
        // it is complete, so stop here.
        if gb.fault().is_some() {
            break;
        }
    }

    ExitCode::SUCCESS
}
