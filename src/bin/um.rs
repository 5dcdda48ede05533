use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use clap::Parser;
use log::error;

use um::{Machine, Program};

/// Runs a 32-bit word-addressed register machine program.
#[derive(Parser)]
#[command(name = "um", about = "Run a UM program")]
struct Args {
    /// Path to the program file.
    program: String,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let metadata = match std::fs::metadata(&args.program) {
        Ok(metadata) => metadata,
        Err(source) => {
            error!("um: failed to read program file {}: {source}", args.program);
            return ExitCode::FAILURE;
        }
    };
    let expected_words = (metadata.len() / 4) as usize;

    let mut file = match File::open(&args.program) {
        Ok(file) => file,
        Err(source) => {
            error!("um: failed to read program file {}: {source}", args.program);
            return ExitCode::FAILURE;
        }
    };

    let program = match Program::read(&args.program, expected_words, &mut file) {
        Ok(program) => program,
        Err(startup_error) => {
            error!("um: {startup_error}");
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut output = BufWriter::new(stdout.lock());

    let mut machine = Machine::new(program.into_words(), &mut input, &mut output);
    let result = machine.run();
    let _ = output.flush();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(fault) => {
            error!("um: fault: {fault}");
            ExitCode::FAILURE
        }
    }
}
