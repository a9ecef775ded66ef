use std::{
    fs,
    io::{self, Read, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use colored::Colorize;
use linc::interpreter::{self, Interpreter, RunError, RunOutcome};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Read the program from a file instead of standard input
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Print the parsed program as JSON instead of interpreting it
    #[arg(long)]
    dump_ast: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    simple_logger::init_with_level(if cli.verbose {
        log::Level::Debug
    } else {
        log::Level::Warn
    })?;

    print!("Enter linear C code:\n\n");
    io::stdout().flush()?;

    let source = match &cli.file {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let program = match interpreter::parse_program(&source) {
        Ok(program) => program,
        Err(error) => {
            eprintln!("{}: {error}", "Parser error".red());
            println!("\n====== ERROR ======");
            println!("Ends with parsing error");
            return Ok(ExitCode::from(1));
        }
    };

    if cli.dump_ast {
        println!("{}", serde_json::to_string_pretty(&program)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("\n======= OUT =======\n");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut interpreter = Interpreter::new(program);

    match interpreter.run(&mut out) {
        Ok(RunOutcome::Completed) => {
            writeln!(out, "\n===== SUCCESS =====")?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(RunOutcome::EvaluationError) => Ok(ExitCode::SUCCESS),
        Err(RunError::Allocation(error)) => {
            eprintln!("{}: {error}", "Fatal".red());
            writeln!(out, "\n====== ERROR ======")?;
            writeln!(out, "Ends with malloc error")?;
            Ok(ExitCode::from(2))
        }
        Err(RunError::Io(error)) => Err(error.into()),
    }
}
