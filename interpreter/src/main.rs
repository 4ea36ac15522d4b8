use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use stackmachine_lib::core::{Program, Value};
use stackmachine_lib::{load_with, vm, DecodePolicy};

use std::path::PathBuf;

#[cfg(feature = "dev")]
mod debugger;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    script: PathBuf,

    /// skip unknown instructions and stray tokens instead of failing
    #[arg(short = 'l', long)]
    lenient: bool,

    /// log every executed instruction together with the stack
    #[arg(long)]
    trace: bool,

    #[cfg(feature = "dev")]
    #[arg(short = 't', long)]
    show_tokens: bool,

    #[cfg(feature = "dev")]
    #[arg(short = 'i', long)]
    show_instructions: bool,

    #[cfg(feature = "dev")]
    #[arg(short = 'b', long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.trace)?;

    let src = std::fs::read_to_string(&cli.script)
        .with_context(|| format!("reading {}", cli.script.display()))?;
    debug!(script = %cli.script.display(), bytes = src.len(), "read script");

    #[cfg(feature = "dev")]
    if cli.show_tokens {
        for token in stackmachine_lib::lexer::tokenize(&src)? {
            println!("{}: {} {}", token.at, token.kind, token);
        }
        return Ok(());
    }

    let policy = if cli.lenient {
        DecodePolicy::Lenient
    } else {
        DecodePolicy::Strict
    };
    let program = match load_with(&src, policy) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    #[cfg(feature = "dev")]
    if cli.show_instructions {
        for line in program.listing(0) {
            println!("{}", line);
        }
        return Ok(());
    }

    #[cfg(feature = "dev")]
    if cli.debug {
        use crossterm::{self as ct, terminal};
        let mut stdout = std::io::stdout();
        ct::execute!(stdout, terminal::EnterAlternateScreen)?;
        let res = debugger::run(&program, &src, &mut stdout);
        ct::execute!(stdout, terminal::LeaveAlternateScreen)?;
        return res;
    }

    match run(&program) {
        Ok(stack) => {
            debug!(depth = stack.len(), "printing final stack");
            for value in stack {
                println!("{}", value);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Default level is `warn`, `RUST_LOG` overrides it. `--trace` turns on the per instruction
/// events of the library on top of whatever `RUST_LOG` says
fn init_logging(trace: bool) -> Result<()> {
    let mut filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    if trace {
        filter = filter.add_directive("stackmachine_lib=trace".parse()?);
    }
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

/// runs the program and returns the final stack top first
pub fn run(program: &Program) -> Result<Vec<Value>, String> {
    vm::execute(program).map_err(|e| describe_runtime_error(program, &e))
}

pub fn describe_runtime_error(program: &Program, e: &vm::Error) -> String {
    match e {
        vm::Error::At { pc, source } => match (program.get(*pc), program.location(*pc)) {
            (Some(instruction), Some(at)) => {
                format!("Runtime error: {}: `{}`: {}", at, instruction, source)
            }
            _ => format!("Runtime error: {}", e),
        },
        other => format!("VM-Error: {}", other),
    }
}
