#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
pub fn run() -> Result<(), crate::error::AppError> {
    use crate::adapters::cli::{Args, execute, init_logging, load_assumptions};

    let args = Args::parse();
    init_logging(args.verbose)?;
    let ass = load_assumptions(&args)?;

    let out = execute(&args.command, &ass)?;

    crate::adapters::cli::print_output(&out, &args, &ass)?;

    Ok(())
}
