//! Convert an EPS plot to PDF through the external formatter.
//!
//! Thin wrapper around [`skypol::plot::format_to_pdf`]: validates the
//! input path, delegates, and exits with the formatter's own status.

use clap::error::ErrorKind;
use clap::Parser;
use skypol::plot::format_to_pdf;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "eps2pdf", version, about = "Convert an EPS plot to PDF")]
struct Args {
    /// Input EPS file
    input: PathBuf,

    /// Output PDF file
    output: PathBuf,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            eprintln!("usage: eps2pdf <input-file> <output-file>");
            return ExitCode::FAILURE;
        }
    };

    match format_to_pdf(&args.input, &args.output) {
        Ok(status) => match status.code() {
            Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
            // Killed by a signal.
            None => ExitCode::FAILURE,
        },
        Err(err) => {
            eprintln!("eps2pdf: {err}");
            ExitCode::FAILURE
        }
    }
}
