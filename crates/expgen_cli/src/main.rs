//! expgen CLI entry point
//!
//! Parses arguments, runs one command and exits with its code:
//! 0 success, 53 compiled with warnings, 2 failed, 1 when the command
//! could not run.

mod cli;

fn main() {
    match cli::run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(e.exit_code());
        }
    }
}
