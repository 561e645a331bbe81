//! Binary entry point: a file runner when given a script path, a REPL
//! otherwise, each line parsed and executed as a complete program.
extern crate glint;

mod cli;

use std::io::{self, BufRead, Write};

use cli::Cli;
use glint::{run_file, run_source, GlintError};
use log::error;

fn main() {
    let args = Cli::init();
    simple_logger::init_with_level(args.verbosity.into()).expect("logger is only initialized once");

    let exit_code = match args.script {
        Some(path) => match run_file(&path) {
            Ok(()) => 0,
            Err(err) => {
                report(&err, std::fs::read_to_string(&path).ok().as_deref());
                1
            }
        },
        None => {
            run_repl();
            0
        }
    };

    std::process::exit(exit_code);
}

fn run_repl() {
    let stdin = io::stdin();
    print!("> ");
    let _ = io::stdout().flush();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if let Err(err) = run_source(&line) {
            report(&err, Some(&line));
        }
        print!("> ");
        let _ = io::stdout().flush();
    }
}

/// Prints the diagnostic format from the error-reporting contract: a
/// `KindName: message` line, followed by `   line:column | <source line>`
/// when the failing position names a source line we can recover.
fn report(err: &GlintError, source: Option<&str>) {
    error!("{err}");
    let Some(position) = err.position() else { return };
    if position.filename.is_none() {
        return;
    }
    let Some(source) = source else { return };
    if let Some(line) = source.lines().nth(position.line.saturating_sub(1) as usize) {
        eprintln!("   {}:{} | {line}", position.line, position.column);
    }
}
