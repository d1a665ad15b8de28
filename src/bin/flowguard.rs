use anyhow::Result;
use clap::Parser;
use std::io::Write;

use flowguard::cli::args::CliArgs;
use flowguard::cli::driver;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURES_REPORTED: i32 = 1;

fn main() -> Result<()> {
    // Installs a subscriber only when FLOWGUARD_LOG or RUST_LOG is set.
    flowguard::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let report = driver::run(&args)?;
    let rendered = driver::render(&report, args.format, args.show_ranking)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    if !rendered.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;

    if report.has_failures() {
        std::process::exit(EXIT_FAILURES_REPORTED);
    }
    std::process::exit(EXIT_SUCCESS);
}
