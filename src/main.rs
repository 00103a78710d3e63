use clap::Parser;

/// Entry point of the `ifmon` command-line tool.
///
/// Log verbosity is controlled through `RUST_LOG`.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug ifmon check --state-file /var/lib/ifmon/state.json
/// ```
fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = ifmon::cli::Args::parse();
    ifmon::run(args, &mut std::io::stdout().lock())?;
    Ok(())
}
