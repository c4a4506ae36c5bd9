//! Cogito CLI - browse and edit saved thought graphs

mod cli;
mod render;

use clap::Parser;

fn main() {
    let cli_args = cli::Cli::parse();

    // Environment variables override the flags
    cli::setup_logging(&cli_args);

    let result = cli::CogitoApp::from_cli(&cli_args).and_then(|app| {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        app.run(cli_args.command, &mut out)
    });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
