use ethscan_cli::{commands, Cli, Commands};
use std::io;
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_ansi(!cli.no_color)
        .with_writer(io::stderr)
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match &cli.command {
        Commands::Scan(args) => commands::scan(args, &mut out).map(|_| ()),
        Commands::Gen(args) => commands::generate(args, &mut out),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
