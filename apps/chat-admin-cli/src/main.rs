#![expect(clippy::print_stderr, clippy::exit)]

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = chat_admin_cli::run() {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}
