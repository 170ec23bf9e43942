use std::env;
use tsh::flags::Flags;
use tsh::shell::Shell;

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<(), tsh::error::ShellError> {
    let mut flags = Flags::new();
    let args: Vec<String> = env::args().skip(1).collect();
    flags.parse(&args)?;

    if flags.is_set("help") {
        flags.print_help();
        return Ok(());
    }

    if flags.is_set("version") {
        println!("tsh {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_tracing(flags.is_set("debug"));
    tracing::debug!("starting tsh {}", env!("CARGO_PKG_VERSION"));

    let mut shell = Shell::new(flags)?;
    shell.run()
}
