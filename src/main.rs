use clap::Parser;
use fim_eval::{Cli, execute, exit_code, init_tracing};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = execute(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(exit_code(&err));
    }
}
