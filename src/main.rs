use std::process::ExitCode;

use clap::Parser;

#[derive(Parser)]
#[command(name = "smithy-ls", version, about = "Smithy Language Server")]
struct Cli {
    /// Port to serve on; 0 (the default) uses stdio
    #[arg(value_name = "port_number")]
    port_number: Option<u16>,

    /// Port to serve on; 0 means stdio
    #[arg(short = 'p', long = "port-number", conflicts_with = "port_number")]
    port: Option<u16>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let port = cli.port.or(cli.port_number).unwrap_or(0);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!(
                "{:?}",
                miette::Report::msg(format!("failed to start async runtime: {e}"))
            );
            return ExitCode::from(1);
        }
    };

    if port == 0 {
        runtime.block_on(smithy_ls::server::run_stdio());
        ExitCode::SUCCESS
    } else {
        match runtime.block_on(smithy_ls::server::run_tcp(port)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!(
                    "{:?}",
                    miette::Report::msg(format!("failed to serve on port {port}: {e}"))
                );
                ExitCode::from(1)
            }
        }
    }
}
