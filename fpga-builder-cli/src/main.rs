use clap::Parser;
use fpga_builder::console;
use fpga_builder_cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match fpga_builder_cli::run(cli) {
        Ok(code) => code,
        Err(err) => {
            console::err(format_args!("✗ {err:#}"));
            ExitCode::from(fpga_builder_cli::exit_code(&err))
        }
    }
}
