use std::process::ExitCode;

fn main() -> ExitCode {
    esim_catalog_cli::run()
}
