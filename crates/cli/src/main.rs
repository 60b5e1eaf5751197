use std::process::ExitCode;

fn main() -> ExitCode {
    kfzroute_cli::run()
}
