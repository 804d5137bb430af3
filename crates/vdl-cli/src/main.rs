use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    match cli::run_from_args() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("video-dl error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
