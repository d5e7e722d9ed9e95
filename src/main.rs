use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match pacer::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pacer: {err:#}");
            ExitCode::FAILURE
        }
    }
}
