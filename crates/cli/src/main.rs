use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    adpilot_cli::run().await
}
