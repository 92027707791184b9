use clap::Parser;
use tracing_subscriber::EnvFilter;
use warden::cli::{output, Cli};
use warden::supervisor::{Outcome, Supervisor};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let mut supervisor = Supervisor::new(config);
    let outcome = match supervisor.run().await {
        Ok(outcome) => outcome,
        Err(e) => {
            output::print_error(&e.to_string());
            std::process::exit(1);
        }
    };

    match outcome {
        Outcome::Clean => output::print_success("Worker exited cleanly"),
        Outcome::Interrupted => output::print_info("Stopped by operator"),
        Outcome::Maintenance => output::print_info("Maintenance complete"),
        Outcome::WorkerFailed => output::print_error("Worker exited with failure"),
        Outcome::WatchdogTimeout => output::print_error("Watchdog timeout exceeded"),
        Outcome::Fault => output::print_error("Supervision ended on an unexpected fault"),
    }

    std::process::exit(outcome.exit_code());
}
