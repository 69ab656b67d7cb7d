//! Foreign-call oracle server for SHA-512 / SHA-384.
//!
//! Listens on `PORT` (default 8095) and serves until Ctrl-C or SIGTERM.

use sha_oracle::logging::init_tracing;
use sha_oracle::net::run_oracle_server;
use sha_oracle::OracleConfig;

fn fatal(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    if let Err(err) = init_tracing() {
        fatal(&format!("failed to initialise logging: {err}"));
    }
    let cfg = match OracleConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => fatal(&format!("invalid configuration: {err}")),
    };
    tracing::info!(
        target: "oracle",
        listen = %cfg.listen,
        request_timeout_ms = cfg.request_timeout.as_millis() as u64,
        "starting sha oracle"
    );
    if let Err(err) = run_oracle_server(cfg).await {
        fatal(&format!("oracle server failed: {err}"));
    }
    tracing::info!(target: "oracle", "oracle server stopped");
}
