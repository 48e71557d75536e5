pub mod analytics;
pub mod app;
pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod middleware;
pub mod predictions;
pub mod simulator;
pub mod state;
pub mod trash;
pub mod upstream;
pub mod weather;

#[cfg(test)]
mod testing;

/// Installs the global subscriber. `RUST_LOG` overrides `default_filter`;
/// `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing(default_filter: &str) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}
