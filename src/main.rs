use std::sync::Arc;

use anyhow::Result;

use routelog::config::{self, Config};
use routelog::logging::{self, Dispatcher, Routes};
use routelog::{http, log_debug, log_error, log_info, log_raw};

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr so they never interleave with console lines
    logging::init_diagnostics()?;

    let config = Config::load()?;
    tracing::debug!("Loaded config from {}", config::config_file_path().display());

    let dispatcher = Dispatcher::shared(config.dispatcher_settings());
    dispatcher.flush_on_panic();
    log_debug!(
        dispatcher,
        routes = Routes::SAVE,
        "Routing ceiling %s, floor %s",
        dispatcher.ceiling().to_string(),
        dispatcher.floor().to_string()
    );

    if let Some(path) = dispatcher.open_log_file() {
        log_info!(dispatcher, "Logging to: %s", path.display().to_string());
    }

    let server = http::start(config.server_port, Arc::clone(&dispatcher)).await;
    let server = match server {
        Ok(handle) => handle,
        Err(e) => {
            log_error!(dispatcher, "Failed to start log server: %s", e.to_string());
            dispatcher.shutdown();
            return Err(e);
        }
    };

    log_raw!(
        dispatcher,
        routes = Routes::PRINT,
        "Press Ctrl-C to stop (session at http://%s/session)\n",
        server.addr().to_string()
    );

    wait_for_shutdown_signal().await?;

    log_info!(
        dispatcher,
        "Stopping after %d session entries",
        dispatcher.session_len()
    );
    server.shutdown()?;
    dispatcher.shutdown();
    Ok(())
}

/// Resolve on Ctrl-C, or on SIGTERM where available
async fn wait_for_shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => tracing::debug!("Received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
