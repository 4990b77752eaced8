// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform Extras host
//
// Entry point. Initialises logging and configuration, starts the bridge, then
// serves line-delimited JSON requests from stdin and writes every response
// (terminal and keep-alive) to stdout. Logs go to stderr.

mod services;
mod wire;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use extras_bridge::{Bridge, Responses};
use extras_core::error::Result;
use extras_core::API_VERSION;

use services::config_file::{self, CONFIG_FILE};
use services::data_dir::data_dir;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(api_version = API_VERSION, "Platform Extras host starting");

    if let Err(e) = run().await {
        tracing::error!(error = %e, "host stopped with an error");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let dir = data_dir();
    let config = config_file::load_config(&dir);
    if !dir.join(CONFIG_FILE).exists() {
        if let Err(e) = config_file::persist_config(&dir, &config) {
            tracing::warn!(error = %e, "could not write default config");
        }
    }
    tracing::debug!(?config, "bridge config");

    let (bridge, main_loop, responses) =
        Bridge::new(extras_bridge::platform_services(), config)?;
    let main_task = tokio::spawn(main_loop.run());
    let writer = tokio::spawn(write_responses(responses));

    read_requests(&bridge).await?;

    // Closing the last handle lets the main loop drain and tear down watchers;
    // the writer ends once every responder is gone.
    drop(bridge);
    let _ = main_task.await;
    match writer.await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "response writer panicked");
            Ok(())
        }
    }
}

async fn read_requests(bridge: &Bridge) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no: u64 = 0;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        match wire::decode_request(&line) {
            Ok(Some(request)) => bridge.invoke(request),
            Ok(None) => {}
            Err(e) => tracing::warn!(line = line_no, error = %e, "skipping malformed request"),
        }
    }
    tracing::info!(lines = line_no, "stdin closed");
    Ok(())
}

async fn write_responses(mut responses: Responses) -> Result<()> {
    let mut out = tokio::io::stdout();
    while let Some(response) = responses.recv().await {
        let line = wire::encode_response(&response)?;
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
    }
    Ok(())
}
