//! `ostrich-console`: raw query console against an OstrichDB backend.
//!
//! Usage: `ostrich-console <project>`. Each input line is run as one query.

use anyhow::{Context, Result, bail};
use ostrichdb_dashboard::backend::{EnvTokenProvider, HttpBackend};
use ostrichdb_dashboard::config::ClientConfig;
use ostrichdb_dashboard::observability;
use ostrichdb_dashboard::services::QueryService;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

const HELP: &str = "Commands: :history, :clear, :quit. Anything else is sent as a query.";

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    observability::init_tracing();

    let Some(project) = std::env::args().nth(1) else {
        bail!("usage: ostrich-console <project>");
    };

    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    info!("Connecting to {} (project '{}')", config.base_url, project);
    let backend = HttpBackend::new(config, Arc::new(EnvTokenProvider::default()))
        .context("Failed to create HTTP backend")?;
    let mut console = QueryService::new(Arc::new(backend), project);

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    stdout.write_all(format!("{}\n", HELP).as_bytes()).await?;

    loop {
        stdout
            .write_all(format!("{}> ", console.project()).as_bytes())
            .await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        let output = match line.trim() {
            ":quit" | ":q" => break,
            ":clear" => {
                console.clear_history();
                "History cleared\n".to_string()
            }
            ":history" => {
                let mut out = String::new();
                for (i, entry) in console.history().iter().enumerate() {
                    let status = if entry.success { "ok" } else { "failed" };
                    out.push_str(&format!(
                        "{:>3}  {}  [{}]  {}\n",
                        i + 1,
                        entry.timestamp.format("%H:%M:%S"),
                        status,
                        entry.query
                    ));
                }
                out
            }
            ":help" => format!("{}\n", HELP),
            query => match console.execute(query).await {
                None => continue,
                Some(outcome) => {
                    let mut out = serde_json::to_string_pretty(&outcome.result)?;
                    out.push('\n');
                    if let Some(error) = &outcome.error {
                        out.push_str(&format!("Error: {}\n", error));
                    }
                    out
                }
            },
        };

        stdout.write_all(output.as_bytes()).await?;
    }

    Ok(())
}
