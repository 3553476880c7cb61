//! Command-line interface.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::documents::{DocumentKind, LoadedDocument};
use crate::llm::provider::LLM;
use crate::models::AppState;
use crate::routes::create_router;

#[derive(Debug, Parser)]
#[command(name = "docchat", version, about = "Ask questions about a PDF or DOCX document")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Command {
    /// Run the chat web server (default)
    Serve {
        /// Bind address, overrides HOST
        #[arg(long)]
        host: Option<String>,
        /// Listen port, overrides PORT
        #[arg(long, short)]
        port: Option<u16>,
    },
    /// Print the text extracted from a PDF or DOCX file
    Extract {
        path: PathBuf,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Serve { host: None, port: None }
    }
}

pub async fn run(cli: Cli, mut config: Config) -> Result<()> {
    match cli.command.unwrap_or_default() {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Command::Extract { path } => {
            let text = extract_file(&path).await?;
            print!("{}", text);
            Ok(())
        }
    }
}

pub async fn serve(config: Config) -> Result<()> {
    info!(server = ?config.server, llm = ?config.llm, "Configuration loaded");

    let llm = LLM::from_config(&config.llm)?;
    let host = config.server.host.clone();
    let port = config.server.port;

    let state = AppState::new(config, llm);
    let app = create_router(state);

    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

pub async fn extract_file(path: &Path) -> Result<String> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let kind = DocumentKind::detect(None, Some(&filename))
        .with_context(|| format!("{} is not a PDF or DOCX file", path.display()))?;

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = tokio::task::spawn_blocking(move || LoadedDocument::load(filename, kind, &bytes)).await??;

    info!(
        kind = %document.kind,
        size = document.size,
        text_len = document.text.len(),
        "Extracted document text"
    );
    Ok(document.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_serve() {
        let cli = Cli::try_parse_from(["docchat"]).unwrap();
        assert_eq!(cli.command.unwrap_or_default(), Command::Serve { host: None, port: None });
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["docchat", "serve", "--host", "0.0.0.0", "-p", "8080"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Serve {
                host: Some("0.0.0.0".to_string()),
                port: Some(8080)
            })
        );
    }

    #[test]
    fn test_parse_extract() {
        let cli = Cli::try_parse_from(["docchat", "extract", "report.pdf"]).unwrap();
        assert_eq!(cli.command, Some(Command::Extract { path: PathBuf::from("report.pdf") }));
    }

    #[tokio::test]
    async fn test_extract_file_reads_docx() {
        let dir = std::env::temp_dir().join(format!("docchat-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("minutes.docx");
        let bytes = crate::documents::docx::fixtures::docx_with_paragraphs(&["Minutes", "Approved."]);
        tokio::fs::write(&path, bytes).await.unwrap();

        let text = extract_file(&path).await.unwrap();
        assert_eq!(text, "Minutes\nApproved.");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_extract_file_rejects_unknown_extension() {
        let err = extract_file(Path::new("notes.txt")).await.unwrap_err();
        assert!(err.to_string().contains("not a PDF or DOCX"));
    }
}
