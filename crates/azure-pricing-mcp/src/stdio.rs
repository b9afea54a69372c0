//! Stdio transport: line-delimited JSON-RPC on stdin/stdout.
//!
//! Logging must go to stderr in this mode so stdout carries only protocol
//! frames.

use anyhow::{Context, Result};
use tokio::io::{stdin, stdout, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::select;
use tokio::signal;
use tracing::{error, info};

use crate::server::McpServer;

/// Stdio transport using tokio async I/O.
pub struct StdioTransport {
    reader: BufReader<tokio::io::Stdin>,
    writer: tokio::io::Stdout,
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl StdioTransport {
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(stdin()),
            writer: stdout(),
        }
    }

    /// Read a single line. Returns Ok(None) on EOF.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let bytes = self
            .reader
            .read_line(&mut line)
            .await
            .context("failed to read line from stdin")?;
        if bytes == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    // Helper to map std::io::Result into anyhow::Result while preserving
    // BrokenPipe as io::Error so callers can detect disconnects.
    fn check_io<T>(res: std::io::Result<T>) -> Result<T> {
        match res {
            Ok(v) => Ok(v),
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "Client disconnected",
            )
            .into()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn write_line(&mut self, message: &str) -> Result<()> {
        Self::check_io(self.writer.write_all(message.as_bytes()).await)?;
        Self::check_io(self.writer.write_all(b"\n").await)?;
        Self::check_io(self.writer.flush().await)?;
        Ok(())
    }
}

fn is_broken_pipe(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<std::io::Error>()
        .map(|ioe| ioe.kind() == std::io::ErrorKind::BrokenPipe)
        .unwrap_or(false)
}

/// Run the server loop: read messages from stdin and respond on stdout.
pub async fn run_loop(mut transport: StdioTransport, server: McpServer) -> Result<()> {
    info!("MCP server reading from stdin and writing to stdout");

    loop {
        select! {
            _ = signal::ctrl_c() => {
                info!("Received shutdown signal, exiting gracefully");
                break;
            }

            line = transport.read_line() => {
                match line {
                    Ok(Some(raw)) => {
                        let trimmed = raw.trim();
                        if trimmed.is_empty() {
                            continue;
                        }

                        if let Some(response) = server.process_message(trimmed).await {
                            if let Err(e) = transport.write_line(&response).await {
                                if is_broken_pipe(&e) {
                                    info!("Client disconnected (broken pipe)");
                                    break;
                                }
                                return Err(e);
                            }
                        }
                    }
                    Ok(None) => {
                        info!("Client disconnected (EOF)");
                        break;
                    }
                    Err(e) => {
                        error!("Transport error: {}", e);
                        return Err(e);
                    }
                }
            }
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Public entrypoint for the stdio transport.
pub async fn run_stdio_server(server: McpServer) -> Result<()> {
    let transport = StdioTransport::new();
    run_loop(transport, server).await
}
