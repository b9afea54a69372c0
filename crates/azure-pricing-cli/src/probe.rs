//! SSE probe client.
//!
//! Behaves like an MCP SSE client far enough to list the server's tools:
//! opens the event stream, reads the endpoint event to learn the POST URL
//! (which includes the session id), sends initialize + tools/list requests
//! to that endpoint, and collects the tools from the response.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::time::timeout;
use tracing::debug;
use url::Url;

const INIT_ID: &str = "init-1";
const LIST_ID: &str = "list-1";

/// Options for the list-tools probe.
pub struct ProbeOptions {
    pub base_url: String,
    pub sse_path: String,
    pub protocol_version: String,
    /// Connect timeout.
    pub timeout: Duration,
    /// Overall deadline for the whole handshake.
    pub max_wait: Duration,
    pub verbose: bool,
}

/// A tool reported by the server.
pub struct ToolSummary {
    pub name: String,
    pub description: String,
}

/// A parsed SSE event.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SseEvent {
    name: String,
    data: String,
}

/// Minimal incremental SSE parser.
///
/// Events are dispatched on blank lines; comment lines (leading colon) are
/// heartbeats and are dropped. Events without an explicit name default to
/// "message".
struct SseParser {
    buffer: String,
}

impl SseParser {
    fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    fn push(&mut self, chunk: &str) -> Vec<SseEvent> {
        self.buffer.push_str(&chunk.replace("\r\n", "\n"));

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.find("\n\n") {
            let block: String = self.buffer[..pos].to_string();
            self.buffer.drain(..pos + 2);
            if let Some(event) = parse_block(&block) {
                events.push(event);
            }
        }
        events
    }
}

fn parse_block(block: &str) -> Option<SseEvent> {
    let mut name = None;
    let mut data_lines = Vec::new();

    for line in block.lines() {
        if line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("event:") {
            name = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.trim().to_string());
        }
    }

    if name.is_none() && data_lines.is_empty() {
        return None;
    }
    Some(SseEvent {
        name: name.unwrap_or_else(|| "message".to_string()),
        data: data_lines.join("\n"),
    })
}

/// Open the SSE stream and list the server's tools.
pub async fn list_tools(options: &ProbeOptions) -> Result<Vec<ToolSummary>> {
    let base = Url::parse(&options.base_url).context("invalid base URL")?;
    let sse_url = base
        .join(&options.sse_path)
        .context("invalid SSE path")?;

    let client = Client::builder()
        .connect_timeout(options.timeout)
        .build()
        .context("failed to build HTTP client")?;

    debug!(url = %sse_url, "opening SSE stream");
    let response = client
        .get(sse_url.clone())
        .header(ACCEPT, "text/event-stream")
        .send()
        .await
        .with_context(|| format!("failed to open SSE stream at {}", sse_url))?
        .error_for_status()
        .context("SSE request failed")?;

    let flow = run_flow(&client, &base, options, response);
    match timeout(options.max_wait, flow).await {
        Ok(result) => result,
        Err(_) => bail!(
            "timed out after {:.0}s waiting for tools response",
            options.max_wait.as_secs_f64()
        ),
    }
}

async fn run_flow(
    client: &Client,
    base: &Url,
    options: &ProbeOptions,
    response: reqwest::Response,
) -> Result<Vec<ToolSummary>> {
    let mut stream = Box::pin(response.bytes_stream());
    let mut parser = SseParser::new();
    let mut message_url: Option<Url> = None;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("error reading SSE stream")?;
        for event in parser.push(&String::from_utf8_lossy(&chunk)) {
            if options.verbose {
                println!("[event={}] {}", event.name, event.data);
            }

            match event.name.as_str() {
                "endpoint" if message_url.is_none() => {
                    let url = base
                        .join(event.data.trim())
                        .context("invalid endpoint path in SSE event")?;
                    if options.verbose {
                        println!("Resolved message URL: {}", url);
                    }

                    post_json(
                        client,
                        url.clone(),
                        json!({
                            "jsonrpc": "2.0",
                            "id": INIT_ID,
                            "method": "initialize",
                            "params": {
                                "protocolVersion": options.protocol_version,
                                "capabilities": {},
                                "clientInfo": {
                                    "name": "azure-pricing-cli",
                                    "version": env!("CARGO_PKG_VERSION"),
                                },
                            },
                        }),
                    )
                    .await?;

                    post_json(
                        client,
                        url.clone(),
                        json!({
                            "jsonrpc": "2.0",
                            "id": LIST_ID,
                            "method": "tools/list",
                            "params": {},
                        }),
                    )
                    .await?;

                    message_url = Some(url);
                }
                "message" => {
                    let value: Value = match serde_json::from_str(&event.data) {
                        Ok(value) => value,
                        Err(_) => {
                            debug!(data = %event.data, "ignoring non-JSON message event");
                            continue;
                        }
                    };

                    if value["id"] != json!(LIST_ID) {
                        continue;
                    }
                    if let Some(error) = value.get("error") {
                        bail!("server returned error for tools/list: {}", error);
                    }
                    if let Some(tools) = value["result"]["tools"].as_array() {
                        return Ok(tools
                            .iter()
                            .map(|tool| ToolSummary {
                                name: tool["name"].as_str().unwrap_or("<unknown>").to_string(),
                                description: tool["description"]
                                    .as_str()
                                    .unwrap_or("(no description)")
                                    .to_string(),
                            })
                            .collect());
                    }
                }
                _ => {}
            }
        }
    }

    bail!("SSE stream ended before tools were received")
}

async fn post_json(client: &Client, url: Url, body: Value) -> Result<()> {
    let response = client
        .post(url)
        .json(&body)
        .send()
        .await
        .context("failed to post message")?;
    if !response.status().is_success() {
        bail!("message endpoint returned {}", response.status());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_dispatches_on_blank_line() {
        let mut parser = SseParser::new();
        let events = parser.push("event: endpoint\ndata: /messages?session_id=abc\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "endpoint");
        assert_eq!(events[0].data, "/messages?session_id=abc");
    }

    #[test]
    fn test_parser_defaults_event_name_to_message() {
        let mut parser = SseParser::new();
        let events = parser.push("data: {\"jsonrpc\":\"2.0\"}\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "message");
    }

    #[test]
    fn test_parser_skips_comment_heartbeats() {
        let mut parser = SseParser::new();
        let events = parser.push(": keep-alive\n\ndata: hello\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "hello");
    }

    #[test]
    fn test_parser_joins_multiline_data() {
        let mut parser = SseParser::new();
        let events = parser.push("data: first\ndata: second\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "first\nsecond");
    }

    #[test]
    fn test_parser_reassembles_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.push("event: mess").is_empty());
        assert!(parser.push("age\ndata: par").is_empty());
        let events = parser.push("tial\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "message");
        assert_eq!(events[0].data, "partial");
    }

    #[test]
    fn test_parser_handles_crlf() {
        let mut parser = SseParser::new();
        let events = parser.push("event: endpoint\r\ndata: /messages\r\n\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "endpoint");
        assert_eq!(events[0].data, "/messages");
    }

    #[test]
    fn test_parser_emits_multiple_events_from_one_chunk() {
        let mut parser = SseParser::new();
        let events = parser.push("data: one\n\ndata: two\n\n");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data, "one");
        assert_eq!(events[1].data, "two");
    }
}
