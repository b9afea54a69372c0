//! MCP (Model Context Protocol) server for Azure Retail Prices
//!
//! This crate exposes Azure retail price lookups to AI assistants via the
//! Model Context Protocol, using JSON-RPC 2.0 message format over one of two
//! transports:
//!
//! - `stdio`: line-delimited messages on stdin/stdout, logging to stderr
//! - `sse`: HTTP Server-Sent Events stream plus a POST message endpoint
//!
//! # Architecture
//!
//! - `protocol`: JSON-RPC and MCP message types
//! - `server`: request dispatch shared by both transports
//! - `tools`: tool implementations (price_search, sku_discover)
//! - `stdio` / `sse`: transport loops
//! - `config`: environment-driven runtime configuration
//! - `logging`, `health`, `problem`: service plumbing

#![deny(warnings)]

pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod problem;
pub mod protocol;
pub mod server;
pub mod sse;
pub mod stdio;
pub mod tools;
pub mod types;

pub use config::{ServerConfig, TransportKind};
pub use error::{error_codes, ErrorObject};
pub use server::McpServer;
