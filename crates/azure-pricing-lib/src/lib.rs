//! Azure Retail Prices client library.
//!
//! This crate exposes a typed client for the public Azure Retail Prices REST
//! API: query construction with OData filters, pagination over continuation
//! links, and currency selection. Higher-level consumers (the MCP server and
//! the CLI) should only depend on the types exported here instead of talking
//! to the API themselves.

#![deny(warnings)]

pub mod error;
pub mod model;
pub mod retail;

pub use error::{Error, Result};
pub use model::{PriceResponsePage, PriceType, RetailPrice, SavingsPlanPrice};
pub use retail::{PriceQuery, PriceSearchResults, RetailPriceClient, DEFAULT_RESULT_LIMIT};
