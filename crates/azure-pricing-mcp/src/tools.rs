//! MCP tool implementations backed by the retail prices client
//!
//! Two tools are exposed:
//! - price_search: filtered retail price lookup
//! - sku_discover: enumerate distinct SKUs of a service with sampled prices

use std::collections::HashMap;

use azure_pricing_lib::{PriceQuery, PriceType, RetailPriceClient};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::ErrorObject;
use crate::protocol::{CallToolParams, CallToolResult, ContentBlock, ToolDefinition};
use crate::types::{
    PriceItem, PriceSearchInput, PriceSearchOutput, SkuDiscoverInput, SkuDiscoverOutput, SkuSample,
    SkuSummary,
};

pub const PRICE_SEARCH_TOOL: &str = "price_search";
pub const SKU_DISCOVER_TOOL: &str = "sku_discover";

/// Largest limit a tool call may request.
const MAX_TOOL_LIMIT: usize = 100;

/// SKU samples kept per SKU by sku_discover.
const MAX_SKU_SAMPLES: usize = 5;

/// Definitions advertised through `tools/list`.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: PRICE_SEARCH_TOOL.to_string(),
            description: "Search Azure retail prices by service, SKU, region, price type \
                          and currency. Returns formatted price records including any \
                          savings plan rates."
                .to_string(),
            input_schema: schema_value(serde_json::to_value(schemars::schema_for!(
                PriceSearchInput
            ))),
        },
        ToolDefinition {
            name: SKU_DISCOVER_TOOL.to_string(),
            description: "Enumerate distinct SKUs offered by an Azure service, each with \
                          sampled region prices."
                .to_string(),
            input_schema: schema_value(serde_json::to_value(schemars::schema_for!(
                SkuDiscoverInput
            ))),
        },
    ]
}

fn schema_value(schema: Result<Value, serde_json::Error>) -> Value {
    schema.unwrap_or_else(|_| json!({"type": "object"}))
}

/// Dispatch a `tools/call` request to the matching handler.
pub async fn handle_call(
    params: CallToolParams,
    client: &RetailPriceClient,
) -> Result<CallToolResult, ErrorObject> {
    match params.name.as_str() {
        PRICE_SEARCH_TOOL => {
            let input = deserialize_arguments(params.arguments, PRICE_SEARCH_TOOL)?;
            run_price_search(input, client).await
        }
        SKU_DISCOVER_TOOL => {
            let input = deserialize_arguments(params.arguments, SKU_DISCOVER_TOOL)?;
            run_sku_discover(input, client).await
        }
        other => Err(ErrorObject::invalid_params(format!(
            "Unknown tool: {}",
            other
        ))),
    }
}

fn deserialize_arguments<T: serde::de::DeserializeOwned>(
    arguments: Option<Value>,
    tool: &str,
) -> Result<T, ErrorObject> {
    let value = arguments.unwrap_or_else(|| json!({}));
    serde_json::from_value(value)
        .map_err(|e| ErrorObject::invalid_params(format!("Invalid arguments for {}: {}", tool, e)))
}

async fn run_price_search(
    input: PriceSearchInput,
    client: &RetailPriceClient,
) -> Result<CallToolResult, ErrorObject> {
    validate_limit(input.limit)?;

    let price_type = match input.price_type.as_deref().map(str::trim) {
        Some("") | None => None,
        Some(raw) => Some(raw.parse::<PriceType>().map_err(|e| {
            ErrorObject::invalid_params(format!("Invalid price_type: {}", e))
        })?),
    };

    info!(
        service = input.service_name.as_deref().unwrap_or(""),
        sku = input.sku_name.as_deref().unwrap_or(""),
        region = input.region.as_deref().unwrap_or(""),
        limit = input.limit,
        "price_search"
    );

    let mut query = PriceQuery::new().limit(input.limit);
    if let Some(service_name) = input.service_name {
        query = query.service_name(service_name);
    }
    if let Some(service_family) = input.service_family {
        query = query.service_family(service_family);
    }
    if let Some(sku_name) = input.sku_name {
        query = query.sku_name(sku_name);
    }
    if let Some(region) = input.region {
        query = query.region(region);
    }
    if let Some(price_type) = price_type {
        query = query.price_type(price_type);
    }
    if let Some(currency_code) = input.currency_code {
        query = query.currency_code(currency_code);
    }

    let results = match client.search(&query).await {
        Ok(results) => results,
        Err(e) => {
            return Ok(CallToolResult::failure(format!(
                "Retail price lookup failed: {}",
                e
            )))
        }
    };

    let output = PriceSearchOutput {
        count: results.count,
        currency: results.currency,
        items: results.items.iter().map(PriceItem::from).collect(),
    };

    result_to_call_result(&output)
}

async fn run_sku_discover(
    input: SkuDiscoverInput,
    client: &RetailPriceClient,
) -> Result<CallToolResult, ErrorObject> {
    validate_limit(input.limit)?;
    if input.service_name.trim().is_empty() {
        return Err(ErrorObject::invalid_params(
            "service_name is required and cannot be empty",
        ));
    }

    info!(service = %input.service_name, limit = input.limit, "sku_discover");

    let query = PriceQuery::new()
        .service_name(input.service_name.clone())
        .limit(input.limit);

    let results = match client.search(&query).await {
        Ok(results) => results,
        Err(e) => {
            return Ok(CallToolResult::failure(format!(
                "Retail price lookup failed: {}",
                e
            )))
        }
    };

    // Aggregate by SKU, preserving first-appearance order.
    let mut order: Vec<String> = Vec::new();
    let mut samples: HashMap<String, Vec<SkuSample>> = HashMap::new();
    for record in &results.items {
        if record.sku_name.is_empty() {
            continue;
        }
        let entry = samples.entry(record.sku_name.clone()).or_insert_with(|| {
            order.push(record.sku_name.clone());
            Vec::new()
        });
        if entry.len() < MAX_SKU_SAMPLES {
            entry.push(SkuSample {
                region: record.arm_region_name.clone(),
                price: record.retail_price,
                unit: record.unit_of_measure.clone(),
                meter: record.meter_name.clone(),
            });
        }
    }

    debug!(
        fetched = results.count,
        skus = order.len(),
        "aggregated sku samples"
    );

    let skus: Vec<SkuSummary> = order
        .into_iter()
        .map(|sku| {
            let sku_samples = samples.remove(&sku).unwrap_or_default();
            SkuSummary {
                sku,
                samples: sku_samples,
            }
        })
        .collect();

    let output = SkuDiscoverOutput {
        service_name: input.service_name,
        fetched: results.count,
        sku_count: skus.len(),
        skus,
    };

    result_to_call_result(&output)
}

fn validate_limit(limit: usize) -> Result<(), ErrorObject> {
    if limit == 0 {
        return Err(ErrorObject::invalid_params("limit must be at least 1"));
    }
    if limit > MAX_TOOL_LIMIT {
        return Err(ErrorObject::invalid_params(format!(
            "limit cannot exceed {}",
            MAX_TOOL_LIMIT
        )));
    }
    Ok(())
}

fn result_to_call_result<T: serde::Serialize>(result: &T) -> Result<CallToolResult, ErrorObject> {
    match serde_json::to_string_pretty(result) {
        Ok(text) => Ok(CallToolResult::success(vec![ContentBlock::text(text)])),
        Err(e) => Err(ErrorObject::internal(format!(
            "Failed to serialize tool result: {}",
            e
        ))),
    }
}
