//! Type definitions for MCP tool inputs and outputs
//!
//! Inputs derive `JsonSchema` so `tools/list` can advertise their shape;
//! outputs are plain serializable structs rendered into tool result text.

use azure_pricing_lib::RetailPrice;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// TOOL INPUTS
// ============================================================================

/// Input for the price_search tool
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct PriceSearchInput {
    /// Azure service name, e.g. "Virtual Machines" (optional)
    #[serde(default)]
    pub service_name: Option<String>,

    /// Service family, e.g. "Compute" (optional)
    #[serde(default)]
    pub service_family: Option<String>,

    /// SKU name, e.g. "Standard_F16" (optional)
    #[serde(default)]
    pub sku_name: Option<String>,

    /// ARM region name, e.g. "eastus" (optional)
    #[serde(default)]
    pub region: Option<String>,

    /// Price type: "Consumption", "Reservation" or "DevTestConsumption" (optional)
    #[serde(default)]
    pub price_type: Option<String>,

    /// ISO currency code, e.g. "EUR" (optional, the API defaults to USD)
    #[serde(default)]
    pub currency_code: Option<String>,

    /// Maximum number of records to return (default: 10, max: 100)
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

fn default_search_limit() -> usize {
    10
}

/// Input for the sku_discover tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SkuDiscoverInput {
    /// Azure service name to enumerate SKUs for (required)
    pub service_name: String,

    /// Maximum number of price records to scan (default: 50, max: 100)
    #[serde(default = "default_scan_limit")]
    pub limit: usize,
}

fn default_scan_limit() -> usize {
    50
}

// ============================================================================
// TOOL OUTPUTS
// ============================================================================

/// Output from the price_search tool
#[derive(Debug, Clone, Serialize)]
pub struct PriceSearchOutput {
    /// Number of records returned
    pub count: usize,

    /// Billing currency of the returned prices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    pub items: Vec<PriceItem>,
}

/// One formatted price record
#[derive(Debug, Clone, Serialize)]
pub struct PriceItem {
    pub service: String,
    pub product: String,
    pub sku: String,
    pub region: String,
    pub location: String,
    pub price: f64,
    pub unit: String,

    #[serde(rename = "type")]
    pub price_type: String,

    pub savings_plans: Vec<SavingsPlanItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavingsPlanItem {
    pub term: String,
    pub retail_price: f64,
    pub unit_price: f64,
}

impl From<&RetailPrice> for PriceItem {
    fn from(record: &RetailPrice) -> Self {
        Self {
            service: record.service_name.clone(),
            product: record.product_name.clone(),
            sku: record.sku_name.clone(),
            region: record.arm_region_name.clone(),
            location: record.location.clone(),
            price: record.retail_price,
            unit: record.unit_of_measure.clone(),
            price_type: record.price_type.clone(),
            savings_plans: record
                .savings_plan
                .iter()
                .map(|plan| SavingsPlanItem {
                    term: plan.term.clone(),
                    retail_price: plan.retail_price,
                    unit_price: plan.unit_price,
                })
                .collect(),
        }
    }
}

/// Output from the sku_discover tool
#[derive(Debug, Clone, Serialize)]
pub struct SkuDiscoverOutput {
    pub service_name: String,

    /// Number of price records scanned
    pub fetched: usize,

    /// Number of distinct SKUs found
    pub sku_count: usize,

    pub skus: Vec<SkuSummary>,
}

/// A distinct SKU with sampled regional prices
#[derive(Debug, Clone, Serialize)]
pub struct SkuSummary {
    pub sku: String,
    pub samples: Vec<SkuSample>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkuSample {
    pub region: String,
    pub price: f64,
    pub unit: String,
    pub meter: String,
}
