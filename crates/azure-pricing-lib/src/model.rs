//! Data model for the Azure Retail Prices API.
//!
//! Field names follow the API's JSON casing: price records use camelCase,
//! while the response envelope uses PascalCase (`Items`, `NextPageLink`).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One retail price record as returned by the API.
///
/// Most string fields default to empty rather than failing deserialization:
/// the API omits or blanks fields for global meters and some legacy services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetailPrice {
    pub currency_code: String,

    #[serde(default)]
    pub tier_minimum_units: f64,

    /// Pay-as-you-go price for the meter.
    pub retail_price: f64,

    #[serde(default)]
    pub unit_price: f64,

    /// ARM region identifier, e.g. `eastus`. Empty for global meters.
    #[serde(default)]
    pub arm_region_name: String,

    /// Display name of the region, e.g. `US East`.
    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub effective_start_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub meter_id: String,

    #[serde(default)]
    pub meter_name: String,

    #[serde(default)]
    pub product_id: String,

    pub product_name: String,

    #[serde(default)]
    pub sku_id: String,

    pub sku_name: String,

    #[serde(default)]
    pub arm_sku_name: String,

    pub service_name: String,

    #[serde(default)]
    pub service_id: String,

    #[serde(default)]
    pub service_family: String,

    #[serde(default)]
    pub unit_of_measure: String,

    /// Price type of this record, e.g. `Consumption` or `Reservation`.
    #[serde(rename = "type", default)]
    pub price_type: String,

    #[serde(default)]
    pub is_primary_meter_region: Option<bool>,

    #[serde(default)]
    pub reservation_term: Option<String>,

    /// Savings plan rates attached to the meter, when offered.
    #[serde(default)]
    pub savings_plan: Vec<SavingsPlanPrice>,
}

/// A savings plan rate attached to a price record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsPlanPrice {
    pub unit_price: f64,
    pub retail_price: f64,
    /// Commitment term, e.g. `1 Year` or `3 Years`.
    pub term: String,
}

/// One page of the retail prices response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceResponsePage {
    #[serde(rename = "BillingCurrency", default)]
    pub billing_currency: Option<String>,

    #[serde(rename = "Items", default)]
    pub items: Vec<RetailPrice>,

    /// Absolute URL of the next page, `null` on the final page.
    #[serde(rename = "NextPageLink", default)]
    pub next_page_link: Option<String>,

    /// Number of items in this page, as reported by the API.
    #[serde(rename = "Count", default)]
    pub count: u64,
}

/// Price type filter accepted by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceType {
    Consumption,
    Reservation,
    DevTestConsumption,
}

impl PriceType {
    /// The exact value the API expects in `$filter` clauses.
    pub fn as_filter_value(&self) -> &'static str {
        match self {
            PriceType::Consumption => "Consumption",
            PriceType::Reservation => "Reservation",
            PriceType::DevTestConsumption => "DevTestConsumption",
        }
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter_value())
    }
}

impl FromStr for PriceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("consumption") {
            Ok(PriceType::Consumption)
        } else if trimmed.eq_ignore_ascii_case("reservation") {
            Ok(PriceType::Reservation)
        } else if trimmed.eq_ignore_ascii_case("devtestconsumption") {
            Ok(PriceType::DevTestConsumption)
        } else {
            Err(Error::UnsupportedPriceType {
                value: s.to_string(),
            })
        }
    }
}
