//! Client for the Azure Retail Prices REST API.
//!
//! The API is public and unauthenticated. Filters are expressed as an OData
//! `$filter` conjunction; results are paginated through absolute
//! `NextPageLink` URLs. See
//! <https://learn.microsoft.com/azure/cost-management-billing/manage/get-azure-prices>.

use std::env;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::model::{PriceResponsePage, PriceType, RetailPrice};

/// Default endpoint of the retail prices API.
pub const DEFAULT_ENDPOINT: &str = "https://prices.azure.com/api/retail/prices";

/// API version sent with every request.
pub const API_VERSION: &str = "2023-01-01-preview";

/// Environment variable overriding the API endpoint (tests, proxies).
pub const ENDPOINT_ENV: &str = "AZURE_RETAIL_PRICES_URL";

/// Default number of records returned when no limit is requested.
pub const DEFAULT_RESULT_LIMIT: usize = 10;

/// Hard ceiling on the number of records a single search may return.
pub const MAX_RESULT_LIMIT: usize = 100;

/// Upper bound on continuation pages followed for a single search.
const MAX_PAGES: usize = 10;

/// Query parameters for a retail price search.
///
/// All filters are optional; empty and whitespace-only values are treated as
/// absent. Values containing single quotes are escaped per OData rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceQuery {
    service_name: Option<String>,
    service_family: Option<String>,
    sku_name: Option<String>,
    arm_region_name: Option<String>,
    price_type: Option<PriceType>,
    currency_code: Option<String>,
    limit: Option<usize>,
}

impl PriceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by service name, e.g. `Virtual Machines`.
    pub fn service_name(mut self, value: impl Into<String>) -> Self {
        self.service_name = Some(value.into());
        self
    }

    /// Filter by service family, e.g. `Compute`.
    pub fn service_family(mut self, value: impl Into<String>) -> Self {
        self.service_family = Some(value.into());
        self
    }

    /// Filter by SKU name, e.g. `Standard_F16`.
    pub fn sku_name(mut self, value: impl Into<String>) -> Self {
        self.sku_name = Some(value.into());
        self
    }

    /// Filter by ARM region name, e.g. `eastus`.
    pub fn region(mut self, value: impl Into<String>) -> Self {
        self.arm_region_name = Some(value.into());
        self
    }

    /// Filter by price type.
    pub fn price_type(mut self, value: PriceType) -> Self {
        self.price_type = Some(value);
        self
    }

    /// Request prices in the given ISO currency code, e.g. `EUR`.
    ///
    /// The API defaults to USD when no currency is requested.
    pub fn currency_code(mut self, value: impl Into<String>) -> Self {
        self.currency_code = Some(value.into());
        self
    }

    /// Maximum number of records to return. Clamped to `1..=100`.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_RESULT_LIMIT)
            .clamp(1, MAX_RESULT_LIMIT)
    }

    pub(crate) fn requested_currency(&self) -> Option<&str> {
        self.currency_code
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Render the OData `$filter` expression, or `None` when no filter
    /// clauses apply.
    pub fn filter(&self) -> Option<String> {
        let mut clauses = Vec::new();

        if let Some(clause) = self
            .service_name
            .as_deref()
            .and_then(|value| filter_clause("serviceName", value))
        {
            clauses.push(clause);
        }
        if let Some(clause) = self
            .service_family
            .as_deref()
            .and_then(|value| filter_clause("serviceFamily", value))
        {
            clauses.push(clause);
        }
        if let Some(clause) = self
            .sku_name
            .as_deref()
            .and_then(|value| filter_clause("skuName", value))
        {
            clauses.push(clause);
        }
        if let Some(clause) = self
            .arm_region_name
            .as_deref()
            .and_then(|value| filter_clause("armRegionName", value))
        {
            clauses.push(clause);
        }
        if let Some(price_type) = self.price_type {
            clauses.push(format!("type eq '{}'", price_type.as_filter_value()));
        }

        if clauses.is_empty() {
            None
        } else {
            Some(clauses.join(" and "))
        }
    }
}

fn filter_clause(field: &str, value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(format!("{} eq '{}'", field, trimmed.replace('\'', "''")))
}

/// Results of a retail price search.
#[derive(Debug, Clone)]
pub struct PriceSearchResults {
    /// Records collected across pages, truncated to the query limit.
    pub items: Vec<RetailPrice>,
    /// Number of records in `items`.
    pub count: usize,
    /// Billing currency reported by the API.
    pub currency: Option<String>,
}

/// HTTP client for the retail prices API.
#[derive(Debug, Clone)]
pub struct RetailPriceClient {
    http: Client,
    endpoint: String,
}

impl RetailPriceClient {
    /// Create a client pointing at the endpoint resolved from the
    /// environment, falling back to the public API.
    pub fn new() -> Result<Self> {
        Self::with_endpoint(endpoint_from_env())
    }

    /// Create a client pointing at an explicit endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent())
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// The endpoint this client sends requests to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Search retail prices, following continuation links until the query
    /// limit is satisfied or pages run out.
    pub async fn search(&self, query: &PriceQuery) -> Result<PriceSearchResults> {
        let limit = query.effective_limit();
        let mut items: Vec<RetailPrice> = Vec::with_capacity(limit);
        let mut currency = query.requested_currency().map(str::to_string);
        let mut next_link: Option<String> = None;

        for page_index in 0..MAX_PAGES {
            let page = match next_link.take() {
                Some(link) => self.fetch_continuation(&link).await?,
                None => self.fetch_first_page(query).await?,
            };

            debug!(
                page = page_index,
                received = page.items.len(),
                reported = page.count,
                "fetched retail prices page"
            );

            if page.billing_currency.is_some() {
                currency = page.billing_currency;
            }
            items.extend(page.items);

            if items.len() >= limit {
                break;
            }
            match page.next_page_link {
                Some(link) if !link.is_empty() => next_link = Some(link),
                _ => break,
            }
            if page_index + 1 == MAX_PAGES {
                warn!(limit, collected = items.len(), "page cap reached before limit");
            }
        }

        items.truncate(limit);
        Ok(PriceSearchResults {
            count: items.len(),
            items,
            currency,
        })
    }

    async fn fetch_first_page(&self, query: &PriceQuery) -> Result<PriceResponsePage> {
        let mut request = self
            .http
            .get(&self.endpoint)
            .query(&[("api-version", API_VERSION)]);

        if let Some(currency) = query.requested_currency() {
            request = request.query(&[("currencyCode", format!("'{}'", currency))]);
        }
        if let Some(filter) = query.filter() {
            request = request.query(&[("$filter", filter)]);
        }

        self.execute(request).await
    }

    async fn fetch_continuation(&self, link: &str) -> Result<PriceResponsePage> {
        let url = Url::parse(link).map_err(|e| Error::InvalidContinuationLink {
            link: link.to_string(),
            message: e.to_string(),
        })?;
        self.execute(self.http.get(url)).await
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<PriceResponsePage> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<PriceResponsePage>().await?)
    }
}

fn endpoint_from_env() -> String {
    env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string())
}

fn user_agent() -> String {
    format!(
        "azure-pricing-lib/{version}",
        version = env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_none_when_no_fields_set() {
        assert_eq!(PriceQuery::new().filter(), None);
    }

    #[test]
    fn test_filter_single_clause() {
        let query = PriceQuery::new().service_name("Virtual Machines");
        assert_eq!(
            query.filter().as_deref(),
            Some("serviceName eq 'Virtual Machines'")
        );
    }

    #[test]
    fn test_filter_joins_clauses_with_and() {
        let query = PriceQuery::new()
            .service_name("Virtual Machines")
            .sku_name("Standard_F16")
            .region("brazilsouth")
            .price_type(PriceType::Consumption);
        assert_eq!(
            query.filter().as_deref(),
            Some(
                "serviceName eq 'Virtual Machines' and skuName eq 'Standard_F16' \
                 and armRegionName eq 'brazilsouth' and type eq 'Consumption'"
            )
        );
    }

    #[test]
    fn test_filter_skips_empty_and_whitespace_values() {
        let query = PriceQuery::new()
            .service_name("")
            .sku_name("   ")
            .region("eastus");
        assert_eq!(query.filter().as_deref(), Some("armRegionName eq 'eastus'"));
    }

    #[test]
    fn test_filter_escapes_single_quotes() {
        let query = PriceQuery::new().service_name("O'Brien's Service");
        assert_eq!(
            query.filter().as_deref(),
            Some("serviceName eq 'O''Brien''s Service'")
        );
    }

    #[test]
    fn test_filter_includes_service_family() {
        let query = PriceQuery::new().service_family("Compute");
        assert_eq!(query.filter().as_deref(), Some("serviceFamily eq 'Compute'"));
    }

    #[test]
    fn test_effective_limit_defaults_and_clamps() {
        assert_eq!(PriceQuery::new().effective_limit(), DEFAULT_RESULT_LIMIT);
        assert_eq!(PriceQuery::new().limit(0).effective_limit(), 1);
        assert_eq!(PriceQuery::new().limit(7).effective_limit(), 7);
        assert_eq!(
            PriceQuery::new().limit(5000).effective_limit(),
            MAX_RESULT_LIMIT
        );
    }

    #[test]
    fn test_requested_currency_ignores_blank_values() {
        assert_eq!(PriceQuery::new().requested_currency(), None);
        assert_eq!(
            PriceQuery::new().currency_code("  ").requested_currency(),
            None
        );
        assert_eq!(
            PriceQuery::new().currency_code("EUR").requested_currency(),
            Some("EUR")
        );
    }

    #[test]
    fn test_client_uses_explicit_endpoint() {
        let client = RetailPriceClient::with_endpoint("http://127.0.0.1:1/prices").unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:1/prices");
    }
}
