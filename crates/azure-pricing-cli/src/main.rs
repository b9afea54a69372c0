use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use azure_pricing_lib::{PriceQuery, PriceType, RetailPriceClient};
use azure_pricing_mcp::config::{normalize_path, ServerConfig, TransportKind};
use azure_pricing_mcp::logging::{init_logging, LoggingConfig};
use azure_pricing_mcp::server::McpServer;
use azure_pricing_mcp::sse::run_sse_server;
use azure_pricing_mcp::stdio::run_stdio_server;
use azure_pricing_mcp::types::{PriceItem, PriceSearchOutput};

mod probe;

use probe::{list_tools, ProbeOptions};

#[derive(Parser, Debug)]
#[command(author, version, about = "Azure Retail Prices MCP server utilities")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server over stdio or SSE.
    Serve {
        /// Transport to speak: "stdio" or "sse" (overrides MCP_TRANSPORT).
        #[arg(long)]
        transport: Option<String>,

        /// Bind host for the SSE transport (overrides HOST).
        #[arg(long)]
        host: Option<String>,

        /// Bind port for the SSE transport (overrides PORT).
        #[arg(long)]
        port: Option<u16>,

        /// SSE stream path (overrides MCP_SSE_PATH).
        #[arg(long)]
        sse_path: Option<String>,

        /// Message POST path (overrides MCP_MESSAGE_PATH).
        #[arg(long)]
        message_path: Option<String>,
    },

    /// Probe a running SSE server and list its tools.
    ListTools {
        /// Server base URL (no trailing slash).
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        base_url: String,

        /// SSE path on the server.
        #[arg(long, default_value = "/sse")]
        sse_path: String,

        /// Protocol version to send in initialize.
        #[arg(long, default_value = "2024-11-05")]
        protocol_version: String,

        /// Connect timeout in seconds.
        #[arg(long, default_value_t = 10.0)]
        timeout: f64,

        /// Overall wait limit for responses in seconds.
        #[arg(long, default_value_t = 15.0)]
        max_wait: f64,

        /// Print raw SSE events.
        #[arg(long)]
        verbose: bool,
    },

    /// Query Azure retail prices directly.
    Search {
        /// Azure service name, e.g. "Virtual Machines".
        #[arg(long)]
        service: Option<String>,

        /// Service family, e.g. "Compute".
        #[arg(long)]
        family: Option<String>,

        /// SKU name, e.g. "Standard_F16".
        #[arg(long)]
        sku: Option<String>,

        /// ARM region name, e.g. "eastus".
        #[arg(long)]
        region: Option<String>,

        /// Price type: Consumption, Reservation or DevTestConsumption.
        #[arg(long)]
        price_type: Option<String>,

        /// ISO currency code, e.g. "EUR".
        #[arg(long)]
        currency: Option<String>,

        /// Maximum number of records to return.
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Emit pretty-printed JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            transport,
            host,
            port,
            sse_path,
            message_path,
        } => handle_serve(transport, host, port, sse_path, message_path).await,
        Command::ListTools {
            base_url,
            sse_path,
            protocol_version,
            timeout,
            max_wait,
            verbose,
        } => {
            handle_list_tools(ProbeOptions {
                base_url,
                sse_path,
                protocol_version,
                timeout: Duration::from_secs_f64(timeout),
                max_wait: Duration::from_secs_f64(max_wait),
                verbose,
            })
            .await
        }
        Command::Search {
            service,
            family,
            sku,
            region,
            price_type,
            currency,
            limit,
            json,
        } => handle_search(service, family, sku, region, price_type, currency, limit, json).await,
    }
}

async fn handle_serve(
    transport: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    sse_path: Option<String>,
    message_path: Option<String>,
) -> Result<()> {
    let mut config = ServerConfig::from_env().context("invalid server configuration")?;

    if let Some(raw) = transport {
        config.transport = raw
            .parse::<TransportKind>()
            .context("invalid --transport value")?;
    }
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(path) = sse_path {
        config.sse_path = normalize_path(&path);
    }
    if let Some(path) = message_path {
        config.message_path = normalize_path(&path);
    }

    let logging = LoggingConfig::from_env().with_service(env!("CARGO_PKG_NAME"));
    // Stdio keeps stdout clean for protocol frames.
    init_logging(&logging, config.transport == TransportKind::Stdio);

    let client = RetailPriceClient::new().context("failed to build retail prices client")?;
    let server = McpServer::new(client);

    match config.transport {
        TransportKind::Stdio => run_stdio_server(server).await,
        TransportKind::Sse => run_sse_server(&config, server).await,
    }
}

async fn handle_list_tools(options: ProbeOptions) -> Result<()> {
    println!(
        "Opening SSE stream at {}{} ...",
        options.base_url.trim_end_matches('/'),
        options.sse_path
    );

    let tools = list_tools(&options).await?;
    if tools.is_empty() {
        bail!("no tools received");
    }

    println!("Received {} tools:", tools.len());
    for tool in &tools {
        println!("- {}: {}", tool.name, tool.description);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn handle_search(
    service: Option<String>,
    family: Option<String>,
    sku: Option<String>,
    region: Option<String>,
    price_type: Option<String>,
    currency: Option<String>,
    limit: usize,
    json: bool,
) -> Result<()> {
    // Parse the price type before touching the network so typos fail fast.
    let price_type = price_type
        .as_deref()
        .map(str::parse::<PriceType>)
        .transpose()
        .context("invalid --price-type value")?;

    let mut query = PriceQuery::new().limit(limit);
    if let Some(service) = service {
        query = query.service_name(service);
    }
    if let Some(family) = family {
        query = query.service_family(family);
    }
    if let Some(sku) = sku {
        query = query.sku_name(sku);
    }
    if let Some(region) = region {
        query = query.region(region);
    }
    if let Some(price_type) = price_type {
        query = query.price_type(price_type);
    }
    if let Some(currency) = currency {
        query = query.currency_code(currency);
    }

    let client = RetailPriceClient::new().context("failed to build retail prices client")?;
    let results = client
        .search(&query)
        .await
        .context("retail price lookup failed")?;

    let output = PriceSearchOutput {
        count: results.count,
        currency: results.currency,
        items: results.items.iter().map(PriceItem::from).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match output.currency.as_deref() {
        Some(currency) => println!("Found {} prices ({})", output.count, currency),
        None => println!("Found {} prices", output.count),
    }
    for item in &output.items {
        println!(
            "- {} | {} | {} {} ({}, {})",
            item.sku, item.product, item.price, item.unit, item.region, item.price_type
        );
        for plan in &item.savings_plans {
            println!("    savings plan {}: {}", plan.term, plan.retail_price);
        }
    }

    Ok(())
}
