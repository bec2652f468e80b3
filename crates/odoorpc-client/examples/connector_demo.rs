//! Odoo connector demo.
//!
//! Queries the server version, authenticates, and reads a handful of
//! partner records from a live Odoo instance, directly or through an
//! intermediary proxy.
//!
//! # Usage
//!
//! ```bash
//! # Directly against an instance
//! cargo run --example connector_demo -- \
//!     --url mycompany.odoo.com --database mycompany \
//!     --username admin@mycompany.com --api-key ...
//!
//! # Through a proxy
//! cargo run --example connector_demo -- \
//!     --url mycompany.odoo.com --database mycompany \
//!     --username admin@mycompany.com --api-key ... \
//!     --proxy-url https://relay.example.com/odoo
//! ```

use anyhow::Result;
use clap::Parser;
use serde_json::json;

use odoorpc_client::OdooClient;
use odoorpc_common::ConnectionConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Odoo JSON-RPC connector demo")]
struct Args {
    /// Base URL of the Odoo instance (scheme optional)
    #[arg(long)]
    url: String,

    /// Target database name
    #[arg(long)]
    database: String,

    /// Login of the acting user
    #[arg(long)]
    username: String,

    /// API key, used in place of a password
    #[arg(long, env = "ODOO_API_KEY")]
    api_key: String,

    /// Optional intermediary proxy URL
    #[arg(long)]
    proxy_url: Option<String>,

    /// Model to read
    #[arg(long, default_value = "res.partner")]
    model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config =
        ConnectionConfig::new(&args.url, args.database, args.username, args.api_key);
    if let Some(proxy_url) = args.proxy_url {
        config = config.with_proxy_url(proxy_url);
    }
    let client = OdooClient::new(config)?;

    let version = client.version().await?;
    println!("server version: {version}");

    let uid = client.authenticate().await?;
    println!("authenticated as uid {uid}");

    let records = client
        .search_read(
            &args.model,
            vec![json!(["active", "=", true])],
            vec!["name".to_string(), "email".to_string()],
        )
        .await?;
    println!("{records}");

    Ok(())
}
