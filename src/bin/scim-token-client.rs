use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scim_token_client::config::settings::RetryConfig;
use scim_token_client::resilience::reauth::with_reauth;
use scim_token_client::scim::{ListResponse, ResourceClient, SearchRequest};
use scim_token_client::utils::config_loader;
use scim_token_client::utils::logging::{self, LogLevel};
use serde_json::Value;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "scim-token-client.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// SCIM collection path relative to the provider host
    #[arg(long, default_value = "scim2/Users")]
    collection: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a valid access token
    Token,
    /// List resources, optionally with a raw query such as 'filter=userName eq "alice"'
    List {
        #[arg(long)]
        query: Option<String>,
    },
    /// Search resources with a SCIM filter expression
    Search {
        filter: String,
        #[arg(long)]
        count: Option<u64>,
    },
    /// Fetch one resource by id
    Get { id: String },
    /// Delete one resource by id
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Build token source
    // -------------------------------

    let source = service_config.build_token_source()?;
    let retry = RetryConfig::to_settings(&service_config.settings.retry);
    let resources = ResourceClient::collection(&source, args.collection.clone());

    // -------------------------------
    // 3. Run command
    // -------------------------------

    info!("running against {}", service_config.provider.host);
    let source = &source;
    let resources = &resources;
    let output: Value = match args.command {
        Command::Token => {
            let token = retry.run_with_retry(move || source.valid_token()).await?;
            Value::String(token)
        }
        Command::List { query } => {
            let query = query.as_deref();
            let list: ListResponse<Value> = retry
                .run_with_retry(move || with_reauth(source, move || resources.filter(query)))
                .await?;
            serde_json::to_value(list)?
        }
        Command::Search { filter, count } => {
            let mut search = SearchRequest::new().filter(filter);
            search.count = count;
            let search = &search;
            let list: ListResponse<Value> = retry
                .run_with_retry(move || with_reauth(source, move || resources.search(search)))
                .await?;
            serde_json::to_value(list)?
        }
        Command::Get { id } => {
            let id = id.as_str();
            retry
                .run_with_retry(move || with_reauth(source, move || resources.get::<Value>(id)))
                .await?
        }
        Command::Delete { id } => {
            let id = id.as_str();
            with_reauth(source, move || resources.delete(id)).await?;
            Value::String(format!("deleted {}", id))
        }
    };

    let rendered = serde_json::to_string_pretty(&output).context("rendering output")?;
    println!("{rendered}");
    Ok(())
}
