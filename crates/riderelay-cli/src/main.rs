use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

use riderelay_core::{Document, Identity, PriceSort, ResourceGateway, TokenSigner};
use riderelay_db::{Database, DatabaseConfig, DocumentRepository};

#[derive(Parser)]
#[command(name = "riderelay", version, about = "RideRelay booking gateway operator tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Mint an access token, e.g. for calling the API with curl
    Token {
        /// Identity the token is issued for
        #[arg(short, long)]
        email: String,

        /// Extra claims as a JSON object
        #[arg(short, long)]
        claims: Option<String>,

        /// HS256 signing secret (reads from RIDERELAY_TOKEN_SECRET if not provided)
        #[arg(long, env = "RIDERELAY_TOKEN_SECRET", hide_env_values = true)]
        secret: String,
    },

    /// List services, optionally sorted by price
    Services {
        /// `asc` or `desc`; omit to keep insertion order
        #[arg(short, long)]
        sort_order: Option<String>,
    },

    /// List the bookings made under an email
    Bookings {
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("riderelay=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate => {
            let db = connect_db().await?;
            db.migrate().await.context("Failed to run migrations")?;
            tracing::info!("Migrations applied");
            db.close().await;
        }
        Commands::Token {
            email,
            claims,
            secret,
        } => cmd_token(email, claims.as_deref(), &secret)?,
        Commands::Services { sort_order } => {
            let db = connect_db().await?;
            let gateway = ResourceGateway::new(db.document_repo());
            let result = cmd_services(&gateway, sort_order.as_deref()).await;
            db.close().await;
            result?;
        }
        Commands::Bookings { email } => {
            let db = connect_db().await?;
            let gateway = ResourceGateway::new(db.document_repo());
            let result = cmd_bookings(&gateway, &email).await;
            db.close().await;
            result?;
        }
    }

    Ok(())
}

/// Connect to PostgreSQL using DATABASE_URL.
async fn connect_db() -> Result<Database> {
    let config = DatabaseConfig::from_env()?;
    let db = Database::connect(&config)
        .await
        .context("Failed to connect to database")?;
    Ok(db)
}

fn cmd_token(email: String, claims: Option<&str>, secret: &str) -> Result<()> {
    let extra = match claims {
        Some(raw) => parse_claims(raw)?,
        None => Map::new(),
    };

    let signer = TokenSigner::new(secret)?;
    let token = signer.issue(Identity::new(email).with_claims(extra))?;

    tracing::info!(
        "Token valid for {} hours; send it as cookie `token`",
        signer.ttl().num_hours()
    );
    println!("{token}");

    Ok(())
}

fn parse_claims(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(raw).context("Invalid JSON in --claims")? {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("--claims must be a JSON object"),
    }
}

async fn cmd_services(
    gateway: &ResourceGateway<DocumentRepository>,
    sort_order: Option<&str>,
) -> Result<()> {
    let sort = PriceSort::from_query(sort_order.map(|_| "price"), sort_order)?;
    let services = gateway.list_services(sort).await?;
    print_documents("services", &services)
}

async fn cmd_bookings(gateway: &ResourceGateway<DocumentRepository>, email: &str) -> Result<()> {
    let bookings = gateway.list_bookings(email, Some(email)).await?;
    print_documents("bookings", &bookings)
}

fn print_documents(noun: &str, documents: &[Document]) -> Result<()> {
    if documents.is_empty() {
        println!("No {noun} found");
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(documents)?);
    tracing::info!("Total: {} {noun}", documents.len());

    Ok(())
}
