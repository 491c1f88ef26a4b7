use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use modirum_gateway::application::gateway::{GatewayService, HostPorts};
use modirum_gateway::config::{Environment, GatewaySettings};
use modirum_gateway::domain::digest;
use modirum_gateway::domain::parameters::{DIGEST_FIELD, ParameterSet};
use modirum_gateway::infrastructure::in_memory::{BaseUrl, HostSeed, InMemoryHost};
use modirum_gateway::interfaces::csv::parameter_reader::ParameterReader;
use modirum_gateway::interfaces::http;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the digest for a `name,value` parameter CSV file
    Sign(DigestArgs),
    /// Check the `digest` row of a parameter CSV file
    Verify(DigestArgs),
    /// Serve the redirect and return endpoints against an in-memory host
    Serve(ServeArgs),
}

#[derive(Args)]
struct DigestArgs {
    /// Parameter CSV file with `name,value` header
    params: PathBuf,

    /// Gateway settings JSON file
    #[arg(long)]
    config: PathBuf,

    /// Use the test environment secret instead of production
    #[arg(long)]
    test: bool,
}

#[derive(Args)]
struct ServeArgs {
    /// Gateway settings JSON file
    #[arg(long)]
    config: PathBuf,

    /// JSON file with orders, payments and quotas to load into the host
    #[arg(long)]
    seed: Option<PathBuf>,

    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Public URL the gateway uses to reach this server
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    base_url: String,
}

fn load_parameters(args: &DigestArgs) -> Result<(ParameterSet, String)> {
    let settings = GatewaySettings::from_path(&args.config).into_diagnostic()?;
    let env = Environment::for_testmode(args.test);
    let secret = settings
        .shared_secret(env)
        .ok_or_else(|| miette!("no shared secret configured for the {env} environment"))?
        .to_string();

    let file = File::open(&args.params).into_diagnostic()?;
    let params = ParameterReader::new(file).parameters().into_diagnostic()?;
    Ok((params, secret))
}

async fn serve(args: ServeArgs) -> Result<()> {
    let settings = GatewaySettings::from_path(&args.config).into_diagnostic()?;
    let host = match args.seed {
        Some(path) => InMemoryHost::from_seed(HostSeed::from_path(path).into_diagnostic()?),
        None => InMemoryHost::new(),
    };
    let urls = BaseUrl::parse(&args.base_url).into_diagnostic()?;

    let ports = HostPorts {
        orders: Box::new(host.clone()),
        payments: Box::new(host.clone()),
        confirmer: Box::new(host.clone()),
        audit: Box::new(host.clone()),
        messages: Box::new(host),
        urls: Box::new(urls),
    };
    let service = Arc::new(GatewayService::new(settings, ports));

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .into_diagnostic()?;
    tracing::info!(bind = %args.bind, "serving gateway endpoints");
    axum::serve(listener, http::router(service))
        .await
        .into_diagnostic()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Sign(args) => {
            let (mut params, secret) = load_parameters(&args)?;
            if params.remove(DIGEST_FIELD).is_some() {
                tracing::warn!("ignoring existing digest row");
            }
            println!("{}", digest::sign(params.values(), &secret));
        }
        Command::Verify(args) => {
            let (mut params, secret) = load_parameters(&args)?;
            let claimed = params
                .remove(DIGEST_FIELD)
                .ok_or_else(|| miette!("parameter file has no digest row"))?;
            if !digest::verify(params.values(), &secret, &claimed) {
                return Err(miette!("digest mismatch"));
            }
            println!("valid");
        }
        Command::Serve(args) => serve(args).await?,
    }

    Ok(())
}
