use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use appointsync::{config::Config, lambda, routes::Routes, server, state::AppState};

/// appointsync - Book, change and cancel appointments for storefront customers
#[derive(Parser, Debug)]
#[command(name = "appointsync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Defaults to `lambda` inside the Lambda runtime and `serve` elsewhere
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer API gateway events from the Lambda runtime API
    Lambda,
    /// Serve the routes over HTTP for local development
    Serve(ServeArgs),
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "3000", env = "PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_else(|| {
        if std::env::var_os("AWS_LAMBDA_RUNTIME_API").is_some() {
            Command::Lambda
        } else {
            Command::Serve(ServeArgs::parse_from(["serve"]))
        }
    });

    init_tracing(matches!(command, Command::Lambda));

    let config = Config::from_env()?;
    let routes = Routes::new(AppState::from_config(&config)?);

    match command {
        Command::Lambda => lambda::run(routes)
            .await
            .map_err(|error| anyhow::anyhow!(error)),
        Command::Serve(args) => server::serve(routes, &args.host, args.port).await,
    }
}

/// JSON lines without timestamps under Lambda (CloudWatch adds them), human output
/// otherwise.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "appointsync=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().without_time())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
