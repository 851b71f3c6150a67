use std::sync::Arc;

use adrian::config::Config;
use adrian::flow::session::InMemoryConversationStore;
use adrian::gateway::TwilioGateway;
use adrian::logger::init_tracing;
use adrian::report::CsvFileExporter;
use adrian::router::Router;
use adrian::store::{DataStore, InMemoryStore};
use adrian::webhook;
use clap::{Args, Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "adrian",
    about = "WhatsApp membership assistant for Veidt Health",
    version = "0.1.0"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the webhook server
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Overrides PORT from the environment
    #[arg(long)]
    port: Option<u16>,

    /// Idle seconds before an in-progress affiliation is abandoned
    #[arg(long)]
    session_timeout: Option<u64>,

    /// Log level override (e.g. error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Commands::Serve(args) = cli.command.unwrap_or(Commands::Serve(ServeArgs {
        log_level: "info".to_string(),
        ..ServeArgs::default()
    }));

    dotenvy::dotenv().ok();
    init_tracing(&args.log_level);

    let mut config = Config::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(timeout) = args.session_timeout {
        config.session_timeout_secs = timeout;
    }

    let store: Arc<dyn DataStore> = InMemoryStore::new();
    let conversations = InMemoryConversationStore::new(config.session_timeout_secs);
    let gateway = Arc::new(TwilioGateway::new(
        &config.twilio_account_sid,
        &config.twilio_auth_token,
        &config.whatsapp_number,
    )?);
    let exporter = Arc::new(CsvFileExporter::new(&config.report_path));

    let router = Router::new(store, conversations, gateway, exporter);
    info!("Store: in-memory; session timeout: {}s", config.session_timeout_secs);

    webhook::serve(router, config.port).await
}
