mod prompt;

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    copycat_catalog::{build_catalog, resolve_forums, selectable_chats},
    copycat_common::{ChatDirectory, MessageHandler, Outbound, UserId},
    copycat_config::CopycatConfig,
    copycat_routing::{Router, SubscriptionSet},
    copycat_telegram::{BotApiDirectory, TelegramConnection},
};

#[derive(Parser)]
#[command(name = "copycat", about = "Copycat — Telegram chat/topic forwarding router")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file path (overrides discovery).
    #[arg(long, global = true, env = "COPYCAT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Track chats and forward matched messages (default when no subcommand
    /// is provided).
    Start,
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config file path.
    Path,
    /// Print the effective config with the token redacted.
    Show,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<CopycatConfig> {
    let mut config = match &cli.config {
        Some(path) => copycat_config::load_config(path)?,
        None => copycat_config::discover_and_load()?,
    };
    copycat_config::apply_env_overrides(&mut config);
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "copycat starting");

    match &cli.command {
        None | Some(Commands::Start) => start(&cli).await,
        Some(Commands::Config { action }) => match action {
            ConfigAction::Path => {
                println!("{}", copycat_config::find_or_default_config_path().display());
                Ok(())
            },
            ConfigAction::Show => {
                let config = load_config(&cli)?;
                println!("{config:#?}");
                Ok(())
            },
        },
    }
}

/// Startup sequence: connect, build the catalog, prompt, then route until
/// ctrl-c. Everything up to the polling loop is fatal on failure; after it,
/// failures are per-message and contained by the router.
async fn start(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    if secrecy::ExposeSecret::expose_secret(&config.telegram.token).is_empty() {
        anyhow::bail!(
            "no bot token configured; set telegram.token or the COPYCAT_TELEGRAM_TOKEN env var"
        );
    }

    let connection = TelegramConnection::connect(&config.telegram)
        .await
        .context("connecting to telegram")?;
    let owner = config
        .telegram
        .owner_id
        .map_or_else(|| connection.self_id(), UserId);

    let directory: Arc<dyn ChatDirectory> =
        Arc::new(BotApiDirectory::new(&config.telegram).context("building chat directory")?);

    let chats = selectable_chats(directory.list_chats().await.context("listing chats")?);
    let channels = directory
        .list_forum_channels()
        .await
        .context("listing forum channels")?;
    let forums = resolve_forums(directory.as_ref(), &chats, &channels).await;
    let catalog = build_catalog(&chats, &forums);
    if catalog.is_empty() {
        anyhow::bail!("no selectable chats; configure telegram.chats with ids the bot is in");
    }
    info!(
        plain = catalog.plain.len(),
        topics = catalog.topics.len(),
        "chat catalog built"
    );

    let tracked = prompt::select_tracked(&catalog)?;
    if tracked.is_empty() {
        anyhow::bail!("nothing selected to track");
    }
    let subscriptions = SubscriptionSet::from_selection(tracked);
    info!(tracked = subscriptions.len(), "subscriptions frozen");

    let outbound: Arc<dyn Outbound> = Arc::new(connection.outbound());
    let router: Arc<dyn MessageHandler> = Arc::new(Router::new(
        subscriptions,
        outbound,
        owner,
        config.tracking.command.clone(),
    ));

    let cancel = connection.start_polling(router);

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    info!("shutting down");
    cancel.cancel();

    Ok(())
}
