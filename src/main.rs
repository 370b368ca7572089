use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

use gatekeeper_bot::application::audit::AuditLog;
use gatekeeper_bot::application::errors::BotError;
use gatekeeper_bot::application::messaging::{Dispatcher, MessageParser};
use gatekeeper_bot::application::registry::{CommandTable, RoleRegistry};
use gatekeeper_bot::application::services::MessageService;
use gatekeeper_bot::domain::traits::Bot;
use gatekeeper_bot::infrastructure::adapters::console::ConsoleAdapter;
use gatekeeper_bot::infrastructure::adapters::telegram::{Message, TelegramAdapter};
use gatekeeper_bot::infrastructure::config::Config;
use gatekeeper_bot::infrastructure::logging;
use gatekeeper_bot::infrastructure::storage::JsonStore;

#[derive(Parser)]
#[command(name = "gatekeeper-bot")]
#[command(about = "Role-gated custom command bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            if let Err(e) = run_bot(&cli.config, cli.token) {
                tracing::error!("Bot stopped: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("gatekeeper-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn run_bot(config_path: &str, token_override: Option<String>) -> Result<(), BotError> {
    // Config comes first: it decides where logs go, so errors go to stderr
    let config = Config::resolve(config_path, token_override).inspect_err(|e| {
        eprintln!("Failed to load config {}: {}", config_path, e);
    })?;

    if let Some(path) = logging::init(config.logging.directory.as_deref()) {
        tracing::info!("Logging to {}", path.display());
    }
    tracing::info!("Starting {}", config.bot.name);

    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        eprintln!("Failed to start runtime: {}", e);
        BotError::Internal(e.to_string())
    })?;
    rt.block_on(serve(config))
}

async fn serve(config: Config) -> Result<(), BotError> {
    let store = Arc::new(JsonStore::new(&config.storage));
    store.init().await?;

    let roles = Arc::new(RoleRegistry::load(store.clone()).await?);
    let seeded = roles.seed_admins(&config.bot.seed_admins).await?;
    if seeded > 0 {
        tracing::info!("Seeded {} admins from config", seeded);
    }
    if roles.list_admins().await.is_empty() {
        tracing::warn!("No admins configured; management commands are unusable until bot.seed-admins is set");
    }

    let commands = Arc::new(CommandTable::load(store).await?);
    let dispatcher = Dispatcher::new(roles, commands);
    let audit = Arc::new(open_audit(&config).await);
    let parser = MessageParser::new(config.bot.command_markers.clone());

    if let Some(token) = config.telegram_token() {
        let timeout = config.adapters.telegram.poll_timeout_seconds;
        let mut bot = TelegramAdapter::new(token, Duration::from_secs(timeout))?;
        bot.fetch_bot_info().await?;
        if let Err(e) = bot.register_commands().await {
            tracing::warn!("Failed to register commands: {}", e);
        }

        let dispatcher = Arc::new(dispatcher.with_bot_username(bot.bot_info().username));
        let service = MessageService::new(bot, parser, dispatcher, audit);
        run_telegram_bot(&service, timeout).await
    } else if config.adapters.console.enabled {
        let bot = ConsoleAdapter::new(config.adapters.console.user_id);
        let dispatcher = Arc::new(dispatcher.with_bot_username(bot.bot_info().username));
        let service = MessageService::new(bot, parser, dispatcher, audit);
        run_console_bot(&service).await
    } else {
        Err(BotError::Internal("No adapter enabled: set a Telegram token or enable the console adapter".to_string()))
    }
}

async fn open_audit(config: &Config) -> AuditLog {
    let path = match (&config.audit.path, config.audit.enabled) {
        (Some(path), true) => path,
        _ => return AuditLog::disabled(),
    };

    match AuditLog::open(path).await {
        Ok(audit) => {
            tracing::info!("Audit log at {}", path.display());
            audit
        }
        Err(e) => {
            tracing::warn!("Failed to open audit log {}: {}, auditing to tracing only", path.display(), e);
            AuditLog::disabled()
        }
    }
}

async fn run_telegram_bot(service: &MessageService<TelegramAdapter>, timeout_seconds: u64) -> Result<(), BotError> {
    let bot = service.bot();
    bot.start().await?;
    tracing::info!("Bot started: @{}", bot.bot_info().username);

    let mut offset: i64 = 0;

    tracing::info!("Starting message loop...");

    loop {
        let updates = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                return Ok(());
            }
            updates = bot.get_updates(offset, timeout_seconds) => updates,
        };

        match updates {
            Ok(updates) => {
                if !updates.is_empty() {
                    tracing::debug!("Received {} updates", updates.len());
                }
                for update in &updates {
                    if let Some(message) = update.message.as_ref().and_then(Message::to_incoming) {
                        service.process(&message).await;
                    }
                }

                offset = TelegramAdapter::get_next_offset(&updates, offset);
            }
            Err(e) => {
                tracing::error!("Failed to get updates: {}", e);
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }
}

async fn run_console_bot(service: &MessageService<ConsoleAdapter>) -> Result<(), BotError> {
    let bot = service.bot();
    bot.start().await?;
    tracing::info!("Bot started: @{}", bot.bot_info().username);
    println!("Type commands, prefix a line with @<user_id> to act as another user. Ctrl-D quits.");

    while let Some(message) = bot.read_message().await? {
        service.process(&message).await;
    }
    Ok(())
}

fn init_config() {
    match serde_yaml::to_string(&Config::default()) {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => eprintln!("Failed to render default config: {}", e),
    }
}
