use std::io::Write;
use std::sync::{Arc, OnceLock};

use clap::Parser;
use color_eyre::eyre::Result;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use gatewire::infrastructure::gateway::events::{KNOWN_EVENTS, is_known_event};
use gatewire::infrastructure::{AppConfig, CliArgs, DispatchKey, GatewayClient, StorageManager};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config() -> Result<AppConfig> {
    let args = CliArgs::parse();
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

fn subscription_keys(config: &AppConfig) -> Vec<DispatchKey> {
    if config.subscriptions.is_empty() {
        return KNOWN_EVENTS.iter().copied().map(DispatchKey::from).collect();
    }

    config
        .subscriptions
        .iter()
        .map(|key| {
            let key = DispatchKey::from(key.as_str());
            if let DispatchKey::Named(name) = &key
                && !is_known_event(name)
            {
                warn!(event = %name, "Subscribing to an event the gateway is not known to emit");
            }
            key
        })
        .collect()
}

fn subscribe_all(client: &GatewayClient, keys: &[DispatchKey]) {
    for key in keys {
        let label = key.to_string();
        client.on_message(key.clone(), move |payload| {
            let line = json!({ "event": label, "payload": payload });
            writeln!(std::io::stdout().lock(), "{line}")?;
            Ok(())
        });
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = load_config()?;
    init_logging(&config)?;

    info!(version = gatewire::VERSION, "Starting {}", gatewire::NAME);

    let url = config.gateway.connect_params().to_url()?;
    let keys = subscription_keys(&config);

    // Listeners are dropped on every close. `on_open` runs on the connection
    // task before its first frame is read, so registering there misses nothing.
    let session: Arc<OnceLock<GatewayClient>> = Arc::new(OnceLock::new());
    let on_open_session = Arc::clone(&session);
    let client_config = config
        .gateway
        .client_config()
        .on_open(move || {
            if let Some(client) = on_open_session.get() {
                subscribe_all(client, &keys);
                info!(subscriptions = keys.len(), "Listening for events");
            }
        })
        .on_close(|| info!("Connection closed"))
        .on_error(|e| warn!(error = %e, "Gateway error"));

    let client = session.get_or_init(|| GatewayClient::with_websocket(client_config));
    client.connect(url);

    tokio::signal::ctrl_c().await?;
    info!("Interrupted, disconnecting");
    client.disconnect();

    Ok(())
}
