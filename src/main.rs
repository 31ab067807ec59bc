// Standard library imports
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// External crate imports
use anyhow::{anyhow, Result};
use dotenv::dotenv;
use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::select;
use tokio::sync::broadcast;

// Internal crate imports
use quote_desk::config_loader::AppConfig;
use quote_desk::domain::enums::{Asset, TradeSide};
use quote_desk::infrastructure::exchange::trade_desk::{ApiCredentials, LoginRequest, TradeDeskClient};
use quote_desk::workflows::quote_confirmation::{AccountDataManager, QuoteController};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .init();
    info!("Logger initialized");

    let config_path = Path::new("../config.toml");
    let config = match AppConfig::from_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config from {}: {}", config_path.display(), e);
            let alt_path = Path::new("./config.toml");
            info!("Attempting to load from alternate path: {}", alt_path.display());
            AppConfig::from_file(alt_path)?
        }
    };
    info!("Configuration loaded, running in docker: {}", config.app.rust_running_in_docker);

    run_desk(config).await
}

async fn run_desk(config: AppConfig) -> Result<()> {
    let credentials = match ApiCredentials::from_env() {
        Ok(credentials) => Some(credentials),
        Err(e) => {
            info!("{}, signing in with email and password", e);
            None
        }
    };

    let client = Arc::new(TradeDeskClient::new(
        config.api_base_url(),
        credentials,
        Duration::from_millis(config.api.timeout_ms),
    )?);

    let mut signed_in = false;
    if client.current_user().await.is_none() {
        let login = LoginRequest::from_env().ok_or_else(|| {
            anyhow!("No valid access token and no login credentials in the environment")
        })?;
        client.login(&login).await?;
        signed_in = true;
    }
    if let Some(user) = client.current_user().await {
        info!(
            "Session for {} ({})",
            user.email.or(user.sub).unwrap_or_default(),
            user.role.unwrap_or_default()
        );
    }

    let account = Arc::new(AccountDataManager::new(client.clone()));
    if let Err(e) = account.refresh_all().await {
        warn!("Initial account load incomplete: {}", e);
    }

    let (shutdown_tx, _) = broadcast::channel::<()>(3);

    let poll_handle = tokio::spawn({
        let account = account.clone();
        let shutdown_rx = shutdown_tx.subscribe();
        let period = Duration::from_secs(config.trading.poll_interval_secs);
        async move {
            if let Err(e) = account.poll_task(period, shutdown_rx).await {
                error!("Account poll task failed: {:?}", e);
            }
        }
    });

    let controller = QuoteController::new(client.clone(), account, config.trading.clone());

    let events_handle = tokio::spawn({
        let mut events = controller.subscribe();
        let mut shutdown_rx = shutdown_tx.subscribe();
        async move {
            loop {
                select! {
                    event = events.recv() => match event {
                        Ok(event) => match serde_json::to_string(&event) {
                            Ok(json) => println!("{}", json),
                            Err(e) => error!("Failed to serialize event: {}", e),
                        },
                        Err(broadcast::error::RecvError::Lagged(n)) => warn!("Event printer skipped {} events", n),
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = shutdown_rx.recv() => break,
                }
            }
        }
    });

    print_help();
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed");
                    break;
                };
                if !handle_command(&controller, line.trim()).await {
                    break;
                }
            }
            _ = sigint.recv() => {
                warn!("SIGINT (Ctrl+C) received. Shutting down...");
                break;
            }
        }
    }

    controller.shutdown().await;
    if let Err(e) = shutdown_tx.send(()) {
        error!("Failed to send shutdown signal: {}", e);
    }

    for (name, handle) in [("poll", poll_handle), ("events", events_handle)] {
        match tokio::time::timeout(Duration::from_secs(2), handle).await {
            Ok(Ok(())) => info!("{} task stopped", name),
            Ok(Err(e)) => error!("{} task panicked: {:?}", name, e),
            Err(_) => warn!("{} task did not stop in time", name),
        }
    }

    if signed_in {
        match tokio::time::timeout(Duration::from_secs(3), client.logout()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Logout failed: {}", e),
            Err(_) => warn!("Logout timed out"),
        }
    }

    info!("Exiting program");
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  buy <btc|eth|usdt> <ngn amount>");
    println!("  sell <btc|eth|usdt> <asset amount>");
    println!("  confirm | requote | cancel | status | quit");
}

/// Runs one console command; returns false when the user asked to quit
async fn handle_command(controller: &QuoteController, line: &str) -> bool {
    let parts: Vec<&str> = line.split_whitespace().collect();

    match parts.as_slice() {
        [] => {}
        ["quit"] | ["exit"] => return false,
        ["help"] => print_help(),
        [side @ ("buy" | "sell"), asset, amount] => {
            let parsed = side
                .parse::<TradeSide>()
                .and_then(|side| Ok((side, asset.parse::<Asset>()?)));
            match parsed {
                Ok((side, asset)) => {
                    if let Some(estimate) = controller
                        .account()
                        .estimate_counter_amount(side, asset, amount.parse().unwrap_or_default())
                        .await
                    {
                        info!("Estimated {} before quoting: {}", side.counter_field(), estimate);
                    }
                    if let Err(e) = controller.submit(side, asset, amount).await {
                        println!("{}", e.user_message());
                    }
                }
                Err(e) => println!("{}", e),
            }
        }
        ["confirm"] => {
            if controller.confirm().await.is_none() {
                println!("No pending order");
            }
        }
        ["requote"] => {
            if let Err(e) = controller.requote().await {
                println!("{}", e.user_message());
            }
        }
        ["cancel"] => {
            if controller.cancel().await.is_none() {
                println!("No pending order");
            }
        }
        ["status"] => {
            let snapshot = controller.snapshot().await;
            match serde_json::to_string_pretty(&snapshot) {
                Ok(json) => println!("{}", json),
                Err(e) => error!("Failed to serialize status: {}", e),
            }
            if let Some(notice) = controller.notice().await {
                println!("{}", notice.message);
            }
        }
        _ => println!("Unknown command '{}', type 'help'", line),
    }
    true
}
