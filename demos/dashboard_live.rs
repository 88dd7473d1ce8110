use inventory_client_core::{ConnectionState, NoticeLevel, RealtimeClient, RealtimeConfig, channels};
use tracing_subscriber::EnvFilter;

/// Follows the dashboard feed of a running inventory backend.
///
/// Reads `INVENTORY_API_URL` (or `INVENTORY_PAGE_HOST` / `INVENTORY_PAGE_SECURE`)
/// and `INVENTORY_ACCESS_TOKEN` from the environment or a `.env` file.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("inventory_client_core=debug,info")),
        )
        .init();

    let config = RealtimeConfig::from_env();
    if config.access_token.is_none() {
        return Err("INVENTORY_ACCESS_TOKEN must be set".into());
    }

    let client = RealtimeClient::from_config(&config)?;
    println!("📡 Live updates endpoint: {}\n", client.endpoint());

    let _stats = client.on("dashboard_stats_update", |message| {
        println!("📊 Dashboard stats: {:?}", message.payload.get("data"));
    });
    let _products = client.on("product_updated", |message| {
        println!("📦 Product {:?}: {:?}", message.str_field("action"), message.payload.get("data"));
    });
    let _movements = client.on("stock_movement_created", |message| {
        println!("🚚 Stock movement: {:?}", message.payload.get("data"));
    });
    let _online = client.on("online_users", |message| {
        println!("👥 Online users: {:?}", message.payload.get("users"));
    });

    for channel in [
        channels::DASHBOARD,
        channels::PRODUCTS,
        channels::STOCK_MOVEMENTS,
        channels::STOCK_TRANSFERS,
    ] {
        client.subscribe_to_channel(channel).await;
    }

    let mut notices = client.notices();
    tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            let icon = match notice.level {
                NoticeLevel::Success => "✅",
                NoticeLevel::Info => "ℹ️",
                NoticeLevel::Warning => "⚠️",
                NoticeLevel::Error => "❌",
            };
            println!("{} {}", icon, notice.message);
        }
    });

    let mut states = client.state_changes().await;
    let watcher = client.clone();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = *states.borrow_and_update();
            println!("🔌 Connection state: {:?}", state);
            if state == ConnectionState::Connected {
                watcher.request_online_users().await;
            }
        }
    });

    client.connect().await;

    println!("Press Ctrl+C to stop\n");
    tokio::signal::ctrl_c().await?;

    println!("Disconnecting...");
    client.disconnect().await;
    Ok(())
}
