//! 手工库存调整工具
//!
//! 运维/管理后台用的命令行入口，直接走库存服务的调整路径：
//!
//! ```text
//! stock-adjust <variant-id> <change> [movement-type] [note]
//! ```

use std::sync::Arc;

use config::AppConfig;
use secrecy::ExposeSecret;
use tracing::info;

use adapter_postgres::{PostgresConfig, check_connection, create_pool};
use inventory::application::commands::AdjustStockCommand;
use inventory::application::ServiceHandler;
use inventory::domain::enums::MovementType;
use inventory::domain::value_objects::VariantId;
use inventory::infrastructure::persistence::PostgresUnitOfWorkFactory;

fn usage() -> ! {
    eprintln!("usage: stock-adjust <variant-id> <change> [movement-type] [note]");
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load("config")?;

    if config.is_production() {
        telemetry::init_tracing_json(&config.telemetry.log_level);
    } else {
        telemetry::init_tracing(&config.telemetry.log_level);
    }
    let _metrics = telemetry::init_metrics();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        usage();
    }

    let variant_id = match VariantId::from_string(&args[1]) {
        Ok(id) => id,
        Err(_) => usage(),
    };
    let change: i64 = match args[2].parse() {
        Ok(change) => change,
        Err(_) => usage(),
    };
    let movement_type = match args.get(3) {
        Some(raw) => match MovementType::try_from(raw.as_str()) {
            Ok(movement_type) => movement_type,
            Err(_) => usage(),
        },
        None => MovementType::Adjustment,
    };
    let note = args.get(4).cloned();

    let pool = create_pool(
        &PostgresConfig::new(config.database.url.expose_secret())
            .with_max_connections(config.database.max_connections),
    )
    .await?;
    check_connection(&pool).await?;

    let uow_factory = Arc::new(PostgresUnitOfWorkFactory::new(pool));
    let handler = ServiceHandler::new(uow_factory);

    let variant = handler
        .adjust_stock(AdjustStockCommand {
            variant_id,
            change,
            movement_type,
            related_id: None,
            note,
        })
        .await?;

    info!(
        variant_id = %variant.id,
        sku = %variant.sku,
        stock = variant.stock,
        "Stock adjustment applied"
    );

    Ok(())
}
