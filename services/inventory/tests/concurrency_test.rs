//! 并发调整测试
//!
//! 验证行锁对同一变体的串行化，以及不同变体之间互不阻塞。

use std::sync::Arc;
use std::time::Duration;

use errors::AppError;
use tokio::sync::Barrier;

use inventory::application::ServiceHandler;
use inventory::application::commands::AdjustStockCommand;
use inventory::domain::entities::ProductVariant;
use inventory::domain::enums::MovementType;
use inventory::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};
use inventory::domain::value_objects::VariantId;
use inventory::infrastructure::persistence::{InMemoryInventory, InMemoryUnitOfWorkFactory};

fn handler_with_store() -> (Arc<ServiceHandler>, Arc<InMemoryInventory>) {
    let store = InMemoryInventory::new();
    let factory = Arc::new(InMemoryUnitOfWorkFactory::new(store.clone()));
    (Arc::new(ServiceHandler::new(factory)), store)
}

fn seed_variant(store: &InMemoryInventory, sku: &str, stock: i64) -> VariantId {
    let variant = ProductVariant::new(sku, stock);
    let variant_id = variant.id.clone();
    store.seed_variant(variant);
    variant_id
}

fn sale(variant_id: &VariantId, change: i64) -> AdjustStockCommand {
    AdjustStockCommand {
        variant_id: variant_id.clone(),
        change,
        movement_type: MovementType::Sale,
        related_id: None,
        note: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_contended_adjustments_serialize() {
    let (handler, store) = handler_with_store();
    let variant_id = seed_variant(&store, "TSHIRT-RED-M", 10);
    let barrier = Arc::new(Barrier::new(2));

    let mut tasks = Vec::new();
    for _ in 0..2 {
        let handler = handler.clone();
        let variant_id = variant_id.clone();
        let barrier = barrier.clone();
        tasks.push(tokio::spawn(async move {
            barrier.wait().await;
            handler.adjust_stock(sale(&variant_id, -6)).await
        }));
    }

    let mut ok = 0;
    let mut insufficient = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(variant) => {
                ok += 1;
                assert_eq!(variant.stock, 4);
            }
            Err(AppError::Validation(_)) => insufficient += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    // 恰好一个成功、一个因库存不足失败；不会双双成功（-2），
    // 也不会因丢失更新得到错误的正数
    assert_eq!(ok, 1);
    assert_eq!(insufficient, 1);
    assert_eq!(store.committed_variant(&variant_id).unwrap().stock, 4);
    assert_eq!(store.committed_movements(&variant_id).len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sales_never_oversell() {
    let (handler, store) = handler_with_store();
    let variant_id = seed_variant(&store, "TSHIRT-RED-M", 5);
    let barrier = Arc::new(Barrier::new(10));

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let handler = handler.clone();
        let variant_id = variant_id.clone();
        let barrier = barrier.clone();
        tasks.push(tokio::spawn(async move {
            barrier.wait().await;
            handler.adjust_stock(sale(&variant_id, -1)).await
        }));
    }

    let mut ok = 0;
    let mut insufficient = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => ok += 1,
            Err(AppError::Validation(_)) => insufficient += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(ok, 5);
    assert_eq!(insufficient, 5);

    let variant = store.committed_variant(&variant_id).unwrap();
    assert_eq!(variant.stock, 0);
    assert_eq!(store.committed_movements(&variant_id).len(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_different_variants_do_not_block() {
    let (handler, store) = handler_with_store();
    let factory = InMemoryUnitOfWorkFactory::new(store.clone());
    let locked_id = seed_variant(&store, "TSHIRT-RED-M", 10);
    let free_id = seed_variant(&store, "HOODIE-BLK-L", 10);

    // 持有另一个变体的行锁
    let uow = factory.begin().await.unwrap();
    uow.variants()
        .find_by_id_for_update(&locked_id)
        .await
        .unwrap();

    // 不相关变体的调整不应等待该锁
    let result = tokio::time::timeout(
        Duration::from_secs(1),
        handler.adjust_stock(sale(&free_id, -2)),
    )
    .await
    .expect("adjustment to an unlocked variant must not block");

    assert_eq!(result.unwrap().stock, 8);
    uow.rollback().await.unwrap();
}
