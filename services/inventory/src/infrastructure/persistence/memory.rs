//! 内存版库存存储
//!
//! 测试与无数据库嵌入场景下的默认实现。行锁语义与 PostgreSQL 的
//! select ... for update 一致：锁自加锁读取起持有到提交或回滚，
//! 暂存写入在提交时一次性应用到已提交状态。

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};

use async_trait::async_trait;
use common::{PagedResult, Pagination};
use errors::{AppError, AppResult};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::entities::{ProductVariant, StockMovement};
use crate::domain::repositories::{StockMovementRepository, VariantRepository};
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};
use crate::domain::value_objects::VariantId;

fn lock<'a, T>(mutex: &'a StdMutex<T>) -> MutexGuard<'a, T> {
    mutex.lock().expect("in-memory inventory lock poisoned")
}

/// 内存库存存储（已提交状态）
#[derive(Default)]
pub struct InMemoryInventory {
    variants: StdMutex<HashMap<VariantId, ProductVariant>>,
    movements: StdMutex<Vec<StockMovement>>,
    row_locks: StdMutex<HashMap<VariantId, Arc<AsyncMutex<()>>>>,
}

impl InMemoryInventory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 直接写入已提交状态（测试夹具用）
    pub fn seed_variant(&self, variant: ProductVariant) {
        lock(&self.variants).insert(variant.id.clone(), variant);
    }

    /// 读取已提交的变体状态
    pub fn committed_variant(&self, id: &VariantId) -> Option<ProductVariant> {
        lock(&self.variants).get(id).cloned()
    }

    /// 某变体已提交的全部流水
    pub fn committed_movements(&self, id: &VariantId) -> Vec<StockMovement> {
        lock(&self.movements)
            .iter()
            .filter(|m| &m.variant_id == id)
            .cloned()
            .collect()
    }

    fn row_lock(&self, id: &VariantId) -> Arc<AsyncMutex<()>> {
        lock(&self.row_locks).entry(id.clone()).or_default().clone()
    }
}

/// 事务内暂存的写入
#[derive(Default)]
struct TxStaged {
    variant_inserts: HashMap<VariantId, ProductVariant>,
    variant_updates: HashMap<VariantId, ProductVariant>,
    movement_appends: Vec<StockMovement>,
}

/// 事务状态：暂存写入 + 已持有的行锁
#[derive(Default)]
struct TxState {
    staged: StdMutex<TxStaged>,
    held_locks: StdMutex<HashMap<VariantId, OwnedMutexGuard<()>>>,
}

pub struct InMemoryVariantRepository {
    store: Arc<InMemoryInventory>,
    state: Arc<TxState>,
}

impl InMemoryVariantRepository {
    /// 事务内读取：优先读本事务暂存的写入
    fn read(&self, id: &VariantId) -> Option<ProductVariant> {
        let staged = lock(&self.state.staged);
        if let Some(variant) = staged.variant_updates.get(id) {
            return Some(variant.clone());
        }
        if let Some(variant) = staged.variant_inserts.get(id) {
            return Some(variant.clone());
        }
        drop(staged);

        self.store.committed_variant(id)
    }
}

#[async_trait]
impl VariantRepository for InMemoryVariantRepository {
    async fn find_by_id(&self, id: &VariantId) -> AppResult<Option<ProductVariant>> {
        Ok(self.read(id))
    }

    async fn find_by_id_for_update(&self, id: &VariantId) -> AppResult<Option<ProductVariant>> {
        // 本事务已持有该行锁时直接重读，避免自锁
        let already_held = lock(&self.state.held_locks).contains_key(id);
        if !already_held {
            let row_lock = self.store.row_lock(id);
            let guard = row_lock.lock_owned().await;
            lock(&self.state.held_locks).insert(id.clone(), guard);
        }

        Ok(self.read(id))
    }

    async fn save(&self, variant: &ProductVariant) -> AppResult<()> {
        if self.read(&variant.id).is_some() {
            return Err(AppError::conflict("Variant already exists"));
        }

        lock(&self.state.staged)
            .variant_inserts
            .insert(variant.id.clone(), variant.clone());
        Ok(())
    }

    async fn update(&self, variant: &ProductVariant) -> AppResult<()> {
        if self.read(&variant.id).is_none() {
            return Err(AppError::not_found("Product variant not found"));
        }

        lock(&self.state.staged)
            .variant_updates
            .insert(variant.id.clone(), variant.clone());
        Ok(())
    }
}

pub struct InMemoryStockMovementRepository {
    store: Arc<InMemoryInventory>,
    state: Arc<TxState>,
}

impl InMemoryStockMovementRepository {
    /// 事务内可见的全部流水：已提交 + 本事务暂存
    fn visible_movements(&self, variant_id: &VariantId) -> Vec<StockMovement> {
        let mut movements = self.store.committed_movements(variant_id);
        movements.extend(
            lock(&self.state.staged)
                .movement_appends
                .iter()
                .filter(|m| &m.variant_id == variant_id)
                .cloned(),
        );
        movements
    }
}

#[async_trait]
impl StockMovementRepository for InMemoryStockMovementRepository {
    async fn append(&self, movement: &StockMovement) -> AppResult<()> {
        lock(&self.state.staged)
            .movement_appends
            .push(movement.clone());
        Ok(())
    }

    async fn find_by_variant(
        &self,
        variant_id: &VariantId,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<StockMovement>> {
        let mut movements = self.visible_movements(variant_id);
        movements.sort_by(|a, b| {
            (b.created_at, b.id.0).cmp(&(a.created_at, a.id.0))
        });

        let total = movements.len() as u64;
        let items = movements
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.page_size as usize)
            .collect();

        Ok(PagedResult::new(items, total, pagination))
    }

    async fn sum_changes(&self, variant_id: &VariantId) -> AppResult<i64> {
        Ok(self
            .visible_movements(variant_id)
            .iter()
            .map(|m| m.change)
            .sum())
    }
}

/// 内存版 Unit of Work
pub struct InMemoryUnitOfWork {
    store: Arc<InMemoryInventory>,
    state: Arc<TxState>,
    variant_repo: InMemoryVariantRepository,
    movement_repo: InMemoryStockMovementRepository,
}

impl InMemoryUnitOfWork {
    fn new(store: Arc<InMemoryInventory>) -> Self {
        let state = Arc::new(TxState::default());

        Self {
            store: store.clone(),
            state: state.clone(),
            variant_repo: InMemoryVariantRepository {
                store: store.clone(),
                state: state.clone(),
            },
            movement_repo: InMemoryStockMovementRepository { store, state },
        }
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn variants(&self) -> &dyn VariantRepository {
        &self.variant_repo
    }

    fn stock_movements(&self) -> &dyn StockMovementRepository {
        &self.movement_repo
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let staged = std::mem::take(&mut *lock(&self.state.staged));

        {
            // 同时持有两把集合锁，读者不会看到半套提交
            let mut variants = lock(&self.store.variants);
            let mut movements = lock(&self.store.movements);

            for (id, variant) in staged.variant_inserts {
                variants.insert(id, variant);
            }
            for (id, variant) in staged.variant_updates {
                variants.insert(id, variant);
            }
            movements.extend(staged.movement_appends);
        }

        // 释放全部行锁
        lock(&self.state.held_locks).clear();
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        *lock(&self.state.staged) = TxStaged::default();
        lock(&self.state.held_locks).clear();
        Ok(())
    }
}

/// 内存版 Unit of Work 工厂
pub struct InMemoryUnitOfWorkFactory {
    store: Arc<InMemoryInventory>,
}

impl InMemoryUnitOfWorkFactory {
    pub fn new(store: Arc<InMemoryInventory>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<InMemoryInventory> {
        self.store.clone()
    }
}

#[async_trait]
impl UnitOfWorkFactory for InMemoryUnitOfWorkFactory {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(InMemoryUnitOfWork::new(self.store.clone())))
    }
}

// ============================================================
// 单元测试
// ============================================================
