pub mod memory;
pub mod postgres;

use std::time::Duration;

use axum::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Item, Permission, Wishlist};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Row access keyed by an identifier of type `I`.
#[async_trait]
pub trait Repository<M, I>: Send + Sync {
    async fn get(&self, id: I) -> AppResult<Option<M>>;

    async fn list(&self) -> AppResult<Vec<M>>;

    /// Store a new row and return it as persisted.
    async fn insert(&self, model: M) -> AppResult<M>;

    /// Overwrite the mutable fields of row `id` with those of `model`.
    /// Returns `None` when no such row exists.
    async fn update(&self, id: I, model: M) -> AppResult<Option<M>>;
}

#[async_trait]
pub trait WishlistRepository: Repository<Wishlist, Uuid> {
    /// Items of a wishlist, oldest first.
    async fn items(&self, wishlist_id: Uuid) -> AppResult<Vec<Item>>;

    async fn owned_by(&self, ownership: &str) -> AppResult<Vec<Wishlist>>;

    /// Wishlists the key registered for, with the permission it holds.
    async fn saved_by(&self, ownership: &str) -> AppResult<Vec<(Wishlist, Permission)>>;

    async fn permission(&self, wishlist_id: Uuid, ownership: &str) -> AppResult<Option<Permission>>;

    /// Register `ownership` on a wishlist with `permission`, or raise the
    /// permission it already holds. A held `EDIT` is never lowered.
    async fn grant(&self, wishlist_id: Uuid, ownership: &str, permission: Permission) -> AppResult<()>;

    async fn health(&self) -> AppResult<()> {
        Ok(())
    }
}

pub trait ItemRepository: Repository<Item, Uuid> {}

pub async fn create_pool(database_url: &str) -> AppResult<PgPool> {
    info!("🔌 Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {:?}", e);
            AppError::Database(e)
        })?;

    info!("✅ Database connection pool created");
    Ok(pool)
}

pub async fn health_check(pool: &PgPool) -> AppResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

    Ok(())
}
