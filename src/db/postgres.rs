//! Postgres-backed store.
//!
//! Expects the following tables (schema management lives outside this crate):
//!
//! ```sql
//! wishlists        (id UUID PRIMARY KEY, name TEXT NOT NULL, password_hash TEXT NOT NULL,
//!                   ownership TEXT NOT NULL, created_at TIMESTAMPTZ NOT NULL)
//! items            (id UUID PRIMARY KEY, wishlist_id UUID NOT NULL REFERENCES wishlists(id),
//!                   url TEXT NOT NULL, name TEXT NOT NULL, description TEXT NOT NULL,
//!                   image TEXT NOT NULL, created_at TIMESTAMPTZ NOT NULL)
//! wishlist_viewers (wishlist_id UUID NOT NULL REFERENCES wishlists(id), ownership TEXT NOT NULL,
//!                   permission TEXT NOT NULL DEFAULT 'VIEW', PRIMARY KEY (wishlist_id, ownership))
//! ```

use axum::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{health_check, ItemRepository, Repository, WishlistRepository};
use crate::error::AppResult;
use crate::models::{Item, Permission, Wishlist};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

#[derive(FromRow)]
struct SavedWishlistRow {
    #[sqlx(flatten)]
    wishlist: Wishlist,
    permission: Permission,
}

#[async_trait]
impl Repository<Wishlist, Uuid> for PgStore {
    async fn get(&self, id: Uuid) -> AppResult<Option<Wishlist>> {
        let wishlist = sqlx::query_as::<_, Wishlist>(
            "SELECT id, name, password_hash, ownership, created_at
             FROM wishlists WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(wishlist)
    }

    async fn list(&self) -> AppResult<Vec<Wishlist>> {
        let wishlists = sqlx::query_as::<_, Wishlist>(
            "SELECT id, name, password_hash, ownership, created_at
             FROM wishlists ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(wishlists)
    }

    async fn insert(&self, wishlist: Wishlist) -> AppResult<Wishlist> {
        let wishlist = sqlx::query_as::<_, Wishlist>(
            "INSERT INTO wishlists (id, name, password_hash, ownership, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, password_hash, ownership, created_at",
        )
        .bind(wishlist.id)
        .bind(&wishlist.name)
        .bind(&wishlist.password_hash)
        .bind(&wishlist.ownership)
        .bind(wishlist.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(wishlist)
    }

    async fn update(&self, id: Uuid, wishlist: Wishlist) -> AppResult<Option<Wishlist>> {
        let wishlist = sqlx::query_as::<_, Wishlist>(
            "UPDATE wishlists SET name = $1 WHERE id = $2
             RETURNING id, name, password_hash, ownership, created_at",
        )
        .bind(&wishlist.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(wishlist)
    }
}

#[async_trait]
impl WishlistRepository for PgStore {
    async fn items(&self, wishlist_id: Uuid) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, wishlist_id, url, name, description, image, created_at
             FROM items WHERE wishlist_id = $1 ORDER BY created_at ASC",
        )
        .bind(wishlist_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn owned_by(&self, ownership: &str) -> AppResult<Vec<Wishlist>> {
        let wishlists = sqlx::query_as::<_, Wishlist>(
            "SELECT id, name, password_hash, ownership, created_at
             FROM wishlists WHERE ownership = $1 ORDER BY created_at ASC",
        )
        .bind(ownership)
        .fetch_all(&self.pool)
        .await?;
        Ok(wishlists)
    }

    async fn saved_by(&self, ownership: &str) -> AppResult<Vec<(Wishlist, Permission)>> {
        let rows = sqlx::query_as::<_, SavedWishlistRow>(
            "SELECT w.id, w.name, w.password_hash, w.ownership, w.created_at, v.permission
             FROM wishlists w
             JOIN wishlist_viewers v ON v.wishlist_id = w.id
             WHERE v.ownership = $1
             ORDER BY w.created_at ASC",
        )
        .bind(ownership)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.wishlist, row.permission))
            .collect())
    }

    async fn permission(&self, wishlist_id: Uuid, ownership: &str) -> AppResult<Option<Permission>> {
        let permission = sqlx::query_scalar::<_, Permission>(
            "SELECT permission FROM wishlist_viewers
             WHERE wishlist_id = $1 AND ownership = $2",
        )
        .bind(wishlist_id)
        .bind(ownership)
        .fetch_optional(&self.pool)
        .await?;
        Ok(permission)
    }

    async fn grant(&self, wishlist_id: Uuid, ownership: &str, permission: Permission) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO wishlist_viewers (wishlist_id, ownership, permission)
             VALUES ($1, $2, $3)
             ON CONFLICT (wishlist_id, ownership)
             DO UPDATE SET permission = EXCLUDED.permission
             WHERE wishlist_viewers.permission = 'VIEW'",
        )
        .bind(wishlist_id)
        .bind(ownership)
        .bind(permission)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn health(&self) -> AppResult<()> {
        health_check(&self.pool).await
    }
}

#[async_trait]
impl Repository<Item, Uuid> for PgStore {
    async fn get(&self, id: Uuid) -> AppResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            "SELECT id, wishlist_id, url, name, description, image, created_at
             FROM items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn list(&self) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, wishlist_id, url, name, description, image, created_at
             FROM items ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn insert(&self, item: Item) -> AppResult<Item> {
        let item = sqlx::query_as::<_, Item>(
            "INSERT INTO items (id, wishlist_id, url, name, description, image, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, wishlist_id, url, name, description, image, created_at",
        )
        .bind(item.id)
        .bind(item.wishlist_id)
        .bind(&item.url)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.image)
        .bind(item.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    async fn update(&self, id: Uuid, item: Item) -> AppResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            "UPDATE items
             SET url = $1, name = $2, description = $3, image = $4
             WHERE id = $5
             RETURNING id, wishlist_id, url, name, description, image, created_at",
        )
        .bind(&item.url)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.image)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }
}

impl ItemRepository for PgStore {}
