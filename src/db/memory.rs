//! Process-local store used when no database is configured, and by tests.

use std::collections::HashMap;

use axum::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ItemRepository, Repository, WishlistRepository};
use crate::error::AppResult;
use crate::models::{Item, Permission, Wishlist};

/// Rows are kept in insertion order, which doubles as creation order.
#[derive(Default)]
pub struct MemoryStore {
    wishlists: RwLock<Vec<Wishlist>>,
    items: RwLock<Vec<Item>>,
    viewers: RwLock<HashMap<(Uuid, String), Permission>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository<Wishlist, Uuid> for MemoryStore {
    async fn get(&self, id: Uuid) -> AppResult<Option<Wishlist>> {
        let wishlists = self.wishlists.read().await;
        Ok(wishlists.iter().find(|w| w.id == id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Wishlist>> {
        Ok(self.wishlists.read().await.clone())
    }

    async fn insert(&self, wishlist: Wishlist) -> AppResult<Wishlist> {
        self.wishlists.write().await.push(wishlist.clone());
        Ok(wishlist)
    }

    async fn update(&self, id: Uuid, wishlist: Wishlist) -> AppResult<Option<Wishlist>> {
        let mut wishlists = self.wishlists.write().await;
        Ok(wishlists.iter_mut().find(|w| w.id == id).map(|existing| {
            existing.name = wishlist.name;
            existing.clone()
        }))
    }
}

#[async_trait]
impl WishlistRepository for MemoryStore {
    async fn items(&self, wishlist_id: Uuid) -> AppResult<Vec<Item>> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|item| item.wishlist_id == wishlist_id)
            .cloned()
            .collect())
    }

    async fn owned_by(&self, ownership: &str) -> AppResult<Vec<Wishlist>> {
        let wishlists = self.wishlists.read().await;
        Ok(wishlists
            .iter()
            .filter(|w| w.ownership == ownership)
            .cloned()
            .collect())
    }

    async fn saved_by(&self, ownership: &str) -> AppResult<Vec<(Wishlist, Permission)>> {
        let wishlists = self.wishlists.read().await;
        let viewers = self.viewers.read().await;
        Ok(wishlists
            .iter()
            .filter_map(|w| {
                viewers
                    .get(&(w.id, ownership.to_string()))
                    .map(|permission| (w.clone(), *permission))
            })
            .collect())
    }

    async fn permission(&self, wishlist_id: Uuid, ownership: &str) -> AppResult<Option<Permission>> {
        let viewers = self.viewers.read().await;
        Ok(viewers.get(&(wishlist_id, ownership.to_string())).copied())
    }

    async fn grant(&self, wishlist_id: Uuid, ownership: &str, permission: Permission) -> AppResult<()> {
        self.viewers
            .write()
            .await
            .entry((wishlist_id, ownership.to_string()))
            .and_modify(|held| *held = (*held).max(permission))
            .or_insert(permission);
        Ok(())
    }
}

#[async_trait]
impl Repository<Item, Uuid> for MemoryStore {
    async fn get(&self, id: Uuid) -> AppResult<Option<Item>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Item>> {
        Ok(self.items.read().await.clone())
    }

    async fn insert(&self, item: Item) -> AppResult<Item> {
        self.items.write().await.push(item.clone());
        Ok(item)
    }

    async fn update(&self, id: Uuid, item: Item) -> AppResult<Option<Item>> {
        let mut items = self.items.write().await;
        Ok(items.iter_mut().find(|existing| existing.id == id).map(|existing| {
            existing.url = item.url;
            existing.name = item.name;
            existing.description = item.description;
            existing.image = item.image;
            existing.clone()
        }))
    }
}

impl ItemRepository for MemoryStore {}
