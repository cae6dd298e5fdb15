use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================================================
// Wishlist Models
// ============================================================================

/// Internal database row. Not serializable — use WishlistDto for API
/// responses so the password hash and owner key never leave the server.
#[derive(Debug, Clone, FromRow)]
pub struct Wishlist {
    pub id: Uuid,
    pub name: String,
    pub password_hash: String,
    /// Session key of the creator.
    pub ownership: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WishlistDto {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Wishlist> for WishlistDto {
    fn from(wishlist: Wishlist) -> Self {
        WishlistDto {
            id: wishlist.id,
            name: wishlist.name,
            created_at: wishlist.created_at,
        }
    }
}

/// Returned once, to the creator, when a wishlist is created. The plain
/// password is what other users need to gain edit access.
#[derive(Debug, Serialize)]
pub struct UnlockedWishlistDto {
    pub id: Uuid,
    pub name: String,
    pub password: String,
    pub ownership: String,
    pub created_at: DateTime<Utc>,
}

/// A wishlist the caller can see, with the access they hold on it.
#[derive(Debug, Serialize)]
pub struct PermissionedWishlistDto {
    #[serde(flatten)]
    pub wishlist: WishlistDto,
    pub permission: Permission,
}

// ============================================================================
// Permission Models
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
pub enum Permission {
    View,
    Edit,
}

// ============================================================================
// Item Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, PartialEq, Eq)]
pub struct Item {
    pub id: Uuid,
    pub wishlist_id: Uuid,
    pub url: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemDto {
    pub url: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl Item {
    /// Overwrite the fields present in `update`.
    pub fn apply(&mut self, update: UpdateItemDto) {
        if let Some(url) = update.url {
            self.url = url;
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(image) = update.image {
            self.image = image;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_serializes_uppercase() {
        assert_eq!(serde_json::to_value(Permission::Edit).unwrap(), "EDIT");
        assert_eq!(serde_json::to_value(Permission::View).unwrap(), "VIEW");
    }

    #[test]
    fn edit_outranks_view() {
        assert!(Permission::Edit > Permission::View);
    }

    #[test]
    fn permissioned_wishlist_is_flattened() {
        let dto = PermissionedWishlistDto {
            wishlist: WishlistDto {
                id: Uuid::nil(),
                name: "Birthday".into(),
                created_at: Utc::now(),
            },
            permission: Permission::View,
        };
        let json = serde_json::to_value(dto).unwrap();
        assert_eq!(json["name"], "Birthday");
        assert_eq!(json["permission"], "VIEW");
    }

    #[test]
    fn apply_only_overwrites_present_fields() {
        let mut item = Item {
            id: Uuid::new_v4(),
            wishlist_id: Uuid::new_v4(),
            url: "https://a.example".into(),
            name: "Kettle".into(),
            description: "old".into(),
            image: "/k.png".into(),
            created_at: Utc::now(),
        };
        item.apply(UpdateItemDto {
            url: None,
            name: Some("Blue Kettle".into()),
            description: Some(String::new()),
            image: None,
        });
        assert_eq!(item.name, "Blue Kettle");
        assert_eq!(item.description, "");
        assert_eq!(item.url, "https://a.example");
        assert_eq!(item.image, "/k.png");
    }
}
