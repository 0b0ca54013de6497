//! Catalog models: categories and food items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use canteen_core::{Availability, CategoryId, ItemId, ItemSnapshot};

/// A menu category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub is_available: bool,
}

/// Fields accepted when creating or replacing a category.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

/// A catalog food item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: ItemId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl FoodItem {
    /// The menu-facing label given the global ordering flag.
    #[must_use]
    pub const fn availability(&self, accepting_orders: bool) -> Availability {
        Availability::from_flags(accepting_orders, self.is_available)
    }

    /// The frozen copy of this item that goes into a cart.
    #[must_use]
    pub fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            image_url: self.image_url.clone(),
        }
    }
}

/// Fields accepted when creating or replacing a food item.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFoodItem {
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(available: bool) -> FoodItem {
        FoodItem {
            id: ItemId::new(1),
            category_id: Some(CategoryId::new(2)),
            name: "Veg Thali".to_string(),
            description: None,
            price: Decimal::from(120),
            image_url: None,
            is_available: available,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_availability_labels() {
        assert_eq!(item(true).availability(true), Availability::Available);
        assert_eq!(item(false).availability(true), Availability::Out);
        // Store pause shows "Paused" even for individually-unavailable items
        assert_eq!(item(false).availability(false), Availability::Paused);
    }

    #[test]
    fn test_snapshot_copies_price() {
        let item = item(true);
        let snap = item.snapshot();
        assert_eq!(snap.id, item.id);
        assert_eq!(snap.price, Decimal::from(120));
    }

    #[test]
    fn test_new_food_item_defaults_available() {
        let parsed: NewFoodItem =
            serde_json::from_str(r#"{"name": "Chai", "price": "15"}"#).expect("deserialize");
        assert!(parsed.is_available);
        assert!(parsed.category_id.is_none());
    }
}
