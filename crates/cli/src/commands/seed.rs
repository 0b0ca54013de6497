//! Catalog seed command.
//!
//! Inserts a small sample menu for local development. Idempotent: existing
//! categories (matched by name) are reused and their items skipped.

use rust_decimal::Decimal;

use super::{CommandError, connect};

struct SeedCategory {
    name: &'static str,
    display_order: i32,
    items: &'static [SeedItem],
}

struct SeedItem {
    name: &'static str,
    description: &'static str,
    price_paise: i64,
}

const SEED: &[SeedCategory] = &[
    SeedCategory {
        name: "Breakfast",
        display_order: 1,
        items: &[
            SeedItem {
                name: "Masala Dosa",
                description: "Crispy dosa with potato masala and chutney",
                price_paise: 6000,
            },
            SeedItem {
                name: "Idli Sambar",
                description: "Two idlis with sambar",
                price_paise: 4000,
            },
            SeedItem {
                name: "Poha",
                description: "Flattened rice with peanuts and lemon",
                price_paise: 3000,
            },
        ],
    },
    SeedCategory {
        name: "Meals",
        display_order: 2,
        items: &[
            SeedItem {
                name: "Veg Thali",
                description: "Rice, two sabzis, dal, roti, and curd",
                price_paise: 12000,
            },
            SeedItem {
                name: "Paneer Butter Masala",
                description: "With four rotis",
                price_paise: 14000,
            },
        ],
    },
    SeedCategory {
        name: "Snacks & Drinks",
        display_order: 3,
        items: &[
            SeedItem {
                name: "Samosa",
                description: "With tamarind chutney",
                price_paise: 2000,
            },
            SeedItem {
                name: "Masala Chai",
                description: "",
                price_paise: 1500,
            },
            SeedItem {
                name: "Sweet Lassi",
                description: "",
                price_paise: 4500,
            },
        ],
    },
];

/// Seed the catalog with sample categories and items.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    for category in SEED {
        let existing: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM categories WHERE name = $1")
                .bind(category.name)
                .fetch_optional(&pool)
                .await?;

        if existing.is_some() {
            tracing::info!(category = category.name, "category exists, skipping");
            continue;
        }

        let (category_id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO categories (name, display_order, is_available)
            VALUES ($1, $2, TRUE)
            RETURNING id
            ",
        )
        .bind(category.name)
        .bind(category.display_order)
        .fetch_one(&pool)
        .await?;

        for item in category.items {
            let description = (!item.description.is_empty()).then_some(item.description);
            sqlx::query(
                r"
                INSERT INTO food_items (category_id, name, description, price, is_available)
                VALUES ($1, $2, $3, $4, TRUE)
                ",
            )
            .bind(category_id)
            .bind(item.name)
            .bind(description)
            .bind(Decimal::new(item.price_paise, 2))
            .execute(&pool)
            .await?;
        }

        tracing::info!(
            category = category.name,
            items = category.items.len(),
            "seeded"
        );
    }

    tracing::info!("Seed complete!");
    Ok(())
}
