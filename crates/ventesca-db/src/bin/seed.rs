//! # Seed Data Generator
//!
//! Populates a tenant with a small catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default development tenant
//! cargo run -p ventesca-db --bin seed
//!
//! # Specify database path and tenant
//! cargo run -p ventesca-db --bin seed -- --db ./data/ventesca.db --tenant <UUID>
//! ```
//!
//! ## Generated Data
//! - Categories: Bebidas, Snacks, Lácteos, Almacén
//! - One supplier per category
//! - Products `{CAT}-{NNN}` with cost at 60-80% of price and stock 0-50
//! - Discounts covering every scope:
//!   - GLOBAL 5% (inactive, toggle it to try it out)
//!   - CATEGORY 10% on Bebidas from 6 units
//!   - SINGLE_PRODUCT $50 per unit on the first snack

use chrono::Utc;
use std::env;
use tracing::{info, warn};
use uuid::Uuid;
use ventesca_core::{
    ApplicationMethod, Category, Discount, DiscountScope, DiscountType, Product, Supplier,
};
use ventesca_db::{Database, DbConfig};

const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Category code, display name and product names.
const CATALOG: &[(&str, &str, &[&str])] = &[
    (
        "BEB",
        "Bebidas",
        &[
            "Agua Mineral 500ml",
            "Agua Mineral 1.5L",
            "Bebida Cola 350ml",
            "Bebida Cola 1.5L",
            "Jugo Naranja 1L",
            "Té Helado 500ml",
            "Bebida Energética",
            "Cerveza Lager 6-Pack",
        ],
    ),
    (
        "SNK",
        "Snacks",
        &[
            "Papas Fritas Clásicas",
            "Maní Salado",
            "Galletas de Chocolate",
            "Barra de Cereal",
            "Chocolate de Leche",
            "Gomitas Frutales",
        ],
    ),
    (
        "LAC",
        "Lácteos",
        &[
            "Leche Entera 1L",
            "Leche Descremada 1L",
            "Yogur Natural",
            "Queso Gouda 250g",
            "Mantequilla 250g",
        ],
    ),
    (
        "ALM",
        "Almacén",
        &[
            "Arroz Grado 1 1kg",
            "Fideos Spaghetti 400g",
            "Aceite Maravilla 1L",
            "Azúcar 1kg",
            "Sal de Mesa 1kg",
            "Harina 1kg",
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info,ventesca_db=info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./ventesca_dev.db");
    let mut tenant_id = String::from(DEFAULT_TENANT_ID);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--tenant" | "-t" => {
                if i + 1 < args.len() {
                    tenant_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Ventesca Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (default: ./ventesca_dev.db)");
                println!("  -t, --tenant <UUID>   Tenant to seed (default: {})", DEFAULT_TENANT_ID);
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, tenant = %tenant_id, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.products().count(&tenant_id).await?;
    if existing > 0 {
        warn!(
            existing,
            "Tenant already has products; skipping seed to avoid duplicates"
        );
        return Ok(());
    }

    let now = Utc::now();
    let mut seed: usize = 0;
    let mut first_snack: Option<String> = None;
    let mut beverages: Option<String> = None;

    for (code, category_name, names) in CATALOG {
        let category = db
            .categories()
            .insert(&Category {
                id: Uuid::new_v4().to_string(),
                tenant_id: tenant_id.clone(),
                name: category_name.to_string(),
                description: None,
                created_at: now,
            })
            .await?;

        let supplier = db
            .suppliers()
            .insert(&Supplier {
                id: Uuid::new_v4().to_string(),
                tenant_id: tenant_id.clone(),
                name: format!("Distribuidora {}", category_name),
                contact: None,
                created_at: now,
            })
            .await?;

        if *code == "BEB" {
            beverages = Some(category.id.clone());
        }

        for (idx, name) in names.iter().enumerate() {
            seed += 1;

            let selling_price = 490 + ((seed * 370) % 4500) as i64;
            let cost = selling_price * (60 + (seed % 20) as i64) / 100;

            let product = Product {
                id: Uuid::new_v4().to_string(),
                tenant_id: tenant_id.clone(),
                code: format!("{}-{:03}", code, idx + 1),
                name: name.to_string(),
                cost,
                selling_price,
                stock: (seed * 7 % 51) as i64,
                is_active: true,
                is_deleted: false,
                category_id: Some(category.id.clone()),
                supplier_id: Some(supplier.id.clone()),
                created_at: now,
                updated_at: now,
            };

            if let Err(e) = db.products().insert(&product).await {
                warn!(code = %product.code, error = %e, "Failed to insert product");
                continue;
            }

            if *code == "SNK" && first_snack.is_none() {
                first_snack = Some(product.id.clone());
            }
        }
    }

    let discount = |name: &str, scope, discount_type, method, value, minimum_quantity, active| {
        Discount {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.clone(),
            name: name.to_string(),
            scope,
            discount_type,
            application_method: method,
            value,
            minimum_quantity,
            valid_from: None,
            valid_until: None,
            is_active: active,
            created_at: now,
        }
    };

    db.discounts()
        .insert(
            &discount(
                "Descuento general 5%",
                DiscountScope::Global,
                DiscountType::Percentage,
                ApplicationMethod::ToTotal,
                5,
                1,
                false,
            ),
            &[],
            &[],
        )
        .await?;

    if let Some(category_id) = beverages {
        db.discounts()
            .insert(
                &discount(
                    "Bebidas 10% desde 6 unidades",
                    DiscountScope::Category,
                    DiscountType::Percentage,
                    ApplicationMethod::ToTotal,
                    10,
                    6,
                    true,
                ),
                &[],
                &[category_id],
            )
            .await?;
    }

    if let Some(product_id) = first_snack {
        db.discounts()
            .insert(
                &discount(
                    "$50 por unidad",
                    DiscountScope::SingleProduct,
                    DiscountType::Fixed,
                    ApplicationMethod::ByProduct,
                    50,
                    1,
                    true,
                ),
                &[product_id],
                &[],
            )
            .await?;
    }

    let valuation = db.products().valuation(&tenant_id).await?;
    info!(
        products = valuation.product_count,
        units = valuation.total_units,
        selling_value = valuation.total_selling_value,
        "Seed complete"
    );

    Ok(())
}
