//! # Seed Data Generator
//!
//! Creates the default admin account and a handful of sample coupons for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed ./coupons_dev.db
//! cargo run -p coupon-db --bin seed
//!
//! # Specify database path
//! cargo run -p coupon-db --bin seed -- --db ./data/coupons.db
//! ```
//!
//! ## Generated Data
//! - `admin` / `admin123`
//! - `WELCOME2024`: 10% off, cannot be combined
//! - `SAVE5`: 5.00 off, stackable
//! - `SPRING15`: 15% off, stackable, 100 uses
//! - `EXPIRED10`: 10% off, expired yesterday
//!
//! Safe to run repeatedly: existing rows are left alone.

use chrono::{Duration, Utc};
use coupon_core::{Coupon, DiscountType, User};
use coupon_db::password::hash_password;
use coupon_db::{Database, DbConfig};
use rust_decimal::Decimal;
use std::env;
use uuid::Uuid;

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin123";

/// (code, description, type, value in whole percent or currency units,
/// stackable, max uses, expires in days)
const SAMPLE_COUPONS: &[(&str, &str, DiscountType, i64, bool, Option<i64>, i64)] = &[
    (
        "WELCOME2024",
        "Welcome discount for new customers",
        DiscountType::Percentage,
        10,
        false,
        Some(1000),
        365,
    ),
    (
        "SAVE5",
        "Five dollars off any order",
        DiscountType::FixedAmount,
        5,
        true,
        None,
        90,
    ),
    (
        "SPRING15",
        "Spring sale",
        DiscountType::Percentage,
        15,
        true,
        Some(100),
        60,
    ),
    (
        "EXPIRED10",
        "Last season's promotion",
        DiscountType::Percentage,
        10,
        true,
        None,
        -1,
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./coupons_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Coupon Management Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./coupons_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Coupon Management Seed Data Generator");
    println!("========================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let admin = match db.users().get_by_username(ADMIN_USERNAME).await? {
        Some(existing) => {
            println!("• User '{}' already exists", ADMIN_USERNAME);
            existing
        }
        None => {
            let user = User {
                id: Uuid::new_v4().to_string(),
                username: ADMIN_USERNAME.to_string(),
                password_hash: hash_password(ADMIN_PASSWORD)?,
                is_active: true,
                created_at: Utc::now(),
                last_login: None,
            };
            db.users().insert(&user).await?;
            println!("✓ Created user '{}' (password: {})", ADMIN_USERNAME, ADMIN_PASSWORD);
            user
        }
    };

    let mut created = 0;
    for (code, description, discount_type, value, stackable, max_uses, expires_in_days) in
        SAMPLE_COUPONS
    {
        if db.coupons().code_exists(code, None).await? {
            println!("• Coupon {} already exists", code);
            continue;
        }

        let now = Utc::now();
        let coupon = Coupon {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            description: Some(description.to_string()),
            discount_type: *discount_type,
            discount_value: Decimal::from(*value),
            expiry_date: Some(now + Duration::days(*expires_in_days)),
            max_usage_count: *max_uses,
            current_usage_count: 0,
            is_active: true,
            allow_multiple_discounts: *stackable,
            created_by_id: admin.id.clone(),
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = db.coupons().insert(&coupon).await {
            eprintln!("Failed to insert {}: {}", code, e);
            continue;
        }

        println!("✓ Created coupon {} ({} {})", code, discount_type, value);
        created += 1;
    }

    println!();
    println!(
        "✓ Seed complete! {} new coupons, {} total",
        created,
        db.coupons().count().await?
    );

    Ok(())
}
