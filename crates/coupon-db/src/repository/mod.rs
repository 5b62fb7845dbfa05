//! # Repository Module
//!
//! Database repository implementations for the coupon backend.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  API service                                                           │
//! │       │                                                                 │
//! │       │  db.coupons().get_by_code("WELCOME2024")                       │
//! │       ▼                                                                 │
//! │  CouponRepository                                                      │
//! │  ├── get_by_code / get_by_codes                                        │
//! │  ├── get_by_id, list_all                                               │
//! │  ├── insert, update, delete                                            │
//! │  └── list_by_creator, list_with_creators                               │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`coupon::CouponRepository`] - Coupon CRUD, lookups, report listings
//! - [`user::UserRepository`] - Admin users
//! - [`usage::UsageRepository`] - Redemption history and counters

pub mod coupon;
pub mod usage;
pub mod user;
