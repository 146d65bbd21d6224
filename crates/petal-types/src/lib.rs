//! Shared data contracts for petal.
//!
//! `models` holds the stored entities, `api` the HTTP bodies, and `catalog`
//! the fixed flower table every bouquet snapshots from.

pub mod api;
pub mod catalog;
pub mod models;

pub use models::{Bouquet, BouquetId, Cursor, DeliveryType, Flower, NewBouquet, Page, PageOrdering};
