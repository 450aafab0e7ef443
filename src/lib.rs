//! Warehouse inventory management
//!
//! Customers, suppliers, categories, warehouses, products, stock
//! transactions, sales orders and purchase orders served as HTML pages over
//! a relational database. Stock levels are kept in step with transactions
//! and orders through relative updates inside database transactions.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod services;
pub mod tracing;
pub mod views;

use axum::Router;
use std::sync::Arc;

use crate::{
    db::DbPool, events::EventSender, middleware_helpers::request_id_middleware,
    services::AppServices, views::Views,
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub services: AppServices,
    pub views: Views,
}

impl AppState {
    pub fn new(
        db: DbPool,
        config: config::AppConfig,
        event_sender: EventSender,
    ) -> Result<Self, errors::ServiceError> {
        let db = Arc::new(db);
        let services = AppServices::new(db.clone(), Arc::new(event_sender));
        Ok(Self {
            db,
            config,
            services,
            views: Views::new()?,
        })
    }
}

/// Every page route, without state or middleware.
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::dashboard::dashboard_routes())
        .merge(handlers::health::health_routes())
        .merge(handlers::customers::customer_routes())
        .merge(handlers::suppliers::supplier_routes())
        .merge(handlers::categories::category_routes())
        .merge(handlers::warehouses::warehouse_routes())
        .merge(handlers::products::product_routes())
        .merge(handlers::transactions::transaction_routes())
        .merge(handlers::sales_orders::sales_order_routes())
        .merge(handlers::purchase_orders::purchase_order_routes())
}

/// Routes with request ids and HTTP tracing applied.
pub fn build_app(state: AppState) -> Router {
    app_routes()
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}
