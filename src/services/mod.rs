use crate::{db::DbPool, events::EventSender};
use std::sync::Arc;

pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod order_lines;
pub mod products;
pub mod purchase_orders;
pub mod sales_orders;
pub mod stock;
pub mod suppliers;
pub mod transactions;
pub mod warehouses;

/// Every service the HTTP layer needs, sharing one pool and event sender
#[derive(Clone)]
pub struct AppServices {
    pub customers: Arc<customers::CustomerService>,
    pub suppliers: Arc<suppliers::SupplierService>,
    pub categories: Arc<categories::CategoryService>,
    pub warehouses: Arc<warehouses::WarehouseService>,
    pub products: Arc<products::ProductService>,
    pub transactions: Arc<transactions::TransactionService>,
    pub sales_orders: Arc<sales_orders::SalesOrderService>,
    pub purchase_orders: Arc<purchase_orders::PurchaseOrderService>,
    pub dashboard: Arc<dashboard::DashboardService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            customers: Arc::new(customers::CustomerService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            suppliers: Arc::new(suppliers::SupplierService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            categories: Arc::new(categories::CategoryService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            warehouses: Arc::new(warehouses::WarehouseService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            products: Arc::new(products::ProductService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            transactions: Arc::new(transactions::TransactionService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            sales_orders: Arc::new(sales_orders::SalesOrderService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            purchase_orders: Arc::new(purchase_orders::PurchaseOrderService::new(
                db_pool.clone(),
                event_sender,
            )),
            dashboard: Arc::new(dashboard::DashboardService::new(db_pool)),
        }
    }
}
