pub mod categories;
pub mod common;
pub mod customers;
pub mod dashboard;
pub mod health;
pub mod products;
pub mod purchase_orders;
pub mod sales_orders;
pub mod suppliers;
pub mod transactions;
pub mod warehouses;
