pub mod category;
pub mod customer;
pub mod product;
pub mod purchase_order;
pub mod purchase_order_item;
pub mod sales_order;
pub mod sales_order_item;
pub mod supplier;
pub mod transaction;
pub mod warehouse;
