use crate::{
    errors::ServiceError,
    services::{purchase_orders::PurchaseOrderRow, sales_orders::SalesOrderRow},
};
use axum::response::Html;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tera::{Context, Tera};
use tracing::error;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("customers.html", include_str!("../templates/customers.html")),
    ("suppliers.html", include_str!("../templates/suppliers.html")),
    ("categories.html", include_str!("../templates/categories.html")),
    ("warehouses.html", include_str!("../templates/warehouses.html")),
    ("contact_form.html", include_str!("../templates/contact_form.html")),
    ("name_form.html", include_str!("../templates/name_form.html")),
    ("products.html", include_str!("../templates/products.html")),
    ("product_form.html", include_str!("../templates/product_form.html")),
    ("transactions.html", include_str!("../templates/transactions.html")),
    (
        "transaction_form.html",
        include_str!("../templates/transaction_form.html"),
    ),
    ("orders.html", include_str!("../templates/orders.html")),
    ("order_form.html", include_str!("../templates/order_form.html")),
    ("order_detail.html", include_str!("../templates/order_detail.html")),
];

/// Templates compiled into the binary
#[derive(Clone)]
pub struct Views {
    tera: Arc<Tera>,
}

impl Views {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.to_vec())?;
        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<Html<String>, ServiceError> {
        self.tera.render(name, context).map(Html).map_err(|e| {
            error!(template = name, error = ?e, "template rendering failed");
            ServiceError::TemplateError(e)
        })
    }
}

/// Order header in the shape the shared order templates expect; the party
/// is the customer for sales orders and the supplier for purchase orders.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: i32,
    pub party_id: i32,
    pub party_name: Option<String>,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub total_amount: Decimal,
}

impl From<SalesOrderRow> for OrderView {
    fn from(row: SalesOrderRow) -> Self {
        Self {
            id: row.id,
            party_id: row.customer_id,
            party_name: row.customer_name,
            order_date: row.order_date,
            status: row.status,
            total_amount: row.total_amount,
        }
    }
}

impl From<PurchaseOrderRow> for OrderView {
    fn from(row: PurchaseOrderRow) -> Self {
        Self {
            id: row.id,
            party_id: row.supplier_id,
            party_name: row.supplier_name,
            order_date: row.order_date,
            status: row.status,
            total_amount: row.total_amount,
        }
    }
}
