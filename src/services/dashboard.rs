use crate::{
    db::DbPool,
    entities::{
        category, customer, product, purchase_order, sales_order, supplier, transaction, warehouse,
    },
    errors::ServiceError,
};
use sea_orm::{EntityTrait, PaginatorTrait, QuerySelect};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

/// Row counts and total stock shown on the landing page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub customers: u64,
    pub suppliers: u64,
    pub categories: u64,
    pub warehouses: u64,
    pub products: u64,
    pub transactions: u64,
    pub sales_orders: u64,
    pub purchase_orders: u64,
    pub units_on_hand: i64,
}

#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn summary(&self) -> Result<DashboardSummary, ServiceError> {
        let db = &*self.db_pool;

        let quantities: Vec<i32> = product::Entity::find()
            .select_only()
            .column(product::Column::Quantity)
            .into_tuple()
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(DashboardSummary {
            customers: customer::Entity::find().count(db).await?,
            suppliers: supplier::Entity::find().count(db).await?,
            categories: category::Entity::find().count(db).await?,
            warehouses: warehouse::Entity::find().count(db).await?,
            products: quantities.len() as u64,
            transactions: transaction::Entity::find().count(db).await?,
            sales_orders: sales_order::Entity::find().count(db).await?,
            purchase_orders: purchase_order::Entity::find().count(db).await?,
            units_on_hand: quantities.iter().map(|&q| i64::from(q)).sum(),
        })
    }
}
