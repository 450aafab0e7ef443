use crate::{
    db::{with_transaction, DbPool},
    entities::{
        customer::{self, Entity as CustomerEntity},
        product,
        sales_order::{self, Entity as SalesOrderEntity},
        sales_order_item::{self, Entity as SalesOrderItemEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        order_lines::{price_line, LineItemRow, OrderLine},
        stock,
    },
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

pub const INITIAL_STATUS: &str = "Pending";

/// Sales order joined with its customer name
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct SalesOrderRow {
    pub id: i32,
    pub customer_id: i32,
    pub customer_name: Option<String>,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesOrderDetail {
    pub order: SalesOrderRow,
    pub items: Vec<LineItemRow>,
}

/// Service for sales orders; creating an order consumes stock and deleting
/// it gives the stock back.
#[derive(Clone)]
pub struct SalesOrderService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl SalesOrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    fn row_query() -> Select<SalesOrderEntity> {
        SalesOrderEntity::find()
            .select_only()
            .column(sales_order::Column::Id)
            .column(sales_order::Column::CustomerId)
            .column_as(customer::Column::Name, "customer_name")
            .column(sales_order::Column::OrderDate)
            .column(sales_order::Column::Status)
            .column(sales_order::Column::TotalAmount)
            .join(JoinType::LeftJoin, sales_order::Relation::Customer.def())
    }

    #[instrument(skip(self))]
    pub async fn list_with_customers(&self) -> Result<Vec<SalesOrderRow>, ServiceError> {
        Self::row_query()
            .order_by_asc(sales_order::Column::Id)
            .into_model::<SalesOrderRow>()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Order header plus line items joined to product names.
    #[instrument(skip(self))]
    pub async fn get_detail(&self, id: i32) -> Result<SalesOrderDetail, ServiceError> {
        let order = Self::row_query()
            .filter(sales_order::Column::Id.eq(id))
            .into_model::<SalesOrderRow>()
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Sales order not found".to_string()))?;

        let items = SalesOrderItemEntity::find()
            .select_only()
            .column(sales_order_item::Column::Id)
            .column(sales_order_item::Column::ProductId)
            .column_as(product::Column::Name, "product_name")
            .column(sales_order_item::Column::Quantity)
            .column(sales_order_item::Column::UnitPrice)
            .column(sales_order_item::Column::TotalPrice)
            .join(JoinType::LeftJoin, sales_order_item::Relation::Product.def())
            .filter(sales_order_item::Column::SalesOrderId.eq(id))
            .order_by_asc(sales_order_item::Column::Id)
            .into_model::<LineItemRow>()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(SalesOrderDetail { order, items })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<sales_order::Model, ServiceError> {
        SalesOrderEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Sales order not found".to_string()))
    }

    /// Creates the order, prices each line from the product's current unit
    /// price, decrements stock per line and stores the accumulated total.
    /// Any failure leaves no order rows and no stock change behind.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        customer_id: i32,
        lines: Vec<OrderLine>,
    ) -> Result<sales_order::Model, ServiceError> {
        let line_count = lines.len();
        let (order, adjustments) =
            with_transaction(&self.db_pool, "sales_order.create", move |txn| {
                Box::pin(async move {
                    CustomerEntity::find_by_id(customer_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))?;

                    let order = sales_order::ActiveModel {
                        customer_id: Set(customer_id),
                        order_date: Set(Utc::now()),
                        status: Set(INITIAL_STATUS.to_string()),
                        total_amount: Set(Decimal::ZERO),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let mut total = Decimal::ZERO;
                    let mut adjustments = Vec::with_capacity(lines.len());
                    for line in lines {
                        let priced = price_line(txn, line).await?;
                        total += priced.total_price;

                        sales_order_item::ActiveModel {
                            sales_order_id: Set(order.id),
                            product_id: Set(priced.product_id),
                            quantity: Set(priced.quantity),
                            unit_price: Set(priced.unit_price),
                            total_price: Set(priced.total_price),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                        let delta = -i64::from(priced.quantity);
                        stock::adjust_quantity(txn, priced.product_id, delta).await?;
                        adjustments.push((priced.product_id, delta));
                    }

                    let mut active: sales_order::ActiveModel = order.into();
                    active.total_amount = Set(total);
                    let order = active.update(txn).await.map_err(ServiceError::db_error)?;
                    Ok((order, adjustments))
                })
            })
            .await?;

        info!(
            order_id = order.id,
            customer_id,
            line_count,
            total = %order.total_amount,
            "sales order created"
        );
        self.event_sender
            .send_all(
                std::iter::once(Event::SalesOrderCreated(order.id)).chain(
                    adjustments
                        .into_iter()
                        .map(|(product_id, delta)| Event::StockAdjusted { product_id, delta }),
                ),
            );
        Ok(order)
    }

    /// Only the status of an existing order can change.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: i32,
        status: String,
    ) -> Result<sales_order::Model, ServiceError> {
        let existing = self.get(id).await?;
        let old_status = existing.status.clone();

        let mut active: sales_order::ActiveModel = existing.into();
        active.status = Set(status);
        let order = active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        info!(order_id = id, %old_status, new_status = %order.status, "sales order status updated");
        self.event_sender
            .send_or_log(Event::SalesOrderStatusChanged {
                order_id: id,
                old_status,
                new_status: order.status.clone(),
            });
        Ok(order)
    }

    /// Returns every line's quantity to stock, then removes the items and
    /// the order. Returns `false` when no such order exists.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let restored = with_transaction(&self.db_pool, "sales_order.delete", move |txn| {
            Box::pin(async move {
                if SalesOrderEntity::find_by_id(id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .is_none()
                {
                    return Ok(None);
                }

                let items = SalesOrderItemEntity::find()
                    .filter(sales_order_item::Column::SalesOrderId.eq(id))
                    .all(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                let mut adjustments = Vec::with_capacity(items.len());
                for item in &items {
                    let delta = i64::from(item.quantity);
                    stock::adjust_quantity(txn, item.product_id, delta).await?;
                    adjustments.push((item.product_id, delta));
                }

                SalesOrderItemEntity::delete_many()
                    .filter(sales_order_item::Column::SalesOrderId.eq(id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                SalesOrderEntity::delete_by_id(id)
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                Ok(Some(adjustments))
            })
        })
        .await?;

        let Some(adjustments) = restored else {
            return Ok(false);
        };

        info!(order_id = id, line_count = adjustments.len(), "sales order deleted");
        self.event_sender
            .send_all(
                std::iter::once(Event::SalesOrderDeleted(id)).chain(
                    adjustments
                        .into_iter()
                        .map(|(product_id, delta)| Event::StockAdjusted { product_id, delta }),
                ),
            );
        Ok(true)
    }
}
