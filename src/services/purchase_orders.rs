use crate::{
    db::{with_transaction, DbPool},
    entities::{
        product,
        purchase_order::{self, Entity as PurchaseOrderEntity},
        purchase_order_item::{self, Entity as PurchaseOrderItemEntity},
        supplier::{self, Entity as SupplierEntity},
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

/// Purchase order joined with its supplier name
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct PurchaseOrderRow {
    pub id: i32,
    pub supplier_id: i32,
    pub supplier_name: Option<String>,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOrderDetail {
    pub order: PurchaseOrderRow,
    pub items: Vec<LineItemRow>,
}

/// Service for purchase orders; creating an order receives stock and deleting
/// it takes the stock back out.
#[derive(Clone)]
pub struct PurchaseOrderService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl PurchaseOrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    fn row_query() -> Select<PurchaseOrderEntity> {
        PurchaseOrderEntity::find()
            .select_only()
            .column(purchase_order::Column::Id)
            .column(purchase_order::Column::SupplierId)
            .column_as(supplier::Column::Name, "supplier_name")
            .column(purchase_order::Column::OrderDate)
            .column(purchase_order::Column::Status)
            .column(purchase_order::Column::TotalAmount)
            .join(JoinType::LeftJoin, purchase_order::Relation::Supplier.def())
    }

    #[instrument(skip(self))]
    pub async fn list_with_suppliers(&self) -> Result<Vec<PurchaseOrderRow>, ServiceError> {
        Self::row_query()
            .order_by_asc(purchase_order::Column::Id)
            .into_model::<PurchaseOrderRow>()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Order header plus line items joined to product names.
    #[instrument(skip(self))]
    pub async fn get_detail(&self, id: i32) -> Result<PurchaseOrderDetail, ServiceError> {
        let order = Self::row_query()
            .filter(purchase_order::Column::Id.eq(id))
            .into_model::<PurchaseOrderRow>()
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Purchase order not found".to_string()))?;

        let items = PurchaseOrderItemEntity::find()
            .select_only()
            .column(purchase_order_item::Column::Id)
            .column(purchase_order_item::Column::ProductId)
            .column_as(product::Column::Name, "product_name")
            .column(purchase_order_item::Column::Quantity)
            .column(purchase_order_item::Column::UnitPrice)
            .column(purchase_order_item::Column::TotalPrice)
            .join(JoinType::LeftJoin, purchase_order_item::Relation::Product.def())
            .filter(purchase_order_item::Column::PurchaseOrderId.eq(id))
            .order_by_asc(purchase_order_item::Column::Id)
            .into_model::<LineItemRow>()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(PurchaseOrderDetail { order, items })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<purchase_order::Model, ServiceError> {
        PurchaseOrderEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Purchase order not found".to_string()))
    }

    /// Creates the order, prices each line from the product's current unit
    /// price, increments stock per line and stores the accumulated total.
    /// Any failure leaves no order rows and no stock change behind.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        supplier_id: i32,
        lines: Vec<OrderLine>,
    ) -> Result<purchase_order::Model, ServiceError> {
        let line_count = lines.len();
        let (order, adjustments) =
            with_transaction(&self.db_pool, "purchase_order.create", move |txn| {
                Box::pin(async move {
                    SupplierEntity::find_by_id(supplier_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| ServiceError::NotFound("Supplier not found".to_string()))?;

                    let order = purchase_order::ActiveModel {
                        supplier_id: Set(supplier_id),
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

                        purchase_order_item::ActiveModel {
                            purchase_order_id: Set(order.id),
                            product_id: Set(priced.product_id),
                            quantity: Set(priced.quantity),
                            unit_price: Set(priced.unit_price),
                            total_price: Set(priced.total_price),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                        let delta = i64::from(priced.quantity);
                        stock::adjust_quantity(txn, priced.product_id, delta).await?;
                        adjustments.push((priced.product_id, delta));
                    }

                    let mut active: purchase_order::ActiveModel = order.into();
                    active.total_amount = Set(total);
                    let order = active.update(txn).await.map_err(ServiceError::db_error)?;
                    Ok((order, adjustments))
                })
            })
            .await?;

        info!(
            order_id = order.id,
            supplier_id,
            line_count,
            total = %order.total_amount,
            "purchase order created"
        );
        self.event_sender
            .send_all(
                std::iter::once(Event::PurchaseOrderCreated(order.id)).chain(
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
    ) -> Result<purchase_order::Model, ServiceError> {
        let existing = self.get(id).await?;
        let old_status = existing.status.clone();

        let mut active: purchase_order::ActiveModel = existing.into();
        active.status = Set(status);
        let order = active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        info!(order_id = id, %old_status, new_status = %order.status, "purchase order status updated");
        self.event_sender
            .send_or_log(Event::PurchaseOrderStatusChanged {
                order_id: id,
                old_status,
                new_status: order.status.clone(),
            });
        Ok(order)
    }

    /// Takes every line's quantity back out of stock, then removes the items and
    /// the order. Returns `false` when no such order exists.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let restored = with_transaction(&self.db_pool, "purchase_order.delete", move |txn| {
            Box::pin(async move {
                if PurchaseOrderEntity::find_by_id(id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .is_none()
                {
                    return Ok(None);
                }

                let items = PurchaseOrderItemEntity::find()
                    .filter(purchase_order_item::Column::PurchaseOrderId.eq(id))
                    .all(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                let mut adjustments = Vec::with_capacity(items.len());
                for item in &items {
                    let delta = -i64::from(item.quantity);
                    stock::adjust_quantity(txn, item.product_id, delta).await?;
                    adjustments.push((item.product_id, delta));
                }

                PurchaseOrderItemEntity::delete_many()
                    .filter(purchase_order_item::Column::PurchaseOrderId.eq(id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                PurchaseOrderEntity::delete_by_id(id)
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

        info!(order_id = id, line_count = adjustments.len(), "purchase order deleted");
        self.event_sender
            .send_all(
                std::iter::once(Event::PurchaseOrderDeleted(id)).chain(
                    adjustments
                        .into_iter()
                        .map(|(product_id, delta)| Event::StockAdjusted { product_id, delta }),
                ),
            );
        Ok(true)
    }
}
