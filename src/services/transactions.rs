use crate::{
    db::{with_transaction, DbPool},
    entities::{
        product,
        transaction::{self, Entity as TransactionEntity, TransactionType},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::stock,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, EntityTrait, FromQueryResult, JoinType, QueryOrder, QuerySelect,
    RelationTrait, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Fields accepted when recording or editing a stock transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionInput {
    pub product_id: i32,
    pub transaction_type: TransactionType,
    pub quantity: i32,
}

impl TransactionInput {
    pub fn delta(&self) -> i64 {
        self.transaction_type.delta(self.quantity)
    }
}

/// Transaction joined with its product name
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct TransactionRow {
    pub id: i32,
    pub product_id: i32,
    pub product_name: Option<String>,
    pub transaction_type: String,
    pub quantity: i32,
    pub date: DateTime<Utc>,
}

/// Service for manual stock adjustments
#[derive(Clone)]
pub struct TransactionService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl TransactionService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_with_products(&self) -> Result<Vec<TransactionRow>, ServiceError> {
        TransactionEntity::find()
            .select_only()
            .column(transaction::Column::Id)
            .column(transaction::Column::ProductId)
            .column_as(product::Column::Name, "product_name")
            .column(transaction::Column::TransactionType)
            .column(transaction::Column::Quantity)
            .column(transaction::Column::Date)
            .join(JoinType::LeftJoin, transaction::Relation::Product.def())
            .order_by_asc(transaction::Column::Id)
            .into_model::<TransactionRow>()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<transaction::Model, ServiceError> {
        TransactionEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Transaction not found".to_string()))
    }

    /// Records a transaction and applies its delta to the product.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        input: TransactionInput,
    ) -> Result<transaction::Model, ServiceError> {
        let model = with_transaction(&self.db_pool, "transaction.create", move |txn| {
            Box::pin(async move {
                stock::adjust_quantity(txn, input.product_id, input.delta()).await?;

                transaction::ActiveModel {
                    product_id: Set(input.product_id),
                    transaction_type: Set(input.transaction_type),
                    quantity: Set(input.quantity),
                    date: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(txn)
                .await
                .map_err(ServiceError::db_error)
            })
        })
        .await?;

        info!(
            transaction_id = model.id,
            product_id = model.product_id,
            delta = model.delta(),
            "transaction recorded"
        );
        self.event_sender
            .send_all([
                Event::TransactionRecorded(model.id),
                Event::StockAdjusted {
                    product_id: model.product_id,
                    delta: model.delta(),
                },
            ]);
        Ok(model)
    }

    /// Reverts the old transaction's effect, applies the new one and
    /// rewrites the row. The original date is kept.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        input: TransactionInput,
    ) -> Result<transaction::Model, ServiceError> {
        let (old, model) = with_transaction(&self.db_pool, "transaction.update", move |txn| {
            Box::pin(async move {
                let old = TransactionEntity::find_by_id(id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| ServiceError::NotFound("Transaction not found".to_string()))?;

                stock::adjust_quantity(txn, old.product_id, -old.delta()).await?;
                stock::adjust_quantity(txn, input.product_id, input.delta()).await?;

                let mut active: transaction::ActiveModel = old.clone().into();
                active.product_id = Set(input.product_id);
                active.transaction_type = Set(input.transaction_type);
                active.quantity = Set(input.quantity);
                let model = active.update(txn).await.map_err(ServiceError::db_error)?;
                Ok((old, model))
            })
        })
        .await?;

        info!(
            transaction_id = id,
            old_product_id = old.product_id,
            new_product_id = model.product_id,
            "transaction updated"
        );
        self.event_sender
            .send_all([
                Event::TransactionUpdated(id),
                Event::StockAdjusted {
                    product_id: old.product_id,
                    delta: -old.delta(),
                },
                Event::StockAdjusted {
                    product_id: model.product_id,
                    delta: model.delta(),
                },
            ]);
        Ok(model)
    }

    /// Reverts the transaction's effect and removes it. Returns `false` when
    /// no such transaction exists.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let removed = with_transaction(&self.db_pool, "transaction.delete", move |txn| {
            Box::pin(async move {
                let Some(old) = TransactionEntity::find_by_id(id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::db_error)?
                else {
                    return Ok(None);
                };

                stock::adjust_quantity(txn, old.product_id, -old.delta()).await?;
                TransactionEntity::delete_by_id(id)
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                Ok(Some(old))
            })
        })
        .await?;

        let Some(old) = removed else {
            return Ok(false);
        };

        info!(transaction_id = id, product_id = old.product_id, "transaction deleted");
        self.event_sender
            .send_all([
                Event::TransactionDeleted(id),
                Event::StockAdjusted {
                    product_id: old.product_id,
                    delta: -old.delta(),
                },
            ]);
        Ok(true)
    }
}
