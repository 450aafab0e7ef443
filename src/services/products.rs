use crate::{
    db::DbPool,
    entities::{
        category,
        product::{self, Entity as ProductEntity},
        supplier,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, EntityTrait, FromQueryResult, JoinType, QueryOrder, QuerySelect,
    RelationTrait, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Fields accepted when creating or editing a product
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub category_id: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub supplier_id: i32,
}

/// Product joined with its category and supplier names
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub category_id: i32,
    pub category_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub supplier_id: i32,
    pub supplier_name: Option<String>,
}

/// Service for managing products
#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<product::Model>, ServiceError> {
        ProductEntity::find()
            .order_by_asc(product::Column::Id)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Lists products with category and supplier names; dangling references
    /// come back as `None`.
    #[instrument(skip(self))]
    pub async fn list_with_names(&self) -> Result<Vec<ProductRow>, ServiceError> {
        ProductEntity::find()
            .select_only()
            .column(product::Column::Id)
            .column(product::Column::Name)
            .column(product::Column::CategoryId)
            .column_as(category::Column::Name, "category_name")
            .column(product::Column::Quantity)
            .column(product::Column::UnitPrice)
            .column(product::Column::SupplierId)
            .column_as(supplier::Column::Name, "supplier_name")
            .join(JoinType::LeftJoin, product::Relation::Category.def())
            .join(JoinType::LeftJoin, product::Relation::Supplier.def())
            .order_by_asc(product::Column::Id)
            .into_model::<ProductRow>()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<product::Model, ServiceError> {
        ProductEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: ProductInput) -> Result<product::Model, ServiceError> {
        let model = product::ActiveModel {
            name: Set(input.name),
            category_id: Set(input.category_id),
            quantity: Set(input.quantity),
            unit_price: Set(input.unit_price),
            supplier_id: Set(input.supplier_id),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::db_error)?;

        info!(product_id = model.id, quantity = model.quantity, "product created");
        self.event_sender.send_or_log(Event::ProductCreated(model.id));
        Ok(model)
    }

    /// Overwrites every field, including the on-hand quantity.
    #[instrument(skip(self))]
    pub async fn update(&self, id: i32, input: ProductInput) -> Result<product::Model, ServiceError> {
        let mut active: product::ActiveModel = self.get(id).await?.into();
        active.name = Set(input.name);
        active.category_id = Set(input.category_id);
        active.quantity = Set(input.quantity);
        active.unit_price = Set(input.unit_price);
        active.supplier_id = Set(input.supplier_id);
        let model = active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        info!(product_id = id, quantity = model.quantity, "product updated");
        self.event_sender.send_or_log(Event::ProductUpdated(id));
        Ok(model)
    }

    /// Deletes a product; a missing id is not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let result = ProductEntity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        let deleted = result.rows_affected > 0;
        if deleted {
            info!(product_id = id, "product deleted");
            self.event_sender.send_or_log(Event::ProductDeleted(id));
        }
        Ok(deleted)
    }
}
