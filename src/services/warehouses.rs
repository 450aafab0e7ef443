use crate::{
    db::DbPool,
    entities::warehouse::{self, Entity as WarehouseEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};

/// Fields accepted when creating or editing a warehouse
#[derive(Debug, Clone)]
pub struct WarehouseInput {
    pub name: String,
}

/// Service for managing warehouses
#[derive(Clone)]
pub struct WarehouseService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl WarehouseService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<warehouse::Model>, ServiceError> {
        WarehouseEntity::find()
            .order_by_asc(warehouse::Column::Id)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<warehouse::Model, ServiceError> {
        WarehouseEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Warehouse not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: WarehouseInput) -> Result<warehouse::Model, ServiceError> {
        let model = warehouse::ActiveModel {
            name: Set(input.name),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::db_error)?;

        info!(warehouse_id = model.id, "warehouse created");
        self.event_sender.send_or_log(Event::WarehouseCreated(model.id));
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        input: WarehouseInput,
    ) -> Result<warehouse::Model, ServiceError> {
        let mut active: warehouse::ActiveModel = self.get(id).await?.into();
        active.name = Set(input.name);
        let model = active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        info!(warehouse_id = id, "warehouse updated");
        self.event_sender.send_or_log(Event::WarehouseUpdated(id));
        Ok(model)
    }

    /// Deletes a warehouse; a missing id is not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let result = WarehouseEntity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        let deleted = result.rows_affected > 0;
        if deleted {
            info!(warehouse_id = id, "warehouse deleted");
            self.event_sender.send_or_log(Event::WarehouseDeleted(id));
        }
        Ok(deleted)
    }
}
