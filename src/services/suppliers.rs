use crate::{
    db::DbPool,
    entities::supplier::{self, Entity as SupplierEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};

/// Fields accepted when creating or editing a supplier
#[derive(Debug, Clone)]
pub struct SupplierInput {
    pub name: String,
    pub contact_info: String,
}

/// Service for managing suppliers
#[derive(Clone)]
pub struct SupplierService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl SupplierService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<supplier::Model>, ServiceError> {
        SupplierEntity::find()
            .order_by_asc(supplier::Column::Id)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<supplier::Model, ServiceError> {
        SupplierEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Supplier not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: SupplierInput) -> Result<supplier::Model, ServiceError> {
        let model = supplier::ActiveModel {
            name: Set(input.name),
            contact_info: Set(input.contact_info),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::db_error)?;

        info!(supplier_id = model.id, "supplier created");
        self.event_sender.send_or_log(Event::SupplierCreated(model.id));
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        input: SupplierInput,
    ) -> Result<supplier::Model, ServiceError> {
        let mut active: supplier::ActiveModel = self.get(id).await?.into();
        active.name = Set(input.name);
        active.contact_info = Set(input.contact_info);
        let model = active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        info!(supplier_id = id, "supplier updated");
        self.event_sender.send_or_log(Event::SupplierUpdated(id));
        Ok(model)
    }

    /// Deletes a supplier; a missing id is not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let result = SupplierEntity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        let deleted = result.rows_affected > 0;
        if deleted {
            info!(supplier_id = id, "supplier deleted");
            self.event_sender.send_or_log(Event::SupplierDeleted(id));
        }
        Ok(deleted)
    }
}
