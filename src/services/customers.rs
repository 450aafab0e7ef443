use crate::{
    db::DbPool,
    entities::customer::{self, Entity as CustomerEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};

/// Fields accepted when creating or editing a customer
#[derive(Debug, Clone)]
pub struct CustomerInput {
    pub name: String,
    pub contact_info: String,
}

/// Service for managing customers
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<customer::Model>, ServiceError> {
        CustomerEntity::find()
            .order_by_asc(customer::Column::Id)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<customer::Model, ServiceError> {
        CustomerEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: CustomerInput) -> Result<customer::Model, ServiceError> {
        let model = customer::ActiveModel {
            name: Set(input.name),
            contact_info: Set(input.contact_info),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::db_error)?;

        info!(customer_id = model.id, "customer created");
        self.event_sender.send_or_log(Event::CustomerCreated(model.id));
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        input: CustomerInput,
    ) -> Result<customer::Model, ServiceError> {
        let mut active: customer::ActiveModel = self.get(id).await?.into();
        active.name = Set(input.name);
        active.contact_info = Set(input.contact_info);
        let model = active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        info!(customer_id = id, "customer updated");
        self.event_sender.send_or_log(Event::CustomerUpdated(id));
        Ok(model)
    }

    /// Deletes a customer; a missing id is not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let result = CustomerEntity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        let deleted = result.rows_affected > 0;
        if deleted {
            info!(customer_id = id, "customer deleted");
            self.event_sender.send_or_log(Event::CustomerDeleted(id));
        }
        Ok(deleted)
    }
}
