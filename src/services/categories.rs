use crate::{
    db::DbPool,
    entities::category::{self, Entity as CategoryEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};

/// Fields accepted when creating or editing a category
#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
}

/// Service for managing categories
#[derive(Clone)]
pub struct CategoryService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CategoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<category::Model>, ServiceError> {
        CategoryEntity::find()
            .order_by_asc(category::Column::Id)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<category::Model, ServiceError> {
        CategoryEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Category not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: CategoryInput) -> Result<category::Model, ServiceError> {
        let model = category::ActiveModel {
            name: Set(input.name),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::db_error)?;

        info!(category_id = model.id, "category created");
        self.event_sender.send_or_log(Event::CategoryCreated(model.id));
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        input: CategoryInput,
    ) -> Result<category::Model, ServiceError> {
        let mut active: category::ActiveModel = self.get(id).await?.into();
        active.name = Set(input.name);
        let model = active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        info!(category_id = id, "category updated");
        self.event_sender.send_or_log(Event::CategoryUpdated(id));
        Ok(model)
    }

    /// Deletes a category; a missing id is not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let result = CategoryEntity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        let deleted = result.rows_affected > 0;
        if deleted {
            info!(category_id = id, "category deleted");
            self.event_sender.send_or_log(Event::CategoryDeleted(id));
        }
        Ok(deleted)
    }
}
