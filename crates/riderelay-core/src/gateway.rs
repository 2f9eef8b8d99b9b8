use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::{
    Collection, DeleteAck, Document, EMAIL_FIELD, Filter, InsertAck, PriceSort, UpdateAck,
    parse_document_id, strip_reserved,
};
use crate::traits::DocumentStore;

/// CRUD operations over the services and bookings collections.
///
/// Each call issues exactly one store operation. Generic over the store so
/// handlers can run against PostgreSQL in production and an in-memory store
/// in tests.
#[derive(Clone)]
pub struct ResourceGateway<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> ResourceGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // -- Services --

    /// All services in natural order, or sorted by price when requested.
    pub async fn list_services(&self, sort: Option<PriceSort>) -> Result<Vec<Document>, AppError> {
        let mut services = self.store.find(Collection::Services, &Filter::all()).await?;
        if let Some(sort) = sort {
            sort.apply(&mut services);
        }
        Ok(services)
    }

    pub async fn get_service(&self, raw_id: &str) -> Result<Document, AppError> {
        self.get(Collection::Services, raw_id).await
    }

    pub async fn create_service(&self, fields: Map<String, Value>) -> Result<InsertAck, AppError> {
        self.create(Collection::Services, fields).await
    }

    pub async fn update_service(
        &self,
        raw_id: &str,
        patch: Map<String, Value>,
    ) -> Result<UpdateAck, AppError> {
        self.update(Collection::Services, raw_id, patch).await
    }

    pub async fn delete_service(&self, raw_id: &str) -> Result<DeleteAck, AppError> {
        self.delete(Collection::Services, raw_id).await
    }

    // -- Bookings --

    /// Bookings belonging to `requested_email`.
    ///
    /// The caller may only list their own bookings: `requested_email` must
    /// equal the verified `caller_email`.
    pub async fn list_bookings(
        &self,
        caller_email: &str,
        requested_email: Option<&str>,
    ) -> Result<Vec<Document>, AppError> {
        let email = match requested_email {
            Some(email) if email == caller_email => email,
            Some(_) => {
                tracing::warn!(caller = %caller_email, "Booking listing for another email refused");
                return Err(AppError::Forbidden(
                    "Bookings can only be listed for the authenticated email".into(),
                ));
            }
            None => {
                return Err(AppError::Forbidden(
                    "An email query parameter matching the authenticated email is required"
                        .into(),
                ));
            }
        };

        self.store
            .find(Collection::Bookings, &Filter::matching(EMAIL_FIELD, email))
            .await
    }

    pub async fn get_booking(&self, raw_id: &str) -> Result<Document, AppError> {
        self.get(Collection::Bookings, raw_id).await
    }

    pub async fn create_booking(&self, fields: Map<String, Value>) -> Result<InsertAck, AppError> {
        self.create(Collection::Bookings, fields).await
    }

    pub async fn update_booking(
        &self,
        raw_id: &str,
        patch: Map<String, Value>,
    ) -> Result<UpdateAck, AppError> {
        self.update(Collection::Bookings, raw_id, patch).await
    }

    pub async fn delete_booking(&self, raw_id: &str) -> Result<DeleteAck, AppError> {
        self.delete(Collection::Bookings, raw_id).await
    }

    // -- Shared --

    async fn get(&self, collection: Collection, raw_id: &str) -> Result<Document, AppError> {
        let id = parse_document_id(raw_id)?;
        self.store
            .find_by_id(collection, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {id}", collection.noun())))
    }

    async fn create(
        &self,
        collection: Collection,
        fields: Map<String, Value>,
    ) -> Result<InsertAck, AppError> {
        let ack = self.store.insert(collection, strip_reserved(fields)).await?;
        tracing::info!(id = %ack.inserted_id, "Created {}", collection.noun());
        Ok(ack)
    }

    async fn update(
        &self,
        collection: Collection,
        raw_id: &str,
        patch: Map<String, Value>,
    ) -> Result<UpdateAck, AppError> {
        let id = parse_document_id(raw_id)?;
        let ack = self
            .store
            .merge(collection, id, strip_reserved(patch))
            .await?;
        tracing::info!(
            %id,
            matched = ack.matched_count,
            modified = ack.modified_count,
            "Updated {}",
            collection.noun()
        );
        Ok(ack)
    }

    async fn delete(&self, collection: Collection, raw_id: &str) -> Result<DeleteAck, AppError> {
        let id = parse_document_id(raw_id)?;
        let ack = self.store.delete(collection, id).await?;
        tracing::info!(%id, deleted = ack.deleted_count, "Deleted {}", collection.noun());
        Ok(ack)
    }
}
