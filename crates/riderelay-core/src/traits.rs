use std::future::Future;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Collection, DeleteAck, Document, Filter, InsertAck, UpdateAck};

/// Schema-less document persistence, addressed by collection and identifier.
///
/// Every method is a single-document (or single-query) operation; callers
/// get no atomicity across calls.
pub trait DocumentStore: Send + Sync + Clone {
    /// All documents matching `filter`, in insertion order.
    fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> impl Future<Output = Result<Vec<Document>, AppError>> + Send;

    /// The document with the given identifier, if any.
    fn find_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Document>, AppError>> + Send;

    /// Store `fields` verbatim under a freshly generated identifier.
    fn insert(
        &self,
        collection: Collection,
        fields: Map<String, Value>,
    ) -> impl Future<Output = Result<InsertAck, AppError>> + Send;

    /// Merge `patch` into the top level of an existing document.
    fn merge(
        &self,
        collection: Collection,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> impl Future<Output = Result<UpdateAck, AppError>> + Send;

    fn delete(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> impl Future<Output = Result<DeleteAck, AppError>> + Send;

    /// Check store connectivity.
    fn health_check(&self) -> impl Future<Output = Result<(), AppError>> + Send;
}
