use riderelay_core::error::AppError;
use riderelay_core::models::{Collection, DeleteAck, Document, Filter, InsertAck, UpdateAck};
use riderelay_core::traits::DocumentStore;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

/// Document persistence in PostgreSQL, one JSONB table per collection.
#[derive(Clone)]
pub struct DocumentRepository {
    pool: Pool<Postgres>,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All documents whose top-level fields contain `filter`, in insertion order.
    pub async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, AppError> {
        let sql = format!(
            "SELECT id, doc FROM {} WHERE doc @> $1::jsonb ORDER BY seq",
            table(collection)
        );
        let rows = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(filter.to_json())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn find_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<Document>, AppError> {
        let sql = format!("SELECT id, doc FROM {} WHERE id = $1", table(collection));
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    /// Insert a new document. Returns the generated UUID.
    pub async fn insert(
        &self,
        collection: Collection,
        fields: Map<String, Value>,
    ) -> Result<InsertAck, AppError> {
        let sql = format!(
            "INSERT INTO {} (doc) VALUES ($1::jsonb) RETURNING id",
            table(collection)
        );
        let (id,): (Uuid,) = sqlx::query_as(&sql)
            .bind(Json(fields))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(InsertAck::new(id))
    }

    /// Shallow-merge `patch` into the document (`doc || patch`).
    ///
    /// Rows whose content would not change are matched but not rewritten.
    pub async fn merge(
        &self,
        collection: Collection,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<UpdateAck, AppError> {
        let table = table(collection);
        let sql = format!(
            r#"
            WITH target AS (
                SELECT id, doc FROM {table} WHERE id = $1 FOR UPDATE
            ), updated AS (
                UPDATE {table} AS d
                SET doc = d.doc || $2::jsonb
                FROM target
                WHERE d.id = target.id AND target.doc <> target.doc || $2::jsonb
                RETURNING d.id
            )
            SELECT
                (SELECT COUNT(*) FROM target) AS matched,
                (SELECT COUNT(*) FROM updated) AS modified
            "#
        );
        let (matched, modified): (i64, i64) = sqlx::query_as(&sql)
            .bind(id)
            .bind(Json(patch))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(UpdateAck::new(matched as u64, modified as u64))
    }

    pub async fn delete(&self, collection: Collection, id: Uuid) -> Result<DeleteAck, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", table(collection));
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(DeleteAck::new(result.rows_affected()))
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

/// Table backing a collection. Never derived from user input.
fn table(collection: Collection) -> &'static str {
    match collection {
        Collection::Services => "services",
        Collection::Bookings => "bookings",
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    doc: Json<Map<String, Value>>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document::new(row.id, row.doc.0)
    }
}

// -- Trait implementation --

impl DocumentStore for DocumentRepository {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, AppError> {
        DocumentRepository::find(self, collection, filter).await
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<Document>, AppError> {
        DocumentRepository::find_by_id(self, collection, id).await
    }

    async fn insert(
        &self,
        collection: Collection,
        fields: Map<String, Value>,
    ) -> Result<InsertAck, AppError> {
        DocumentRepository::insert(self, collection, fields).await
    }

    async fn merge(
        &self,
        collection: Collection,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<UpdateAck, AppError> {
        DocumentRepository::merge(self, collection, id, patch).await
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<DeleteAck, AppError> {
        DocumentRepository::delete(self, collection, id).await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        DocumentRepository::health_check(self).await
    }
}
