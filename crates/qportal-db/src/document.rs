use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qportal_core::models::{Document, DocumentChanges, NewDocument, PreviewArtifact};
use qportal_core::AppError;
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

const PDF_FILTER: &str = "(file_type = 'application/pdf' OR LOWER(file_path) LIKE '%.pdf')";

/// Document persistence used by the lifecycle hooks, the preview orchestrator
/// and the operator tooling.
///
/// `set_preview` and `clear_preview` are the only methods that touch the
/// preview columns.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn get_document(&self, id: Uuid) -> Result<Option<Document>, AppError>;

    /// Active documents, newest first
    async fn list_active_documents(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Document>, AppError>;

    /// PDF documents with a stored source file, oldest first
    async fn list_pdf_documents(&self, limit: i64) -> Result<Vec<Document>, AppError>;

    async fn create_document(&self, new: NewDocument) -> Result<Document, AppError>;

    /// Apply `changes`; returns `None` if the document does not exist.
    async fn update_document(
        &self,
        id: Uuid,
        changes: DocumentChanges,
    ) -> Result<Option<Document>, AppError>;

    /// Flip `is_active`; returns `None` if the document does not exist.
    async fn toggle_active(&self, id: Uuid) -> Result<Option<Document>, AppError>;

    /// Write all three preview columns in one statement. Returns false when no
    /// row matched.
    async fn set_preview(&self, id: Uuid, preview: &PreviewArtifact) -> Result<bool, AppError>;

    /// Null all three preview columns.
    async fn clear_preview(&self, id: Uuid) -> Result<(), AppError>;

    async fn delete_document(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Database row for the documents table
#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    price: i64,
    preview_pages: Option<i32>,
    file_path: String,
    file_name: String,
    file_type: String,
    file_size: i64,
    preview_file_path: Option<String>,
    preview_file_name: Option<String>,
    preview_file_size: Option<i64>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            title: row.title,
            description: row.description,
            price: row.price,
            preview_pages: row.preview_pages,
            file_path: row.file_path,
            file_name: row.file_name,
            file_type: row.file_type,
            file_size: row.file_size,
            preview: PreviewArtifact::from_parts(
                row.preview_file_path,
                row.preview_file_name,
                row.preview_file_size,
            ),
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select", db.record_id = %id))]
    async fn get_document(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        let row = sqlx::query_as::<Postgres, DocumentRow>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Document::from))
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    async fn list_active_documents(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Document>, AppError> {
        let rows = sqlx::query_as::<Postgres, DocumentRow>(
            "SELECT * FROM documents WHERE is_active = TRUE ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    async fn list_pdf_documents(&self, limit: i64) -> Result<Vec<Document>, AppError> {
        let query = format!(
            "SELECT * FROM documents WHERE {} AND file_path <> '' ORDER BY created_at ASC LIMIT $1",
            PDF_FILTER
        );
        let rows = sqlx::query_as::<Postgres, DocumentRow>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    #[tracing::instrument(skip(self, new), fields(db.table = "documents", db.operation = "insert"))]
    async fn create_document(&self, new: NewDocument) -> Result<Document, AppError> {
        let row = sqlx::query_as::<Postgres, DocumentRow>(
            r#"
            INSERT INTO documents (
                id, title, description, price, preview_pages,
                file_path, file_name, file_type, file_size,
                is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.preview_pages)
        .bind(&new.file.path)
        .bind(&new.file.name)
        .bind(&new.file.file_type)
        .bind(new.file.size)
        .bind(new.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "documents", db.operation = "update", db.record_id = %id))]
    async fn update_document(
        &self,
        id: Uuid,
        changes: DocumentChanges,
    ) -> Result<Option<Document>, AppError> {
        let file = changes.file.as_ref();
        let row = sqlx::query_as::<Postgres, DocumentRow>(
            r#"
            UPDATE documents SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                preview_pages = COALESCE($5, preview_pages),
                is_active = COALESCE($6, is_active),
                file_path = COALESCE($7, file_path),
                file_name = COALESCE($8, file_name),
                file_type = COALESCE($9, file_type),
                file_size = COALESCE($10, file_size),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.price)
        .bind(changes.preview_pages)
        .bind(changes.is_active)
        .bind(file.map(|f| f.path.as_str()))
        .bind(file.map(|f| f.name.as_str()))
        .bind(file.map(|f| f.file_type.as_str()))
        .bind(file.map(|f| f.size))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Document::from))
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "update", db.record_id = %id))]
    async fn toggle_active(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        let row = sqlx::query_as::<Postgres, DocumentRow>(
            "UPDATE documents SET is_active = NOT is_active, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Document::from))
    }

    #[tracing::instrument(skip(self, preview), fields(db.table = "documents", db.operation = "update", db.record_id = %id))]
    async fn set_preview(&self, id: Uuid, preview: &PreviewArtifact) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE documents SET
                preview_file_path = $2,
                preview_file_name = $3,
                preview_file_size = $4,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&preview.path)
        .bind(&preview.name)
        .bind(preview.size)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "update", db.record_id = %id))]
    async fn clear_preview(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE documents SET
                preview_file_path = NULL,
                preview_file_name = NULL,
                preview_file_size = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "delete", db.record_id = %id))]
    async fn delete_document(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
