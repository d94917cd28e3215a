//! Client abstraction over the bill store. The server talks to
//! [`BillStore`] only; [`DbStore`] persists through sea-orm while the
//! [`mock`] module provides the fixture-backed double used in tests.

pub mod mock;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use entity::bills;
use platform_db::DbPool;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use thiserror::Error;
use uuid::Uuid;

/// Store rejections carry the literal message rendered to the user.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Erreur 404")]
    NotFound,
    #[error("Erreur 500")]
    Backend(#[source] anyhow::Error),
}

impl StoreError {
    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        Self::Backend(err.into())
    }
}

impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::backend(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A proof file attached to a bill before the form is submitted.
#[derive(Clone, Debug)]
pub struct NewProof {
    pub email: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// What `create` hands back: where the proof landed and the key to
/// reference it at submit time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedProof {
    pub file_url: String,
    pub key: String,
}

/// The fully assembled bill sent at submit time; replaces the draft row
/// referenced by `key` wholesale.
#[derive(Clone, Debug)]
pub struct BillSubmission {
    pub key: String,
    pub expense_type: String,
    pub name: String,
    pub date: String,
    pub amount: i32,
    pub vat: String,
    pub pct: i32,
    pub commentary: String,
    pub file_url: String,
    pub file_name: String,
    pub status: String,
    pub email: String,
}

#[async_trait]
pub trait BillStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<bills::Model>>;
    async fn create(&self, proof: NewProof) -> StoreResult<CreatedProof>;
    async fn update(&self, submission: BillSubmission) -> StoreResult<bills::Model>;
}

/// Database-backed store. Proof bytes land under `upload_dir` and are
/// served back at `{public_base_url}/uploads/{key}-{name}`.
#[derive(Clone)]
pub struct DbStore {
    pool: DbPool,
    upload_dir: PathBuf,
    public_base_url: String,
}

impl DbStore {
    pub fn new(pool: DbPool, upload_dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            pool,
            upload_dir: upload_dir.into(),
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl BillStore for DbStore {
    async fn list(&self) -> StoreResult<Vec<bills::Model>> {
        Ok(bills::Entity::find().all(&self.pool).await?)
    }

    async fn create(&self, proof: NewProof) -> StoreResult<CreatedProof> {
        let id = Uuid::new_v4();
        let file_name = sanitize_file_name(&proof.file_name);
        let stored_name = format!("{}-{}", id, file_name);

        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(StoreError::backend)?;
        tokio::fs::write(self.upload_dir.join(&stored_name), &proof.bytes)
            .await
            .map_err(StoreError::backend)?;

        let file_url = format!("{}/uploads/{}", self.public_base_url, stored_name);
        let model = bills::ActiveModel {
            id: Set(id),
            file_url: Set(file_url.clone()),
            file_name: Set(file_name),
            status: Set("pending".to_string()),
            email: Set(proof.email),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        model.insert(&self.pool).await?;

        Ok(CreatedProof {
            file_url,
            key: id.to_string(),
        })
    }

    async fn update(&self, submission: BillSubmission) -> StoreResult<bills::Model> {
        let id = Uuid::parse_str(&submission.key).map_err(|_| StoreError::NotFound)?;
        let existing = bills::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;

        let mut active: bills::ActiveModel = existing.into();
        active.expense_type = Set(Some(submission.expense_type));
        active.name = Set(Some(submission.name));
        active.date = Set(Some(submission.date));
        active.amount = Set(Some(submission.amount));
        active.vat = Set(Some(submission.vat));
        active.pct = Set(Some(submission.pct));
        active.commentary = Set(Some(submission.commentary));
        active.file_url = Set(submission.file_url);
        active.file_name = Set(submission.file_name);
        active.status = Set(submission.status);
        active.email = Set(submission.email);
        Ok(active.update(&self.pool).await?)
    }
}

/// Keep only the terminal path component and drop characters that would
/// not survive a URL or a filesystem round trip.
fn sanitize_file_name(raw: &str) -> String {
    let base = Path::new(raw)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload");
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("facture libre.png"), "facture_libre.png");
        assert_eq!(sanitize_file_name("preview-2018.jpg"), "preview-2018.jpg");
    }

    #[test]
    fn store_errors_render_literal_messages() {
        assert_eq!(StoreError::NotFound.to_string(), "Erreur 404");
        let backend = StoreError::backend(anyhow::anyhow!("connection reset"));
        assert_eq!(backend.to_string(), "Erreur 500");
    }
}
