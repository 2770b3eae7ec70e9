//! Profile store: where a candidate's stored résumé text and contact details come from.
//!
//! `AppState` holds an `Option<Arc<dyn ProfileStore>>`; it is `None` when no database
//! is configured, and the profile routes answer 501 in that case.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Profile;
use crate::pipeline::HeaderOverride;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError>;
}

/// Postgres-backed store reading the `profiles` table.
#[derive(Clone)]
pub struct PgProfileStore {
    db: PgPool,
}

impl PgProfileStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile: Option<Profile> = sqlx::query_as(
            r#"
            SELECT
                COALESCE(full_name, '')       AS full_name,
                COALESCE(email, '')           AS email,
                COALESCE(phone, '')           AS phone,
                COALESCE(raw_resume_text, '') AS raw_resume_text
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(profile)
    }
}

/// Header shown on a résumé rendered from a stored profile.
pub fn profile_header(profile: &Profile) -> HeaderOverride {
    let name = profile.full_name.trim();
    HeaderOverride {
        name: (!name.is_empty()).then(|| name.to_string()),
        contact: profile.contact_line(),
    }
}
