//! Project and model sync from the desktop IDE.
//!
//! The IDE pushes a project snapshot; rows are upserted by the IDE's own
//! identifiers so repeated syncs converge instead of duplicating.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{models, projects};

/// Incoming project snapshot from the IDE.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncProjectInput {
    /// Project identifier assigned by the IDE.
    pub ide_project_id: String,
    /// Display name.
    pub name: String,
    /// Task type such as `detection` or `classification`.
    pub task_type: Option<String>,
    /// Number of datasets attached in the IDE.
    pub dataset_count: Option<i64>,
    /// Models contained in the project.
    #[serde(default)]
    pub models: Vec<SyncModelInput>,
}

/// Incoming model snapshot, nested in [`SyncProjectInput`].
#[derive(Debug, Clone, Deserialize)]
pub struct SyncModelInput {
    /// Model name, unique within its project.
    pub name: String,
    /// Network architecture label.
    pub architecture: Option<String>,
    /// On-disk size in megabytes.
    pub size_mb: Option<f64>,
}

/// Repository for IDE project sync.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    db: DatabaseConnection,
}

impl ProjectRepository {
    /// Creates a new project repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Counts projects owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the count query fails.
    pub async fn count_for_user(&self, user_id: Uuid) -> Result<u64, DbErr> {
        use sea_orm::PaginatorTrait;
        projects::Entity::find()
            .filter(projects::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
    }

    /// Upserts a project and its models for `user_id`.
    ///
    /// The project is keyed by `(user_id, ide_project_id)`; each model by
    /// `(project_id, name)`. Returns the stored project row and whether it
    /// was newly created.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn sync(
        &self,
        user_id: Uuid,
        input: &SyncProjectInput,
    ) -> Result<(projects::Model, bool), DbErr> {
        let now = Utc::now();

        let existing = projects::Entity::find()
            .filter(projects::Column::UserId.eq(user_id))
            .filter(projects::Column::IdeProjectId.eq(&input.ide_project_id))
            .one(&self.db)
            .await?;

        let (project, created) = match existing {
            Some(found) => {
                let mut active = found.into_active_model();
                active.name = Set(input.name.clone());
                active.task_type = Set(input.task_type.clone());
                active.dataset_count = Set(input.dataset_count);
                active.updated_at = Set(now.into());
                (active.update(&self.db).await?, false)
            }
            None => {
                let row = projects::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    ide_project_id: Set(input.ide_project_id.clone()),
                    name: Set(input.name.clone()),
                    task_type: Set(input.task_type.clone()),
                    dataset_count: Set(input.dataset_count),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                };
                (row.insert(&self.db).await?, true)
            }
        };

        for model in &input.models {
            self.sync_model(project.id, model).await?;
        }

        Ok((project, created))
    }

    async fn sync_model(&self, project_id: Uuid, input: &SyncModelInput) -> Result<(), DbErr> {
        let now = Utc::now();

        let existing = models::Entity::find()
            .filter(models::Column::ProjectId.eq(project_id))
            .filter(models::Column::Name.eq(&input.name))
            .one(&self.db)
            .await?;

        match existing {
            Some(found) => {
                let mut active = found.into_active_model();
                active.architecture = Set(input.architecture.clone());
                active.size_mb = Set(input.size_mb);
                active.updated_at = Set(now.into());
                active.update(&self.db).await?;
            }
            None => {
                let row = models::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    project_id: Set(project_id),
                    name: Set(input.name.clone()),
                    architecture: Set(input.architecture.clone()),
                    size_mb: Set(input.size_mb),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                };
                row.insert(&self.db).await?;
            }
        }

        Ok(())
    }
}
