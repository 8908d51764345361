//! Initial schema: users, subscriptions, licenses, usage ledger, limits,
//! audit tables, exchange tokens, IDE tokens, projects, and models.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    #[allow(clippy::too_many_lines)]
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::FullName).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscriptions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subscriptions::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Subscriptions::PlanType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::BillingInterval)
                            .string_len(8)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CurrentPeriodStart)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CurrentPeriodEnd)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CancelAtPeriodEnd)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::TrialStart)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::TrialEnd)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscriptions_user")
                            .from(Subscriptions::Table, Subscriptions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_user_status")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::UserId)
                    .col(Subscriptions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Licenses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Licenses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Licenses::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Licenses::LicenseType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Licenses::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Licenses::OfflineEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Licenses::IssuedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Licenses::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Licenses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_licenses_user")
                            .from(Licenses::Table, Licenses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_licenses_user_issued")
                    .table(Licenses::Table)
                    .col(Licenses::UserId)
                    .col(Licenses::IssuedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UsageTracking::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsageTracking::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UsageTracking::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UsageTracking::PeriodStart)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UsageTracking::ProjectsCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageTracking::ExportsCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageTracking::TrainingRunsCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageTracking::DatasetsCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageTracking::ModelsCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageTracking::GpuHoursUsed)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(UsageTracking::ExportFormatsUsed)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UsageTracking::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(UsageTracking::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_usage_tracking_user")
                            .from(UsageTracking::Table, UsageTracking::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One ledger row per user per billing period; increments target it.
        manager
            .create_index(
                Index::create()
                    .name("idx_usage_tracking_user_period")
                    .table(UsageTracking::Table)
                    .col(UsageTracking::UserId)
                    .col(UsageTracking::PeriodStart)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UsageLimits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsageLimits::Tier)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UsageLimits::MaxProjects).big_integer().null())
                    .col(
                        ColumnDef::new(UsageLimits::MaxExportsPerMonth)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UsageLimits::MaxTrainingRunsPerMonth)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(UsageLimits::MaxDatasets).big_integer().null())
                    .col(
                        ColumnDef::new(UsageLimits::MaxGpuHoursPerMonth)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UsageLimits::MaxModelSizeMb)
                            .big_integer()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FeatureAccessLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeatureAccessLog::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FeatureAccessLog::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(FeatureAccessLog::FeatureKey)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(FeatureAccessLog::HasAccess).boolean().not_null())
                    .col(
                        ColumnDef::new(FeatureAccessLog::CurrentTier)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FeatureAccessLog::RequiredTier)
                            .string_len(32)
                            .null(),
                    )
                    .col(ColumnDef::new(FeatureAccessLog::Context).json_binary().null())
                    .col(
                        ColumnDef::new(FeatureAccessLog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_feature_access_log_user")
                    .table(FeatureAccessLog::Table)
                    .col(FeatureAccessLog::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IdeSyncEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IdeSyncEvents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IdeSyncEvents::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(IdeSyncEvents::EventType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(IdeSyncEvents::Payload).json_binary().null())
                    .col(
                        ColumnDef::new(IdeSyncEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuthExchanges::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthExchanges::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AuthExchanges::Token)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(AuthExchanges::UserId).uuid().not_null())
                    .col(ColumnDef::new(AuthExchanges::IdeToken).string_len(64).not_null())
                    .col(
                        ColumnDef::new(AuthExchanges::Used)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AuthExchanges::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuthExchanges::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_auth_exchanges_user")
                            .from(AuthExchanges::Table, AuthExchanges::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IdeTokens::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(IdeTokens::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(IdeTokens::TokenHash)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(IdeTokens::UserId).uuid().not_null())
                    .col(ColumnDef::new(IdeTokens::Platform).string_len(32).null())
                    .col(ColumnDef::new(IdeTokens::IdeVersion).string_len(32).null())
                    .col(
                        ColumnDef::new(IdeTokens::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IdeTokens::LastUsedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(IdeTokens::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ide_tokens_user")
                            .from(IdeTokens::Table, IdeTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AdminActions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminActions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AdminActions::AdminUserId).uuid().not_null())
                    .col(
                        ColumnDef::new(AdminActions::ActionType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AdminActions::TargetUserId).uuid().null())
                    .col(ColumnDef::new(AdminActions::Details).json_binary().null())
                    .col(
                        ColumnDef::new(AdminActions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Projects::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Projects::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Projects::IdeProjectId)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Projects::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Projects::TaskType).string_len(64).null())
                    .col(ColumnDef::new(Projects::DatasetCount).big_integer().null())
                    .col(
                        ColumnDef::new(Projects::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Projects::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_user")
                            .from(Projects::Table, Projects::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_projects_user_ide_project")
                    .table(Projects::Table)
                    .col(Projects::UserId)
                    .col(Projects::IdeProjectId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Models::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Models::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Models::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Models::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Models::Architecture).string_len(64).null())
                    .col(ColumnDef::new(Models::SizeMb).double().null())
                    .col(
                        ColumnDef::new(Models::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Models::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_models_project")
                            .from(Models::Table, Models::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_models_project_name")
                    .table(Models::Table)
                    .col(Models::ProjectId)
                    .col(Models::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Models::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdminActions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IdeTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthExchanges::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IdeSyncEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FeatureAccessLog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UsageLimits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UsageTracking::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Licenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subscriptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    FullName,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Subscriptions {
    Table,
    Id,
    UserId,
    PlanType,
    Status,
    BillingInterval,
    CurrentPeriodStart,
    CurrentPeriodEnd,
    CancelAtPeriodEnd,
    TrialStart,
    TrialEnd,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Licenses {
    Table,
    Id,
    UserId,
    LicenseType,
    IsActive,
    OfflineEnabled,
    IssuedAt,
    ExpiresAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum UsageTracking {
    Table,
    Id,
    UserId,
    PeriodStart,
    ProjectsCount,
    ExportsCount,
    TrainingRunsCount,
    DatasetsCount,
    ModelsCount,
    GpuHoursUsed,
    ExportFormatsUsed,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UsageLimits {
    Table,
    Tier,
    MaxProjects,
    MaxExportsPerMonth,
    MaxTrainingRunsPerMonth,
    MaxDatasets,
    MaxGpuHoursPerMonth,
    MaxModelSizeMb,
}

#[derive(DeriveIden)]
enum FeatureAccessLog {
    Table,
    Id,
    UserId,
    FeatureKey,
    HasAccess,
    CurrentTier,
    RequiredTier,
    Context,
    CreatedAt,
}

#[derive(DeriveIden)]
enum IdeSyncEvents {
    Table,
    Id,
    UserId,
    EventType,
    Payload,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AuthExchanges {
    Table,
    Id,
    Token,
    UserId,
    IdeToken,
    Used,
    ExpiresAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum IdeTokens {
    Table,
    Id,
    TokenHash,
    UserId,
    Platform,
    IdeVersion,
    ExpiresAt,
    LastUsedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AdminActions {
    Table,
    Id,
    AdminUserId,
    ActionType,
    TargetUserId,
    Details,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    UserId,
    IdeProjectId,
    Name,
    TaskType,
    DatasetCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Models {
    Table,
    Id,
    ProjectId,
    Name,
    Architecture,
    SizeMb,
    CreatedAt,
    UpdatedAt,
}
