//! Database seeder for Vantage development and testing.
//!
//! Seeds the per-tier usage limits table and a test user for local
//! development.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use vantage_core::Tier;
use vantage_db::entities::{usage_limits, users};

/// Test user ID (consistent for all seeds)
const TEST_USER_ID: &str = "00000000-0000-0000-0000-000000000002";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = vantage_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding usage limits...");
    seed_usage_limits(&db).await;

    println!("Seeding test user...");
    seed_test_user(&db).await;

    println!("Seeding complete!");
}

fn test_user_id() -> Uuid {
    Uuid::parse_str(TEST_USER_ID).unwrap()
}

/// Per-tier ceilings. `-1` means unlimited.
#[allow(clippy::type_complexity)]
const TIER_LIMITS: &[(Tier, [i64; 4], f64, i64)] = &[
    // (tier, [projects, exports, training_runs, datasets], gpu_hours, model_size_mb)
    (Tier::Free, [3, 5, 2, 5], 1.0, 100),
    (Tier::DataPro, [20, 50, 10, -1], 10.0, 500),
    (Tier::TrainPro, [100, 200, 200, -1], 100.0, 2000),
    (Tier::DeployPro, [-1, -1, 500, -1], 250.0, -1),
    (Tier::Enterprise, [-1, -1, -1, -1], -1.0, -1),
];

/// Seeds one limits row per tier, skipping rows that already exist.
async fn seed_usage_limits(db: &DatabaseConnection) {
    for (tier, counts, gpu_hours, model_size_mb) in TIER_LIMITS {
        let existing = usage_limits::Entity::find_by_id(tier.as_str().to_string())
            .one(db)
            .await
            .ok()
            .flatten();
        if existing.is_some() {
            println!("  Limits for {tier} already exist, skipping...");
            continue;
        }

        let [projects, exports, training_runs, datasets] = *counts;
        let row = usage_limits::ActiveModel {
            tier: Set(tier.as_str().to_string()),
            max_projects: Set(Some(projects)),
            max_exports_per_month: Set(Some(exports)),
            max_training_runs_per_month: Set(Some(training_runs)),
            max_datasets: Set(Some(datasets)),
            max_gpu_hours_per_month: Set(Some(*gpu_hours)),
            max_model_size_mb: Set(Some(*model_size_mb)),
        };
        row.insert(db).await.expect("Failed to seed usage limits");
        println!("  Seeded limits for {tier}");
    }
}

/// Seeds a test user for development.
async fn seed_test_user(db: &DatabaseConnection) {
    if users::Entity::find_by_id(test_user_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test user already exists, skipping...");
        return;
    }

    let now = Utc::now();
    let user = users::ActiveModel {
        id: Set(test_user_id()),
        email: Set("test@vantage.dev".to_string()),
        // Not a real credential; login with this account requires resetting
        // the hash locally.
        password_hash: Set("$argon2id$v=19$m=65536,t=3,p=4$test_hash".to_string()),
        full_name: Set("Test User".to_string()),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    user.insert(db).await.expect("Failed to seed test user");
    println!("  Seeded test user test@vantage.dev");
}
