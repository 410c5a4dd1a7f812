use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};

use crate::config::AppConfig;
use crate::errors::Result;

pub const POOLS: &str = "pools";
pub const MEMBERSHIPS: &str = "user_bolao";
pub const BETS: &str = "bets";

pub async fn get_db_client(config: &AppConfig) -> Result<Database> {
    let client = Client::with_uri_str(&config.database_url).await?;
    let db = client.database(&config.database_name);

    // Verify database is reachable by listing collections
    match db.list_collection_names().await {
        Ok(collections) => {
            tracing::info!("✅ Connected to database: {}", config.database_name);
            tracing::debug!("📂 Collections found: {:?}", collections);
        }
        Err(e) => {
            tracing::warn!("❌ Database '{}' may be inaccessible: {}", config.database_name, e);
        }
    }

    Ok(db)
}

/// Unique indexes backing invite codes, one membership per user and pool,
/// and one bet per membership, fixture and type.
pub async fn ensure_indexes(db: &Database) -> Result<()> {
    let unique = || IndexOptions::builder().unique(true).build();

    db.collection::<mongodb::bson::Document>(POOLS)
        .create_index(IndexModel::builder().keys(doc! { "invite_code": 1 }).options(unique()).build())
        .await?;

    db.collection::<mongodb::bson::Document>(MEMBERSHIPS)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "pool_id": 1, "user_id": 1 })
                .options(unique())
                .build(),
        )
        .await?;

    db.collection::<mongodb::bson::Document>(BETS)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "user_bolao_id": 1, "fixture_id": 1, "type": 1 })
                .options(unique())
                .build(),
        )
        .await?;

    tracing::info!("✅ Indexes ensured on {}, {}, {}", POOLS, MEMBERSHIPS, BETS);
    Ok(())
}
