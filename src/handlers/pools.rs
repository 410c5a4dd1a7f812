use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson, Document};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};
use validator::Validate;

use crate::{
    database::connection::{MEMBERSHIPS, POOLS},
    errors::{AppError, Result},
    models::lookup::Lookup,
    models::pool::{CreatePoolRequest, Membership, MembershipResponse, Pool, PoolResponse},
    models::user::Claims,
    state::AppState,
};

pub(crate) async fn find_pool(db: &Database, pool_id: &str) -> Result<Option<Pool>> {
    let object_id = ObjectId::parse_str(pool_id)?;
    let collection: Collection<Pool> = db.collection(POOLS);
    Ok(collection.find_one(doc! { "_id": object_id }).await?)
}

/// Pool metadata for page endpoints: a bad or unknown id is "no data", a
/// database failure is a "missing data" error.
async fn lookup_pool(db: &Database, pool_id: &str) -> Lookup<Pool> {
    match find_pool(db, pool_id).await {
        Ok(Some(pool)) => Lookup::Found(pool),
        Ok(None) | Err(AppError::InvalidObjectId(_)) => Lookup::NotFound,
        Err(e) => {
            tracing::error!("Failed to load pool {}: {}", pool_id, e);
            Lookup::Error(format!("pool metadata unavailable: {}", e))
        }
    }
}

pub(crate) async fn find_membership(db: &Database, pool_id: &str, user_id: &str) -> Result<Option<Membership>> {
    let collection: Collection<Membership> = db.collection(MEMBERSHIPS);
    Ok(collection
        .find_one(doc! { "pool_id": pool_id, "user_id": user_id })
        .await?)
}

pub(crate) async fn require_membership(db: &Database, pool_id: &str, user_id: &str) -> Result<Membership> {
    find_membership(db, pool_id, user_id)
        .await?
        .ok_or(AppError::NotAMember)
}

pub(crate) async fn list_memberships(db: &Database, pool_id: &str) -> Result<Vec<Membership>> {
    let collection: Collection<Membership> = db.collection(MEMBERSHIPS);
    let cursor = collection
        .find(doc! { "pool_id": pool_id })
        .sort(doc! { "joined_at": 1 })
        .await?;
    Ok(cursor.try_collect().await?)
}

// Filter and update for a join. The filter's fields land in an inserted
// document; `$setOnInsert` leaves an existing membership untouched.
fn membership_upsert(pool_id: &str, claims: &Claims) -> Result<(Document, Document)> {
    let joined_at = to_bson(&Utc::now())?;
    let filter = doc! { "pool_id": pool_id, "user_id": claims.sub.as_str() };
    let update = doc! {
        "$setOnInsert": { "name": claims.name.as_str(), "joined_at": joined_at },
    };
    Ok((filter, update))
}

async fn add_member(db: &Database, pool: &Pool, claims: &Claims) -> Result<Membership> {
    let pool_id = pool.id.map(|id| id.to_hex()).unwrap_or_default();
    let (filter, update) = membership_upsert(&pool_id, claims)?;

    let collection: Collection<Membership> = db.collection(MEMBERSHIPS);
    let membership = collection
        .find_one_and_update(filter, update)
        .upsert(true)
        .return_document(ReturnDocument::After)
        .await?
        .ok_or(AppError::DocumentNotFound)?;

    tracing::info!("✅ User {} is a member of pool {}", claims.sub, pool_id);
    Ok(membership)
}

// A found pool is only handed on to its members
fn members_only(pool: Pool, membership: Result<Option<Membership>>) -> Result<Lookup<Pool>> {
    match membership {
        Ok(Some(_)) => Ok(Lookup::Found(pool)),
        Ok(None) => Err(AppError::NotAMember),
        Err(e) => {
            tracing::error!("Failed to check membership: {}", e);
            Ok(Lookup::Error(format!("membership unavailable: {}", e)))
        }
    }
}

/// `lookup_pool` for page endpoints that only members may see. Non-members
/// get `NotAMember`; everything else stays a `Lookup`.
pub(crate) async fn lookup_member_pool(db: &Database, pool_id: &str, user_id: &str) -> Result<Lookup<Pool>> {
    match lookup_pool(db, pool_id).await {
        Lookup::Found(pool) => members_only(pool, find_membership(db, pool_id, user_id).await),
        missing => Ok(missing),
    }
}

// Create a pool; the creator becomes its first member
pub async fn create_pool(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePoolRequest>,
) -> Result<Json<PoolResponse>> {
    payload.validate()?;
    tracing::info!("🎯 Creating pool '{}' for user {}", payload.name, claims.sub);

    let pool = Pool::new(
        payload.name.trim().to_string(),
        payload.competition_id,
        payload.season,
        claims.sub.clone(),
    );

    let collection: Collection<Pool> = state.db.collection(POOLS);
    collection.insert_one(&pool).await?;
    add_member(&state.db, &pool, &claims).await?;

    Ok(Json(PoolResponse::from(pool)))
}

pub async fn get_pool(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(pool_id): Path<String>,
) -> Result<Json<PoolResponse>> {
    let pool = find_pool(&state.db, &pool_id)
        .await?
        .ok_or(AppError::PoolNotFound)?;
    require_membership(&state.db, &pool_id, &claims.sub).await?;
    Ok(Json(PoolResponse::from(pool)))
}

// Pools the caller belongs to
pub async fn get_my_pools(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<PoolResponse>>> {
    let memberships: Collection<Membership> = state.db.collection(MEMBERSHIPS);
    let mine: Vec<Membership> = memberships
        .find(doc! { "user_id": claims.sub.as_str() })
        .await?
        .try_collect()
        .await?;

    let pool_ids: Vec<ObjectId> = mine
        .iter()
        .filter_map(|m| ObjectId::parse_str(&m.pool_id).ok())
        .collect();

    if pool_ids.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let pools: Collection<Pool> = state.db.collection(POOLS);
    let found: Vec<Pool> = pools
        .find(doc! { "_id": { "$in": pool_ids } })
        .sort(doc! { "created_at": -1 })
        .await?
        .try_collect()
        .await?;

    tracing::info!("✅ Found {} pools for user {}", found.len(), claims.sub);
    Ok(Json(found.into_iter().map(PoolResponse::from).collect()))
}

// Follow an invite link
pub async fn join_pool(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(invite_code): Path<String>,
) -> Result<Json<MembershipResponse>> {
    let collection: Collection<Pool> = state.db.collection(POOLS);
    let pool = collection
        .find_one(doc! { "invite_code": invite_code.trim() })
        .await?
        .ok_or(AppError::PoolNotFound)?;

    let membership = add_member(&state.db, &pool, &claims).await?;
    Ok(Json(MembershipResponse::from(membership)))
}

pub async fn get_members(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(pool_id): Path<String>,
) -> Result<Json<Vec<MembershipResponse>>> {
    find_pool(&state.db, &pool_id)
        .await?
        .ok_or(AppError::PoolNotFound)?;
    require_membership(&state.db, &pool_id, &claims.sub).await?;

    let members = list_memberships(&state.db, &pool_id).await?;
    Ok(Json(members.into_iter().map(MembershipResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Claims {
        Claims { sub: "user-1".into(), name: "Ana".into(), exp: 0 }
    }

    #[test]
    fn join_only_writes_on_insert() {
        let (filter, update) = membership_upsert("pool-1", &claims()).unwrap();

        assert_eq!(filter, doc! { "pool_id": "pool-1", "user_id": "user-1" });
        assert_eq!(update.len(), 1);

        let inserted = update.get_document("$setOnInsert").unwrap();
        assert_eq!(inserted.get_str("name").unwrap(), "Ana");
        assert!(inserted.contains_key("joined_at"));
    }

    #[test]
    fn pool_pages_are_for_members_only() {
        let pool = Pool::new("Office pool".into(), 71, 2024, "owner".into());
        let member = Membership::new(pool.id.unwrap().to_hex(), "user-1".into(), "Ana".into());

        assert!(matches!(members_only(pool.clone(), Ok(Some(member))), Ok(Lookup::Found(p)) if p.name == "Office pool"));
        assert!(matches!(members_only(pool.clone(), Ok(None)), Err(AppError::NotAMember)));
        assert!(matches!(
            members_only(pool, Err(AppError::DocumentNotFound)),
            Ok(Lookup::Error(reason)) if reason.contains("membership unavailable")
        ));
    }
}
