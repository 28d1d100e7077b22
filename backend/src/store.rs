// The narrow record-store surface the rest of the app goes through.
// Sessions are never persisted; everything here works on flat rows.

use diesel::QueryResult;
use rocket_db_pools::Connection;
use rocket_db_pools::diesel::prelude::*;

use crate::db::ElectionsDB;
use crate::models::{Candidate, NewSelection, Selection};
use crate::schema::{candidates, selections};

/// Batch insert; the store assigns ids and a shared `created_at`.
pub async fn insert_selections(
    db: &mut Connection<ElectionsDB>,
    rows: Vec<NewSelection>,
) -> QueryResult<usize> {
    diesel::insert_into(selections::table)
        .values(&rows)
        .execute(db)
        .await
}

pub async fn delete_by_ids(db: &mut Connection<ElectionsDB>, ids: Vec<i32>) -> QueryResult<usize> {
    diesel::delete(selections::table.filter(selections::id.eq_any(ids)))
        .execute(db)
        .await
}

pub async fn delete_by_user(db: &mut Connection<ElectionsDB>, user: &str) -> QueryResult<usize> {
    diesel::delete(selections::table.filter(selections::user_id.eq(user)))
        .execute(db)
        .await
}

/// All rows for one user, in store order; callers sort.
pub async fn selections_for_user(
    db: &mut Connection<ElectionsDB>,
    user: &str,
) -> QueryResult<Vec<Selection>> {
    selections::table
        .filter(selections::user_id.eq(user))
        .load::<Selection>(db)
        .await
}

pub async fn distinct_user_ids(db: &mut Connection<ElectionsDB>) -> QueryResult<Vec<String>> {
    selections::table
        .select(selections::user_id)
        .distinct()
        .load::<String>(db)
        .await
}

/// (candidate_name, list_name) pairs for aggregation, one user's rows.
pub async fn selection_pairs_for_user(
    db: &mut Connection<ElectionsDB>,
    user: &str,
) -> QueryResult<Vec<(String, String)>> {
    selections::table
        .filter(selections::user_id.eq(user))
        .select((selections::candidate_name, selections::list_name))
        .load::<(String, String)>(db)
        .await
}

/// (candidate_name, list_name) pairs across every user.
pub async fn selection_pairs_all(
    db: &mut Connection<ElectionsDB>,
) -> QueryResult<Vec<(String, String)>> {
    selections::table
        .select((selections::candidate_name, selections::list_name))
        .load::<(String, String)>(db)
        .await
}

/// Both rosters in roster order: List A before List B, then by position.
pub async fn roster(db: &mut Connection<ElectionsDB>) -> QueryResult<Vec<Candidate>> {
    candidates::table
        .order((candidates::list_name.asc(), candidates::position.asc()))
        .load::<Candidate>(db)
        .await
}
