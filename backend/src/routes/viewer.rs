// Public viewer surface - no login, read-only

use rocket::State;
use rocket::serde::json::Json;
use rocket_db_pools::Connection;

use crate::AppState;
use crate::db::ElectionsDB;
use crate::display_name::display_name;
use crate::error::ApiError;
use crate::history;
use crate::models::{Candidate, CandidateStats, SelectionItem, SessionResponse, UserSummary};
use crate::routes::session_response;
use crate::store;

// Both rosters in roster order
#[get("/candidates")]
pub async fn get_candidates(
    mut db: Connection<ElectionsDB>,
) -> Result<Json<Vec<Candidate>>, ApiError> {
    let roster = store::roster(&mut db).await?;
    Ok(Json(roster))
}

// Every user that has saved selections, with a derived display name
#[get("/viewer/users")]
pub async fn list_users(
    mut db: Connection<ElectionsDB>,
    state: &State<AppState>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let user_ids = store::distinct_user_ids(&mut db).await?;

    let users = user_ids
        .into_iter()
        .map(|id| {
            let (name, email) = display_name(&id, &state.allowed_admins);
            UserSummary {
                id,
                display_name: name,
                email,
            }
        })
        .collect();

    Ok(Json(users))
}

// A user's current picks (their most recent session)
#[get("/viewer/<user_id>/selections")]
pub async fn user_selections(
    mut db: Connection<ElectionsDB>,
    user_id: &str,
) -> Result<Json<Vec<SelectionItem>>, ApiError> {
    let rows = store::selections_for_user(&mut db, user_id).await?;
    let sessions = history::cluster_sessions(rows);
    let items = sessions
        .first()
        .map(|session| session.selections.iter().map(SelectionItem::from).collect())
        .unwrap_or_default();

    Ok(Json(items))
}

// A user's full save history, newest first
#[get("/viewer/<user_id>/history")]
pub async fn user_history(
    mut db: Connection<ElectionsDB>,
    user_id: &str,
) -> Result<Json<Vec<SessionResponse>>, ApiError> {
    let rows = store::selections_for_user(&mut db, user_id).await?;
    let sessions = history::cluster_sessions(rows);
    Ok(Json(sessions.iter().map(session_response).collect()))
}

// Per-candidate counts for one user
#[get("/viewer/<user_id>/stats")]
pub async fn user_stats(
    mut db: Connection<ElectionsDB>,
    user_id: &str,
) -> Result<Json<Vec<CandidateStats>>, ApiError> {
    let roster = store::roster(&mut db).await?;
    let pairs = store::selection_pairs_for_user(&mut db, user_id).await?;
    Ok(Json(history::candidate_stats(&roster, &pairs)))
}

// Per-candidate counts across every user
#[get("/viewer/stats")]
pub async fn global_stats(
    mut db: Connection<ElectionsDB>,
) -> Result<Json<Vec<CandidateStats>>, ApiError> {
    let roster = store::roster(&mut db).await?;
    let pairs = store::selection_pairs_all(&mut db).await?;
    Ok(Json(history::candidate_stats(&roster, &pairs)))
}
