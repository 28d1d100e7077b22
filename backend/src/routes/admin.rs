use bcrypt::verify;
use rocket::State;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::serde::json::Json;
use rocket_db_pools::Connection;
use rocket_db_pools::diesel::prelude::*;
use uuid::Uuid;

use crate::AppState;
use crate::db::ElectionsDB;
use crate::error::ApiError;
use crate::history;
use crate::models::{
    AdminLoginRequest, AdminSession, CandidateStats, NewAdminSession, NewSelection,
    PatternResponse, SaveSelectionsRequest, SelectionItem, SessionResponse,
};
use crate::routes::session_response;
use crate::schema::admin_sessions;
use crate::store;

// Resolves the admin_auth cookie to the logged-in admin's email
async fn authenticated_admin(
    cookies: &CookieJar<'_>,
    db: &mut Connection<ElectionsDB>,
) -> Option<String> {
    let cookie = cookies.get("admin_auth")?;
    admin_sessions::table
        .find(cookie.value())
        .first::<AdminSession>(db)
        .await
        .ok()
        .map(|session| session.admin_email)
}

// Admin login endpoint - allow-list plus password check
#[post("/admin/login", format = "json", data = "<login>")]
pub async fn admin_login(
    mut db: Connection<ElectionsDB>,
    state: &State<AppState>,
    cookies: &CookieJar<'_>,
    login: Json<AdminLoginRequest>,
) -> Result<Status, ApiError> {
    let email = login.email.trim().to_lowercase();
    let allowed = state
        .allowed_admins
        .iter()
        .any(|admin| admin.eq_ignore_ascii_case(&email));

    if allowed && verify(&login.password, &state.admin_password_hash).unwrap_or(false) {
        let token = Uuid::new_v4().to_string();
        let new_session = NewAdminSession {
            session_token: token.clone(),
            admin_email: email,
            expires_at: None,
        };

        diesel::insert_into(admin_sessions::table)
            .values(&new_session)
            .execute(&mut db)
            .await?;

        let mut cookie = Cookie::new("admin_auth", token);
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_path("/");
        cookies.add(cookie);
        Ok(Status::Ok)
    } else {
        // Clear any existing invalid cookie
        cookies.remove(Cookie::from("admin_auth"));
        Err(ApiError::Unauthorized)
    }
}

// Admin logout endpoint
#[post("/admin/logout")]
pub async fn admin_logout(
    mut db: Connection<ElectionsDB>,
    cookies: &CookieJar<'_>,
) -> Result<Status, ApiError> {
    if let Some(cookie) = cookies.get("admin_auth") {
        let token = cookie.value();
        diesel::delete(admin_sessions::table.find(token))
            .execute(&mut db)
            .await
            .ok();
        cookies.remove(Cookie::from("admin_auth"));
    }
    Ok(Status::Ok)
}

// Check if admin is authenticated
#[get("/admin/check")]
pub async fn admin_check(
    mut db: Connection<ElectionsDB>,
    cookies: &CookieJar<'_>,
) -> Result<Json<bool>, ApiError> {
    let authenticated = authenticated_admin(cookies, &mut db).await.is_some();
    Ok(Json(authenticated))
}

// Save a batch of picks in priority order. Appends a new session; earlier
// saves stay in the history.
#[post("/admin/selections", format = "json", data = "<request>")]
pub async fn save_selections(
    mut db: Connection<ElectionsDB>,
    cookies: &CookieJar<'_>,
    request: Json<SaveSelectionsRequest>,
) -> Result<Status, ApiError> {
    let email = authenticated_admin(cookies, &mut db)
        .await
        .ok_or(ApiError::Unauthorized)?;

    let roster = store::roster(&mut db).await?;
    history::validate_selections(&request.selections, &roster)?;

    let rows: Vec<NewSelection> = request
        .selections
        .iter()
        .enumerate()
        .map(|(index, entry)| NewSelection {
            user_id: email.clone(),
            candidate_name: entry.name.clone(),
            list_name: entry.list_name.as_str().to_string(),
            // Rank is the position in the submitted array, 1-indexed
            selection_order: index as i32 + 1,
        })
        .collect();

    store::insert_selections(&mut db, rows).await?;
    Ok(Status::Created)
}

// The logged-in admin's current picks (their most recent session)
#[get("/admin/selections")]
pub async fn current_selections(
    mut db: Connection<ElectionsDB>,
    cookies: &CookieJar<'_>,
) -> Result<Json<Vec<SelectionItem>>, ApiError> {
    let email = authenticated_admin(cookies, &mut db)
        .await
        .ok_or(ApiError::Unauthorized)?;

    let rows = store::selections_for_user(&mut db, &email).await?;
    let sessions = history::cluster_sessions(rows);
    let items = sessions
        .as_slice()
        .first()
        .map(|session| session.selections.iter().map(SelectionItem::from).collect())
        .unwrap_or_default();

    Ok(Json(items))
}

// All of the admin's reconstructed save events, newest first
#[get("/admin/history")]
pub async fn selection_history(
    mut db: Connection<ElectionsDB>,
    cookies: &CookieJar<'_>,
) -> Result<Json<Vec<SessionResponse>>, ApiError> {
    let email = authenticated_admin(cookies, &mut db)
        .await
        .ok_or(ApiError::Unauthorized)?;

    let rows = store::selections_for_user(&mut db, &email).await?;
    let sessions = history::cluster_sessions(rows);
    Ok(Json(sessions.iter().map(session_response).collect()))
}

// Sessions the admin has saved more than once with identical content
#[get("/admin/patterns")]
pub async fn selection_patterns(
    mut db: Connection<ElectionsDB>,
    cookies: &CookieJar<'_>,
) -> Result<Json<Vec<PatternResponse>>, ApiError> {
    let email = authenticated_admin(cookies, &mut db)
        .await
        .ok_or(ApiError::Unauthorized)?;

    let rows = store::selections_for_user(&mut db, &email).await?;
    let sessions = history::cluster_sessions(rows);
    let patterns = history::find_identical_patterns(&sessions)
        .into_iter()
        .map(|group| PatternResponse {
            pattern_id: group.pattern_id,
            count: group.count,
            selections: group.selections.iter().map(SelectionItem::from).collect(),
        })
        .collect();

    Ok(Json(patterns))
}

// The admin's own per-candidate counts across all their saves
#[get("/admin/stats")]
pub async fn own_stats(
    mut db: Connection<ElectionsDB>,
    cookies: &CookieJar<'_>,
) -> Result<Json<Vec<CandidateStats>>, ApiError> {
    let email = authenticated_admin(cookies, &mut db)
        .await
        .ok_or(ApiError::Unauthorized)?;

    let roster = store::roster(&mut db).await?;
    let pairs = store::selection_pairs_for_user(&mut db, &email).await?;
    Ok(Json(history::candidate_stats(&roster, &pairs)))
}

// Delete one reconstructed session by its run-local group id. A group that
// no longer resolves is a no-op: the rows are already gone.
#[delete("/admin/history/<group_id>")]
pub async fn delete_history_group(
    mut db: Connection<ElectionsDB>,
    cookies: &CookieJar<'_>,
    group_id: &str,
) -> Result<Status, ApiError> {
    let email = authenticated_admin(cookies, &mut db)
        .await
        .ok_or(ApiError::Unauthorized)?;

    let rows = store::selections_for_user(&mut db, &email).await?;
    let sessions = history::cluster_sessions(rows);

    if let Some(session) = sessions.iter().find(|s| s.group_id == group_id) {
        let ids = session.selections.iter().map(|s| s.id).collect();
        store::delete_by_ids(&mut db, ids).await?;
    }

    Ok(Status::Ok)
}

// Delete every selection row the admin has ever saved
#[delete("/admin/selections")]
pub async fn delete_all_selections(
    mut db: Connection<ElectionsDB>,
    cookies: &CookieJar<'_>,
) -> Result<Status, ApiError> {
    let email = authenticated_admin(cookies, &mut db)
        .await
        .ok_or(ApiError::Unauthorized)?;

    store::delete_by_user(&mut db, &email).await?;
    Ok(Status::Ok)
}
