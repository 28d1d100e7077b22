// Routes module - organizes all HTTP route handlers

pub mod admin;
pub mod viewer;

use rocket::fs::NamedFile;
use rocket::http::Status;

use crate::history::SelectionSession;
use crate::models::{SelectionItem, SessionResponse};

/// 404 error handler - serves custom 404.html page
#[catch(404)]
pub async fn not_found() -> Option<NamedFile> {
    NamedFile::open("/app/static/404.html").await.ok()
}

#[catch(401)]
pub fn unauthorized() -> Status {
    Status::Unauthorized
}

pub(crate) fn session_response(session: &SelectionSession) -> SessionResponse {
    SessionResponse {
        group_id: session.group_id.clone(),
        timestamp: session.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        selection_count: session.selections.len(),
        selections: session.selections.iter().map(SelectionItem::from).collect(),
    }
}
