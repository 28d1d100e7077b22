use chrono::NaiveDateTime;
use rocket::serde::{Deserialize, Serialize};
use rocket_db_pools::diesel::prelude::*;

use crate::schema::{admin_sessions, candidates, selections};

/// The two fixed candidate rosters. Stored in the database as the
/// display strings "List A" / "List B".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub enum ListName {
    #[serde(rename = "List A")]
    ListA,
    #[serde(rename = "List B")]
    ListB,
}

impl ListName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListName::ListA => "List A",
            ListName::ListB => "List B",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = selections)]
pub struct Selection {
    pub id: i32,
    pub user_id: String,
    pub candidate_name: String,
    pub list_name: String,
    pub selection_order: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = selections)]
pub struct NewSelection {
    pub user_id: String,
    pub candidate_name: String,
    pub list_name: String,
    pub selection_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = candidates)]
pub struct Candidate {
    pub id: i32,
    pub name: String,
    pub list_name: String,
    pub position: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = candidates)]
pub struct NewCandidate {
    pub name: String,
    pub list_name: String,
    pub position: i32,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = admin_sessions)]
pub struct AdminSession {
    pub session_token: String,
    pub admin_email: String,
    pub created_at: Option<NaiveDateTime>,
    pub expires_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = admin_sessions)]
pub struct NewAdminSession {
    pub session_token: String,
    pub admin_email: String,
    pub expires_at: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

/// One pick in a save request. Priority rank is implied by position in
/// the array; the server assigns `selection_order` = index + 1.
#[derive(Debug, Clone, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct SelectionEntry {
    pub name: String,
    pub list_name: ListName,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct SaveSelectionsRequest {
    pub selections: Vec<SelectionEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SelectionItem {
    pub id: i32,
    pub candidate_name: String,
    pub list_name: String,
    pub selection_order: i32,
}

/// One reconstructed save event, as exposed over the API.
#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SessionResponse {
    pub group_id: String,
    pub timestamp: String,
    pub selection_count: usize,
    pub selections: Vec<SelectionItem>,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct PatternResponse {
    pub pattern_id: String,
    pub count: usize,
    pub selections: Vec<SelectionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CandidateStats {
    pub name: String,
    pub list_name: String,
    pub selection_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct UserSummary {
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<&Selection> for SelectionItem {
    fn from(s: &Selection) -> Self {
        SelectionItem {
            id: s.id,
            candidate_name: s.candidate_name.clone(),
            list_name: s.list_name.clone(),
            selection_order: s.selection_order,
        }
    }
}
