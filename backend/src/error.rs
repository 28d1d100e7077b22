// API error taxonomy and its HTTP mapping

use rocket::http::Status;
use rocket::request::Request;
use rocket::response::status::Custom;
use rocket::response::{self, Responder};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The record store failed; the driver's message is passed through
    /// unchanged and nothing is retried.
    #[error("store unavailable: {0}")]
    Store(#[from] diesel::result::Error),

    /// The request was rejected before any store mutation.
    #[error("{0}")]
    Validation(String),

    #[error("not authorized")]
    Unauthorized,
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = match &self {
            ApiError::Store(e) => {
                eprintln!("Database error: {}", e);
                Status::InternalServerError
            }
            ApiError::Validation(_) => Status::UnprocessableEntity,
            ApiError::Unauthorized => Status::Unauthorized,
        };

        Custom(status, self.to_string()).respond_to(req)
    }
}
