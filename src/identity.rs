//! Caller identity as forwarded by the authenticating gateway.
//!
//! The gateway sets `X-User-Id` and, for supplier accounts, `X-User-Role`.
//! Requests without a usable user id are treated as anonymous.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::HeaderMap;
use actix_web::{FromRequest, HttpRequest};

use crate::domain::caller::{Caller, Role};
use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

pub fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, AppError> {
    let user_id = header(headers, USER_ID_HEADER)
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or(AppError::NotAuthenticated)?;

    let role = match header(headers, USER_ROLE_HEADER) {
        None | Some("") => Role::default(),
        Some(raw) => raw.parse::<Role>().map_err(AppError::Forbidden)?,
    };

    Ok(Caller { user_id, role })
}

impl FromRequest for Caller {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(caller_from_headers(req.headers()))
    }
}
