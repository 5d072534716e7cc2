//! Session transport: bearer tokens in, [`Session`] out.
//!
//! Tokens travel in `Authorization: Bearer <token>`; the `JWT <token>`
//! scheme is accepted too. The guard resolves the token once and parks the
//! [`Session`] in request extensions, where [`CurrentSession`] picks it up.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use campus_core::{CampusError, Session};

use crate::error::CampusAxumError;

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = raw.split_once(' ')?;
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    (scheme.eq_ignore_ascii_case("bearer") || scheme.eq_ignore_ascii_case("jwt")).then_some(token)
}

/// The raw bearer token, if the request carried one.
#[derive(Debug, Clone)]
pub struct BearerToken(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(bearer_token(&parts.headers).map(str::to_string)))
    }
}

/// The session the guard admitted. Only available behind the guard.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl<S: Send + Sync> FromRequestParts<S> for CurrentSession {
    type Rejection = CampusAxumError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self)
            .ok_or_else(|| CampusError::not_authenticated("Not signed in").into())
    }
}
