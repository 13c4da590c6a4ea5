//! Form-style request parameters.
//!
//! GET handlers read the query string, everything else reads the body as
//! `application/x-www-form-urlencoded` whatever `Content-Type` says. Empty
//! values are dropped and the first remaining value of a key wins.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::Method;

use crate::error::ApiError;

/// Decoded parameters in first-seen key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormParams(Vec<(String, String)>);

impl FormParams {
    /// Parse `application/x-www-form-urlencoded` bytes.
    pub fn parse(input: &[u8]) -> Self {
        let mut pairs: Vec<(String, String)> = Vec::new();
        for (key, value) in url::form_urlencoded::parse(input) {
            if value.is_empty() || pairs.iter().any(|(k, _)| *k == key) {
                continue;
            }
            pairs.push((key.into_owned(), value.into_owned()));
        }
        Self(pairs)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<S: Send + Sync> FromRequest<S> for FormParams {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if req.method() == Method::GET || req.method() == Method::HEAD {
            let query = req.uri().query().unwrap_or_default();
            return Ok(Self::parse(query.as_bytes()));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        Ok(Self::parse(&body))
    }
}
