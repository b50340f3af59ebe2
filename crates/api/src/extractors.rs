//! Extractors that reject with the JSON envelope instead of plain text.

use axum::extract::{FromRequest, FromRequestParts};

use crate::response::ApiError;

/// `axum::Json` with envelope rejections.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Query` with envelope rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);
