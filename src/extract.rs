use crate::error::SatchelError;
use axum::extract::{FromRequest, FromRequestParts};

///[`axum::Json`], but a bad body comes back as a JSON `{"error": ...}` like every other failure
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(SatchelError))]
pub struct JsonBody<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(SatchelError))]
pub struct IdPath<T>(pub T);
