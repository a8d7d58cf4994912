//! HTTP adapter: handlers, request/response DTOs, and the error mapping
//! onto status codes.

pub mod admin;
pub mod auth;
pub mod categories;
pub mod error;
pub mod favorites;
pub mod health;
pub mod identity;
pub mod recipes;
pub mod reviews;
pub mod state;
pub mod uploads;
pub mod users;
mod validation;

pub use crate::domain::ApiResult;
