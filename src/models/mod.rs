// Wire types for the auth endpoints and the upstream catalog APIs

pub mod auth;
pub mod catalog;
