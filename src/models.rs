pub mod entity;
pub mod auth;
pub mod partner;
pub mod finance;
pub mod cargo;
pub mod dashboard;
