// src/handlers.rs

pub mod auth;
pub mod cargo;
pub mod dashboard;
pub mod finance;
pub mod partners;
pub mod users;
