//! HTTP handlers

pub mod auth;
pub mod gerber;
pub mod health;
pub mod logger;
pub mod session_files;
