//! In-memory session registry

pub mod store;

pub use store::SessionStore;
