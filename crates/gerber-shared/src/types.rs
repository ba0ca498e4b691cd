//! Common types

use uuid::Uuid;

pub type SessionId = Uuid;

pub fn new_session_id() -> SessionId {
    Uuid::new_v4()
}
