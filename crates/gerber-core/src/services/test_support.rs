//! Shared fixtures for service tests

use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::domain::{Registration, Role, UserAccount};
use crate::repositories::AuditSink;

pub const SECRET: &str = "0123456789abcdef0123456789abcdef";

pub fn account(user_name: &str, roles: &[Role]) -> UserAccount {
    UserAccount {
        id: Uuid::new_v4().to_string(),
        user_name: user_name.to_string(),
        first_name: "Ivan".to_string(),
        second_name: "Ivanovich".to_string(),
        last_name: "Petrov".to_string(),
        email: format!("{}@example.com", user_name),
        phone_number: format!("+7{}", user_name.len()),
        city: None,
        password_hash: String::new(),
        roles: roles.to_vec(),
        created_at: Utc::now(),
    }
}

pub fn registration(user_name: &str, phone_number: &str) -> Registration {
    Registration {
        first_name: "Ivan".to_string(),
        second_name: "Ivanovich".to_string(),
        last_name: "Petrov".to_string(),
        user_name: user_name.to_string(),
        phone_number: phone_number.to_string(),
        email: format!("{}@example.com", user_name),
        password: "Secret123".to_string(),
        city: Some("Novosibirsk".to_string()),
    }
}

#[derive(Default)]
pub struct RecordingAudit {
    errors: Mutex<Vec<(String, Option<String>)>>,
    actions: Mutex<Vec<(String, String)>>,
}

impl RecordingAudit {
    pub fn errors(&self) -> Vec<(String, Option<String>)> {
        self.errors.lock().clone()
    }

    pub fn actions(&self) -> Vec<(String, String)> {
        self.actions.lock().clone()
    }
}

impl AuditSink for RecordingAudit {
    fn record_error(&self, message: &str, user_id: Option<&str>) {
        self.errors
            .lock()
            .push((message.to_string(), user_id.map(str::to_string)));
    }

    fn record_user_action(&self, user_id: &str, description: &str) {
        self.actions
            .lock()
            .push((user_id.to_string(), description.to_string()));
    }

    fn record_client_error(&self, message: &str, user_id: Option<&str>) {
        self.record_error(message, user_id);
    }
}
