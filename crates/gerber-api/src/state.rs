//! Shared application state

use std::sync::Arc;

use gerber_core::repositories::{AuditSink, OrderRepository, SessionRegistry, UserRepository};
use gerber_core::services::{AuthService, OrderService, SessionFileService, TokenService};
use gerber_core::Role;
use gerber_infrastructure::{QueuedAuditLog, SessionStore};
use gerber_security::TokenCodec;
use gerber_shared::config::AppConfig;
use gerber_shared::Clock;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub codec: Arc<TokenCodec>,
    pub auth: Arc<AuthService>,
    pub tokens: Arc<TokenService>,
    pub files: Arc<SessionFileService>,
    pub orders: Arc<OrderService>,
    pub sessions: Arc<SessionStore>,
    pub audit: Arc<QueuedAuditLog>,
}

impl AppState {
    /// Wire the services over the given adapters.
    pub fn new(
        config: AppConfig,
        sessions: Arc<SessionStore>,
        users: Arc<dyn UserRepository>,
        orders: Arc<dyn OrderRepository>,
        audit: Arc<QueuedAuditLog>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ApiError> {
        let registration_role = Role::from_str(&config.auth.registration_role).ok_or_else(|| {
            ApiError::InternalError(format!(
                "unknown registration role: {}",
                config.auth.registration_role
            ))
        })?;

        let codec = Arc::new(TokenCodec::from_settings(&config.jwt));
        let registry: Arc<dyn SessionRegistry> = sessions.clone();
        let sink: Arc<dyn AuditSink> = audit.clone();

        let tokens = Arc::new(TokenService::new(
            codec.clone(),
            users.clone(),
            registry.clone(),
            sink.clone(),
            clock.clone(),
        ));
        let orders = Arc::new(OrderService::new(
            orders,
            users.clone(),
            sink.clone(),
            clock.clone(),
        ));
        let auth = Arc::new(AuthService::new(
            users,
            tokens.clone(),
            sink,
            clock,
            registration_role,
        ));
        let files = Arc::new(SessionFileService::new(registry));

        Ok(Self {
            config: Arc::new(config),
            codec,
            auth,
            tokens,
            files,
            orders,
            sessions,
            audit,
        })
    }
}
