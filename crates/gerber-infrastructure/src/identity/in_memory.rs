//! Process-local identity backend
//!
//! Accounts are keyed by normalized (lowercased) user name so that name
//! uniqueness is enforced atomically on insert.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info};

use gerber_core::repositories::UserRepository;
use gerber_core::{DomainError, Role, UserAccount};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<String, UserAccount>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize(user_name: &str) -> String {
        user_name.trim().to_lowercase()
    }

    fn find_where(&self, pred: impl Fn(&UserAccount) -> bool) -> Option<UserAccount> {
        self.users
            .iter()
            .find(|entry| pred(entry.value()))
            .map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserAccount>, DomainError> {
        Ok(self.find_where(|u| u.id == id))
    }

    async fn find_by_user_name(&self, user_name: &str) -> Result<Option<UserAccount>, DomainError> {
        Ok(self
            .users
            .get(&Self::normalize(user_name))
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_phone_number(&self, phone_number: &str) -> Result<Option<UserAccount>, DomainError> {
        Ok(self.find_where(|u| u.phone_number == phone_number))
    }

    async fn create(&self, user: &UserAccount) -> Result<UserAccount, DomainError> {
        if self.find_where(|u| u.phone_number == user.phone_number).is_some() {
            return Err(DomainError::PhoneNumberAlreadyExists(user.phone_number.clone()));
        }

        match self.users.entry(Self::normalize(&user.user_name)) {
            Entry::Occupied(_) => Err(DomainError::UserNameAlreadyExists(user.user_name.clone())),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                info!("Created user {} ({})", user.user_name, user.id);
                Ok(user.clone())
            }
        }
    }

    async fn replace_roles(&self, id: &str, roles: Vec<Role>) -> Result<UserAccount, DomainError> {
        let mut entry = self
            .users
            .iter_mut()
            .find(|entry| entry.value().id == id)
            .ok_or(DomainError::UserNotFound)?;

        entry.value_mut().roles = roles;
        debug!("Roles of {} replaced with {:?}", entry.value().user_name, entry.value().roles);
        Ok(entry.value().clone())
    }

    async fn list(&self) -> Result<Vec<UserAccount>, DomainError> {
        let mut users: Vec<UserAccount> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.user_name.cmp(&b.user_name)));
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(user_name: &str, phone: &str) -> UserAccount {
        UserAccount {
            id: uuid::Uuid::new_v4().to_string(),
            user_name: user_name.to_string(),
            first_name: "Ivan".to_string(),
            second_name: "Ivanovich".to_string(),
            last_name: "Petrov".to_string(),
            email: format!("{}@example.com", user_name),
            phone_number: phone.to_string(),
            city: None,
            password_hash: "hash".to_string(),
            roles: vec![Role::User],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_user_name_lookup_is_case_insensitive() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(&account("PcbMaker", "+7001")).await.unwrap();

        let found = repo.find_by_user_name("pcbmaker").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(repo.find_by_id(&created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_create_enforces_uniqueness() {
        let repo = InMemoryUserRepository::new();
        repo.create(&account("pcbmaker", "+7001")).await.unwrap();

        assert!(matches!(
            repo.create(&account("PCBMAKER", "+7002")).await,
            Err(DomainError::UserNameAlreadyExists(_))
        ));
        assert!(matches!(
            repo.create(&account("other", "+7001")).await,
            Err(DomainError::PhoneNumberAlreadyExists(_))
        ));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_roles_overwrites_set() {
        let repo = InMemoryUserRepository::new();
        let mut user = account("pcbmaker", "+7001");
        user.roles = vec![Role::User, Role::Manager];
        let created = repo.create(&user).await.unwrap();

        let updated = repo.replace_roles(&created.id, vec![Role::Admin]).await.unwrap();
        assert_eq!(updated.roles, vec![Role::Admin]);
        assert_eq!(
            repo.replace_roles("missing", vec![Role::User]).await,
            Err(DomainError::UserNotFound)
        );
    }
}
