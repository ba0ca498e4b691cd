//! Who may assign which role to whom

use crate::domain::Role;
use crate::error::DomainError;

/// Check that an actor holding `actor_roles` may give `new_role` to a user
/// currently holding `target_roles`.
///
/// Admins may only hand out `User` or `Manager`, and never to another Admin
/// or an Owner. Holding Owner as well does not lift the Admin limits.
/// Owners may change anyone except another Owner.
pub fn authorize_role_change(
    actor_roles: &[Role],
    target_roles: &[Role],
    new_role: Role,
) -> Result<(), DomainError> {
    let actor_is_owner = actor_roles.contains(&Role::Owner);
    let actor_is_admin = actor_roles.contains(&Role::Admin);

    if !actor_is_owner && !actor_is_admin {
        return Err(DomainError::Forbidden(
            "Only Owner or Admin may change roles".to_string(),
        ));
    }

    if target_roles.contains(&Role::Owner) {
        return Err(DomainError::Forbidden(
            "Cannot change the role of an Owner".to_string(),
        ));
    }

    if actor_is_admin {
        if !matches!(new_role, Role::User | Role::Manager) {
            return Err(DomainError::Forbidden(format!(
                "Admin cannot assign the {} role",
                new_role
            )));
        }
        if target_roles.contains(&Role::Admin) {
            return Err(DomainError::Forbidden(
                "Admin cannot change the role of another Admin".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_limits() {
        let admin = [Role::Admin];
        assert!(authorize_role_change(&admin, &[Role::User], Role::Manager).is_ok());
        assert!(authorize_role_change(&admin, &[Role::Manager], Role::User).is_ok());

        assert!(authorize_role_change(&admin, &[Role::User], Role::Admin).is_err());
        assert!(authorize_role_change(&admin, &[Role::User], Role::Owner).is_err());
        assert!(authorize_role_change(&admin, &[Role::Admin], Role::User).is_err());
        assert!(authorize_role_change(&admin, &[Role::Owner], Role::User).is_err());
    }

    #[test]
    fn test_owner_limits() {
        let owner = [Role::Owner];
        assert!(authorize_role_change(&owner, &[Role::User], Role::Admin).is_ok());
        assert!(authorize_role_change(&owner, &[Role::Admin], Role::User).is_ok());
        assert!(matches!(
            authorize_role_change(&owner, &[Role::Owner], Role::User),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn test_admin_limits_apply_when_also_owner() {
        let both = [Role::Owner, Role::Admin];
        assert!(authorize_role_change(&both, &[Role::User], Role::Manager).is_ok());
        assert!(matches!(
            authorize_role_change(&both, &[Role::User], Role::Admin),
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            authorize_role_change(&both, &[Role::Admin], Role::User),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn test_plain_users_cannot_change_roles() {
        assert!(authorize_role_change(&[Role::Manager], &[Role::User], Role::User).is_err());
        assert!(authorize_role_change(&[], &[Role::User], Role::Manager).is_err());
    }
}
