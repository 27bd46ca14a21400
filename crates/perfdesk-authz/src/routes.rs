use perfdesk_common::Role;

/// Role gate for entering a route. An empty `required` list admits any known
/// role; an unknown role is never admitted.
pub fn role_permits(role: Role, required: &[Role]) -> bool {
    if role == Role::Unknown {
        return false;
    }
    required.is_empty() || required.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_only_route_rejects_manager() {
        assert!(!role_permits(Role::Manager, &[Role::Admin]));
        assert!(role_permits(Role::Admin, &[Role::Admin]));
    }

    #[test]
    fn open_route_admits_known_roles_only() {
        assert!(role_permits(Role::ItSupport, &[]));
        assert!(!role_permits(Role::Unknown, &[]));
        assert!(!role_permits(Role::Unknown, &[Role::Unknown]));
    }
}
