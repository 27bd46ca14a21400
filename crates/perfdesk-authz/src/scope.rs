use perfdesk_common::{Department, Principal, Role, UserId, same_department};

/// Whether records owned by `owner` (in `owner_department`) are inside the
/// principal's visibility scope.
///
/// - ADMIN: every owner.
/// - MANAGER: owners in the manager's own department, the manager included.
/// - EMPLOYEE / IT_SUPPORT: only their own records.
/// - Unknown roles: nothing.
///
/// A manager outside the owner's department must be answered exactly as if the
/// record did not exist.
pub fn within_scope(
    principal: &Principal,
    owner: &UserId,
    owner_department: Option<&Department>,
) -> bool {
    match principal.role {
        Role::Admin => true,
        Role::Manager => {
            &principal.id == owner || same_department(principal.department(), owner_department)
        }
        Role::Employee | Role::ItSupport => &principal.id == owner,
        Role::Unknown => false,
    }
}
