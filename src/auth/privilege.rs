//! Operator privilege levels

/// Numeric level at or above which an account is a superadmin.
///
/// Older deployments used `2` for "admin"; the login gate only trusts this
/// threshold so the two conventions are never mixed.
pub const SUPERADMIN_LEVEL: i64 = 90;

/// Lowest level treated as an admin of any kind
pub const ADMIN_LEVEL: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrivilegeLevel {
    Member,
    Admin,
    SuperAdmin,
}

impl PrivilegeLevel {
    pub fn from_level(level: i64) -> Self {
        if level >= SUPERADMIN_LEVEL {
            PrivilegeLevel::SuperAdmin
        } else if level >= ADMIN_LEVEL {
            PrivilegeLevel::Admin
        } else {
            PrivilegeLevel::Member
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrivilegeLevel::Member => "member",
            PrivilegeLevel::Admin => "admin",
            PrivilegeLevel::SuperAdmin => "superadmin",
        }
    }

    /// Whether this level satisfies `required`
    pub fn can_act_as(&self, required: PrivilegeLevel) -> bool {
        *self >= required
    }
}

/// Level required to obtain a back-office token
pub const LOGIN_REQUIRED: PrivilegeLevel = PrivilegeLevel::SuperAdmin;
