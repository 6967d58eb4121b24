//! Access guard for the back office.
//!
//! One question is asked everywhere: may this subject see this resource? The
//! answer comes from a single [`AccessPolicy`]. Anyone turned away from the
//! admin area, whether anonymous or signed in without the `admin` role, gets
//! the same redirect to the login page so the response does not reveal which
//! case applied.

use std::collections::BTreeSet;

use url::form_urlencoded;

use super::{Role, UserId};

/// Where a successful login lands when no usable return path was preserved.
pub const DEFAULT_RETURN_PATH: &str = "/admin";
/// Login route on the public site.
pub const LOGIN_PATH: &str = "/login";

/// Who is asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Anonymous,
    Authenticated {
        user_id: UserId,
        roles: BTreeSet<Role>,
    },
    /// Holder of the shared legacy admin token. No per-user identity.
    #[cfg(feature = "legacy-admin-token")]
    LegacyToken,
}

impl Subject {
    pub fn authenticated(user_id: UserId, roles: impl IntoIterator<Item = Role>) -> Self {
        Self::Authenticated {
            user_id,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Authenticated { user_id, .. } => Some(user_id),
            _ => None,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        match self {
            Self::Authenticated { roles, .. } => roles.contains(&role),
            _ => false,
        }
    }
}

/// What is being asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Public,
    AdminArea { requested_path: String },
}

/// Capability check shared by every guarded route.
pub trait AccessPolicy: Send + Sync {
    fn is_authorized(&self, subject: &Subject, resource: &Resource) -> bool;
}

/// Production policy: the admin area needs the `admin` role.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleAccessPolicy;

impl AccessPolicy for RoleAccessPolicy {
    fn is_authorized(&self, subject: &Subject, resource: &Resource) -> bool {
        match resource {
            Resource::Public => true,
            Resource::AdminArea { .. } => match subject {
                #[cfg(feature = "legacy-admin-token")]
                Subject::LegacyToken => true,
                other => other.has_role(Role::Admin),
            },
        }
    }
}

/// Outcome of the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    RedirectToLogin { location: String },
}

/// Evaluate `policy` and build the redirect for refused admin requests.
///
/// # Examples
/// ```
/// use vetpal::domain::{AccessDecision, Resource, RoleAccessPolicy, Subject, decide};
///
/// let decision = decide(
///     &RoleAccessPolicy,
///     &Subject::Anonymous,
///     &Resource::AdminArea { requested_path: "/admin/applications".into() },
/// );
/// assert_eq!(
///     decision,
///     AccessDecision::RedirectToLogin {
///         location: "/login?returnTo=%2Fadmin%2Fapplications".into()
///     }
/// );
/// ```
pub fn decide(policy: &dyn AccessPolicy, subject: &Subject, resource: &Resource) -> AccessDecision {
    if policy.is_authorized(subject, resource) {
        return AccessDecision::Allow;
    }
    let requested = match resource {
        Resource::AdminArea { requested_path } => Some(requested_path.as_str()),
        Resource::Public => None,
    };
    AccessDecision::RedirectToLogin {
        location: ReturnPath::sanitise(requested).login_location(),
    }
}

/// Same-origin path to return to after login.
///
/// Anything that is not a plain absolute path on this site (protocol-relative
/// `//host`, schemes, backslashes, control characters) falls back to
/// [`DEFAULT_RETURN_PATH`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnPath(String);

impl ReturnPath {
    pub fn sanitise(raw: Option<&str>) -> Self {
        let candidate = raw.map(str::trim).unwrap_or_default();
        let safe = candidate.starts_with('/')
            && !candidate.starts_with("//")
            && !candidate.contains('\\')
            && !candidate.contains("://")
            && !candidate.chars().any(char::is_control);
        if safe {
            Self(candidate.to_owned())
        } else {
            Self(DEFAULT_RETURN_PATH.to_owned())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `/login?returnTo=<encoded path>`.
    pub fn login_location(&self) -> String {
        let encoded: String = form_urlencoded::byte_serialize(self.0.as_bytes()).collect();
        format!("{LOGIN_PATH}?returnTo={encoded}")
    }
}

/// Shared static admin token kept for old tooling.
///
/// Only the SHA-256 digest of the configured token is held in memory.
#[cfg(feature = "legacy-admin-token")]
#[derive(Clone)]
pub struct LegacyAdminToken {
    digest: [u8; 32],
}

#[cfg(feature = "legacy-admin-token")]
impl LegacyAdminToken {
    /// `None` when the configured token is blank.
    pub fn new(configured: &str) -> Option<Self> {
        let trimmed = configured.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            digest: Self::digest(trimmed),
        })
    }

    fn digest(value: &str) -> [u8; 32] {
        use sha2::{Digest, Sha256};
        Sha256::digest(value.as_bytes()).into()
    }

    /// Compare digests without short-circuiting on the first differing byte.
    pub fn matches(&self, presented: &str) -> bool {
        let presented = Self::digest(presented.trim());
        presented
            .iter()
            .zip(self.digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    /// Hex fingerprint for logs; never the token itself.
    pub fn fingerprint(&self) -> String {
        hex::encode(&self.digest[..4])
    }
}

#[cfg(feature = "legacy-admin-token")]
impl std::fmt::Debug for LegacyAdminToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyAdminToken")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}
