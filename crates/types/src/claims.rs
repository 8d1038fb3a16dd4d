use serde::{Deserialize, Serialize};

/// Caller role as resolved by the external authentication collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Captain,
    Viewer,
}

/// Pre-resolved identity attached to every inbound command.
///
/// Token verification, session invalidation and team membership all happen
/// upstream; the engine trusts these claims as given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerClaims {
    pub caller_id: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
}

impl CallerClaims {
    pub fn admin(caller_id: impl Into<String>) -> Self {
        Self {
            caller_id: caller_id.into(),
            role: Role::Admin,
            team_id: None,
        }
    }

    pub fn captain(caller_id: impl Into<String>, team_id: impl Into<String>) -> Self {
        Self {
            caller_id: caller_id.into(),
            role: Role::Captain,
            team_id: Some(team_id.into()),
        }
    }

    pub fn viewer(caller_id: impl Into<String>) -> Self {
        Self {
            caller_id: caller_id.into(),
            role: Role::Viewer,
            team_id: None,
        }
    }
}
