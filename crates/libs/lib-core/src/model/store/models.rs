//! # Domain Models
//!
//! Records kept by the store (`User`, `Role`, `RoleAssignment`) and the
//! sanitized `PublicUser` projection embedded in tokens.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh record id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// region: --- Roles

/// Capability tags a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    /// Ordinary user, granted at signup
    User,
    Specialist,
    /// Privileged minion
    Minion,
}

impl RoleName {
    pub const ALL: [RoleName; 3] = [RoleName::User, RoleName::Specialist, RoleName::Minion];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::User => "user",
            RoleName::Specialist => "specialist",
            RoleName::Minion => "minion",
        }
    }

    /// Only `user` is the default role.
    pub fn is_default(&self) -> bool {
        matches!(self, RoleName::User)
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(RoleName::User),
            "specialist" => Ok(RoleName::Specialist),
            "minion" => Ok(RoleName::Minion),
            other => Err(format!("unknown role name: {other}")),
        }
    }
}

/// Lifecycle of a role assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Approved,
    Canceled,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Approved => "approved",
            AssignmentStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AssignmentStatus::Pending),
            "approved" => Ok(AssignmentStatus::Approved),
            "canceled" => Ok(AssignmentStatus::Canceled),
            other => Err(format!("unknown assignment status: {other}")),
        }
    }
}

/// Role catalog entry. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: RoleName,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(name: RoleName) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            name,
            is_default: name.is_default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Link between a user and a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub id: String,
    pub user_id: String,
    pub role_id: String,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoleAssignment {
    pub fn new(user_id: impl Into<String>, role_id: impl Into<String>, status: AssignmentStatus) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            user_id: user_id.into(),
            role_id: role_id.into(),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Canceled assignments no longer count as holding the role.
    pub fn is_active(&self) -> bool {
        self.status != AssignmentStatus::Canceled
    }
}

// endregion: --- Roles

// region: --- Users

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Gender {
    Male = 1,
    Female = 2,
    NonBinary = 3,
}

impl TryFrom<u8> for Gender {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Gender::Male),
            2 => Ok(Gender::Female),
            3 => Ok(Gender::NonBinary),
            other => Err(format!("gender must be 1, 2 or 3, got {other}")),
        }
    }
}

impl From<Gender> for u8 {
    fn from(gender: Gender) -> Self {
        gender as u8
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub country: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
}

/// Profile fields filled in when the user completes registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub iin: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<Address>,
}

/// Complete user record, credentials included. Never leaves the server.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub password_confirm_hash: String,
    pub verified: bool,
    pub verify_code: Option<String>,
    /// Ids of the role assignments this user owns, in grant order
    pub role_assignment_ids: Vec<String>,
    pub finished_registration: bool,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Fresh, unverified user with an empty profile.
    pub fn new(
        email: impl Into<String>,
        password_hash: String,
        password_confirm_hash: String,
        role_assignment_ids: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            email: email.into(),
            password_hash,
            password_confirm_hash,
            verified: false,
            verify_code: None,
            role_assignment_ids,
            finished_registration: false,
            profile: Profile::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Resolved role held by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMembership {
    pub name: RoleName,
    pub is_default: bool,
    pub status: AssignmentStatus,
}

/// User snapshot without credentials, as embedded in tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub verified: bool,
    pub finished_registration: bool,
    pub profile: Profile,
    pub role_assignment_ids: Vec<String>,
    pub roles: Vec<RoleMembership>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PublicUser {
    /// Project `user` and resolve its assignments against the role catalog.
    ///
    /// Memberships follow the order of the user's id list. Ids with no loaded
    /// assignment, or whose role is missing from `roles`, are skipped.
    pub fn from_user(user: &User, assignments: &[RoleAssignment], roles: &[Role]) -> Self {
        let by_id: HashMap<&str, &RoleAssignment> =
            assignments.iter().map(|a| (a.id.as_str(), a)).collect();
        let roles_by_id: HashMap<&str, &Role> = roles.iter().map(|r| (r.id.as_str(), r)).collect();

        let roles = user
            .role_assignment_ids
            .iter()
            .filter_map(|id| by_id.get(id.as_str()))
            .filter_map(|assignment| {
                roles_by_id
                    .get(assignment.role_id.as_str())
                    .map(|role| RoleMembership {
                        name: role.name,
                        is_default: role.is_default,
                        status: assignment.status,
                    })
            })
            .collect();

        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            verified: user.verified,
            finished_registration: user.finished_registration,
            profile: user.profile.clone(),
            role_assignment_ids: user.role_assignment_ids.clone(),
            roles,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }

    /// Whether the snapshot holds an approved membership of `name`.
    pub fn has_approved_role(&self, name: RoleName) -> bool {
        self.roles
            .iter()
            .any(|m| m.name == name && m.status == AssignmentStatus::Approved)
    }

    pub fn role_names(&self) -> Vec<RoleName> {
        self.roles.iter().map(|m| m.name).collect()
    }
}

// endregion: --- Users
