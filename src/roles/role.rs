//! Role table and level codec

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::capability::ServiceRoleCapability;

/// Errors raised while parsing a role name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
    #[error("Unknown service role: {0}")]
    UnknownRole(String),
}

/// Coarse authorization tier with an additive weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceRole {
    /// Identity element, weight 0
    None,
    Guest,
    DataScientist,
    DataOwner,
    Admin,
}

impl ServiceRole {
    /// Every role in declaration (ascending weight) order
    pub const ALL: [ServiceRole; 5] = [
        ServiceRole::None,
        ServiceRole::Guest,
        ServiceRole::DataScientist,
        ServiceRole::DataOwner,
        ServiceRole::Admin,
    ];

    /// Additive weight of this role
    pub const fn weight(self) -> u64 {
        match self {
            ServiceRole::None => 0,
            ServiceRole::Guest => 1,
            ServiceRole::DataScientist => 2,
            ServiceRole::DataOwner => 32,
            ServiceRole::Admin => 128,
        }
    }

    /// All roles, heaviest first
    pub fn roles_descending() -> Vec<ServiceRole> {
        let mut roles = Self::ALL.to_vec();
        roles.sort_by(|a, b| b.weight().cmp(&a.weight()));
        roles
    }

    /// Capabilities this role grants on its own
    pub fn grants(self) -> ServiceRoleCapability {
        match self {
            ServiceRole::None => ServiceRoleCapability::empty(),
            ServiceRole::Guest | ServiceRole::DataScientist => {
                ServiceRoleCapability::CAN_MAKE_DATA_REQUESTS
            }
            ServiceRole::DataOwner => {
                ServiceRoleCapability::CAN_MAKE_DATA_REQUESTS
                    | ServiceRoleCapability::CAN_TRIAGE_DATA_REQUESTS
                    | ServiceRoleCapability::CAN_MANAGE_PRIVACY_BUDGET
                    | ServiceRoleCapability::CAN_CREATE_USERS
                    | ServiceRoleCapability::CAN_MANAGE_USERS
                    | ServiceRoleCapability::CAN_UPLOAD_DATA
                    | ServiceRoleCapability::CAN_UPLOAD_LEGAL_DOCUMENT
            }
            ServiceRole::Admin => ServiceRoleCapability::all(),
        }
    }

    /// The roles at or above this tier, heaviest first.
    ///
    /// A check for "requires tier X" is `X.at_or_above().contains(&role)`.
    pub fn at_or_above(self) -> Vec<ServiceRole> {
        let level: u64 = Self::ALL
            .into_iter()
            .filter(|role| role.weight() >= self.weight())
            .map(ServiceRole::weight)
            .sum();
        decompose(level)
    }

    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceRole::None => "NONE",
            ServiceRole::Guest => "GUEST",
            ServiceRole::DataScientist => "DATA_SCIENTIST",
            ServiceRole::DataOwner => "DATA_OWNER",
            ServiceRole::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for ServiceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceRole {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| RoleError::UnknownRole(s.to_string()))
    }
}

/// Roles with at least guest-level permission
pub const GUEST_ROLE_LEVEL: &[ServiceRole] = &[
    ServiceRole::Admin,
    ServiceRole::DataOwner,
    ServiceRole::DataScientist,
    ServiceRole::Guest,
];

/// Roles with at least data-scientist-level permission
pub const DATA_SCIENTIST_ROLE_LEVEL: &[ServiceRole] = &[
    ServiceRole::Admin,
    ServiceRole::DataOwner,
    ServiceRole::DataScientist,
];

/// Roles with at least data-owner-level permission
pub const DATA_OWNER_ROLE_LEVEL: &[ServiceRole] = &[ServiceRole::Admin, ServiceRole::DataOwner];

/// Roles with admin-level permission
pub const ADMIN_ROLE_LEVEL: &[ServiceRole] = &[ServiceRole::Admin];

/// Sum the weights of the given roles into a level.
///
/// Callers pass distinct roles; repeating a role produces a level that no
/// longer decomposes back into its inputs.
pub fn sum_weights(roles: &[ServiceRole]) -> u64 {
    roles.iter().map(|role| role.weight()).sum()
}

/// Decompose a level into the roles whose weights sum to it.
///
/// Walks the non-zero weights from heaviest to lightest. A weight that fits
/// into the remaining level at least once belongs to the decomposition, and
/// the remainder modulo that weight carries on to the next one. For levels
/// built from distinct weights the quotient is always 0 or 1.
///
/// Levels that are not sums of distinct weights are not rejected; they
/// decompose to some set of roles that does not sum back to the input.
pub fn decompose(level: u64) -> Vec<ServiceRole> {
    let mut remaining = level;
    let mut roles = Vec::new();

    for role in ServiceRole::roles_descending() {
        let weight = role.weight();
        if weight == 0 {
            continue;
        }
        if remaining / weight >= 1 {
            roles.push(role);
            remaining %= weight;
        }
    }

    roles
}

/// Union of the capabilities granted by every role in the level
pub fn capabilities_for_level(level: u64) -> ServiceRoleCapability {
    decompose(level)
        .into_iter()
        .fold(ServiceRoleCapability::empty(), |acc, role| acc | role.grants())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_match_table() {
        let weights: Vec<u64> = ServiceRole::ALL.iter().map(|r| r.weight()).collect();
        assert_eq!(weights, vec![0, 1, 2, 32, 128]);
    }

    #[test]
    fn test_weights_superincreasing() {
        let mut running = 0;
        for role in ServiceRole::ALL.iter().filter(|r| r.weight() > 0) {
            assert!(role.weight() > running, "{} breaks the sequence", role);
            running += role.weight();
        }
    }

    #[test]
    fn test_roles_descending() {
        assert_eq!(
            ServiceRole::roles_descending(),
            vec![
                ServiceRole::Admin,
                ServiceRole::DataOwner,
                ServiceRole::DataScientist,
                ServiceRole::Guest,
                ServiceRole::None,
            ]
        );
    }

    #[test]
    fn test_decompose_zero_is_empty() {
        assert!(decompose(0).is_empty());
    }

    #[test]
    fn test_none_contributes_nothing() {
        let level = sum_weights(&[ServiceRole::None, ServiceRole::DataOwner]);
        assert_eq!(decompose(level), vec![ServiceRole::DataOwner]);
    }

    #[test]
    fn test_level_tables_match_decomposition() {
        assert_eq!(ServiceRole::Guest.at_or_above(), GUEST_ROLE_LEVEL);
        assert_eq!(ServiceRole::DataScientist.at_or_above(), DATA_SCIENTIST_ROLE_LEVEL);
        assert_eq!(ServiceRole::DataOwner.at_or_above(), DATA_OWNER_ROLE_LEVEL);
        assert_eq!(ServiceRole::Admin.at_or_above(), ADMIN_ROLE_LEVEL);
    }

    #[test]
    fn test_parse_role_names() {
        assert_eq!("admin".parse::<ServiceRole>(), Ok(ServiceRole::Admin));
        assert_eq!("data-owner".parse::<ServiceRole>(), Ok(ServiceRole::DataOwner));
        assert_eq!("DATA_SCIENTIST".parse::<ServiceRole>(), Ok(ServiceRole::DataScientist));
        assert!("superuser".parse::<ServiceRole>().is_err());
    }

    #[test]
    fn test_guest_capabilities() {
        let caps = capabilities_for_level(ServiceRole::Guest.weight());
        assert_eq!(caps, ServiceRoleCapability::CAN_MAKE_DATA_REQUESTS);
    }

    #[test]
    fn test_admin_level_grants_everything() {
        assert_eq!(capabilities_for_level(128), ServiceRoleCapability::all());
    }
}
