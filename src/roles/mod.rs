//! # Service Roles
//!
//! Authorization tiers encoded as additive role levels.
//!
//! ## Encoding
//!
//! Every role carries a weight. The non-zero weights form a superincreasing
//! sequence (each weight exceeds the sum of all smaller ones), so a level
//! built by adding distinct role weights decomposes back into exactly the
//! roles that produced it.
//!
//! ## Invariants
//! - `decompose(sum_weights(S)) == S` for every set `S` of distinct non-zero roles
//! - Decomposition output is ordered by weight, heaviest first
//! - Role weights and capability bits are never mixed arithmetically

mod capability;
mod role;

pub use capability::ServiceRoleCapability;
pub use role::{
    capabilities_for_level, decompose, sum_weights, RoleError, ServiceRole, ADMIN_ROLE_LEVEL,
    DATA_OWNER_ROLE_LEVEL, DATA_SCIENTIST_ROLE_LEVEL, GUEST_ROLE_LEVEL,
};
