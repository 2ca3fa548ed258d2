//! Shared fixtures for integration tests

#![allow(dead_code)]

use stashdb::store::{Document, FieldType, FieldValue, PartitionKey, Uid};

pub const EMAIL: PartitionKey = PartitionKey::new("email", FieldType::String);
pub const TEAM: PartitionKey = PartitionKey::new("team", FieldType::String);
pub const ACTIVE: PartitionKey = PartitionKey::new("active", FieldType::Bool);

/// Test account with a unique email and searchable team/active flags
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: Uid,
    pub email: String,
    pub team: Option<String>,
    pub active: bool,
}

impl Account {
    pub fn new(email: &str, team: Option<&str>) -> Self {
        Self {
            id: Uid::new(),
            email: email.to_string(),
            team: team.map(str::to_string),
            active: true,
        }
    }
}

impl Document for Account {
    const KIND: &'static str = "Account";

    fn id(&self) -> Uid {
        self.id
    }

    fn unique_keys() -> &'static [PartitionKey] {
        &[EMAIL]
    }

    fn searchable_keys() -> &'static [PartitionKey] {
        &[TEAM, ACTIVE]
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "email" => Some(self.email.as_str().into()),
            "team" => self.team.as_deref().map(FieldValue::from),
            "active" => Some(self.active.into()),
            _ => None,
        }
    }
}
