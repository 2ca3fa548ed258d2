//! Fine-grained capability flags granted by roles

use bitflags::bitflags;

bitflags! {
    /// Independent permission bits.
    ///
    /// These are plain power-of-two flags and share nothing with role weights.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ServiceRoleCapability: u32 {
        const CAN_MAKE_DATA_REQUESTS = 1;
        const CAN_TRIAGE_DATA_REQUESTS = 2;
        const CAN_MANAGE_PRIVACY_BUDGET = 4;
        const CAN_CREATE_USERS = 8;
        const CAN_MANAGE_USERS = 16;
        const CAN_EDIT_ROLES = 32;
        const CAN_MANAGE_INFRASTRUCTURE = 64;
        const CAN_UPLOAD_DATA = 128;
        const CAN_UPLOAD_LEGAL_DOCUMENT = 256;
        const CAN_EDIT_DOMAIN_SETTINGS = 512;
    }
}

impl ServiceRoleCapability {
    /// Names of the set flags, lowest bit first
    pub fn names(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}
