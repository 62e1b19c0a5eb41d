//! Storage key constants.

/// Keys used by the client.
pub struct StorageKeys;

impl StorageKeys {
    /// Access token (fast storage)
    pub const ACCESS_TOKEN: &'static str = "access-token";

    /// Refresh token (secure storage)
    pub const REFRESH_TOKEN: &'static str = "us.hearye.voting.refresh";

    /// Identity provider access token (secure storage)
    pub const IDENTITY_ACCESS_TOKEN: &'static str = "us.hearye.voting.velnota_access";

    /// Identity provider refresh token (secure storage)
    pub const IDENTITY_REFRESH_TOKEN: &'static str = "us.hearye.voting.velnota_refresh";

    /// Last confirmed district selection (fast storage, JSON)
    pub const DISTRICT: &'static str = "district";

    /// Whether onboarding was completed (fast storage, boolean)
    pub const ONBOARDED: &'static str = "onboarded-user-for-app";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_keys_unique() {
        let keys = [
            StorageKeys::ACCESS_TOKEN,
            StorageKeys::REFRESH_TOKEN,
            StorageKeys::IDENTITY_ACCESS_TOKEN,
            StorageKeys::IDENTITY_REFRESH_TOKEN,
            StorageKeys::DISTRICT,
            StorageKeys::ONBOARDED,
        ];
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len(), "Storage keys must be unique");
    }

    #[test]
    fn test_secure_keys_namespaced_by_service() {
        for key in [
            StorageKeys::REFRESH_TOKEN,
            StorageKeys::IDENTITY_ACCESS_TOKEN,
            StorageKeys::IDENTITY_REFRESH_TOKEN,
        ] {
            assert!(key.starts_with(crate::SERVICE_NAME));
        }
    }
}
