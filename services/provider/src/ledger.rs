//! Resources created by an in-flight creation.

/// Records what a single `create_machine` call has created so far.
///
/// IDs are recorded as soon as the API accepts a create, before the
/// resource has settled. The ledger drives rollback and is dropped with the
/// request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProvisioningLedger {
    volume_id: Option<String>,
    server_id: Option<String>,
}

impl ProvisioningLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_volume(&mut self, volume_id: impl Into<String>) {
        self.volume_id = Some(volume_id.into());
    }

    pub fn record_server(&mut self, server_id: impl Into<String>) {
        self.server_id = Some(server_id.into());
    }

    pub fn volume_id(&self) -> Option<&str> {
        self.volume_id.as_deref()
    }

    pub fn server_id(&self) -> Option<&str> {
        self.server_id.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.volume_id.is_none() && self.server_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records() {
        let mut ledger = ProvisioningLedger::new();
        assert!(ledger.is_empty());

        ledger.record_volume("vol-1");
        assert_eq!(ledger.volume_id(), Some("vol-1"));
        assert_eq!(ledger.server_id(), None);

        ledger.record_server("srv-1");
        assert_eq!(ledger.server_id(), Some("srv-1"));
        assert!(!ledger.is_empty());
    }
}
