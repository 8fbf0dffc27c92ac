//! Ownership labels.
//!
//! Servers and volumes carry no owner attribute, so cluster membership is
//! expressed through labels. Values derived from names are hex encoded.

use ionos_mcm_cloud::Label;

pub const CLUSTER_KEY: &str = "cluster";
pub const ROLE_KEY: &str = "role";
pub const REGION_KEY: &str = "region";
pub const ZONE_KEY: &str = "zone";

/// Role of every machine created by this provider.
pub const NODE_ROLE: &str = "node";

/// Labels applied to a new server, in application order.
pub fn server_labels(cluster: &str, region: &str, zone: &str) -> [(&'static str, String); 4] {
    [
        (CLUSTER_KEY, hex::encode(cluster)),
        (ROLE_KEY, NODE_ROLE.to_string()),
        (REGION_KEY, hex::encode(region)),
        (ZONE_KEY, hex::encode(zone)),
    ]
}

/// Labels applied to a new boot volume.
pub fn volume_labels(cluster: &str) -> [(&'static str, String); 1] {
    [(CLUSTER_KEY, hex::encode(cluster))]
}

/// Matches servers against the labels of one cluster and zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipSelector {
    cluster: String,
    zone: String,
}

impl OwnershipSelector {
    pub fn new(cluster: &str, zone: &str) -> Self {
        Self {
            cluster: hex::encode(cluster),
            zone: hex::encode(zone),
        }
    }

    /// Number of predicates (cluster, role, zone) satisfied by `labels`.
    pub fn matches(&self, labels: &[Label]) -> usize {
        let has = |key: &str, value: &str| {
            labels
                .iter()
                .any(|label| label.key() == key && label.value() == value)
        };

        [
            has(CLUSTER_KEY, &self.cluster),
            has(ROLE_KEY, NODE_ROLE),
            has(ZONE_KEY, &self.zone),
        ]
        .into_iter()
        .filter(|matched| *matched)
        .count()
    }

    /// Whether `labels` satisfy every predicate.
    pub fn owns(&self, labels: &[Label]) -> bool {
        self.matches(labels) == 3
    }
}
