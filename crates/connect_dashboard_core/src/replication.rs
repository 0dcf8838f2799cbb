//! Replica awareness for described instances.
//!
//! Connect global resiliency pairs exactly two regions. Describing an instance
//! also looks the same instance id up in the paired region and reports what
//! it found. A lookup that fails for any reason other than not-found is
//! reported as undetermined, never as "not replicated", so a regional outage
//! cannot hide an existing replica.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::client::ConnectApi;
use crate::contract::{Instance, InstanceDetails};
use crate::error::RemoteError;

/// Regions supported for instance replication.
pub const PAIRED_REGIONS: [(&str, &str); 2] = [
    ("us-east-1", "us-west-2"),
    ("us-west-2", "us-east-1"),
];

pub fn paired_region_for(region: &str) -> Option<&'static str> {
    PAIRED_REGIONS
        .iter()
        .find(|(from, _)| *from == region)
        .map(|(_, to)| *to)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionPairing {
    current_region: Option<String>,
    paired_region: Option<String>,
}

impl RegionPairing {
    pub fn new(current_region: Option<String>, paired_region: Option<String>) -> Self {
        Self {
            current_region,
            paired_region,
        }
    }

    /// Resolves the paired region from [`PAIRED_REGIONS`] unless an explicit
    /// override is configured.
    pub fn resolve(current_region: Option<String>, paired_override: Option<String>) -> Self {
        let paired_region = paired_override.or_else(|| {
            current_region
                .as_deref()
                .and_then(paired_region_for)
                .map(str::to_string)
        });
        Self::new(current_region, paired_region)
    }

    pub fn current_region(&self) -> Option<&str> {
        self.current_region.as_deref()
    }

    pub fn paired_region(&self) -> Option<&str> {
        self.paired_region.as_deref()
    }

    /// The region replicas live in, if replication is possible from here.
    pub fn replica_region(&self) -> Option<&str> {
        match (self.current_region(), self.paired_region()) {
            (_, None) => None,
            (Some(current), Some(paired)) if current == paired => None,
            (_, Some(paired)) => Some(paired),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicationStatus {
    Replicated {
        replica_alias: Option<String>,
        primary: bool,
    },
    NotReplicated,
    Undetermined,
    InvalidRegion,
}

impl ReplicationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Replicated { .. } => "true",
            Self::NotReplicated => "false",
            Self::Undetermined => "unable to determine",
            Self::InvalidRegion => "invalid region for replication",
        }
    }
}

/// The earlier-created instance of a pair is the primary. Equal or missing
/// timestamps leave the local instance non-primary.
pub fn is_primary_replica(
    local_created: Option<DateTime<Utc>>,
    replica_created: Option<DateTime<Utc>>,
) -> bool {
    matches!((local_created, replica_created), (Some(local), Some(replica)) if local < replica)
}

pub async fn resolve_replication(
    client: &dyn ConnectApi,
    pairing: &RegionPairing,
    instance_id: &str,
    instance: &Instance,
) -> ReplicationStatus {
    let Some(replica_region) = pairing.replica_region() else {
        return ReplicationStatus::InvalidRegion;
    };

    match client
        .describe_instance_in_region(replica_region, instance_id)
        .await
    {
        Ok(replica) => ReplicationStatus::Replicated {
            primary: is_primary_replica(instance.created_time, replica.created_time),
            replica_alias: replica.instance_alias,
        },
        Err(error) if error.is_not_found() => {
            info!(
                component = "replication",
                instance_id,
                replica_region,
                "replica_not_found"
            );
            ReplicationStatus::NotReplicated
        }
        Err(error) => {
            warn!(
                component = "replication",
                instance_id,
                replica_region,
                status_code = error.http_status(),
                error = %error,
                "replica_lookup_failed"
            );
            ReplicationStatus::Undetermined
        }
    }
}

pub fn decorate(instance: Instance, status: ReplicationStatus) -> InstanceDetails {
    let replicated = status.label().to_string();
    let (replica_alias, primary_replica) = match status {
        ReplicationStatus::Replicated {
            replica_alias,
            primary,
        } => (replica_alias, Some(primary)),
        _ => (None, None),
    };

    InstanceDetails {
        instance,
        replicated,
        replica_alias,
        primary_replica,
    }
}

/// Describes an instance in the current region and decorates it with its
/// replication state. Only the primary describe can fail the call.
pub async fn describe_with_replication(
    client: &dyn ConnectApi,
    pairing: &RegionPairing,
    instance_id: &str,
) -> Result<InstanceDetails, RemoteError> {
    let instance = client.describe_instance(instance_id).await?;
    let status = resolve_replication(client, pairing, instance_id, &instance).await;
    Ok(decorate(instance, status))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::testing::RecordingConnect;

    fn at(seconds: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(seconds, 0).single()
    }

    fn instance(alias: &str, created: Option<DateTime<Utc>>) -> Instance {
        Instance {
            id: Some("inst-1".to_string()),
            instance_alias: Some(alias.to_string()),
            created_time: created,
            ..Instance::default()
        }
    }

    fn east_pairing() -> RegionPairing {
        RegionPairing::resolve(Some("us-east-1".to_string()), None)
    }

    #[test]
    fn pairing_uses_static_table() {
        assert_eq!(east_pairing().replica_region(), Some("us-west-2"));
        assert_eq!(
            RegionPairing::resolve(Some("us-west-2".to_string()), None).replica_region(),
            Some("us-east-1")
        );
        assert_eq!(
            RegionPairing::resolve(Some("eu-west-2".to_string()), None).replica_region(),
            None
        );
    }

    #[test]
    fn pairing_with_same_region_is_invalid() {
        let pairing = RegionPairing::resolve(
            Some("us-east-1".to_string()),
            Some("us-east-1".to_string()),
        );
        assert_eq!(pairing.replica_region(), None);
    }

    #[test]
    fn equal_timestamps_are_not_primary() {
        assert!(is_primary_replica(at(100), at(200)));
        assert!(!is_primary_replica(at(200), at(100)));
        assert!(!is_primary_replica(at(100), at(100)));
        assert!(!is_primary_replica(None, at(100)));
    }

    #[tokio::test]
    async fn found_replica_reports_alias_and_primary() {
        let client = RecordingConnect::new()
            .with_instance(instance("east", at(100)))
            .with_regional_instance("us-west-2", instance("west", at(200)));

        let details = describe_with_replication(&client, &east_pairing(), "inst-1")
            .await
            .expect("describe should succeed");

        assert_eq!(details.replicated, "true");
        assert_eq!(details.replica_alias.as_deref(), Some("west"));
        assert_eq!(details.primary_replica, Some(true));
        let regional = client.calls_for("describe_instance_in_region");
        assert_eq!(
            regional[0].arguments,
            vec!["us-west-2".to_string(), "inst-1".to_string()]
        );
    }

    #[tokio::test]
    async fn not_found_replica_is_reported_false() {
        let client = RecordingConnect::new().with_instance(instance("east", at(100)));

        let details = describe_with_replication(&client, &east_pairing(), "inst-1")
            .await
            .expect("describe should succeed");

        assert_eq!(details.replicated, "false");
        assert_eq!(details.replica_alias, None);
        assert_eq!(details.primary_replica, None);
    }

    #[tokio::test]
    async fn other_lookup_errors_are_undetermined() {
        let client = RecordingConnect::new()
            .with_instance(instance("east", at(100)))
            .fail_region("us-west-2", RemoteError::with_status(503, "Service unavailable"));

        let details = describe_with_replication(&client, &east_pairing(), "inst-1")
            .await
            .expect("paired-region failures must not fail the describe");

        assert_eq!(details.replicated, "unable to determine");
    }

    #[tokio::test]
    async fn unpaired_region_skips_lookup() {
        let client = RecordingConnect::new().with_instance(instance("east", at(100)));
        let pairing = RegionPairing::resolve(Some("ap-southeast-2".to_string()), None);

        let details = describe_with_replication(&client, &pairing, "inst-1")
            .await
            .expect("describe should succeed");

        assert_eq!(details.replicated, "invalid region for replication");
        assert!(client.calls_for("describe_instance_in_region").is_empty());
    }

    #[tokio::test]
    async fn primary_describe_failure_propagates() {
        let client = RecordingConnect::new();

        let error = describe_with_replication(&client, &east_pairing(), "missing")
            .await
            .expect_err("unknown instance should fail");

        assert!(error.is_not_found());
        assert!(client.calls_for("describe_instance_in_region").is_empty());
    }
}
