use async_trait::async_trait;

use crate::contract::{
    CreatedTrafficDistributionGroup, Instance, InstanceSummary, ListTrafficDistributionGroupsQuery,
    NewTrafficDistributionGroup, PhoneNumberAssociation, PhoneNumberPage, PhoneNumberQuery,
    ReplicatedInstance, TrafficDistribution, TrafficDistributionGroup,
    TrafficDistributionGroupPage, TrafficDistributionUpdate,
};
use crate::error::RemoteError;

/// Capability-typed access to the Connect control plane.
///
/// Every method is one independent round trip (list operations may page).
/// Implementations report failures as [`RemoteError`] values and own any
/// transient-error retry policy; callers never retry.
#[async_trait]
pub trait ConnectApi: Send + Sync {
    async fn list_instances(&self) -> Result<Vec<InstanceSummary>, RemoteError>;

    async fn describe_instance(&self, instance_id: &str) -> Result<Instance, RemoteError>;

    /// Describes an instance through a client bound to `region` instead of
    /// the current one.
    async fn describe_instance_in_region(
        &self,
        region: &str,
        instance_id: &str,
    ) -> Result<Instance, RemoteError>;

    async fn replicate_instance(
        &self,
        instance_id: &str,
        replica_region: &str,
        replica_alias: &str,
    ) -> Result<ReplicatedInstance, RemoteError>;

    async fn list_traffic_distribution_groups(
        &self,
        query: &ListTrafficDistributionGroupsQuery,
    ) -> Result<TrafficDistributionGroupPage, RemoteError>;

    async fn create_traffic_distribution_group(
        &self,
        group: &NewTrafficDistributionGroup,
    ) -> Result<CreatedTrafficDistributionGroup, RemoteError>;

    async fn describe_traffic_distribution_group(
        &self,
        traffic_distribution_group_id: &str,
    ) -> Result<TrafficDistributionGroup, RemoteError>;

    async fn get_traffic_distribution(
        &self,
        traffic_distribution_group_id: &str,
    ) -> Result<TrafficDistribution, RemoteError>;

    async fn update_traffic_distribution(
        &self,
        update: &TrafficDistributionUpdate,
    ) -> Result<(), RemoteError>;

    async fn delete_traffic_distribution_group(
        &self,
        traffic_distribution_group_id: &str,
    ) -> Result<(), RemoteError>;

    async fn list_phone_numbers(
        &self,
        query: &PhoneNumberQuery,
    ) -> Result<PhoneNumberPage, RemoteError>;

    async fn update_phone_number(
        &self,
        target_arn: &str,
        phone_number_id: &str,
    ) -> Result<PhoneNumberAssociation, RemoteError>;
}
