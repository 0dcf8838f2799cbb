//! In-memory [`ConnectApi`] double that records every call in order.
//!
//! Unknown instances and groups answer with a not-found error, phone number
//! updates succeed unless a failure was registered for that id, and any
//! operation can be forced to fail with [`RecordingConnect::fail_operation`].

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::ConnectApi;
use crate::contract::{
    CreatedTrafficDistributionGroup, Instance, InstanceSummary, ListTrafficDistributionGroupsQuery,
    NewTrafficDistributionGroup, PhoneNumberAssociation, PhoneNumberPage, PhoneNumberQuery,
    ReplicatedInstance, TrafficDistribution, TrafficDistributionGroup,
    TrafficDistributionGroupPage, TrafficDistributionGroupSummary, TrafficDistributionUpdate,
};
use crate::error::RemoteError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub operation: &'static str,
    pub arguments: Vec<String>,
}

#[derive(Default)]
pub struct RecordingConnect {
    calls: Mutex<Vec<RecordedCall>>,
    operation_failures: HashMap<&'static str, RemoteError>,
    phone_number_failures: HashMap<String, RemoteError>,
    region_failures: HashMap<String, RemoteError>,
    instance_summaries: Vec<InstanceSummary>,
    instances: HashMap<String, Instance>,
    regional_instances: HashMap<(String, String), Instance>,
    group_summaries: Vec<TrafficDistributionGroupSummary>,
    groups: HashMap<String, TrafficDistributionGroup>,
    distributions: HashMap<String, TrafficDistribution>,
    phone_numbers: PhoneNumberPage,
}

impl RecordingConnect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance_summaries(mut self, summaries: Vec<InstanceSummary>) -> Self {
        self.instance_summaries = summaries;
        self
    }

    /// Registers an instance in the current region, keyed by its id.
    pub fn with_instance(mut self, instance: Instance) -> Self {
        let id = instance.id.clone().unwrap_or_default();
        self.instances.insert(id, instance);
        self
    }

    pub fn with_regional_instance(mut self, region: &str, instance: Instance) -> Self {
        let id = instance.id.clone().unwrap_or_default();
        self.regional_instances
            .insert((region.to_string(), id), instance);
        self
    }

    pub fn with_group_summaries(mut self, summaries: Vec<TrafficDistributionGroupSummary>) -> Self {
        self.group_summaries = summaries;
        self
    }

    pub fn with_group(mut self, group: TrafficDistributionGroup) -> Self {
        let id = group.id.clone().unwrap_or_default();
        self.groups.insert(id, group);
        self
    }

    pub fn with_distribution(mut self, group_id: &str, distribution: TrafficDistribution) -> Self {
        self.distributions
            .insert(group_id.to_string(), distribution);
        self
    }

    pub fn with_phone_numbers(mut self, page: PhoneNumberPage) -> Self {
        self.phone_numbers = page;
        self
    }

    pub fn fail_operation(mut self, operation: &'static str, error: RemoteError) -> Self {
        self.operation_failures.insert(operation, error);
        self
    }

    pub fn fail_phone_number(mut self, phone_number_id: &str, error: RemoteError) -> Self {
        self.phone_number_failures
            .insert(phone_number_id.to_string(), error);
        self
    }

    /// Every describe routed to `region` fails with `error`.
    pub fn fail_region(mut self, region: &str, error: RemoteError) -> Self {
        self.region_failures.insert(region.to_string(), error);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("poisoned mutex").clone()
    }

    pub fn calls_for(&self, operation: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.operation == operation)
            .collect()
    }

    fn record(&self, operation: &'static str, arguments: &[&str]) -> Result<(), RemoteError> {
        self.calls
            .lock()
            .expect("poisoned mutex")
            .push(RecordedCall {
                operation,
                arguments: arguments.iter().map(|value| value.to_string()).collect(),
            });

        match self.operation_failures.get(operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn not_found(kind: &str, id: &str) -> RemoteError {
    RemoteError::not_found(format!("{kind} not found: {id}"))
}

#[async_trait]
impl ConnectApi for RecordingConnect {
    async fn list_instances(&self) -> Result<Vec<InstanceSummary>, RemoteError> {
        self.record("list_instances", &[])?;
        Ok(self.instance_summaries.clone())
    }

    async fn describe_instance(&self, instance_id: &str) -> Result<Instance, RemoteError> {
        self.record("describe_instance", &[instance_id])?;
        self.instances
            .get(instance_id)
            .cloned()
            .ok_or_else(|| not_found("Instance", instance_id))
    }

    async fn describe_instance_in_region(
        &self,
        region: &str,
        instance_id: &str,
    ) -> Result<Instance, RemoteError> {
        self.record("describe_instance_in_region", &[region, instance_id])?;
        if let Some(error) = self.region_failures.get(region) {
            return Err(error.clone());
        }
        self.regional_instances
            .get(&(region.to_string(), instance_id.to_string()))
            .cloned()
            .ok_or_else(|| not_found("Instance", instance_id))
    }

    async fn replicate_instance(
        &self,
        instance_id: &str,
        replica_region: &str,
        replica_alias: &str,
    ) -> Result<ReplicatedInstance, RemoteError> {
        self.record(
            "replicate_instance",
            &[instance_id, replica_region, replica_alias],
        )?;
        Ok(ReplicatedInstance {
            id: Some(instance_id.to_string()),
            arn: Some(format!(
                "arn:aws:connect:{replica_region}:111122223333:instance/{instance_id}"
            )),
        })
    }

    async fn list_traffic_distribution_groups(
        &self,
        query: &ListTrafficDistributionGroupsQuery,
    ) -> Result<TrafficDistributionGroupPage, RemoteError> {
        let max_results = query.max_results.to_string();
        self.record(
            "list_traffic_distribution_groups",
            &[
                query.instance_id.as_deref().unwrap_or_default(),
                max_results.as_str(),
                query.next_token.as_deref().unwrap_or_default(),
            ],
        )?;
        Ok(TrafficDistributionGroupPage {
            summaries: self.group_summaries.clone(),
            next_token: None,
        })
    }

    async fn create_traffic_distribution_group(
        &self,
        group: &NewTrafficDistributionGroup,
    ) -> Result<CreatedTrafficDistributionGroup, RemoteError> {
        self.record(
            "create_traffic_distribution_group",
            &[
                group.name.as_str(),
                group.description.as_deref().unwrap_or_default(),
                group.instance_id.as_str(),
            ],
        )?;
        Ok(CreatedTrafficDistributionGroup {
            id: Some(format!("tdg-{}", group.name)),
            arn: Some(format!(
                "arn:aws:connect:us-east-1:111122223333:traffic-distribution-group/tdg-{}",
                group.name
            )),
        })
    }

    async fn describe_traffic_distribution_group(
        &self,
        traffic_distribution_group_id: &str,
    ) -> Result<TrafficDistributionGroup, RemoteError> {
        self.record(
            "describe_traffic_distribution_group",
            &[traffic_distribution_group_id],
        )?;
        self.groups
            .get(traffic_distribution_group_id)
            .cloned()
            .ok_or_else(|| not_found("TrafficDistributionGroup", traffic_distribution_group_id))
    }

    async fn get_traffic_distribution(
        &self,
        traffic_distribution_group_id: &str,
    ) -> Result<TrafficDistribution, RemoteError> {
        self.record("get_traffic_distribution", &[traffic_distribution_group_id])?;
        self.distributions
            .get(traffic_distribution_group_id)
            .cloned()
            .ok_or_else(|| not_found("TrafficDistribution", traffic_distribution_group_id))
    }

    async fn update_traffic_distribution(
        &self,
        update: &TrafficDistributionUpdate,
    ) -> Result<(), RemoteError> {
        let percentages = update
            .telephony_config
            .distributions
            .iter()
            .map(|distribution| format!("{}={}", distribution.region, distribution.percentage))
            .collect::<Vec<_>>()
            .join(",");
        self.record(
            "update_traffic_distribution",
            &[update.id.as_str(), percentages.as_str()],
        )
    }

    async fn delete_traffic_distribution_group(
        &self,
        traffic_distribution_group_id: &str,
    ) -> Result<(), RemoteError> {
        self.record(
            "delete_traffic_distribution_group",
            &[traffic_distribution_group_id],
        )
    }

    async fn list_phone_numbers(
        &self,
        query: &PhoneNumberQuery,
    ) -> Result<PhoneNumberPage, RemoteError> {
        self.record(
            "list_phone_numbers",
            &[
                query.target_arn.as_deref().unwrap_or_default(),
                query.next_token.as_deref().unwrap_or_default(),
            ],
        )?;
        Ok(self.phone_numbers.clone())
    }

    async fn update_phone_number(
        &self,
        target_arn: &str,
        phone_number_id: &str,
    ) -> Result<PhoneNumberAssociation, RemoteError> {
        self.record("update_phone_number", &[target_arn, phone_number_id])?;
        if let Some(error) = self.phone_number_failures.get(phone_number_id) {
            return Err(error.clone());
        }
        Ok(PhoneNumberAssociation {
            phone_number_id: Some(phone_number_id.to_string()),
            phone_number_arn: Some(format!(
                "arn:aws:connect:us-east-1:111122223333:phone-number/{phone_number_id}"
            )),
        })
    }
}
