//! [`ConnectApi`] backed by the AWS SDK.
//!
//! Retries and backoff for transient failures are configured on the shared
//! [`SdkConfig`]; every SDK error is mapped to a [`RemoteError`] carrying the
//! service error code and HTTP status when a response was received.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_connect::config::retry::RetryConfig;
use aws_sdk_connect::config::Region;
use aws_sdk_connect::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_connect::primitives::DateTime as SmithyDateTime;
use aws_sdk_connect::types;
use chrono::{DateTime, Utc};
use connect_dashboard_core::client::ConnectApi;
use connect_dashboard_core::contract::{
    CreatedTrafficDistributionGroup, Distribution, Instance, InstanceSummary,
    ListTrafficDistributionGroupsQuery, NewTrafficDistributionGroup, PhoneNumberAssociation,
    PhoneNumberPage, PhoneNumberQuery, PhoneNumberSummary, ReplicatedInstance, TelephonyConfig,
    TrafficDistribution, TrafficDistributionGroup, TrafficDistributionGroupPage,
    TrafficDistributionGroupSummary, TrafficDistributionUpdate,
};
use connect_dashboard_core::error::RemoteError;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct AwsConnectClient {
    client: aws_sdk_connect::Client,
    sdk_config: SdkConfig,
}

impl AwsConnectClient {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_connect::Client::new(sdk_config),
            sdk_config: sdk_config.clone(),
        }
    }

    fn client_for_region(&self, region: &str) -> aws_sdk_connect::Client {
        aws_sdk_connect::Client::from_conf(regional_config(&self.sdk_config, region))
    }
}

/// Same credentials bound to `region`, with default standard retries rather
/// than the home client's batch backoff.
fn regional_config(sdk_config: &SdkConfig, region: &str) -> aws_sdk_connect::Config {
    aws_sdk_connect::config::Builder::from(sdk_config)
        .region(Region::new(region.to_string()))
        .retry_config(RetryConfig::standard())
        .build()
}

async fn describe_instance_with(
    client: &aws_sdk_connect::Client,
    instance_id: &str,
) -> Result<Instance, RemoteError> {
    let output = client
        .describe_instance()
        .instance_id(instance_id)
        .send()
        .await
        .map_err(|error| remote_error("describe_instance", error))?;
    output
        .instance()
        .map(instance_from_sdk)
        .ok_or_else(|| RemoteError::not_found(format!("Instance not found: {instance_id}")))
}

#[async_trait]
impl ConnectApi for AwsConnectClient {
    async fn list_instances(&self) -> Result<Vec<InstanceSummary>, RemoteError> {
        let mut instances = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .client
                .list_instances()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|error| remote_error("list_instances", error))?;
            instances.extend(
                output
                    .instance_summary_list()
                    .iter()
                    .map(instance_summary_from_sdk),
            );
            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }
        debug!(
            component = "connect_client",
            count = instances.len(),
            "instances_listed"
        );
        Ok(instances)
    }

    async fn describe_instance(&self, instance_id: &str) -> Result<Instance, RemoteError> {
        describe_instance_with(&self.client, instance_id).await
    }

    async fn describe_instance_in_region(
        &self,
        region: &str,
        instance_id: &str,
    ) -> Result<Instance, RemoteError> {
        describe_instance_with(&self.client_for_region(region), instance_id).await
    }

    async fn replicate_instance(
        &self,
        instance_id: &str,
        replica_region: &str,
        replica_alias: &str,
    ) -> Result<ReplicatedInstance, RemoteError> {
        let output = self
            .client
            .replicate_instance()
            .instance_id(instance_id)
            .replica_region(replica_region)
            .replica_alias(replica_alias)
            .send()
            .await
            .map_err(|error| remote_error("replicate_instance", error))?;
        Ok(ReplicatedInstance {
            id: output.id().map(str::to_string),
            arn: output.arn().map(str::to_string),
        })
    }

    async fn list_traffic_distribution_groups(
        &self,
        query: &ListTrafficDistributionGroupsQuery,
    ) -> Result<TrafficDistributionGroupPage, RemoteError> {
        let output = self
            .client
            .list_traffic_distribution_groups()
            .max_results(query.max_results)
            .set_instance_id(query.instance_id.clone())
            .set_next_token(query.next_token.clone())
            .send()
            .await
            .map_err(|error| remote_error("list_traffic_distribution_groups", error))?;
        Ok(TrafficDistributionGroupPage {
            summaries: output
                .traffic_distribution_group_summary_list()
                .iter()
                .map(group_summary_from_sdk)
                .collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn create_traffic_distribution_group(
        &self,
        group: &NewTrafficDistributionGroup,
    ) -> Result<CreatedTrafficDistributionGroup, RemoteError> {
        let tags: HashMap<String, String> = group.tags.clone().into_iter().collect();
        let output = self
            .client
            .create_traffic_distribution_group()
            .name(&group.name)
            .set_description(group.description.clone())
            .instance_id(&group.instance_id)
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(|error| remote_error("create_traffic_distribution_group", error))?;
        Ok(CreatedTrafficDistributionGroup {
            id: output.id().map(str::to_string),
            arn: output.arn().map(str::to_string),
        })
    }

    async fn describe_traffic_distribution_group(
        &self,
        traffic_distribution_group_id: &str,
    ) -> Result<TrafficDistributionGroup, RemoteError> {
        let output = self
            .client
            .describe_traffic_distribution_group()
            .traffic_distribution_group_id(traffic_distribution_group_id)
            .send()
            .await
            .map_err(|error| remote_error("describe_traffic_distribution_group", error))?;
        output
            .traffic_distribution_group()
            .map(group_from_sdk)
            .ok_or_else(|| {
                RemoteError::not_found(format!(
                    "TrafficDistributionGroup not found: {traffic_distribution_group_id}"
                ))
            })
    }

    async fn get_traffic_distribution(
        &self,
        traffic_distribution_group_id: &str,
    ) -> Result<TrafficDistribution, RemoteError> {
        let output = self
            .client
            .get_traffic_distribution()
            .id(traffic_distribution_group_id)
            .send()
            .await
            .map_err(|error| remote_error("get_traffic_distribution", error))?;
        Ok(TrafficDistribution {
            id: output.id().map(str::to_string),
            arn: output.arn().map(str::to_string),
            telephony_config: output.telephony_config().map(telephony_config_from_sdk),
        })
    }

    async fn update_traffic_distribution(
        &self,
        update: &TrafficDistributionUpdate,
    ) -> Result<(), RemoteError> {
        let telephony_config = telephony_config_to_sdk(&update.telephony_config)?;
        self.client
            .update_traffic_distribution()
            .id(&update.id)
            .telephony_config(telephony_config)
            .send()
            .await
            .map_err(|error| remote_error("update_traffic_distribution", error))?;
        Ok(())
    }

    async fn delete_traffic_distribution_group(
        &self,
        traffic_distribution_group_id: &str,
    ) -> Result<(), RemoteError> {
        self.client
            .delete_traffic_distribution_group()
            .traffic_distribution_group_id(traffic_distribution_group_id)
            .send()
            .await
            .map_err(|error| remote_error("delete_traffic_distribution_group", error))?;
        Ok(())
    }

    async fn list_phone_numbers(
        &self,
        query: &PhoneNumberQuery,
    ) -> Result<PhoneNumberPage, RemoteError> {
        let output = self
            .client
            .list_phone_numbers_v2()
            .set_target_arn(query.target_arn.clone())
            .set_instance_id(query.instance_id.clone())
            .set_max_results(query.max_results)
            .set_next_token(query.next_token.clone())
            .set_phone_number_prefix(query.phone_number_prefix.clone())
            .send()
            .await
            .map_err(|error| remote_error("list_phone_numbers", error))?;
        Ok(PhoneNumberPage {
            list_phone_numbers_summary_list: output
                .list_phone_numbers_summary_list()
                .iter()
                .map(phone_number_from_sdk)
                .collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn update_phone_number(
        &self,
        target_arn: &str,
        phone_number_id: &str,
    ) -> Result<PhoneNumberAssociation, RemoteError> {
        let output = self
            .client
            .update_phone_number()
            .phone_number_id(phone_number_id)
            .target_arn(target_arn)
            .send()
            .await
            .map_err(|error| remote_error("update_phone_number", error))?;
        Ok(PhoneNumberAssociation {
            phone_number_id: output.phone_number_id().map(str::to_string),
            phone_number_arn: output.phone_number_arn().map(str::to_string),
        })
    }
}

fn remote_error<E>(operation: &'static str, error: SdkError<E>) -> RemoteError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status_code = error
        .raw_response()
        .map(|response| response.status().as_u16());
    let code = error.code().map(str::to_string);
    let message = error
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&error).to_string());

    warn!(
        component = "connect_client",
        operation,
        status_code = ?status_code,
        code = ?code,
        message = %message,
        "connect_call_failed"
    );
    RemoteError::from_parts(code.as_deref(), status_code, message)
}

fn timestamp(value: Option<&SmithyDateTime>) -> Option<DateTime<Utc>> {
    value.and_then(|time| DateTime::from_timestamp(time.secs(), time.subsec_nanos()))
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

fn instance_summary_from_sdk(summary: &types::InstanceSummary) -> InstanceSummary {
    InstanceSummary {
        id: owned(summary.id()),
        arn: owned(summary.arn()),
        identity_management_type: summary
            .identity_management_type()
            .map(|value| value.as_str().to_string()),
        instance_alias: owned(summary.instance_alias()),
        created_time: timestamp(summary.created_time()),
        service_role: owned(summary.service_role()),
        instance_status: summary
            .instance_status()
            .map(|value| value.as_str().to_string()),
        inbound_calls_enabled: summary.inbound_calls_enabled(),
        outbound_calls_enabled: summary.outbound_calls_enabled(),
        instance_access_url: owned(summary.instance_access_url()),
    }
}

fn instance_from_sdk(instance: &types::Instance) -> Instance {
    Instance {
        id: owned(instance.id()),
        arn: owned(instance.arn()),
        identity_management_type: instance
            .identity_management_type()
            .map(|value| value.as_str().to_string()),
        instance_alias: owned(instance.instance_alias()),
        created_time: timestamp(instance.created_time()),
        service_role: owned(instance.service_role()),
        instance_status: instance
            .instance_status()
            .map(|value| value.as_str().to_string()),
        status_reason: instance
            .status_reason()
            .and_then(|reason| reason.message())
            .map(str::to_string),
        inbound_calls_enabled: instance.inbound_calls_enabled(),
        outbound_calls_enabled: instance.outbound_calls_enabled(),
        instance_access_url: owned(instance.instance_access_url()),
    }
}

fn group_summary_from_sdk(
    summary: &types::TrafficDistributionGroupSummary,
) -> TrafficDistributionGroupSummary {
    TrafficDistributionGroupSummary {
        id: owned(summary.id()),
        arn: owned(summary.arn()),
        name: owned(summary.name()),
        instance_arn: owned(summary.instance_arn()),
        status: summary.status().map(|value| value.as_str().to_string()),
        is_default: Some(summary.is_default()),
    }
}

fn group_from_sdk(group: &types::TrafficDistributionGroup) -> TrafficDistributionGroup {
    TrafficDistributionGroup {
        id: owned(group.id()),
        arn: owned(group.arn()),
        name: owned(group.name()),
        description: owned(group.description()),
        instance_arn: owned(group.instance_arn()),
        status: group.status().map(|value| value.as_str().to_string()),
        is_default: Some(group.is_default()),
        tags: group
            .tags()
            .map(|tags| {
                tags.iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect::<BTreeMap<_, _>>()
            })
            .unwrap_or_default(),
        traffic_distribution: None,
    }
}

fn telephony_config_from_sdk(config: &types::TelephonyConfig) -> TelephonyConfig {
    TelephonyConfig {
        distributions: config
            .distributions()
            .iter()
            .map(|distribution| Distribution {
                region: distribution.region().to_string(),
                percentage: distribution.percentage(),
            })
            .collect(),
    }
}

fn invalid_input(error: BuildError) -> RemoteError {
    RemoteError::from_parts(Some("ValidationException"), Some(400), error.to_string())
}

fn telephony_config_to_sdk(
    config: &TelephonyConfig,
) -> Result<types::TelephonyConfig, RemoteError> {
    let distributions = config
        .distributions
        .iter()
        .map(|distribution| {
            types::Distribution::builder()
                .region(&distribution.region)
                .percentage(distribution.percentage)
                .build()
                .map_err(invalid_input)
        })
        .collect::<Result<Vec<_>, _>>()?;

    types::TelephonyConfig::builder()
        .set_distributions(Some(distributions))
        .build()
        .map_err(invalid_input)
}

fn phone_number_from_sdk(summary: &types::ListPhoneNumbersSummary) -> PhoneNumberSummary {
    PhoneNumberSummary {
        phone_number_id: owned(summary.phone_number_id()),
        phone_number_arn: owned(summary.phone_number_arn()),
        phone_number: owned(summary.phone_number()),
        phone_number_country_code: summary
            .phone_number_country_code()
            .map(|value| value.as_str().to_string()),
        phone_number_type: summary
            .phone_number_type()
            .map(|value| value.as_str().to_string()),
        target_arn: owned(summary.target_arn()),
        instance_id: owned(summary.instance_id()),
        phone_number_description: owned(summary.phone_number_description()),
    }
}

#[cfg(test)]
mod tests {
    use aws_config::BehaviorVersion;

    use super::*;

    #[test]
    fn regional_config_resets_retries_to_standard() {
        let home = SdkConfig::builder()
            .region(Region::new("us-east-1"))
            .retry_config(
                RetryConfig::standard()
                    .with_max_attempts(10)
                    .with_initial_backoff(std::time::Duration::from_secs(3)),
            )
            .behavior_version(BehaviorVersion::latest())
            .build();

        let config = regional_config(&home, "us-west-2");

        assert_eq!(config.region().map(|region| region.as_ref()), Some("us-west-2"));
        let retry = config.retry_config().expect("retry config should be set");
        assert_eq!(retry.max_attempts(), RetryConfig::standard().max_attempts());
        assert_eq!(
            retry.initial_backoff(),
            RetryConfig::standard().initial_backoff()
        );
    }

    #[test]
    fn converts_instance_summary_fields() {
        let summary = types::InstanceSummary::builder()
            .id("inst-1")
            .instance_alias("east")
            .instance_status(types::InstanceStatus::Active)
            .created_time(SmithyDateTime::from_secs(1_700_000_000))
            .inbound_calls_enabled(true)
            .build();

        let converted = instance_summary_from_sdk(&summary);

        assert_eq!(converted.id.as_deref(), Some("inst-1"));
        assert_eq!(converted.instance_status.as_deref(), Some("ACTIVE"));
        assert_eq!(
            converted.created_time.map(|time| time.timestamp()),
            Some(1_700_000_000)
        );
        assert_eq!(converted.inbound_calls_enabled, Some(true));
        assert_eq!(converted.outbound_calls_enabled, None);
    }

    #[test]
    fn telephony_config_survives_sdk_conversion() {
        let config = TelephonyConfig {
            distributions: vec![
                Distribution {
                    region: "us-east-1".to_string(),
                    percentage: 80,
                },
                Distribution {
                    region: "us-west-2".to_string(),
                    percentage: 20,
                },
            ],
        };

        let sdk = telephony_config_to_sdk(&config).expect("config should build");

        assert_eq!(telephony_config_from_sdk(&sdk), config);
    }

    #[test]
    fn group_tags_are_copied() {
        let group = types::TrafficDistributionGroup::builder()
            .id("tdg-1")
            .status(types::TrafficDistributionGroupStatus::Active)
            .tags("created-from", "dashboard")
            .build();

        let converted = group_from_sdk(&group);

        assert_eq!(converted.status.as_deref(), Some("ACTIVE"));
        assert_eq!(
            converted.tags.get("created-from").map(String::as_str),
            Some("dashboard")
        );
        assert_eq!(converted.traffic_distribution, None);
    }
}
