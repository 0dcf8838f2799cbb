use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::batch::{BatchResult, ErrorDetail, ItemStatus};

pub const DEFAULT_TRAFFIC_DISTRIBUTION_GROUP_PAGE_SIZE: i32 = 10;
pub const MAX_TRAFFIC_DISTRIBUTION_GROUP_PAGE_SIZE: i32 = 10;
pub const MAX_PHONE_NUMBER_PAGE_SIZE: i32 = 1_000;

pub const CREATED_FROM_TAG_KEY: &str = "created-from";
pub const CREATED_FROM_TAG_VALUE: &str = "Amazon Connect Global Resiliency Dashboard";

/// Tags applied to resources created through the dashboard.
pub fn dashboard_tags() -> BTreeMap<String, String> {
    BTreeMap::from([(
        CREATED_FROM_TAG_KEY.to_string(),
        CREATED_FROM_TAG_VALUE.to_string(),
    )])
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Trims a required string field, rejecting missing or blank values.
pub fn require_field(name: &str, value: Option<&str>) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ValidationError::new(format!("{name} is required"))),
    }
}

fn optional_field(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

// ── Instances ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceSummary {
    pub id: Option<String>,
    pub arn: Option<String>,
    pub identity_management_type: Option<String>,
    pub instance_alias: Option<String>,
    pub created_time: Option<DateTime<Utc>>,
    pub service_role: Option<String>,
    pub instance_status: Option<String>,
    pub inbound_calls_enabled: Option<bool>,
    pub outbound_calls_enabled: Option<bool>,
    pub instance_access_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    pub id: Option<String>,
    pub arn: Option<String>,
    pub identity_management_type: Option<String>,
    pub instance_alias: Option<String>,
    pub created_time: Option<DateTime<Utc>>,
    pub service_role: Option<String>,
    pub instance_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    pub inbound_calls_enabled: Option<bool>,
    pub outbound_calls_enabled: Option<bool>,
    pub instance_access_url: Option<String>,
}

/// A described instance decorated with its replication state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceDetails {
    #[serde(flatten)]
    pub instance: Instance,
    pub replicated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replica_alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_replica: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ReplicatedInstance {
    pub id: Option<String>,
    pub arn: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplicateInstanceRequest {
    pub instance_id: Option<String>,
    pub replica_alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedReplicateInstance {
    pub instance_id: String,
    pub replica_alias: String,
}

impl ReplicateInstanceRequest {
    pub fn normalize(self) -> Result<NormalizedReplicateInstance, ValidationError> {
        Ok(NormalizedReplicateInstance {
            instance_id: require_field("instanceId", self.instance_id.as_deref())?,
            replica_alias: require_field("replicaAlias", self.replica_alias.as_deref())?,
        })
    }
}

// ── Traffic distribution groups ────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct TrafficDistributionGroupSummary {
    pub id: Option<String>,
    pub arn: Option<String>,
    pub name: Option<String>,
    pub instance_arn: Option<String>,
    pub status: Option<String>,
    pub is_default: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrafficDistributionGroupPage {
    pub summaries: Vec<TrafficDistributionGroupSummary>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct TrafficDistributionGroup {
    pub id: Option<String>,
    pub arn: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub instance_arn: Option<String>,
    pub status: Option<String>,
    pub is_default: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_distribution: Option<TrafficDistribution>,
}

/// Body of the show-group response: the group with its distribution folded in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct TrafficDistributionGroupView {
    pub traffic_distribution_group: TrafficDistributionGroup,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CreatedTrafficDistributionGroup {
    pub id: Option<String>,
    pub arn: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct TrafficDistribution {
    pub id: Option<String>,
    pub arn: Option<String>,
    pub telephony_config: Option<TelephonyConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct TelephonyConfig {
    pub distributions: Vec<Distribution>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Distribution {
    pub region: String,
    #[serde(deserialize_with = "deserialize_percentage")]
    pub percentage: i32,
}

/// The dashboard form submits percentages as strings.
fn deserialize_percentage<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_i64()
            .and_then(|value| i32::try_from(value).ok())
            .ok_or_else(|| de::Error::custom(format!("Percentage {number} is not an integer"))),
        Value::String(text) => text
            .trim()
            .parse::<i32>()
            .map_err(|_| de::Error::custom(format!("Percentage '{text}' is not an integer"))),
        other => Err(de::Error::custom(format!(
            "Percentage must be a number or numeric string, got {other}"
        ))),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTrafficDistributionGroupsQuery {
    pub instance_id: Option<String>,
    pub max_results: i32,
    pub next_token: Option<String>,
}

impl ListTrafficDistributionGroupsQuery {
    pub fn from_parameters(
        instance_id: Option<&str>,
        max_results: Option<&str>,
        next_token: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let max_results = match max_results.map(str::trim).filter(|text| !text.is_empty()) {
            None => DEFAULT_TRAFFIC_DISTRIBUTION_GROUP_PAGE_SIZE,
            Some(text) => parse_page_size(
                "maxResults",
                text,
                MAX_TRAFFIC_DISTRIBUTION_GROUP_PAGE_SIZE,
            )?,
        };

        Ok(Self {
            instance_id: optional_field(instance_id.map(str::to_string)),
            max_results,
            next_token: optional_field(next_token.map(str::to_string)),
        })
    }
}

fn parse_page_size(name: &str, text: &str, max: i32) -> Result<i32, ValidationError> {
    let value = text
        .parse::<i32>()
        .map_err(|_| ValidationError::new(format!("{name} must be an integer")))?;
    if !(1..=max).contains(&value) {
        return Err(ValidationError::new(format!(
            "{name} must be between 1 and {max}"
        )));
    }
    Ok(value)
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTrafficDistributionGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub instance_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrafficDistributionGroup {
    pub name: String,
    pub description: Option<String>,
    pub instance_id: String,
    pub tags: BTreeMap<String, String>,
}

impl CreateTrafficDistributionGroupRequest {
    pub fn normalize(self) -> Result<NewTrafficDistributionGroup, ValidationError> {
        Ok(NewTrafficDistributionGroup {
            name: require_field("name", self.name.as_deref())?,
            description: optional_field(self.description),
            instance_id: require_field("instanceId", self.instance_id.as_deref())?,
            tags: dashboard_tags(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteTrafficDistributionGroupRequest {
    pub traffic_distribution_group_id: Option<String>,
}

impl DeleteTrafficDistributionGroupRequest {
    pub fn normalize(self) -> Result<String, ValidationError> {
        require_field(
            "trafficDistributionGroupId",
            self.traffic_distribution_group_id.as_deref(),
        )
    }
}

/// Mirrors the Connect `UpdateTrafficDistribution` parameters. Unknown keys
/// the dashboard echoes back from a previous read are ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct UpdateTrafficDistributionRequest {
    pub id: Option<String>,
    pub telephony_config: Option<TelephonyConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficDistributionUpdate {
    pub id: String,
    pub telephony_config: TelephonyConfig,
}

impl UpdateTrafficDistributionRequest {
    pub fn normalize(self) -> Result<TrafficDistributionUpdate, ValidationError> {
        let id = require_field("Id", self.id.as_deref())?;
        let telephony_config = self
            .telephony_config
            .ok_or_else(|| ValidationError::new("TelephonyConfig is required"))?;

        if telephony_config.distributions.is_empty() {
            return Err(ValidationError::new(
                "TelephonyConfig.Distributions cannot be empty",
            ));
        }
        for distribution in &telephony_config.distributions {
            if distribution.region.trim().is_empty() {
                return Err(ValidationError::new(
                    "Distribution regions must be non-empty strings",
                ));
            }
            if !(0..=100).contains(&distribution.percentage) {
                return Err(ValidationError::new(format!(
                    "Distribution percentage for '{}' must be between 0 and 100",
                    distribution.region
                )));
            }
        }

        Ok(TrafficDistributionUpdate {
            id,
            telephony_config,
        })
    }
}

// ── Phone numbers ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PhoneNumberSummary {
    pub phone_number_id: Option<String>,
    pub phone_number_arn: Option<String>,
    pub phone_number: Option<String>,
    pub phone_number_country_code: Option<String>,
    pub phone_number_type: Option<String>,
    pub target_arn: Option<String>,
    pub instance_id: Option<String>,
    pub phone_number_description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PhoneNumberPage {
    pub list_phone_numbers_summary_list: Vec<PhoneNumberSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PhoneNumberAssociation {
    pub phone_number_id: Option<String>,
    pub phone_number_arn: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct ListPhoneNumbersRequest {
    pub target_arn: Option<String>,
    pub instance_id: Option<String>,
    pub max_results: Option<i32>,
    pub next_token: Option<String>,
    pub phone_number_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneNumberQuery {
    pub target_arn: Option<String>,
    pub instance_id: Option<String>,
    pub max_results: Option<i32>,
    pub next_token: Option<String>,
    pub phone_number_prefix: Option<String>,
}

impl ListPhoneNumbersRequest {
    pub fn normalize(self) -> Result<PhoneNumberQuery, ValidationError> {
        let target_arn = optional_field(self.target_arn);
        let instance_id = optional_field(self.instance_id);
        if target_arn.is_some() && instance_id.is_some() {
            return Err(ValidationError::new(
                "Only one of TargetArn or InstanceId may be provided",
            ));
        }

        if let Some(max_results) = self.max_results {
            if !(1..=MAX_PHONE_NUMBER_PAGE_SIZE).contains(&max_results) {
                return Err(ValidationError::new(format!(
                    "MaxResults must be between 1 and {MAX_PHONE_NUMBER_PAGE_SIZE}"
                )));
            }
        }

        Ok(PhoneNumberQuery {
            target_arn,
            instance_id,
            max_results: self.max_results,
            next_token: optional_field(self.next_token),
            phone_number_prefix: optional_field(self.phone_number_prefix),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdatePhoneNumbersRequest {
    pub target_arn: Option<String>,
    pub phone_number_ids: Option<Vec<String>>,
}

/// A validated reassignment. An explicit empty id list is a valid batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumberReassignment {
    pub target_arn: String,
    pub phone_number_ids: Vec<String>,
}

impl UpdatePhoneNumbersRequest {
    pub fn normalize(self) -> Result<PhoneNumberReassignment, ValidationError> {
        let target_arn = require_field("targetArn", self.target_arn.as_deref())?;
        let phone_number_ids = self
            .phone_number_ids
            .ok_or_else(|| ValidationError::new("phoneNumberIds is required"))?;
        Ok(PhoneNumberReassignment {
            target_arn,
            phone_number_ids,
        })
    }
}

// ── Batch reassignment wire format ─────────────────────────────────

pub const ITEM_SUCCESS_MESSAGE: &str = "success";
pub const ITEM_ERROR_MESSAGE: &str = "error";
pub const ITEM_SUCCESS_STATUS: u16 = 200;
pub const ITEM_ERROR_STATUS: u16 = 500;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhoneNumberReassignmentResponse {
    pub data: Vec<ReassignmentItem>,
    pub metadata: ReassignmentMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReassignmentItem {
    pub message: String,
    pub resource: ReassignedResource,
    pub status: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReassignedResource {
    pub phone_number_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ReassignmentError>,
}

/// The remote failure of one item, keyed the way the dashboard reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReassignmentError {
    pub status_code: u16,
    pub message: String,
}

impl From<&ErrorDetail> for ReassignmentError {
    fn from(detail: &ErrorDetail) -> Self {
        Self {
            status_code: detail.code,
            message: detail.message.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReassignmentMetadata {
    pub success: usize,
    pub failure: usize,
    pub total: usize,
}

impl From<&BatchResult> for PhoneNumberReassignmentResponse {
    fn from(result: &BatchResult) -> Self {
        let data = result
            .outcomes()
            .iter()
            .map(|outcome| {
                let (message, status) = match outcome.status {
                    ItemStatus::Success => (ITEM_SUCCESS_MESSAGE, ITEM_SUCCESS_STATUS),
                    ItemStatus::Failure => (ITEM_ERROR_MESSAGE, ITEM_ERROR_STATUS),
                };
                ReassignmentItem {
                    message: message.to_string(),
                    resource: ReassignedResource {
                        phone_number_id: outcome.item_id.clone(),
                        error: outcome.error.as_ref().map(ReassignmentError::from),
                    },
                    status,
                }
            })
            .collect();

        Self {
            data,
            metadata: ReassignmentMetadata {
                success: result.success_count(),
                failure: result.failure_count(),
                total: result.total_count(),
            },
        }
    }
}
