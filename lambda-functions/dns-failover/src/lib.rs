use aws_config::BehaviorVersion;
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
};
use aws_sdk_route53::Client as Route53Client;
use lambda_runtime::Error;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// TTL applied to the failover record so resolvers re-query quickly.
pub const FAILOVER_TTL: i64 = 60;

pub const CHANGE_COMMENT: &str = "Automated failover";

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Request {
    pub hosted_zone_id: Option<String>, // falls back to HOSTED_ZONE_ID
    pub record_name: Option<String>,    // falls back to RECORD_NAME
    pub new_ip: Option<String>,         // no fallback
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Response {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "changeInfo", skip_serializing_if = "Option::is_none")]
    pub change_info: Option<ChangeInfo>,
}

impl Response {
    pub fn missing_parameters() -> Self {
        Self {
            status: "error".to_string(),
            message: Some("missing parameters".to_string()),
            change_info: None,
        }
    }

    pub fn ok(change_info: ChangeInfo) -> Self {
        Self {
            status: "ok".to_string(),
            message: None,
            change_info: Some(change_info),
        }
    }
}

/// Change metadata reported by Route53, forwarded field-for-field under the
/// provider's own field names.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChangeInfo {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "SubmittedAt")]
    pub submitted_at: String,
    #[serde(rename = "Comment", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl From<&aws_sdk_route53::types::ChangeInfo> for ChangeInfo {
    fn from(info: &aws_sdk_route53::types::ChangeInfo) -> Self {
        Self {
            id: info.id().to_string(),
            status: info.status().as_str().to_string(),
            submitted_at: info.submitted_at().to_string(),
            comment: info.comment().map(str::to_string),
        }
    }
}

/// Fallback values read from the environment at invocation time.
#[derive(Debug, Clone, Default)]
pub struct AmbientConfig {
    pub hosted_zone_id: Option<String>,
    pub record_name: Option<String>,
}

impl AmbientConfig {
    pub fn from_env() -> Self {
        Self {
            hosted_zone_id: std::env::var("HOSTED_ZONE_ID").ok(),
            record_name: std::env::var("RECORD_NAME").ok(),
        }
    }
}

/// Parameters the upsert needs, with all fallbacks applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParameters {
    pub hosted_zone_id: String,
    pub record_name: String,
    pub new_ip: String,
}

/// Prefers `value` over `fallback`, treating empty strings as missing.
pub fn resolve_value(value: Option<&str>, fallback: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.is_empty())
        .or(fallback.filter(|v| !v.is_empty()))
        .map(str::to_string)
}

/// Resolves the three required parameters, or None if any is missing/empty.
pub fn resolve_parameters(request: &Request, config: &AmbientConfig) -> Option<ResolvedParameters> {
    let hosted_zone_id = resolve_value(
        request.hosted_zone_id.as_deref(),
        config.hosted_zone_id.as_deref(),
    )?;
    let record_name = resolve_value(
        request.record_name.as_deref(),
        config.record_name.as_deref(),
    )?;
    let new_ip = resolve_value(request.new_ip.as_deref(), None)?;

    Some(ResolvedParameters {
        hosted_zone_id,
        record_name,
        new_ip,
    })
}

pub struct FailoverService {
    route53_client: Route53Client,
}

impl FailoverService {
    pub async fn new() -> Result<Self, Error> {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        Ok(Self {
            route53_client: Route53Client::new(&config),
        })
    }

    /// Builds the service around an existing client, so tests can substitute
    /// a canned provider.
    pub fn with_client(route53_client: Route53Client) -> Self {
        Self { route53_client }
    }

    pub async fn handle_request(
        &self,
        request: &Request,
        config: &AmbientConfig,
    ) -> Result<Response, Error> {
        let Some(params) = resolve_parameters(request, config) else {
            warn!("Missing required parameters, skipping record change");
            return Ok(Response::missing_parameters());
        };

        let change_info = self.upsert_record(&params).await?;

        Ok(Response::ok(change_info))
    }

    /// Submits one UPSERT change batch for the A record. Provider errors are
    /// returned as-is so the invocation fails abnormally; retry and alerting
    /// belong to the invoking platform.
    pub async fn upsert_record(&self, params: &ResolvedParameters) -> Result<ChangeInfo, Error> {
        info!(
            "Upserting A record {} -> {} in zone {}",
            params.record_name, params.new_ip, params.hosted_zone_id
        );

        let resource_record = ResourceRecord::builder()
            .value(&params.new_ip)
            .build()?;

        let record_set = ResourceRecordSet::builder()
            .name(&params.record_name)
            .r#type(RrType::A)
            .ttl(FAILOVER_TTL)
            .resource_records(resource_record)
            .build()?;

        let change = Change::builder()
            .action(ChangeAction::Upsert)
            .resource_record_set(record_set)
            .build()?;

        let change_batch = ChangeBatch::builder()
            .comment(CHANGE_COMMENT)
            .changes(change)
            .build()?;

        let output = self
            .route53_client
            .change_resource_record_sets()
            .hosted_zone_id(&params.hosted_zone_id)
            .change_batch(change_batch)
            .send()
            .await?;

        let change_info = output
            .change_info()
            .ok_or("change response is missing change info")?;

        info!(
            "Change {} submitted with status {}",
            change_info.id(),
            change_info.status().as_str()
        );

        Ok(change_info.into())
    }
}
