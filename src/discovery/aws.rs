//! AWS EC2 discovery backend
//!
//! Runs `aws ec2 describe-instances` and maps the JSON response to
//! [`HostRecord`]s. Credentials, region, and profile selection all belong to
//! the AWS CLI environment; this module only owns the response boundary.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use super::{DiscoveryError, HostRecord, RecordSource};
use crate::config::AwsConfig;

const PROVIDER_NAME: &str = "aws";

/// EC2-backed record source.
#[derive(Debug)]
pub struct AwsRecordSource {
    config: AwsConfig,
}

impl AwsRecordSource {
    /// Validate the configured address field and build the source.
    pub fn new(config: AwsConfig) -> Result<Self, DiscoveryError> {
        match config.address_field.as_str() {
            "PrivateIpAddress" | "PublicIpAddress" => Ok(Self { config }),
            other => Err(DiscoveryError::UnknownAddressField(other.to_string())),
        }
    }
}

#[async_trait]
impl RecordSource for AwsRecordSource {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn lookup(&self) -> Result<Vec<HostRecord>, DiscoveryError> {
        let mut command = Command::new("aws");
        command.args(["ec2", "describe-instances", "--output", "json"]);
        if !self.config.filters.is_empty() {
            command.arg("--filters");
            for filter in &self.config.filters {
                command.arg(format!(
                    "Name={},Values={}",
                    filter.name,
                    filter.values.join(",")
                ));
            }
        }

        let output = command
            .output()
            .await
            .map_err(|source| DiscoveryError::Spawn {
                provider: PROVIDER_NAME,
                source,
            })?;

        if !output.status.success() {
            return Err(DiscoveryError::Provider {
                provider: PROVIDER_NAME,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let response: DescribeInstancesResponse = serde_json::from_slice(&output.stdout)
            .map_err(|source| DiscoveryError::Malformed {
                provider: PROVIDER_NAME,
                source,
            })?;

        tracing::info!(
            reservations = response.reservations.len(),
            "received describe-instances response"
        );

        Ok(records_from_response(response, &self.config.address_field))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstancesResponse {
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Reservation {
    #[serde(default)]
    instances: Vec<Instance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Instance {
    #[serde(default)]
    tags: Vec<InstanceTag>,
    #[serde(default)]
    private_ip_address: Option<String>,
    #[serde(default)]
    public_ip_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceTag {
    key: String,
    value: String,
}

fn records_from_response(
    response: DescribeInstancesResponse,
    address_field: &str,
) -> Vec<HostRecord> {
    let mut records = Vec::new();
    for reservation in response.reservations {
        for instance in reservation.instances {
            let address = match address_field {
                "PublicIpAddress" => instance.public_ip_address,
                _ => instance.private_ip_address,
            };
            let Some(address) = address.filter(|a| !a.is_empty()) else {
                tracing::warn!("skipping instance without a usable {address_field}");
                continue;
            };

            let mut name = String::new();
            // Tags are collected per instance; the Name tag doubles as the label.
            let mut tags = Vec::with_capacity(instance.tags.len());
            for tag in instance.tags {
                if tag.key == "Name" {
                    name = tag.value.clone();
                }
                tags.push(tag.value);
            }

            records.push(HostRecord {
                address,
                name,
                tags,
            });
        }
    }
    tracing::info!(count = records.len(), "lookup produced host records");
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Reservations": [
            {
                "Instances": [
                    {
                        "PrivateIpAddress": "10.0.0.1",
                        "PublicIpAddress": "54.1.2.3",
                        "Tags": [
                            {"Key": "Name", "Value": "web-1"},
                            {"Key": "env", "Value": "prod"}
                        ]
                    },
                    {
                        "PrivateIpAddress": "10.0.0.2",
                        "Tags": [
                            {"Key": "Name", "Value": "db-1"},
                            {"Key": "env", "Value": "staging"}
                        ]
                    }
                ]
            },
            {
                "Instances": [
                    {
                        "Tags": [{"Key": "Name", "Value": "no-address"}]
                    }
                ]
            }
        ]
    }"#;

    fn parse(raw: &str) -> DescribeInstancesResponse {
        serde_json::from_str(raw).expect("sample response should deserialize")
    }

    #[test]
    fn maps_instances_to_records() {
        let records = records_from_response(parse(SAMPLE), "PrivateIpAddress");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].address, "10.0.0.1");
        assert_eq!(records[0].name, "web-1");
        assert_eq!(records[0].tags, vec!["web-1", "prod"]);
    }

    #[test]
    fn tags_do_not_leak_across_instances() {
        let records = records_from_response(parse(SAMPLE), "PrivateIpAddress");
        assert_eq!(records[1].tags, vec!["db-1", "staging"]);
    }

    #[test]
    fn address_field_selects_public_ip() {
        let records = records_from_response(parse(SAMPLE), "PublicIpAddress");
        // Only the first instance has a public address.
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].address, "54.1.2.3");
    }

    #[test]
    fn instances_without_an_address_are_dropped() {
        let records = records_from_response(parse(SAMPLE), "PrivateIpAddress");
        assert!(records.iter().all(|r| r.name != "no-address"));
    }

    #[test]
    fn empty_response_is_fine() {
        let records = records_from_response(parse("{}"), "PrivateIpAddress");
        assert!(records.is_empty());
    }

    #[test]
    fn unknown_address_field_is_rejected_at_construction() {
        let config = AwsConfig {
            address_field: "Ipv6Address".to_string(),
            filters: Vec::new(),
        };
        let err = AwsRecordSource::new(config).expect_err("field should be rejected");
        assert!(matches!(err, DiscoveryError::UnknownAddressField(field) if field == "Ipv6Address"));
    }
}
