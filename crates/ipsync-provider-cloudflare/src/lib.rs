// # Cloudflare DNS Provider
//
// This crate implements the `DnsProvider` trait against the Cloudflare API
// v4. Each operation is exactly one HTTPS call with a 30 second timeout;
// retries, skipping and scheduling are owned by the reconciler.
//
// ## API Reference
//
// - List DNS records: GET `/zones/:zone_id/dns_records?type=..&name=..&match=all`
// - Create DNS record: POST `/zones/:zone_id/dns_records`
// - Update DNS record: PUT `/zones/:zone_id/dns_records/:record_id`
//
// Every response uses the `{success, errors, result}` envelope; a
// non-success envelope maps to `Error::Api` carrying the first error's code
// and message.
//
// ## Security
//
// The API token is sent as a bearer header and never appears in logs; the
// Debug implementation redacts it.

use async_trait::async_trait;
use ipsync_core::traits::{DnsProvider, DnsRecord, RecordType};
use ipsync_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// HTTP timeout for API requests
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// TTL applied to records we create
const RECORD_TTL: u32 = 120;

/// Cloudflare DNS provider
///
/// Stateless beyond the HTTP client; safe to share across ticks.
pub struct CloudflareProvider {
    api_token: String,
    zone_id: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .finish()
    }
}

/// Record body sent on create and update
#[derive(Debug, Serialize)]
struct RecordPayload<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: String,
    ttl: u32,
}

/// One entry of the envelope's `errors` array
#[derive(Debug, Clone, Deserialize)]
struct ApiErrorEntry {
    code: i64,
    message: String,
}

/// Envelope for endpoints returning a list of records
#[derive(Debug, Deserialize)]
struct ListEnvelope {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
    #[serde(default)]
    result: Option<Vec<DnsRecord>>,
}

/// Envelope for endpoints returning a single record
#[derive(Debug, Deserialize)]
struct SingleEnvelope {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
    #[serde(default)]
    result: Option<DnsRecord>,
}

/// Map a non-success envelope to an error, taking the first entry
fn envelope_error(errors: &[ApiErrorEntry]) -> Error {
    match errors.first() {
        Some(e) => Error::api(e.code, e.message.clone()),
        None => Error::api(0, "none"),
    }
}

/// Extract the created record, treating a missing or id-less record as a
/// failure even though the envelope claimed success
fn created_record(domain: &str, result: Option<DnsRecord>) -> Result<DnsRecord> {
    match result {
        Some(record) if !record.id.is_empty() => Ok(record),
        _ => Err(Error::EmptyResult(domain.to_string())),
    }
}

impl CloudflareProvider {
    /// Create a provider for `zone_id` authenticating with `api_token`
    pub fn new(zone_id: impl Into<String>, api_token: impl Into<String>) -> Result<Self> {
        let zone_id = zone_id.into();
        let api_token = api_token.into();

        if zone_id.is_empty() {
            return Err(Error::config("Cloudflare zone id is required"));
        }
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token is required"));
        }

        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_token,
            zone_id,
            client,
        })
    }

    fn records_url(&self) -> String {
        format!("{}/zones/{}/dns_records", CLOUDFLARE_API_BASE, self.zone_id)
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn lookup(&self, record_type: RecordType, domain: &str) -> Result<Vec<DnsRecord>> {
        let url = format!(
            "{}?type={}&name={}&match=all",
            self.records_url(),
            record_type,
            domain
        );

        tracing::debug!(%record_type, domain, "GET dns_records");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::http(format!("request failed: {e}")))?;

        let envelope: ListEnvelope = response
            .json()
            .await
            .map_err(|e| Error::http(format!("failed to parse response: {e}")))?;

        if !envelope.success {
            return Err(envelope_error(&envelope.errors));
        }

        let records = envelope.result.unwrap_or_default();
        tracing::debug!(%record_type, domain, count = records.len(), "GET dns_records ok");
        Ok(records)
    }

    async fn create(&self, record_type: RecordType, domain: &str, ip: IpAddr) -> Result<DnsRecord> {
        let payload = RecordPayload {
            record_type: record_type.as_str(),
            name: domain,
            content: ip.to_string(),
            ttl: RECORD_TTL,
        };

        tracing::debug!(%record_type, domain, %ip, "POST dns_records");

        let response = self
            .client
            .post(self.records_url())
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::http(format!("request failed: {e}")))?;

        let envelope: SingleEnvelope = response
            .json()
            .await
            .map_err(|e| Error::http(format!("failed to parse response: {e}")))?;

        if !envelope.success {
            return Err(envelope_error(&envelope.errors));
        }

        let record = created_record(domain, envelope.result)?;
        tracing::debug!(%record_type, domain, id = %record.id, "POST dns_records ok");
        Ok(record)
    }

    async fn update(
        &self,
        record_type: RecordType,
        domain: &str,
        ip: IpAddr,
        record_id: &str,
    ) -> Result<()> {
        let payload = RecordPayload {
            record_type: record_type.as_str(),
            name: domain,
            content: ip.to_string(),
            ttl: RECORD_TTL,
        };

        tracing::debug!(%record_type, domain, %ip, id = record_id, "PUT dns_records");

        let response = self
            .client
            .put(format!("{}/{}", self.records_url(), record_id))
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::http(format!("request failed: {e}")))?;

        let envelope: SingleEnvelope = response
            .json()
            .await
            .map_err(|e| Error::http(format!("failed to parse response: {e}")))?;

        if !envelope.success {
            return Err(envelope_error(&envelope.errors));
        }

        tracing::debug!(%record_type, domain, id = record_id, "PUT dns_records ok");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
