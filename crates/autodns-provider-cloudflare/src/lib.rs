// # Cloudflare DNS Remap Adapter
//
// This crate implements the `DnsRemap` port from `autodns-core` against the
// Cloudflare API v4.
//
// ## Behavior
//
// - Finds every record of the matching type whose content is exactly the
//   old value, walking all result pages
// - Edits each one to the new value
// - Zero matches is a warning, not an error, and no record is ever created
// - Keeps going after a failed edit, then reports every failed record
// - No retry logic: a failure keeps the old address cached, so the next
//   run retries
// - Dry-run mode performs the lookups and logs the edits it would send
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - Construction fails if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=...&content.exact=...`
// - Patch DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use autodns_core::config::ProviderConfig;
use autodns_core::traits::{DnsRemap, RemapSummary};
use autodns_core::{Error, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::net::Ipv6Addr;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Records requested per page when listing
const RECORDS_PER_PAGE: u32 = 100;

/// Provider name used in errors and logs
const PROVIDER: &str = "cloudflare";

/// Envelope every Cloudflare v4 response is wrapped in
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
}

/// A DNS record as returned by the list endpoint
#[derive(Debug, Clone, Deserialize)]
struct DnsRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
}

/// Body of the PATCH sent to move one record
#[derive(Debug, Serialize)]
struct RecordEdit<'a> {
    content: &'a str,
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
}

/// Cloudflare implementation of the DNS remap port
///
/// # Zone Resolution
///
/// With only a zone name configured, the zone id is looked up on the first
/// remap and reused for the rest of the process. A configured zone id
/// skips the lookup.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the remapper will:
/// - Perform all GET requests (zone lookup, record listing)
/// - Log the intended PATCH payloads
/// - **NOT** modify any record
pub struct CloudflareRemapper {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Zone name used for id lookup
    zone_name: Option<String>,

    /// Zone id, configured or resolved on first use
    zone_id: OnceCell<String>,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// API base URL, overridable for tests
    base_url: String,

    /// Dry-run mode: if true, list records but skip edits
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareRemapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareRemapper")
            .field("api_token", &"<REDACTED>")
            .field("zone_name", &self.zone_name)
            .field("zone_id", &self.zone_id.get())
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareRemapper {
    /// Create a new Cloudflare remapper
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    /// - `zone_name`: Zone name (e.g. "example.com"), used when `zone_id` is absent
    /// - `zone_id`: Explicit zone id
    /// - `dry_run`: If true, list records but skip edits
    pub fn new(
        api_token: impl Into<String>,
        zone_name: Option<String>,
        zone_id: Option<String>,
        dry_run: bool,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let zone_name = zone_name.filter(|z| !z.is_empty());
        let zone_id = zone_id.filter(|z| !z.is_empty());
        if zone_name.is_none() && zone_id.is_none() {
            return Err(Error::config("Cloudflare needs a zone name or a zone id"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            zone_name,
            zone_id: OnceCell::new_with(zone_id),
            client,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            dry_run,
        })
    }

    /// Create a remapper from provider configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::Cloudflare {
                api_token,
                zone_name,
                zone_id,
                dry_run,
            } => {
                if *dry_run {
                    tracing::warn!(
                        "Cloudflare remapper running in DRY-RUN mode - no records will be changed"
                    );
                }
                Self::new(api_token.clone(), zone_name.clone(), zone_id.clone(), *dry_run)
            }
        }
    }

    /// Point the remapper at a different API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether edits are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Get the zone id, looking it up by name the first time
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn zone_id(&self) -> Result<&str> {
        let zone_id = self
            .zone_id
            .get_or_try_init(|| async {
                let zone_name = self
                    .zone_name
                    .as_deref()
                    .ok_or_else(|| Error::config("Cloudflare zone name is not configured"))?;
                self.lookup_zone_id(zone_name).await
            })
            .await?;
        Ok(zone_id.as_str())
    }

    async fn lookup_zone_id(&self, zone_name: &str) -> Result<String> {
        tracing::debug!("Looking up Cloudflare zone ID for {}", zone_name);

        let request = self
            .client
            .get(format!("{}/zones", self.base_url))
            .query(&[("name", zone_name)]);
        let response: ApiResponse<Vec<Zone>> = self.send(request, "Zone lookup").await?;

        let zones = response.result.unwrap_or_default();
        match zones.as_slice() {
            [] => Err(Error::config(format!(
                "Unable to find Cloudflare zone for {}",
                zone_name
            ))),
            [zone] => {
                tracing::debug!("Found zone ID: {}", zone.id);
                Ok(zone.id.clone())
            }
            _ => Err(Error::config(format!(
                "{} Cloudflare zones match {}; set CLOUDFLARE_ZONE_ID to choose one",
                zones.len(),
                zone_name
            ))),
        }
    }

    /// List every record of `record_type` whose content is exactly `content`
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A&content.exact=1.2.3.4&page=1&per_page=100
    /// ```
    async fn find_records(
        &self,
        zone_id: &str,
        record_type: &str,
        content: &str,
    ) -> Result<Vec<DnsRecord>> {
        let url = format!("{}/zones/{}/dns_records", self.base_url, zone_id);
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            let request = self.client.get(&url).query(&[
                ("type", record_type.to_string()),
                ("content.exact", content.to_string()),
                ("page", page.to_string()),
                ("per_page", RECORDS_PER_PAGE.to_string()),
            ]);
            let response: ApiResponse<Vec<DnsRecord>> =
                self.send(request, "Record lookup").await?;

            let total_pages = response
                .result_info
                .and_then(|info| info.total_pages)
                .unwrap_or(1);
            records.extend(response.result.unwrap_or_default());

            if page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(records)
    }

    /// Move one record to `new_value`
    ///
    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// { "content": "1.2.3.4", "type": "A", "name": "home.example.com" }
    /// ```
    async fn edit_record(&self, zone_id: &str, record: &DnsRecord, new_value: &str) -> Result<()> {
        let url = format!(
            "{}/zones/{}/dns_records/{}",
            self.base_url, zone_id, record.id
        );
        let edit = RecordEdit {
            content: new_value,
            record_type: &record.record_type,
            name: &record.name,
        };

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PATCH request to {} with payload: {}",
                url,
                serde_json::to_string(&edit)?
            );
            return Ok(());
        }

        let request = self.client.patch(&url).json(&edit);
        let _: ApiResponse<serde_json::Value> = self.send(request, "Record edit").await?;
        Ok(())
    }

    /// Send an authenticated request and unwrap the Cloudflare envelope
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<ApiResponse<T>> {
        let response = request
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error(status, &error_text, context));
        }

        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to parse response: {}", e)))?;

        if !body.success {
            let messages: Vec<String> = body
                .errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect();
            return Err(Error::provider(
                PROVIDER,
                format!("{} rejected: {}", context, messages.join(", ")),
            ));
        }

        Ok(body)
    }
}

/// Map a non-success HTTP status to an error
fn status_error(status: StatusCode, error_text: &str, context: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid API token or insufficient permissions. Status: {}",
            status
        )),
        404 => Error::not_found(format!("{} failed: {}", context, status)),
        429 => Error::rate_limited(format!(
            "Rate limit exceeded. Please retry later. Status: {}",
            status
        )),
        500..=599 => Error::provider(
            PROVIDER,
            format!("Cloudflare server error (transient): {} - {}", status, error_text),
        ),
        _ => Error::provider(
            PROVIDER,
            format!("{} failed: {} - {}", context, status, error_text),
        ),
    }
}

/// Record type to search for when moving away from `old_value`
///
/// IPv6 literals search `AAAA` records; everything else searches `A`.
/// A hostname never equals an `A` record's content, so remapping away from
/// a hostname matches nothing and ends in the zero-match warning. Networks
/// whose mapped address is a hostname are tracked in the cache but have no
/// records moved.
fn record_type_for(old_value: &str) -> &'static str {
    if old_value.parse::<Ipv6Addr>().is_ok() {
        "AAAA"
    } else {
        "A"
    }
}

#[async_trait]
impl DnsRemap for CloudflareRemapper {
    async fn remap(&self, old_value: &str, new_value: &str) -> Result<RemapSummary> {
        let record_type = record_type_for(old_value);
        tracing::info!(
            "Updating {} records {} => {} [mode: {}]",
            record_type,
            old_value,
            new_value,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        let zone_id = self.zone_id().await?;
        let records = self.find_records(zone_id, record_type, old_value).await?;

        if records.is_empty() {
            tracing::warn!("No records found for {}", old_value);
            return Ok(RemapSummary::nothing_matched());
        }

        let mut updated = Vec::new();
        let mut failed = Vec::new();
        for record in &records {
            match self.edit_record(zone_id, record, new_value).await {
                Ok(()) => {
                    tracing::info!(
                        "{} ({}): {} => {}",
                        record.name,
                        record.id,
                        old_value,
                        new_value
                    );
                    updated.push(record.name.clone());
                }
                Err(e) => {
                    tracing::error!(
                        "An error occurred while editing DNS record {} ({}), {} => {}: {}",
                        record.name,
                        record.id,
                        old_value,
                        new_value,
                        e
                    );
                    failed.push(format!("{} ({}): {}", record.name, record.id, e));
                }
            }
        }

        if !failed.is_empty() {
            return Err(Error::provider(
                PROVIDER,
                format!(
                    "{} of {} record(s) not updated: {}",
                    failed.len(),
                    records.len(),
                    failed.join("; ")
                ),
            ));
        }

        Ok(RemapSummary {
            matched: records.len(),
            updated,
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
