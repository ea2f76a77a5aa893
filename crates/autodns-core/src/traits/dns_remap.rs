// # DNS Remap Trait
//
// Defines the single capability the reconciler needs from a DNS provider:
// move every record that points at one value so it points at another.
//
// ## Implementations
//
// - Cloudflare: `autodns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use autodns_core::DnsRemap;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let remapper = /* DnsRemap implementation */;
//
//     let summary = remapper.remap("1.2.3.3", "1.2.3.4").await?;
//     println!("moved {} record(s)", summary.updated.len());
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Outcome of a successful remap call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapSummary {
    /// Number of provider-side records that held the old value
    pub matched: usize,
    /// Names of the records that now hold the new value
    pub updated: Vec<String>,
}

impl RemapSummary {
    /// A remap that found no records holding the old value
    pub fn nothing_matched() -> Self {
        Self::default()
    }

    /// Build a summary where every matched record was updated
    pub fn updated(records: Vec<String>) -> Self {
        Self {
            matched: records.len(),
            updated: records,
        }
    }

    /// Whether no record held the old value
    pub fn is_empty(&self) -> bool {
        self.matched == 0
    }
}

/// Trait for DNS remap implementations
///
/// The reconciler calls [`DnsRemap::remap`] once per cache entry whose
/// address changed, and awaits it before touching the next entry.
///
/// # Contract
///
/// - Resolve `old_value` to zero or more provider-side records and update
///   each to `new_value`.
/// - Zero matching records is **not** an error: return
///   [`RemapSummary::nothing_matched`] and let the caller warn. A record may
///   have been removed by hand since the last run.
/// - Never create records. Only existing records holding `old_value` move.
/// - Return `Err` when any matching record could not be updated. The caller
///   then keeps the old address cached so the next run retries the same
///   transition.
/// - Timeouts belong to the implementation. The reconciler has none and does
///   not retry.
#[async_trait]
pub trait DnsRemap: Send + Sync {
    /// Repoint every record holding `old_value` to `new_value`
    async fn remap(&self, old_value: &str, new_value: &str)
    -> Result<RemapSummary, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
