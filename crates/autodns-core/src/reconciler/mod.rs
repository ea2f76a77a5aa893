//! Change detection and remap orchestration
//!
//! [`reconcile`] walks the cache in order and compares each entry's cached
//! address with the address observed this run:
//!
//! ```text
//! cached == current        → Unchanged   (no provider call)
//! cached empty             → FirstSeen   (record current, no provider call)
//! cached != current        → remap(cached, current)
//!                              ok  → Remapped (record current)
//!                              err → Failed   (keep cached, retry next run)
//! network missing this run → Failed (NetworkNotObserved, entry untouched)
//! ```
//!
//! The cache only ever records a transition the provider confirmed, so a
//! failed remap is attempted again on the next run.
//!
//! [`add_mapping`] is the maintenance operation that pins a network into
//! the cache against its current address.

use crate::error::Error;
use crate::traits::{Cache, DnsRemap, NetworkMapping, RemapSummary, Upsert};
use tracing::{debug, error, info, warn};

/// What happened to one cache entry during [`reconcile`]
#[derive(Debug)]
pub enum EntryOutcome {
    /// Cached and current address are equal
    Unchanged {
        network_name: String,
        address: String,
    },

    /// No address was cached yet; the current one was recorded
    FirstSeen {
        network_name: String,
        address: String,
    },

    /// Records moved from the old address to the new one
    Remapped {
        network_name: String,
        old_address: String,
        new_address: String,
        summary: RemapSummary,
    },

    /// The entry could not be processed and was left untouched
    ///
    /// `error` is [`Error::NetworkNotObserved`] or [`Error::Remap`].
    Failed { network_name: String, error: Error },
}

impl EntryOutcome {
    /// Network this outcome belongs to
    pub fn network_name(&self) -> &str {
        match self {
            Self::Unchanged { network_name, .. }
            | Self::FirstSeen { network_name, .. }
            | Self::Remapped { network_name, .. }
            | Self::Failed { network_name, .. } => network_name,
        }
    }

    /// Whether this entry failed
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Per-entry results of one [`reconcile`] pass, in cache order
#[derive(Debug, Default)]
pub struct ReconcileReport {
    outcomes: Vec<EntryOutcome>,
}

impl ReconcileReport {
    /// All outcomes in cache order
    pub fn outcomes(&self) -> &[EntryOutcome] {
        &self.outcomes
    }

    /// Errors of the failed entries, in cache order
    pub fn failures(&self) -> impl Iterator<Item = &Error> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            EntryOutcome::Failed { error, .. } => Some(error),
            _ => None,
        })
    }

    /// Number of failed entries
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Number of entries whose records were remapped
    pub fn remapped_count(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Remapped { .. }))
    }

    /// Number of entries recorded for the first time
    pub fn first_seen_count(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::FirstSeen { .. }))
    }

    /// Number of entries whose address did not change
    pub fn unchanged_count(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Unchanged { .. }))
    }

    /// Whether the cache changed in this pass
    pub fn cache_changed(&self) -> bool {
        self.remapped_count() + self.first_seen_count() > 0
    }

    /// Whether every entry was processed without error
    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }

    /// Turn the report into an error if any entry failed
    ///
    /// The error lists every failure, so one bad entry never hides another.
    pub fn into_result(self) -> Result<Self, Error> {
        if self.is_success() {
            return Ok(self);
        }

        Err(Error::RunFailed {
            total: self.outcomes.len(),
            details: self.failures().map(ToString::to_string).collect(),
        })
    }

    fn count(&self, pred: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Bring the cache in line with the current mapping
///
/// Entries are processed one at a time in cache order. Each remap call is
/// awaited before the next entry is looked at, and a failure on one entry
/// never stops the others. `cache` is mutated in place; the caller persists
/// it afterwards, whatever the report says.
pub async fn reconcile(
    cache: &mut Cache,
    mapping: &NetworkMapping,
    remapper: &dyn DnsRemap,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for entry in cache.entries_mut() {
        let Some(new_address) = mapping.get(&entry.network_name) else {
            error!(
                network = %entry.network_name,
                name = %entry.display_name,
                "Network not found in the current mapping, leaving entry untouched"
            );
            report.outcomes.push(EntryOutcome::Failed {
                network_name: entry.network_name.clone(),
                error: Error::network_not_observed(&entry.network_name),
            });
            continue;
        };

        if new_address == entry.last_address {
            info!(
                "Skipping {} ({} = {} remains unchanged)",
                entry.display_name, entry.network_name, entry.last_address
            );
            report.outcomes.push(EntryOutcome::Unchanged {
                network_name: entry.network_name.clone(),
                address: entry.last_address.clone(),
            });
            continue;
        }

        if !entry.has_address() {
            info!(
                "Caching address {} for {} ({})",
                new_address, entry.display_name, entry.network_name
            );
            entry.last_address = new_address.to_string();
            report.outcomes.push(EntryOutcome::FirstSeen {
                network_name: entry.network_name.clone(),
                address: entry.last_address.clone(),
            });
            continue;
        }

        info!(
            "Remapping {} ({}): {} => {} via {}",
            entry.display_name,
            entry.network_name,
            entry.last_address,
            new_address,
            remapper.provider_name()
        );

        match remapper.remap(&entry.last_address, new_address).await {
            Ok(summary) => {
                if summary.is_empty() {
                    warn!(
                        network = %entry.network_name,
                        "No records found for {}", entry.last_address
                    );
                } else {
                    debug!(
                        network = %entry.network_name,
                        records = ?summary.updated,
                        "Remapped {} record(s)", summary.updated.len()
                    );
                }

                let old_address =
                    std::mem::replace(&mut entry.last_address, new_address.to_string());
                report.outcomes.push(EntryOutcome::Remapped {
                    network_name: entry.network_name.clone(),
                    old_address,
                    new_address: new_address.to_string(),
                    summary,
                });
            }
            Err(e) => {
                let error = Error::remap(
                    &entry.network_name,
                    &entry.last_address,
                    new_address,
                    e.to_string(),
                );
                error!("{}", error);
                report.outcomes.push(EntryOutcome::Failed {
                    network_name: entry.network_name.clone(),
                    error,
                });
            }
        }
    }

    info!(
        unchanged = report.unchanged_count(),
        first_seen = report.first_seen_count(),
        remapped = report.remapped_count(),
        failed = report.failure_count(),
        "Reconciliation finished"
    );

    report
}

/// Pin `network_name` into the cache against its current address
///
/// `display_name` defaults to the network name. An existing entry for the
/// network is updated in place; otherwise a new entry is appended. The
/// recorded address counts as already seen, so the next run will not treat
/// it as first-seen.
///
/// Fails with [`Error::NetworkNotObserved`] when the network is absent from
/// the mapping, leaving the cache untouched.
pub fn add_mapping(
    cache: &mut Cache,
    mapping: &NetworkMapping,
    network_name: &str,
    display_name: Option<&str>,
) -> Result<Upsert, Error> {
    let address = mapping
        .get(network_name)
        .ok_or_else(|| Error::network_not_observed(network_name))?;
    let display_name = display_name.unwrap_or(network_name);

    let upsert = cache.upsert(display_name, network_name, address);
    match upsert {
        Upsert::Updated => info!("{} already in cache, updated to {}", network_name, address),
        Upsert::Inserted => info!("Added {} ({}) = {}", display_name, network_name, address),
    }

    Ok(upsert)
}
