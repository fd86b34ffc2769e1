//! Batch resolution of address records into destinations.
//!
//! # Processing order
//!
//! Records are resolved strictly one at a time in input order.  The next
//! geocoding call is not issued until the previous one has returned (or
//! timed out), which keeps the load on the geocoding service bounded and
//! the output a stable filter of the input.
//!
//! # Timeouts and cancellation
//!
//! With [`ResolverConfig::call_timeout`] set, each call runs on a helper
//! thread and the resolver waits on a channel for at most that long.  A call
//! that overruns counts as a failed record.  Its thread cannot be stopped:
//! it keeps running, and its result is dropped with the channel when it
//! finally returns.  While [`ResolverConfig::max_abandoned_calls`] such
//! threads are still running, further records are skipped with
//! [`GeocodeError::Saturated`] instead of starting another call.
//!
//! A [`CancelToken`] is checked before every record and again after every
//! call.  Once cancelled, no further calls are issued, the in-flight result
//! is discarded, and the report is returned with `cancelled = true`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use wp_core::Coordinate;

use crate::{AddressRecord, GeocodeError, GeocodeResult, Geocoder, ResolvedDestination};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Tuning knobs for [`GeocodeResolver`].
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Upper bound on a single geocoding call.  `None` waits indefinitely.
    pub call_timeout: Option<Duration>,

    /// Timed-out calls allowed to keep running in the background before
    /// new calls are refused.  Only used with a `call_timeout`.
    pub max_abandoned_calls: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            call_timeout:        None,
            max_abandoned_calls: 4,
        }
    }
}

// ── Cancellation ──────────────────────────────────────────────────────────────

/// Shared flag that stops a running batch at the next record boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Why a record was left out of the destination set.
#[derive(Debug)]
pub enum SkipReason {
    /// The geocoding call returned an error (including a timeout).
    Failed(GeocodeError),
    /// The call succeeded but produced no candidates.
    NoCandidates,
    /// The first candidate was NaN or out of range.
    InvalidCandidate(Coordinate),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Failed(e)           => write!(f, "{e}"),
            SkipReason::NoCandidates        => f.write_str("no geocoding candidates"),
            SkipReason::InvalidCandidate(c) => write!(f, "invalid candidate {c}"),
        }
    }
}

/// A record that did not resolve, with its position in the input batch.
#[derive(Debug)]
pub struct SkippedRecord {
    pub index:  usize,
    pub record: AddressRecord,
    pub reason: SkipReason,
}

/// Outcome of one batch.
#[derive(Debug, Default)]
pub struct ResolveReport {
    /// Successfully resolved records, in input order.
    pub destinations: Vec<ResolvedDestination>,
    /// Records that were dropped, in input order.
    pub skipped:      Vec<SkippedRecord>,
    /// Number of records taken up before the batch ended.  Includes records
    /// refused with [`GeocodeError::Saturated`] without a call.
    pub attempted:    usize,
    /// `true` if the batch stopped early on a [`CancelToken`].
    pub cancelled:    bool,
}

impl ResolveReport {
    pub fn resolved_count(&self) -> usize {
        self.destinations.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

// ── GeocodeResolver ───────────────────────────────────────────────────────────

/// Sequential, failure-tolerant batch geocoder.
///
/// # Type parameter
///
/// `G` is the geocoding backend.  It is held in an `Arc` so that a call can
/// be handed to a helper thread when a timeout is configured.
pub struct GeocodeResolver<G: Geocoder + 'static> {
    geocoder: Arc<G>,
    config:   ResolverConfig,
    cancel:   CancelToken,
    /// Helper threads whose geocoding call has not returned yet.
    running:  Arc<AtomicUsize>,
}

impl<G: Geocoder + 'static> GeocodeResolver<G> {
    pub fn new(geocoder: G) -> Self {
        Self::from_shared(Arc::new(geocoder))
    }

    /// Build from a geocoder the caller keeps a handle to.
    pub fn from_shared(geocoder: Arc<G>) -> Self {
        Self {
            geocoder,
            config:  ResolverConfig::default(),
            cancel:  CancelToken::new(),
            running: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Observe `token` instead of the resolver's private one.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that cancels this resolver's batches.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Resolve every record, skipping the ones that fail.
    ///
    /// Never returns an error: per-record failures are contained in
    /// [`ResolveReport::skipped`].
    pub fn resolve(&self, records: Vec<AddressRecord>) -> ResolveReport {
        let total = records.len();
        let mut report = ResolveReport {
            destinations: Vec::with_capacity(total),
            ..ResolveReport::default()
        };

        for (index, record) in records.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            report.attempted += 1;
            let outcome = self.call(&record.pickup_address);

            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            match first_usable(outcome) {
                Ok(coordinate) => {
                    debug!("resolved record {index} to {coordinate}");
                    report.destinations.push(ResolvedDestination { record, coordinate });
                }
                Err(reason) => {
                    warn!(
                        "skipping record {index} ({:?}): {reason}",
                        record.pickup_address
                    );
                    report.skipped.push(SkippedRecord { index, record, reason });
                }
            }
        }

        if report.cancelled {
            info!(
                "geocoding cancelled after {} of {total} records",
                report.attempted
            );
        } else {
            info!(
                "geocoded {total} records: {} resolved, {} skipped",
                report.resolved_count(),
                report.skipped_count()
            );
        }

        report
    }

    /// Timed-out calls whose helper thread is still running.
    pub fn abandoned_calls(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// One geocoding call, bounded by `call_timeout` when set.
    ///
    /// A call that times out is abandoned, not stopped: its helper thread
    /// keeps running until the geocoder returns.
    fn call(&self, address: &str) -> GeocodeResult<Vec<Coordinate>> {
        let Some(limit) = self.config.call_timeout else {
            return self.geocoder.geocode(address);
        };

        // Calls are awaited one at a time, so every running helper here
        // belongs to an abandoned call.
        let abandoned = self.running.load(Ordering::SeqCst);
        if abandoned >= self.config.max_abandoned_calls {
            return Err(GeocodeError::Saturated(abandoned));
        }

        let (tx, rx) = mpsc::channel();
        let geocoder = Arc::clone(&self.geocoder);
        let address = address.to_owned();
        let running = RunningGuard::enter(&self.running);
        thread::Builder::new()
            .name("wp-geocode-call".into())
            .spawn(move || {
                let result = geocoder.geocode(&address);
                // Released before the send so the resolver never sees a
                // finished call as still running.
                drop(running);
                // The receiver is gone if the call overran; nothing to do.
                let _ = tx.send(result);
            })?;

        match rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(GeocodeError::Timeout(limit)),
            Err(RecvTimeoutError::Disconnected) => {
                Err(GeocodeError::Service("geocoding call panicked".into()))
            }
        }
    }
}

/// Counts a helper thread as running until dropped, even if the geocoder
/// panics.
struct RunningGuard(Arc<AtomicUsize>);

impl RunningGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Resolve `records` sequentially with `geocoder`, dropping failures.
///
/// This is the plain form of [`GeocodeResolver::resolve`]: no timeout, no
/// cancellation, and only the resolved destinations are returned.  Skips are
/// still logged.
pub fn resolve_all<G>(records: Vec<AddressRecord>, geocoder: &G) -> Vec<ResolvedDestination>
where
    G: Geocoder + ?Sized,
{
    let mut out = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match first_usable(geocoder.geocode(&record.pickup_address)) {
            Ok(coordinate) => out.push(ResolvedDestination { record, coordinate }),
            Err(reason) => warn!(
                "skipping record {index} ({:?}): {reason}",
                record.pickup_address
            ),
        }
    }
    out
}

fn first_usable(outcome: GeocodeResult<Vec<Coordinate>>) -> Result<Coordinate, SkipReason> {
    let candidates = outcome.map_err(SkipReason::Failed)?;
    let first = *candidates.first().ok_or(SkipReason::NoCandidates)?;
    if first.is_valid() {
        Ok(first)
    } else {
        Err(SkipReason::InvalidCandidate(first))
    }
}
