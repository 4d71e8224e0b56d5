//! Fetch coordination: admission gates, cache consultation, remote fetch
//! lifecycle, and projection publishing.
//!
//! The coordinator owns the entity store, the region cache, and all
//! session gate state. Its run loop is the single update context: remote
//! fetches run as spawned tasks and deliver their results back over a
//! channel, so no state mutation ever happens off the loop.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use futures::future;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::cache::{CachedRegion, RegionCache, RegionCacheConfig};
use crate::coord::{LatLon, ViewportSpan};
use crate::fetch::config::FetchConfig;
use crate::fetch::gates::{MovementGate, RateLimiter, ZoomGate};
use crate::poi::{Poi, PoiId};
use crate::position::{PositionFix, PositionProvider};
use crate::provider::{ExtendedDataSource, FetchError, PoiSource};
use crate::status::SharedEngineStatus;
use crate::store::EntityStore;
use crate::view::{self, FilterPredicate};

/// Capacity of the fetch-completion channel.
const OUTCOME_CHANNEL_CAPACITY: usize = 8;

/// Progress fraction published after a forced refresh clears state.
const PROGRESS_RESET: f64 = 1.0 / 3.0;
/// Progress fraction published when the forced fetch returns.
const PROGRESS_FETCHED: f64 = 2.0 / 3.0;
/// Progress fraction published once the forced batch is merged.
const PROGRESS_COMPLETE: f64 = 1.0;
/// Progress fraction for an idle engine.
const PROGRESS_IDLE: f64 = 0.0;

/// Commands accepted by the engine.
pub enum EngineCommand {
    /// The visible map region moved or resized.
    ViewportChanged {
        /// Center of the new viewport.
        center: LatLon,
        /// Extent of the new viewport.
        span: ViewportSpan,
    },
    /// Discard all cached state and refetch around the given center.
    ForceRefresh {
        /// Center to refetch around.
        center: LatLon,
    },
    /// Set the active search query.
    SetSearch(String),
    /// Clear the active search query and its results.
    ClearSearch,
    /// Install a display filter predicate.
    SetFilter(FilterPredicate),
    /// Remove the display filter.
    ClearFilters,
}

impl fmt::Debug for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ViewportChanged { center, span } => f
                .debug_struct("ViewportChanged")
                .field("center", center)
                .field("span", span)
                .finish(),
            Self::ForceRefresh { center } => f
                .debug_struct("ForceRefresh")
                .field("center", center)
                .finish(),
            Self::SetSearch(query) => f.debug_tuple("SetSearch").field(query).finish(),
            Self::ClearSearch => write!(f, "ClearSearch"),
            Self::SetFilter(_) => write!(f, "SetFilter(..)"),
            Self::ClearFilters => write!(f, "ClearFilters"),
        }
    }
}

/// Completion message delivered by a spawned fetch task.
#[derive(Debug)]
struct FetchOutcome {
    center: LatLon,
    forced: bool,
    token: CancellationToken,
    result: Result<Vec<Poi>, FetchError>,
}

/// Bookkeeping for the single fetch allowed in flight.
#[derive(Debug)]
struct InFlightFetch {
    token: CancellationToken,
    forced: bool,
}

/// Coordinates POI fetching between the region cache, the entity store,
/// and the remote source.
pub struct FetchCoordinator {
    config: FetchConfig,
    store: EntityStore,
    cache: RegionCache,
    rate_limiter: RateLimiter,
    movement_gate: MovementGate,
    zoom_gate: ZoomGate,
    poi_source: Option<Arc<dyn PoiSource>>,
    extended_data: Option<Arc<dyn ExtendedDataSource>>,
    position_provider: Option<Arc<dyn PositionProvider>>,
    status: Option<Arc<SharedEngineStatus>>,
    geocode_tx: Option<mpsc::Sender<LatLon>>,
    outcome_tx: mpsc::Sender<FetchOutcome>,
    outcome_rx: Option<mpsc::Receiver<FetchOutcome>>,
    in_flight: Option<InFlightFetch>,
    cancel: CancellationToken,
    user_location: Option<LatLon>,
    search_query: Option<String>,
    filter: Option<FilterPredicate>,
    has_completed_fetch: bool,
}

impl FetchCoordinator {
    /// Create a coordinator with no collaborators attached.
    pub fn new(config: FetchConfig, cache_config: RegionCacheConfig) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel(OUTCOME_CHANNEL_CAPACITY);
        Self {
            rate_limiter: RateLimiter::new(config.fetch_cooldown),
            movement_gate: MovementGate::new(config.movement_threshold_m),
            zoom_gate: ZoomGate::new(config.max_viewport_span),
            cache: RegionCache::new(cache_config),
            store: EntityStore::new(),
            config,
            poi_source: None,
            extended_data: None,
            position_provider: None,
            status: None,
            geocode_tx: None,
            outcome_tx,
            outcome_rx: Some(outcome_rx),
            in_flight: None,
            cancel: CancellationToken::new(),
            user_location: None,
            search_query: None,
            filter: None,
            has_completed_fetch: false,
        }
    }

    /// Attach the remote POI source.
    pub fn with_poi_source(mut self, source: Arc<dyn PoiSource>) -> Self {
        self.poi_source = Some(source);
        self
    }

    /// Attach an extended-data source probed after each fetch.
    pub fn with_extended_data(mut self, source: Arc<dyn ExtendedDataSource>) -> Self {
        self.extended_data = Some(source);
        self
    }

    /// Attach a device position provider.
    pub fn with_position_provider(mut self, provider: Arc<dyn PositionProvider>) -> Self {
        self.position_provider = Some(provider);
        self
    }

    /// Attach the shared status published to the presentation layer.
    pub fn with_status(mut self, status: Arc<SharedEngineStatus>) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach the channel feeding viewport centers to the area-name resolver.
    pub fn with_geocode_channel(mut self, tx: mpsc::Sender<LatLon>) -> Self {
        self.geocode_tx = Some(tx);
        self
    }

    /// Run the coordinator until the token is cancelled.
    ///
    /// Consumes the command channel and the position feed. All state
    /// mutation happens here; fetch tasks only report back.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<EngineCommand>,
        mut positions: broadcast::Receiver<PositionFix>,
        token: CancellationToken,
    ) {
        self.cancel = token.clone();
        let Some(mut outcomes) = self.outcome_rx.take() else {
            warn!("fetch coordinator already running");
            return;
        };

        if let Some(provider) = &self.position_provider {
            if let Some(fix) = provider.position() {
                self.user_location = Some(fix.location);
            }
            if let Some(status) = &self.status {
                status.set_authorization(provider.authorization());
            }
        }

        info!("fetch coordinator started");
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!("fetch coordinator stopping");
                    break;
                }
                Some(outcome) = outcomes.recv() => {
                    self.handle_fetch_outcome(outcome);
                }
                Some(command) = commands.recv() => {
                    self.handle_command(command);
                }
                Ok(fix) = positions.recv() => {
                    self.handle_position_fix(fix);
                }
            }
        }
    }

    /// Dispatch a single engine command.
    pub fn handle_command(&mut self, command: EngineCommand) {
        trace!(?command, "handling command");
        match command {
            EngineCommand::ViewportChanged { center, span } => {
                self.handle_viewport_change(center, span);
            }
            EngineCommand::ForceRefresh { center } => self.handle_force_refresh(center),
            EngineCommand::SetSearch(query) => self.set_search(query),
            EngineCommand::ClearSearch => self.set_search(String::new()),
            EngineCommand::SetFilter(predicate) => self.set_filter(Some(predicate)),
            EngineCommand::ClearFilters => self.set_filter(None),
        }
    }

    /// Handle a viewport movement: feed the area-name resolver, then run
    /// the request pipeline.
    fn handle_viewport_change(&mut self, center: LatLon, span: ViewportSpan) {
        self.notify_resolver(center);
        self.request(center, span);
    }

    /// Admission pipeline for a coordinate-driven request.
    ///
    /// Order: in-flight drop, cooldown, cache lookup, then (on a miss)
    /// zoom and movement gates before a remote fetch is spawned. The
    /// cooldown arms at acceptance, so a request the later gates reject
    /// still consumes the window.
    fn request(&mut self, center: LatLon, span: ViewportSpan) {
        if self.in_flight.is_some() {
            trace!(%center, "fetch already in flight, dropping request");
            return;
        }
        if !self.rate_limiter.try_accept() {
            debug!(%center, "request rejected by fetch cooldown");
            return;
        }

        if let Some(member_ids) = self.cache.lookup(center) {
            let members = member_ids.clone();
            if !self.store.resolve(&members).is_empty() {
                let newly_displayed = self.store.mark_displayed(&members);
                debug!(
                    %center,
                    members = members.len(),
                    newly_displayed,
                    "serving viewport from cached region",
                );
                self.republish();
                return;
            }
            debug!(%center, "cached region resolved no members, treating as miss");
        }

        if !self.zoom_gate.permits(span) {
            debug!(%span, "request rejected by zoom gate");
            return;
        }
        if !self.movement_gate.permits(center) {
            debug!(%center, "request rejected by movement gate");
            return;
        }
        self.spawn_fetch(center, false);
    }

    /// Discard all cached state and refetch unconditionally.
    ///
    /// Cancels any in-flight fetch without awaiting it. A forced refresh
    /// arriving while another one is in flight is ignored.
    fn handle_force_refresh(&mut self, center: LatLon) {
        if let Some(in_flight) = &self.in_flight {
            if in_flight.forced {
                debug!("forced refresh already in flight, ignoring");
                return;
            }
            info!("cancelling in-flight fetch for forced refresh");
            in_flight.token.cancel();
            self.in_flight = None;
        }

        info!(%center, "forced refresh, clearing cached state");
        self.store.clear();
        self.cache.clear();
        self.rate_limiter.reset();
        self.movement_gate.reset();
        self.set_progress(PROGRESS_RESET);
        self.republish();
        self.notify_resolver(center);
        self.spawn_fetch(center, true);
    }

    /// Record a device position fix.
    ///
    /// Every fix updates the location used for display ordering. The
    /// first fix, before any fetch has succeeded, also drives the request
    /// pipeline so the session starts with nearby results.
    fn handle_position_fix(&mut self, fix: PositionFix) {
        self.user_location = Some(fix.location);
        if let (Some(provider), Some(status)) = (&self.position_provider, &self.status) {
            status.set_authorization(provider.authorization());
        }

        if !self.has_completed_fetch && self.in_flight.is_none() {
            info!(location = %fix.location, "position fix before first fetch, requesting POIs");
            self.notify_resolver(fix.location);
            self.request(fix.location, ViewportSpan::default());
        } else {
            self.republish();
        }
    }

    /// Apply a completed fetch on the update context.
    ///
    /// Outcomes from cancelled fetches are dropped. Merges re-check the
    /// live displayed set, so a completion that lands after a forced
    /// refresh cannot resurrect cleared state.
    fn handle_fetch_outcome(&mut self, outcome: FetchOutcome) {
        if outcome.token.is_cancelled() {
            debug!(center = %outcome.center, "dropping completion of a cancelled fetch");
            return;
        }
        self.in_flight = None;
        self.set_loading(false);

        match outcome.result {
            Ok(batch) => {
                if outcome.forced {
                    self.set_progress(PROGRESS_FETCHED);
                }
                let batch_len = batch.len();
                let member_ids: HashSet<PoiId> = batch.iter().map(|poi| poi.id).collect();
                let merged = self.store.merge_batch(batch);
                self.cache.insert(CachedRegion::new(
                    outcome.center,
                    self.config.search_radius_m,
                    member_ids,
                ));
                self.movement_gate.record(outcome.center);
                self.has_completed_fetch = true;
                info!(center = %outcome.center, batch_len, merged, "fetch complete");
                if outcome.forced {
                    self.set_progress(PROGRESS_COMPLETE);
                }
                self.republish();
            }
            Err(error) => {
                warn!(center = %outcome.center, %error, "fetch failed, keeping existing results");
                if outcome.forced {
                    self.set_progress(PROGRESS_IDLE);
                }
            }
        }
    }

    /// Spawn the single remote fetch allowed in flight.
    fn spawn_fetch(&mut self, center: LatLon, forced: bool) {
        let Some(source) = self.poi_source.clone() else {
            warn!("no POI source attached, dropping fetch request");
            return;
        };
        let token = self.cancel.child_token();
        self.in_flight = Some(InFlightFetch {
            token: token.clone(),
            forced,
        });
        self.set_loading(true);

        let radius_km = self.config.search_radius_m / 1000.0;
        let extended_data = self.extended_data.clone();
        let probe_limit = self.config.extended_probe_limit;
        let outcome_tx = self.outcome_tx.clone();
        debug!(%center, radius_km, forced, "starting remote fetch");

        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(%center, "fetch cancelled");
                    return;
                }
                result = source.fetch_nearby(center, radius_km) => result,
            };
            let result = match result {
                Ok(mut batch) => {
                    if let Some(source) = &extended_data {
                        probe_extended_data(source.as_ref(), &mut batch, probe_limit).await;
                    }
                    Ok(batch)
                }
                Err(error) => Err(error),
            };
            if token.is_cancelled() {
                debug!(%center, "fetch cancelled, discarding batch");
                return;
            }
            let outcome = FetchOutcome {
                center,
                forced,
                token,
                result,
            };
            if outcome_tx.send(outcome).await.is_err() {
                debug!("coordinator gone, dropping fetch result");
            }
        });
    }

    fn set_search(&mut self, query: String) {
        self.search_query = if query.trim().is_empty() {
            debug!("search cleared");
            None
        } else {
            debug!(%query, "search updated");
            Some(query)
        };
        self.republish();
    }

    fn set_filter(&mut self, predicate: Option<FilterPredicate>) {
        debug!(active = predicate.is_some(), "filter updated");
        self.filter = predicate;
        self.republish();
    }

    /// Forward a viewport center to the area-name resolver, if attached.
    fn notify_resolver(&self, center: LatLon) {
        if let Some(tx) = &self.geocode_tx {
            if tx.try_send(center).is_err() {
                trace!("area-name channel full, dropping viewport center");
            }
        }
    }

    /// Publish the current projections to the shared status.
    fn republish(&self) {
        let Some(status) = &self.status else {
            return;
        };

        let mut pois = self.store.displayed();
        if let Some(filter) = &self.filter {
            pois = view::apply_filter(&pois, filter);
        }
        view::order_for_display(&mut pois, self.user_location);
        status.set_filter_active(self.filter.is_some());

        match &self.search_query {
            Some(query) => {
                let results = view::search(&self.store.displayed(), query, self.user_location);
                status.set_search(query.clone(), results);
            }
            None => status.set_search(String::new(), Vec::new()),
        }
        status.update_pois(pois);
    }

    fn set_loading(&self, loading: bool) {
        if let Some(status) = &self.status {
            status.set_loading(loading);
        }
    }

    fn set_progress(&self, progress: f64) {
        if let Some(status) = &self.status {
            status.set_progress(progress);
        }
    }

    /// Await the next fetch completion. Test-only: production completions
    /// are consumed by [`run`](Self::run).
    #[cfg(test)]
    async fn next_outcome(&mut self) -> Option<FetchOutcome> {
        match self.outcome_rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }
}

/// Probe extended-data availability for the first few batch entries that
/// do not already carry the flag. Probes run concurrently.
async fn probe_extended_data(source: &dyn ExtendedDataSource, batch: &mut [Poi], limit: usize) {
    let candidates: Vec<usize> = batch
        .iter()
        .enumerate()
        .filter(|(_, poi)| !poi.has_extended_data)
        .take(limit)
        .map(|(index, _)| index)
        .collect();
    if candidates.is_empty() {
        return;
    }

    let mut probes = Vec::with_capacity(candidates.len());
    for &index in &candidates {
        probes.push(source.has_extended_data(&batch[index].name));
    }
    let answers = future::join_all(probes).await;

    for (&index, answer) in candidates.iter().zip(answers) {
        batch[index].has_extended_data = answer;
    }
    trace!(probed = candidates.len(), "extended-data probe complete");
}
