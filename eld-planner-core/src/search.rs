//! Debounced address search for the three location fields.
//!
//! Every keystroke is recorded synchronously. Queries long enough to search
//! return a [`PendingSearch`] that the caller drives with
//! [`SearchController::run`]: it waits out the quiet period, and a newer
//! keystroke on the same field cancels that wait outright. Otherwise it issues
//! one geocode request tagged with the field's next sequence number. A
//! response is applied only while that number is still the field's latest.

use crate::config::SearchConfig;
use crate::location::{GeocodeCandidate, LocationField, LocationInput};
use async_trait::async_trait;
use futures::channel::oneshot;
use futures::future::{self, Either};
use std::cell::RefCell;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    #[error("geocoder unreachable: {0}")]
    Transport(String),
    #[error("geocoder answered HTTP {0}")]
    Status(u16),
    #[error("geocoder payload malformed: {0}")]
    Malformed(String),
}

#[async_trait(?Send)]
pub trait Geocoder {
    /// Resolve free text to at most `limit` ranked candidates.
    ///
    /// # Errors
    ///
    /// Any [`GeocodeError`]; callers treat every failure as "no suggestions".
    async fn search(&self, query: &str, limit: usize)
    -> Result<Vec<GeocodeCandidate>, GeocodeError>;
}

#[async_trait(?Send)]
impl<T: Geocoder + ?Sized> Geocoder for std::rc::Rc<T> {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        (**self).search(query, limit).await
    }
}

/// Suspension used for the debounce quiet period.
///
/// Dropping the returned future must release the underlying timer.
#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}

/// [`Timer`] backed by the tokio clock.
#[cfg(feature = "tokio")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[cfg(feature = "tokio")]
#[async_trait(?Send)]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Search state of one location field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSession {
    query: String,
    keystroke: u64,
    pending_request_id: u64,
    candidates: Vec<GeocodeCandidate>,
    suggestions_visible: bool,
}

impl SearchSession {
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Sequence number of the latest issued request; only its response applies.
    #[must_use]
    pub const fn pending_request_id(&self) -> u64 {
        self.pending_request_id
    }

    #[must_use]
    pub fn candidates(&self) -> &[GeocodeCandidate] {
        &self.candidates
    }

    #[must_use]
    pub const fn suggestions_visible(&self) -> bool {
        self.suggestions_visible
    }

    fn hide(&mut self) {
        self.candidates.clear();
        self.suggestions_visible = false;
    }

    // Advancing the sequence without issuing a request orphans anything in flight.
    fn supersede_in_flight(&mut self) {
        self.pending_request_id += 1;
    }
}

/// A debounced search waiting for its quiet period to elapse.
#[derive(Debug)]
#[must_use = "a pending search does nothing until it is run"]
pub struct PendingSearch {
    pub field: LocationField,
    pub query: String,
    keystroke: u64,
    // Resolves (as canceled) once the field sees another keystroke.
    superseded: oneshot::Receiver<()>,
}

/// What became of one [`PendingSearch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A newer keystroke arrived before the quiet period ended; nothing was sent.
    Debounced,
    /// The response arrived after a newer request was issued and was dropped.
    Stale,
    /// Candidates were applied and suggestions shown.
    Applied(usize),
    /// The provider found nothing; suggestions hidden.
    Empty,
    /// The provider failed; suggestions hidden, error swallowed.
    Failed,
}

pub struct SearchController<G, T> {
    geocoder: G,
    timer: T,
    config: SearchConfig,
    sessions: RefCell<[SearchSession; 3]>,
    debounces: RefCell<[Option<oneshot::Sender<()>>; 3]>,
}

impl<G: Geocoder, T: Timer> SearchController<G, T> {
    pub fn new(geocoder: G, timer: T, config: SearchConfig) -> Self {
        Self {
            geocoder,
            timer,
            config,
            sessions: RefCell::new(Default::default()),
            debounces: RefCell::new(Default::default()),
        }
    }

    #[must_use]
    pub const fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Snapshot of a field's session.
    #[must_use]
    pub fn session(&self, field: LocationField) -> SearchSession {
        self.sessions.borrow()[field.index()].clone()
    }

    // Dropping the sender wakes the field's waiting search.
    fn cancel_debounce(&self, field: LocationField) {
        self.debounces.borrow_mut()[field.index()].take();
    }

    /// Record a keystroke. Short queries clear the field's suggestions at once;
    /// longer ones return a search to be driven with [`Self::run`].
    pub fn on_query_change(&self, field: LocationField, text: &str) -> Option<PendingSearch> {
        let mut sessions = self.sessions.borrow_mut();
        let session = &mut sessions[field.index()];
        session.query = text.to_string();
        session.keystroke += 1;
        self.cancel_debounce(field);

        if text.chars().count() < self.config.min_query_chars {
            session.supersede_in_flight();
            session.hide();
            return None;
        }

        let (cancel, superseded) = oneshot::channel();
        self.debounces.borrow_mut()[field.index()] = Some(cancel);
        Some(PendingSearch {
            field,
            query: text.to_string(),
            keystroke: session.keystroke,
            superseded,
        })
    }

    /// Wait out the debounce window, then issue and apply the request if this
    /// search is still the field's latest. A newer keystroke ends the wait at
    /// once and drops the timer.
    pub async fn run(&self, pending: PendingSearch) -> SearchOutcome {
        let PendingSearch {
            field,
            query,
            keystroke,
            superseded,
        } = pending;
        let quiet = self.timer.sleep(self.config.debounce());
        if let Either::Right(_) = future::select(quiet, superseded).await {
            return SearchOutcome::Debounced;
        }

        let request_id = {
            let mut sessions = self.sessions.borrow_mut();
            let session = &mut sessions[field.index()];
            if session.keystroke != keystroke {
                return SearchOutcome::Debounced;
            }
            session.pending_request_id += 1;
            session.pending_request_id
        };

        log::debug!("geocode request #{request_id} for {field} field: {query:?}");
        let response = self
            .geocoder
            .search(&query, self.config.result_limit)
            .await;

        let mut sessions = self.sessions.borrow_mut();
        let session = &mut sessions[field.index()];
        if session.pending_request_id != request_id {
            log::debug!("dropping stale geocode response #{request_id} for {field} field");
            return SearchOutcome::Stale;
        }

        match response {
            Ok(candidates) if !candidates.is_empty() => {
                let count = candidates.len();
                session.candidates = candidates;
                session.suggestions_visible = true;
                SearchOutcome::Applied(count)
            }
            Ok(_) => {
                session.hide();
                SearchOutcome::Empty
            }
            Err(err) => {
                log::warn!("address search failed for {field} field: {err}");
                session.hide();
                SearchOutcome::Failed
            }
        }
    }

    /// Commit a candidate: the returned input replaces the field's location and
    /// the field's suggestions are cleared.
    pub fn select_candidate(
        &self,
        field: LocationField,
        candidate: &GeocodeCandidate,
    ) -> LocationInput {
        let mut sessions = self.sessions.borrow_mut();
        let session = &mut sessions[field.index()];
        session.query.clone_from(&candidate.freeform_address);
        session.keystroke += 1;
        self.cancel_debounce(field);
        session.supersede_in_flight();
        session.hide();
        LocationInput::from_candidate(candidate)
    }

    /// Hide a field's suggestion list without touching its query.
    pub fn dismiss(&self, field: LocationField) {
        self.sessions.borrow_mut()[field.index()].suggestions_visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use std::cell::Cell;

    struct InstantTimer;

    #[async_trait(?Send)]
    impl Timer for InstantTimer {
        async fn sleep(&self, _duration: Duration) {}
    }

    /// Never fires; only cancellation can end the wait.
    struct StuckTimer;

    #[async_trait(?Send)]
    impl Timer for StuckTimer {
        async fn sleep(&self, _duration: Duration) {
            future::pending::<()>().await;
        }
    }

    struct CountingGeocoder {
        calls: Cell<usize>,
    }

    impl CountingGeocoder {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
            }
        }
    }

    #[async_trait(?Send)]
    impl Geocoder for CountingGeocoder {
        async fn search(
            &self,
            query: &str,
            _limit: usize,
        ) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
            self.calls.set(self.calls.get() + 1);
            Ok(vec![GeocodeCandidate {
                coordinate: Coordinate::new(1.0, 2.0).unwrap(),
                freeform_address: query.to_string(),
                country: "US".into(),
            }])
        }
    }

    fn controller() -> SearchController<CountingGeocoder, InstantTimer> {
        SearchController::new(CountingGeocoder::new(), InstantTimer, SearchConfig::default())
    }

    #[test]
    fn short_queries_never_schedule() {
        let ctl = controller();
        for text in ["", "a", "ab", "é1"] {
            assert!(ctl.on_query_change(LocationField::Pickup, text).is_none());
            let session = ctl.session(LocationField::Pickup);
            assert!(!session.suggestions_visible());
            assert!(session.candidates().is_empty());
            assert_eq!(session.query(), text);
        }
        assert_eq!(ctl.geocoder.calls.get(), 0);
    }

    #[test]
    fn superseded_pending_search_is_debounced() {
        let ctl = controller();
        let first = ctl.on_query_change(LocationField::Current, "Chic").unwrap();
        let second = ctl.on_query_change(LocationField::Current, "Chicago").unwrap();

        let first_outcome = futures::executor::block_on(ctl.run(first));
        assert_eq!(first_outcome, SearchOutcome::Debounced);
        let second_outcome = futures::executor::block_on(ctl.run(second));
        assert_eq!(second_outcome, SearchOutcome::Applied(1));
        assert_eq!(ctl.geocoder.calls.get(), 1);
        assert_eq!(
            ctl.session(LocationField::Current).candidates()[0].freeform_address,
            "Chicago"
        );
    }

    #[test]
    fn newer_keystroke_cancels_the_wait_without_the_timer() {
        let ctl = SearchController::new(CountingGeocoder::new(), StuckTimer, SearchConfig::default());
        let waiting = ctl.on_query_change(LocationField::Dropoff, "Spring").unwrap();
        let newer = ctl.on_query_change(LocationField::Dropoff, "Springfield");
        assert!(newer.is_some());
        assert_eq!(
            futures::executor::block_on(ctl.run(waiting)),
            SearchOutcome::Debounced
        );

        let waiting = ctl.on_query_change(LocationField::Pickup, "Denver").unwrap();
        let candidate = GeocodeCandidate {
            coordinate: Coordinate::new(39.74, -104.99).unwrap(),
            freeform_address: "Denver, CO".into(),
            country: "US".into(),
        };
        ctl.select_candidate(LocationField::Pickup, &candidate);
        assert_eq!(
            futures::executor::block_on(ctl.run(waiting)),
            SearchOutcome::Debounced
        );
        assert_eq!(ctl.geocoder.calls.get(), 0);
    }

    #[test]
    fn dismiss_hides_without_clearing_query() {
        let ctl = controller();
        let pending = ctl.on_query_change(LocationField::Dropoff, "Denver").unwrap();
        futures::executor::block_on(ctl.run(pending));
        ctl.dismiss(LocationField::Dropoff);
        let session = ctl.session(LocationField::Dropoff);
        assert!(!session.suggestions_visible());
        assert_eq!(session.query(), "Denver");
    }
}
