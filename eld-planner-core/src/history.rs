//! Locally held list of stored trips.

use crate::api::{PlannerClient, PlannerError};
use crate::bridge::{BridgeError, HistoryRecord, TripView};
use crate::http::HttpClient;

/// History records as last loaded, kept in sync with deletions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryBook {
    records: Vec<HistoryRecord>,
}

impl HistoryBook {
    #[must_use]
    pub const fn new(records: Vec<HistoryRecord>) -> Self {
        Self { records }
    }

    /// Fetch the newest `limit` records.
    ///
    /// # Errors
    ///
    /// Any [`PlannerError`] from the listing call.
    pub async fn load<H: HttpClient>(
        client: &PlannerClient<H>,
        limit: u32,
    ) -> Result<Self, PlannerError> {
        let list = client.list_trips(limit).await?;
        log::debug!("loaded {} history records", list.trips.len());
        Ok(Self::new(list.trips))
    }

    #[must_use]
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&HistoryRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Open a stored trip in the results view.
    ///
    /// # Errors
    ///
    /// Returns `None` for an unknown id, or the [`BridgeError`] for a bad record.
    pub fn view(&self, id: &str) -> Option<Result<TripView, BridgeError>> {
        self.get(id)
            .cloned()
            .map(TripView::from_history_record)
    }

    /// Drop a record locally. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        self.records.len() != before
    }

    /// Delete on the service, then locally.
    ///
    /// # Errors
    ///
    /// Any [`PlannerError`]; the local list is left untouched.
    pub async fn delete<H: HttpClient>(
        &mut self,
        client: &PlannerClient<H>,
        id: &str,
    ) -> Result<(), PlannerError> {
        client.delete_trip(id).await?;
        self.remove(id);
        Ok(())
    }

    /// Delete every record, then empty the list.
    ///
    /// # Errors
    ///
    /// The first [`PlannerError`]; the local list is left untouched.
    pub async fn clear<H: HttpClient>(
        &mut self,
        client: &PlannerClient<H>,
    ) -> Result<(), PlannerError> {
        client
            .delete_trips(self.records.iter().map(|record| record.id.as_str()))
            .await?;
        self.records.clear();
        Ok(())
    }
}
