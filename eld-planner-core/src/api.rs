//! Planning-service client.

use crate::bridge::TripList;
use crate::form::TripPlanRequest;
use crate::http::{HttpClient, HttpRequest, HttpResponse, join_url};
use crate::trip::TripPlanResult;
use chrono::NaiveDate;
use futures::future::try_join_all;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// User-facing operations whose failures are reported with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerOperation {
    PlanTrip,
    DownloadPdf,
    LoadHistory,
    DeleteTrip,
    ClearHistory,
}

impl PlannerOperation {
    #[must_use]
    pub const fn fallback_message(self) -> &'static str {
        match self {
            Self::PlanTrip => "Failed to calculate trip plan",
            Self::DownloadPdf => {
                "Failed to download PDF. Please check your connection and try again."
            }
            Self::LoadHistory => "Failed to load trip history. Please try again.",
            Self::DeleteTrip => "Failed to delete trip. Please try again.",
            Self::ClearHistory => "Failed to clear all history. Please try again.",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlannerError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("planning service answered HTTP {status}")]
    Status {
        status: u16,
        /// The `error` field of a JSON error body, when present.
        message: Option<String>,
    },
    #[error("unexpected planning service response: {0}")]
    Decode(String),
}

impl PlannerError {
    /// Text to show the user for a failed `operation`.
    ///
    /// A server-provided error is shown verbatim (prefixed for PDF downloads).
    #[must_use]
    pub fn user_message(&self, operation: PlannerOperation) -> String {
        match (self, operation) {
            (Self::Status { message: Some(msg), .. }, PlannerOperation::DownloadPdf) => {
                format!("Failed to download PDF. {msg}")
            }
            (Self::Status { message: None, .. }, PlannerOperation::DownloadPdf) => {
                "Failed to download PDF. Please try again.".to_string()
            }
            (Self::Status { message: Some(msg), .. }, PlannerOperation::PlanTrip) => msg.clone(),
            _ => operation.fallback_message().to_string(),
        }
    }

    fn from_response(response: &HttpResponse) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            error: Option<String>,
        }
        let message = response
            .json::<ErrorBody>()
            .ok()
            .and_then(|body| body.error)
            .filter(|msg| !msg.is_empty());
        Self::Status {
            status: response.status,
            message,
        }
    }
}

/// `ELD_Logs_{trip_id}_{YYYY-MM-DD}.pdf`
#[must_use]
pub fn pdf_file_name(trip_id: &str, date: NaiveDate) -> String {
    format!("ELD_Logs_{trip_id}_{}.pdf", date.format("%Y-%m-%d"))
}

pub struct PlannerClient<H> {
    http: H,
    base_url: String,
}

impl<H: HttpClient> PlannerClient<H> {
    pub fn new(http: H, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, PlannerError> {
        log::debug!("{} {}", request.method.as_str(), request.url);
        let response = self
            .http
            .send(request)
            .await
            .map_err(|err| PlannerError::Transport(err.0))?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(PlannerError::from_response(&response))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PlannerError> {
        let response = self
            .send(HttpRequest::get(join_url(&self.base_url, path)))
            .await?;
        response
            .json()
            .map_err(|err| PlannerError::Decode(err.to_string()))
    }

    /// `POST /trips/plan/`
    ///
    /// # Errors
    ///
    /// Any [`PlannerError`]; the caller keeps its form state.
    pub async fn plan_trip(&self, request: &TripPlanRequest) -> Result<TripPlanResult, PlannerError> {
        let body =
            serde_json::to_string(request).map_err(|err| PlannerError::Decode(err.to_string()))?;
        let response = self
            .send(HttpRequest::post_json(
                join_url(&self.base_url, "trips/plan/"),
                body,
            ))
            .await?;
        response
            .json()
            .map_err(|err| PlannerError::Decode(err.to_string()))
    }

    /// `GET /trips/{id}/`
    ///
    /// # Errors
    ///
    /// Any [`PlannerError`].
    pub async fn get_trip(&self, trip_id: &str) -> Result<TripPlanResult, PlannerError> {
        self.get_json(&format!("trips/{}/", urlencoding::encode(trip_id)))
            .await
    }

    /// `GET /trips/list/?limit=N`
    ///
    /// # Errors
    ///
    /// Any [`PlannerError`].
    pub async fn list_trips(&self, limit: u32) -> Result<TripList, PlannerError> {
        self.get_json(&format!("trips/list/?limit={limit}")).await
    }

    /// `DELETE /trips/{id}/delete/`
    ///
    /// # Errors
    ///
    /// Any [`PlannerError`].
    pub async fn delete_trip(&self, trip_id: &str) -> Result<(), PlannerError> {
        let url = join_url(
            &self.base_url,
            &format!("trips/{}/delete/", urlencoding::encode(trip_id)),
        );
        self.send(HttpRequest::delete(url)).await.map(drop)
    }

    /// Delete every listed trip concurrently; the first failure wins.
    ///
    /// # Errors
    ///
    /// The first [`PlannerError`] encountered.
    pub async fn delete_trips<'a, I>(&self, trip_ids: I) -> Result<(), PlannerError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        try_join_all(trip_ids.into_iter().map(|id| self.delete_trip(id)))
            .await
            .map(drop)
    }

    /// `GET /trips/{id}/eld-pdf/` as raw bytes.
    ///
    /// # Errors
    ///
    /// Any [`PlannerError`].
    pub async fn download_eld_pdf(&self, trip_id: &str) -> Result<Vec<u8>, PlannerError> {
        let url = join_url(
            &self.base_url,
            &format!("trips/{}/eld-pdf/", urlencoding::encode(trip_id)),
        );
        Ok(self.send(HttpRequest::get(url)).await?.body)
    }

    /// `GET /health/`
    ///
    /// # Errors
    ///
    /// Any [`PlannerError`].
    pub async fn health_check(&self) -> Result<Value, PlannerError> {
        self.get_json("health/").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status: code,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn server_error_text_is_surfaced() {
        let err = PlannerError::from_response(&status(400, r#"{"error": "Pickup is unreachable"}"#));
        assert_eq!(
            err.user_message(PlannerOperation::PlanTrip),
            "Pickup is unreachable"
        );
        assert_eq!(
            err.user_message(PlannerOperation::DownloadPdf),
            "Failed to download PDF. Pickup is unreachable"
        );
        assert_eq!(
            err.user_message(PlannerOperation::DeleteTrip),
            "Failed to delete trip. Please try again."
        );
    }

    #[test]
    fn fallback_messages_apply_without_server_text() {
        let err = PlannerError::from_response(&status(500, "Internal Server Error"));
        assert_eq!(
            err,
            PlannerError::Status {
                status: 500,
                message: None
            }
        );
        assert_eq!(
            err.user_message(PlannerOperation::PlanTrip),
            "Failed to calculate trip plan"
        );
        assert_eq!(
            err.user_message(PlannerOperation::DownloadPdf),
            "Failed to download PDF. Please try again."
        );
        let offline = PlannerError::Transport("refused".into());
        assert_eq!(
            offline.user_message(PlannerOperation::DownloadPdf),
            "Failed to download PDF. Please check your connection and try again."
        );
        assert_eq!(
            offline.user_message(PlannerOperation::LoadHistory),
            "Failed to load trip history. Please try again."
        );
    }

    #[test]
    fn pdf_name_embeds_trip_and_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(pdf_file_name("65a1f0c2", date), "ELD_Logs_65a1f0c2_2024-03-09.pdf");
    }
}
