use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::database::models::{NewTimeChangeRequest, TimeChangeRequest};
use crate::database::{DatabaseError, Store};
use crate::services::image_upload::ImageService;

/// Time-change request as submitted by the front-end
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeTimeRequest {
    #[serde(rename = "staffID")]
    pub staff_id: Option<String>,
    pub date: Option<String>,
    #[serde(default)]
    pub h1: i32,
    #[serde(default)]
    pub m1: i32,
    #[serde(default)]
    pub h2: i32,
    #[serde(default)]
    pub m2: i32,
    pub wrk_type: Option<String>,
    pub off: Option<String>,
    pub reason: Option<String>,
    /// Base64 image, data URL, or an already hosted http(s) URL
    pub evidence: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TimeRequestError {
    #[error("{0}")]
    Validation(String),
    #[error("Not allowed to submit requests for staff {0}")]
    Forbidden(String),
    #[error("Staff {0} not found")]
    StaffNotFound(String),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// The caller on whose behalf a request is made
#[derive(Debug, Clone, Copy)]
pub struct Submitter<'a> {
    pub staff_id: &'a str,
    /// Personnel roles may act on other staff members
    pub is_personnel: bool,
}

pub struct TimeRequestService {
    store: Arc<dyn Store>,
    images: ImageService,
}

impl TimeRequestService {
    pub fn new(store: Arc<dyn Store>, images: ImageService) -> Self {
        Self { store, images }
    }

    pub async fn submit(
        &self,
        submitter: Submitter<'_>,
        request: ChangeTimeRequest,
    ) -> Result<TimeChangeRequest, TimeRequestError> {
        let staff_id = request
            .staff_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(submitter.staff_id)
            .to_string();

        if staff_id != submitter.staff_id && !submitter.is_personnel {
            return Err(TimeRequestError::Forbidden(staff_id));
        }

        let date = parse_date(request.date.as_deref())?;
        validate_window(request.h1, request.m1, request.h2, request.m2)?;

        if self.store.get_staff(&staff_id).await?.is_none() {
            return Err(TimeRequestError::StaffNotFound(staff_id));
        }

        let evidence_url = match request.evidence.as_deref().map(str::trim) {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => Some(url.to_string()),
            Some(payload) => {
                let file_name = format!("{}_{}_evidence", staff_id, date.format("%Y%m%d"));
                self.images.upload_image(&file_name, payload).await
            }
            None => None,
        };

        let stored = self
            .store
            .insert_time_request(NewTimeChangeRequest {
                staff_id,
                date,
                h1: request.h1,
                m1: request.m1,
                h2: request.h2,
                m2: request.m2,
                wrk_type: request.wrk_type,
                off: request.off,
                reason: request.reason,
                evidence_url,
            })
            .await?;

        tracing::info!("Time-change request {} filed for {}", stored.id, stored.staff_id);
        Ok(stored)
    }

    /// Own requests for regular staff; personnel may filter by any staff id or list all
    pub async fn list(
        &self,
        submitter: Submitter<'_>,
        staff_id: Option<&str>,
    ) -> Result<Vec<TimeChangeRequest>, TimeRequestError> {
        let filter = match (submitter.is_personnel, staff_id) {
            (true, requested) => requested,
            (false, Some(requested)) if requested != submitter.staff_id => {
                return Err(TimeRequestError::Forbidden(requested.to_string()))
            }
            (false, _) => Some(submitter.staff_id),
        };

        Ok(self.store.list_time_requests(filter).await?)
    }
}

fn parse_date(date: Option<&str>) -> Result<NaiveDate, TimeRequestError> {
    let date = date
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| TimeRequestError::Validation("date is required".to_string()))?;

    // Accept a full ISO timestamp as sent by date pickers; only the day matters
    let day = date.split('T').next().unwrap_or(date);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| TimeRequestError::Validation(format!("date '{}' is not YYYY-MM-DD", date)))
}

fn validate_window(h1: i32, m1: i32, h2: i32, m2: i32) -> Result<(), TimeRequestError> {
    for (name, value, max) in [("h1", h1, 23), ("m1", m1, 59), ("h2", h2, 23), ("m2", m2, 59)] {
        if !(0..=max).contains(&value) {
            return Err(TimeRequestError::Validation(format!(
                "{} must be between 0 and {}",
                name, max
            )));
        }
    }
    if (h1, m1) >= (h2, m2) {
        return Err(TimeRequestError::Validation(
            "start time must be before end time".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seeded_store, RecordingUploader};

    fn request(staff_id: Option<&str>) -> ChangeTimeRequest {
        ChangeTimeRequest {
            staff_id: staff_id.map(str::to_string),
            date: Some("2025-03-14".to_string()),
            h1: 8,
            m1: 30,
            h2: 17,
            m2: 0,
            wrk_type: Some("Office".to_string()),
            reason: Some("Doctor appointment".to_string()),
            ..Default::default()
        }
    }

    async fn service() -> (TimeRequestService, Arc<RecordingUploader>) {
        let store = seeded_store(&["25001", "25002"]).await;
        let uploader = Arc::new(RecordingUploader::default());
        let service = TimeRequestService::new(store, ImageService::new(uploader.clone()));
        (service, uploader)
    }

    const STAFF: Submitter<'static> = Submitter { staff_id: "25001", is_personnel: false };
    const HR: Submitter<'static> = Submitter { staff_id: "25002", is_personnel: true };

    #[tokio::test]
    async fn staff_id_defaults_to_submitter() {
        let (service, _) = service().await;
        let stored = service.submit(STAFF, request(None)).await.unwrap();
        assert_eq!(stored.staff_id, "25001");
        assert_eq!(stored.status, "Pending");
        assert_eq!(stored.date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
    }

    #[tokio::test]
    async fn only_personnel_file_for_others() {
        let (service, _) = service().await;
        assert!(matches!(
            service.submit(STAFF, request(Some("25002"))).await,
            Err(TimeRequestError::Forbidden(_))
        ));
        assert!(service.submit(HR, request(Some("25001"))).await.is_ok());
        assert!(matches!(
            service.submit(HR, request(Some("25099"))).await,
            Err(TimeRequestError::StaffNotFound(_))
        ));
    }

    #[tokio::test]
    async fn rejects_bad_times_and_dates() {
        let (service, _) = service().await;

        let mut bad = request(None);
        bad.h2 = 24;
        assert!(matches!(service.submit(STAFF, bad).await, Err(TimeRequestError::Validation(_))));

        let mut reversed = request(None);
        reversed.h1 = 18;
        assert!(matches!(service.submit(STAFF, reversed).await, Err(TimeRequestError::Validation(_))));

        let mut no_date = request(None);
        no_date.date = None;
        assert!(matches!(service.submit(STAFF, no_date).await, Err(TimeRequestError::Validation(_))));

        let mut iso = request(None);
        iso.date = Some("2025-03-14T00:00:00.000Z".to_string());
        assert!(service.submit(STAFF, iso).await.is_ok());
    }

    #[tokio::test]
    async fn evidence_is_uploaded_unless_already_hosted() {
        let (service, uploader) = service().await;

        let mut with_image = request(None);
        with_image.evidence = Some("data:image/jpeg;base64,aGVsbG8=".to_string());
        let stored = service.submit(STAFF, with_image).await.unwrap();
        assert_eq!(
            stored.evidence_url.as_deref(),
            Some("https://images.test/25001_20250314_evidence")
        );

        let mut hosted = request(None);
        hosted.evidence = Some("https://cdn.example.com/e.png".to_string());
        let stored = service.submit(STAFF, hosted).await.unwrap();
        assert_eq!(stored.evidence_url.as_deref(), Some("https://cdn.example.com/e.png"));

        let mut placeholder = request(None);
        placeholder.evidence = Some("empty".to_string());
        assert_eq!(service.submit(STAFF, placeholder).await.unwrap().evidence_url, None);

        assert_eq!(uploader.uploads().await.len(), 1);
    }

    #[tokio::test]
    async fn listing_is_scoped_by_role() {
        let (service, _) = service().await;
        service.submit(STAFF, request(None)).await.unwrap();
        service.submit(HR, request(None)).await.unwrap();

        assert_eq!(service.list(STAFF, None).await.unwrap().len(), 1);
        assert!(matches!(service.list(STAFF, Some("25002")).await, Err(TimeRequestError::Forbidden(_))));
        assert_eq!(service.list(HR, None).await.unwrap().len(), 2);
        assert_eq!(service.list(HR, Some("25001")).await.unwrap().len(), 1);
    }

    #[test]
    fn window_bounds() {
        assert!(validate_window(0, 0, 23, 59).is_ok());
        assert!(validate_window(9, 0, 9, 0).is_err());
        assert!(validate_window(-1, 0, 9, 0).is_err());
        assert!(validate_window(8, 60, 9, 0).is_err());
    }
}
