use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{RegistryResult, ValidationError};
use crate::gateway::{blob_name, BlobStore, RecordStore};
use crate::model::{Package, Registration, RegistrationForm};
use crate::registry::dashboard::{
    build_expiry_report, format_currency, Dashboard, ReportEntry, UserFilter,
};
use crate::registry::expiry::StatusClass;
use crate::registry::links::{derive_chat_link, explorer_link};
use crate::registry::validation::validate_registration;

/// Shown back to the user after a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionSummary {
    pub user: String,
    pub package: Package,
    pub price: String,
    pub chat_link: String,
    pub explorer_link: String,
    pub proof_url: String,
}

/// Submission and read flows over the two gateways.
#[derive(Clone)]
pub struct RegistrationService {
    records: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
}

impl RegistrationService {
    pub fn new(records: Arc<dyn RecordStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { records, blobs }
    }

    /// Validate, upload the proof image, derive links, append the row.
    ///
    /// A validation failure touches neither gateway. If the append fails after
    /// the upload succeeded the image stays in the bucket.
    pub async fn submit(
        &self,
        form: RegistrationForm,
        now: DateTime<Utc>,
    ) -> RegistryResult<SubmissionSummary> {
        validate_registration(&form)?;
        let proof = form.proof.ok_or(ValidationError::MissingFields)?;
        let price_usdt = form.price_usdt.ok_or(ValidationError::MissingFields)?;
        let name = form.name.trim().to_string();

        let object_name = blob_name(&name, &proof.file_name, now);
        let proof_url = self
            .blobs
            .upload_image(&proof.bytes, &proof.content_type, &object_name)
            .await
            .inspect_err(|e| error!(user = %name, "Proof upload failed: {}", e))?;

        let record = Registration {
            chat_link: derive_chat_link(&form.chat_user_id),
            explorer_link: explorer_link(form.network, &form.tx_hash),
            name,
            chat_user_id: form.chat_user_id,
            package: form.package,
            price_usdt,
            start_date: form.start_date,
            network: form.network,
            tx_hash: form.tx_hash,
            proof_image_ref: proof_url,
            created_at: now,
        };

        if let Err(e) = self.records.append_row(&record).await {
            warn!(
                proof_url = %record.proof_image_ref,
                "Row append failed, uploaded proof left orphaned: {}", e
            );
            return Err(e.into());
        }

        info!(
            user = %record.name,
            package = %record.package,
            network = %record.network,
            "Registration saved"
        );

        Ok(SubmissionSummary {
            user: record.name,
            package: record.package,
            price: format_currency(record.price_usdt),
            chat_link: record.chat_link,
            explorer_link: record.explorer_link,
            proof_url: record.proof_image_ref,
        })
    }

    pub async fn dashboard(&self, filter: &UserFilter) -> RegistryResult<Dashboard> {
        let rows = self.records.list_all_rows().await?;
        Ok(Dashboard::build(&rows, filter))
    }

    pub async fn expiry_report(
        &self,
        now: NaiveDateTime,
        status: Option<StatusClass>,
    ) -> RegistryResult<Vec<ReportEntry>> {
        let rows = self.records.list_all_rows().await?;
        Ok(build_expiry_report(&rows, now, status))
    }
}
