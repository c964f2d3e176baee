//! Registration form intake

use super::{ApiError, ApiResponse, ApiState};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Json,
};
use chrono::{Local, NaiveDate, Utc};
use tracing::debug;

use crate::model::{Network, Package, ProofUpload, RegistrationForm, DATE_FORMAT};
use crate::service::SubmissionSummary;

/// Multipart fields as text, before they are typed.
#[derive(Debug, Default)]
pub struct RawRegistration {
    pub name: String,
    pub chat_user_id: String,
    pub package: String,
    pub price_usdt: String,
    pub start_date: String,
    pub network: String,
    pub tx_hash: String,
    pub proof: Option<ProofUpload>,
}

impl RawRegistration {
    fn set(&mut self, field: &str, value: String) {
        let slot = match field {
            "name" => &mut self.name,
            "chat_user_id" => &mut self.chat_user_id,
            "package" => &mut self.package,
            "price_usdt" => &mut self.price_usdt,
            "start_date" => &mut self.start_date,
            "network" => &mut self.network,
            "tx_hash" => &mut self.tx_hash,
            other => {
                debug!(field = other, "Ignoring unknown form field");
                return;
            }
        };
        *slot = value;
    }

    /// Types the select-style fields. The free-text fields pass through as
    /// typed, so presence and format checks see the raw input.
    ///
    /// A blank start date means today. An unparseable price is treated as
    /// missing.
    pub fn into_form(self, today: NaiveDate) -> Result<RegistrationForm, ApiError> {
        let package: Package = self
            .package
            .parse()
            .map_err(|e| ApiError::BadRequest(format!("{e}")))?;
        let network: Network = self
            .network
            .parse()
            .map_err(|e| ApiError::BadRequest(format!("{e}")))?;
        let start_date = match self.start_date.trim() {
            "" => today,
            s => NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map_err(|e| ApiError::BadRequest(format!("invalid start_date {s:?}: {e}")))?,
        };
        let price_usdt = self.price_usdt.trim().parse::<f64>().ok();

        Ok(RegistrationForm {
            name: self.name,
            chat_user_id: self.chat_user_id,
            package,
            price_usdt,
            start_date,
            network,
            tx_hash: self.tx_hash,
            proof: self.proof,
        })
    }
}

pub async fn submit_registration(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<SubmissionSummary>>), ApiError> {
    let mut raw = RawRegistration::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "proof" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            if !bytes.is_empty() {
                raw.proof = Some(ProofUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            raw.set(&name, value);
        }
    }

    let form = raw.into_form(Local::now().date_naive())?;
    let summary = state.service.submit(form, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(summary))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawRegistration {
        let mut raw = RawRegistration::default();
        for (field, value) in [
            ("name", "John Doe"),
            ("chat_user_id", "7058728559"),
            ("package", "Quarterly"),
            ("price_usdt", "120.5"),
            ("start_date", "2025-03-01"),
            ("network", "Arbitrum"),
            ("tx_hash", "0xabc"),
            ("unexpected", "ignored"),
        ] {
            raw.set(field, value.to_string());
        }
        raw
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_into_form_types_fields() {
        let form = raw().into_form(today()).unwrap();
        assert_eq!(form.package, Package::Quarterly);
        assert_eq!(form.network, Network::Arbitrum);
        assert_eq!(form.price_usdt, Some(120.5));
        assert_eq!(form.chat_user_id, "7058728559");
        assert_eq!(form.start_date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert!(form.proof.is_none());
    }

    #[test]
    fn test_free_text_reaches_validation_untrimmed() {
        use crate::error::ValidationError;
        use crate::registry::validation::validate_registration;

        let proof = Some(ProofUpload {
            file_name: "bukti.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: b"png".to_vec(),
        });

        let mut padded_id = raw();
        padded_id.chat_user_id = " 123".to_string();
        padded_id.proof = proof.clone();
        let form = padded_id.into_form(today()).unwrap();
        assert_eq!(form.chat_user_id, " 123");
        assert_eq!(
            validate_registration(&form),
            Err(ValidationError::ChatUserIdNotNumeric)
        );

        let mut padded_hash = raw();
        padded_hash.tx_hash = " 0xabc".to_string();
        padded_hash.proof = proof;
        assert_eq!(
            validate_registration(&padded_hash.into_form(today()).unwrap()),
            Err(ValidationError::TxHashMissingPrefix)
        );
    }

    #[test]
    fn test_blank_start_date_defaults_to_today_and_bad_price_is_missing() {
        let mut raw = raw();
        raw.start_date.clear();
        raw.price_usdt = "free".to_string();
        let form = raw.into_form(today()).unwrap();
        assert_eq!(form.start_date, today());
        assert_eq!(form.price_usdt, None);
    }

    #[test]
    fn test_unknown_select_values_are_bad_requests() {
        let mut bad_package = raw();
        bad_package.package = "Weekly".to_string();
        assert!(matches!(
            bad_package.into_form(today()),
            Err(ApiError::BadRequest(_))
        ));

        let mut bad_date = raw();
        bad_date.start_date = "01/03/2025".to_string();
        assert!(matches!(
            bad_date.into_form(today()),
            Err(ApiError::BadRequest(_))
        ));
    }
}
