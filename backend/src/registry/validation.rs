use crate::error::ValidationError;
use crate::model::RegistrationForm;

pub type ValidationResult = Result<(), ValidationError>;

/// Checks a submitted form, stopping at the first rule that fails.
///
/// Rule order decides which single message the user sees:
/// 1. name, chat user id, price, transaction hash and proof image are present
/// 2. chat user id is all decimal digits
/// 3. transaction hash starts with `0x`
pub fn validate_registration(form: &RegistrationForm) -> ValidationResult {
    let has_proof = form.proof.as_ref().is_some_and(|p| !p.bytes.is_empty());
    let has_price = form.price_usdt.is_some_and(|p| p.is_finite() && p > 0.0);

    if is_blank(&form.name)
        || is_blank(&form.chat_user_id)
        || !has_price
        || is_blank(&form.tx_hash)
        || !has_proof
    {
        return Err(ValidationError::MissingFields);
    }

    if !form.chat_user_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::ChatUserIdNotNumeric);
    }

    if !form.tx_hash.starts_with("0x") {
        return Err(ValidationError::TxHashMissingPrefix);
    }

    Ok(())
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Network, Package, ProofUpload};
    use chrono::NaiveDate;

    fn valid_form() -> RegistrationForm {
        RegistrationForm {
            name: "John Doe".to_string(),
            chat_user_id: "7058728559".to_string(),
            package: Package::Monthly,
            price_usdt: Some(49.0),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            network: Network::Polygon,
            tx_hash: "0xdeadbeef".to_string(),
            proof: Some(ProofUpload {
                file_name: "proof.png".to_string(),
                content_type: "image/png".to_string(),
                bytes: vec![0x89, b'P', b'N', b'G'],
            }),
        }
    }

    #[test]
    fn test_accepts_valid_form() {
        assert_eq!(validate_registration(&valid_form()), Ok(()));
    }

    #[test]
    fn test_rejects_non_numeric_chat_user_id() {
        let mut form = valid_form();
        form.chat_user_id = "abc123".to_string();
        assert_eq!(
            validate_registration(&form),
            Err(ValidationError::ChatUserIdNotNumeric)
        );
    }

    #[test]
    fn test_rejects_hash_without_prefix() {
        let mut form = valid_form();
        form.tx_hash = "abcd".to_string();
        assert_eq!(
            validate_registration(&form),
            Err(ValidationError::TxHashMissingPrefix)
        );
    }

    #[test]
    fn test_missing_fields() {
        let cases: [fn(&mut RegistrationForm); 7] = [
            |f: &mut RegistrationForm| f.name = "  ".to_string(),
            |f: &mut RegistrationForm| f.chat_user_id.clear(),
            |f: &mut RegistrationForm| f.price_usdt = None,
            |f: &mut RegistrationForm| f.price_usdt = Some(0.0),
            |f: &mut RegistrationForm| f.tx_hash.clear(),
            |f: &mut RegistrationForm| f.proof = None,
            |f: &mut RegistrationForm| f.proof.as_mut().unwrap().bytes.clear(),
        ];
        for mutate in cases {
            let mut form = valid_form();
            mutate(&mut form);
            assert_eq!(
                validate_registration(&form),
                Err(ValidationError::MissingFields)
            );
        }
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let mut form = valid_form();
        form.chat_user_id = "abc".to_string();
        form.tx_hash = "abcd".to_string();
        assert_eq!(
            validate_registration(&form),
            Err(ValidationError::ChatUserIdNotNumeric)
        );

        form.proof = None;
        assert_eq!(
            validate_registration(&form),
            Err(ValidationError::MissingFields)
        );
    }

    #[test]
    fn test_unicode_digits_are_rejected() {
        let mut form = valid_form();
        form.chat_user_id = "١٢٣".to_string();
        assert_eq!(
            validate_registration(&form),
            Err(ValidationError::ChatUserIdNotNumeric)
        );
    }
}
