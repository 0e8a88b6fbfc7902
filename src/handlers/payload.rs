use crate::{
    error::ApiError,
    models::{is_valid_key, msat_to_sat, PaymentRecord},
};
use serde_json::{Map, Value};

/// Bodies must be a JSON object.
pub fn parse_object(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => {
            tracing::error!("Invalid JSON received");
            Err(ApiError::InvalidPayload)
        }
    }
}

/// Identifiers may arrive as strings or numbers; numbers are kept in their
/// decimal form. Empty strings and every other JSON type count as absent.
pub fn coerce_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A validated webhook notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingPayment {
    pub lnurlp_id: String,
    pub amount_msat: u64,
    pub comment: String,
}

impl IncomingPayment {
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let payload = parse_object(body)?;
        // An empty notification is treated like an unreadable one.
        if payload.is_empty() {
            tracing::error!("Invalid JSON received");
            return Err(ApiError::InvalidPayload);
        }

        let Some(lnurlp_id) = coerce_id(payload.get("lnurlp")) else {
            tracing::error!("Missing 'lnurlp' in the payload");
            return Err(ApiError::MissingKey);
        };
        if !is_valid_key(&lnurlp_id) {
            tracing::error!("Rejected 'lnurlp' identifier {:?}", lnurlp_id);
            return Err(ApiError::InvalidKey(lnurlp_id));
        }

        let amount_msat = match payload.get("amount") {
            None | Some(Value::Null) => {
                tracing::error!("Missing 'amount' field for LNURLP {}", lnurlp_id);
                return Err(ApiError::MissingAmount);
            }
            Some(value) => value.as_u64().ok_or_else(|| {
                tracing::error!("Invalid 'amount' {} for LNURLP {}", value, lnurlp_id);
                ApiError::InvalidAmount
            })?,
        };

        let comment = match payload.get("comment") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        Ok(Self {
            lnurlp_id,
            amount_msat,
            comment,
        })
    }

    pub fn into_record(self) -> PaymentRecord {
        let amount = msat_to_sat(self.amount_msat);
        PaymentRecord::new(self.lnurlp_id, amount, self.comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<IncomingPayment, ApiError> {
        IncomingPayment::parse(value.to_string().as_bytes())
    }

    #[test]
    fn test_full_payload() {
        let payment = parse(json!({"lnurlp": "abc", "amount": 5000, "comment": "thanks"})).unwrap();
        assert_eq!(payment.lnurlp_id, "abc");
        assert_eq!(payment.amount_msat, 5000);

        let record = payment.into_record();
        assert_eq!(record, PaymentRecord::new("abc", 5, "thanks"));
    }

    #[test]
    fn test_comment_defaults_to_empty() {
        let payment = parse(json!({"lnurlp": "abc", "amount": 1999})).unwrap();
        assert_eq!(payment.comment, "");
        assert_eq!(payment.into_record().amount, 1);

        let payment = parse(json!({"lnurlp": "abc", "amount": 1, "comment": null})).unwrap();
        assert_eq!(payment.comment, "");
    }

    #[test]
    fn test_numeric_key_is_coerced() {
        let payment = parse(json!({"lnurlp": 17, "amount": 1000})).unwrap();
        assert_eq!(payment.lnurlp_id, "17");
    }

    #[test]
    fn test_validation_order() {
        assert!(matches!(
            IncomingPayment::parse(b"not json"),
            Err(ApiError::InvalidPayload)
        ));
        assert!(matches!(parse(json!({})), Err(ApiError::InvalidPayload)));
        assert!(matches!(parse(json!([1, 2])), Err(ApiError::InvalidPayload)));
        // Key is checked before amount.
        assert!(matches!(parse(json!({"comment": "x"})), Err(ApiError::MissingKey)));
        assert!(matches!(
            parse(json!({"lnurlp": "", "amount": 1})),
            Err(ApiError::MissingKey)
        ));
        assert!(matches!(parse(json!({"lnurlp": "abc"})), Err(ApiError::MissingAmount)));
    }

    #[test]
    fn test_rejects_bad_amounts_and_keys() {
        assert!(matches!(
            parse(json!({"lnurlp": "abc", "amount": -5000})),
            Err(ApiError::InvalidAmount)
        ));
        assert!(matches!(
            parse(json!({"lnurlp": "abc", "amount": 1.5})),
            Err(ApiError::InvalidAmount)
        ));
        assert!(matches!(
            parse(json!({"lnurlp": "abc", "amount": "5000"})),
            Err(ApiError::InvalidAmount)
        ));
        assert!(matches!(
            parse(json!({"lnurlp": "../x", "amount": 1})),
            Err(ApiError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_empty_object_is_still_an_object() {
        let fields = parse_object(b"{}").unwrap();
        assert!(fields.is_empty());
        assert!(matches!(parse_object(b"[]"), Err(ApiError::InvalidPayload)));
    }

    #[test]
    fn test_coerce_id() {
        assert_eq!(coerce_id(Some(&json!(42))), Some("42".to_string()));
        assert_eq!(coerce_id(Some(&json!("f1"))), Some("f1".to_string()));
        assert_eq!(coerce_id(Some(&json!(""))), None);
        assert_eq!(coerce_id(Some(&json!(null))), None);
        assert_eq!(coerce_id(Some(&json!(true))), None);
        assert_eq!(coerce_id(None), None);
    }
}
