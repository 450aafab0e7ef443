use crate::errors::ServiceError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use std::str::FromStr;
use validator::Validate;

/// Raw `application/x-www-form-urlencoded` fields, keeping repeated keys.
///
/// `axum::Form` collapses repeated keys, which breaks the parallel
/// `product_id[]`/`quantity[]` arrays submitted by order forms.
#[derive(Debug, Clone, Default)]
pub struct FormFields(Vec<(String, String)>);

#[async_trait]
impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ServiceError::ValidationError(format!("Unreadable form body: {}", e)))?;
        Ok(Self::parse(&body))
    }
}

impl FormFields {
    pub fn parse(body: &[u8]) -> Self {
        Self(url::form_urlencoded::parse(body).into_owned().collect())
    }

    /// First value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value submitted under `name` or `name[]`, in submission order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        let bracketed = format!("{}[]", name);
        self.0
            .iter()
            .filter(|(key, _)| key == name || *key == bracketed)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// First non-blank value submitted under `name`.
    pub fn required(&self, name: &str) -> Option<&str> {
        self.get(name).map(str::trim).filter(|v| !v.is_empty())
    }
}

/// Parses a present, non-blank field value; blanks and junk yield `None`.
pub fn parse_field<T: FromStr>(value: Option<&str>) -> Option<T> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
}

/// Parses every entry of a repeated field, failing on the first bad one.
pub fn parse_all<T: FromStr>(values: &[&str]) -> Option<Vec<T>> {
    values.iter().map(|v| v.trim().parse().ok()).collect()
}

/// Runs derive-based validation, collapsing any failure into one message.
pub fn validate_form<T: Validate>(form: &T, message: &str) -> Result<(), ServiceError> {
    form.validate()
        .map_err(|_| ServiceError::ValidationError(message.to_string()))
}

pub fn invalid(message: &str) -> ServiceError {
    ServiceError::ValidationError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_keys_are_kept_in_order() {
        let fields = FormFields::parse(
            b"customer_id=3&product_id%5B%5D=1&quantity%5B%5D=2&product_id%5B%5D=7&quantity%5B%5D=5",
        );
        assert_eq!(fields.get("customer_id"), Some("3"));
        assert_eq!(fields.get_all("product_id"), vec!["1", "7"]);
        assert_eq!(fields.get_all("quantity"), vec!["2", "5"]);
    }

    #[test]
    fn required_rejects_blank_values() {
        let fields = FormFields::parse(b"name=+&status=Shipped");
        assert_eq!(fields.required("name"), None);
        assert_eq!(fields.required("missing"), None);
        assert_eq!(fields.required("status"), Some("Shipped"));
    }

    #[test]
    fn parse_helpers_reject_junk() {
        assert_eq!(parse_field::<i32>(Some(" 12 ")), Some(12));
        assert_eq!(parse_field::<i32>(Some("twelve")), None);
        assert_eq!(parse_field::<i32>(None), None);
        assert_eq!(parse_all::<i32>(&["1", "-2"]), Some(vec![1, -2]));
        assert_eq!(parse_all::<i32>(&["1", "x"]), None);
    }
}
