//! Form parsing shared by the profile and admin editors.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;
use bloomway_core::Price;
use rust_decimal::Decimal;

use crate::api::Upload;
use crate::error::AppError;

/// Text fields plus at most one file from a `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    file: Option<Upload>,
}

impl MultipartForm {
    /// Read every field of `multipart`. The field named `file_field` is kept
    /// as an [`Upload`] when the browser actually attached a file.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the body is not valid multipart.
    pub async fn read(mut multipart: Multipart, file_field: &str) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == file_field {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                // Browsers send an empty part when no file was chosen
                if !file_name.is_empty() && !bytes.is_empty() {
                    form.file = Some(Upload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    /// Trimmed text of `name`, empty when absent.
    #[must_use]
    pub fn text(&self, name: &str) -> String {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    /// Trimmed text of `name`, `None` when absent or blank.
    #[must_use]
    pub fn optional(&self, name: &str) -> Option<String> {
        Some(self.text(name)).filter(|v| !v.is_empty())
    }

    /// Whether checkbox `name` was ticked.
    #[must_use]
    pub fn checked(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn take_file(&mut self) -> Option<Upload> {
        self.file.take()
    }
}

/// Highest price the editors accept.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Parse a price such as `12.50`, between zero and [`MAX_PRICE`].
///
/// # Errors
///
/// Returns a message naming the field when the value is not a number or out of range.
pub fn parse_price(raw: &str, field: &str) -> Result<Price, String> {
    let amount = Decimal::from_str(raw.trim()).map_err(|_| format!("{field}: not a number"))?;
    if amount.is_sign_negative() {
        return Err(format!("{field}: must not be negative"));
    }
    if amount > MAX_PRICE {
        return Err(format!("{field}: must not exceed {MAX_PRICE}"));
    }
    Ok(Price::new(amount))
}

/// Split a comma-separated input into trimmed, non-empty items.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(" 12.50 ", "Price").unwrap(), Price::from_cents(1250));
        assert!(parse_price("-1", "Price").unwrap_err().contains("negative"));
        assert!(parse_price("twelve", "Price").is_err());
    }

    #[test]
    fn test_parse_price_upper_bound() {
        assert_eq!(parse_price("1000000", "Price").unwrap(), Price::new(MAX_PRICE));
        assert!(parse_price("1000000.01", "Price").unwrap_err().contains("exceed"));
        assert!(parse_price("79228162514264337593543950335", "Price").is_err());
    }

    #[test]
    fn test_split_list_drops_blanks() {
        assert_eq!(
            split_list("red, white,, pink "),
            vec!["red".to_string(), "white".to_string(), "pink".to_string()]
        );
        assert!(split_list("  ").is_empty());
    }
}
