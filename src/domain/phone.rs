use std::fmt;

use phonenumber::country;

use crate::error::SmsError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Recipient phone number with an optional country code.
///
/// This is a formatting value object: no validation is performed, and
/// providers are free to reject numbers they cannot route. Use
/// [`PhoneNumber::parse`] when you want free-form input normalized first.
pub struct PhoneNumber {
    number: String,
    country_code: Option<String>,
}

impl PhoneNumber {
    /// Create a phone number with an explicit country code.
    pub fn new(number: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            country_code: Some(country_code.into()),
        }
    }

    /// Create a phone number without a country code.
    pub fn bare(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            country_code: None,
        }
    }

    /// Parse free-form input into a national number + country code pair.
    ///
    /// `default_region` is used when the input carries no explicit country
    /// prefix. Unparseable input fails with [`SmsError::InvalidArgument`].
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl AsRef<str>,
    ) -> Result<Self, SmsError> {
        let input = input.as_ref().trim();
        let parsed = phonenumber::parse(default_region, input)
            .map_err(|_| SmsError::InvalidArgument(format!("invalid phone number: {input}")))?;

        Ok(Self {
            number: parsed.national().value().to_string(),
            country_code: Some(parsed.code().value().to_string()),
        })
    }

    /// The raw number, without any country code.
    pub fn number(&self) -> &str {
        &self.number
    }

    /// The country code, if one was provided.
    pub fn country_code(&self) -> Option<&str> {
        self.country_code.as_deref()
    }

    /// International format: `+<country><number>` when a country code is
    /// present, the raw number otherwise.
    pub fn international(&self) -> String {
        match &self.country_code {
            Some(code) => format!("+{code}{}", self.number),
            None => self.number.clone(),
        }
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.international())
    }
}

impl From<&str> for PhoneNumber {
    fn from(value: &str) -> Self {
        Self::bare(value)
    }
}

impl From<String> for PhoneNumber {
    fn from(value: String) -> Self {
        Self::bare(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn international_format_prefixes_country_code() {
        let phone = PhoneNumber::new("13800138000", "86");
        assert_eq!(phone.number(), "13800138000");
        assert_eq!(phone.country_code(), Some("86"));
        assert_eq!(phone.international(), "+8613800138000");
        assert_eq!(phone.to_string(), "+8613800138000");
    }

    #[test]
    fn bare_number_renders_unchanged() {
        let phone = PhoneNumber::bare("13800138000");
        assert_eq!(phone.country_code(), None);
        assert_eq!(phone.international(), "13800138000");
    }

    #[test]
    fn from_str_builds_bare_number() {
        let phone: PhoneNumber = "13800138000".into();
        assert_eq!(phone, PhoneNumber::bare("13800138000"));
    }

    #[test]
    fn parse_splits_country_code_and_national_number() {
        let phone = PhoneNumber::parse(None, " +7 925 123-45-67 ").unwrap();
        assert_eq!(phone.country_code(), Some("7"));
        assert_eq!(phone.number(), "9251234567");
        assert_eq!(phone.international(), "+79251234567");
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = PhoneNumber::parse(None, "not-a-number").unwrap_err();
        assert!(matches!(err, SmsError::InvalidArgument(_)));
    }
}
