use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wraps a contact-channel value (email, phone number) so that `Debug`
/// and `Display` render a redaction instead of the raw value.
#[derive(Clone, Deserialize)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // API responses and the booking store need the real value; the
        // guard is against accidental leakage through log macros like
        // tracing::info!("{:?}", booking).
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Masked(value)
    }

    pub fn as_inner(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_display_redact() {
        let email = Masked::new("rider@example.com".to_string());
        assert_eq!(format!("{:?}", email), "********");
        assert_eq!(format!("{}", email), "********");
    }

    #[test]
    fn serialization_passes_through() {
        let phone = Masked::new("0771234567".to_string());
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"0771234567\"");

        let back: Masked<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_inner(), "0771234567");
    }
}
