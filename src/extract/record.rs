use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Placeholder written in place of any value that could not be extracted
pub const UNAVAILABLE: &str = "No disponible";

/// A trimmed, non-empty value or the unavailable sentinel
///
/// A `Field` can never hold an empty string: construction trims the raw
/// text and falls back to the sentinel when nothing is left.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Field(Option<String>);

impl Field {
    /// Creates a field from raw text, trimming surrounding whitespace
    ///
    /// # Examples
    ///
    /// ```
    /// use listing_harvester::{Field, UNAVAILABLE};
    ///
    /// assert_eq!(Field::from_raw("  Acme S.L. ").as_str(), "Acme S.L.");
    /// assert_eq!(Field::from_raw("   ").as_str(), UNAVAILABLE);
    /// ```
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self(None)
        } else {
            Self(Some(trimmed.to_string()))
        }
    }

    /// The sentinel value
    pub fn unavailable() -> Self {
        Self(None)
    }

    /// Returns the extracted value, or `None` for the sentinel
    pub fn value(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.0.is_some()
    }

    /// Returns the value, or the sentinel text when unavailable
    pub fn as_str(&self) -> &str {
        self.0.as_deref().unwrap_or(UNAVAILABLE)
    }
}

impl From<Option<String>> for Field {
    fn from(value: Option<String>) -> Self {
        value.map(|v| Field::from_raw(&v)).unwrap_or_default()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.trim() == UNAVAILABLE {
            Ok(Field::unavailable())
        } else {
            Ok(Field::from_raw(&raw))
        }
    }
}

/// One business entity observed on a directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub name: Field,
    pub phone: Field,
    pub email: Field,
    pub inferred_email_info: Field,
    pub inferred_email_contact: Field,
    pub inferred_email_admin: Field,
    pub website: Field,
    pub street_address: Field,
    pub postal_code: Field,
    pub locality: Field,

    /// Detail page the record was read from, when the directory has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_url: Option<String>,
}

/// Identity used to drop repeated listings within one crawl
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    name: Field,
    phone: Field,
    website: Field,
    detail_url: Option<String>,
}

impl ListingRecord {
    /// Creates an empty record whose locality defaults to the given facet
    pub fn with_locality(locality: Field) -> Self {
        Self {
            locality,
            ..Self::default()
        }
    }

    /// Returns true if at least one of name, phone, email or website was found
    pub fn is_informative(&self) -> bool {
        self.name.is_available()
            || self.phone.is_available()
            || self.email.is_available()
            || self.website.is_available()
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            name: self.name.clone(),
            phone: self.phone.clone(),
            website: self.website.clone(),
            detail_url: self.detail_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_never_empty() {
        assert!(!Field::from_raw("").is_available());
        assert!(!Field::from_raw("\n\t ").is_available());
        assert_eq!(Field::from(Some(" x ".to_string())).value(), Some("x"));
        assert_eq!(Field::from(None), Field::unavailable());
    }

    #[test]
    fn test_field_serializes_sentinel() {
        let record = ListingRecord {
            name: Field::from_raw("Acme"),
            ..ListingRecord::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "Acme");
        assert_eq!(json["phone"], UNAVAILABLE);
        assert!(json.get("detail_url").is_none());
    }

    #[test]
    fn test_field_deserializes_sentinel() {
        let field: Field = serde_json::from_str("\"No disponible\"").unwrap();
        assert!(!field.is_available());
        let field: Field = serde_json::from_str("\"  Madrid \"").unwrap();
        assert_eq!(field.value(), Some("Madrid"));
    }

    #[test]
    fn test_is_informative() {
        let empty = ListingRecord::with_locality(Field::from_raw("Coslada"));
        assert!(!empty.is_informative());

        let phone_only = ListingRecord {
            phone: Field::from_raw("+34916000000"),
            ..ListingRecord::default()
        };
        assert!(phone_only.is_informative());
    }

    #[test]
    fn test_dedup_key_ignores_other_fields() {
        let a = ListingRecord {
            name: Field::from_raw("Acme"),
            phone: Field::from_raw("+34916000000"),
            street_address: Field::from_raw("Calle Mayor 1"),
            ..ListingRecord::default()
        };
        let b = ListingRecord {
            email: Field::from_raw("hola@acme.es"),
            ..a.clone()
        };
        assert_eq!(a.dedup_key(), b.dedup_key());

        let c = ListingRecord {
            detail_url: Some("https://empresite.eleconomista.es/ACME.html".to_string()),
            ..a.clone()
        };
        assert_ne!(a.dedup_key(), c.dedup_key());
    }
}
