//! Product SKU type.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Sku`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum SkuError {
    /// The input is empty or whitespace-only.
    #[error("sku cannot be blank")]
    Blank,
    /// The input is too long.
    #[error("sku must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A stock-keeping unit code.
///
/// SKUs are unique per product. When a product is created without one, a
/// `SKU-<suffix>` code is generated from the creation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Maximum length of a SKU.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `Sku` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or too long.
    pub fn parse(s: &str) -> Result<Self, SkuError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SkuError::Blank);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(SkuError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Generate a `SKU-<suffix>` code from a timestamp.
    ///
    /// The suffix is the last six digits of the millisecond clock, which is
    /// unique enough for back-office product entry; the database unique
    /// constraint catches collisions.
    #[must_use]
    pub fn generate(at: DateTime<Utc>) -> Self {
        let millis = at.timestamp_millis().rem_euclid(1_000_000);
        Self(format!("SKU-{millis:06}"))
    }

    /// Returns the SKU as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Sku {
    type Err = SkuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Sku {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Sku {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Sku {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_trims() {
        let sku = Sku::parse("  BR-100 ").unwrap();
        assert_eq!(sku.as_str(), "BR-100");
    }

    #[test]
    fn test_parse_blank() {
        assert!(matches!(Sku::parse("   "), Err(SkuError::Blank)));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "x".repeat(65);
        assert!(matches!(Sku::parse(&long), Err(SkuError::TooLong { .. })));
    }

    #[test]
    fn test_generate_shape() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let sku = Sku::generate(at);
        assert!(sku.as_str().starts_with("SKU-"));
        assert_eq!(sku.as_str().len(), "SKU-".len() + 6);
        assert!(sku.as_str()["SKU-".len()..].chars().all(|c| c.is_ascii_digit()));
    }
}
