//! Status enums for orders and accounts.
//!
//! Order statuses are stored as plain text: the set of labels is open (back
//! office staff add workflow labels like "Awaiting pickup" without a
//! migration), but `Completed` and `Cancelled` carry lifecycle meaning and
//! get their own variants so the transition policy can match on them.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An order's lifecycle status.
///
/// `Completed` is the only status with a side effect (inventory deduction on
/// the transition into it); `Cancelled` marks an order the business voided.
/// Everything else is a display label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
    /// Any other back-office label, stored verbatim.
    Custom(String),
}

impl OrderStatus {
    /// The status label as stored in the database.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Custom(label) => label,
        }
    }

    /// Whether this status is `Completed`.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        *self == Self::Completed
    }
}

impl From<&str> for OrderStatus {
    fn from(s: &str) -> Self {
        match s {
            "Pending" => Self::Pending,
            "Processing" => Self::Processing,
            "Completed" => Self::Completed,
            "Cancelled" => Self::Cancelled,
            other => Self::Custom(other.to_owned()),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_owned()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// A shopper.
    Customer,
    /// Back-office staff.
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Account status.
///
/// A locked account cannot authenticate via any path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Locked,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Locked => write!(f, "locked"),
        }
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "locked" => Ok(Self::Locked),
            _ => Err(format!("invalid account status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_known_labels() {
        assert_eq!(OrderStatus::from("Completed"), OrderStatus::Completed);
        assert_eq!(OrderStatus::from("Cancelled"), OrderStatus::Cancelled);
        assert_eq!(OrderStatus::from("Pending"), OrderStatus::Pending);
    }

    #[test]
    fn test_order_status_open_set() {
        let status = OrderStatus::from("Awaiting pickup");
        assert_eq!(status, OrderStatus::Custom("Awaiting pickup".to_owned()));
        assert_eq!(status.as_str(), "Awaiting pickup");
    }

    #[test]
    fn test_order_status_serde_as_string() {
        let json = serde_json::to_string(&OrderStatus::Completed).unwrap();
        assert_eq!(json, "\"Completed\"");

        let status: OrderStatus = serde_json::from_str("\"Shipping\"").unwrap();
        assert_eq!(status, OrderStatus::Custom("Shipping".to_owned()));
    }

    #[test]
    fn test_role_roundtrip() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!(UserRole::Customer.to_string(), "customer");
        assert!("root".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_account_status_roundtrip() {
        assert_eq!(
            "locked".parse::<AccountStatus>().unwrap(),
            AccountStatus::Locked
        );
        assert_eq!(AccountStatus::Active.to_string(), "active");
    }
}
