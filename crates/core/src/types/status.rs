//! Status enums for orders and menu availability.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a persisted order.
///
/// Orders are created as `Pending` by the webhook handler and advance only
/// through staff status updates; they are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    #[serde(rename = "Ready for Pickup")]
    ReadyForPickup,
    Completed,
}

impl OrderStatus {
    /// All statuses in lifecycle order, for admin status pickers.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Preparing,
        Self::ReadyForPickup,
        Self::Completed,
    ];

    /// The label stored in the database and shown to users.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Preparing => "Preparing",
            Self::ReadyForPickup => "Ready for Pickup",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Preparing" => Ok(Self::Preparing),
            "Ready for Pickup" => Ok(Self::ReadyForPickup),
            "Completed" => Ok(Self::Completed),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderStatus {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Self::from_str(raw).map_err(Into::into)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

/// Menu-facing availability label for a catalog item.
///
/// `Paused` applies store-wide when ordering is globally disabled and takes
/// precedence over per-item availability; `Out` means the single item is
/// unavailable while ordering is otherwise open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Out,
    Paused,
}

impl Availability {
    /// Derive the label from the global ordering flag and the item flag.
    #[must_use]
    pub const fn from_flags(accepting_orders: bool, item_available: bool) -> Self {
        if !accepting_orders {
            Self::Paused
        } else if item_available {
            Self::Available
        } else {
            Self::Out
        }
    }

    /// Whether the item can currently be added to a cart.
    #[must_use]
    pub const fn is_orderable(self) -> bool {
        matches!(self, Self::Available)
    }
}
