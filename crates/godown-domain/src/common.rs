//! Shared traits, unit conversions, and name matching for warehouse records.

use chrono::NaiveDate;
use uuid::Uuid;

/// Kilograms in one metric ton.
pub const KG_PER_TON: f64 = 1000.0;

/// Exposes a stable identifier for records stored in a book.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Records that happen on a calendar day. Upstream data may omit the date.
pub trait Dated {
    fn date(&self) -> Option<NaiveDate>;

    /// True when the record has a date on or before `as_of`.
    fn on_or_before(&self, as_of: NaiveDate) -> bool {
        matches!(self.date(), Some(date) if date <= as_of)
    }
}

/// Records owned by a stockist (or other counterparty).
pub trait OwnedByEntity {
    fn entity_name(&self) -> &str;

    fn belongs_to(&self, entity: &str) -> bool {
        same_entity(self.entity_name(), entity)
    }
}

/// Records located at a warehouse and tagged with a commodity and quality.
pub trait Positioned {
    fn warehouse(&self) -> Option<&str>;
    fn commodity(&self) -> Option<&str>;
    fn quality(&self) -> Option<&str> {
        None
    }
}

/// Converts an entity name into the key used for matching and grouping.
pub fn entity_key(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Case-insensitive, whitespace-tolerant entity comparison.
pub fn same_entity(left: &str, right: &str) -> bool {
    entity_key(left) == entity_key(right)
}

pub fn kg_to_tons(kg: f64) -> f64 {
    kg / KG_PER_TON
}

/// Rounds a monetary figure to paise. Negative zero comes back as `0.0`.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0 + 0.0
}
