use chrono::NaiveDate;
use serde_json::Value;
use std::fmt;

/// The two people sharing the homepage.
///
/// The spreadsheet stores the localized label, so [`Participant::label`] is
/// what ends up in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Participant {
    Me,
    Boyfriend,
}

impl Participant {
    pub const ALL: [Participant; 2] = [Participant::Me, Participant::Boyfriend];

    pub fn label(&self) -> &'static str {
        match self {
            Participant::Me => "我",
            Participant::Boyfriend => "男朋友",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|p| p.label() == label)
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Restaurant price bucket, 1 (cheap) to 3 (splurge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PriceTier(u8);

impl PriceTier {
    pub const ALL: [PriceTier; 3] = [PriceTier(1), PriceTier(2), PriceTier(3)];

    pub fn new(tier: u8) -> Option<Self> {
        (1..=3).contains(&tier).then_some(Self(tier))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Accepts `2`, `"2"`, `" 2 "`, `"$$"` and `2.0`.
    ///
    /// Sheet cells come back as numbers or text depending on how somebody
    /// typed them, and both must land in the same bucket.
    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if text.chars().all(|c| c == '$') {
            return u8::try_from(text.len()).ok().and_then(Self::new);
        }
        if let Ok(tier) = text.parse::<u8>() {
            return Self::new(tier);
        }
        text.parse::<f64>().ok().and_then(Self::from_float)
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map_or_else(
                || n.as_f64().and_then(Self::from_float),
                |v| u8::try_from(v).ok().and_then(Self::new),
            ),
            Value::String(s) => Self::from_text(s),
            _ => None,
        }
    }

    fn from_float(value: f64) -> Option<Self> {
        if value.fract() != 0.0 || !(1.0..=3.0).contains(&value) {
            return None;
        }
        Self::new(value as u8)
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&"$".repeat(self.0 as usize))
    }
}

/// Identifies one worksheet of the shared spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Worksheet {
    Ledger,
    Photos,
    Wishlist,
    Restaurants,
}

impl Worksheet {
    /// Tab title, or `None` for the spreadsheet's first tab.
    pub fn tab_name(&self) -> Option<&'static str> {
        match self {
            Worksheet::Ledger => None,
            Worksheet::Photos => Some("Photos"),
            Worksheet::Wishlist => Some("Wishlist"),
            Worksheet::Restaurants => Some("Restaurants"),
        }
    }
}

impl fmt::Display for Worksheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tab_name().unwrap_or("(first tab)"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub item: String,
    pub amount: f64,
    pub payer: Participant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishlistEntry {
    pub item: String,
    pub wisher: Participant,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantEntry {
    pub name: String,
    pub category: String,
    pub price_tier: PriceTier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoEntry {
    pub date: NaiveDate,
    pub caption: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn price_tier_accepts_numeric_and_textual_forms() {
        let two = PriceTier::new(2).unwrap();
        assert_eq!(PriceTier::from_value(&json!(2)), Some(two));
        assert_eq!(PriceTier::from_value(&json!(2.0)), Some(two));
        assert_eq!(PriceTier::from_value(&json!("2")), Some(two));
        assert_eq!(PriceTier::from_value(&json!(" 2 ")), Some(two));
        assert_eq!(PriceTier::from_value(&json!("$$")), Some(two));
    }

    #[test]
    fn price_tier_rejects_out_of_range_values() {
        assert_eq!(PriceTier::new(0), None);
        assert_eq!(PriceTier::new(4), None);
        assert_eq!(PriceTier::from_value(&json!(2.5)), None);
        assert_eq!(PriceTier::from_value(&json!("$$$$")), None);
        assert_eq!(PriceTier::from_value(&json!("")), None);
        assert_eq!(PriceTier::from_value(&json!(null)), None);
    }

    #[test]
    fn participants_round_trip_through_labels() {
        for participant in Participant::ALL {
            assert_eq!(Participant::from_label(participant.label()), Some(participant));
        }
        assert_eq!(Participant::from_label("someone else"), None);
    }

    #[test]
    fn ledger_lives_on_the_first_tab() {
        assert_eq!(Worksheet::Ledger.tab_name(), None);
        assert_eq!(Worksheet::Photos.tab_name(), Some("Photos"));
    }
}
