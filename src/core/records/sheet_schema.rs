// The one place that knows the spreadsheet's localized header text.
//
// Everything outside this file works with typed entries; everything inside
// translates between those entries and header-keyed records / ordered cells.

use super::records_models::{
    LedgerEntry, Participant, PhotoEntry, PriceTier, RestaurantEntry, WishlistEntry, Worksheet,
};
use super::table_store::{cell_text, Record};
use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("column '{column}' has an unreadable value '{value}'")]
    InvalidValue { column: &'static str, value: String },
}

/// A typed row of one worksheet.
pub trait SheetRow: Sized {
    const WORKSHEET: Worksheet;

    /// Header text in column order.
    #[cfg_attr(not(test), allow(dead_code))]
    const HEADERS: &'static [&'static str];

    /// Cell values in [`SheetRow::HEADERS`] order, ready to append.
    fn to_row(&self) -> Vec<Value>;

    fn from_record(record: &Record) -> Result<Self, RowError>;
}

mod ledger {
    pub const DATE: &str = "日期";
    pub const ITEM: &str = "項目";
    pub const AMOUNT: &str = "金額";
    pub const PAYER: &str = "付款人";
}

mod photos {
    pub const DATE: &str = "日期";
    pub const CAPTION: &str = "描述";
    pub const URL: &str = "網址";
}

mod wishlist {
    pub const ITEM: &str = "想買的東西";
    pub const WISHER: &str = "誰許願的";
    pub const NOTE: &str = "備註";
}

mod restaurants {
    pub const NAME: &str = "餐廳名稱";
    pub const CATEGORY: &str = "類型";
    pub const PRICE_TIER: &str = "價位";
}

impl SheetRow for LedgerEntry {
    const WORKSHEET: Worksheet = Worksheet::Ledger;
    const HEADERS: &'static [&'static str] =
        &[ledger::DATE, ledger::ITEM, ledger::AMOUNT, ledger::PAYER];

    fn to_row(&self) -> Vec<Value> {
        vec![
            json!(self.date.format(DATE_FORMAT).to_string()),
            json!(self.item),
            amount_cell(self.amount),
            json!(self.payer.label()),
        ]
    }

    fn from_record(record: &Record) -> Result<Self, RowError> {
        Ok(Self {
            date: date(record, ledger::DATE)?,
            item: text(record, ledger::ITEM)?,
            amount: amount(record, ledger::AMOUNT)?,
            payer: participant(record, ledger::PAYER)?,
        })
    }
}

impl SheetRow for PhotoEntry {
    const WORKSHEET: Worksheet = Worksheet::Photos;
    const HEADERS: &'static [&'static str] = &[photos::DATE, photos::CAPTION, photos::URL];

    fn to_row(&self) -> Vec<Value> {
        vec![
            json!(self.date.format(DATE_FORMAT).to_string()),
            json!(self.caption),
            json!(self.url),
        ]
    }

    fn from_record(record: &Record) -> Result<Self, RowError> {
        Ok(Self {
            date: date(record, photos::DATE)?,
            caption: text(record, photos::CAPTION)?,
            url: text(record, photos::URL)?,
        })
    }
}

impl SheetRow for WishlistEntry {
    const WORKSHEET: Worksheet = Worksheet::Wishlist;
    const HEADERS: &'static [&'static str] = &[wishlist::ITEM, wishlist::WISHER, wishlist::NOTE];

    fn to_row(&self) -> Vec<Value> {
        vec![
            json!(self.item),
            json!(self.wisher.label()),
            json!(self.note.clone().unwrap_or_default()),
        ]
    }

    fn from_record(record: &Record) -> Result<Self, RowError> {
        // The note column is optional; older sheets may not have it at all.
        let note = record
            .get(wishlist::NOTE)
            .map(cell_text)
            .filter(|n| !n.is_empty());

        Ok(Self {
            item: text(record, wishlist::ITEM)?,
            wisher: participant(record, wishlist::WISHER)?,
            note,
        })
    }
}

impl SheetRow for RestaurantEntry {
    const WORKSHEET: Worksheet = Worksheet::Restaurants;
    const HEADERS: &'static [&'static str] = &[
        restaurants::NAME,
        restaurants::CATEGORY,
        restaurants::PRICE_TIER,
    ];

    fn to_row(&self) -> Vec<Value> {
        vec![
            json!(self.name),
            json!(self.category),
            json!(self.price_tier.get()),
        ]
    }

    fn from_record(record: &Record) -> Result<Self, RowError> {
        let column = restaurants::PRICE_TIER;
        let raw = cell(record, column)?;
        let price_tier = PriceTier::from_value(raw).ok_or_else(|| RowError::InvalidValue {
            column,
            value: cell_text(raw),
        })?;

        Ok(Self {
            name: text(record, restaurants::NAME)?,
            category: text(record, restaurants::CATEGORY)?,
            price_tier,
        })
    }
}

fn cell<'a>(record: &'a Record, column: &'static str) -> Result<&'a Value, RowError> {
    record.get(column).ok_or(RowError::MissingColumn(column))
}

fn text(record: &Record, column: &'static str) -> Result<String, RowError> {
    cell(record, column).map(cell_text)
}

fn participant(record: &Record, column: &'static str) -> Result<Participant, RowError> {
    let value = text(record, column)?;
    Participant::from_label(&value).ok_or(RowError::InvalidValue { column, value })
}

fn amount(record: &Record, column: &'static str) -> Result<f64, RowError> {
    let raw = cell(record, column)?;
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .trim()
            .trim_start_matches('$')
            .replace(',', "")
            .parse::<f64>()
            .ok(),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| RowError::InvalidValue {
            column,
            value: cell_text(raw),
        })
}

fn amount_cell(amount: f64) -> Value {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        json!(amount as i64)
    } else {
        json!(amount)
    }
}

/// Dates are written as `YYYY-MM-DD` but people also type `YYYY/MM/DD`, and
/// an unformatted read can hand back a spreadsheet serial day number.
fn date(record: &Record, column: &'static str) -> Result<NaiveDate, RowError> {
    let raw = cell(record, column)?;
    let parsed = match raw {
        Value::String(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
                .ok()
        }
        Value::Number(n) => n.as_f64().and_then(from_serial_day),
        _ => None,
    };

    parsed.ok_or_else(|| RowError::InvalidValue {
        column,
        value: cell_text(raw),
    })
}

fn from_serial_day(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}
