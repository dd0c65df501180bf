//! Core type definitions

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::{parse_ratio, CoreError, CoreResult};

/// Directed currency pair: `base` is the currency wanted, `quote` the one given.
///
/// Unlike a liquidity-pool key this is *not* normalized; `(A, B)` and `(B, A)`
/// are different markets with their own history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: String,
    pub quote: String,
}

impl CurrencyPair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// The same market seen from the other side
    pub fn reversed(&self) -> Self {
        Self {
            base: self.quote.clone(),
            quote: self.base.clone(),
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// One listed offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ratio: String,
    #[serde(deserialize_with = "lenient_stock")]
    pub stock: u64,
}

impl Quote {
    pub fn new(ratio: impl Into<String>, stock: u64) -> Self {
        Self {
            ratio: ratio.into(),
            stock,
        }
    }

    /// Parsed ratio, `0.0` when the text is unusable
    pub fn rate(&self) -> f64 {
        parse_ratio(&self.ratio)
    }
}

/// Accepts integers, numeric strings ("1,200", "12.0") and floats; everything
/// else becomes 0 so a noisy extraction never rejects the whole document.
fn lenient_stock<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let stock = match value {
        serde_json::Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(whole_stock)),
        serde_json::Value::String(s) => {
            // Thousands separators only; the decimal point must survive
            let cleaned: String = s
                .chars()
                .filter(|c| !matches!(c, ',' | '_') && !c.is_whitespace())
                .collect();
            cleaned.parse::<f64>().ok().and_then(whole_stock)
        }
        _ => None,
    };
    Ok(stock.unwrap_or(0))
}

/// Truncate a finite, non-negative count
fn whole_stock(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then(|| value.trunc() as u64)
}

/// One observation of a directed currency pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub want_currency: String,
    pub have_currency: String,
    pub market_ratio: String,
    /// Offers the scanner could accept, in capture order
    pub available_quotes: Vec<Quote>,
    /// Offers made in the competing direction, in capture order
    pub competing_quotes: Vec<Quote>,
    pub captured_at: DateTime<Utc>,
}

impl MarketSnapshot {
    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.want_currency.clone(), self.have_currency.clone())
    }

    /// Validate a wire document and stamp it with a capture time.
    ///
    /// `fallback_time` is used only when the document carries no `captured_at`.
    pub fn from_wire(raw: RawSnapshot, fallback_time: DateTime<Utc>) -> CoreResult<Self> {
        let want = raw.i_want.trim();
        let have = raw.i_have.trim();

        if want.is_empty() || have.is_empty() {
            return Err(CoreError::InvalidSnapshot(format!(
                "empty currency name (i_want={:?}, i_have={:?})",
                raw.i_want, raw.i_have
            )));
        }
        if want == have {
            return Err(CoreError::InvalidSnapshot(format!(
                "i_want and i_have are both {want:?}"
            )));
        }

        Ok(Self {
            want_currency: want.to_string(),
            have_currency: have.to_string(),
            market_ratio: raw.market_ratio,
            available_quotes: raw.available_trades,
            competing_quotes: raw.competing_trades,
            captured_at: raw.captured_at.unwrap_or(fallback_time),
        })
    }

    pub fn from_json(json: &str, fallback_time: DateTime<Utc>) -> CoreResult<Self> {
        let raw: RawSnapshot = serde_json::from_str(json)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        Self::from_wire(raw, fallback_time)
    }

    /// Back to the upstream document shape
    pub fn to_wire(&self) -> RawSnapshot {
        RawSnapshot {
            i_want: self.want_currency.clone(),
            i_have: self.have_currency.clone(),
            market_ratio: self.market_ratio.clone(),
            available_trades: self.available_quotes.clone(),
            competing_trades: self.competing_quotes.clone(),
            captured_at: Some(self.captured_at),
        }
    }
}

/// Snapshot document as produced by the extraction step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    pub i_want: String,
    pub i_have: String,
    #[serde(default)]
    pub market_ratio: String,
    #[serde(default)]
    pub available_trades: Vec<Quote>,
    #[serde(default)]
    pub competing_trades: Vec<Quote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

/// Capture time encoded in an archive file name, e.g. `20250114_153002_market`.
pub fn timestamp_from_stem(stem: &str) -> Option<DateTime<Utc>> {
    let prefix = stem.get(..15)?;
    NaiveDateTime::parse_from_str(prefix, "%Y%m%d_%H%M%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
