//! Instrument code notations.
//!
//! Data files name the same instrument two ways:
//! - detail form `000001.SZ` (six digits, uppercase exchange suffix)
//! - kline form `sz.000001` (lowercase exchange prefix, six digits)
//!
//! Conversion is permissive: a string matching neither pattern is handed back
//! unchanged so lookups across heterogeneous sources never fail outright.
//! Callers must tolerate an echoed identifier in either position.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static DETAIL_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([0-9]{6})\.(SZ|SH)$").expect("valid detail-form regex"));

static KLINE_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(SZ|SH)\.([0-9]{6})$").expect("valid kline-form regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exchange {
    Shenzhen,
    Shanghai,
}

impl Exchange {
    fn from_marker(marker: &str) -> Option<Self> {
        match marker.to_ascii_uppercase().as_str() {
            "SZ" => Some(Exchange::Shenzhen),
            "SH" => Some(Exchange::Shanghai),
            _ => None,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Exchange::Shenzhen => "SZ",
            Exchange::Shanghai => "SH",
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Exchange::Shenzhen => "sz",
            Exchange::Shanghai => "sh",
        }
    }
}

/// A recognised six-digit code on one of the two exchanges.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstrumentCode {
    pub exchange: Exchange,
    pub digits: String,
}

impl InstrumentCode {
    /// Parses either notation. Returns `None` for anything else.
    pub fn parse(code: &str) -> Option<Self> {
        if let Some(caps) = DETAIL_FORM.captures(code) {
            return Some(Self {
                exchange: Exchange::from_marker(&caps[2])?,
                digits: caps[1].to_string(),
            });
        }
        if let Some(caps) = KLINE_FORM.captures(code) {
            return Some(Self {
                exchange: Exchange::from_marker(&caps[1])?,
                digits: caps[2].to_string(),
            });
        }
        None
    }

    pub fn detail_form(&self) -> String {
        format!("{}.{}", self.digits, self.exchange.suffix())
    }

    pub fn kline_form(&self) -> String {
        format!("{}.{}", self.exchange.prefix(), self.digits)
    }
}

impl fmt::Display for InstrumentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.detail_form())
    }
}

pub trait CodeNormalizer {
    /// `NNNNNN.SZ` → `sz.NNNNNN`; other input unchanged.
    fn to_kline_form(&self, code: &str) -> String;

    /// `sz.NNNNNN` → `NNNNNN.SZ`; other input unchanged.
    fn to_detail_form(&self, code: &str) -> String;

    /// Both forms of a recognised code as `(detail, kline)`, or the input
    /// twice when neither pattern matches.
    fn normalize(&self, code: &str) -> (String, String) {
        let kline = self.to_kline_form(code);
        let detail = self.to_detail_form(code);
        if kline != code {
            (code.to_ascii_uppercase(), kline)
        } else if detail != code {
            (detail, code.to_ascii_lowercase())
        } else {
            (code.to_string(), code.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCodes;

impl CodeNormalizer for StandardCodes {
    fn to_kline_form(&self, code: &str) -> String {
        if !DETAIL_FORM.is_match(code) {
            return code.to_string();
        }
        InstrumentCode::parse(code)
            .map(|c| c.kline_form())
            .unwrap_or_else(|| code.to_string())
    }

    fn to_detail_form(&self, code: &str) -> String {
        if !KLINE_FORM.is_match(code) {
            return code.to_string();
        }
        InstrumentCode::parse(code)
            .map(|c| c.detail_form())
            .unwrap_or_else(|| code.to_string())
    }

    fn normalize(&self, code: &str) -> (String, String) {
        match InstrumentCode::parse(code) {
            Some(c) => (c.detail_form(), c.kline_form()),
            None => (code.to_string(), code.to_string()),
        }
    }
}

/// Resolves loosely written identifiers to kline form.
///
/// Accepts `SH600000`, `600000SH`, `sh-600000`, either canonical form and a
/// bare six-digit code, in which case a leading `6` means Shanghai and
/// anything else Shenzhen. Input that does not reduce to six digits is
/// returned unchanged.
pub fn infer_kline_form(code: &str) -> String {
    let compact: String = code
        .trim()
        .chars()
        .filter(|c| *c != '-' && *c != '.')
        .collect::<String>()
        .to_ascii_uppercase();

    let (exchange, digits) = if let Some(rest) = compact
        .strip_prefix("SH")
        .map(|d| (Some(Exchange::Shanghai), d))
        .or_else(|| compact.strip_prefix("SZ").map(|d| (Some(Exchange::Shenzhen), d)))
    {
        rest
    } else if let Some(rest) = compact
        .strip_suffix("SH")
        .map(|d| (Some(Exchange::Shanghai), d))
        .or_else(|| compact.strip_suffix("SZ").map(|d| (Some(Exchange::Shenzhen), d)))
    {
        rest
    } else {
        (None, compact.as_str())
    };

    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return code.to_string();
    }

    let exchange = exchange.unwrap_or(if digits.starts_with('6') {
        Exchange::Shanghai
    } else {
        Exchange::Shenzhen
    });

    InstrumentCode {
        exchange,
        digits: digits.to_string(),
    }
    .kline_form()
}

/// True when both identifiers name the same instrument, in either notation.
/// Unrecognised identifiers only match themselves exactly.
pub fn codes_match(a: &str, b: &str) -> bool {
    match (InstrumentCode::parse(a), InstrumentCode::parse(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}
