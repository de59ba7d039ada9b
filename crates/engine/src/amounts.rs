//! Snow and ice amount extraction.
//!
//! Each hazard is resolved by an ordered cascade of independent strategies;
//! the first one that yields a value wins:
//! 1. structured inches published with the period
//! 2. explicit amounts written in the forecast text
//! 3. a keyword estimate scaled by precipitation probability
//!
//! Every strategy fails closed: text it cannot read yields `None`.

use std::sync::OnceLock;

use log::trace;
use regex::Regex;
use serde::Serialize;

use crate::{effective_snow, ForecastDay, ForecastPeriod};

const NUMBER: &str = r"(\d+(?:\.\d+)?|\.\d+)";
const UNIT: &str = r"(inches|inch|feet|foot)\b";

/// Ice-equivalent assigned to sleet or ice pellets
pub const SLEET_ICE_EQUIVALENT: f64 = 0.08;

/// Ice forms from liquid precipitation only near or below this temperature
pub const ICE_MAX_TEMPERATURE_F: i32 = 38;

const SNOW_PHRASES: [(&str, f64); 5] = [
    ("less than half an inch", 0.3),
    ("less than one inch", 0.6),
    ("less than an inch", 0.6),
    ("around an inch", 1.0),
    ("around one inch", 1.0),
];

const ICE_PHRASES: [(&str, f64); 10] = [
    ("less than one tenth of an inch", 0.08),
    ("less than a quarter of an inch", 0.20),
    ("less than one quarter of an inch", 0.20),
    ("less than a quarter inch", 0.20),
    ("less than a tenth of an inch", 0.08),
    ("less than half an inch", 0.40),
    ("a tenth of an inch", 0.10),
    ("a quarter of an inch", 0.25),
    ("quarter of an inch", 0.25),
    ("a quarter inch", 0.25),
];

const ICE_KEYWORDS: [(&str, f64); 4] = [
    ("ice storm", 0.50),
    ("freezing rain", 0.15),
    ("glaze", 0.10),
    ("freezing drizzle", 0.05),
];

const ICE_VETO_PHRASES: [&str; 3] = [
    "little or no ice accumulation",
    "no ice accumulation",
    "little ice accumulation",
];

/// Which tier of the cascade produced an amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AmountSource {
    Structured,
    RegexRange,
    RegexSingle,
    Keyword,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Amount {
    pub inches: f64,
    pub source: AmountSource,
}

impl Amount {
    pub const NONE: Amount = Amount {
        inches: 0.0,
        source: AmountSource::None,
    };

    fn new(inches: f64, source: AmountSource) -> Self {
        Self {
            inches: inches.max(0.0),
            source,
        }
    }

    /// Structured or written-out amounts, as opposed to guesses
    pub fn is_explicit(&self) -> bool {
        matches!(
            self.source,
            AmountSource::Structured | AmountSource::RegexRange | AmountSource::RegexSingle
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodAmounts {
    pub snow: Amount,
    pub ice: Amount,
}

impl PeriodAmounts {
    pub const NONE: PeriodAmounts = PeriodAmounts {
        snow: Amount::NONE,
        ice: Amount::NONE,
    };

    pub fn effective_inches(&self) -> f64 {
        effective_snow(self.snow.inches, self.ice.inches)
    }

    /// Whether any amount, however small, was resolved
    pub fn has_signal(&self) -> bool {
        self.effective_inches() > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hazard {
    Snow,
    Ice,
}

/// One tier of the extraction cascade
pub type AmountStrategy = fn(&ForecastDay<'_>) -> Option<Amount>;

pub const SNOW_STRATEGIES: [AmountStrategy; 3] = [structured_snow, text_snow, keyword_snow];
pub const ICE_STRATEGIES: [AmountStrategy; 3] = [structured_ice, text_ice, keyword_ice];

/// First strategy that yields a value, or [`Amount::NONE`].
pub fn resolve_amount(day: &ForecastDay<'_>, strategies: &[AmountStrategy]) -> Amount {
    strategies
        .iter()
        .find_map(|strategy| strategy(day))
        .unwrap_or(Amount::NONE)
}

pub fn extract_amounts(day: &ForecastDay<'_>) -> PeriodAmounts {
    let amounts = PeriodAmounts {
        snow: resolve_amount(day, &SNOW_STRATEGIES),
        ice: resolve_amount(day, &ICE_STRATEGIES),
    };
    trace!(
        "{} ({}): snow {:.2}in via {:?}, ice {:.2}in via {:?}",
        day.period.name,
        day.date,
        amounts.snow.inches,
        amounts.snow.source,
        amounts.ice.inches,
        amounts.ice.source
    );
    amounts
}

/// The keyword tier on its own, ignoring structured and written amounts.
pub fn keyword_amounts(day: &ForecastDay<'_>) -> PeriodAmounts {
    PeriodAmounts {
        snow: keyword_snow(day).unwrap_or(Amount::NONE),
        ice: keyword_ice(day).unwrap_or(Amount::NONE),
    }
}

fn structured_total(
    day: &ForecastDay<'_>,
    field: fn(&ForecastPeriod) -> Option<f64>,
) -> Option<Amount> {
    let mut total: Option<f64> = None;
    for value in day.periods().filter_map(field).filter(|v| v.is_finite()) {
        *total.get_or_insert(0.0) += value.max(0.0);
    }
    total.map(|inches| Amount::new(inches, AmountSource::Structured))
}

fn structured_snow(day: &ForecastDay<'_>) -> Option<Amount> {
    structured_total(day, |p| p.snowfall_inches)
}

fn structured_ice(day: &ForecastDay<'_>) -> Option<Amount> {
    structured_total(day, |p| p.ice_inches)
}

fn text_total(day: &ForecastDay<'_>, hazard: Hazard) -> Option<Amount> {
    day.periods()
        .filter_map(|period| {
            parse_amount(&period.detailed_forecast, hazard)
                .or_else(|| parse_amount(&period.short_forecast, hazard))
        })
        .reduce(|acc, found| {
            let source = if acc.source == AmountSource::RegexRange
                || found.source == AmountSource::RegexRange
            {
                AmountSource::RegexRange
            } else {
                AmountSource::RegexSingle
            };
            Amount::new(acc.inches + found.inches, source)
        })
}

fn text_snow(day: &ForecastDay<'_>) -> Option<Amount> {
    text_total(day, Hazard::Snow)
}

fn text_ice(day: &ForecastDay<'_>) -> Option<Amount> {
    text_total(day, Hazard::Ice)
}

fn keyword_snow(day: &ForecastDay<'_>) -> Option<Amount> {
    let inches = day
        .periods()
        .map(|p| snow_keyword_inches(&p.text_lower()) * p.precip_fraction())
        .fold(0.0, f64::max);
    (inches > 0.0).then(|| Amount::new(inches, AmountSource::Keyword))
}

fn keyword_ice(day: &ForecastDay<'_>) -> Option<Amount> {
    let inches = day
        .periods()
        .map(|p| ice_keyword_inches(&p.text_lower(), p.temperature_f) * p.precip_fraction())
        .fold(0.0, f64::max);
    (inches > 0.0).then(|| Amount::new(inches, AmountSource::Keyword))
}

/// Unscaled snow estimate from descriptive wording.
pub fn snow_keyword_inches(text_lower: &str) -> f64 {
    let has = |words: &[&str]| words.iter().any(|w| text_lower.contains(w));

    if has(&["heavy snow", "blizzard"]) {
        6.0
    } else if has(&["moderate snow", "snow likely", "likely snow", "snow showers likely"]) {
        3.0
    } else if has(&["light snow", "chance snow", "chance of snow", "flurries"]) {
        1.0
    } else {
        0.0
    }
}

/// Unscaled ice estimate from descriptive wording at `temperature_f`.
pub fn ice_keyword_inches(text_lower: &str, temperature_f: i32) -> f64 {
    if temperature_f > ICE_MAX_TEMPERATURE_F {
        return 0.0;
    }
    if text_lower.contains("sleet") || text_lower.contains("ice pellets") {
        return SLEET_ICE_EQUIVALENT;
    }
    if ICE_VETO_PHRASES.iter().any(|p| text_lower.contains(p)) {
        return 0.0;
    }
    ICE_KEYWORDS
        .iter()
        .find(|(keyword, _)| text_lower.contains(keyword))
        .map_or(0.0, |(_, inches)| *inches)
}

/// Explicit amount for `hazard` written in `text`, if any.
///
/// Only sentences about the hazard are read, so an ice accretion figure is
/// never mistaken for snowfall. When several sentences carry amounts the
/// largest wins (storm totals restate period amounts).
pub fn parse_amount(text: &str, hazard: Hazard) -> Option<Amount> {
    let lower = text.to_lowercase();
    sentences(&lower)
        .filter(|sentence| sentence_mentions(sentence, hazard))
        .filter_map(|sentence| parse_sentence(sentence, hazard))
        .reduce(|best, next| if next.inches > best.inches { next } else { best })
}

fn sentences(text: &str) -> impl Iterator<Item = &str> {
    let parts: Vec<&str> = match sentence_break() {
        Some(re) => re.split(text).collect(),
        None => vec![text],
    };
    parts.into_iter().map(str::trim).filter(|s| !s.is_empty())
}

fn is_ice_sentence(sentence: &str) -> bool {
    sentence.contains("ice accumulation")
        || sentence.contains("ice accretion")
        || sentence.contains("glaze")
}

fn sentence_mentions(sentence: &str, hazard: Hazard) -> bool {
    match hazard {
        Hazard::Ice => is_ice_sentence(sentence),
        Hazard::Snow => {
            !is_ice_sentence(sentence)
                && !sentence.contains("rainfall")
                && (sentence.contains("snow") || sentence.contains("accumulation"))
        }
    }
}

fn parse_sentence(sentence: &str, hazard: Hazard) -> Option<Amount> {
    if let Some(caps) = range_pattern().and_then(|re| re.captures(sentence)) {
        let low = caps.get(1)?.as_str().parse::<f64>().ok();
        let high = caps.get(2)?.as_str().parse::<f64>().ok();
        if let (Some(low), Some(high)) = (low, high) {
            let scale = unit_scale(caps.get(3).map_or("", |m| m.as_str()));
            return Some(Amount::new(
                (low + high) / 2.0 * scale,
                AmountSource::RegexRange,
            ));
        }
    }

    if let Some(caps) = single_pattern().and_then(|re| re.captures(sentence)) {
        if let Some(value) = caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok()) {
            let scale = unit_scale(caps.get(3).map_or("", |m| m.as_str()));
            let qualifier = match (caps.get(1).map(|m| m.as_str().trim()), hazard) {
                (Some("less than"), Hazard::Snow) => 0.6,
                (Some("less than"), Hazard::Ice) => 0.8,
                _ => 1.0,
            };
            return Some(Amount::new(
                value * scale * qualifier,
                AmountSource::RegexSingle,
            ));
        }
    }

    let phrases: &[(&str, f64)] = match hazard {
        Hazard::Snow => &SNOW_PHRASES,
        Hazard::Ice => &ICE_PHRASES,
    };
    phrases
        .iter()
        .find(|(phrase, _)| sentence.contains(phrase))
        .map(|(_, inches)| Amount::new(*inches, AmountSource::RegexSingle))
}

fn unit_scale(unit: &str) -> f64 {
    match unit {
        "feet" | "foot" => 12.0,
        _ => 1.0,
    }
}

/// Short label for the amount written in a forecast, e.g. `3-5"`,
/// `<1"`, `Heavy`.
pub fn describe_text_amount(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let snow_sentence = sentences(&lower)
        .filter(|s| sentence_mentions(s, Hazard::Snow))
        .find_map(|s| range_pattern().and_then(|re| re.captures(s)));
    if let Some(caps) = snow_sentence {
        let scale = unit_scale(caps.get(3).map_or("", |m| m.as_str()));
        let low = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok());
        let high = caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok());
        if let (Some(low), Some(high)) = (low, high) {
            return Some(format!("{}-{}\"", low * scale, high * scale));
        }
    }

    if lower.contains("snow accumulation of less than half an inch") {
        Some(String::from("<0.5\""))
    } else if lower.contains("snow accumulation of less than one inch") {
        Some(String::from("<1\""))
    } else if lower.contains("heavy snow") || lower.contains("blizzard") {
        Some(String::from("Heavy"))
    } else if lower.contains("snow showers") || lower.contains("flurries") {
        Some(String::from("Light"))
    } else if lower.contains("snow") && !lower.contains("chance") {
        Some(String::from("Moderate"))
    } else {
        None
    }
}

/// Whether `text_lower` names ice as a word, not inside "notice" or "price".
pub fn mentions_ice(text_lower: &str) -> bool {
    ice_word().is_some_and(|re| re.is_match(text_lower))
}

fn compile(cell: &'static OnceLock<Option<Regex>>, pattern: impl FnOnce() -> String) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(&pattern()).ok()).as_ref()
}

fn sentence_break() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    compile(&CELL, || String::from(r"[.!?;](?:\s+|$)"))
}

fn ice_word() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    compile(&CELL, || String::from(r"\bice\b"))
}

fn range_pattern() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    compile(&CELL, || format!(r"{NUMBER}\s*(?:to|-|–)\s*{NUMBER}\s*{UNIT}"))
}

fn single_pattern() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    compile(&CELL, || {
        format!(r"(less than\s+|up to\s+|around\s+)?{NUMBER}\s*{UNIT}")
    })
}
