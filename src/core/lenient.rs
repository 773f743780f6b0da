//! Field decoders that turn unreadable values into `None` instead of errors.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Bool(bool),
    Text(String),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseList {
    Items(Vec<Loose>),
    Other(IgnoredAny),
}

impl Loose {
    fn into_number(self) -> Option<f64> {
        match self {
            Loose::Number(n) => Some(n),
            Loose::Text(text) => parse_number(&text),
            Loose::Bool(_) | Loose::Other(_) => None,
        }
    }

    fn into_flag(self) -> Option<bool> {
        match self {
            Loose::Bool(b) => Some(b),
            Loose::Number(n) if n.is_finite() => Some(n != 0.0),
            Loose::Text(text) => parse_flag(&text),
            Loose::Number(_) | Loose::Other(_) => None,
        }
    }
}

pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

pub fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Loose::deserialize(deserializer)?.into_number())
}

pub fn number_list<'de, D>(deserializer: D) -> Result<Option<Vec<Option<f64>>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LooseList::deserialize(deserializer)? {
        LooseList::Items(items) => Some(items.into_iter().map(Loose::into_number).collect()),
        LooseList::Other(_) => None,
    })
}

pub fn flag_list<'de, D>(deserializer: D) -> Result<Option<Vec<Option<bool>>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LooseList::deserialize(deserializer)? {
        LooseList::Items(items) => Some(items.into_iter().map(Loose::into_flag).collect()),
        LooseList::Other(_) => None,
    })
}
