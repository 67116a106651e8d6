//! Lenient deserializers for draft fields.
//!
//! Drafts arrive both as URL-encoded HTML forms (every value is a string,
//! unchecked checkboxes are simply absent) and as JSON. These helpers accept
//! either shape.

use std::fmt;

use serde::Deserializer;
use serde::de::{self, Visitor};

struct CheckboxVisitor;

impl Visitor<'_> for CheckboxVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a boolean or a checkbox value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
        Ok(v)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
        Ok(matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "on" | "true" | "1" | "yes"
        ))
    }

    fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }
}

/// `on`, `true`, `1`, `yes` (or JSON `true`) mean checked.
pub fn checkbox<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    deserializer.deserialize_any(CheckboxVisitor)
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
        let trimmed = v.trim().replace(',', "");
        if trimmed.is_empty() {
            return Ok(0.0);
        }
        trimmed
            .parse::<f64>()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

/// Numbers or numeric strings; blank input becomes `0`.
pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    deserializer.deserialize_any(AmountVisitor)
}

struct OptionalIdVisitor;

impl<'de> Visitor<'de> for OptionalIdVisitor {
    type Value = Option<i32>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer identifier or blank")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Option<i32>, E> {
        i32::try_from(v)
            .map(Some)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Option<i32>, E> {
        i32::try_from(v)
            .map(Some)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Option<i32>, E> {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse::<i32>()
            .map(Some)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Option<i32>, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Option<i32>, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Option<i32>, D::Error> {
        deserializer.deserialize_any(self)
    }
}

/// Foreign-key select values; blank means "none selected".
pub fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    deserializer.deserialize_any(OptionalIdVisitor)
}

/// Non-negative whole numbers (e.g. day counts); blank becomes `0`.
pub fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = amount(deserializer)?;
    if value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(de::Error::custom("expected a non-negative whole number"));
    }
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Sample {
        #[serde(deserialize_with = "super::checkbox")]
        active: bool,
        #[serde(deserialize_with = "super::amount")]
        total: f64,
        #[serde(deserialize_with = "super::optional_id")]
        region: Option<i32>,
        #[serde(deserialize_with = "super::whole_number")]
        days: u32,
    }

    #[test]
    fn html_form_values_are_accepted() {
        let sample: Sample =
            serde_html_form::from_str("active=on&total=1%2C250.50&region=&days=30").unwrap();
        assert!(sample.active);
        assert_eq!(sample.total, 1250.5);
        assert_eq!(sample.region, None);
        assert_eq!(sample.days, 30);
    }

    #[test]
    fn missing_checkbox_means_unchecked() {
        let sample: Sample = serde_html_form::from_str("total=3&region=4").unwrap();
        assert!(!sample.active);
        assert_eq!(sample.region, Some(4));
    }

    #[test]
    fn json_values_are_accepted() {
        let sample: Sample = serde_json::from_value(serde_json::json!({
            "active": true, "total": 12, "region": null, "days": 14
        }))
        .unwrap();
        assert!(sample.active);
        assert_eq!(sample.total, 12.0);
        assert_eq!(sample.region, None);
        assert_eq!(sample.days, 14);
    }

    #[test]
    fn fractional_days_are_rejected() {
        assert!(serde_html_form::from_str::<Sample>("days=1.5").is_err());
    }
}
