//! Input Validator
//!
//! Raw form text → `FeatureVector`. Pure, no I/O.
//!
//! Range policy: values must be finite, non-negative and below
//! `MAX_MEASUREMENT`. Clinical plausibility is otherwise not checked.

use std::collections::HashMap;

use crate::error::ValidationError;
use super::vector::{FeatureVector, Sex};

/// Ceiling on any measurement. Far above any real lab value, low enough
/// that scaling and linear scoring stay finite.
pub const MAX_MEASUREMENT: f64 = 1.0e6;

/// Older forms name the gender field `sex`
const SEX_ALIAS: &str = "sex";

/// Parse a field-name → text mapping into a feature vector.
///
/// Keys are the layout names (`gender`, `age`, `urea`, ...); `sex` is accepted
/// for `gender`. Keys not in the layout are ignored. Every layout field is required.
pub fn parse(raw: &HashMap<String, String>) -> Result<FeatureVector, ValidationError> {
    let unknown = raw
        .keys()
        .filter(|k| k.as_str() != SEX_ALIAS && super::layout::feature_index(k).is_none())
        .count();
    if unknown > 0 {
        log::debug!("Ignoring {} unknown form field(s)", unknown);
    }

    Ok(FeatureVector {
        gender: parse_sex(raw)?,
        age: parse_age(raw)?,
        urea: parse_measurement(raw, "urea")?,
        cr: parse_measurement(raw, "cr")?,
        hba1c: parse_measurement(raw, "hba1c")?,
        chol: parse_measurement(raw, "chol")?,
        tg: parse_measurement(raw, "tg")?,
        hdl: parse_measurement(raw, "hdl")?,
        ldl: parse_measurement(raw, "ldl")?,
        vldl: parse_measurement(raw, "vldl")?,
        bmi: parse_measurement(raw, "bmi")?,
    })
}

fn field<'a>(raw: &'a HashMap<String, String>, name: &'static str) -> Result<&'a str, ValidationError> {
    let value = raw
        .get(name)
        .map(|v| v.trim())
        .ok_or_else(|| ValidationError::new(name, "is missing"))?;

    if value.is_empty() {
        return Err(ValidationError::new(name, "is empty"));
    }
    Ok(value)
}

fn parse_sex(raw: &HashMap<String, String>) -> Result<Sex, ValidationError> {
    let value = if raw.contains_key("gender") {
        field(raw, "gender")?
    } else {
        field(raw, SEX_ALIAS).map_err(|e| ValidationError::new("gender", e.reason))?
    };
    Sex::from_label(value)
        .ok_or_else(|| ValidationError::new("gender", format!("`{}` is not male/female", value)))
}

fn parse_age(raw: &HashMap<String, String>) -> Result<u32, ValidationError> {
    let value = field(raw, "age")?;
    match value.parse::<u32>() {
        Ok(0) => Err(ValidationError::new("age", "must be positive")),
        Ok(age) => Ok(age),
        Err(_) => Err(ValidationError::new("age", format!("`{}` is not a positive integer", value))),
    }
}

fn parse_measurement(raw: &HashMap<String, String>, name: &'static str) -> Result<f64, ValidationError> {
    let value = field(raw, name)?;
    let parsed: f64 = value
        .parse()
        .map_err(|_| ValidationError::new(name, format!("`{}` is not a number", value)))?;

    if !parsed.is_finite() {
        return Err(ValidationError::new(name, "must be finite"));
    }
    if parsed < 0.0 {
        return Err(ValidationError::new(name, "must not be negative"));
    }
    if parsed > MAX_MEASUREMENT {
        return Err(ValidationError::new(name, format!("must not exceed {}", MAX_MEASUREMENT)));
    }
    Ok(parsed)
}
