//! Simple TOML parser for sensor configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! the sensor configuration. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, float, boolean)
//! - `[zmod4510]` and `[zmod4510.ambient]` section headers
//! - Hex integers (`0x33`)
//! - Durations with `ms`, `s` or `min` suffix (`"60s"`)
//! - Comments (# ...)
//!
//! Example:
//!
//! ```toml
//! [zmod4510]
//! address = 0x33
//! update_interval = "60s"
//! aqi = false
//!
//! [zmod4510.ambient]
//! humidity = 45.0
//! temperature = 21.5
//! ```

use super::types::{ConfigError, SensorConfig};

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Sensor,
    Ambient,
}

/// Parse TOML configuration into SensorConfig
///
/// Missing keys keep their defaults. The result is validated before it is
/// returned.
pub fn parse_config(input: &str) -> Result<SensorConfig, ConfigError> {
    let mut config = SensorConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(line[1..line.len() - 1].trim())?;
            continue;
        }

        let (key, value) = split_assignment(line).ok_or(ConfigError::InvalidValue)?;
        apply_value(&mut config, section, key, value)?;
    }

    config.validate()?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ConfigError> {
    match header {
        "zmod4510" => Ok(Section::Sensor),
        "zmod4510.ambient" => Ok(Section::Ambient),
        _ => Err(ConfigError::InvalidSection),
    }
}

fn apply_value(
    config: &mut SensorConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    match (section, key) {
        (Section::Root, _) => return Err(ConfigError::InvalidSection),

        (Section::Sensor, "address") => config.address = parse_address(value)?,
        (Section::Sensor, "update_interval") => config.update_interval_ms = parse_duration_ms(value)?,
        (Section::Sensor, "no2") => config.no2 = parse_bool(value)?,
        (Section::Sensor, "o3") => config.o3 = parse_bool(value)?,
        (Section::Sensor, "aqi") => config.aqi = parse_bool(value)?,

        (Section::Ambient, "humidity") => config.ambient.humidity_pct = parse_float(value)?,
        (Section::Ambient, "temperature") => config.ambient.temperature_degc = parse_float(value)?,

        _ => return Err(ConfigError::UnknownKey),
    }
    Ok(())
}

/// Split a `key = value` line, dropping any trailing comment
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let (key, value) = (key.trim(), strip_comment(value).trim());
    (!key.is_empty() && !value.is_empty()).then_some((key, value))
}

/// Cut a value at the first `#` that is outside double quotes
fn strip_comment(value: &str) -> &str {
    let mut quoted = false;
    for (i, c) in value.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '#' if !quoted => return &value[..i],
            _ => {}
        }
    }
    value
}

/// Remove surrounding double quotes, if present
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Parse an unsigned integer, decimal or `0x` hex
///
/// `_` is accepted as a digit separator.
fn parse_uint(value: &str) -> Result<u64, ConfigError> {
    let (digits, radix) = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (value, 10),
    };

    if digits.is_empty() || digits.starts_with('_') {
        return Err(ConfigError::InvalidValue);
    }

    let mut acc: u64 = 0;
    for c in digits.chars().filter(|c| *c != '_') {
        let digit = c.to_digit(radix).ok_or(ConfigError::InvalidValue)?;
        acc = acc
            .checked_mul(radix as u64)
            .and_then(|a| a.checked_add(digit as u64))
            .ok_or(ConfigError::OutOfRange)?;
    }
    Ok(acc)
}

/// Parse a 7-bit bus address
fn parse_address(value: &str) -> Result<u8, ConfigError> {
    let address = parse_uint(unquote(value))?;
    if address > super::types::MAX_ADDRESS as u64 {
        return Err(ConfigError::OutOfRange);
    }
    Ok(address as u8)
}

/// Parse a duration into milliseconds
///
/// Bare integers are milliseconds.
fn parse_duration_ms(value: &str) -> Result<u32, ConfigError> {
    let value = unquote(value).trim();

    let (number, scale) = if let Some(n) = value.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = value.strip_suffix("min") {
        (n, 60_000)
    } else if let Some(n) = value.strip_suffix('s') {
        (n, 1_000)
    } else {
        (value, 1)
    };

    let ms = parse_uint(number.trim())?
        .checked_mul(scale)
        .ok_or(ConfigError::OutOfRange)?;
    u32::try_from(ms).map_err(|_| ConfigError::OutOfRange)
}

/// Parse a float value
fn parse_float(value: &str) -> Result<f32, ConfigError> {
    let value: f32 = value.parse().map_err(|_| ConfigError::InvalidValue)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue)
    }
}

/// Parse a bare `true` or `false`
fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue)
}
