//! Data type suggestion for a raw cell value

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\d{1,2}/\d{1,2}/\d{2,4}", // d/m/yyyy
        r"^\d{4}-\d{1,2}-\d{1,2}",   // yyyy-mm-dd
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Boolean literals in English and Vietnamese
const BOOLEAN_LITERALS: &[&str] = &["true", "false", "đúng", "sai", "có", "không"];

/// Suggested type of a cell value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Integer,
    Float,
    Boolean,
    Date,
    String,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::String => "string",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a value; checks run integer, float, boolean, date, falling back to string
pub fn suggest_data_type(data: &str) -> DataType {
    if !data.is_empty() && data.chars().all(|c| c.is_ascii_digit()) {
        return DataType::Integer;
    }

    if data.trim().parse::<f64>().is_ok() {
        return DataType::Float;
    }

    let lowered = data.to_lowercase();
    if BOOLEAN_LITERALS.contains(&lowered.as_str()) {
        return DataType::Boolean;
    }

    if DATE_PATTERNS.iter().any(|re| re.is_match(data)) {
        return DataType::Date;
    }

    DataType::String
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(suggest_data_type("42"), DataType::Integer);
        assert_eq!(suggest_data_type("007"), DataType::Integer);
        assert_eq!(suggest_data_type("-5"), DataType::Float);
        assert_eq!(suggest_data_type("3.14"), DataType::Float);
        assert_eq!(suggest_data_type(" 2.5 "), DataType::Float);
        assert_eq!(suggest_data_type("1e3"), DataType::Float);
    }

    #[test]
    fn test_booleans() {
        for literal in ["true", "FALSE", "Đúng", "sai", "có", "Không"] {
            assert_eq!(suggest_data_type(literal), DataType::Boolean, "{}", literal);
        }
        assert_eq!(suggest_data_type("yes"), DataType::String);
    }

    #[test]
    fn test_dates() {
        assert_eq!(suggest_data_type("1/2/2024"), DataType::Date);
        assert_eq!(suggest_data_type("31/12/99"), DataType::Date);
        assert_eq!(suggest_data_type("2024-03-15"), DataType::Date);
        assert_eq!(suggest_data_type("2024-3-5 10:00"), DataType::Date);
        assert_eq!(suggest_data_type("due 2024-03-15"), DataType::String);
    }

    #[test]
    fn test_fallback_and_display() {
        assert_eq!(suggest_data_type(""), DataType::String);
        assert_eq!(suggest_data_type("Widget"), DataType::String);
        assert_eq!(DataType::Float.to_string(), "float");
        assert_eq!(serde_json::to_value(DataType::Date).unwrap(), "date");
    }
}
