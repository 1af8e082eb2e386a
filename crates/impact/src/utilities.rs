//! Pretty-printers for debug logging, plus small string helpers used by
//! reports and error messages.

use std::sync::Arc;

use crate::layer::LayerKeywords;
use crate::registry::ImpactFunction;

/// Multi-line listing of admissible functions for the log.
pub fn admissible_functions_to_str(functions: &[&Arc<dyn ImpactFunction>]) -> String {
    let mut result = String::from("\n------------ Admissible Functions ------------------------\n");
    for function in functions {
        result.push_str(&format!("ID: {}\n", function.id()));
        result.push_str(&format!("Title: {}\n", function.title()));
    }
    result.push_str("---\n");
    result
}

/// Multi-line dump of one or more keyword sets for the log.
pub fn keywords_to_str(keywords: &[LayerKeywords]) -> String {
    let mut result = String::from("\n----------------- Keywords -------------------\n");
    for set in keywords {
        if keywords.len() > 1 {
            result.push_str("---\n");
        }
        for (key, value) in set.pairs() {
            result.push_str(&format!("Key: {key} Value: {value}\n"));
        }
    }
    result
}

/// Comma-joined list.
pub fn pretty_string<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<&str>>()
        .join(", ")
}

pub fn remove_double_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for ch in text.chars() {
        if ch == ' ' {
            if prev_space {
                continue;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
        out.push(ch);
    }
    out
}
