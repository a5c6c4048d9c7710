//! TypeScript-compatible configuration engine.
//!
//! Locates, reads and resolves `tsconfig.json` files, and transpiles single
//! modules. The file-system abstraction used by every other crate in the
//! workspace lives here too.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

pub mod config;
pub mod file_system;
pub mod jsonc;
pub mod program;
pub mod transpile;

#[cfg(test)]
mod test;

pub use config::*;
pub use program::*;
pub use transpile::*;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptTarget {
    ES3,
    ES5,
    ES2015,
    ES2016,
    ES2017,
    ES2018,
    ES2019,
    ES2020,
    ES2021,
    ES2022,
    ESNext,
    JSON,
    Latest,
}

impl FromStr for ScriptTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let target = match s.to_ascii_lowercase().as_str() {
            "es3" => ScriptTarget::ES3,
            "es5" => ScriptTarget::ES5,
            "es6" | "es2015" => ScriptTarget::ES2015,
            "es2016" => ScriptTarget::ES2016,
            "es2017" => ScriptTarget::ES2017,
            "es2018" => ScriptTarget::ES2018,
            "es2019" => ScriptTarget::ES2019,
            "es2020" => ScriptTarget::ES2020,
            "es2021" => ScriptTarget::ES2021,
            "es2022" => ScriptTarget::ES2022,
            "esnext" => ScriptTarget::ESNext,
            "json" => ScriptTarget::JSON,
            "latest" => ScriptTarget::Latest,
            other => return Err(format!("unknown target '{}'", other)),
        };
        Ok(target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsxEmit {
    None,
    Preserve,
    React,
    ReactNative,
    ReactJSX,
    ReactJSXDev,
}

impl FromStr for JsxEmit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let jsx = match s.to_ascii_lowercase().as_str() {
            "none" => JsxEmit::None,
            "preserve" => JsxEmit::Preserve,
            "react" => JsxEmit::React,
            "react-native" => JsxEmit::ReactNative,
            "react-jsx" => JsxEmit::ReactJSX,
            "react-jsxdev" => JsxEmit::ReactJSXDev,
            other => return Err(format!("unknown jsx mode '{}'", other)),
        };
        Ok(jsx)
    }
}

/// Deserializes the case-insensitive string enums tsconfig uses.
macro_rules! deserialize_from_str {
    ($($ty:ty),*) => {
        $(
            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let raw = String::deserialize(deserializer)?;
                    raw.parse().map_err(serde::de::Error::custom)
                }
            }
        )*
    };
}

deserialize_from_str!(ScriptTarget, JsxEmit);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

// --- Diagnostic Structures ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: i32,
    pub file: Option<String>,
    pub message_text: String,
}

impl Diagnostic {
    pub fn error(message_text: impl Into<String>, file: Option<String>) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code: -1,
            file,
            message_text: message_text.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category = match self.category {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Suggestion => "suggestion",
            DiagnosticCategory::Message => "message",
        };
        match &self.file {
            Some(file) => write!(f, "{} TS{}: {} ({})", category, self.code, self.message_text, file),
            None => write!(f, "{} TS{}: {}", category, self.code, self.message_text),
        }
    }
}
