//! Foreign-side declarations generated from the canonical schema.
//!
//! Instead of hand-maintaining a header per integration point, every side of
//! the boundary gets its declarations from one [`BindingConfig`] and the
//! Rust record tables.

pub mod emit;

pub use emit::{c_header, cffi_cdef, fortran_interface};

use crate::error::TransitError;
use crate::schema::SchemaVersion;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Names and schema used when emitting foreign declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BindingConfig {
    /// Record generation to emit.
    pub schema: SchemaVersion,
    /// Typedef name of the record.
    pub record_name: String,
    /// Typedef name of the union.
    pub union_name: String,
    /// Symbol of the foreign entry point.
    pub entry_symbol: String,
    /// Export annotation placed on the prototype (e.g. `CFFI_DLLEXPORT`).
    pub export_macro: Option<String>,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            schema: SchemaVersion::V2,
            record_name: "data_t".to_string(),
            union_name: "union_t".to_string(),
            entry_symbol: crate::boundary::ENTRY_SYMBOL.to_string(),
            export_macro: None,
        }
    }
}

impl BindingConfig {
    /// Parse and validate a YAML description. Missing keys keep their defaults.
    pub fn from_yaml(text: &str) -> Result<Self, TransitError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TransitError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Check that every configured name is a usable C identifier.
    pub fn validate(&self) -> Result<(), TransitError> {
        let mut names = vec![
            ("record_name", self.record_name.as_str()),
            ("union_name", self.union_name.as_str()),
            ("entry_symbol", self.entry_symbol.as_str()),
        ];
        if let Some(export_macro) = &self.export_macro {
            names.push(("export_macro", export_macro.as_str()));
        }

        for (key, name) in names {
            if !is_c_identifier(name) {
                return Err(TransitError::InvalidConfig(format!(
                    "{key} `{name}` is not a C identifier"
                )));
            }
        }

        if self.record_name == self.union_name {
            return Err(TransitError::InvalidConfig(format!(
                "record and union share the name `{}`",
                self.record_name
            )));
        }

        Ok(())
    }
}

/// C11 keywords, plus the `bool` macro from `<stdbool.h>` the header includes.
const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Alignas", "_Alignof", "_Atomic", "_Bool",
    "_Complex", "_Generic", "_Imaginary", "_Noreturn", "_Static_assert", "_Thread_local", "bool",
];

fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !C_KEYWORDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_bridge_header() {
        let config = BindingConfig::default();
        assert_eq!(config.record_name, "data_t");
        assert_eq!(config.union_name, "union_t");
        assert_eq!(config.entry_symbol, "python_function");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_override() {
        let config = BindingConfig::from_yaml(
            "schema: v3\nrecord_name: point_t\nexport_macro: CFFI_DLLEXPORT\n",
        )
        .unwrap();
        assert_eq!(config.schema, SchemaVersion::V3);
        assert_eq!(config.record_name, "point_t");
        assert_eq!(config.union_name, "union_t");
        assert_eq!(config.export_macro.as_deref(), Some("CFFI_DLLEXPORT"));
    }

    #[test]
    fn test_yaml_rejects_unknown_schema() {
        let err = BindingConfig::from_yaml("schema: v9\n").unwrap_err();
        assert!(matches!(err, TransitError::Yaml(_)));
    }

    #[test]
    fn test_invalid_identifiers() {
        let err = BindingConfig::from_yaml("record_name: 2d_point\n").unwrap_err();
        assert!(matches!(err, TransitError::InvalidConfig(_)));

        let err = BindingConfig::from_yaml("union_name: data_t\n").unwrap_err();
        assert!(matches!(err, TransitError::InvalidConfig(_)));

        let err = BindingConfig::from_yaml("entry_symbol: int\n").unwrap_err();
        assert!(matches!(err, TransitError::InvalidConfig(_)));
    }

    #[test]
    fn test_control_flow_keywords_are_not_names() {
        for yaml in [
            "record_name: return\n",
            "union_name: static\n",
            "entry_symbol: while\n",
            "record_name: _Bool\n",
        ] {
            let err = BindingConfig::from_yaml(yaml).unwrap_err();
            assert!(matches!(err, TransitError::InvalidConfig(_)), "{yaml}");
        }
        assert!(BindingConfig::from_yaml("record_name: returns_t\n").is_ok());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("transitrs-config-{}.yaml", std::process::id()));
        std::fs::write(&path, "schema: v1\nentry_symbol: check_data\n").unwrap();

        let config = BindingConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.schema, SchemaVersion::V1);
        assert_eq!(config.entry_symbol, "check_data");

        assert!(matches!(
            BindingConfig::from_file(&path),
            Err(TransitError::Io(_))
        ));
    }
}
