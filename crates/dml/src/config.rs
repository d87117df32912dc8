// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::Deserialize;

/// Compatibility switches for non-standard syntax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Dialect {
	/// `REPLACE INTO`, `INSERT IGNORE`, `VALUE`, `ON DUPLICATE KEY UPDATE`
	/// and `VALUES (..)` on the right-hand side of a SET clause.
	pub mysql: bool,
	/// Table-qualified names in INSERT column lists and bracket-less CALL.
	pub oracle: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
	/// Namespace for unqualified names and for synonym lookup.
	pub default_namespace: String,
	pub dialect: Dialect,
	/// Reject `CALL` of anything that is not a stored routine.
	pub strict_procedure_call: bool,
}

impl Default for CompilerConfig {
	fn default() -> Self {
		Self {
			default_namespace: "public".to_string(),
			dialect: Dialect::default(),
			strict_procedure_call: false,
		}
	}
}

impl CompilerConfig {
	pub fn from_json(json: &str) -> serde_json::Result<Self> {
		serde_json::from_str(json)
	}

	pub fn mysql() -> Self {
		Self {
			dialect: Dialect {
				mysql: true,
				oracle: false,
			},
			..Self::default()
		}
	}

	pub fn oracle() -> Self {
		Self {
			dialect: Dialect {
				mysql: false,
				oracle: true,
			},
			..Self::default()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = CompilerConfig::default();
		assert_eq!(config.default_namespace, "public");
		assert!(!config.dialect.mysql);
		assert!(!config.strict_procedure_call);
	}

	#[test]
	fn test_from_json_partial() {
		let config = CompilerConfig::from_json(r#"{ "dialect": { "mysql": true }, "strict_procedure_call": true }"#)
			.unwrap();
		assert_eq!(config.default_namespace, "public");
		assert!(config.dialect.mysql);
		assert!(!config.dialect.oracle);
		assert!(config.strict_procedure_call);
	}

	#[test]
	fn test_from_json_rejects_garbage() {
		assert!(CompilerConfig::from_json("{ \"dialect\": 3 }").is_err());
	}
}
