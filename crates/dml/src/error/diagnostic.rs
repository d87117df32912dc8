// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_type::{Diagnostic, IntoDiagnostic};

use crate::error::DmlError;

impl IntoDiagnostic for DmlError {
	fn into_diagnostic(self) -> Diagnostic {
		let message = self.to_string();
		match self {
			DmlError::Syntax {
				expected,
				fragment,
				..
			} => Diagnostic {
				code: "DML_001".to_string(),
				statement: None,
				message,
				fragment,
				label: Some(format!("expected {expected}")),
				help: None,
				notes: vec![],
				cause: None,
			},
			DmlError::UnexpectedEnd {
				expected,
				fragment,
			} => Diagnostic {
				code: "DML_002".to_string(),
				statement: None,
				message,
				fragment,
				label: Some(format!("expected {expected}")),
				help: Some("the statement ends too early".to_string()),
				notes: vec![],
				cause: None,
			},
			DmlError::UnresolvedReference {
				names,
				fragment,
			} => Diagnostic {
				code: "DML_003".to_string(),
				statement: None,
				message,
				fragment,
				label: Some("no table in scope has this column".to_string()),
				help: Some("check the column name or qualify it with a table name or alias".to_string()),
				notes: names.into_iter().map(|name| format!("unresolved: {name}")).collect(),
				cause: None,
			},
			DmlError::TypeMismatch {
				fragment,
				..
			} => Diagnostic {
				code: "DML_004".to_string(),
				statement: None,
				message,
				fragment,
				label: Some("incompatible type".to_string()),
				help: None,
				notes: vec![],
				cause: None,
			},
			DmlError::DegreeMismatch {
				expected,
				actual,
				fragment,
			} => Diagnostic {
				code: "DML_005".to_string(),
				statement: None,
				message,
				fragment,
				label: Some(format!("{actual} values here")),
				help: Some(format!("supply exactly {expected} values, one per target column")),
				notes: vec![],
				cause: None,
			},
			DmlError::IdentityOverrideRequired {
				column,
				fragment,
			} => Diagnostic {
				code: "DML_006".to_string(),
				statement: None,
				message,
				fragment,
				label: Some(format!("explicit value for '{column}'")),
				help: Some(
					"use DEFAULT, or add OVERRIDING SYSTEM VALUE or OVERRIDING USER VALUE".to_string(),
				),
				notes: vec![],
				cause: None,
			},
			DmlError::GeneratedColumnWrite {
				column,
				fragment,
			} => Diagnostic {
				code: "DML_007".to_string(),
				statement: None,
				message,
				fragment,
				label: Some(format!("'{column}' is computed from other columns")),
				help: Some("remove the column from the target list or assign DEFAULT on insert".to_string()),
				notes: vec![],
				cause: None,
			},
			DmlError::OverridingWithoutIdentity {
				fragment,
			} => Diagnostic {
				code: "DML_008".to_string(),
				statement: None,
				message,
				fragment,
				label: Some("no identity column is written".to_string()),
				help: Some("remove the OVERRIDING clause".to_string()),
				notes: vec![],
				cause: None,
			},
			DmlError::DuplicateTarget {
				column,
				fragment,
			} => Diagnostic {
				code: "DML_009".to_string(),
				statement: None,
				message,
				fragment,
				label: Some(format!("'{column}' already assigned")),
				help: None,
				notes: vec![],
				cause: None,
			},
			DmlError::DuplicateMergeBranch {
				branch,
				fragment,
			} => Diagnostic {
				code: "DML_010".to_string(),
				statement: None,
				message,
				fragment,
				label: Some("second occurrence".to_string()),
				help: Some(format!("a MERGE statement accepts at most one WHEN {branch} clause")),
				notes: vec![],
				cause: None,
			},
			DmlError::InvalidOutArgument {
				fragment,
				..
			} => Diagnostic {
				code: "DML_011".to_string(),
				statement: None,
				message,
				fragment,
				label: Some("not assignable".to_string()),
				help: Some("OUT and INOUT parameters need a variable or a parameter marker".to_string()),
				notes: vec![],
				cause: None,
			},
			DmlError::ArgumentTypeMismatch {
				fragment,
				..
			} => Diagnostic {
				code: "DML_012".to_string(),
				statement: None,
				message,
				fragment,
				label: Some("incompatible argument".to_string()),
				help: None,
				notes: vec![],
				cause: None,
			},
			DmlError::UnknownTarget {
				kind,
				fragment,
				..
			} => Diagnostic {
				code: "DML_013".to_string(),
				statement: None,
				message,
				fragment,
				label: Some(format!("unknown {kind}")),
				help: None,
				notes: vec![],
				cause: None,
			},
			DmlError::NotUpdatable {
				fragment,
				..
			} => Diagnostic {
				code: "DML_014".to_string(),
				statement: None,
				message,
				fragment,
				label: Some("view is read only".to_string()),
				help: Some("write to the base table instead".to_string()),
				notes: vec![],
				cause: None,
			},
			DmlError::AmbiguousReference {
				fragment,
				..
			} => Diagnostic {
				code: "DML_015".to_string(),
				statement: None,
				message,
				fragment,
				label: Some("matches more than one table".to_string()),
				help: Some("qualify the column with a table name or alias".to_string()),
				notes: vec![],
				cause: None,
			},
			DmlError::DuplicateRangeName {
				fragment,
				..
			} => Diagnostic {
				code: "DML_016".to_string(),
				statement: None,
				message,
				fragment,
				label: Some("name already in use".to_string()),
				help: Some("give one of the tables an alias".to_string()),
				notes: vec![],
				cause: None,
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use tessera_type::Fragment;

	use super::*;
	use crate::error::ErrorKind;

	#[test]
	fn test_duplicate_target_diagnostic() {
		let err = DmlError::DuplicateTarget {
			column: "a".to_string(),
			fragment: Fragment::statement("a", 1, 22),
		};
		assert_eq!(err.kind(), ErrorKind::DuplicateTarget);

		let diagnostic = err.into_diagnostic();
		assert_eq!(diagnostic.code, "DML_009");
		assert_eq!(diagnostic.message, "column 'a' is assigned more than once");
		assert_eq!(diagnostic.fragment.column(), 22);
	}

	#[test]
	fn test_into_shared_error() {
		let err: tessera_type::Error = DmlError::OverridingWithoutIdentity {
			fragment: Fragment::testing("OVERRIDING"),
		}
		.into();
		assert_eq!(err.code, "DML_008");
	}

	#[test]
	fn test_unresolved_lists_every_name() {
		let diagnostic = DmlError::UnresolvedReference {
			names: vec!["x".to_string(), "y".to_string()],
			fragment: Fragment::testing("x"),
		}
		.into_diagnostic();
		assert_eq!(diagnostic.message, "unresolved column reference: x, y");
		assert_eq!(diagnostic.notes.len(), 2);
	}
}
