// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod diagnostic;

use std::fmt::{Display, Formatter};

use tessera_type::{Fragment, Type};

use crate::{range::DmlOperation, statement::MergeBranch};

/// The kind of schema object a name failed to resolve to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObjectKind {
	Relation,
	Namespace,
	Routine,
	Function,
}

impl Display for ObjectKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			ObjectKind::Relation => f.write_str("table or view"),
			ObjectKind::Namespace => f.write_str("schema"),
			ObjectKind::Routine => f.write_str("routine"),
			ObjectKind::Function => f.write_str("function"),
		}
	}
}

/// Coarse classification of compile failures, as reported to clients.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
	Syntax,
	UnresolvedReference,
	TypeMismatch,
	ColumnPolicy,
	DuplicateTarget,
	DuplicateMergeBranch,
	DegreeMismatch,
	InvalidOutArgument,
	ArgumentTypeMismatch,
	UnknownTarget,
	NotUpdatable,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DmlError {
	#[error("unexpected '{found}', expected {expected}")]
	Syntax {
		expected: String,
		found: String,
		fragment: Fragment,
	},

	#[error("unexpected end of statement, expected {expected}")]
	UnexpectedEnd {
		expected: String,
		fragment: Fragment,
	},

	#[error("unresolved column reference: {}", names.join(", "))]
	UnresolvedReference {
		names: Vec<String>,
		fragment: Fragment,
	},

	#[error("type mismatch: {message}")]
	TypeMismatch {
		message: String,
		fragment: Fragment,
	},

	#[error("expected {expected} values, got {actual}")]
	DegreeMismatch {
		expected: usize,
		actual: usize,
		fragment: Fragment,
	},

	#[error("identity column '{column}' is generated always")]
	IdentityOverrideRequired {
		column: String,
		fragment: Fragment,
	},

	#[error("generated column '{column}' cannot be written")]
	GeneratedColumnWrite {
		column: String,
		fragment: Fragment,
	},

	#[error("OVERRIDING clause without an identity column among the targets")]
	OverridingWithoutIdentity {
		fragment: Fragment,
	},

	#[error("column '{column}' is assigned more than once")]
	DuplicateTarget {
		column: String,
		fragment: Fragment,
	},

	#[error("MERGE declares WHEN {branch} more than once")]
	DuplicateMergeBranch {
		branch: MergeBranch,
		fragment: Fragment,
	},

	#[error("argument {position} of '{routine}' must be a variable")]
	InvalidOutArgument {
		routine: String,
		position: usize,
		fragment: Fragment,
	},

	#[error("argument {position} of '{routine}' has type {actual}, parameter expects {expected}")]
	ArgumentTypeMismatch {
		routine: String,
		position: usize,
		expected: Type,
		actual: Type,
		fragment: Fragment,
	},

	#[error("{kind} '{name}' not found")]
	UnknownTarget {
		kind: ObjectKind,
		name: String,
		fragment: Fragment,
	},

	#[error("view '{view}' does not support {operation}")]
	NotUpdatable {
		view: String,
		operation: DmlOperation,
		fragment: Fragment,
	},

	#[error("column reference '{name}' is ambiguous")]
	AmbiguousReference {
		name: String,
		fragment: Fragment,
	},

	#[error("range name '{name}' is declared more than once")]
	DuplicateRangeName {
		name: String,
		fragment: Fragment,
	},
}

impl DmlError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			DmlError::Syntax {
				..
			}
			| DmlError::UnexpectedEnd {
				..
			}
			| DmlError::DuplicateRangeName {
				..
			} => ErrorKind::Syntax,
			DmlError::UnresolvedReference {
				..
			}
			| DmlError::AmbiguousReference {
				..
			} => ErrorKind::UnresolvedReference,
			DmlError::TypeMismatch {
				..
			} => ErrorKind::TypeMismatch,
			DmlError::DegreeMismatch {
				..
			} => ErrorKind::DegreeMismatch,
			DmlError::IdentityOverrideRequired {
				..
			}
			| DmlError::GeneratedColumnWrite {
				..
			}
			| DmlError::OverridingWithoutIdentity {
				..
			} => ErrorKind::ColumnPolicy,
			DmlError::DuplicateTarget {
				..
			} => ErrorKind::DuplicateTarget,
			DmlError::DuplicateMergeBranch {
				..
			} => ErrorKind::DuplicateMergeBranch,
			DmlError::InvalidOutArgument {
				..
			} => ErrorKind::InvalidOutArgument,
			DmlError::ArgumentTypeMismatch {
				..
			} => ErrorKind::ArgumentTypeMismatch,
			DmlError::UnknownTarget {
				..
			} => ErrorKind::UnknownTarget,
			DmlError::NotUpdatable {
				..
			} => ErrorKind::NotUpdatable,
		}
	}

	pub fn fragment(&self) -> &Fragment {
		match self {
			DmlError::Syntax {
				fragment,
				..
			}
			| DmlError::UnexpectedEnd {
				fragment,
				..
			}
			| DmlError::UnresolvedReference {
				fragment,
				..
			}
			| DmlError::TypeMismatch {
				fragment,
				..
			}
			| DmlError::DegreeMismatch {
				fragment,
				..
			}
			| DmlError::IdentityOverrideRequired {
				fragment,
				..
			}
			| DmlError::GeneratedColumnWrite {
				fragment,
				..
			}
			| DmlError::OverridingWithoutIdentity {
				fragment,
			}
			| DmlError::DuplicateTarget {
				fragment,
				..
			}
			| DmlError::DuplicateMergeBranch {
				fragment,
				..
			}
			| DmlError::InvalidOutArgument {
				fragment,
				..
			}
			| DmlError::ArgumentTypeMismatch {
				fragment,
				..
			}
			| DmlError::UnknownTarget {
				fragment,
				..
			}
			| DmlError::NotUpdatable {
				fragment,
				..
			}
			| DmlError::AmbiguousReference {
				fragment,
				..
			}
			| DmlError::DuplicateRangeName {
				fragment,
				..
			} => fragment,
		}
	}

	pub(crate) fn syntax(expected: impl Into<String>, fragment: &Fragment) -> Self {
		DmlError::Syntax {
			expected: expected.into(),
			found: fragment.text().to_string(),
			fragment: fragment.clone(),
		}
	}

	pub(crate) fn type_mismatch(message: impl Into<String>, fragment: &Fragment) -> Self {
		DmlError::TypeMismatch {
			message: message.into(),
			fragment: fragment.clone(),
		}
	}
}

impl From<DmlError> for tessera_type::Error {
	fn from(err: DmlError) -> Self {
		tessera_type::error!(err)
	}
}
