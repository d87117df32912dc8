// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A possibly namespace-qualified object name, e.g. `public.account`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
	pub namespace: Option<String>,
	pub name: String,
}

impl QualifiedName {
	pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			namespace: Some(namespace.into()),
			name: name.into(),
		}
	}

	pub fn unqualified(name: impl Into<String>) -> Self {
		Self {
			namespace: None,
			name: name.into(),
		}
	}

	/// The namespace, falling back to `default` for unqualified names.
	pub fn namespace_or<'a>(&'a self, default: &'a str) -> &'a str {
		self.namespace.as_deref().unwrap_or(default)
	}

	/// Fill in the namespace of an unqualified name.
	pub fn qualify(&self, default: &str) -> QualifiedName {
		QualifiedName::new(self.namespace_or(default), self.name.clone())
	}
}

impl Display for QualifiedName {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match &self.namespace {
			Some(namespace) => write!(f, "{}.{}", namespace, self.name),
			None => f.write_str(&self.name),
		}
	}
}
