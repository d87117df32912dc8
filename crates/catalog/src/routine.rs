// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};
use tessera_type::Type;

use crate::{NamespaceId, QualifiedName, RoutineId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterMode {
	In,
	Out,
	InOut,
}

impl ParameterMode {
	/// OUT and INOUT parameters write back into the argument.
	pub fn is_writeable(&self) -> bool {
		!matches!(self, ParameterMode::In)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
	pub name: String,
	pub data_type: Type,
	pub mode: ParameterMode,
}

impl ParameterDef {
	pub fn new(name: impl Into<String>, data_type: Type, mode: ParameterMode) -> Self {
		Self {
			name: name.into(),
			data_type,
			mode,
		}
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutineKind {
	Procedure,
	Function,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineDef {
	pub id: RoutineId,
	pub namespace: NamespaceId,
	pub namespace_name: String,
	pub name: String,
	pub kind: RoutineKind,
	pub parameters: Vec<ParameterDef>,
	pub returns: Option<Type>,
}

impl RoutineDef {
	pub fn qualified_name(&self) -> QualifiedName {
		QualifiedName::new(self.namespace_name.clone(), self.name.clone())
	}

	pub fn arity(&self) -> usize {
		self.parameters.len()
	}
}
