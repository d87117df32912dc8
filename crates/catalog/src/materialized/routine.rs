// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::ops::Bound;

use tracing::trace;

use crate::{
	NamespaceId, RoutineDef, RoutineId,
	materialized::{MaterializedCatalog, key},
};

impl MaterializedCatalog {
	pub fn find_routine_by_id(&self, routine: RoutineId) -> Option<RoutineDef> {
		self.routines.get(&routine).map(|entry| entry.value().clone())
	}

	/// All overloads sharing `name`, ordered by routine id.
	pub fn find_routines_by_name(&self, namespace: NamespaceId, name: &str) -> Vec<RoutineDef> {
		let name = key(name);
		let lower = Bound::Included((namespace, name.clone(), RoutineId(0)));
		let upper = Bound::Included((namespace, name, RoutineId(u64::MAX)));

		self.routines_by_name
			.range((lower, upper))
			.filter_map(|entry| self.find_routine_by_id(entry.key().2))
			.collect()
	}

	pub fn set_routine(&self, routine: RoutineDef) {
		trace!(routine = %routine.name, id = %routine.id, "set routine");
		if let Some(pre) = self.routines.get(&routine.id) {
			let pre = pre.value();
			self.routines_by_name.remove(&(pre.namespace, key(&pre.name), pre.id));
		}
		self.routines_by_name.insert((routine.namespace, key(&routine.name), routine.id), ());
		self.routines.insert(routine.id, routine);
	}
}

#[cfg(test)]
mod tests {
	use tessera_type::Type;

	use super::*;
	use crate::{ParameterDef, ParameterMode, RoutineKind};

	fn routine(id: u64, name: &str, arity: usize) -> RoutineDef {
		RoutineDef {
			id: RoutineId(id),
			namespace: NamespaceId(1),
			namespace_name: "public".to_string(),
			name: name.to_string(),
			kind: RoutineKind::Procedure,
			parameters: (0..arity)
				.map(|i| ParameterDef::new(format!("p{i}"), Type::Int4, ParameterMode::In))
				.collect(),
			returns: None,
		}
	}

	#[test]
	fn test_overloads_share_name() {
		let catalog = MaterializedCatalog::new();
		catalog.set_routine(routine(1, "log", 1));
		catalog.set_routine(routine(2, "log", 2));
		catalog.set_routine(routine(3, "logger", 0));

		let found = catalog.find_routines_by_name(NamespaceId(1), "LOG");
		assert_eq!(found.len(), 2);
		assert_eq!(found[0].arity(), 1);
		assert_eq!(found[1].arity(), 2);
	}

	#[test]
	fn test_unknown_routine() {
		let catalog = MaterializedCatalog::new();
		assert!(catalog.find_routines_by_name(NamespaceId(1), "missing").is_empty());
	}
}
