// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing::trace;

use crate::{
	NamespaceId, ViewDef, ViewId,
	materialized::{MaterializedCatalog, key},
};

impl MaterializedCatalog {
	pub fn find_view_by_id(&self, view: ViewId) -> Option<ViewDef> {
		self.views.get(&view).map(|entry| entry.value().clone())
	}

	pub fn find_view_by_name(&self, namespace: NamespaceId, name: &str) -> Option<ViewDef> {
		self.views_by_name.get(&(namespace, key(name))).and_then(|entry| self.find_view_by_id(*entry.value()))
	}

	pub fn set_view(&self, view: ViewDef) {
		trace!(view = %view.name, id = %view.id, "set view");
		if let Some(pre) = self.views.get(&view.id) {
			let pre = pre.value();
			self.views_by_name.remove(&(pre.namespace, key(&pre.name)));
		}
		self.views_by_name.insert((view.namespace, key(&view.name)), view.id);
		self.views.insert(view.id, view);
	}
}
