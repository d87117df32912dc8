// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	ops::Deref,
};

use serde::{Deserialize, Serialize};

macro_rules! catalog_id {
	($($name:ident),* $(,)?) => {
		$(
			#[repr(transparent)]
			#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize)]
			pub struct $name(pub u64);

			impl Deref for $name {
				type Target = u64;

				fn deref(&self) -> &Self::Target {
					&self.0
				}
			}

			impl Display for $name {
				fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
					Display::fmt(&self.0, f)
				}
			}
		)*
	};
}

catalog_id!(NamespaceId, TableId, ViewId, RoutineId);
