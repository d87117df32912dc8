// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Read-only schema metadata consumed by the DML compiler.

pub mod id;
pub mod materialized;
pub mod name;
pub mod reader;
pub mod routine;
pub mod table;
pub mod test_utils;
pub mod view;

pub use id::{NamespaceId, RoutineId, TableId, ViewId};
pub use materialized::MaterializedCatalog;
pub use name::QualifiedName;
pub use reader::{CatalogReader, Relation};
pub use routine::{ParameterDef, ParameterMode, RoutineDef, RoutineKind};
pub use table::{ColumnDef, IdentityGeneration, NamespaceDef, TableDef};
pub use view::{ViewBase, ViewDef};
