//! Dynamic object model the engine operates on
//!
//! - [`handle`] - type handles for declared and runtime types
//! - [`value`] - values, object instances and arrays
//! - [`container`] - homogeneous containers and the container factory
//!
//! Copyright (c) 2025 Dynamapper Team
//! Licensed under the Apache-2.0 license

pub mod container;
pub mod handle;
pub mod value;

pub use container::{ContainerFactory, ContainerKind, ContainerValue};
pub use handle::{LeafKind, TypeHandle, TypeName};
pub use value::{ArrayRef, ArrayValue, ContainerRef, Identity, Instance, ObjectRef, Value};
