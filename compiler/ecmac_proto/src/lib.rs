//! Prototype/property model (`spec.md` §4.5, C6): the per-host-type object
//! layout the dispatch resolver and code-generation driver consult for
//! every member access.

mod attributes;
mod indexer;
mod method_group;
mod operator;
mod property;
mod prototype;
mod registry;

pub use attributes::PropertyAttributes;
pub use indexer::{parses_as_array_index, IndexKeyType, Indexer};
pub use method_group::{MethodGroup, Overload};
pub use operator::OperatorKind;
pub use property::{Property, PropertyValue};
pub use prototype::{Callable, Prototype};
pub use registry::{HostRuntime, PrototypeRegistry};
