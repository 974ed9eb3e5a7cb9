pub mod argument;
pub mod callable;
pub mod class;
pub mod returns;
pub mod types;

pub use argument::{Argument, ArgumentList};
pub use callable::{Constructor, GlobalFunction, Method, Overload, StaticMethod};
pub use class::{Class, ClassBuilder, ClassId, Forest, ForestBuilder};
pub use returns::ReturnValue;
pub use types::{RefKind, TypeRef};
