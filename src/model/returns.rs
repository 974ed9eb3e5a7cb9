use crate::model::types::TypeRef;

/// Return descriptor for one overload. A pair collapses to one composite
/// wrapper on targets with multiple return channels and expands to two
/// output slots everywhere else.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReturnValue {
    Void,
    Single(TypeRef),
    Pair(TypeRef, TypeRef),
}

impl ReturnValue {
    pub fn is_void(&self) -> bool {
        matches!(self, ReturnValue::Void)
    }

    /// Declaration-side rendering, e.g. `double` or `pair[Matrix, Vector]`.
    pub fn declaration(&self) -> String {
        match self {
            ReturnValue::Void => "void".into(),
            ReturnValue::Single(ty) => ty.flat_name(),
            ReturnValue::Pair(first, second) => {
                format!("pair[{}, {}]", first.flat_name(), second.flat_name())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_renders_as_a_composite_declaration() {
        let pair = ReturnValue::Pair(TypeRef::new("Matrix"), TypeRef::new("Vector"));
        assert!(!pair.is_void());
        assert_eq!(pair.declaration(), "pair[Matrix, Vector]");
    }

    #[test]
    fn void_declares_as_void() {
        assert!(ReturnValue::Void.is_void());
        assert_eq!(ReturnValue::Void.declaration(), "void");
    }
}
