use crate::model::types::TypeRef;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub ty: TypeRef,
}

impl Argument {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Argument {
            name: name.into(),
            ty,
        }
    }
}

/// Ordered parameter list. Arity is part of its identity: overloads
/// sharing a name are disambiguated by argument count alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArgumentList {
    args: Vec<Argument>,
}

impl ArgumentList {
    pub fn new() -> Self {
        ArgumentList::default()
    }

    pub fn from_args(args: Vec<Argument>) -> Self {
        ArgumentList { args }
    }

    pub fn push(&mut self, arg: Argument) {
        self.args.push(arg);
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.args.iter()
    }

    /// `type name, type name` rendering for declarations and comments.
    pub fn signature(&self, separator: &str) -> String {
        self.args
            .iter()
            .map(|arg| format!("{} {}", arg.ty.qualified_name(separator), arg.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Comma-joined argument names for forwarding calls.
    pub fn names(&self) -> String {
        self.args
            .iter()
            .map(|arg| arg.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<Argument> for ArgumentList {
    fn from_iter<I: IntoIterator<Item = Argument>>(iter: I) -> Self {
        ArgumentList {
            args: iter.into_iter().collect(),
        }
    }
}
