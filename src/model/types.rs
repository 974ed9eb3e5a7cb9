/// How a declared type is passed across the boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefKind {
    Value,
    SharedPtr,
    Reference,
}

impl RefKind {
    pub fn is_shared_ptr(self) -> bool {
        matches!(self, RefKind::SharedPtr)
    }
}

/// A namespace-qualified, possibly single-templated type name.
/// Immutable once constructed; identity is qualified name plus
/// template argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRef {
    pub namespaces: Vec<String>,
    pub name: String,
    pub template_arg: Option<Box<TypeRef>>,
    pub ref_kind: RefKind,
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        TypeRef {
            namespaces: Vec::new(),
            name: name.into(),
            template_arg: None,
            ref_kind: RefKind::Value,
        }
    }

    pub fn namespaced(namespaces: &[&str], name: impl Into<String>) -> Self {
        TypeRef {
            namespaces: namespaces.iter().map(|ns| ns.to_string()).collect(),
            name: name.into(),
            template_arg: None,
            ref_kind: RefKind::Value,
        }
    }

    pub fn with_template_arg(mut self, arg: TypeRef) -> Self {
        self.template_arg = Some(Box::new(arg));
        self
    }

    pub fn with_ref_kind(mut self, kind: RefKind) -> Self {
        self.ref_kind = kind;
        self
    }

    /// Native-side spelling, namespaces joined by `separator` and the
    /// template argument rendered in angle brackets.
    pub fn qualified_name(&self, separator: &str) -> String {
        let mut out = String::new();
        for ns in &self.namespaces {
            out.push_str(ns);
            out.push_str(separator);
        }
        out.push_str(&self.name);
        if let Some(arg) = &self.template_arg {
            out.push('<');
            out.push_str(&arg.qualified_name(separator));
            out.push('>');
        }
        out
    }

    /// Foreign-visible unique spelling: namespaces and template argument
    /// concatenated with no separators. Stable input for handle tags and
    /// artifact names.
    pub fn flat_name(&self) -> String {
        let mut out = String::new();
        for ns in &self.namespaces {
            out.push_str(ns);
        }
        out.push_str(&self.name);
        if let Some(arg) = &self.template_arg {
            out.push_str(&arg.flat_name());
        }
        out
    }

    /// Bare name without namespaces; template instantiations contribute
    /// this as their disambiguation suffix.
    pub fn bare_name(&self) -> &str {
        &self.name
    }

    /// The documented identity: qualified name and template argument.
    pub fn same_type(&self, other: &TypeRef) -> bool {
        self.namespaces == other.namespaces
            && self.name == other.name
            && self.template_arg == other.template_arg
    }
}
