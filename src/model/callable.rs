use crate::error::{ModelError, ModelResult};
use crate::model::argument::ArgumentList;
use crate::model::class::ClassId;
use crate::model::returns::ReturnValue;
use crate::model::types::TypeRef;

/// One registered signature of a callable. The optional instantiation
/// type drives both the native template substitution and the foreign
/// name suffix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overload {
    pub args: ArgumentList,
    pub ret: ReturnValue,
    pub instantiation: Option<TypeRef>,
    pub is_const: bool,
}

/// Instance method. The const flag is latched by the first registered
/// overload; every later overload must agree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub overloads: Vec<Overload>,
    pub is_const: bool,
    pub owner: Option<ClassId>,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Method {
            name: name.into(),
            overloads: Vec::new(),
            is_const: false,
            owner: None,
        }
    }

    /// Returns `Ok(true)` when this was the first overload registered
    /// under this name. A const mismatch leaves the method untouched.
    pub fn add_overload(
        &mut self,
        args: ArgumentList,
        ret: ReturnValue,
        is_const: bool,
        instantiation: Option<TypeRef>,
    ) -> ModelResult<bool> {
        let first = self.overloads.is_empty();
        if first {
            self.is_const = is_const;
        } else if is_const != self.is_const {
            return Err(ModelError::ConstQualificationMismatch {
                name: self.name.clone(),
                first_const: self.is_const,
            });
        }
        self.overloads.push(Overload {
            args,
            ret,
            instantiation,
            is_const,
        });
        Ok(first)
    }
}

/// Constructor entity: one per class, holding every constructor
/// overload as an argument list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Constructor {
    pub overloads: Vec<ArgumentList>,
}

impl Constructor {
    pub fn add_overload(&mut self, args: ArgumentList) -> bool {
        let first = self.overloads.is_empty();
        self.overloads.push(args);
        first
    }

    pub fn is_empty(&self) -> bool {
        self.overloads.is_empty()
    }
}

/// Static member function. Never const-qualified, so registration has
/// no flag to latch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticMethod {
    pub name: String,
    pub overloads: Vec<Overload>,
    pub owner: Option<ClassId>,
}

impl StaticMethod {
    pub fn new(name: impl Into<String>) -> Self {
        StaticMethod {
            name: name.into(),
            overloads: Vec::new(),
            owner: None,
        }
    }

    pub fn add_overload(
        &mut self,
        args: ArgumentList,
        ret: ReturnValue,
        instantiation: Option<TypeRef>,
    ) -> bool {
        let first = self.overloads.is_empty();
        self.overloads.push(Overload {
            args,
            ret,
            instantiation,
            is_const: false,
        });
        first
    }
}

/// Free function living outside any class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalFunction {
    pub namespaces: Vec<String>,
    pub name: String,
    pub overloads: Vec<Overload>,
}

impl GlobalFunction {
    pub fn new(namespaces: &[&str], name: impl Into<String>) -> Self {
        GlobalFunction {
            namespaces: namespaces.iter().map(|ns| ns.to_string()).collect(),
            name: name.into(),
            overloads: Vec::new(),
        }
    }

    pub fn add_overload(
        &mut self,
        args: ArgumentList,
        ret: ReturnValue,
        instantiation: Option<TypeRef>,
    ) -> bool {
        let first = self.overloads.is_empty();
        self.overloads.push(Overload {
            args,
            ret,
            instantiation,
            is_const: false,
        });
        first
    }

    pub fn qualified_name(&self, separator: &str) -> String {
        let mut out = String::new();
        for ns in &self.namespaces {
            out.push_str(ns);
            out.push_str(separator);
        }
        out.push_str(&self.name);
        out
    }

    pub fn flat_name(&self) -> String {
        self.qualified_name("")
    }
}
