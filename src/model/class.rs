use crate::error::{ModelError, ModelResult};
use crate::model::argument::ArgumentList;
use crate::model::callable::{Constructor, GlobalFunction, Method, StaticMethod};
use crate::model::returns::ReturnValue;
use crate::model::types::TypeRef;

/// Weak reference to a sibling class in the same forest. Index lookup
/// only; the forest owns every class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClassId(pub usize);

/// Mutable registration-phase view of a class. Consumed by
/// `ForestBuilder::seal`, so no path leads from a sealed class back to
/// registration.
#[derive(Clone, Debug)]
pub struct ClassBuilder {
    name: TypeRef,
    base: Option<String>,
    constructor: Constructor,
    methods: Vec<Method>,
    static_methods: Vec<StaticMethod>,
}

impl ClassBuilder {
    pub fn new(name: TypeRef) -> Self {
        ClassBuilder {
            name,
            base: None,
            constructor: Constructor::default(),
            methods: Vec::new(),
            static_methods: Vec::new(),
        }
    }

    /// Base class referenced by qualified or bare name; resolved to a
    /// `ClassId` when the forest is sealed.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn add_constructor_overload(&mut self, args: ArgumentList) -> bool {
        self.constructor.add_overload(args)
    }

    /// Routes to the named method, creating it on first registration.
    /// Method names stay unique; repeated names accumulate overloads in
    /// registration order.
    pub fn add_method_overload(
        &mut self,
        name: &str,
        args: ArgumentList,
        ret: ReturnValue,
        is_const: bool,
        instantiation: Option<TypeRef>,
    ) -> ModelResult<bool> {
        if let Some(method) = self.methods.iter_mut().find(|m| m.name == name) {
            return method.add_overload(args, ret, is_const, instantiation);
        }
        let mut method = Method::new(name);
        let first = method.add_overload(args, ret, is_const, instantiation)?;
        self.methods.push(method);
        Ok(first)
    }

    pub fn add_static_overload(
        &mut self,
        name: &str,
        args: ArgumentList,
        ret: ReturnValue,
        instantiation: Option<TypeRef>,
    ) -> bool {
        if let Some(method) = self.static_methods.iter_mut().find(|m| m.name == name) {
            return method.add_overload(args, ret, instantiation);
        }
        let mut method = StaticMethod::new(name);
        let first = method.add_overload(args, ret, instantiation);
        self.static_methods.push(method);
        first
    }

    pub fn name(&self) -> &TypeRef {
        &self.name
    }

    fn matches_name(&self, wanted: &str) -> bool {
        self.name.qualified_name("::") == wanted || self.name.name == wanted
    }

    fn seal(mut self, id: ClassId, base: Option<ClassId>) -> Class {
        for method in &mut self.methods {
            method.owner = Some(id);
        }
        for method in &mut self.static_methods {
            method.owner = Some(id);
        }
        Class {
            id,
            name: self.name,
            base,
            constructor: self.constructor,
            methods: self.methods,
            static_methods: self.static_methods,
        }
    }
}

/// Sealed, emission-only class. All backends read the same instance;
/// nothing here is mutable after sealing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Class {
    pub id: ClassId,
    pub name: TypeRef,
    pub base: Option<ClassId>,
    pub constructor: Constructor,
    pub methods: Vec<Method>,
    pub static_methods: Vec<StaticMethod>,
}

impl Class {
    /// Foreign-visible unique name, e.g. `gtsamPose2`.
    pub fn unique_name(&self) -> String {
        self.name.flat_name()
    }

    /// Handle-type tag checked at runtime before any native call.
    pub fn handle_tag(&self) -> String {
        format!("ptr_{}", self.unique_name())
    }

    pub fn cpp_name(&self) -> String {
        self.name.qualified_name("::")
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn static_method(&self, name: &str) -> Option<&StaticMethod> {
        self.static_methods.iter().find(|m| m.name == name)
    }
}

/// Registration-phase forest of classes and free functions.
#[derive(Clone, Debug, Default)]
pub struct ForestBuilder {
    classes: Vec<ClassBuilder>,
    functions: Vec<GlobalFunction>,
}

impl ForestBuilder {
    pub fn new() -> Self {
        ForestBuilder::default()
    }

    /// Class names are unique across the forest, by type identity
    /// (qualified name plus template argument).
    pub fn add_class(&mut self, class: ClassBuilder) -> ModelResult<()> {
        if self
            .classes
            .iter()
            .any(|existing| existing.name.same_type(&class.name))
        {
            return Err(ModelError::DuplicateClass {
                name: class.name.qualified_name("::"),
            });
        }
        self.classes.push(class);
        Ok(())
    }

    pub fn add_function_overload(
        &mut self,
        namespaces: &[&str],
        name: &str,
        args: ArgumentList,
        ret: ReturnValue,
        instantiation: Option<TypeRef>,
    ) -> bool {
        if let Some(func) = self
            .functions
            .iter_mut()
            .find(|f| f.name == name && f.namespaces.iter().map(String::as_str).eq(namespaces.iter().copied()))
        {
            return func.add_overload(args, ret, instantiation);
        }
        let mut func = GlobalFunction::new(namespaces, name);
        let first = func.add_overload(args, ret, instantiation);
        self.functions.push(func);
        first
    }

    /// Resolves base-class names to weak ids and freezes the model.
    /// Emission only ever sees the sealed forest.
    pub fn seal(self) -> ModelResult<Forest> {
        let mut bases = Vec::with_capacity(self.classes.len());
        for class in &self.classes {
            match &class.base {
                None => bases.push(None),
                Some(base_name) => {
                    let id = self
                        .classes
                        .iter()
                        .position(|candidate| candidate.matches_name(base_name))
                        .map(ClassId);
                    match id {
                        Some(id) => bases.push(Some(id)),
                        None => {
                            return Err(ModelError::UnknownBaseClass {
                                class: class.name.qualified_name("::"),
                                base: base_name.clone(),
                            })
                        }
                    }
                }
            }
        }
        let classes = self
            .classes
            .into_iter()
            .zip(bases)
            .enumerate()
            .map(|(index, (class, base))| class.seal(ClassId(index), base))
            .collect();
        Ok(Forest {
            classes,
            functions: self.functions,
        })
    }
}

/// Sealed class forest: the input boundary for every emitter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Forest {
    pub classes: Vec<Class>,
    pub functions: Vec<GlobalFunction>,
}

impl Forest {
    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id.0]
    }

    pub fn find_class(&self, qualified: &str) -> Option<&Class> {
        self.classes
            .iter()
            .find(|class| class.cpp_name() == qualified)
    }
}
