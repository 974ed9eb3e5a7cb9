pub mod decl_impl;
pub mod proxy;
pub mod shim;

use rayon::prelude::*;

use crate::backend::Backend;
use crate::error::ModelResult;
use crate::model::class::{Class, Forest};
use crate::sanitize::Sanitizer;

/// One generated artifact: file name plus its full text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: String,
    pub text: String,
}

/// Everything one backend produced for one class (or for the
/// module-level free functions when `class` is `None`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub backend: Backend,
    pub class: Option<String>,
    pub files: Vec<GeneratedFile>,
}

/// Runs every requested backend over the sealed forest. Classes are
/// emitted in parallel per backend; the sealed model is never mutated,
/// and each class writes into privately owned buffers. Output order is
/// deterministic regardless: backends in the order given, classes in
/// forest order, free functions last.
pub fn generate(
    forest: &Forest,
    sanitizer: &Sanitizer,
    backends: &[Backend],
) -> ModelResult<Vec<GeneratedUnit>> {
    let mut units = Vec::new();
    for &backend in backends {
        let per_class: Vec<ModelResult<GeneratedUnit>> = forest
            .classes
            .par_iter()
            .map(|class| emit_class(forest, class, sanitizer, backend))
            .collect();
        for unit in per_class {
            units.push(unit?);
        }
        if !forest.functions.is_empty() {
            units.push(emit_functions(forest, sanitizer, backend)?);
        }
    }
    Ok(units)
}

fn emit_class(
    forest: &Forest,
    class: &Class,
    sanitizer: &Sanitizer,
    backend: Backend,
) -> ModelResult<GeneratedUnit> {
    match backend {
        Backend::Shim => shim::emit_class(class),
        Backend::ProxyScript => proxy::emit_class(forest, class, sanitizer),
        Backend::DeclImpl => decl_impl::emit_class(class, sanitizer),
    }
}

fn emit_functions(
    forest: &Forest,
    sanitizer: &Sanitizer,
    backend: Backend,
) -> ModelResult<GeneratedUnit> {
    match backend {
        Backend::Shim => shim::emit_functions(&forest.functions),
        Backend::ProxyScript => proxy::emit_functions(&forest.functions, sanitizer),
        Backend::DeclImpl => decl_impl::emit_functions(&forest.functions, sanitizer),
    }
}
