//! Opaque-handle shim backend. Emits one wrapper source unit per class:
//! one shim function per overload plus a dispatcher routing numeric
//! entry ids. The proxy-script backend forwards to the same ids, so the
//! entry table here is the single source of truth for both.

use crate::error::ModelResult;
use crate::model::argument::ArgumentList;
use crate::model::callable::{GlobalFunction, Method, Overload, StaticMethod};
use crate::model::class::Class;
use crate::model::returns::ReturnValue;
use crate::model::types::TypeRef;

use super::{GeneratedFile, GeneratedUnit};
use crate::backend::Backend;

#[derive(Clone, Debug)]
pub enum EntryKind<'a> {
    Constructor {
        overload: usize,
        args: &'a ArgumentList,
    },
    Destructor,
    Method {
        method: &'a Method,
        overload: usize,
    },
    Static {
        method: &'a StaticMethod,
        overload: usize,
    },
}

/// One dispatchable shim entry point.
#[derive(Clone, Debug)]
pub struct ShimEntry<'a> {
    pub id: usize,
    pub symbol: String,
    pub kind: EntryKind<'a>,
}

/// Entry ids in deterministic order: constructors, destructor, methods
/// (insertion order, overloads in registration order), static methods.
pub fn entries(class: &Class) -> Vec<ShimEntry<'_>> {
    let unique = class.unique_name();
    let mut out = Vec::new();
    for (i, args) in class.constructor.overloads.iter().enumerate() {
        out.push(ShimEntry {
            id: out.len(),
            symbol: format!("{unique}_constructor_{i}"),
            kind: EntryKind::Constructor { overload: i, args },
        });
    }
    out.push(ShimEntry {
        id: out.len(),
        symbol: format!("{unique}_destructor"),
        kind: EntryKind::Destructor,
    });
    for method in &class.methods {
        for (i, _) in method.overloads.iter().enumerate() {
            out.push(ShimEntry {
                id: out.len(),
                symbol: format!("{unique}_{}_{i}", method.name),
                kind: EntryKind::Method {
                    method,
                    overload: i,
                },
            });
        }
    }
    for method in &class.static_methods {
        for (i, _) in method.overloads.iter().enumerate() {
            out.push(ShimEntry {
                id: out.len(),
                symbol: format!("{unique}_{}_{i}", method.name),
                kind: EntryKind::Static {
                    method,
                    overload: i,
                },
            });
        }
    }
    out
}

/// Entry table for the module-level free-function wrapper.
pub fn function_entries(functions: &[GlobalFunction]) -> Vec<(usize, String, &GlobalFunction, usize)> {
    let mut out = Vec::new();
    for func in functions {
        for (i, _) in func.overloads.iter().enumerate() {
            out.push((out.len(), format!("{}_{i}", func.flat_name()), func, i));
        }
    }
    out
}

/// Name of the dispatcher (and its source unit) for a class.
pub fn wrapper_name(class: &Class) -> String {
    format!("{}_wrapper", class.unique_name())
}

pub const FUNCTIONS_WRAPPER: &str = "functions_wrapper";

pub fn emit_class(class: &Class) -> ModelResult<GeneratedUnit> {
    let mut out = String::new();
    let wrapper = wrapper_name(class);
    let all = entries(class);

    for entry in &all {
        emit_entry(&mut out, class, entry);
        out.push('\n');
    }
    emit_dispatcher(&mut out, &wrapper, class.unique_name().as_str(), &all);

    Ok(GeneratedUnit {
        backend: Backend::Shim,
        class: Some(class.cpp_name()),
        files: vec![GeneratedFile {
            name: format!("{wrapper}.cpp"),
            text: out,
        }],
    })
}

pub fn emit_functions(functions: &[GlobalFunction]) -> ModelResult<GeneratedUnit> {
    let mut out = String::new();
    let table = function_entries(functions);
    for (_, symbol, func, overload) in &table {
        emit_function_entry(&mut out, symbol, *func, &func.overloads[*overload]);
        out.push('\n');
    }
    let arms: Vec<(usize, String)> = table
        .iter()
        .map(|(id, symbol, _, _)| (*id, symbol.clone()))
        .collect();
    emit_dispatch_switch(&mut out, FUNCTIONS_WRAPPER, "free functions", &arms);

    Ok(GeneratedUnit {
        backend: Backend::Shim,
        class: None,
        files: vec![GeneratedFile {
            name: format!("{FUNCTIONS_WRAPPER}.cpp"),
            text: out,
        }],
    })
}

fn emit_entry(out: &mut String, class: &Class, entry: &ShimEntry<'_>) {
    match &entry.kind {
        EntryKind::Constructor { args, .. } => emit_constructor(out, class, &entry.symbol, args),
        EntryKind::Destructor => emit_destructor(out, class, &entry.symbol),
        EntryKind::Method { method, overload } => {
            emit_method(out, class, &entry.symbol, method, &method.overloads[*overload]);
        }
        EntryKind::Static { method, overload } => {
            emit_static(out, class, &entry.symbol, method, &method.overloads[*overload]);
        }
    }
}

fn emit_signature(out: &mut String, symbol: &str) {
    out.push_str(&format!(
        "void {symbol}(int nargout, mxArray *out[], int nargin, const mxArray *in[])\n{{\n"
    ));
}

fn emit_constructor(out: &mut String, class: &Class, symbol: &str, args: &ArgumentList) {
    let cpp = class.cpp_name();
    let tag = class.handle_tag();
    emit_signature(out, symbol);
    out.push_str(&format!(
        "  checkArguments(\"{}\", nargout, nargin, {});\n",
        class.name.bare_name(),
        args.len()
    ));
    out.push_str("  try {\n");
    emit_unwraps(out, args, 0);
    out.push_str(&format!(
        "    auto self = std::make_shared<{cpp}>({});\n",
        args.names()
    ));
    out.push_str(&format!("    out[0] = wrap_handle<{cpp}>(self, \"{tag}\");\n"));
    emit_catch(out, class.name.bare_name());
    out.push_str("}\n");
}

fn emit_destructor(out: &mut String, class: &Class, symbol: &str) {
    let cpp = class.cpp_name();
    let tag = class.handle_tag();
    emit_signature(out, symbol);
    out.push_str(&format!(
        "  checkArguments(\"delete_{}\", nargout, nargin, 1);\n",
        class.unique_name()
    ));
    out.push_str("  try {\n");
    out.push_str(&format!(
        "    release_shared_ptr<{cpp}>(in[0], \"{tag}\");\n"
    ));
    emit_catch(out, class.name.bare_name());
    out.push_str("}\n");
}

fn emit_method(out: &mut String, class: &Class, symbol: &str, method: &Method, overload: &Overload) {
    let cpp = class.cpp_name();
    let tag = class.handle_tag();
    emit_signature(out, symbol);
    // The receiver handle rides in slot 0, so the caller's count is
    // nargin minus one.
    out.push_str(&format!(
        "  checkArguments(\"{}\", nargout, nargin-1, {});\n",
        method.name,
        overload.args.len()
    ));
    out.push_str("  try {\n");
    out.push_str(&format!(
        "    auto obj = unwrap_shared_ptr<{cpp}>(in[0], \"{tag}\");\n"
    ));
    emit_unwraps(out, &overload.args, 1);
    let call = format!(
        "obj->{}{}({})",
        method.name,
        instantiation_suffix(overload),
        overload.args.names()
    );
    emit_result(out, &overload.ret, &call);
    emit_catch(out, &method.name);
    out.push_str("}\n");
}

fn emit_static(
    out: &mut String,
    class: &Class,
    symbol: &str,
    method: &StaticMethod,
    overload: &Overload,
) {
    let cpp = class.cpp_name();
    emit_signature(out, symbol);
    out.push_str(&format!(
        "  checkArguments(\"{}\", nargout, nargin, {});\n",
        method.name,
        overload.args.len()
    ));
    out.push_str("  try {\n");
    emit_unwraps(out, &overload.args, 0);
    let call = format!(
        "{cpp}::{}{}({})",
        method.name,
        instantiation_suffix(overload),
        overload.args.names()
    );
    emit_result(out, &overload.ret, &call);
    emit_catch(out, &method.name);
    out.push_str("}\n");
}

fn emit_function_entry(out: &mut String, symbol: &str, func: &GlobalFunction, overload: &Overload) {
    emit_signature(out, symbol);
    out.push_str(&format!(
        "  checkArguments(\"{}\", nargout, nargin, {});\n",
        func.name,
        overload.args.len()
    ));
    out.push_str("  try {\n");
    emit_unwraps(out, &overload.args, 0);
    let call = format!(
        "{}{}({})",
        func.qualified_name("::"),
        instantiation_suffix(overload),
        overload.args.names()
    );
    emit_result(out, &overload.ret, &call);
    emit_catch(out, &func.name);
    out.push_str("}\n");
}

/// Positional argument conversions; `offset` skips the receiver slot.
fn emit_unwraps(out: &mut String, args: &ArgumentList, offset: usize) {
    for (i, arg) in args.iter().enumerate() {
        let slot = i + offset;
        let cpp = arg.ty.qualified_name("::");
        if arg.ty.ref_kind.is_shared_ptr() {
            out.push_str(&format!(
                "    auto {} = unwrap_shared_ptr<{cpp}>(in[{slot}], \"ptr_{}\");\n",
                arg.name,
                arg.ty.flat_name()
            ));
        } else {
            out.push_str(&format!(
                "    {cpp} {} = unwrap<{cpp}>(in[{slot}]);\n",
                arg.name
            ));
        }
    }
}

fn instantiation_suffix(overload: &Overload) -> String {
    match &overload.instantiation {
        Some(inst) => format!("<{}>", inst.qualified_name("::")),
        None => String::new(),
    }
}

fn emit_result(out: &mut String, ret: &ReturnValue, call: &str) {
    match ret {
        ReturnValue::Void => {
            out.push_str(&format!("    {call};\n"));
        }
        ReturnValue::Single(ty) => {
            out.push_str(&format!("    out[0] = wrap<{}>({call});\n", wrap_type(ty)));
        }
        ReturnValue::Pair(first, second) => {
            out.push_str(&format!("    auto result = {call};\n"));
            out.push_str(&format!(
                "    out[0] = wrap<{}>(result.first);\n",
                wrap_type(first)
            ));
            out.push_str(&format!(
                "    out[1] = wrap<{}>(result.second);\n",
                wrap_type(second)
            ));
        }
    }
}

fn wrap_type(ty: &TypeRef) -> String {
    ty.qualified_name("::")
}

/// Native failures are caught at the boundary and re-surfaced as a
/// structured foreign error carrying the original message. The trailing
/// catch-all covers throws that are not std::exception.
fn emit_catch(out: &mut String, name: &str) {
    out.push_str("  } catch (const std::exception& e) {\n");
    out.push_str(&format!(
        "    raise_foreign_error(\"{name}\", e.what());\n"
    ));
    out.push_str("  } catch (...) {\n");
    out.push_str(&format!(
        "    raise_foreign_error(\"{name}\", \"unknown native exception\");\n"
    ));
    out.push_str("  }\n");
}

fn emit_dispatcher(out: &mut String, wrapper: &str, unique: &str, entries: &[ShimEntry<'_>]) {
    let arms: Vec<(usize, String)> = entries
        .iter()
        .map(|entry| (entry.id, entry.symbol.clone()))
        .collect();
    emit_dispatch_switch(out, wrapper, unique, &arms);
}

fn emit_dispatch_switch(out: &mut String, wrapper: &str, label: &str, arms: &[(usize, String)]) {
    out.push_str(&format!(
        "void {wrapper}(int nargout, mxArray *out[], int nargin, const mxArray *in[])\n{{\n"
    ));
    out.push_str("  try {\n");
    out.push_str("    int id = unwrap<int>(in[0]);\n");
    out.push_str("    switch (id) {\n");
    for (id, symbol) in arms {
        out.push_str(&format!(
            "    case {id}: {symbol}(nargout, out, nargin-1, in+1); break;\n"
        ));
    }
    out.push_str(&format!(
        "    default: raise_foreign_error(\"{label}\", \"unknown shim entry id\"); break;\n"
    ));
    out.push_str("    }\n");
    out.push_str("  } catch (const std::exception& e) {\n");
    out.push_str(&format!(
        "    raise_foreign_error(\"{label}\", e.what());\n"
    ));
    out.push_str("  } catch (...) {\n");
    out.push_str(&format!(
        "    raise_foreign_error(\"{label}\", \"unknown native exception\");\n"
    ));
    out.push_str("  }\n");
    out.push_str("}\n");
}
