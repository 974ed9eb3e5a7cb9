//! Declaration+implementation backend for a target with no native
//! overloading or templates. Emits two coupled artifacts per class and
//! fails fast if their exported names ever diverge: that divergence is
//! a generator defect, not a user error.

use crate::error::{ModelError, ModelResult};
use crate::model::argument::ArgumentList;
use crate::model::callable::{GlobalFunction, Overload};
use crate::model::class::Class;
use crate::model::returns::ReturnValue;
use crate::sanitize::{Sanitizer, PRINT_KEYWORD};

use super::{GeneratedFile, GeneratedUnit};
use crate::backend::Backend;

pub fn emit_class(class: &Class, sanitizer: &Sanitizer) -> ModelResult<GeneratedUnit> {
    let mut declared = Vec::new();
    let mut implemented = Vec::new();
    let declaration = emit_declaration(class, sanitizer, &mut declared);
    let implementation = emit_implementation(class, sanitizer, &mut implemented);
    check_names(class.cpp_name(), &declared, &implemented)?;

    let unique = class.unique_name();
    Ok(GeneratedUnit {
        backend: Backend::DeclImpl,
        class: Some(class.cpp_name()),
        files: vec![
            GeneratedFile {
                name: format!("{unique}.pxd"),
                text: declaration,
            },
            GeneratedFile {
                name: format!("{unique}.pyx"),
                text: implementation,
            },
        ],
    })
}

pub fn emit_functions(
    functions: &[GlobalFunction],
    sanitizer: &Sanitizer,
) -> ModelResult<GeneratedUnit> {
    let mut declared = Vec::new();
    let mut implemented = Vec::new();

    let mut declaration = String::new();
    for func in functions {
        for (i, overload) in func.overloads.iter().enumerate() {
            let exported =
                sanitizer.exported_name(&func.name, Backend::DeclImpl, i, overload.instantiation.as_ref());
            declaration.push_str(&format!(
                "cdef {} {} \"{}{}\"({})\n",
                overload.ret.declaration(),
                exported,
                func.qualified_name("::"),
                native_template(overload),
                decl_args(&overload.args),
            ));
            declared.push(exported);
        }
    }

    // The def takes the exported name itself, so each native entry is
    // cimported under a marked alias and the body forwards through that.
    let mut implementation = String::new();
    for func in functions {
        for (i, overload) in func.overloads.iter().enumerate() {
            let exported =
                sanitizer.exported_name(&func.name, Backend::DeclImpl, i, overload.instantiation.as_ref());
            implementation.push_str(&format!(
                "from functions cimport {exported} as _{exported}\n"
            ));
        }
    }
    implementation.push('\n');
    for func in functions {
        for (i, overload) in func.overloads.iter().enumerate() {
            let exported =
                sanitizer.exported_name(&func.name, Backend::DeclImpl, i, overload.instantiation.as_ref());
            implementation.push_str(&format!(
                "def {}({}):\n",
                exported,
                overload.args.names()
            ));
            emit_forward(&mut implementation, "    ", &exported, overload, "_");
            implementation.push('\n');
            implemented.push(exported);
        }
    }

    check_names("free functions".into(), &declared, &implemented)?;
    Ok(GeneratedUnit {
        backend: Backend::DeclImpl,
        class: None,
        files: vec![
            GeneratedFile {
                name: "functions.pxd".into(),
                text: declaration,
            },
            GeneratedFile {
                name: "functions.pyx".into(),
                text: implementation,
            },
        ],
    })
}

fn check_names(scope: String, declared: &[String], implemented: &[String]) -> ModelResult<()> {
    if declared != implemented {
        return Err(ModelError::SanitizationInconsistency {
            class: scope,
            declared: declared.join(", "),
            implemented: implemented.join(", "),
        });
    }
    Ok(())
}

/// Declaration artifact: every overload under its exported name, mapped
/// back to the native signature it forwards to.
fn emit_declaration(class: &Class, sanitizer: &Sanitizer, declared: &mut Vec<String>) -> String {
    let mut out = String::new();
    let unique = class.unique_name();
    out.push_str(&format!("cdef cppclass {unique} \"{}\":\n", class.cpp_name()));
    for args in &class.constructor.overloads {
        out.push_str(&format!("    {unique}({})\n", decl_args(args)));
    }
    for method in &class.methods {
        for (i, overload) in method.overloads.iter().enumerate() {
            let exported = exported_method_name(sanitizer, &method.name, i, overload);
            out.push_str(&format!(
                "    {} {} \"{}{}\"({}){}\n",
                overload.ret.declaration(),
                exported,
                method.name,
                native_template(overload),
                decl_args(&overload.args),
                if method.is_const { " const" } else { "" },
            ));
            declared.push(exported);
        }
    }
    for method in &class.static_methods {
        for (i, overload) in method.overloads.iter().enumerate() {
            let exported = exported_method_name(sanitizer, &method.name, i, overload);
            out.push_str("    @staticmethod\n");
            out.push_str(&format!(
                "    {} {} \"{}{}\"({})\n",
                overload.ret.declaration(),
                exported,
                method.name,
                native_template(overload),
                decl_args(&overload.args),
            ));
            declared.push(exported);
        }
    }
    out
}

/// Implementation artifact: one callable body per exported name,
/// forwarding through the held shim object.
fn emit_implementation(
    class: &Class,
    sanitizer: &Sanitizer,
    implemented: &mut Vec<String>,
) -> String {
    let mut out = String::new();
    let unique = class.unique_name();
    let bare = sanitizer.sanitize(class.name.bare_name(), Backend::DeclImpl);
    out.push_str(&format!("cdef class {bare}:\n"));
    out.push_str(&format!("    cdef shared_ptr[{unique}] obj_\n\n"));

    emit_init(&mut out, class, &unique, &bare);

    if let Some(print_name) = stringification_target(class, sanitizer) {
        // One auxiliary stringification entry point for the whole
        // class, however many overloads the renamed method has.
        out.push_str("    def __str__(self):\n");
        out.push_str(&format!("        self.{print_name}('')\n"));
        out.push_str("        return ''\n\n");
    }

    for method in &class.methods {
        for (i, overload) in method.overloads.iter().enumerate() {
            let exported = exported_method_name(sanitizer, &method.name, i, overload);
            let self_args = if overload.args.is_empty() {
                "self".to_string()
            } else {
                format!("self, {}", overload.args.names())
            };
            out.push_str(&format!("    def {exported}({self_args}):\n"));
            emit_forward(&mut out, "        ", &exported, overload, "self.obj_.get().");
            out.push('\n');
            implemented.push(exported);
        }
    }
    for method in &class.static_methods {
        for (i, overload) in method.overloads.iter().enumerate() {
            let exported = exported_method_name(sanitizer, &method.name, i, overload);
            out.push_str("    @staticmethod\n");
            out.push_str(&format!(
                "    def {exported}({}):\n",
                overload.args.names()
            ));
            emit_forward(
                &mut out,
                "        ",
                &exported,
                overload,
                &format!("{unique}."),
            );
            out.push('\n');
            implemented.push(exported);
        }
    }
    out
}

fn emit_init(out: &mut String, class: &Class, unique: &str, bare: &str) {
    if class.constructor.is_empty() {
        return;
    }
    out.push_str("    def __init__(self, *args):\n");
    for (index, args) in class.constructor.overloads.iter().enumerate() {
        let keyword = if index == 0 { "if" } else { "elif" };
        out.push_str(&format!("        {keyword} len(args) == {}:\n", args.len()));
        let forwarded: Vec<String> = (0..args.len()).map(|i| format!("args[{i}]")).collect();
        out.push_str(&format!(
            "            self.obj_ = make_shared[{unique}]({})\n",
            forwarded.join(", ")
        ));
    }
    out.push_str("        else:\n");
    let arities: Vec<String> = class
        .constructor
        .overloads
        .iter()
        .map(|args| args.len().to_string())
        .collect();
    out.push_str(&format!(
        "            raise TypeError('{bare} constructor expects {} arguments, got %d' % len(args))\n\n",
        arities.join(" or ")
    ));
}

fn exported_method_name(
    sanitizer: &Sanitizer,
    name: &str,
    index: usize,
    overload: &Overload,
) -> String {
    sanitizer.exported_name(name, Backend::DeclImpl, index, overload.instantiation.as_ref())
}

/// The class's stringification method, if sanitization renamed one to
/// the printing keyword's marked form.
fn stringification_target(class: &Class, sanitizer: &Sanitizer) -> Option<String> {
    class.methods.iter().find_map(|method| {
        let sanitized = sanitizer.sanitize(&method.name, Backend::DeclImpl);
        if method.name == PRINT_KEYWORD && sanitized != method.name {
            Some(sanitized)
        } else {
            None
        }
    })
}

fn native_template(overload: &Overload) -> String {
    match &overload.instantiation {
        Some(inst) => format!("<{}>", inst.qualified_name("::")),
        None => String::new(),
    }
}

fn decl_args(args: &ArgumentList) -> String {
    args.iter()
        .map(|arg| format!("{} {}", arg.ty.flat_name(), arg.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn emit_forward(out: &mut String, indent: &str, exported: &str, overload: &Overload, receiver: &str) {
    let call = format!("{receiver}{exported}({})", overload.args.names());
    match &overload.ret {
        ReturnValue::Void => {
            out.push_str(&format!("{indent}{call}\n"));
        }
        ReturnValue::Single(_) => {
            out.push_str(&format!("{indent}return {call}\n"));
        }
        ReturnValue::Pair(_, _) => {
            out.push_str(&format!("{indent}result = {call}\n"));
            out.push_str(&format!("{indent}return (result.first, result.second)\n"));
        }
    }
}
