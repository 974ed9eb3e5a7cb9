//! Proxy-script backend. One `classdef` script per class whose method
//! dispatchers accept a variadic argument list and select the shim entry
//! by argument count alone, mirroring the registry's arity-based model.

use crate::error::ModelResult;
use crate::model::callable::GlobalFunction;
use crate::model::class::{Class, Forest};
use crate::sanitize::Sanitizer;

use super::shim::{self, EntryKind};
use super::{GeneratedFile, GeneratedUnit};
use crate::backend::Backend;

pub fn emit_class(
    forest: &Forest,
    class: &Class,
    sanitizer: &Sanitizer,
) -> ModelResult<GeneratedUnit> {
    let mut out = String::new();
    let bare = class.name.bare_name().to_string();
    let wrapper = shim::wrapper_name(class);
    let property = class.handle_tag();
    let entries = shim::entries(class);

    let parent = match class.base {
        Some(base) => sanitizer.sanitize(forest.class(base).name.bare_name(), Backend::ProxyScript),
        None => "handle".to_string(),
    };
    out.push_str(&format!("classdef {bare} < {parent}\n"));
    out.push_str("  properties\n");
    out.push_str(&format!("    {property} = 0\n"));
    out.push_str("  end\n");
    out.push_str("  methods\n");

    // Constructor dispatch, one arm per registered overload arity.
    let ctor_arms: Vec<(usize, usize)> = entries
        .iter()
        .filter_map(|entry| match entry.kind {
            EntryKind::Constructor { ref args, .. } => Some((entry.id, args.len())),
            _ => None,
        })
        .collect();
    if !ctor_arms.is_empty() {
        out.push_str(&format!("    function this = {bare}(varargin)\n"));
        for (index, (id, arity)) in ctor_arms.iter().enumerate() {
            let keyword = if index == 0 { "if" } else { "elseif" };
            out.push_str(&format!(
                "      {keyword} length(varargin) == {arity}\n"
            ));
            out.push_str(&format!(
                "        this.{property} = {wrapper}({id}, varargin{{:}});\n"
            ));
        }
        out.push_str("      else\n");
        out.push_str(&format!(
            "        error('{bare} constructor expects {} arguments, got %d', length(varargin));\n",
            arity_list(ctor_arms.iter().map(|(_, arity)| *arity))
        ));
        out.push_str("      end\n");
        out.push_str("    end\n\n");
    }

    let destructor_id = entries
        .iter()
        .find(|entry| matches!(entry.kind, EntryKind::Destructor))
        .map(|entry| entry.id)
        .unwrap_or(0);
    out.push_str("    function delete(this)\n");
    out.push_str(&format!(
        "      {wrapper}({destructor_id}, this.{property});\n"
    ));
    out.push_str("    end\n");

    for method in &class.methods {
        let name = sanitizer.sanitize(&method.name, Backend::ProxyScript);
        let arms: Vec<(usize, usize)> = entries
            .iter()
            .filter_map(|entry| match entry.kind {
                EntryKind::Method {
                    method: m,
                    overload,
                } if std::ptr::eq(m, method) => Some((entry.id, m.overloads[overload].args.len())),
                _ => None,
            })
            .collect();
        out.push('\n');
        out.push_str(&format!(
            "    function varargout = {name}(this, varargin)\n"
        ));
        emit_arity_arms(&mut out, &name, &arms, &wrapper, Some(&property));
        out.push_str("    end\n");
    }
    out.push_str("  end\n");

    if !class.static_methods.is_empty() {
        out.push_str("  methods(Static)\n");
        for method in &class.static_methods {
            let name = sanitizer.sanitize(&method.name, Backend::ProxyScript);
            let arms: Vec<(usize, usize)> = entries
                .iter()
                .filter_map(|entry| match entry.kind {
                    EntryKind::Static {
                        method: m,
                        overload,
                    } if std::ptr::eq(m, method) => {
                        Some((entry.id, m.overloads[overload].args.len()))
                    }
                    _ => None,
                })
                .collect();
            out.push_str(&format!("    function varargout = {name}(varargin)\n"));
            emit_arity_arms(&mut out, &name, &arms, &wrapper, None);
            out.push_str("    end\n");
        }
        out.push_str("  end\n");
    }
    out.push_str("end\n");

    Ok(GeneratedUnit {
        backend: Backend::ProxyScript,
        class: Some(class.cpp_name()),
        files: vec![GeneratedFile {
            name: format!("{bare}.m"),
            text: out,
        }],
    })
}

/// Free functions each get a standalone script forwarding to the
/// module-level wrapper.
pub fn emit_functions(
    functions: &[GlobalFunction],
    sanitizer: &Sanitizer,
) -> ModelResult<GeneratedUnit> {
    let table = shim::function_entries(functions);
    let mut files = Vec::new();
    for func in functions {
        let name = sanitizer.sanitize(&func.name, Backend::ProxyScript);
        let arms: Vec<(usize, usize)> = table
            .iter()
            .filter_map(|(id, _, f, overload)| {
                if std::ptr::eq(*f, func) {
                    Some((*id, f.overloads[*overload].args.len()))
                } else {
                    None
                }
            })
            .collect();
        let mut out = String::new();
        out.push_str(&format!("function varargout = {name}(varargin)\n"));
        emit_arity_arms(&mut out, &name, &arms, shim::FUNCTIONS_WRAPPER, None);
        out.push_str("end\n");
        files.push(GeneratedFile {
            name: format!("{name}.m"),
            text: out,
        });
    }
    Ok(GeneratedUnit {
        backend: Backend::ProxyScript,
        class: None,
        files,
    })
}

/// Closed set of arity arms in registration order, with a fallback that
/// raises the arity error naming the callable.
fn emit_arity_arms(
    out: &mut String,
    name: &str,
    arms: &[(usize, usize)],
    wrapper: &str,
    receiver: Option<&str>,
) {
    for (index, (id, arity)) in arms.iter().enumerate() {
        let keyword = if index == 0 { "if" } else { "elseif" };
        out.push_str(&format!("      {keyword} length(varargin) == {arity}\n"));
        match receiver {
            Some(property) => out.push_str(&format!(
                "        [varargout{{1:nargout}}] = {wrapper}({id}, this.{property}, varargin{{:}});\n"
            )),
            None => out.push_str(&format!(
                "        [varargout{{1:nargout}}] = {wrapper}({id}, varargin{{:}});\n"
            )),
        }
    }
    out.push_str("      else\n");
    out.push_str(&format!(
        "        error('{name} expects {} arguments, got %d', length(varargin));\n",
        arity_list(arms.iter().map(|(_, arity)| *arity))
    ));
    out.push_str("      end\n");
}

fn arity_list(arities: impl Iterator<Item = usize>) -> String {
    let rendered: Vec<String> = arities.map(|a| a.to_string()).collect();
    rendered.join(" or ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::argument::{Argument, ArgumentList};
    use crate::model::class::{ClassBuilder, ForestBuilder};
    use crate::model::returns::ReturnValue;
    use crate::model::types::TypeRef;

    fn point_forest() -> Forest {
        let mut builder = ClassBuilder::new(TypeRef::namespaced(&["geometry"], "Point"));
        builder.add_constructor_overload(ArgumentList::new());
        builder.add_constructor_overload(ArgumentList::from_args(vec![
            Argument::new("x", TypeRef::new("double")),
            Argument::new("y", TypeRef::new("double")),
        ]));
        builder
            .add_method_overload(
                "scale",
                ArgumentList::from_args(vec![Argument::new("factor", TypeRef::new("double"))]),
                ReturnValue::Single(TypeRef::namespaced(&["geometry"], "Point")),
                true,
                None,
            )
            .unwrap();
        builder
            .add_method_overload(
                "scale",
                ArgumentList::from_args(vec![
                    Argument::new("factor", TypeRef::new("double")),
                    Argument::new("origin", TypeRef::namespaced(&["geometry"], "Point")),
                ]),
                ReturnValue::Single(TypeRef::namespaced(&["geometry"], "Point")),
                true,
                None,
            )
            .unwrap();
        builder.add_static_overload(
            "Origin",
            ArgumentList::new(),
            ReturnValue::Single(TypeRef::namespaced(&["geometry"], "Point")),
            None,
        );
        let mut forest = ForestBuilder::new();
        forest.add_class(builder).unwrap();
        forest.seal().unwrap()
    }

    fn proxy_text(forest: &Forest) -> String {
        emit_class(forest, &forest.classes[0], &Sanitizer::default())
            .unwrap()
            .files[0]
            .text
            .clone()
    }

    #[test]
    fn dispatcher_header_has_the_fixed_shape() {
        let forest = point_forest();
        let text = proxy_text(&forest);
        assert!(text.contains("function varargout = scale(this, varargin)"));
    }

    #[test]
    fn arity_arms_follow_registration_order_with_fallback() {
        let forest = point_forest();
        let text = proxy_text(&forest);
        let scale = text.find("function varargout = scale").unwrap();
        let one = text[scale..].find("if length(varargin) == 1").unwrap();
        let two = text[scale..].find("elseif length(varargin) == 2").unwrap();
        assert!(one < two);
        assert!(text.contains("error('scale expects 1 or 2 arguments, got %d', length(varargin));"));
    }

    #[test]
    fn constructor_dispatches_by_arity_and_stores_the_handle() {
        let forest = point_forest();
        let text = proxy_text(&forest);
        assert!(text.contains("function this = Point(varargin)"));
        assert!(text.contains("this.ptr_geometryPoint = geometryPoint_wrapper(0, varargin{:});"));
        assert!(
            text.contains("error('Point constructor expects 0 or 2 arguments, got %d', length(varargin));")
        );
    }

    #[test]
    fn delete_forwards_to_the_destructor_entry() {
        let forest = point_forest();
        let text = proxy_text(&forest);
        // Two ctor overloads occupy ids 0 and 1; the destructor is next.
        assert!(text.contains("geometryPoint_wrapper(2, this.ptr_geometryPoint);"));
    }

    #[test]
    fn static_methods_take_no_receiver() {
        let forest = point_forest();
        let origin = forest.classes[0].static_method("Origin").unwrap();
        assert_eq!(origin.overloads.len(), 1);
        let text = proxy_text(&forest);
        assert!(text.contains("methods(Static)"));
        assert!(text.contains("function varargout = Origin(varargin)"));
        assert!(text.contains("[varargout{1:nargout}] = geometryPoint_wrapper(5, varargin{:});"));
    }

    #[test]
    fn base_class_becomes_the_script_parent() {
        let mut forest = ForestBuilder::new();
        forest
            .add_class(ClassBuilder::new(TypeRef::namespaced(
                &["geometry"],
                "Shape",
            )))
            .unwrap();
        forest
            .add_class(
                ClassBuilder::new(TypeRef::namespaced(&["geometry"], "Point"))
                    .with_base("geometry::Shape"),
            )
            .unwrap();
        let forest = forest.seal().unwrap();
        let point = forest.find_class("geometry::Point").unwrap();
        let text = emit_class(&forest, point, &Sanitizer::default())
            .unwrap()
            .files[0]
            .text
            .clone();
        assert!(text.starts_with("classdef Point < Shape\n"));
    }

    #[test]
    fn reserved_script_names_are_sanitized() {
        let mut builder = ClassBuilder::new(TypeRef::new("Loop"));
        builder
            .add_method_overload("end", ArgumentList::new(), ReturnValue::Void, false, None)
            .unwrap();
        let mut forest = ForestBuilder::new();
        forest.add_class(builder).unwrap();
        let forest = forest.seal().unwrap();
        let text = proxy_text(&forest);
        assert!(text.contains("function varargout = end_(this, varargin)"));
    }
}
