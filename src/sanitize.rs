use crate::backend::Backend;
use crate::model::types::TypeRef;

/// Reserved identifiers of one backend's target language.
#[derive(Clone, Copy, Debug)]
pub struct ReservedWords {
    pub backend: Backend,
    pub words: &'static [&'static str],
}

/// The reserved printing keyword of the declaration+implementation
/// target. A method landing on its marked form gets the extra
/// stringification entry point.
pub const PRINT_KEYWORD: &str = "print";

pub const DEFAULT_RESERVED: &[ReservedWords] = &[
    ReservedWords {
        backend: Backend::Shim,
        words: &[],
    },
    ReservedWords {
        backend: Backend::ProxyScript,
        words: &[
            "break", "case", "classdef", "else", "elseif", "end", "for", "function", "global",
            "if", "persistent", "return", "switch", "while",
        ],
    },
    ReservedWords {
        backend: Backend::DeclImpl,
        words: &[
            "class", "def", "from", "global", "import", "lambda", "pass", "print", "raise",
            "return", "yield",
        ],
    },
];

/// Renames identifiers that collide with a target's reserved words and
/// assigns distinct exported names where the target cannot overload.
/// Holds no hidden state: the tables are supplied at construction.
#[derive(Clone, Debug)]
pub struct Sanitizer {
    tables: Vec<ReservedWords>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Sanitizer::new(DEFAULT_RESERVED)
    }
}

impl Sanitizer {
    pub fn new(tables: &[ReservedWords]) -> Self {
        Sanitizer {
            tables: tables.to_vec(),
        }
    }

    pub fn is_reserved(&self, ident: &str, backend: Backend) -> bool {
        self.tables
            .iter()
            .filter(|table| table.backend == backend)
            .any(|table| table.words.contains(&ident))
    }

    /// Appends one trailing `_` to reserved identifiers; everything else
    /// passes through unchanged. Pure and total.
    pub fn sanitize(&self, ident: &str, backend: Backend) -> String {
        if self.is_reserved(ident, backend) {
            format!("{ident}_")
        } else {
            ident.to_string()
        }
    }

    /// Exported name of the overload at `index` (registration order), on
    /// targets without native overloading. A template instantiation
    /// contributes its bare name, and every overload beyond the first
    /// additionally appends `_{index}`, so two overloads of the same
    /// instantiation still export distinct names.
    pub fn exported_name(
        &self,
        base: &str,
        backend: Backend,
        index: usize,
        instantiation: Option<&TypeRef>,
    ) -> String {
        let mut out = self.sanitize(base, backend);
        if !backend.needs_overload_suffixes() {
            return out;
        }
        if let Some(inst) = instantiation {
            out.push_str(inst.bare_name());
        }
        if index > 0 {
            out.push_str(&format!("_{index}"));
        }
        out
    }
}
