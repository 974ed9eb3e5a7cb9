use miette::{Diagnostic, Report};
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

/// Generation-time errors. Any of these aborts the whole run: partial
/// output from an inconsistent model must never reach a compiler.
#[derive(Clone, Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum ModelError {
    #[error("overloads of `{name}` disagree on const qualification")]
    #[diagnostic(
        code(wrapgen::model::const_mismatch),
        help("the first registered overload fixed the const flag; every later overload must declare the same qualification")
    )]
    ConstQualificationMismatch { name: String, first_const: bool },

    #[error("class `{name}` is declared more than once")]
    #[diagnostic(code(wrapgen::model::duplicate_class))]
    DuplicateClass { name: String },

    #[error("class `{class}` extends unknown base class `{base}`")]
    #[diagnostic(code(wrapgen::model::unknown_base))]
    UnknownBaseClass { class: String, base: String },

    #[error(
        "declaration/implementation naming diverged for `{class}`: declared [{declared}], implemented [{implemented}]"
    )]
    #[diagnostic(
        code(wrapgen::emit::sanitization_inconsistency),
        help("this is a defect in the generator itself, not in the declaration model")
    )]
    SanitizationInconsistency {
        class: String,
        declared: String,
        implemented: String,
    },
}

pub fn render_generation_error(error: &ModelError) -> String {
    format!("{:?}", Report::new(error.clone()))
}

pub fn report_generation_error(error: &ModelError) {
    eprintln!("{}", render_generation_error(error));
}
