pub mod backend;
pub mod emit;
pub mod error;
pub mod model;
pub mod sanitize;

#[cfg(test)]
mod tests;
