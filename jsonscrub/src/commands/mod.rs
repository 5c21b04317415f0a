pub mod rules;
pub mod sanitize;
