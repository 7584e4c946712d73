//! Mapping from UI concepts to documentation routes

mod context;
mod element;

pub use context::ContextMappingResolver;
pub use element::{
    element_type_aliases, slugify, strip_numeric_prefix, ElementMapping, ElementMappingBuilder,
    ELEMENT_TYPE_ALIASES,
};
