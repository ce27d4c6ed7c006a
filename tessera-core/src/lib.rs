//! # tessera-core
//!
//! Core types for tessera: the pieces every annotation layer is built from.
//!
//! This crate provides:
//! - **Spans**: [`Span`], half-open character ranges, and [`OffsetMap`] for
//!   char/byte conversion
//! - **Types**: [`TypeRegistry`] interning annotation, attribute and relation
//!   types, with the [`builtin`] set always present
//! - **Attributes**: [`AttributeValue`], coercion through [`decode`], the
//!   [`Tag`] capability and the [`AttributeMap`] store with its wire format
//! - **Errors**: the shared [`Error`] taxonomy
//!
//! The `tessera` crate builds documents, annotations and the text algebra on
//! top of these and re-exports everything here.

#![warn(missing_docs)]

pub mod attribute;
pub mod error;
pub mod offset;
pub mod span;
pub mod types;
pub mod value;

pub use attribute::AttributeMap;
pub use error::{Error, Result};
pub use offset::OffsetMap;
pub use span::Span;
pub use types::{
    builtin, AnnotatableType, AnnotationType, AttributeKey, AttributeType, Category,
    RelationType, TypeIndex, TypeRegistry,
};
pub use value::{decode, AttributeKind, AttributeValue, StringTag, Tag, ValueType};
