//! # tessera
//!
//! Layered annotated text for Rust.
//!
//! - **Documents**: text plus any number of annotation layers (tokens,
//!   sentences, phrases, entities, ...) over character spans
//! - **Types**: an explicit [`TypeRegistry`] of annotation, attribute and
//!   relation types with parent hierarchies
//! - **Relations**: typed, labelled edges between annotations, mirrored on
//!   the target so incoming edges are a field read
//! - **Text algebra**: [`HString`] fragments with union, slicing, context
//!   windows, interleaving, trimming, splitting and search
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tessera::prelude::*;
//!
//! let registry = Arc::new(TypeRegistry::new());
//! let mut doc = Document::new(Arc::clone(&registry), "doc-1", "( cat )");
//! for (start, end) in [(0, 1), (2, 5), (6, 7)] {
//!     doc.create_annotation(builtin::TOKEN, start, end, AttributeMap::new())?;
//! }
//!
//! let punct = |t: &AnnotationRef<'_>| t.text().chars().all(|c| c.is_ascii_punctuation());
//! assert_eq!(doc.hstring().trim(punct).text(), "cat");
//! # Ok::<(), tessera::Error>(())
//! ```
//!
//! ## Custom Types
//!
//! ```rust
//! use tessera::prelude::*;
//!
//! let registry = TypeRegistry::new();
//! let noun_phrase = registry.make_annotation_type_with(
//!     "NOUN_PHRASE",
//!     builtin::PHRASE_CHUNK,
//!     None,
//! )?;
//! let sentiment = registry.make_attribute_type::<f64>("SENTIMENT")?;
//!
//! assert!(registry.is_instance(noun_phrase, builtin::PHRASE_CHUNK));
//! assert_eq!(registry.canonical_name(sentiment), "Attribute.SENTIMENT");
//! # Ok::<(), tessera::Error>(())
//! ```
//!
//! ## Crate Layout
//!
//! | Crate | Contents |
//! |-------|----------|
//! | `tessera-core` | spans, offsets, attribute values, type registry, errors |
//! | `tessera` | annotations, relations, documents, span index, text algebra |
//!
//! Everything public in `tessera-core` is re-exported here.

#![warn(missing_docs)]

pub mod annotation;
pub mod config;
pub mod document;
pub mod hstring;
pub mod index;
pub mod relation;
pub mod shared;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use std::sync::Arc;
    //! use tessera::prelude::*;
    //!
    //! let doc = Document::new(Arc::new(TypeRegistry::new()), "d", "hello");
    //! assert_eq!(doc.hstring().text(), "hello");
    //! ```
    pub use crate::annotation::{Annotation, AnnotationBuilder, AnnotationId};
    pub use crate::document::Document;
    pub use crate::hstring::{AnnotationRef, AsHString, HString};
    pub use crate::relation::Relation;
    pub use crate::shared::SharedDocument;
    pub use crate::Config;
    pub use tessera_core::{
        builtin, AnnotationType, AttributeMap, AttributeType, AttributeValue, Error,
        RelationType, Result, Span, StringTag, Tag, TypeRegistry,
    };
}

// Re-exports
pub use annotation::{Annotation, AnnotationBuilder, AnnotationId};
pub use config::Config;
pub use document::Document;
pub use hstring::{AnnotationRef, AsHString, HString};
pub use index::SpanIndex;
pub use relation::Relation;
pub use shared::SharedDocument;

pub use tessera_core::{
    attribute, builtin, decode, error, offset, span, types, value, AnnotatableType,
    AnnotationType, AttributeKey, AttributeKind, AttributeMap, AttributeType, AttributeValue,
    Category, Error, OffsetMap, RelationType, Result, Span, StringTag, Tag, TypeIndex,
    TypeRegistry, ValueType,
};
