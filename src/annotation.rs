//! Annotations: typed spans carrying attributes and relations.
//!
//! # Lifecycle
//!
//! ```text
//!  AnnotationBuilder::build()            Document::attach()
//!  ─────────────────────────► Detached ─────────────────────► Attached
//!                             id = DETACHED                    id = 0, 1, 2, ...
//!                             owned by the caller              owned by the Document
//!                                                              │
//!                                                              │ Document::remove()
//!                                                              ▼
//!                                                           destroyed
//! ```
//!
//! A detached annotation is a plain value: its `&mut` methods only touch the
//! annotation itself (relations are not mirrored anywhere). Once attached it
//! is only reachable through `&Document`, and every mutation goes through
//! the document so mirrored relations and caches stay consistent.

use crate::relation::Relation;
use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Serialize};
use std::fmt;
use tessera_core::{
    builtin, AnnotationType, AttributeKey, AttributeKind, AttributeMap, AttributeType,
    AttributeValue, Result, Span, ValueType,
};

/// Identifier of an annotation, unique within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(i64);

impl AnnotationId {
    /// Sentinel carried by annotations not (yet) attached to a document.
    pub const DETACHED: AnnotationId = AnnotationId(i64::MIN);

    /// Wrap a raw id.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// True for [`AnnotationId::DETACHED`].
    #[must_use]
    pub const fn is_detached(self) -> bool {
        self.0 == i64::MIN
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_detached() {
            f.write_str("detached")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

static ORPHAN: Lazy<Annotation> = Lazy::new(|| Annotation::new(builtin::ROOT, Span::default()));

/// A typed span with attributes and relations.
#[derive(Debug)]
pub struct Annotation {
    id: AnnotationId,
    annotation_type: AnnotationType,
    span: Span,
    attributes: AttributeMap,
    outgoing: Vec<Relation>,
    incoming: Vec<Relation>,
    /// Ids of the tokens this annotation overlaps, filled on first use.
    tokens: OnceCell<Vec<AnnotationId>>,
}

impl Annotation {
    pub(crate) fn new(annotation_type: AnnotationType, span: Span) -> Self {
        Self {
            id: AnnotationId::DETACHED,
            annotation_type,
            span,
            attributes: AttributeMap::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
            tokens: OnceCell::new(),
        }
    }

    /// Start building a detached annotation.
    #[must_use]
    pub fn builder(annotation_type: AnnotationType) -> AnnotationBuilder {
        AnnotationBuilder::new(annotation_type)
    }

    /// The shared empty annotation returned for lookup misses.
    pub(crate) fn orphan() -> &'static Annotation {
        &ORPHAN
    }

    /// Document-local id, or [`AnnotationId::DETACHED`].
    #[must_use]
    pub fn id(&self) -> AnnotationId {
        self.id
    }

    /// True once a document owns this annotation.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        !self.id.is_detached()
    }

    /// Annotation type.
    #[must_use]
    pub fn annotation_type(&self) -> AnnotationType {
        self.annotation_type
    }

    /// Character span.
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Start offset.
    #[must_use]
    pub fn start(&self) -> usize {
        self.span.start()
    }

    /// End offset.
    #[must_use]
    pub fn end(&self) -> usize {
        self.span.end()
    }

    /// Attribute store.
    #[must_use]
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Typed attribute read.
    #[must_use]
    pub fn attribute<T: AttributeKind>(&self, attr: AttributeType<T>) -> Option<T> {
        self.attributes.get(attr)
    }

    /// Typed attribute read with a fallback.
    #[must_use]
    pub fn attribute_or<T: AttributeKind>(&self, attr: AttributeType<T>, default: T) -> T {
        self.attributes.get_or(attr, default)
    }

    /// True if a value is stored for `key`.
    #[must_use]
    pub fn has_attribute(&self, key: impl Into<AttributeKey>) -> bool {
        self.attributes.contains(key)
    }

    /// Relations starting here.
    #[must_use]
    pub fn outgoing_relations(&self) -> &[Relation] {
        &self.outgoing
    }

    /// Mirrored relations ending here; their `target` is the source id.
    #[must_use]
    pub fn incoming_relations(&self) -> &[Relation] {
        &self.incoming
    }

    /// Write an attribute on a detached annotation.
    pub fn put<T: AttributeKind>(
        &mut self,
        attr: AttributeType<T>,
        value: impl Into<AttributeValue>,
    ) -> Result<Option<AttributeValue>> {
        self.attributes.put(attr, value)
    }

    /// Add an outgoing relation to a detached annotation.
    ///
    /// Nothing is mirrored: a detached annotation has no document to find
    /// the target in. Mirroring happens when the annotation is attached.
    pub fn add_relation(&mut self, relation: Relation) -> bool {
        insert_unique(&mut self.outgoing, relation)
    }

    /// Remove an outgoing relation from a detached annotation.
    pub fn remove_relation(&mut self, relation: &Relation) -> bool {
        remove_first(&mut self.outgoing, relation)
    }

    /// Relabel an outgoing relation of a detached annotation.
    ///
    /// Returns false if the relation is not held here.
    pub fn set_relation_value(&mut self, relation: &Relation, value: impl Into<String>) -> bool {
        replace(&mut self.outgoing, relation, relation.with_value(value))
    }

    // -------------------------------------------------------------------------
    // Document-side plumbing
    // -------------------------------------------------------------------------

    pub(crate) fn set_id(&mut self, id: AnnotationId) {
        self.id = id;
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }

    pub(crate) fn add_incoming(&mut self, relation: Relation) -> bool {
        insert_unique(&mut self.incoming, relation)
    }

    pub(crate) fn remove_incoming(&mut self, relation: &Relation) -> bool {
        remove_first(&mut self.incoming, relation)
    }

    pub(crate) fn replace_incoming(&mut self, old: &Relation, new: Relation) -> bool {
        replace(&mut self.incoming, old, new)
    }

    pub(crate) fn token_cache(&self) -> &OnceCell<Vec<AnnotationId>> {
        &self.tokens
    }

    pub(crate) fn clear_token_cache(&mut self) {
        self.tokens.take();
    }
}

fn insert_unique(set: &mut Vec<Relation>, relation: Relation) -> bool {
    if set.contains(&relation) {
        return false;
    }
    set.push(relation);
    true
}

/// Swap `old` for `new`, collapsing the two if `new` is already present.
fn replace(set: &mut Vec<Relation>, old: &Relation, new: Relation) -> bool {
    let Some(pos) = set.iter().position(|r| r == old) else {
        return false;
    };
    if *old != new && set.contains(&new) {
        set.remove(pos);
    } else {
        set[pos] = new;
    }
    true
}

fn remove_first(set: &mut Vec<Relation>, relation: &Relation) -> bool {
    match set.iter().position(|r| r == relation) {
        Some(pos) => {
            set.remove(pos);
            true
        }
        None => false,
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for detached annotations.
///
/// Attribute values are coerced when [`build`](Self::build) runs, so a bad
/// value surfaces there as [`Error::InvalidValue`].
///
/// ```rust
/// use tessera::{builtin, Annotation};
///
/// let token = Annotation::builder(builtin::TOKEN)
///     .span(4, 9)
///     .attribute(builtin::PART_OF_SPEECH, "JJ")
///     .attribute(builtin::INDEX, "1")
///     .build()
///     .unwrap();
/// assert!(!token.is_attached());
/// assert_eq!(token.attribute(builtin::INDEX), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct AnnotationBuilder {
    annotation_type: AnnotationType,
    start: usize,
    end: usize,
    attributes: Vec<(AttributeKey, ValueType, AttributeValue)>,
    relations: Vec<Relation>,
}

impl AnnotationBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new(annotation_type: AnnotationType) -> Self {
        Self {
            annotation_type,
            start: 0,
            end: 0,
            attributes: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Set span offsets.
    #[must_use]
    pub const fn span(mut self, start: usize, end: usize) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Set an attribute.
    #[must_use]
    pub fn attribute<T: AttributeKind>(
        mut self,
        attr: AttributeType<T>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes
            .push((attr.key(), T::VALUE_TYPE, value.into()));
        self
    }

    /// Copy every attribute of an existing map.
    #[must_use]
    pub fn attributes(mut self, attributes: &AttributeMap) -> Self {
        for (key, value) in attributes.iter() {
            if let Some(value_type) = value.value_type() {
                self.attributes.push((key, value_type, value.clone()));
            }
        }
        self
    }

    /// Add an outgoing relation.
    #[must_use]
    pub fn relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Build the detached annotation.
    pub fn build(self) -> Result<Annotation> {
        let span = Span::new(self.start, self.end)?;
        let mut annotation = Annotation::new(self.annotation_type, span);
        for (key, value_type, value) in self.attributes {
            annotation.attributes.put_decoded(key, value_type, value)?;
        }
        for relation in self.relations {
            annotation.add_relation(relation);
        }
        Ok(annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{Error, StringTag};

    #[test]
    fn test_builder_produces_detached_annotation() {
        let annotation = Annotation::builder(builtin::ENTITY)
            .span(0, 11)
            .attribute(builtin::ENTITY_TYPE, "PERSON")
            .attribute(builtin::CONFIDENCE, "0.9")
            .build()
            .unwrap();

        assert_eq!(annotation.id(), AnnotationId::DETACHED);
        assert!(!annotation.is_attached());
        assert_eq!(annotation.span(), Span::new(0, 11).unwrap());
        assert_eq!(
            annotation.attribute(builtin::ENTITY_TYPE),
            Some(StringTag::new("PERSON"))
        );
        assert_eq!(annotation.attribute(builtin::CONFIDENCE), Some(0.9));
    }

    #[test]
    fn test_builder_rejects_bad_span_and_bad_value() {
        let err = Annotation::builder(builtin::TOKEN).span(5, 2).build().unwrap_err();
        assert!(matches!(err, Error::InvalidSpan { .. }));

        let err = Annotation::builder(builtin::TOKEN)
            .span(0, 2)
            .attribute(builtin::INDEX, "first")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }

    #[test]
    fn test_detached_relations_are_not_mirrored() {
        let mut annotation = Annotation::builder(builtin::TOKEN).span(0, 3).build().unwrap();
        let rel = Relation::new(builtin::DEPENDENCY, "det", AnnotationId::new(1));

        assert!(annotation.add_relation(rel.clone()));
        assert!(!annotation.add_relation(rel.clone()));
        assert_eq!(annotation.outgoing_relations().len(), 1);
        assert!(annotation.incoming_relations().is_empty());
        assert!(annotation.remove_relation(&rel));
        assert!(annotation.outgoing_relations().is_empty());
    }

    #[test]
    fn test_detached_relabel() {
        let target = AnnotationId::new(1);
        let det = Relation::new(builtin::DEPENDENCY, "det", target);
        let mut annotation = Annotation::builder(builtin::TOKEN)
            .span(0, 3)
            .relation(det.clone())
            .relation(Relation::new(builtin::DEPENDENCY, "amod", target))
            .build()
            .unwrap();

        assert!(annotation.set_relation_value(&det, "det:poss"));
        assert!(!annotation.set_relation_value(&det, "det"));
        assert_eq!(annotation.outgoing_relations()[0].value(), "det:poss");

        // Relabelling onto an existing relation merges the two
        let poss = Relation::new(builtin::DEPENDENCY, "det:poss", target);
        assert!(annotation.set_relation_value(&poss, "amod"));
        assert_eq!(
            annotation.outgoing_relations(),
            &[Relation::new(builtin::DEPENDENCY, "amod", target)]
        );
    }

    #[test]
    fn test_detached_id_display() {
        assert_eq!(AnnotationId::DETACHED.to_string(), "detached");
        assert_eq!(AnnotationId::new(4).to_string(), "4");
    }
}
