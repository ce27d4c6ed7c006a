//! Typed, valued, directed edges between annotations of one document.

use crate::annotation::AnnotationId;
use crate::hstring::{AnnotationRef, AsHString};
use tessera_core::RelationType;

/// An edge `(type, value, target)` stored on its source annotation.
///
/// Relations compare by all three fields, so an annotation holds each at
/// most once. The copy stored on the target as an incoming relation points
/// back at the source.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tessera::{builtin, AttributeMap, Document, Relation, TypeRegistry};
///
/// let mut doc = Document::new(Arc::new(TypeRegistry::new()), "d", "cats sleep");
/// let cats = doc.create_annotation(builtin::TOKEN, 0, 4, AttributeMap::new()).unwrap();
/// let sleep = doc.create_annotation(builtin::TOKEN, 5, 10, AttributeMap::new()).unwrap();
/// doc.add_relation(sleep, Relation::new(builtin::DEPENDENCY, "nsubj", cats)).unwrap();
///
/// let head = doc.annotation(sleep);
/// let rel = &head.outgoing_relations()[0];
/// assert_eq!(rel.resolve(&head).text(), "cats");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relation {
    relation_type: RelationType,
    value: String,
    target: AnnotationId,
}

impl Relation {
    /// Create a relation pointing at `target`.
    #[must_use]
    pub fn new(relation_type: RelationType, value: impl Into<String>, target: AnnotationId) -> Self {
        Self {
            relation_type,
            value: value.into(),
            target,
        }
    }

    /// Relation type.
    #[must_use]
    pub fn relation_type(&self) -> RelationType {
        self.relation_type
    }

    /// Free-form label, e.g. a dependency label.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Id of the annotation at the far end.
    #[must_use]
    pub fn target(&self) -> AnnotationId {
        self.target
    }

    /// The same edge with a different label.
    #[must_use]
    pub fn with_value(&self, value: impl Into<String>) -> Relation {
        Relation::new(self.relation_type, value, self.target)
    }

    /// The copy stored on the target, pointing back at `source`.
    pub(crate) fn mirrored(&self, source: AnnotationId) -> Relation {
        Relation::new(self.relation_type, self.value.clone(), source)
    }

    /// Look the far end up in the document `owner` lives in.
    ///
    /// Returns the orphan annotation when `owner` is detached or the target
    /// has been removed.
    pub fn resolve<'d>(&self, owner: &impl AsHString<'d>) -> AnnotationRef<'d> {
        match owner.as_hstring().document() {
            Some(document) => document.annotation(self.target),
            None => AnnotationRef::orphan(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hstring::HString;
    use tessera_core::builtin;

    #[test]
    fn test_equality_covers_all_fields() {
        let a = Relation::new(builtin::DEPENDENCY, "nsubj", AnnotationId::new(1));
        assert_eq!(a, Relation::new(builtin::DEPENDENCY, "nsubj", AnnotationId::new(1)));
        assert_ne!(a, Relation::new(builtin::DEPENDENCY, "dobj", AnnotationId::new(1)));
        assert_ne!(a, Relation::new(builtin::COREFERENCE, "nsubj", AnnotationId::new(1)));
        assert_ne!(a, Relation::new(builtin::DEPENDENCY, "nsubj", AnnotationId::new(2)));
    }

    #[test]
    fn test_mirror_points_back() {
        let rel = Relation::new(builtin::COREFERENCE, "", AnnotationId::new(7));
        let mirror = rel.mirrored(AnnotationId::new(3));
        assert_eq!(mirror.target(), AnnotationId::new(3));
        assert_eq!(mirror.relation_type(), builtin::COREFERENCE);
    }

    #[test]
    fn test_resolve_without_document_is_orphan() {
        let rel = Relation::new(builtin::DEPENDENCY, "det", AnnotationId::new(0));
        let target = rel.resolve(&HString::orphan());
        assert!(target.is_orphan());
        assert!(target.span().is_empty());
    }
}
