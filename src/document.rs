//! Documents: text plus the annotation layers over it.
//!
//! A [`Document`] owns every annotation attached to it. Annotations refer to
//! each other only by [`AnnotationId`], and every mutation of an attached
//! annotation goes through a `Document` method so that:
//!
//! - relations added to a source are mirrored onto their target's incoming set
//! - the span index always matches the annotation map
//! - token caches of overlapping annotations are dropped when tokens change;
//!   only annotations whose cache is filled are visited, so loading tokens
//!   never touches the span index
//!
//! Queries borrow the document and hand out [`AnnotationRef`] views.

use crate::annotation::{Annotation, AnnotationId};
use crate::config::{Config, Layers};
use crate::hstring::{AnnotationRef, HString};
use crate::index::SpanIndex;
use crate::relation::Relation;
use crate::shared::SharedDocument;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tessera_core::{
    builtin, AnnotatableType, AnnotationType, AttributeKey, AttributeKind, AttributeMap,
    AttributeType, AttributeValue, Category, Error, OffsetMap, Result, Span, TypeRegistry,
};

type WireMap = serde_json::Map<String, serde_json::Value>;

/// Text with layered annotations.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tessera::{builtin, AttributeMap, Document, TypeRegistry};
///
/// let registry = Arc::new(TypeRegistry::new());
/// let mut doc = Document::new(registry, "doc-1", "the quick fox");
/// for (start, end) in [(0, 3), (4, 9), (10, 13)] {
///     doc.create_annotation(builtin::TOKEN, start, end, AttributeMap::new()).unwrap();
/// }
/// doc.set_completed(builtin::TOKEN, "whitespace");
///
/// let tokens = doc.hstring().tokens();
/// assert_eq!(tokens.len(), 3);
/// assert_eq!(tokens[1].text(), "quick");
/// ```
pub struct Document {
    id: String,
    text: String,
    offsets: OffsetMap,
    registry: Arc<TypeRegistry>,
    layers: Layers,
    attributes: AttributeMap,
    annotations: HashMap<AnnotationId, Annotation>,
    index: SpanIndex,
    next_id: i64,
    completed: HashMap<AnnotatableType, String>,
    /// Annotations whose token cache is currently filled.
    cached_tokens: Mutex<HashSet<AnnotationId>>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("chars", &self.offsets.char_len())
            .field("annotations", &self.annotations.len())
            .field("completed", &self.completed.len())
            .field("cached_tokens", &self.cached_tokens.lock().len())
            .finish()
    }
}

impl Document {
    /// Create a document using the built-in `TOKEN` and `SENTENCE` layers.
    pub fn new(registry: Arc<TypeRegistry>, id: impl Into<String>, text: impl Into<String>) -> Self {
        let layers = Layers {
            token: builtin::TOKEN,
            sentence: builtin::SENTENCE,
        };
        Self::with_layers(registry, layers, id.into(), text.into())
    }

    /// Create a document whose token and sentence layers come from `config`.
    pub fn with_config(
        registry: Arc<TypeRegistry>,
        config: &Config,
        id: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self> {
        let layers = config.resolve(&registry)?;
        Ok(Self::with_layers(registry, layers, id.into(), text.into()))
    }

    fn with_layers(registry: Arc<TypeRegistry>, layers: Layers, id: String, text: String) -> Self {
        let offsets = OffsetMap::new(&text);
        log::debug!("created document {id} ({} chars)", offsets.char_len());
        Self {
            id,
            text,
            offsets,
            registry,
            layers,
            attributes: AttributeMap::new(),
            annotations: HashMap::new(),
            index: SpanIndex::new(),
            next_id: 0,
            completed: HashMap::new(),
            cached_tokens: Mutex::new(HashSet::new()),
        }
    }

    /// Wrap in a lock for sharing across threads.
    #[must_use]
    pub fn into_shared(self) -> SharedDocument {
        SharedDocument::new(self)
    }

    // -------------------------------------------------------------------------
    // Text
    // -------------------------------------------------------------------------

    /// Document id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Full text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the text in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.offsets.char_len()
    }

    /// The whole text as a fragment.
    #[must_use]
    pub fn hstring(&self) -> HString<'_> {
        HString::new(self, self.full_span())
    }

    pub(crate) fn full_span(&self) -> Span {
        Span::covering(0, self.char_len())
    }

    /// Text covered by a character span. Out-of-range spans yield `""`.
    #[must_use]
    pub fn text_of(&self, span: Span) -> &str {
        self.offsets.slice(&self.text, span)
    }

    pub(crate) fn offsets(&self) -> &OffsetMap {
        &self.offsets
    }

    /// Registry the document's types live in.
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Annotation type used as the token layer.
    #[must_use]
    pub fn token_type(&self) -> AnnotationType {
        self.layers.token
    }

    /// Annotation type used as the sentence layer.
    #[must_use]
    pub fn sentence_type(&self) -> AnnotationType {
        self.layers.sentence
    }

    // -------------------------------------------------------------------------
    // Document-level attributes
    // -------------------------------------------------------------------------

    /// Document-level attributes.
    #[must_use]
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Typed document-level attribute read.
    #[must_use]
    pub fn attribute<T: AttributeKind>(&self, attr: AttributeType<T>) -> Option<T> {
        self.attributes.get(attr)
    }

    /// Write a document-level attribute.
    pub fn put<T: AttributeKind>(
        &mut self,
        attr: AttributeType<T>,
        value: impl Into<AttributeValue>,
    ) -> Result<Option<AttributeValue>> {
        self.attributes.put(attr, value)
    }

    // -------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------

    /// Create and attach an annotation over `[start, end)`.
    pub fn create_annotation(
        &mut self,
        annotation_type: AnnotationType,
        start: usize,
        end: usize,
        attributes: AttributeMap,
    ) -> Result<AnnotationId> {
        self.create_annotation_with(annotation_type, start, end, attributes, [])
    }

    /// Create and attach an annotation together with its outgoing relations.
    pub fn create_annotation_with(
        &mut self,
        annotation_type: AnnotationType,
        start: usize,
        end: usize,
        attributes: AttributeMap,
        relations: impl IntoIterator<Item = Relation>,
    ) -> Result<AnnotationId> {
        let span = Span::new(start, end)?;
        self.check_bounds(span)?;
        let mut annotation = Annotation::new(annotation_type, span);
        annotation.attributes_mut().put_all(&attributes);
        let id = self.allocate(annotation);
        for relation in relations {
            self.add_relation(id, relation)?;
        }
        Ok(id)
    }

    /// Attach a detached annotation, assigning its id.
    ///
    /// Outgoing relations the annotation already carries are mirrored onto
    /// their targets. Targets that do not exist yet stay unmirrored. An
    /// annotation that already carries an id is [`Error::InvalidInput`].
    pub fn attach(&mut self, annotation: Annotation) -> Result<AnnotationId> {
        if annotation.is_attached() {
            return Err(Error::invalid_input(format!(
                "annotation {} is already attached",
                annotation.id()
            )));
        }
        self.check_bounds(annotation.span())?;
        let pending = annotation.outgoing_relations().to_vec();
        let id = self.allocate(annotation);
        for relation in &pending {
            self.mirror(id, relation);
        }
        log::debug!(
            "attached annotation {id} to document {} with {} relations",
            self.id,
            pending.len()
        );
        Ok(id)
    }

    fn check_bounds(&self, span: Span) -> Result<()> {
        if span.end() > self.char_len() {
            return Err(Error::out_of_bounds(format!(
                "span {span} exceeds document {} of length {}",
                self.id,
                self.char_len()
            )));
        }
        Ok(())
    }

    fn allocate(&mut self, annotation: Annotation) -> AnnotationId {
        let id = AnnotationId::new(self.next_id);
        self.next_id += 1;
        self.insert(id, annotation);
        id
    }

    fn insert(&mut self, id: AnnotationId, mut annotation: Annotation) {
        annotation.set_id(id);
        let span = annotation.span();
        let is_token = self.is_token_type(annotation.annotation_type());
        self.index.insert(id, span);
        self.annotations.insert(id, annotation);
        if is_token {
            self.invalidate_token_caches(span);
        }
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// View of the annotation with `id`, or the orphan view if there is none.
    #[must_use]
    pub fn annotation(&self, id: AnnotationId) -> AnnotationRef<'_> {
        match self.annotations.get(&id) {
            Some(annotation) => AnnotationRef::new(self, annotation),
            None => AnnotationRef::orphan(),
        }
    }

    /// The annotation with `id`, if attached here.
    #[must_use]
    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.get(&id)
    }

    /// True if an annotation with `id` is attached here.
    #[must_use]
    pub fn contains(&self, id: AnnotationId) -> bool {
        self.annotations.contains_key(&id)
    }

    /// Number of attached annotations.
    #[must_use]
    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    /// Every attached annotation, in span order.
    #[must_use]
    pub fn all_annotations(&self) -> Vec<AnnotationRef<'_>> {
        self.views(self.index.query_contained_in(self.full_span()), builtin::ROOT)
            .collect()
    }

    /// Annotations of `annotation_type` (or a subtype) overlapping `span`, in span order.
    #[must_use]
    pub fn annotations(&self, annotation_type: AnnotationType, span: Span) -> Vec<AnnotationRef<'_>> {
        self.views(self.index.query_overlap(span), annotation_type)
            .collect()
    }

    /// [`annotations`](Self::annotations) narrowed by `filter`.
    pub fn annotations_where(
        &self,
        annotation_type: AnnotationType,
        span: Span,
        filter: impl Fn(&AnnotationRef<'_>) -> bool,
    ) -> Vec<AnnotationRef<'_>> {
        self.views(self.index.query_overlap(span), annotation_type)
            .filter(|a| filter(a))
            .collect()
    }

    /// Annotations of `annotation_type` lying entirely within `span`.
    #[must_use]
    pub fn enclosed(&self, annotation_type: AnnotationType, span: Span) -> Vec<AnnotationRef<'_>> {
        self.views(self.index.query_contained_in(span), annotation_type)
            .collect()
    }

    /// Annotations of `annotation_type` that fully contain `span`.
    #[must_use]
    pub fn containing(&self, annotation_type: AnnotationType, span: Span) -> Vec<AnnotationRef<'_>> {
        self.views(self.index.query_containing(span), annotation_type)
            .collect()
    }

    fn views(
        &self,
        ids: Vec<AnnotationId>,
        annotation_type: AnnotationType,
    ) -> impl Iterator<Item = AnnotationRef<'_>> + '_ {
        ids.into_iter()
            .filter_map(move |id| self.annotations.get(&id))
            .filter(move |a| {
                annotation_type == builtin::ROOT
                    || self.registry.is_instance(a.annotation_type(), annotation_type)
            })
            .map(move |a| AnnotationRef::new(self, a))
    }

    pub(crate) fn is_token_type(&self, annotation_type: AnnotationType) -> bool {
        self.registry.is_instance(annotation_type, self.layers.token)
    }

    /// Cached ids of the tokens `annotation` overlaps.
    pub(crate) fn tokens_of<'a>(&'a self, annotation: &'a Annotation) -> &'a [AnnotationId] {
        annotation.token_cache().get_or_init(|| {
            log::trace!("filling token cache of annotation {}", annotation.id());
            if self.contains(annotation.id()) {
                self.cached_tokens.lock().insert(annotation.id());
            }
            self.token_ids(annotation.span())
        })
    }

    fn token_ids(&self, span: Span) -> Vec<AnnotationId> {
        self.index
            .query_overlap(span)
            .into_iter()
            .filter(|id| {
                self.annotations
                    .get(id)
                    .is_some_and(|a| self.is_token_type(a.annotation_type()))
            })
            .collect()
    }

    fn invalidate_token_caches(&mut self, span: Span) {
        let annotations = &mut self.annotations;
        self.cached_tokens
            .get_mut()
            .retain(|id| match annotations.get_mut(id) {
                Some(annotation) if annotation.span().overlaps(&span) => {
                    annotation.clear_token_cache();
                    false
                }
                Some(_) => true,
                None => false,
            });
    }

    // -------------------------------------------------------------------------
    // Removal
    // -------------------------------------------------------------------------

    /// Remove and destroy an annotation.
    ///
    /// Relations pointing at it are left in place and resolve to the orphan
    /// annotation from now on.
    pub fn remove(&mut self, id: AnnotationId) -> bool {
        let Some(annotation) = self.annotations.remove(&id) else {
            return false;
        };
        self.index.remove(id);
        if self.is_token_type(annotation.annotation_type()) {
            self.invalidate_token_caches(annotation.span());
        }
        log::debug!("removed annotation {id} from document {}", self.id);
        true
    }

    // -------------------------------------------------------------------------
    // Relations and attributes of attached annotations
    // -------------------------------------------------------------------------

    /// Add a relation starting at `source`, mirroring it onto the target.
    ///
    /// Returns `Ok(false)` if `source` already holds this relation.
    pub fn add_relation(&mut self, source: AnnotationId, relation: Relation) -> Result<bool> {
        let annotation = self.annotation_mut(source)?;
        if !annotation.add_relation(relation.clone()) {
            return Ok(false);
        }
        self.mirror(source, &relation);
        Ok(true)
    }

    fn mirror(&mut self, source: AnnotationId, relation: &Relation) {
        match self.annotations.get_mut(&relation.target()) {
            Some(target) => {
                target.add_incoming(relation.mirrored(source));
            }
            None => log::warn!(
                "relation {:?} from annotation {source} points at unknown annotation {}",
                relation.value(),
                relation.target()
            ),
        }
    }

    /// Remove a relation from `source` and its mirror from the target.
    pub fn remove_relation(&mut self, source: AnnotationId, relation: &Relation) -> bool {
        let removed = self
            .annotations
            .get_mut(&source)
            .is_some_and(|a| a.remove_relation(relation));
        if removed {
            if let Some(target) = self.annotations.get_mut(&relation.target()) {
                target.remove_incoming(&relation.mirrored(source));
            }
        }
        removed
    }

    /// Replace the label of a relation held by `source`, and of its mirror.
    ///
    /// Returns `Ok(false)` if `source` does not hold `relation`. If `source`
    /// already holds the relabelled relation the two merge into one.
    pub fn set_relation_value(
        &mut self,
        source: AnnotationId,
        relation: &Relation,
        value: impl Into<String>,
    ) -> Result<bool> {
        let relabelled = relation.with_value(value);
        if !self.annotation_mut(source)?.set_relation_value(relation, relabelled.value()) {
            return Ok(false);
        }
        if let Some(target) = self.annotations.get_mut(&relation.target()) {
            target.replace_incoming(&relation.mirrored(source), relabelled.mirrored(source));
        }
        Ok(true)
    }

    /// Write an attribute on an attached annotation.
    pub fn put_attribute<T: AttributeKind>(
        &mut self,
        id: AnnotationId,
        attr: AttributeType<T>,
        value: impl Into<AttributeValue>,
    ) -> Result<Option<AttributeValue>> {
        self.annotation_mut(id)?.attributes_mut().put(attr, value)
    }

    /// Write an attribute through an erased key.
    pub fn put_attribute_value(
        &mut self,
        id: AnnotationId,
        key: AttributeKey,
        value: impl Into<AttributeValue>,
    ) -> Result<Option<AttributeValue>> {
        let annotation = self
            .annotations
            .get_mut(&id)
            .ok_or_else(|| missing_annotation(id))?;
        annotation
            .attributes_mut()
            .put_value(&self.registry, key, value)
    }

    /// Remove an attribute from an attached annotation.
    pub fn remove_attribute(
        &mut self,
        id: AnnotationId,
        key: impl Into<AttributeKey>,
    ) -> Option<AttributeValue> {
        self.annotations
            .get_mut(&id)
            .and_then(|a| a.attributes_mut().remove(key))
    }

    fn annotation_mut(&mut self, id: AnnotationId) -> Result<&mut Annotation> {
        self.annotations
            .get_mut(&id)
            .ok_or_else(|| missing_annotation(id))
    }

    // -------------------------------------------------------------------------
    // Completed ledger
    // -------------------------------------------------------------------------

    /// Record that `provider` has computed `annotatable` for this document.
    pub fn set_completed(&mut self, annotatable: impl Into<AnnotatableType>, provider: impl Into<String>) {
        self.completed.insert(annotatable.into(), provider.into());
    }

    /// Forget a completion record, returning its provider.
    pub fn set_uncompleted(&mut self, annotatable: impl Into<AnnotatableType>) -> Option<String> {
        self.completed.remove(&annotatable.into())
    }

    /// True if `annotatable` has been recorded as computed.
    #[must_use]
    pub fn is_completed(&self, annotatable: impl Into<AnnotatableType>) -> bool {
        self.completed.contains_key(&annotatable.into())
    }

    /// Provider recorded for `annotatable`.
    #[must_use]
    pub fn completed_by(&self, annotatable: impl Into<AnnotatableType>) -> Option<&str> {
        self.completed.get(&annotatable.into()).map(String::as_str)
    }

    /// Every completion record.
    pub fn completed(&self) -> impl Iterator<Item = (AnnotatableType, &str)> {
        self.completed.iter().map(|(t, p)| (*t, p.as_str()))
    }

    // -------------------------------------------------------------------------
    // JSON interchange
    // -------------------------------------------------------------------------

    /// Serialize the document with all of its annotations.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_record())?)
    }

    /// Load a document written by [`to_json`](Self::to_json).
    ///
    /// Annotation ids are preserved and incoming relations re-mirrored.
    /// Annotation and relation types not yet in `registry` are registered.
    pub fn from_json(registry: Arc<TypeRegistry>, json: &str) -> Result<Self> {
        Self::from_json_with_config(registry, &Config::default(), json)
    }

    /// [`from_json`](Self::from_json) with explicit layers.
    pub fn from_json_with_config(
        registry: Arc<TypeRegistry>,
        config: &Config,
        json: &str,
    ) -> Result<Self> {
        let record: DocumentRecord = serde_json::from_str(json)?;
        Self::from_record(registry, config, record)
    }

    fn to_record(&self) -> DocumentRecord {
        let registry = &self.registry;
        let annotations = self
            .all_annotations()
            .into_iter()
            .map(|a| AnnotationRecord {
                id: a.id(),
                annotation_type: registry.label(a.annotation_type()),
                start: a.start(),
                end: a.end(),
                attributes: a.attributes().to_wire(registry),
                relations: a
                    .outgoing_relations()
                    .iter()
                    .map(|r| RelationRecord {
                        relation_type: registry.label(r.relation_type()),
                        value: r.value().to_string(),
                        target: r.target(),
                    })
                    .collect(),
            })
            .collect();
        DocumentRecord {
            id: self.id.clone(),
            text: self.text.clone(),
            attributes: self.attributes.to_wire(registry),
            completed: self
                .completed
                .iter()
                .map(|(t, p)| (registry.canonical_name(*t), p.clone()))
                .collect(),
            annotations,
        }
    }

    fn from_record(registry: Arc<TypeRegistry>, config: &Config, record: DocumentRecord) -> Result<Self> {
        let mut doc = Self::with_config(registry, config, record.id, record.text)?;
        doc.attributes = AttributeMap::from_wire(&doc.registry, &record.attributes)?;
        for (name, provider) in record.completed {
            let annotatable = doc.resolve_or_register(&name)?;
            doc.completed.insert(annotatable, provider);
        }

        for r in &record.annotations {
            if r.id.get() < 0 {
                return Err(Error::invalid_input(format!("invalid annotation id {}", r.id)));
            }
            if doc.contains(r.id) {
                return Err(Error::invalid_input(format!("duplicate annotation id {}", r.id)));
            }
            let annotation_type = doc.registry.make_annotation_type(&r.annotation_type)?;
            let span = Span::new(r.start, r.end)?;
            doc.check_bounds(span)?;
            let mut annotation = Annotation::new(annotation_type, span);
            *annotation.attributes_mut() = AttributeMap::from_wire(&doc.registry, &r.attributes)?;
            let after = r.id.get().checked_add(1).ok_or_else(|| {
                Error::invalid_input(format!("annotation id {} leaves no room for new ids", r.id))
            })?;
            doc.next_id = doc.next_id.max(after);
            doc.insert(r.id, annotation);
        }

        for r in record.annotations {
            for rel in r.relations {
                let relation_type = doc.registry.make_relation_type(&rel.relation_type)?;
                doc.add_relation(r.id, Relation::new(relation_type, rel.value, rel.target))?;
            }
        }
        log::debug!(
            "loaded document {} with {} annotations",
            doc.id,
            doc.annotations.len()
        );
        Ok(doc)
    }

    fn resolve_or_register(&self, name: &str) -> Result<AnnotatableType> {
        match self.registry.value_of(name) {
            Ok(t) => Ok(t),
            Err(e) => {
                let Some((category, bare)) = name.rsplit_once('.') else {
                    return Err(e);
                };
                let category = category
                    .rsplit('.')
                    .next()
                    .and_then(|c| c.parse::<Category>().ok());
                match category {
                    Some(Category::Annotation) => {
                        Ok(self.registry.make_annotation_type(bare)?.into())
                    }
                    Some(Category::Relation) => Ok(self.registry.make_relation_type(bare)?.into()),
                    _ => Err(e),
                }
            }
        }
    }
}

fn missing_annotation(id: AnnotationId) -> Error {
    Error::invalid_input(format!("no annotation with id {id}"))
}

#[derive(Debug, Serialize, Deserialize)]
struct DocumentRecord {
    id: String,
    text: String,
    #[serde(default, skip_serializing_if = "WireMap::is_empty")]
    attributes: WireMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    completed: BTreeMap<String, String>,
    #[serde(default)]
    annotations: Vec<AnnotationRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnnotationRecord {
    id: AnnotationId,
    #[serde(rename = "type")]
    annotation_type: String,
    start: usize,
    end: usize,
    #[serde(default, skip_serializing_if = "WireMap::is_empty")]
    attributes: WireMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    relations: Vec<RelationRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RelationRecord {
    #[serde(rename = "type")]
    relation_type: String,
    #[serde(default)]
    value: String,
    target: AnnotationId,
}
