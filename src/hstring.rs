//! Text fragments and the span algebra over them.
//!
//! An [`HString`] is a character span borrowed from a [`Document`]: the whole
//! text, an annotation, or anything derived from them by union, slicing,
//! trimming or context windows. [`AnnotationRef`] is the borrowed view of one
//! attached annotation. Both implement [`AsHString`], so every operation that
//! combines fragments accepts either.
//!
//! Lookups that find nothing return the orphan fragment (empty, no document)
//! rather than an error. Errors are reserved for invalid input: combining
//! fragments of different documents, or slicing out of bounds.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tessera::{builtin, AttributeMap, Document, TypeRegistry};
//!
//! let mut doc = Document::new(Arc::new(TypeRegistry::new()), "d", "the quick fox");
//! doc.create_annotation(builtin::SENTENCE, 0, 13, AttributeMap::new()).unwrap();
//! for (start, end) in [(0, 3), (4, 9), (10, 13)] {
//!     doc.create_annotation(builtin::TOKEN, start, end, AttributeMap::new()).unwrap();
//! }
//!
//! let fox = doc.hstring().last(builtin::TOKEN);
//! let left = fox.hstring().left_context(builtin::TOKEN, 5);
//! assert_eq!(left.text(), "the quick");
//! ```

use crate::annotation::Annotation;
use crate::document::Document;
use crate::relation::Relation;
use regex::Regex;
use std::fmt;
use std::ops::{Deref, Range};
use std::ptr;
use tessera_core::{builtin, AnnotationType, Error, RelationType, Result, Span, StringTag};

/// Anything that can be viewed as a text fragment of a document.
pub trait AsHString<'d> {
    /// The fragment view.
    fn as_hstring(&self) -> HString<'d>;
}

// =============================================================================
// HString
// =============================================================================

/// A character span of a document's text.
#[derive(Clone, Copy)]
pub struct HString<'d> {
    document: Option<&'d Document>,
    span: Span,
}

impl<'d> HString<'d> {
    pub(crate) fn new(document: &'d Document, span: Span) -> Self {
        Self {
            document: Some(document),
            span,
        }
    }

    /// The empty fragment belonging to no document.
    #[must_use]
    pub const fn orphan() -> Self {
        Self {
            document: None,
            span: Span::empty_at(0),
        }
    }

    /// Document the fragment belongs to.
    #[must_use]
    pub fn document(&self) -> Option<&'d Document> {
        self.document
    }

    /// True for fragments without a document.
    #[must_use]
    pub fn is_orphan(&self) -> bool {
        self.document.is_none()
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

    /// Length in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.span.len()
    }

    /// True if the fragment covers no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    /// Covered text; `""` for orphans.
    #[must_use]
    pub fn text(&self) -> &'d str {
        match self.document {
            Some(doc) => doc.text_of(self.span),
            None => "",
        }
    }

    // -------------------------------------------------------------------------
    // Combinators
    // -------------------------------------------------------------------------

    /// Slice `[rel_start, rel_end)` relative to this fragment.
    pub fn substring(&self, rel_start: usize, rel_end: usize) -> Result<HString<'d>> {
        Ok(Self {
            document: self.document,
            span: self.span.relative(rel_start, rel_end)?,
        })
    }

    /// Smallest fragment covering this one and `others`.
    ///
    /// See [`HString::union_all`].
    pub fn union<I>(&self, others: I) -> Result<HString<'d>>
    where
        I: IntoIterator,
        I::Item: AsHString<'d>,
    {
        let rest = others.into_iter().map(|o| o.as_hstring());
        HString::union_all(std::iter::once(*self).chain(rest))
    }

    /// Smallest fragment covering every non-empty operand.
    ///
    /// Empty operands are skipped; if all are empty the result is the orphan.
    /// Operands from different documents are a [`Error::CrossDocumentOperation`].
    pub fn union_all<I>(items: I) -> Result<HString<'d>>
    where
        I: IntoIterator,
        I::Item: AsHString<'d>,
    {
        let mut document: Option<&'d Document> = None;
        let mut span: Option<Span> = None;
        for item in items {
            let h = item.as_hstring();
            if h.is_empty() {
                continue;
            }
            let Some(doc) = h.document else {
                return Err(Error::cross_document("fragment has no document"));
            };
            match document {
                Some(seen) if !ptr::eq(seen, doc) => {
                    return Err(Error::cross_document(format!(
                        "cannot union fragments of documents {} and {}",
                        seen.id(),
                        doc.id()
                    )));
                }
                _ => document = Some(doc),
            }
            span = Some(span.map_or(h.span, |s| s.union(&h.span)));
        }
        Ok(match (document, span) {
            (Some(doc), Some(span)) => HString::new(doc, span),
            _ => HString::orphan(),
        })
    }

    fn common_document(&self, other: &HString<'d>) -> Result<&'d Document> {
        match (self.document, other.document) {
            (Some(a), Some(b)) if ptr::eq(a, b) => Ok(a),
            (Some(a), Some(b)) => Err(Error::cross_document(format!(
                "fragments belong to documents {} and {}",
                a.id(),
                b.id()
            ))),
            _ => Err(Error::cross_document("fragment has no document")),
        }
    }

    /// True if the fragments share a character.
    pub fn overlaps(&self, other: &impl AsHString<'d>) -> Result<bool> {
        let other = other.as_hstring();
        self.common_document(&other)?;
        Ok(self.span.overlaps(&other.span))
    }

    /// True if `other` lies within this fragment.
    pub fn encloses(&self, other: &impl AsHString<'d>) -> Result<bool> {
        let other = other.as_hstring();
        self.common_document(&other)?;
        Ok(self.span.encloses(&other.span))
    }

    /// Shared part of both fragments; the orphan if they do not overlap.
    pub fn intersection(&self, other: &impl AsHString<'d>) -> Result<HString<'d>> {
        let other = other.as_hstring();
        let doc = self.common_document(&other)?;
        Ok(match self.span.intersection(&other.span) {
            Some(span) => HString::new(doc, span),
            None => HString::orphan(),
        })
    }

    // -------------------------------------------------------------------------
    // Annotation queries
    // -------------------------------------------------------------------------

    /// Annotations of `annotation_type` overlapping this fragment.
    #[must_use]
    pub fn annotations(&self, annotation_type: AnnotationType) -> Vec<AnnotationRef<'d>> {
        match self.document {
            Some(doc) => doc.annotations(annotation_type, self.span),
            None => Vec::new(),
        }
    }

    /// [`annotations`](Self::annotations) narrowed by `filter`.
    pub fn annotations_where(
        &self,
        annotation_type: AnnotationType,
        filter: impl Fn(&AnnotationRef<'_>) -> bool,
    ) -> Vec<AnnotationRef<'d>> {
        match self.document {
            Some(doc) => doc.annotations_where(annotation_type, self.span, filter),
            None => Vec::new(),
        }
    }

    /// First overlapping annotation of the type, or the orphan.
    #[must_use]
    pub fn first(&self, annotation_type: AnnotationType) -> AnnotationRef<'d> {
        self.annotations(annotation_type)
            .into_iter()
            .next()
            .unwrap_or_else(AnnotationRef::orphan)
    }

    /// Last overlapping annotation of the type, or the orphan.
    #[must_use]
    pub fn last(&self, annotation_type: AnnotationType) -> AnnotationRef<'d> {
        self.annotations(annotation_type)
            .pop()
            .unwrap_or_else(AnnotationRef::orphan)
    }

    /// Overlapping tokens.
    #[must_use]
    pub fn tokens(&self) -> Vec<AnnotationRef<'d>> {
        match self.document {
            Some(doc) => doc.annotations(doc.token_type(), self.span),
            None => Vec::new(),
        }
    }

    /// Overlapping sentences.
    #[must_use]
    pub fn sentences(&self) -> Vec<AnnotationRef<'d>> {
        match self.document {
            Some(doc) => doc.annotations(doc.sentence_type(), self.span),
            None => Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Context windows
    // -------------------------------------------------------------------------

    /// Up to `n` annotations of `annotation_type` immediately before this
    /// fragment, unioned, without leaving the enclosing sentence.
    ///
    /// Without a sentence around the fragment start, the document start is
    /// the boundary. Returns an empty fragment at the start if nothing fits.
    #[must_use]
    pub fn left_context(&self, annotation_type: AnnotationType, n: usize) -> HString<'d> {
        let Some(doc) = self.document else {
            return *self;
        };
        let anchor = if self.is_empty() {
            self.start().checked_sub(1)
        } else {
            Some(self.start())
        };
        let bound = anchor
            .and_then(|pos| {
                doc.containing(doc.sentence_type(), Span::covering(pos, pos + 1))
                    .iter()
                    .map(|s| s.start())
                    .max()
            })
            .unwrap_or(0);

        let candidates: Vec<_> = doc
            .enclosed(annotation_type, Span::covering(bound, self.start()))
            .into_iter()
            .filter(|a| !a.span().is_empty())
            .collect();
        let window = &candidates[candidates.len().saturating_sub(n)..];
        match HString::union_all(window) {
            Ok(h) if !h.is_orphan() => h,
            _ => HString::new(doc, Span::empty_at(self.start())),
        }
    }

    /// Up to `n` annotations of `annotation_type` immediately after this
    /// fragment, unioned, without leaving the enclosing sentence.
    #[must_use]
    pub fn right_context(&self, annotation_type: AnnotationType, n: usize) -> HString<'d> {
        let Some(doc) = self.document else {
            return *self;
        };
        let anchor = if self.is_empty() {
            self.end()
        } else {
            self.end() - 1
        };
        let bound = doc
            .containing(doc.sentence_type(), Span::covering(anchor, anchor + 1))
            .iter()
            .map(|s| s.end())
            .min()
            .unwrap_or_else(|| doc.char_len());

        let window: Vec<_> = doc
            .enclosed(annotation_type, Span::covering(self.end(), bound.max(self.end())))
            .into_iter()
            .filter(|a| !a.span().is_empty())
            .take(n)
            .collect();
        match HString::union_all(&window) {
            Ok(h) if !h.is_orphan() => h,
            _ => HString::new(doc, Span::empty_at(self.end())),
        }
    }

    // -------------------------------------------------------------------------
    // Token-level operations
    // -------------------------------------------------------------------------

    /// Left-to-right, non-overlapping cover of this fragment's tokens by
    /// annotations of `types`.
    ///
    /// At each token not yet covered, the candidate overlapping it that spans
    /// the most tokens wins, ties going to the type listed first. Candidates
    /// starting inside an earlier pick are skipped. Tokens no candidate
    /// covers are emitted on their own.
    #[must_use]
    pub fn interleaved(&self, types: &[AnnotationType]) -> Vec<AnnotationRef<'d>> {
        let Some(doc) = self.document else {
            return Vec::new();
        };
        let mut cover = Vec::new();
        let mut cursor = self.start();
        for token in self.tokens() {
            if token.start() < cursor {
                continue;
            }
            let mut best: Option<(usize, AnnotationRef<'d>)> = None;
            for &annotation_type in types {
                for candidate in doc.annotations(annotation_type, token.span()) {
                    if candidate.start() < cursor {
                        continue;
                    }
                    let reach = doc.tokens_of(candidate.annotation).len();
                    if best.as_ref().map_or(true, |(r, _)| reach > *r) {
                        best = Some((reach, candidate));
                    }
                }
            }
            let pick = best.map_or(token, |(_, candidate)| candidate);
            cursor = pick.end().max(token.end());
            cover.push(pick);
        }
        cover
    }

    /// Drop leading tokens matching `pred`.
    ///
    /// If every token matches the result is empty. A fragment without tokens
    /// is returned unchanged.
    #[must_use]
    pub fn trim_left(&self, pred: impl Fn(&AnnotationRef<'d>) -> bool) -> HString<'d> {
        let Some(doc) = self.document else {
            return *self;
        };
        let tokens = self.tokens();
        if tokens.is_empty() {
            return *self;
        }
        match tokens.iter().find(|t| !pred(*t)) {
            Some(first) => HString::new(doc, Span::covering(first.start().max(self.start()), self.end())),
            None => HString::new(doc, Span::empty_at(self.start())),
        }
    }

    /// Drop trailing tokens matching `pred`.
    #[must_use]
    pub fn trim_right(&self, pred: impl Fn(&AnnotationRef<'d>) -> bool) -> HString<'d> {
        let Some(doc) = self.document else {
            return *self;
        };
        let tokens = self.tokens();
        if tokens.is_empty() {
            return *self;
        }
        match tokens.iter().rev().find(|t| !pred(*t)) {
            Some(last) => HString::new(doc, Span::covering(self.start(), last.end().min(self.end()))),
            None => HString::new(doc, Span::empty_at(self.start())),
        }
    }

    /// Drop leading and trailing tokens matching `pred`.
    #[must_use]
    pub fn trim(&self, pred: impl Fn(&AnnotationRef<'d>) -> bool) -> HString<'d> {
        self.trim_left(&pred).trim_right(&pred)
    }

    /// Maximal runs of tokens between delimiter tokens, each as one fragment.
    #[must_use]
    pub fn split(&self, is_delimiter: impl Fn(&AnnotationRef<'d>) -> bool) -> Vec<HString<'d>> {
        let Some(doc) = self.document else {
            return Vec::new();
        };
        let mut parts = Vec::new();
        let mut run: Option<Span> = None;
        for token in self.tokens() {
            if is_delimiter(&token) {
                if let Some(span) = run.take() {
                    parts.push(HString::new(doc, span));
                }
            } else {
                run = Some(run.map_or(token.span(), |s| s.union(&token.span())));
            }
        }
        if let Some(span) = run {
            parts.push(HString::new(doc, span));
        }
        parts
    }

    /// Every window of `n` consecutive tokens.
    #[must_use]
    pub fn token_ngrams(&self, n: usize) -> Vec<HString<'d>> {
        let Some(doc) = self.document else {
            return Vec::new();
        };
        if n == 0 {
            return Vec::new();
        }
        self.tokens()
            .windows(n)
            .map(|w| HString::new(doc, w[0].span().union(&w[n - 1].span())))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    /// First occurrence of `needle`, or the orphan.
    ///
    /// When tokenization is complete on the document the match is widened
    /// to whole tokens.
    #[must_use]
    pub fn find(&self, needle: &str) -> HString<'d> {
        self.search(needle)
            .next()
            .unwrap_or_else(HString::orphan)
    }

    /// Every non-overlapping occurrence of `needle`.
    #[must_use]
    pub fn find_all(&self, needle: &str) -> Vec<HString<'d>> {
        self.search(needle).collect()
    }

    /// First non-empty match of `pattern`, or the orphan.
    #[must_use]
    pub fn find_pattern(&self, pattern: &Regex) -> HString<'d> {
        self.search_pattern(pattern)
            .next()
            .unwrap_or_else(HString::orphan)
    }

    /// Every non-empty match of `pattern`.
    #[must_use]
    pub fn find_all_pattern(&self, pattern: &Regex) -> Vec<HString<'d>> {
        self.search_pattern(pattern).collect()
    }

    fn search<'a>(&'a self, needle: &'a str) -> impl Iterator<Item = HString<'d>> + 'a {
        let text = self.text();
        let ranges = text
            .match_indices(needle)
            .filter(|_| !needle.is_empty())
            .map(|(at, m)| at..at + m.len());
        ranges.filter_map(move |bytes| self.located(bytes))
    }

    fn search_pattern<'a>(&'a self, pattern: &'a Regex) -> impl Iterator<Item = HString<'d>> + 'a {
        pattern
            .find_iter(self.text())
            .filter(|m| !m.as_str().is_empty())
            .filter_map(move |m| self.located(m.range()))
    }

    /// Turn a byte range within this fragment's text into a fragment.
    fn located(&self, bytes: Range<usize>) -> Option<HString<'d>> {
        let doc = self.document?;
        let offsets = doc.offsets();
        let base = offsets.char_to_byte(self.start());
        let mut span = Span::covering(
            offsets.byte_to_char(base + bytes.start),
            offsets.byte_to_char(base + bytes.end),
        );
        if doc.is_completed(doc.token_type()) {
            for token in doc.annotations(doc.token_type(), span) {
                span = span.union(&token.span());
            }
        }
        Some(HString::new(doc, span))
    }
}

impl PartialEq for HString<'_> {
    fn eq(&self, other: &Self) -> bool {
        let same_document = match (self.document, other.document) {
            (Some(a), Some(b)) => ptr::eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_document && self.span == other.span
    }
}

impl Eq for HString<'_> {}

impl fmt::Debug for HString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HString")
            .field("document", &self.document.map(Document::id))
            .field("span", &self.span)
            .field("text", &self.text())
            .finish()
    }
}

impl fmt::Display for HString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

// =============================================================================
// AnnotationRef
// =============================================================================

/// Borrowed view of an annotation together with the document owning it.
///
/// Derefs to [`Annotation`]. Lookup misses produce the orphan view: an empty
/// `ROOT` annotation with no document.
#[derive(Clone, Copy)]
pub struct AnnotationRef<'d> {
    document: Option<&'d Document>,
    annotation: &'d Annotation,
}

impl<'d> AnnotationRef<'d> {
    pub(crate) fn new(document: &'d Document, annotation: &'d Annotation) -> Self {
        Self {
            document: Some(document),
            annotation,
        }
    }

    /// The empty view returned for lookup misses.
    #[must_use]
    pub fn orphan() -> Self {
        Self {
            document: None,
            annotation: Annotation::orphan(),
        }
    }

    /// True for the orphan view.
    #[must_use]
    pub fn is_orphan(&self) -> bool {
        self.document.is_none()
    }

    /// Owning document.
    #[must_use]
    pub fn document(&self) -> Option<&'d Document> {
        self.document
    }

    /// The underlying annotation, with the document's lifetime.
    #[must_use]
    pub fn annotation(&self) -> &'d Annotation {
        self.annotation
    }

    /// The annotation's fragment.
    #[must_use]
    pub fn hstring(&self) -> HString<'d> {
        HString {
            document: self.document,
            span: self.annotation.span(),
        }
    }

    /// Covered text.
    #[must_use]
    pub fn text(&self) -> &'d str {
        self.hstring().text()
    }

    /// Tokens this annotation overlaps, cached after the first call.
    #[must_use]
    pub fn tokens(&self) -> Vec<AnnotationRef<'d>> {
        let Some(doc) = self.document else {
            return Vec::new();
        };
        doc.tokens_of(self.annotation)
            .iter()
            .map(|&id| doc.annotation(id))
            .filter(|t| !t.is_orphan())
            .collect()
    }

    /// Value of the type's tag attribute, if the type has one.
    #[must_use]
    pub fn tag(&self) -> Option<StringTag> {
        let doc = self.document?;
        let attr = doc.registry().tag_attribute(self.annotation.annotation_type())?;
        self.annotation.attribute(attr)
    }

    /// Annotations reached through outgoing relations of `relation_type` (or a subtype).
    #[must_use]
    pub fn targets(&self, relation_type: RelationType) -> Vec<AnnotationRef<'d>> {
        self.follow(self.annotation.outgoing_relations(), relation_type)
    }

    /// Annotations with relations of `relation_type` (or a subtype) ending here.
    #[must_use]
    pub fn sources(&self, relation_type: RelationType) -> Vec<AnnotationRef<'d>> {
        self.follow(self.annotation.incoming_relations(), relation_type)
    }

    fn follow(&self, relations: &'d [Relation], relation_type: RelationType) -> Vec<AnnotationRef<'d>> {
        let Some(doc) = self.document else {
            return Vec::new();
        };
        relations
            .iter()
            .filter(|r| {
                doc.registry()
                    .is_relation_instance(r.relation_type(), relation_type)
            })
            .map(|r| doc.annotation(r.target()))
            .filter(|a| !a.is_orphan())
            .collect()
    }

    /// Outgoing relations, optionally including those of sub-annotations.
    ///
    /// With `include_sub` and a non-token annotation, relations leaving any
    /// other annotation overlapping this one are added, except those whose
    /// target also overlaps this annotation. The result has no duplicates.
    #[must_use]
    pub fn outgoing_relation_stream(&self, include_sub: bool) -> Vec<&'d Relation> {
        self.relation_stream(include_sub, Annotation::outgoing_relations)
    }

    /// Incoming relations, optionally including those of sub-annotations.
    ///
    /// Mirror image of [`outgoing_relation_stream`](Self::outgoing_relation_stream).
    #[must_use]
    pub fn incoming_relation_stream(&self, include_sub: bool) -> Vec<&'d Relation> {
        self.relation_stream(include_sub, Annotation::incoming_relations)
    }

    fn relation_stream(
        &self,
        include_sub: bool,
        pick: fn(&Annotation) -> &[Relation],
    ) -> Vec<&'d Relation> {
        let mut stream: Vec<&'d Relation> = pick(self.annotation).iter().collect();
        let Some(doc) = self.document else {
            return stream;
        };
        if !include_sub || doc.is_token_type(self.annotation.annotation_type()) {
            return stream;
        }
        let span = self.annotation.span();
        for other in doc.annotations(builtin::ROOT, span) {
            if ptr::eq(other.annotation, self.annotation) {
                continue;
            }
            for relation in pick(other.annotation) {
                let far = doc.annotation(relation.target());
                if far.span().overlaps(&span) {
                    continue;
                }
                if !stream.contains(&relation) {
                    stream.push(relation);
                }
            }
        }
        stream
    }
}

impl<'d> Deref for AnnotationRef<'d> {
    type Target = Annotation;

    fn deref(&self) -> &Annotation {
        self.annotation
    }
}

impl PartialEq for AnnotationRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.annotation, other.annotation)
    }
}

impl Eq for AnnotationRef<'_> {}

impl fmt::Debug for AnnotationRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationRef")
            .field("id", &self.annotation.id())
            .field("type", &self.annotation.annotation_type())
            .field("span", &self.annotation.span())
            .field("text", &self.text())
            .finish()
    }
}

impl fmt::Display for AnnotationRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

// =============================================================================
// AsHString
// =============================================================================

impl<'d> AsHString<'d> for HString<'d> {
    fn as_hstring(&self) -> HString<'d> {
        *self
    }
}

impl<'d> AsHString<'d> for &HString<'d> {
    fn as_hstring(&self) -> HString<'d> {
        **self
    }
}

impl<'d> AsHString<'d> for AnnotationRef<'d> {
    fn as_hstring(&self) -> HString<'d> {
        self.hstring()
    }
}

impl<'d> AsHString<'d> for &AnnotationRef<'d> {
    fn as_hstring(&self) -> HString<'d> {
        self.hstring()
    }
}

impl<'d> AsHString<'d> for &'d Document {
    fn as_hstring(&self) -> HString<'d> {
        (*self).hstring()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tessera_core::{AttributeMap, TypeRegistry};

    fn doc_with_tokens(text: &str, spans: &[(usize, usize)]) -> Document {
        let mut doc = Document::new(Arc::new(TypeRegistry::new()), "t", text);
        for &(s, e) in spans {
            doc.create_annotation(builtin::TOKEN, s, e, AttributeMap::new())
                .unwrap();
        }
        doc
    }

    #[test]
    fn test_substring_is_relative() {
        let doc = doc_with_tokens("the quick fox", &[]);
        let quick = doc.hstring().substring(4, 9).unwrap();
        assert_eq!(quick.text(), "quick");
        assert_eq!(quick.substring(1, 3).unwrap().text(), "ui");
        assert!(matches!(quick.substring(2, 9), Err(Error::OutOfBounds(_))));
    }

    #[test]
    fn test_union_skips_empty_and_rejects_mixed_documents() {
        let a = doc_with_tokens("alpha beta", &[]);
        let b = doc_with_tokens("gamma", &[]);
        let alpha = a.hstring().substring(0, 5).unwrap();
        let beta = a.hstring().substring(6, 10).unwrap();

        assert_eq!(alpha.union([beta]).unwrap().text(), "alpha beta");
        assert_eq!(
            alpha.union([HString::orphan()]).unwrap(),
            alpha
        );
        assert!(HString::union_all([HString::orphan(), HString::orphan()])
            .unwrap()
            .is_orphan());
        assert!(matches!(
            alpha.union([b.hstring()]),
            Err(Error::CrossDocumentOperation(_))
        ));
    }

    #[test]
    fn test_overlap_checks_require_one_document() {
        let a = doc_with_tokens("alpha beta", &[]);
        let b = doc_with_tokens("alpha beta", &[]);
        let left = a.hstring().substring(0, 6).unwrap();
        let right = a.hstring().substring(4, 10).unwrap();

        assert!(left.overlaps(&right).unwrap());
        assert!(a.hstring().encloses(&right).unwrap());
        assert_eq!(left.intersection(&right).unwrap().text(), "a ");
        assert!(left.overlaps(&b.hstring()).is_err());
        assert!(left.encloses(&HString::orphan()).is_err());
    }

    #[test]
    fn test_first_last_and_orphan_fallback() {
        let doc = doc_with_tokens("a b c", &[(0, 1), (2, 3), (4, 5)]);
        let whole = doc.hstring();
        assert_eq!(whole.first(builtin::TOKEN).text(), "a");
        assert_eq!(whole.last(builtin::TOKEN).text(), "c");
        assert!(whole.first(builtin::ENTITY).is_orphan());
    }

    #[test]
    fn test_split_and_ngrams() {
        let doc = doc_with_tokens("a , b c , d", &[(0, 1), (2, 3), (4, 5), (6, 7), (8, 9), (10, 11)]);
        let parts: Vec<_> = doc
            .hstring()
            .split(|t| t.text() == ",")
            .iter()
            .map(|h| h.text())
            .collect();
        assert_eq!(parts, vec!["a", "b c", "d"]);

        let bigrams: Vec<_> = doc.hstring().token_ngrams(2).iter().map(|h| h.text()).collect();
        assert_eq!(bigrams.len(), 5);
        assert_eq!(bigrams[2], "b c");
        assert!(doc.hstring().token_ngrams(0).is_empty());
    }

    #[test]
    fn test_find_expands_to_tokens_when_complete() {
        let mut doc = doc_with_tokens("the quick fox", &[(0, 3), (4, 9), (10, 13)]);
        assert_eq!(doc.hstring().find("uic").text(), "uic");
        assert!(doc.hstring().find("wolf").is_orphan());

        doc.set_completed(builtin::TOKEN, "gold");
        assert_eq!(doc.hstring().find("uic").text(), "quick");
        assert_eq!(doc.hstring().find("k f").text(), "quick fox");
    }

    #[test]
    fn test_find_uses_character_offsets() {
        let doc = doc_with_tokens("café au lait, café noir", &[]);
        let hits = doc.hstring().find_all("café");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].start(), 14);
        assert_eq!(hits[1].text(), "café");

        let re = Regex::new(r"\b\w+\b").unwrap();
        let words: Vec<_> = doc
            .hstring()
            .substring(14, 23)
            .unwrap()
            .find_all_pattern(&re)
            .iter()
            .map(|h| h.text())
            .collect();
        assert_eq!(words, vec!["café", "noir"]);
    }

    #[test]
    fn test_tag_reads_the_type_tag_attribute() {
        let mut doc = doc_with_tokens("dogs", &[]);
        let id = doc
            .create_annotation(
                builtin::TOKEN,
                0,
                4,
                AttributeMap::new().with(builtin::PART_OF_SPEECH, "NNS").unwrap(),
            )
            .unwrap();
        assert_eq!(doc.annotation(id).tag(), Some(StringTag::new("NNS")));
        assert_eq!(AnnotationRef::orphan().tag(), None);
    }
}
