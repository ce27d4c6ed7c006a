//! The type registry: annotation, attribute and relation types.
//!
//! # Design
//!
//! Types are interned by normalized name, one namespace per [`Category`].
//! The registry is an arena of entries addressed by a small integer; parent
//! links are arena indices, and the handles callers hold
//! ([`AnnotationType`], [`AttributeType`], [`RelationType`]) are `Copy`
//! wrappers around that index.
//!
//! ```text
//! by_name: (Annotation, "TOKEN") ──► 7 ─┐
//!                                       ▼
//! entries: [0 ROOT] ... [7 TOKEN parent=0 tag=1] ...
//! ```
//!
//! The registry is an explicit value, usually shared as
//! `Arc<TypeRegistry>`. Every registry built by [`TypeRegistry::new`]
//! starts with the types in [`builtin`] at fixed indices.
//!
//! # Name normalization
//!
//! Lookups ignore case and separators: `part_of_speech`, `PartOfSpeech`
//! and `PART-OF-SPEECH` are one type. The label keeps the spelling of the
//! first registration, upper-cased.
//!
//! # Concurrency
//!
//! `make_*` calls take the write lock and re-check before inserting, so
//! concurrent first use of a name produces exactly one entry.

use crate::error::{Error, Result};
use crate::value::{self, AttributeKind, AttributeValue, StringTag, ValueType};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

static NAME_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("NAME_SEPARATORS regex is invalid"));
static LABEL_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\-]+").expect("LABEL_SEPARATORS regex is invalid"));

// =============================================================================
// Categories and Handles
// =============================================================================

/// Namespace a type lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Annotation types (TOKEN, SENTENCE, ...)
    Annotation,
    /// Attribute types (PART_OF_SPEECH, LEMMA, ...)
    Attribute,
    /// Relation types (DEPENDENCY, COREFERENCE, ...)
    Relation,
}

impl Category {
    /// Resolution order for bare names.
    pub const ALL: [Category; 3] = [Category::Annotation, Category::Attribute, Category::Relation];

    /// Category tag as used in canonical names.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Annotation => "Annotation",
            Category::Attribute => "Attribute",
            Category::Relation => "Relation",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annotation" | "annotationtype" => Ok(Category::Annotation),
            "attribute" | "attributetype" => Ok(Category::Attribute),
            "relation" | "relationtype" => Ok(Category::Relation),
            _ => Err(Error::unknown_type(s)),
        }
    }
}

/// Arena index of a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeIndex(u32);

impl TypeIndex {
    /// Raw index value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    const fn slot(self) -> usize {
        self.0 as usize
    }
}

/// Handle to an annotation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationType(TypeIndex);

impl AnnotationType {
    /// Arena index.
    #[must_use]
    pub const fn index(self) -> TypeIndex {
        self.0
    }
}

/// Handle to a relation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationType(TypeIndex);

impl RelationType {
    /// Arena index.
    #[must_use]
    pub const fn index(self) -> TypeIndex {
        self.0
    }
}

/// Handle to an attribute type with its Rust value type erased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeKey(TypeIndex);

impl AttributeKey {
    /// Arena index.
    #[must_use]
    pub const fn index(self) -> TypeIndex {
        self.0
    }
}

/// Handle to an attribute type whose values are `T`.
///
/// ```rust
/// use tessera_core::TypeRegistry;
///
/// let registry = TypeRegistry::new();
/// let count = registry.make_attribute_type::<i64>("COUNT").unwrap();
/// assert_eq!(count.decode("12").unwrap(), 12);
/// ```
pub struct AttributeType<T> {
    key: AttributeKey,
    _kind: PhantomData<fn() -> T>,
}

impl<T> AttributeType<T> {
    const fn from_index(index: u32) -> Self {
        Self {
            key: AttributeKey(TypeIndex(index)),
            _kind: PhantomData,
        }
    }

    /// The erased handle.
    #[must_use]
    pub const fn key(&self) -> AttributeKey {
        self.key
    }
}

impl<T: AttributeKind> AttributeType<T> {
    /// Coerce a value to `T`.
    pub fn decode(self, value: impl Into<AttributeValue>) -> Result<T> {
        let decoded = value::decode(T::VALUE_TYPE, value.into())?;
        T::from_value(&decoded)
            .ok_or_else(|| Error::invalid_value(T::VALUE_TYPE, "null is not a value"))
    }
}

impl<T> Clone for AttributeType<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AttributeType<T> {}

impl<T> PartialEq for AttributeType<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for AttributeType<T> {}

impl<T> Hash for AttributeType<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T> fmt::Debug for AttributeType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AttributeType").field(&self.key.0).finish()
    }
}

impl<T> From<AttributeType<T>> for AttributeKey {
    fn from(attr: AttributeType<T>) -> Self {
        attr.key
    }
}

/// Any registered type, tagged with its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnnotatableType {
    /// An annotation type
    Annotation(AnnotationType),
    /// An attribute type
    Attribute(AttributeKey),
    /// A relation type
    Relation(RelationType),
}

impl AnnotatableType {
    fn from_parts(category: Category, index: TypeIndex) -> Self {
        match category {
            Category::Annotation => AnnotatableType::Annotation(AnnotationType(index)),
            Category::Attribute => AnnotatableType::Attribute(AttributeKey(index)),
            Category::Relation => AnnotatableType::Relation(RelationType(index)),
        }
    }

    /// Category of the type.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            AnnotatableType::Annotation(_) => Category::Annotation,
            AnnotatableType::Attribute(_) => Category::Attribute,
            AnnotatableType::Relation(_) => Category::Relation,
        }
    }

    /// Arena index.
    #[must_use]
    pub const fn index(&self) -> TypeIndex {
        match self {
            AnnotatableType::Annotation(t) => t.0,
            AnnotatableType::Attribute(t) => t.0,
            AnnotatableType::Relation(t) => t.0,
        }
    }
}

impl From<AnnotationType> for AnnotatableType {
    fn from(t: AnnotationType) -> Self {
        AnnotatableType::Annotation(t)
    }
}

impl From<AttributeKey> for AnnotatableType {
    fn from(t: AttributeKey) -> Self {
        AnnotatableType::Attribute(t)
    }
}

impl<T> From<AttributeType<T>> for AnnotatableType {
    fn from(t: AttributeType<T>) -> Self {
        AnnotatableType::Attribute(t.key)
    }
}

impl From<RelationType> for AnnotatableType {
    fn from(t: RelationType) -> Self {
        AnnotatableType::Relation(t)
    }
}

// =============================================================================
// Built-in Types
// =============================================================================

/// Types present in every registry created by [`TypeRegistry::new`].
pub mod builtin {
    use super::{AnnotationType, AttributeType, RelationType, TypeIndex};
    use crate::value::StringTag;

    /// Universal parent of all annotation types.
    pub const ROOT: AnnotationType = AnnotationType(TypeIndex(0));
    /// Part-of-speech tag; tag attribute of TOKEN and PHRASE_CHUNK.
    pub const PART_OF_SPEECH: AttributeType<StringTag> = AttributeType::from_index(1);
    /// Dictionary form of a token.
    pub const LEMMA: AttributeType<String> = AttributeType::from_index(2);
    /// Confidence of whoever produced the annotation.
    pub const CONFIDENCE: AttributeType<f64> = AttributeType::from_index(3);
    /// Entity label; tag attribute of ENTITY.
    pub const ENTITY_TYPE: AttributeType<StringTag> = AttributeType::from_index(4);
    /// Language code.
    pub const LANGUAGE: AttributeType<String> = AttributeType::from_index(5);
    /// Positional index (e.g. token index within a sentence).
    pub const INDEX: AttributeType<i64> = AttributeType::from_index(6);
    /// Word-level annotation.
    pub const TOKEN: AnnotationType = AnnotationType(TypeIndex(7));
    /// Sentence; bounds context windows.
    pub const SENTENCE: AnnotationType = AnnotationType(TypeIndex(8));
    /// Shallow syntactic phrase (NP, VP, ...).
    pub const PHRASE_CHUNK: AnnotationType = AnnotationType(TypeIndex(9));
    /// Named entity mention.
    pub const ENTITY: AnnotationType = AnnotationType(TypeIndex(10));
    /// Dependency edge (dependent → head).
    pub const DEPENDENCY: RelationType = RelationType(TypeIndex(11));
    /// Coreference link (mention → antecedent).
    pub const COREFERENCE: RelationType = RelationType(TypeIndex(12));
    /// Syntactic head of a phrase.
    pub const SYNTACTIC_HEAD: RelationType = RelationType(TypeIndex(13));

    pub(super) const COUNT: usize = 14;
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Debug, Clone)]
struct TypeEntry {
    category: Category,
    label: String,
    parent: Option<TypeIndex>,
    value_type: Option<ValueType>,
    tag_attribute: Option<TypeIndex>,
}

/// What a `make_*` call asks for.
struct Definition {
    parent: Option<TypeIndex>,
    value_type: Option<ValueType>,
    tag_attribute: Option<TypeIndex>,
    /// Check parent and tag attribute against an existing entry.
    strict: bool,
}

#[derive(Debug, Default)]
struct Arena {
    entries: Vec<TypeEntry>,
    by_name: HashMap<(Category, String), TypeIndex>,
}

impl Arena {
    fn lookup(&self, category: Category, key: &str) -> Option<TypeIndex> {
        self.by_name.get(&(category, key.to_string())).copied()
    }

    fn entry(&self, index: TypeIndex) -> Option<&TypeEntry> {
        self.entries.get(index.slot())
    }

    fn label(&self, index: TypeIndex) -> String {
        self.entry(index)
            .map_or_else(|| format!("#{}", index.0), |e| e.label.clone())
    }

    fn insert(&mut self, category: Category, name: &str, key: String, def: &Definition) -> TypeIndex {
        let index = TypeIndex(self.entries.len() as u32);
        let label = LABEL_SEPARATORS
            .replace_all(name.trim(), "_")
            .to_uppercase();
        log::debug!("registered {category} type {label} (#{})", index.0);
        self.entries.push(TypeEntry {
            category,
            label,
            parent: def.parent,
            value_type: def.value_type,
            tag_attribute: def.tag_attribute,
        });
        self.by_name.insert((category, key), index);
        index
    }

    fn check_compatible(&self, index: TypeIndex, def: &Definition) -> Result<()> {
        let Some(entry) = self.entry(index) else {
            return Ok(());
        };
        if let (Some(existing), Some(requested)) = (entry.value_type, def.value_type) {
            if existing != requested {
                return Err(Error::conflicting(format!(
                    "{}.{} is declared as {existing}, not {requested}",
                    entry.category, entry.label
                )));
            }
        }
        if def.strict && entry.parent != def.parent {
            return Err(Error::conflicting(format!(
                "{}.{} already has parent {}",
                entry.category,
                entry.label,
                entry.parent.map_or_else(|| "none".to_string(), |p| self.label(p))
            )));
        }
        if def.strict && entry.tag_attribute != def.tag_attribute {
            return Err(Error::conflicting(format!(
                "{}.{} already has tag attribute {}",
                entry.category,
                entry.label,
                entry
                    .tag_attribute
                    .map_or_else(|| "none".to_string(), |t| self.label(t))
            )));
        }
        Ok(())
    }
}

/// Normalized lookup key for a type name.
fn normalize(name: &str) -> Result<String> {
    let key = NAME_SEPARATORS.replace_all(name, "").to_uppercase();
    if key.is_empty() {
        return Err(Error::invalid_input(format!("type name {name:?} is empty")));
    }
    Ok(key)
}

/// Interning registry for annotation, attribute and relation types.
#[derive(Debug)]
pub struct TypeRegistry {
    arena: RwLock<Arena>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry holding the [`builtin`] types.
    #[must_use]
    pub fn new() -> Self {
        let mut arena = Arena::default();
        let root = builtin::ROOT.0;
        let mut add = |category, name: &str, parent, value_type, tag_attribute: Option<TypeIndex>| {
            let def = Definition {
                parent,
                value_type,
                tag_attribute,
                strict: true,
            };
            // Built-in names are fixed, normalization cannot fail.
            let key = NAME_SEPARATORS.replace_all(name, "").to_uppercase();
            arena.insert(category, name, key, &def);
        };

        add(Category::Annotation, "ROOT", None, None, None);
        add(Category::Attribute, "PART_OF_SPEECH", None, Some(ValueType::Tag), None);
        add(Category::Attribute, "LEMMA", None, Some(ValueType::String), None);
        add(Category::Attribute, "CONFIDENCE", None, Some(ValueType::Float), None);
        add(Category::Attribute, "ENTITY_TYPE", None, Some(ValueType::Tag), None);
        add(Category::Attribute, "LANGUAGE", None, Some(ValueType::String), None);
        add(Category::Attribute, "INDEX", None, Some(ValueType::Integer), None);
        let pos = Some(builtin::PART_OF_SPEECH.key().0);
        add(Category::Annotation, "TOKEN", Some(root), None, pos);
        add(Category::Annotation, "SENTENCE", Some(root), None, None);
        add(Category::Annotation, "PHRASE_CHUNK", Some(root), None, pos);
        add(Category::Annotation, "ENTITY", Some(root), None, Some(builtin::ENTITY_TYPE.key().0));
        add(Category::Relation, "DEPENDENCY", None, None, None);
        add(Category::Relation, "COREFERENCE", None, None, None);
        add(Category::Relation, "SYNTACTIC_HEAD", None, None, None);
        debug_assert_eq!(arena.entries.len(), builtin::COUNT);

        Self {
            arena: RwLock::new(arena),
        }
    }

    /// Atomic get-or-create.
    fn make(&self, category: Category, name: &str, def: Definition) -> Result<TypeIndex> {
        let key = normalize(name)?;
        {
            let arena = self.arena.read();
            if let Some(index) = arena.lookup(category, &key) {
                arena.check_compatible(index, &def)?;
                return Ok(index);
            }
        }
        let mut arena = self.arena.write();
        if let Some(index) = arena.lookup(category, &key) {
            arena.check_compatible(index, &def)?;
            return Ok(index);
        }
        Ok(arena.insert(category, name, key, &def))
    }

    fn find(&self, category: Category, name: &str) -> Option<TypeIndex> {
        let key = normalize(name).ok()?;
        self.arena.read().lookup(category, &key)
    }

    // -------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------

    /// Get or create an annotation type; new types hang under `ROOT`.
    pub fn make_annotation_type(&self, name: &str) -> Result<AnnotationType> {
        let def = Definition {
            parent: Some(builtin::ROOT.0),
            value_type: None,
            tag_attribute: None,
            strict: false,
        };
        self.make(Category::Annotation, name, def).map(AnnotationType)
    }

    /// Get or create an annotation type with an explicit parent and tag
    /// attribute. An existing type with a different parent or tag attribute
    /// is a [`Error::ConflictingTypeDefinition`].
    pub fn make_annotation_type_with(
        &self,
        name: &str,
        parent: AnnotationType,
        tag_attribute: Option<AttributeType<StringTag>>,
    ) -> Result<AnnotationType> {
        let def = Definition {
            parent: Some(parent.0),
            value_type: None,
            tag_attribute: tag_attribute.map(|t| t.key.0),
            strict: true,
        };
        self.make(Category::Annotation, name, def).map(AnnotationType)
    }

    /// Get or create an attribute type whose values are `T`.
    ///
    /// The first registration fixes the value type; asking again with a
    /// different `T` is a [`Error::ConflictingTypeDefinition`].
    pub fn make_attribute_type<T: AttributeKind>(&self, name: &str) -> Result<AttributeType<T>> {
        let key = self.make_attribute_key(name, T::VALUE_TYPE)?;
        Ok(AttributeType {
            key,
            _kind: PhantomData,
        })
    }

    /// Get or create an attribute type from a runtime value type.
    pub fn make_attribute_key(&self, name: &str, value_type: ValueType) -> Result<AttributeKey> {
        let def = Definition {
            parent: None,
            value_type: Some(value_type),
            tag_attribute: None,
            strict: false,
        };
        self.make(Category::Attribute, name, def).map(AttributeKey)
    }

    /// Get or create a top-level relation type.
    pub fn make_relation_type(&self, name: &str) -> Result<RelationType> {
        let def = Definition {
            parent: None,
            value_type: None,
            tag_attribute: None,
            strict: false,
        };
        self.make(Category::Relation, name, def).map(RelationType)
    }

    /// Get or create a relation type under `parent`.
    pub fn make_relation_type_with(&self, name: &str, parent: RelationType) -> Result<RelationType> {
        let def = Definition {
            parent: Some(parent.0),
            value_type: None,
            tag_attribute: None,
            strict: true,
        };
        self.make(Category::Relation, name, def).map(RelationType)
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// True if `name` is registered in `category`.
    #[must_use]
    pub fn is_defined(&self, category: Category, name: &str) -> bool {
        self.find(category, name).is_some()
    }

    /// All types of a category, in registration order.
    #[must_use]
    pub fn values(&self, category: Category) -> Vec<AnnotatableType> {
        self.arena
            .read()
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.category == category)
            .map(|(i, _)| AnnotatableType::from_parts(category, TypeIndex(i as u32)))
            .collect()
    }

    /// Number of registered types across all categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.read().entries.len()
    }

    /// Never true in practice: the built-ins are always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a type from its string form.
    ///
    /// Accepts `Category.NAME`, `any.dotted.prefix.Category.NAME`, or a bare
    /// `NAME`, tried as Annotation, then Attribute, then Relation.
    pub fn value_of(&self, name: &str) -> Result<AnnotatableType> {
        let trimmed = name.trim();
        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() >= 2 {
            if let Ok(category) = parts[parts.len() - 2].parse::<Category>() {
                let bare = parts[parts.len() - 1];
                return self
                    .find(category, bare)
                    .map(|index| AnnotatableType::from_parts(category, index))
                    .ok_or_else(|| Error::unknown_type(name));
            }
        }
        Category::ALL
            .iter()
            .find_map(|&category| {
                self.find(category, trimmed)
                    .map(|index| AnnotatableType::from_parts(category, index))
            })
            .ok_or_else(|| Error::unknown_type(name))
    }

    /// Look up an existing annotation type.
    pub fn annotation_type_of(&self, name: &str) -> Result<AnnotationType> {
        self.find(Category::Annotation, name)
            .map(AnnotationType)
            .ok_or_else(|| Error::unknown_type(name))
    }

    /// Look up an existing attribute type.
    pub fn attribute_key_of(&self, name: &str) -> Result<AttributeKey> {
        self.find(Category::Attribute, name)
            .map(AttributeKey)
            .ok_or_else(|| Error::unknown_type(name))
    }

    /// Look up an existing attribute type and check its value type is `T`.
    pub fn attribute_type_of<T: AttributeKind>(&self, name: &str) -> Result<AttributeType<T>> {
        let key = self.attribute_key_of(name)?;
        let declared = self.value_type(key)?;
        if declared != T::VALUE_TYPE {
            return Err(Error::conflicting(format!(
                "Attribute.{} is declared as {declared}, not {}",
                self.label(key),
                T::VALUE_TYPE
            )));
        }
        Ok(AttributeType {
            key,
            _kind: PhantomData,
        })
    }

    /// Look up an existing relation type.
    pub fn relation_type_of(&self, name: &str) -> Result<RelationType> {
        self.find(Category::Relation, name)
            .map(RelationType)
            .ok_or_else(|| Error::unknown_type(name))
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    /// Display label, e.g. `PART_OF_SPEECH`.
    #[must_use]
    pub fn label(&self, t: impl Into<AnnotatableType>) -> String {
        self.arena.read().label(t.into().index())
    }

    /// `Category.LABEL`, e.g. `Annotation.TOKEN`.
    #[must_use]
    pub fn canonical_name(&self, t: impl Into<AnnotatableType>) -> String {
        let t = t.into();
        format!("{}.{}", t.category(), self.label(t))
    }

    /// Declared value type of an attribute.
    pub fn value_type(&self, key: AttributeKey) -> Result<ValueType> {
        self.arena
            .read()
            .entry(key.0)
            .and_then(|e| e.value_type)
            .ok_or_else(|| Error::unknown_type(format!("attribute #{}", key.0 .0)))
    }

    /// Coerce `value` to the declared value type of `key`.
    pub fn decode(&self, key: AttributeKey, value: AttributeValue) -> Result<AttributeValue> {
        value::decode(self.value_type(key)?, value)
    }

    /// Parent of an annotation type; `None` for `ROOT`.
    #[must_use]
    pub fn annotation_parent(&self, t: AnnotationType) -> Option<AnnotationType> {
        self.arena
            .read()
            .entry(t.0)
            .and_then(|e| e.parent)
            .map(AnnotationType)
    }

    /// Parent of a relation type, if any.
    #[must_use]
    pub fn relation_parent(&self, t: RelationType) -> Option<RelationType> {
        self.arena
            .read()
            .entry(t.0)
            .and_then(|e| e.parent)
            .map(RelationType)
    }

    /// Ancestors of an annotation type, nearest first, ending with `ROOT`.
    #[must_use]
    pub fn ancestors(&self, t: AnnotationType) -> Vec<AnnotationType> {
        let arena = self.arena.read();
        let mut out = Vec::new();
        let mut current = arena.entry(t.0).and_then(|e| e.parent);
        while let Some(index) = current {
            out.push(AnnotationType(index));
            current = arena.entry(index).and_then(|e| e.parent);
        }
        out
    }

    fn descends(&self, index: TypeIndex, ancestor: TypeIndex) -> bool {
        let arena = self.arena.read();
        let mut current = Some(index);
        while let Some(i) = current {
            if i == ancestor {
                return true;
            }
            current = arena.entry(i).and_then(|e| e.parent);
        }
        false
    }

    /// True if `t` is `ancestor` or descends from it. Every type is an
    /// instance of `ROOT`.
    #[must_use]
    pub fn is_instance(&self, t: AnnotationType, ancestor: AnnotationType) -> bool {
        self.descends(t.0, ancestor.0)
    }

    /// True if relation type `t` is `ancestor` or descends from it.
    #[must_use]
    pub fn is_relation_instance(&self, t: RelationType, ancestor: RelationType) -> bool {
        self.descends(t.0, ancestor.0)
    }

    /// The attribute carrying an annotation type's primary label.
    #[must_use]
    pub fn tag_attribute(&self, t: AnnotationType) -> Option<AttributeType<StringTag>> {
        self.arena
            .read()
            .entry(t.0)
            .and_then(|e| e.tag_attribute)
            .map(|index| AttributeType {
                key: AttributeKey(index),
                _kind: PhantomData,
            })
    }
}
