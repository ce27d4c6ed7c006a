//! Property tests for the core building blocks.

use proptest::prelude::*;
use tessera_core::{builtin, decode, AttributeValue, Category, OffsetMap, Span, TypeRegistry, ValueType};

proptest! {
    /// Every char boundary maps to a byte and back to itself.
    #[test]
    fn offsets_round_trip_on_char_boundaries(text in "\\PC{0,40}") {
        let map = OffsetMap::new(&text);
        prop_assert_eq!(map.char_len(), text.chars().count());
        for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
            prop_assert_eq!(map.char_to_byte(char_idx), byte_idx);
            prop_assert_eq!(map.byte_to_char(byte_idx), char_idx);
        }
        prop_assert_eq!(map.char_to_byte(map.char_len()), text.len());
    }

    /// Slicing by a character span agrees with collecting chars.
    #[test]
    fn slice_matches_char_iteration(text in "[a-zé日 ]{0,30}", a in 0usize..30, b in 0usize..30) {
        let map = OffsetMap::new(&text);
        let len = map.char_len();
        let span = Span::covering(a.min(len), b.min(len));
        let expected: String = text.chars().skip(span.start()).take(span.len()).collect();
        prop_assert_eq!(map.slice(&text, span), expected.as_str());
    }

    /// Names differing only in case and punctuation intern to one type.
    #[test]
    fn spelling_variants_share_a_type(word in "[a-z]{1,8}", sep in "[-_ .]{0,2}", tail in "[a-z]{1,8}") {
        let registry = TypeRegistry::new();
        let plain = registry.make_annotation_type(&format!("{word}{tail}")).unwrap();
        let spaced = registry.make_annotation_type(&format!("{}{sep}{}", word.to_uppercase(), tail)).unwrap();
        prop_assert_eq!(plain, spaced);
    }

    /// Integers survive coercion through every numeric-friendly type.
    #[test]
    fn integer_coercion(n in -1_000_000i64..1_000_000) {
        prop_assert_eq!(
            decode(ValueType::Integer, AttributeValue::String(n.to_string())).unwrap(),
            AttributeValue::Integer(n)
        );
        prop_assert_eq!(
            decode(ValueType::Float, AttributeValue::Integer(n)).unwrap(),
            AttributeValue::Float(n as f64)
        );
        prop_assert_eq!(
            decode(ValueType::String, AttributeValue::Integer(n)).unwrap(),
            AttributeValue::String(n.to_string())
        );
    }
}

#[test]
fn builtins_resolve_by_qualified_name() {
    let registry = TypeRegistry::new();
    assert_eq!(
        registry.annotation_type_of("Annotation.TOKEN").unwrap(),
        builtin::TOKEN
    );
    assert_eq!(
        registry.relation_type_of("org.example.Relation.DEPENDENCY").unwrap(),
        builtin::DEPENDENCY
    );
    assert!(registry.is_defined(Category::Attribute, "part_of_speech"));
    assert!(registry.value_of("Relation.NOPE").is_err());
}
