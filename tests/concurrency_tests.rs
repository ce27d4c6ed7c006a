//! Concurrency and thread-safety tests.
//!
//! These tests verify that:
//! - Concurrent first use of a type name yields one registry entry
//! - Documents can be read from many threads at once
//! - Token caches fill correctly under concurrent first reads
//! - SharedDocument serializes writers against readers

use std::sync::Arc;
use std::thread;
use tessera::prelude::*;
use tessera::Category;

// =============================================================================
// Thread Safety Tests
// =============================================================================

#[test]
fn core_types_are_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TypeRegistry>();
    assert_send_sync::<Document>();
    assert_send_sync::<SharedDocument>();
    assert_send_sync::<AnnotationRef<'static>>();
}

// =============================================================================
// Registry
// =============================================================================

#[test]
fn concurrent_make_yields_one_type() {
    let registry = Arc::new(TypeRegistry::new());
    let before = registry.len();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                // Spellings differ but normalize to the same name
                let name = if i % 2 == 0 { "noun-phrase" } else { "NounPhrase" };
                registry.make_annotation_type(name).unwrap()
            })
        })
        .collect();

    let types: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(types.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(registry.len(), before + 1);
    assert!(registry.is_defined(Category::Annotation, "NOUN_PHRASE"));
}

// =============================================================================
// Concurrent Reads
// =============================================================================

fn sample_document() -> Document {
    let text = "a ".repeat(500);
    let mut doc = Document::new(Arc::new(TypeRegistry::new()), "big", text.trim_end());
    for i in 0..500 {
        doc.create_annotation(builtin::TOKEN, i * 2, i * 2 + 1, AttributeMap::new())
            .unwrap();
    }
    for i in 0..50 {
        doc.create_annotation(builtin::SENTENCE, i * 20, i * 20 + 19, AttributeMap::new())
            .unwrap();
    }
    doc
}

#[test]
fn concurrent_token_cache_fill() {
    let doc = Arc::new(sample_document());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let doc = Arc::clone(&doc);
            thread::spawn(move || {
                doc.hstring()
                    .sentences()
                    .iter()
                    .map(|s| s.tokens().len())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        let counts = handle.join().unwrap();
        assert_eq!(counts.len(), 50);
        assert!(counts.iter().all(|&c| c == 10));
    }
}

#[test]
fn shared_document_readers_and_writer() {
    let shared = sample_document().into_shared();
    let entity = builtin::ENTITY;

    let writer = {
        let shared = shared.clone();
        thread::spawn(move || {
            for i in 0..100 {
                let mut doc = shared.write();
                doc.create_annotation(entity, i * 2, i * 2 + 1, AttributeMap::new())
                    .unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    let doc = shared.read();
                    let entities = doc.hstring().annotations(entity);
                    // Every entity sits on exactly one token
                    assert!(entities.iter().all(|e| e.tokens().len() == 1));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    let doc = shared.read();
    assert_eq!(doc.hstring().annotations(entity).len(), 100);
}
