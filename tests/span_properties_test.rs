//! Property checks for annotation and span filtering over generated documents.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use spanmark::index::reader::IndexReader;
use spanmark::prelude::*;
use spanmark::query::span::{SpanOrQuery, SpanTermQuery};
use spanmark::span::evaluation::SegmentSpans;
use spanmark::span::interval::NextDoc;

const FIELD: &str = "body";
const VOCABULARY: &[&str] = &["red", "fox", "lazy", "dog", "quick", "cat", "jumps", "over"];

fn generate_documents(rng: &mut StdRng, count: usize) -> Vec<String> {
    (0..count)
        .map(|_| {
            let len = rng.random_range(1..25);
            (0..len)
                .map(|_| VOCABULARY[rng.random_range(0..VOCABULARY.len())])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn create_index(texts: &[String]) -> Result<Index> {
    let index = Index::new(IndexConfig::default().with_max_buffered_docs(7))?;
    let mut writer = index.writer()?;
    for text in texts {
        writer.add_document(Document::builder().add_text(FIELD, text.as_str()).build())?;
    }
    writer.commit()?;
    Ok(index)
}

fn queries() -> Result<Vec<Box<dyn SpanQuery>>> {
    let builder = SpanQueryBuilder::new(FIELD);
    let red_fox = builder.phrase(vec!["red".into(), "fox".into()])?;
    let lazy_dog = builder.proximity(vec!["lazy".into(), "dog".into()], 2)?;
    let nested = builder.near(vec![red_fox.clone_box(), lazy_dog.clone_box()], 4, false)?;
    let either = SpanOrQuery::new(FIELD, vec![red_fox.clone_box(), nested.clone_box()])?;

    let queries: Vec<Box<dyn SpanQuery>> = vec![
        Box::new(SpanTermQuery::new(FIELD, "fox")),
        Box::new(red_fox),
        Box::new(lazy_dog),
        Box::new(nested),
        Box::new(either),
    ];
    Ok(queries)
}

/// Every document the per-segment document cursors yield, in order.
fn cursor_documents(reader: &IndexReader, query: &dyn SpanQuery) -> Result<Vec<DocId>> {
    let mut docs = Vec::new();
    for segment in reader.leaves() {
        let spans = SegmentSpans::new(query, segment);
        let mut cursor = spans.document_cursor()?;
        while let NextDoc::Doc(doc_id) = cursor.next_document()? {
            docs.push(doc_id);
        }
        for _ in 0..3 {
            assert_eq!(cursor.next_document()?, NextDoc::NoMoreDocs);
        }
    }
    Ok(docs)
}

#[test]
fn test_annotation_preserves_tokens() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    let documents = generate_documents(&mut rng, 40);
    let index = create_index(&documents)?;
    let searcher = SpanSearcher::new(index.reader());

    for query in queries()? {
        let report = searcher.annotate(
            query.as_ref(),
            Arc::new(SimpleAnalyzer::whitespace()),
            AnnotationConfig::default(),
        )?;
        assert!(report.is_clean());

        for annotated in &report.documents {
            let stripped = annotated.text.replace(['<', '>'], "");
            assert_eq!(stripped, format!("{} ", documents[annotated.id as usize]));
            assert_eq!(
                annotated.text.matches('<').count(),
                annotated.text.matches('>').count()
            );
            assert_eq!(annotated.text.matches('>').count(), annotated.span_count);
        }
    }

    Ok(())
}

#[test]
fn test_annotation_counts_match_span_counts() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(11);
    let documents = generate_documents(&mut rng, 40);
    let index = create_index(&documents)?;
    let searcher = SpanSearcher::new(index.reader());

    for query in queries()? {
        let report = searcher.annotate(
            query.as_ref(),
            Arc::new(SimpleAnalyzer::whitespace()),
            AnnotationConfig::default(),
        )?;
        let annotated: Vec<(DocId, usize)> = report
            .documents
            .iter()
            .map(|doc| (doc.id, doc.span_count))
            .collect();

        assert_eq!(annotated, searcher.span_counts(query.as_ref())?);
    }

    Ok(())
}

#[test]
fn test_threshold_monotonicity() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(23);
    let documents = generate_documents(&mut rng, 60);
    let index = create_index(&documents)?;
    let searcher = SpanSearcher::new(index.reader());

    for query in queries()? {
        let mut previous = searcher.filter(query.as_ref(), 1)?;
        for min_count in 2..6 {
            let current = searcher.filter(query.as_ref(), min_count)?;
            assert!(current.iter().all(|doc_id| previous.contains(doc_id)));
            previous = current;
        }
    }

    Ok(())
}

#[test]
fn test_min_count_one_returns_every_matching_document() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(31);
    let documents = generate_documents(&mut rng, 50);
    let index = create_index(&documents)?;
    let reader = index.reader();
    let searcher = SpanSearcher::new(reader.clone());

    for query in queries()? {
        let expected = cursor_documents(&reader, query.as_ref())?;
        assert_eq!(searcher.filter(query.as_ref(), 1)?, expected);

        let counts = searcher.span_counts(query.as_ref())?;
        assert!(counts.iter().all(|&(_, count)| count >= 1));
    }

    Ok(())
}

#[test]
fn test_documents_without_spans_are_never_selected() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(43);
    let documents = generate_documents(&mut rng, 30);
    let index = create_index(&documents)?;
    let searcher = SpanSearcher::new(index.reader());

    let missing = SpanTermQuery::new(FIELD, "wolf");
    assert!(searcher.filter(&missing, 1)?.is_empty());
    assert!(searcher.span_counts(&missing)?.is_empty());

    let report = searcher.annotate(
        &missing,
        Arc::new(SimpleAnalyzer::whitespace()),
        AnnotationConfig::default(),
    )?;
    assert!(report.documents.is_empty());
    assert!(report.is_clean());

    Ok(())
}
