use trieve_search::core::config::{SearchEngineConfig, SearchOptions};
use trieve_search::core::types::{DocId, Document, FieldValue};
use trieve_search::engine::SearchEngine;

fn main() -> trieve_search::Result<()> {
    tracing_subscriber::fmt::init();

    let config = SearchEngineConfig::new("articles", vec!["content".into(), "tags".into()]);
    let engine = SearchEngine::new(config)?;
    engine.initialize()?;

    engine.add_documents(vec![
        Document::new(DocId::new("1"))
            .with_field("content", FieldValue::Text("Rust is a systems programming language".into()))
            .with_field("tags", FieldValue::Tags(vec!["rust".into(), "systems".into()])),
        Document::new(DocId::new("2"))
            .with_field("content", FieldValue::Text("Python is great for data science".into()))
            .with_field("tags", FieldValue::Tags(vec!["python".into(), "data".into()])),
        Document::new(DocId::new("3"))
            .with_field("content", FieldValue::Text("Rust programs compile to native code".into()))
            .with_field("tags", FieldValue::Tags(vec!["rust".into(), "compiler".into()])),
    ])?;

    let exact = engine.search("rust", &SearchOptions::default())?;
    println!("exact match for 'rust': {} hits", exact.hits.len());
    for hit in &exact.hits {
        println!("  {} (score {:.4})", hit.doc_id, hit.score);
    }

    let fuzzy_options = SearchOptions::default().with_fuzzy(2);
    let fuzzy = engine.search("russt", &fuzzy_options)?;
    println!("fuzzy match for 'russt': {} hits", fuzzy.hits.len());

    let prefix_options = SearchOptions::default().with_prefix_match();
    let prefix = engine.search("prog", &prefix_options)?;
    println!("prefix match for 'prog': {} hits", prefix.hits.len());

    println!("stats: {:?}", engine.stats());
    println!("health: {:?}", engine.health_check());

    engine.close()?;
    Ok(())
}
