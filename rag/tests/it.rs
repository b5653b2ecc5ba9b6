//! Integration tests for the knowledge base and its on-disk store.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use quarry_core::{AnswerSynthesizer, EmbeddingModel};
use quarry_rag::{
    DocumentSource, KnowledgeBase, RagConfig, RagError, SearchHit, VectorStore, evaluate,
};
use tempfile::tempdir;

const DIMENSION: usize = 16;

/// Bag-of-words embedder hashing lowercased tokens into fixed buckets.
#[derive(Default)]
struct HashedBagOfWords {
    calls: AtomicUsize,
}

fn bucket(token: &str) -> usize {
    let hash = token
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |acc, b| {
            (acc ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
        });
    (hash % DIMENSION as u64) as usize
}

impl EmbeddingModel for HashedBagOfWords {
    async fn embed_batch(&self, texts: &[String]) -> quarry_core::Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0; DIMENSION];
                for token in text.to_lowercase().split_whitespace() {
                    vector[bucket(token)] += 1.0;
                }
                vector
            })
            .collect())
    }
}

/// Answers with the top excerpt and cites it.
struct QuoteFirst;

impl AnswerSynthesizer for QuoteFirst {
    async fn synthesize(&self, _query: &str, contexts: &[String]) -> quarry_core::Result<String> {
        Ok(match contexts.first() {
            Some(top) => format!("{top}\nSOURCES: 1"),
            None => "I don't know.".to_string(),
        })
    }
}

const PASSAGES: [&str; 5] = [
    "rust guarantees memory safety without a garbage collector",
    "the eiffel tower is located in paris france",
    "photosynthesis converts sunlight water and carbon dioxide into glucose",
    "the pacific ocean is the largest ocean on earth",
    "tokio is an asynchronous runtime for the rust programming language",
];

fn batch(texts: &[&str], doc_id: &str) -> Vec<(String, DocumentSource)> {
    texts
        .iter()
        .map(|t| ((*t).to_string(), DocumentSource::new("facts.txt", doc_id, None)))
        .collect()
}

fn open_store(dir: &Path) -> VectorStore<Arc<HashedBagOfWords>> {
    VectorStore::open(dir, Arc::new(HashedBagOfWords::default())).unwrap()
}

fn ids(hits: &[SearchHit]) -> Vec<u64> {
    hits.iter().map(|hit| hit.id).collect()
}

#[tokio::test]
async fn every_chunk_retrieves_itself_first() {
    let dir = tempdir().unwrap();
    let store = open_store(dir.path());
    store.add(batch(&PASSAGES, "facts")).await.unwrap();

    for (id, passage) in PASSAGES.iter().enumerate() {
        let hits = store.search(passage, 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, id as u64, "query: {passage}");
        assert!(hits[0].score.abs() < f32::EPSILON);
        assert_eq!(hits[0].text, *passage);
    }
}

#[tokio::test]
async fn ids_continue_across_reloads() {
    let dir = tempdir().unwrap();
    {
        let store = open_store(dir.path());
        let ids = store.add(batch(&PASSAGES[..3], "first")).await.unwrap();
        assert_eq!(ids, vec![0, 1, 2]);
    }
    {
        let store = open_store(dir.path());
        assert_eq!(store.len(), 3);
        let ids = store.add(batch(&PASSAGES[3..], "second")).await.unwrap();
        assert_eq!(ids, vec![3, 4]);
    }

    let store = open_store(dir.path());
    assert_eq!(store.len(), 5);
    let next = store.add(batch(&["one more fact"], "third")).await.unwrap();
    assert_eq!(next, vec![5]);
    assert_eq!(store.chunk(4).unwrap().metadata.doc_id, "second");
}

#[tokio::test]
async fn reload_preserves_rankings() {
    let dir = tempdir().unwrap();
    let queries = ["rust memory", "largest ocean", "paris", "sunlight glucose"];

    let before: Vec<Vec<SearchHit>> = {
        let store = open_store(dir.path());
        store.add(batch(&PASSAGES, "facts")).await.unwrap();
        let mut all = Vec::new();
        for query in queries {
            all.push(store.search(query, 3).await.unwrap());
        }
        all
    };

    let store = open_store(dir.path());
    for (query, expected) in queries.iter().zip(&before) {
        let hits = store.search(query, 3).await.unwrap();
        assert_eq!(ids(&hits), ids(expected), "query: {query}");
        assert_eq!(&hits, expected);
    }
}

#[tokio::test]
async fn one_provider_call_per_add() {
    let dir = tempdir().unwrap();
    let embedder = Arc::new(HashedBagOfWords::default());
    let store = VectorStore::open(dir.path(), Arc::clone(&embedder)).unwrap();

    store.add(batch(&PASSAGES, "a")).await.unwrap();
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    store.add(batch(&PASSAGES[..2], "b")).await.unwrap();
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_store_search_is_empty_and_free() {
    let dir = tempdir().unwrap();
    let embedder = Arc::new(HashedBagOfWords::default());
    let store = VectorStore::open(dir.path(), Arc::clone(&embedder)).unwrap();

    assert!(store.search("anything at all", 4).await.unwrap().is_empty());
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.dimension(), None);
}

#[tokio::test]
async fn second_handle_on_same_directory_is_locked() {
    let dir = tempdir().unwrap();
    let store = open_store(dir.path());
    store.add(batch(&PASSAGES[..1], "a")).await.unwrap();

    let second = VectorStore::open(dir.path(), Arc::new(HashedBagOfWords::default()));
    assert!(matches!(second, Err(RagError::Locked(_))));

    drop(store);
    assert_eq!(open_store(dir.path()).len(), 1);
}

#[tokio::test]
async fn interrupted_swap_recovers_previous_snapshot() {
    let dir = tempdir().unwrap();
    {
        let store = open_store(dir.path());
        store.add(batch(&PASSAGES, "facts")).await.unwrap();
    }
    fs::rename(dir.path().join("current"), dir.path().join(".previous")).unwrap();

    let store = open_store(dir.path());
    assert_eq!(store.len(), PASSAGES.len());
    let hits = store.search(PASSAGES[2], 1).await.unwrap();
    assert_eq!(hits[0].id, 2);

    let ids = store.add(batch(&["after recovery"], "later")).await.unwrap();
    assert_eq!(ids, vec![PASSAGES.len() as u64]);
}

#[tokio::test]
async fn disagreeing_artifacts_refuse_to_load() {
    let dir = tempdir().unwrap();
    {
        let store = open_store(dir.path());
        store.add(batch(&PASSAGES, "facts")).await.unwrap();
    }
    fs::write(
        dir.path().join("current/metadata.json"),
        br#"[{"index":0,"source":"facts.txt","doc_id":"facts","source_name":null}]"#,
    )
    .unwrap();

    let result = VectorStore::open(dir.path(), Arc::new(HashedBagOfWords::default()));
    assert!(matches!(result, Err(RagError::Corrupt(_))));
}

#[tokio::test]
async fn ingest_then_query_end_to_end() {
    let dir = tempdir().unwrap();
    let config = RagConfig::builder()
        .persist_dir(dir.path())
        .chunk_size(80)
        .chunk_overlap(10)
        .build()
        .unwrap();
    let embedder = Arc::new(HashedBagOfWords::default());
    let kb = KnowledgeBase::open(config, Arc::clone(&embedder), QuoteFirst).unwrap();

    let document = PASSAGES.join("\n\n");
    let report = kb
        .ingest(document.as_bytes(), "facts.txt", Some("Trivia".to_string()))
        .await
        .unwrap();
    assert_eq!(report.status, "ok");
    assert!(report.num_chunks >= 3);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);

    let response = kb.query("where is the eiffel tower", None).await.unwrap();
    assert!(!response.hits.is_empty());
    assert!(response.hits.len() <= 4);
    assert_eq!(response.sources.len(), response.hits.len());
    assert!(response.sources.iter().all(|m| m.doc_id == report.doc_id));
    assert!(response.sources.iter().all(|m| m.source_name.as_deref() == Some("Trivia")));
    assert!(response.hits.windows(2).all(|w| w[0].score <= w[1].score));

    assert!(response.evaluation.sources_cited);
    assert!(response.evaluation.follows_prompt);
    assert!(response.evaluation.retrieval_accuracy > 0.0);
}

#[tokio::test]
async fn query_on_empty_knowledge_base_still_answers() {
    let dir = tempdir().unwrap();
    let config = RagConfig::builder().persist_dir(dir.path()).build().unwrap();
    let kb = KnowledgeBase::open(config, Arc::new(HashedBagOfWords::default()), QuoteFirst)
        .unwrap();

    let response = kb.query("anything", None).await.unwrap();
    assert!(response.hits.is_empty());
    assert_eq!(response.answer, "I don't know.");
    assert!(!response.evaluation.sources_cited);
    assert!(response.evaluation.retrieval_accuracy.abs() < f64::EPSILON);
}

#[test]
fn sources_line_drives_follows_prompt() {
    let contexts = vec!["the sky is blue".to_string()];
    let cited = evaluate("The sky is blue.\nSOURCES: 1", "what color?", &contexts);
    assert!(cited.sources_cited);
    assert!(cited.follows_prompt);
    assert!(cited.retrieval_accuracy > 0.2);

    let uncited = evaluate("The sky is blue.", "what color?", &contexts);
    assert!(!uncited.sources_cited);
    assert!(!uncited.follows_prompt);
}
