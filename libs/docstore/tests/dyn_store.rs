use std::sync::Arc;

use docstore::{DatasetFormat, DocumentStore, MemoryStore, MemoryStoreOptions};
use query_core::ast::{Condition, Predicate};
use query_core::{FindOptions, Ordering, SortDir};
use serde_json::json;

#[tokio::test]
async fn file_backed_store_behind_trait_object() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.jsonl");
    let lines: Vec<String> = (1..=12)
        .map(|id| json!({ "Transaction ID": id, "Gender": if id % 3 == 0 { "Male" } else { "Female" } }).to_string())
        .collect();
    std::fs::write(&path, lines.join("\n")).unwrap();

    let store: Arc<dyn DocumentStore> = Arc::new(
        MemoryStore::open("sales", &path, DatasetFormat::Auto, MemoryStoreOptions::default()).unwrap(),
    );

    let males = Predicate::field("Gender", Condition::In(vec![json!("Male")]));
    assert_eq!(store.count(&males, None).await.unwrap(), 4);
    assert_eq!(store.estimated_count().await.unwrap(), 12);

    let page = store
        .find(
            &males,
            &FindOptions::new()
                .sort(Ordering::by("Transaction ID", SortDir::Asc))
                .limit(2),
        )
        .await
        .unwrap();
    let ids: Vec<_> = page.iter().map(|d| d["Transaction ID"].clone()).collect();
    assert_eq!(ids, vec![json!(3), json!(6)]);
}
