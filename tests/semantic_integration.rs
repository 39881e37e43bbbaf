use coursescout::{CourseRecord, CourseSearch, InMemoryCourseIndex, LocalEmbedder, SemanticFrontEnd};

fn course(title: &str, description: &str) -> CourseRecord {
    CourseRecord::from_raw(
        Some(title.to_string()),
        Some(description.to_string()),
        Some("6 Lessons".to_string()),
        Some("Free".to_string()),
        None,
    )
}

#[test]
fn test_machine_learning_query_prefers_ml_course() {
    let embedder = LocalEmbedder::new_with_default_model().expect("Failed to create embedder");
    let courses = vec![
        course("Cooking 101", "recipes"),
        course("Intro to ML", "machine learning basics"),
    ];
    let index = InMemoryCourseIndex::build(&courses, embedder).expect("Failed to build index");

    let hits = index
        .similarity_search("machine learning", 2)
        .expect("Search failed");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].document.field("title"), "Intro to ML");
    assert_eq!(hits[1].document.field("title"), "Cooking 101");
}

#[test]
fn test_semantic_front_end_returns_at_most_two() {
    let embedder = LocalEmbedder::new_with_default_model().expect("Failed to create embedder");
    let courses = vec![
        course("Python for Data Science", "python pandas numpy"),
        course("Deep Learning with PyTorch", "neural networks"),
        course("Statistics Refresher", "probability and distributions"),
        course("SQL Essentials", "databases and queries"),
    ];
    let index = InMemoryCourseIndex::build(&courses, embedder).expect("Failed to build index");
    let front_end = SemanticFrontEnd::new(index);

    let hits = front_end.search("learn data analysis").expect("Search failed");
    assert_eq!(hits.len(), 2);
    for hit in &hits {
        assert_eq!(hit.document.field("image_url"), "No Image");
    }
}
