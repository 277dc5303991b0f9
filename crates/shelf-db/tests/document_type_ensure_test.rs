//! Idempotent find-or-create for document types.

use shelf_db::test_fixtures::TestDatabase;

#[tokio::test]
#[ignore] // Requires database connection with migrations applied
async fn test_ensure_is_idempotent_per_chapter() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let class_id = db.classes.create("Class 10").await.expect("create class");
    let subject_id = db.subjects.create("Physics", class_id).await.expect("create subject");
    let chapter_id = db.chapters.create("Optics", subject_id).await.expect("create chapter");

    let first = db.document_types.ensure("Past Paper", chapter_id).await.expect("ensure");
    let second = db.document_types.ensure("Past Paper", chapter_id).await.expect("ensure");
    assert_eq!(first, second);

    // Case and surrounding whitespace do not mint new rows.
    let third = db.document_types.ensure("  past paper ", chapter_id).await.expect("ensure");
    assert_eq!(first, third);

    let types = db.document_types.list().await.expect("list");
    assert_eq!(types.len(), 1);
    assert_eq!(types[0].name, "Past Paper");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_ensure_scoped_to_chapter() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let class_id = db.classes.create("Class 10").await.expect("create class");
    let subject_id = db.subjects.create("Physics", class_id).await.expect("create subject");
    let optics = db.chapters.create("Optics", subject_id).await.expect("create chapter");
    let waves = db.chapters.create("Waves", subject_id).await.expect("create chapter");

    let a = db.document_types.ensure("Past Paper", optics).await.expect("ensure");
    let b = db.document_types.ensure("Past Paper", waves).await.expect("ensure");
    assert_ne!(a, b);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_concurrent_ensure_converges() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let class_id = db.classes.create("Class 10").await.expect("create class");
    let subject_id = db.subjects.create("Physics", class_id).await.expect("create subject");
    let chapter_id = db.chapters.create("Optics", subject_id).await.expect("create chapter");

    let (a, b) = tokio::join!(
        db.document_types.ensure("Past Paper", chapter_id),
        db.document_types.ensure("Past Paper", chapter_id),
    );
    assert_eq!(a.expect("ensure"), b.expect("ensure"));
    assert_eq!(db.document_types.list().await.expect("list").len(), 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_delete_type_untags_notes() {
    use shelf_core::CreateNoteRecord;
    use shelf_db::{file_url_for, generate_storage_path};

    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let class_id = db.classes.create("Class 10").await.expect("create class");
    let subject_id = db.subjects.create("Physics", class_id).await.expect("create subject");
    let chapter_id = db.chapters.create("Optics", subject_id).await.expect("create chapter");
    let type_id = db.document_types.ensure("Past Paper", chapter_id).await.expect("ensure");

    let storage_path = generate_storage_path(shelf_core::new_v7());
    let note_id = db
        .notes
        .insert(
            CreateNoteRecord {
                title: "2024 board paper".to_string(),
                chapter_id,
                subject_id,
                document_type_id: Some(type_id),
                year: Some("2024".to_string()),
                file_url: file_url_for(&storage_path),
            },
            &storage_path,
        )
        .await
        .expect("insert note");

    db.document_types.delete(type_id).await.expect("delete type");

    let notes = db.notes.list_by_chapter(chapter_id).await.expect("list");
    let note = notes.iter().find(|n| n.id == note_id).expect("note survives");
    assert!(note.document_type_id.is_none());

    test_db.cleanup().await;
}
