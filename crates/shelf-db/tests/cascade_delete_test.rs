//! Cascade delete semantics for class, subject, and chapter removal.

use shelf_core::CreateNoteRecord;
use shelf_db::test_fixtures::TestDatabase;
use shelf_db::{file_url_for, generate_storage_path, Database};
use uuid::Uuid;

async fn seed_note(db: &Database, chapter_id: Uuid, subject_id: Uuid, title: &str) -> (Uuid, String) {
    let storage_path = generate_storage_path(shelf_core::new_v7());
    let id = db
        .notes
        .insert(
            CreateNoteRecord {
                title: title.to_string(),
                chapter_id,
                subject_id,
                document_type_id: None,
                year: None,
                file_url: file_url_for(&storage_path),
            },
            &storage_path,
        )
        .await
        .expect("insert note");
    (id, storage_path)
}

#[tokio::test]
#[ignore] // Requires database connection with migrations applied
async fn test_class_delete_removes_whole_subtree() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let class_id = db.classes.create("Class 10").await.expect("create class");
    let physics = db.subjects.create("Physics", class_id).await.expect("create subject");
    let chemistry = db.subjects.create("Chemistry", class_id).await.expect("create subject");
    let optics = db.chapters.create("Optics", physics).await.expect("create chapter");
    let bonds = db.chapters.create("Chemical Bonds", chemistry).await.expect("create chapter");

    db.document_types.ensure("Past Paper", optics).await.expect("ensure type");
    let (_, path_a) = seed_note(db, optics, physics, "Lens formula").await;
    let (_, path_b) = seed_note(db, bonds, chemistry, "Ionic bonding").await;

    // Unrelated class survives.
    let other_class = db.classes.create("Class 12").await.expect("create class");
    let other_subject = db.subjects.create("Biology", other_class).await.expect("create subject");

    let report = db.classes.delete(class_id).await.expect("cascade delete");
    assert_eq!(report.subjects, 2);
    assert_eq!(report.chapters, 2);
    assert_eq!(report.notes, 2);
    assert_eq!(report.document_types, 1);
    assert!(report.storage_paths.contains(&path_a));
    assert!(report.storage_paths.contains(&path_b));

    assert!(db.subjects.list().await.expect("list").iter().all(|s| s.id == other_subject));
    assert!(db.chapters.list().await.expect("list").is_empty());
    assert!(db.notes.list().await.expect("list").is_empty());
    assert!(db.document_types.list().await.expect("list").is_empty());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_subject_delete_spares_siblings() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let class_id = db.classes.create("Class 9").await.expect("create class");
    let physics = db.subjects.create("Physics", class_id).await.expect("create subject");
    let math = db.subjects.create("Math", class_id).await.expect("create subject");
    let optics = db.chapters.create("Optics", physics).await.expect("create chapter");
    let algebra = db.chapters.create("Algebra", math).await.expect("create chapter");

    seed_note(db, optics, physics, "Mirrors").await;
    let (kept_note, _) = seed_note(db, algebra, math, "Polynomials").await;

    let report = db.subjects.delete(physics).await.expect("cascade delete");
    assert_eq!(report.subjects, 1);
    assert_eq!(report.chapters, 1);
    assert_eq!(report.notes, 1);

    let chapters = db.chapters.list().await.expect("list");
    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].id, algebra);

    let notes = db.notes.list().await.expect("list");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, kept_note);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_chapter_delete_removes_notes_and_types() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let class_id = db.classes.create("Class 8").await.expect("create class");
    let subject_id = db.subjects.create("History", class_id).await.expect("create subject");
    let chapter_id = db.chapters.create("Medieval Era", subject_id).await.expect("create chapter");

    db.document_types.ensure("Notes", chapter_id).await.expect("ensure type");
    let (_, path) = seed_note(db, chapter_id, subject_id, "Timeline").await;

    let report = db.chapters.delete(chapter_id).await.expect("cascade delete");
    assert_eq!(report.chapters, 1);
    assert_eq!(report.notes, 1);
    assert_eq!(report.document_types, 1);
    assert_eq!(report.storage_paths, vec![path]);

    // The subject itself is untouched.
    assert_eq!(db.subjects.list().await.expect("list").len(), 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_delete_missing_entity_is_not_found() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let missing = shelf_core::new_v7();
    assert!(matches!(
        db.classes.delete(missing).await,
        Err(shelf_core::Error::NotFound(_))
    ));
    assert!(matches!(
        db.subjects.delete(missing).await,
        Err(shelf_core::Error::NotFound(_))
    ));
    assert!(matches!(
        db.chapters.delete(missing).await,
        Err(shelf_core::Error::NotFound(_))
    ));

    test_db.cleanup().await;
}
