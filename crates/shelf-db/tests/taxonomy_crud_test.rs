//! CRUD walk through the full taxonomy: class, subject, chapter, note.

use shelf_core::CreateNoteRecord;
use shelf_db::test_fixtures::TestDatabase;
use shelf_db::{file_url_for, generate_storage_path};

#[tokio::test]
#[ignore] // Requires database connection with migrations applied
async fn test_create_full_taxonomy_chain() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let class_id = db.classes.create("Class 10").await.expect("create class");
    let subject_id = db
        .subjects
        .create("Physics", class_id)
        .await
        .expect("create subject");
    let chapter_id = db
        .chapters
        .create("Optics", subject_id)
        .await
        .expect("create chapter");

    let classes = db.classes.list().await.expect("list classes");
    assert!(classes.iter().any(|c| c.id == class_id));

    let subjects = db.subjects.list().await.expect("list subjects");
    let subject = subjects.iter().find(|s| s.id == subject_id).expect("subject listed");
    assert_eq!(subject.class_id.as_ref().map(|r| r.id()), Some(class_id));

    let chapters = db.chapters.list().await.expect("list chapters");
    let chapter = chapters.iter().find(|c| c.id == chapter_id).expect("chapter listed");
    assert_eq!(chapter.subject_id.id(), subject_id);

    let note_id = db
        .notes
        .insert(
            CreateNoteRecord {
                title: "Refraction summary".to_string(),
                chapter_id,
                subject_id,
                document_type_id: None,
                year: None,
                file_url: file_url_for("blobs/aa/bb/refraction.pdf"),
            },
            "blobs/aa/bb/refraction.pdf",
        )
        .await
        .expect("insert note");

    let notes = db.notes.list_by_chapter(chapter_id).await.expect("list notes");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, note_id);
    assert_eq!(notes[0].title, "Refraction summary");
    assert!(notes[0].document_type_id.is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_create_rejects_blank_names() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    assert!(db.classes.create("   ").await.is_err());

    let class_id = db.classes.create("Class 12").await.expect("create class");
    assert!(db.subjects.create("", class_id).await.is_err());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_note_delete_returns_storage_path() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let class_id = db.classes.create("Class 11").await.expect("create class");
    let subject_id = db.subjects.create("Math", class_id).await.expect("create subject");
    let chapter_id = db.chapters.create("Algebra", subject_id).await.expect("create chapter");

    let storage_path = generate_storage_path(shelf_core::new_v7());
    let note_id = db
        .notes
        .insert(
            CreateNoteRecord {
                title: "Quadratics".to_string(),
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

    let returned = db.notes.delete(note_id).await.expect("delete note");
    assert_eq!(returned, storage_path);

    // A second delete reports the note as gone.
    assert!(db.notes.delete(note_id).await.is_err());

    test_db.cleanup().await;
}
