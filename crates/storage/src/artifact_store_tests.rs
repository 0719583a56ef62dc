use super::*;
use lattice_core::ArtifactSource;
use tempfile::tempdir;

fn sample_artifact(id: &str) -> Artifact {
    Artifact {
        id: id.to_string(),
        task_id: "task_1".to_string(),
        source: ArtifactSource::File,
        payload_ref: String::new(),
        title: Some("log".into()),
        summary: None,
        sensitive: false,
        role: None,
        created_at: chrono::Utc::now(),
        actor: "human:alice".to_string(),
        payload_sha256: None,
    }
}

#[test]
fn put_file_copies_payload_and_records_sha256() {
    let tmp = tempdir().unwrap();
    let paths = ProjectPaths::init(tmp.path()).unwrap();
    let store = ArtifactStore::new(&paths);

    let source_file = tmp.path().join("source.txt");
    fs::write(&source_file, b"hello world").unwrap();

    let saved = store.put(sample_artifact("art_1"), Some(&source_file)).unwrap();
    assert!(saved.payload_sha256.is_some());
    assert!(paths.root().join(&saved.payload_ref).exists());

    let loaded = store.meta("art_1").unwrap().unwrap();
    assert_eq!(loaded.payload_sha256, saved.payload_sha256);
}

#[test]
fn put_rejects_oversized_payload() {
    let tmp = tempdir().unwrap();
    let paths = ProjectPaths::init(tmp.path()).unwrap();
    let store = ArtifactStore::new(&paths).with_max_payload_bytes(4);

    let source_file = tmp.path().join("big.txt");
    fs::write(&source_file, b"way too big").unwrap();

    let err = store.put(sample_artifact("art_2"), Some(&source_file)).unwrap_err();
    assert!(matches!(err, ArtifactStoreError::TooLarge { .. }));
}

#[test]
fn url_source_skips_payload_copy() {
    let tmp = tempdir().unwrap();
    let paths = ProjectPaths::init(tmp.path()).unwrap();
    let store = ArtifactStore::new(&paths);

    let mut artifact = sample_artifact("art_3");
    artifact.source = ArtifactSource::Url;
    artifact.payload_ref = "https://example.com/doc".to_string();

    let saved = store.put(artifact, None).unwrap();
    assert!(saved.payload_sha256.is_none());
    assert!(store.payload_path(&saved).is_none());
}
