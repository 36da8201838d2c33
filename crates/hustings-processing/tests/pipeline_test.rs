//! Ingest/evict lifecycle against a real storage root.

mod helpers;

use bytes::Bytes;
use helpers::fixtures::{create_test_gif, create_test_jpeg, create_test_png};
use helpers::storage::TestStorage;
use helpers::dir_entries;
use hustings_core::{sanitize_segment, MediaError};
use image::GenericImageView;

#[tokio::test]
async fn test_ingest_large_jpeg_into_flat_namespace() {
    let storage = TestStorage::new();
    let pipeline = storage.pipeline().await;

    let url = pipeline
        .ingest(
            Bytes::from(create_test_jpeg(3000, 1500)),
            "image/jpeg",
            "party",
            "logo_1",
        )
        .await
        .unwrap();

    assert_eq!(url, "http://localhost:5000/Uploads/party/logo_1.webp");

    let stored = image::open(storage.path("party/logo_1.webp")).unwrap();
    assert_eq!(stored.dimensions(), (2000, 1000));
    assert_eq!(dir_entries(&storage.path("party")), vec!["logo_1.webp"]);
}

#[tokio::test]
async fn test_ingest_png_and_gif_become_webp() {
    let storage = TestStorage::new();
    let pipeline = storage.pipeline().await;

    let png_url = pipeline
        .ingest(
            Bytes::from(create_test_png(120, 80)),
            "image/png",
            "candidateimages",
            "1700000000000_portrait.png",
        )
        .await
        .unwrap();
    assert!(png_url.ends_with("/Uploads/candidateimages/1700000000000_portrait.webp"));

    let gif_url = pipeline
        .ingest(
            Bytes::from(create_test_gif(16, 16)),
            "IMAGE/GIF",
            "candidateimages",
            "badge",
        )
        .await
        .unwrap();
    assert!(gif_url.ends_with("/candidateimages/badge.webp"));

    let small = image::open(storage.path("candidateimages/1700000000000_portrait.webp")).unwrap();
    assert_eq!(small.dimensions(), (120, 80));
}

#[tokio::test]
async fn test_unsupported_type_writes_nothing() {
    let storage = TestStorage::new();
    let pipeline = storage.pipeline().await;

    let err = pipeline
        .ingest(
            Bytes::from_static(b"%PDF-1.4"),
            "application/pdf",
            "voters/jane_doe",
            "manifesto",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, MediaError::UnsupportedType(_)));
    assert_eq!(err.error_code(), "UNSUPPORTED_TYPE");
    assert!(!storage.exists("voters"));
    assert!(dir_entries(&storage.root).is_empty());
}

#[tokio::test]
async fn test_corrupt_image_leaves_no_file() {
    let storage = TestStorage::new();
    let pipeline = storage.pipeline().await;

    let err = pipeline
        .ingest(
            Bytes::from_static(b"\xff\xd8\xff\xe0 truncated"),
            "image/jpeg",
            "party",
            "broken",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, MediaError::CompressionFailed(_)));
    assert!(dir_entries(&storage.path("party")).is_empty());
}

#[tokio::test]
async fn test_nested_namespace_gets_images_suffix_once() {
    let storage = TestStorage::new();
    let pipeline = storage.pipeline().await;
    let voter = sanitize_segment("Jane Doe");
    assert_eq!(voter, "jane_doe");

    let implicit = pipeline
        .ingest(
            Bytes::from(create_test_png(10, 10)),
            "image/png",
            &format!("voters/{}", voter),
            "voter_1",
        )
        .await
        .unwrap();
    let explicit = pipeline
        .ingest(
            Bytes::from(create_test_png(10, 10)),
            "image/png",
            &format!("voters/{}/images", voter),
            "voter_2",
        )
        .await
        .unwrap();

    assert_eq!(
        implicit,
        "http://localhost:5000/Uploads/voters/jane_doe/images/voter_1.webp"
    );
    assert_eq!(
        explicit,
        "http://localhost:5000/Uploads/voters/jane_doe/images/voter_2.webp"
    );
    assert_eq!(
        dir_entries(&storage.path("voters/jane_doe/images")),
        vec!["voter_1.webp", "voter_2.webp"]
    );
    assert!(!storage.exists("voters/jane_doe/images/images"));
}

#[tokio::test]
async fn test_url_filename_is_percent_encoded_and_evictable() {
    let storage = TestStorage::new();
    let pipeline = storage.pipeline().await;

    let url = pipeline
        .ingest(
            Bytes::from(create_test_png(8, 8)),
            "image/png",
            "party",
            "1700_my logo (final)",
        )
        .await
        .unwrap();
    assert_eq!(
        url,
        "http://localhost:5000/Uploads/party/1700_my%20logo%20(final).webp"
    );
    assert!(storage.exists("party/1700_my logo (final).webp"));

    let outcome = pipeline.evict(&url).await.unwrap();
    assert!(outcome.file_removed);
    assert!(!storage.exists("party/1700_my logo (final).webp"));
}

#[tokio::test]
async fn test_evict_round_trip_and_pruning_boundary() {
    let storage = TestStorage::new();
    let pipeline = storage.pipeline().await;

    let url = pipeline
        .ingest(
            Bytes::from(create_test_png(10, 10)),
            "image/png",
            "voters/jane_doe",
            "voter_1",
        )
        .await
        .unwrap();
    assert!(storage.exists("voters/jane_doe/images/voter_1.webp"));

    let outcome = pipeline.evict(&url).await.unwrap();
    assert!(outcome.file_removed);
    assert_eq!(outcome.pruned_dirs, 2);

    assert!(!storage.path("voters/jane_doe/images/voter_1.webp").exists());
    assert!(!storage.exists("voters/jane_doe"));
    assert!(storage.path("voters").is_dir());
}

#[tokio::test]
async fn test_evict_keeps_directories_with_remaining_assets() {
    let storage = TestStorage::new();
    let pipeline = storage.pipeline().await;

    let first = pipeline
        .ingest(Bytes::from(create_test_png(4, 4)), "image/png", "voters/ann", "a")
        .await
        .unwrap();
    let _second = pipeline
        .ingest(Bytes::from(create_test_png(4, 4)), "image/png", "voters/ann", "b")
        .await
        .unwrap();

    let outcome = pipeline.evict(&first).await.unwrap();
    assert_eq!(outcome.pruned_dirs, 0);
    assert_eq!(dir_entries(&storage.path("voters/ann/images")), vec!["b.webp"]);
}

#[tokio::test]
async fn test_evict_all_removes_record_assets() {
    let storage = TestStorage::new();
    let pipeline = storage.pipeline().await;

    let mut urls = Vec::new();
    for stem in ["voter_1", "voter_2"] {
        urls.push(
            pipeline
                .ingest(Bytes::from(create_test_png(4, 4)), "image/png", "voters/bob", stem)
                .await
                .unwrap(),
        );
    }
    urls.push(String::new());

    assert_eq!(pipeline.evict_all(&urls).await, 2);
    assert!(!storage.exists("voters/bob"));
    assert!(storage.path("voters").is_dir());
}

#[tokio::test]
async fn test_evict_already_removed_file_is_ok() {
    let storage = TestStorage::new();
    let pipeline = storage.pipeline().await;

    let url = pipeline
        .ingest(Bytes::from(create_test_png(4, 4)), "image/png", "party", "gone")
        .await
        .unwrap();
    std::fs::remove_file(storage.path("party/gone.webp")).unwrap();

    let outcome = pipeline.evict(&url).await.unwrap();
    assert!(!outcome.file_removed);
    assert!(storage.path("party").is_dir());
}

#[tokio::test]
async fn test_evict_never_fails() {
    let storage = TestStorage::new();
    let pipeline = storage.pipeline().await;

    assert!(pipeline.evict("").await.is_none());
    assert!(pipeline.evict("   ").await.is_none());
    assert!(pipeline
        .evict("http://localhost:5000/Uploads/../../etc/passwd")
        .await
        .is_none());
    assert!(pipeline.evict("not a url").await.is_none());
}

#[tokio::test]
async fn test_replace_ingests_then_evicts_old() {
    let storage = TestStorage::new();
    let pipeline = storage.pipeline().await;

    let old = pipeline
        .ingest(Bytes::from(create_test_png(4, 4)), "image/png", "party", "logo_old")
        .await
        .unwrap();

    let new = pipeline
        .replace(
            Some(&old),
            Bytes::from(create_test_png(6, 6)),
            "image/png",
            "party",
            "logo_new",
        )
        .await
        .unwrap();

    assert!(new.ends_with("/party/logo_new.webp"));
    assert_eq!(dir_entries(&storage.path("party")), vec!["logo_new.webp"]);
}

#[tokio::test]
async fn test_replace_keeps_old_asset_when_ingest_fails() {
    let storage = TestStorage::new();
    let pipeline = storage.pipeline().await;

    let old = pipeline
        .ingest(Bytes::from(create_test_png(4, 4)), "image/png", "party", "logo_old")
        .await
        .unwrap();

    let err = pipeline
        .replace(
            Some(&old),
            Bytes::from_static(b"garbage"),
            "image/png",
            "party",
            "logo_new",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, MediaError::CompressionFailed(_)));
    assert_eq!(dir_entries(&storage.path("party")), vec!["logo_old.webp"]);
}

#[tokio::test]
async fn test_replace_with_same_stem_overwrites_in_place() {
    let storage = TestStorage::new();
    let pipeline = storage.pipeline().await;

    let old = pipeline
        .ingest(Bytes::from(create_test_png(4, 4)), "image/png", "party", "logo")
        .await
        .unwrap();
    let new = pipeline
        .replace(
            Some(&old),
            Bytes::from(create_test_png(9, 9)),
            "image/png",
            "party",
            "logo",
        )
        .await
        .unwrap();

    assert_eq!(old, new);
    let stored = image::open(storage.path("party/logo.webp")).unwrap();
    assert_eq!(stored.dimensions(), (9, 9));
}

#[tokio::test]
async fn test_concurrent_ingest_into_same_namespace() {
    let storage = TestStorage::new();
    let pipeline = storage.pipeline().await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let pipeline = pipeline.clone();
        handles.push(tokio::spawn(async move {
            pipeline
                .ingest(
                    Bytes::from(create_test_png(4, 4)),
                    "image/png",
                    "voters/crowd",
                    &format!("voter_{}", i),
                )
                .await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(dir_entries(&storage.path("voters/crowd/images")).len(), 8);
}

#[tokio::test]
async fn test_invalid_namespace_rejected() {
    let storage = TestStorage::new();
    let pipeline = storage.pipeline().await;

    for namespace in ["", "/abs", "party/../x", "a//b"] {
        let err = pipeline
            .ingest(Bytes::from(create_test_png(4, 4)), "image/png", namespace, "x")
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidInput(_)), "{namespace}");
    }
    assert!(dir_entries(&storage.root).is_empty());
}

/// Image transcoder whose first call loses its output directory, as a racing evict would.
struct VanishingDirTranscoder {
    calls: std::sync::atomic::AtomicUsize,
}

#[async_trait::async_trait]
impl hustings_processing::Transcoder for VanishingDirTranscoder {
    fn family(&self) -> hustings_core::MediaFamily {
        hustings_core::MediaFamily::Image
    }

    async fn transcode(
        &self,
        data: Bytes,
        _content_type: &str,
        output: &std::path::Path,
    ) -> Result<(), MediaError> {
        use std::sync::atomic::Ordering;

        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            tokio::fs::remove_dir_all(output.parent().unwrap()).await.unwrap();
            return Err(MediaError::StorageUnavailable("output directory removed".into()));
        }
        tokio::fs::write(output, &data).await.unwrap();
        Ok(())
    }
}

#[tokio::test]
async fn test_ingest_resolves_again_when_namespace_dir_is_pruned() {
    use hustings_processing::{MediaPipeline, TranscodingEngine};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    let storage = TestStorage::new();
    let config = storage.config();
    let image = Arc::new(VanishingDirTranscoder {
        calls: std::sync::atomic::AtomicUsize::new(0),
    });
    let defaults = TranscodingEngine::from_config(&config);
    let engine = TranscodingEngine::new(
        image.clone(),
        defaults.transcoder_for(hustings_core::MediaFamily::Video).clone(),
        defaults.transcoder_for(hustings_core::MediaFamily::Audio).clone(),
    );
    let pipeline = MediaPipeline::new(
        hustings_storage::create_storage(&config).await.unwrap(),
        engine,
    );

    let url = pipeline
        .ingest(
            Bytes::from_static(b"pixels"),
            "image/png",
            "voters/ann",
            "portrait",
        )
        .await
        .unwrap();

    assert_eq!(image.calls.load(Ordering::SeqCst), 2);
    assert_eq!(url, "http://localhost:5000/Uploads/voters/ann/images/portrait.webp");
    assert_eq!(
        std::fs::read(storage.path("voters/ann/images/portrait.webp")).unwrap(),
        b"pixels"
    );
}
