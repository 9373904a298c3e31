//! End-to-end runs against temporary directories with fake models

use crate::config::Config;
use crate::embeddings::EmbeddingProvider;
use crate::error::OrganizeError;
use crate::extractor::{ExtractorRegistry, TextExtractor};
use crate::llm::{ChatModel, ChatRequest};
use crate::models::{RunStats, Strategy};
use crate::organizer::{ModelRegistry, OrganizeEvent, Orchestrator};
use anyhow::Result;
use chrono::{Local, TimeZone};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::SystemTime;
use tempfile::TempDir;

/// One axis per topic keyword
struct KeywordEmbeddings {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl EmbeddingProvider for KeywordEmbeddings {
    async fn compute_embedding(&self, content: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = content.to_lowercase();
        Ok(if text.contains("invoice") {
            vec![1.0, 0.0, 0.0]
        } else if text.contains("recipe") {
            vec![0.0, 1.0, 0.0]
        } else {
            vec![0.0, 0.0, 1.0]
        })
    }

    fn dimension(&self) -> usize {
        3
    }
}

/// Names a group after the topic found in the prompt
struct KeywordChat;

#[async_trait::async_trait]
impl ChatModel for KeywordChat {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let prompt = request.user.to_lowercase();
        Ok(if prompt.contains("invoice") {
            "Folder Name: \"Invoices\"".to_string()
        } else if prompt.contains("recipe") {
            "Recipes.".to_string()
        } else {
            "Documents".to_string()
        })
    }
}

fn fake_embeddings() -> Arc<KeywordEmbeddings> {
    Arc::new(KeywordEmbeddings {
        calls: AtomicUsize::new(0),
    })
}

fn config_without_model(dir: &Path) -> Config {
    let mut config = Config::default();
    config.naming.model_path = dir.join("absent.gguf").to_string_lossy().into_owned();
    config.naming.auto_download = false;
    config
}

fn ai_orchestrator(models_dir: &Path) -> Orchestrator {
    let config = config_without_model(models_dir);
    let models = ModelRegistry::with_models(&config, fake_embeddings(), Arc::new(KeywordChat));
    Orchestrator::new(config, models)
}

fn write(dir: &Path, name: &str, content: &[u8]) {
    fs::write(dir.join(name), content).unwrap();
}

fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn last_stats(events: &[OrganizeEvent]) -> RunStats {
    events
        .iter()
        .rev()
        .find_map(|e| match e {
            OrganizeEvent::Stats(s) => Some(*s),
            _ => None,
        })
        .unwrap()
}

fn assert_well_formed(events: &[OrganizeEvent]) {
    let mut last_progress = 0.0f32;
    for event in events {
        match event {
            OrganizeEvent::Progress(p) => {
                assert!((0.0..=1.0).contains(p), "progress out of range: {}", p);
                assert!(*p >= last_progress, "progress went backwards: {} < {}", p, last_progress);
                last_progress = *p;
            }
            OrganizeEvent::Stats(s) => assert!(s.processed <= s.total),
            _ => {}
        }
    }
    let terminals = events.iter().filter(|e| e.is_terminal()).count();
    assert_eq!(terminals, 1);
    assert!(events.last().unwrap().is_terminal());
}

#[tokio::test]
async fn test_by_extension_groups_case_insensitively() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "a.jpg", b"a");
    write(root, "b.JPG", b"b");
    write(root, "c.txt", b"c");

    let orchestrator = Orchestrator::new(Config::default(), ModelRegistry::from_config(&Config::default()));
    let events = orchestrator
        .start(root, Strategy::ByExtension)
        .unwrap()
        .collect()
        .await
        .unwrap();

    assert_well_formed(&events);
    assert_eq!(events.last(), Some(&OrganizeEvent::Finished));
    assert_eq!(names_in(root), vec!["jpg", "txt"]);
    assert_eq!(names_in(&root.join("jpg")), vec!["a.jpg", "b.JPG"]);
    assert_eq!(names_in(&root.join("txt")), vec!["c.txt"]);
    assert_eq!(
        last_stats(&events),
        RunStats {
            total: 3,
            processed: 3,
            groups: 2
        }
    );
    assert!(events.contains(&OrganizeEvent::Progress(1.0)));
}

#[tokio::test]
async fn test_by_extension_without_extension() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "Makefile", b"all:");

    let orchestrator = Orchestrator::new(Config::default(), ModelRegistry::from_config(&Config::default()));
    orchestrator
        .start(temp_dir.path(), Strategy::ByExtension)
        .unwrap()
        .collect()
        .await
        .unwrap();

    assert!(temp_dir.path().join("no_extension/Makefile").is_file());
}

#[tokio::test]
async fn test_by_date_groups_by_month() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let stamps = [
        ("march1.txt", Local.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()),
        ("march2.txt", Local.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap()),
        ("july.txt", Local.with_ymd_and_hms(2024, 7, 10, 12, 0, 0).unwrap()),
    ];
    for (name, when) in &stamps {
        write(root, name, b"x");
        let file = fs::File::options().write(true).open(root.join(name)).unwrap();
        file.set_modified(SystemTime::from(*when)).unwrap();
    }

    let orchestrator = Orchestrator::new(Config::default(), ModelRegistry::from_config(&Config::default()));
    let events = orchestrator
        .start(root, Strategy::ByDate)
        .unwrap()
        .collect()
        .await
        .unwrap();

    assert_well_formed(&events);
    assert_eq!(names_in(root), vec!["2024-03", "2024-07"]);
    assert_eq!(names_in(&root.join("2024-03")), vec!["march1.txt", "march2.txt"]);
    assert_eq!(last_stats(&events).groups, 2);
}

#[tokio::test]
async fn test_start_rejects_bad_targets() {
    let temp_dir = TempDir::new().unwrap();
    let orchestrator = Orchestrator::new(Config::default(), ModelRegistry::from_config(&Config::default()));

    let missing = orchestrator.start(temp_dir.path().join("gone"), Strategy::ByExtension);
    assert!(matches!(missing, Err(OrganizeError::InvalidTarget(_))));

    fs::create_dir(temp_dir.path().join("only_a_folder")).unwrap();
    let empty = orchestrator.start(temp_dir.path(), Strategy::ByExtension);
    assert!(matches!(empty, Err(OrganizeError::NoFiles)));
}

#[tokio::test]
async fn test_ai_pipeline_sorts_media_text_and_misc() {
    let temp_dir = TempDir::new().unwrap();
    let models_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "photo.png", b"\x89PNG");
    write(root, "song.mp3", b"ID3");
    write(root, "inv_march.txt", b"Invoice #1021\nAmount due: 420 EUR\nPayable within 30 days");
    write(root, "inv_april.md", b"INVOICE 1022 for consulting services, total 380 EUR");
    write(root, "soup.txt", b"Recipe: tomato soup. Simmer tomatoes with garlic and basil.");
    write(root, "cake.md", b"Grandma's recipe for lemon cake with two cups of flour");
    write(root, "empty.txt", b"   ");
    write(root, "blob.dat", &[0u8, 159, 146, 150, 0, 1, 2, 3, 4, 255, 0, 0, 9]);

    let events = ai_orchestrator(models_dir.path())
        .start(root, Strategy::ByAiCluster)
        .unwrap()
        .collect()
        .await
        .unwrap();

    assert_well_formed(&events);
    assert_eq!(events.last(), Some(&OrganizeEvent::Finished));
    assert_eq!(
        names_in(root),
        vec!["Audio", "Images", "Invoices", "Misc_Files", "Recipes"]
    );
    assert_eq!(names_in(&root.join("Images")), vec!["photo.png"]);
    assert_eq!(names_in(&root.join("Invoices")), vec!["inv_april.md", "inv_march.txt"]);
    assert_eq!(names_in(&root.join("Recipes")), vec!["cake.md", "soup.txt"]);
    assert_eq!(names_in(&root.join("Misc_Files")), vec!["blob.dat", "empty.txt"]);
    assert_eq!(
        last_stats(&events),
        RunStats {
            total: 8,
            processed: 8,
            groups: 5
        }
    );
    assert!(events.contains(&OrganizeEvent::Log("  • Identified 2 unique topics.".to_string())));
}

#[tokio::test]
async fn test_ai_pipeline_with_missing_model_touches_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let models_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "photo.jpg", b"jpeg");
    write(root, "notes.txt", b"Meeting notes about the quarterly roadmap");

    let config = config_without_model(models_dir.path());
    let embeddings = fake_embeddings();
    let models = ModelRegistry::from_config(&config).with_embedding_provider(embeddings.clone());
    let events = Orchestrator::new(config, models)
        .start(root, Strategy::ByAiCluster)
        .unwrap()
        .collect()
        .await
        .unwrap();

    assert_well_formed(&events);
    match events.last() {
        Some(OrganizeEvent::Failed(message)) => assert!(message.starts_with("Chat model missing")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(!events.contains(&OrganizeEvent::Finished));
    assert!(root.join("notes.txt").is_file());
    assert!(root.join("photo.jpg").is_file());
    assert_eq!(embeddings.calls.load(Ordering::SeqCst), 0);
}

/// Blocks on its first file until the test lets it go
struct HandshakeExtractor {
    reached: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl TextExtractor for HandshakeExtractor {
    fn name(&self) -> &'static str {
        "handshake"
    }

    fn extract(&self, _path: &Path) -> Result<String> {
        self.reached.lock().unwrap().send(())?;
        self.release.lock().unwrap().recv()?;
        Ok("Invoice text long enough to be embedded".to_string())
    }

    fn supports_extension(&self, ext: &str) -> bool {
        ext == "wait"
    }
}

#[tokio::test]
async fn test_stop_during_extraction() {
    let temp_dir = TempDir::new().unwrap();
    let models_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "a.png", b"png");
    write(root, "b.wait", b"first document");
    write(root, "c.txt", b"Invoice 77 for the garden work, 120 EUR");
    write(root, "d.txt", b"Recipe for pancakes with maple syrup");

    let (reached_tx, reached_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let mut extractors = ExtractorRegistry::new();
    extractors.register(Arc::new(HandshakeExtractor {
        reached: Mutex::new(reached_tx),
        release: Mutex::new(release_rx),
    }));

    let config = config_without_model(models_dir.path());
    let embeddings = fake_embeddings();
    let models = ModelRegistry::with_models(&config, embeddings.clone(), Arc::new(KeywordChat));
    let handle = Orchestrator::new(config, models)
        .with_extractors(extractors)
        .start(root, Strategy::ByAiCluster)
        .unwrap();

    tokio::task::spawn_blocking(move || reached_rx.recv())
        .await
        .unwrap()
        .unwrap();
    handle.stop();
    release_tx.send(()).unwrap();

    let events = handle.collect().await.unwrap();

    assert_well_formed(&events);
    assert_eq!(events.last(), Some(&OrganizeEvent::Stopped));
    assert!(!events.contains(&OrganizeEvent::Finished));
    // Moved before the stop, and left there
    assert!(root.join("Images/a.png").is_file());
    for name in ["b.wait", "c.txt", "d.txt"] {
        assert!(root.join(name).is_file(), "{} should not have moved", name);
    }
    assert_eq!(embeddings.calls.load(Ordering::SeqCst), 0);
    assert_eq!(last_stats(&events).processed, 1);
}

#[tokio::test]
async fn test_target_removed_during_run_fails() {
    let temp_dir = TempDir::new().unwrap();
    let models_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("target");
    fs::create_dir(&root).unwrap();
    write(&root, "a.wait", b"first document");
    write(&root, "b.txt", b"Invoice 78 for the roof repair, 900 EUR");
    write(&root, "c.txt", b"Recipe for waffles with whipped cream");

    let (reached_tx, reached_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let mut extractors = ExtractorRegistry::new();
    extractors.register(Arc::new(HandshakeExtractor {
        reached: Mutex::new(reached_tx),
        release: Mutex::new(release_rx),
    }));

    let config = config_without_model(models_dir.path());
    let models = ModelRegistry::with_models(&config, fake_embeddings(), Arc::new(KeywordChat));
    let handle = Orchestrator::new(config, models)
        .with_extractors(extractors)
        .start(&root, Strategy::ByAiCluster)
        .unwrap();

    tokio::task::spawn_blocking(move || reached_rx.recv())
        .await
        .unwrap()
        .unwrap();
    fs::remove_dir_all(&root).unwrap();
    release_tx.send(()).unwrap();

    let events = handle.collect().await.unwrap();

    assert_well_formed(&events);
    match events.last() {
        Some(OrganizeEvent::Failed(message)) => {
            assert!(message.contains("Target directory disappeared"), "{}", message)
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(!events.contains(&OrganizeEvent::Finished));
    assert!(!root.exists(), "target directory must not be recreated");
    assert_eq!(last_stats(&events).processed, 0);
}
