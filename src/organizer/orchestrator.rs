use crate::config::Config;
use crate::constants::{media_category, MIN_EXCERPT_CHARS, NO_EXTENSION_FOLDER};
use crate::error::OrganizeError;
use crate::extractor::ExtractorRegistry;
use crate::models::{FileEntry, Strategy};
use crate::organizer::{
    AgglomerativeClusterer, FileMover, FolderNamer, ModelRegistry, OrganizeEvent, Reporter,
    StopSignal,
};
use crate::scanner::scan_files;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Starts organize runs. Holds the models so they are loaded once and
/// reused across runs.
pub struct Orchestrator {
    config: Arc<Config>,
    models: Arc<ModelRegistry>,
    extractors: Arc<ExtractorRegistry>,
}

impl Orchestrator {
    pub fn new(config: Config, models: ModelRegistry) -> Self {
        Self {
            config: Arc::new(config),
            models: Arc::new(models),
            extractors: Arc::new(ExtractorRegistry::new()),
        }
    }

    pub fn with_extractors(mut self, extractors: ExtractorRegistry) -> Self {
        self.extractors = Arc::new(extractors);
        self
    }

    /// Validate `dir`, scan it and spawn the run on the tokio runtime.
    ///
    /// An inaccessible directory or one without files is rejected here and
    /// nothing is spawned.
    pub fn start(&self, dir: impl AsRef<Path>, strategy: Strategy) -> Result<RunHandle, OrganizeError> {
        let dir = dir.as_ref();
        let root = dir
            .canonicalize()
            .ok()
            .filter(|p| p.is_dir())
            .ok_or_else(|| OrganizeError::InvalidTarget(dir.to_path_buf()))?;
        std::fs::read_dir(&root).map_err(|_| OrganizeError::InvalidTarget(dir.to_path_buf()))?;

        let files = scan_files(&root);
        if files.is_empty() {
            return Err(OrganizeError::NoFiles);
        }

        let (tx, events) = mpsc::unbounded_channel();
        let stop = StopSignal::new();
        let run = Run {
            mover: FileMover::new(self.config.organizer.collision_suffix),
            reporter: Reporter::new(tx.clone(), files.len()),
            root,
            files,
            strategy,
            config: self.config.clone(),
            models: self.models.clone(),
            extractors: self.extractors.clone(),
            stop: stop.clone(),
        };

        // A panicking run still ends with a terminal event
        let task = tokio::spawn(async move {
            if let Err(e) = tokio::spawn(run.execute()).await {
                error!("Organize run aborted: {}", e);
                let _ = tx.send(OrganizeEvent::Failed(format!("Critical error: {}", e)));
            }
        });

        Ok(RunHandle { events, stop, task })
    }
}

/// Observer side of a running organize job
pub struct RunHandle {
    events: UnboundedReceiver<OrganizeEvent>,
    stop: StopSignal,
    task: JoinHandle<()>,
}

impl RunHandle {
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Ask the run to stop after the file it is working on
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Next event, or `None` once the run has ended and all events were read
    pub async fn next_event(&mut self) -> Option<OrganizeEvent> {
        self.events.recv().await
    }

    /// Wait for the worker to exit
    pub async fn wait(self) -> Result<()> {
        self.task.await.context("Organize task failed")
    }

    /// Drain every event and wait for the worker
    pub async fn collect(mut self) -> Result<Vec<OrganizeEvent>> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        self.wait().await?;
        Ok(events)
    }
}

/// State of one run, owned by the worker task
struct Run {
    root: PathBuf,
    files: Vec<FileEntry>,
    strategy: Strategy,
    config: Arc<Config>,
    models: Arc<ModelRegistry>,
    extractors: Arc<ExtractorRegistry>,
    mover: FileMover,
    reporter: Reporter,
    stop: StopSignal,
}

impl Run {
    async fn execute(mut self) {
        let total = self.files.len();
        self.reporter.stats();
        self.reporter
            .log(format!("Found {} files. Mode: '{}'", total, self.strategy));
        info!("Organizing {} ({} files, {})", self.root.display(), total, self.strategy);

        let result = match self.strategy {
            Strategy::ByExtension => self.by_extension(),
            Strategy::ByDate => self.by_date(),
            Strategy::ByAiCluster => self.by_ai_cluster().await,
        };

        match result {
            Ok(()) if self.stop.is_stopped() => {
                self.reporter.log("⏹️ Stopped. Files already moved stay where they are.");
                self.reporter.stopped();
            }
            Ok(()) => {
                self.reporter.log("✅ Task Completed.");
                self.reporter.finished();
            }
            Err(e) => {
                error!("Organize run failed: {:#}", e);
                let message = match e.downcast_ref::<OrganizeError>() {
                    Some(known) => known.to_string(),
                    None => format!("Critical error: {:#}", e),
                };
                self.reporter.failed(message);
            }
        }
    }

    /// Move one file into `<root>/<folder>` and count it.
    ///
    /// A failed move is a per-file warning, unless the target directory itself
    /// is gone, which ends the run.
    fn move_to_group(&mut self, file: &FileEntry, folder: &str) -> Result<()> {
        if !self.root.is_dir() {
            bail!("Target directory disappeared: {}", self.root.display());
        }
        match self.mover.move_into(&file.path, &self.root.join(folder)) {
            Ok(_) => {
                self.reporter.processed();
                self.reporter.group(folder);
                Ok(())
            }
            Err(e) if !self.root.is_dir() => {
                Err(e.context(format!("Target directory disappeared: {}", self.root.display())))
            }
            Err(e) => {
                self.reporter
                    .warn(format!("Error: could not move {}: {:#}", file.file_name(), e));
                Ok(())
            }
        }
    }

    /// Single pass shared by the extension and date strategies
    fn group_each<F>(&mut self, folder_for: F) -> Result<()>
    where
        F: Fn(&FileEntry) -> String,
    {
        let files = std::mem::take(&mut self.files);
        let total = files.len();

        for (i, file) in files.iter().enumerate() {
            if self.stop.is_stopped() {
                break;
            }
            self.move_to_group(file, &folder_for(file))?;
            self.reporter.progress((i + 1) as f32 / total as f32);
            self.reporter.stats();
        }
        Ok(())
    }

    fn by_extension(&mut self) -> Result<()> {
        self.group_each(|file| file.extension_or(NO_EXTENSION_FOLDER).to_string())
    }

    fn by_date(&mut self) -> Result<()> {
        self.group_each(|file| {
            DateTime::<Local>::from(file.modified)
                .format("%Y-%m")
                .to_string()
        })
    }

    /// Linear position inside a phase's slice of the progress bar
    fn phase_fraction(start: f32, end: f32, done: usize, count: usize) -> f32 {
        start + (end - start) * done as f32 / count.max(1) as f32
    }

    async fn by_ai_cluster(&mut self) -> Result<()> {
        let settings = self.config.organizer.clone();
        let models = self.models.clone();

        // Both models are loaded before any file moves
        let reporter = &self.reporter;
        if !models
            .ensure_chat_model(&self.stop, |line| reporter.log(line))
            .await?
        {
            return Ok(());
        }
        models.chat().await?;
        let embedder = models.embedder().await?;

        // Phase 1: media and binaries go straight to category folders
        self.reporter.log("📦 Phase 1: Sorting Binaries & Media...");
        let files = std::mem::take(&mut self.files);
        let total = files.len();
        let mut candidates = Vec::new();

        for (i, file) in files.into_iter().enumerate() {
            if self.stop.is_stopped() {
                return Ok(());
            }
            match file.extension.as_deref().and_then(media_category) {
                Some(category) => self.move_to_group(&file, category)?,
                None => candidates.push(file),
            }
            self.reporter
                .progress(Self::phase_fraction(0.0, settings.presort_end, i + 1, total));
            self.reporter.stats();
        }

        if candidates.is_empty() {
            return Ok(());
        }

        // Phase 2: text excerpts; files without usable text go to the misc folder
        self.reporter.log(format!(
            "🧠 Phase 2: AI Processing for {} documents...",
            candidates.len()
        ));
        let mut valid_files = Vec::new();
        let mut excerpts = Vec::new();

        for (i, file) in candidates.iter().enumerate() {
            if self.stop.is_stopped() {
                return Ok(());
            }
            let text = match self.extractors.try_excerpt(file).await {
                Ok(text) => text,
                Err(e) => {
                    self.reporter
                        .warn(format!("Could not read {}: {:#}", file.file_name(), e));
                    String::new()
                }
            };

            if text.trim().chars().count() >= MIN_EXCERPT_CHARS {
                valid_files.push(file.clone());
                excerpts.push(text);
            } else {
                self.move_to_group(file, &settings.misc_folder)?;
            }
            self.reporter.progress(Self::phase_fraction(
                settings.presort_end,
                settings.extraction_end,
                i + 1,
                candidates.len(),
            ));
            self.reporter.stats();
        }

        if valid_files.is_empty() {
            return Ok(());
        }

        // Phase 3: one vector per valid file, index-aligned
        self.reporter.log("  • Generating Semantic Vectors...");
        let mut vectors = Vec::with_capacity(excerpts.len());
        for (i, text) in excerpts.iter().enumerate() {
            if self.stop.is_stopped() {
                return Ok(());
            }
            vectors.push(embedder.embed(text).await);
            self.reporter.progress(Self::phase_fraction(
                settings.extraction_end,
                settings.embedding_end,
                i + 1,
                excerpts.len(),
            ));
        }

        // Phase 4: cluster, name, move
        self.reporter.log("  • Clustering content...");
        let clusterer = AgglomerativeClusterer::new(settings.distance_threshold);
        let count = vectors.len();
        let labels = tokio::task::spawn_blocking(move || clusterer.assign_labels(&vectors))
            .await
            .unwrap_or_else(|e| {
                error!("Clustering task failed: {}", e);
                vec![0; count]
            });

        let mut clusters: Vec<Vec<usize>> = Vec::new();
        for (idx, &label) in labels.iter().enumerate() {
            if clusters.len() <= label {
                clusters.resize_with(label + 1, Vec::new);
            }
            clusters[label].push(idx);
        }
        clusters.retain(|members| !members.is_empty());
        self.reporter
            .log(format!("  • Identified {} unique topics.", clusters.len()));

        let namer = FolderNamer::from_config(models.naming_config());
        for (ci, members) in clusters.iter().enumerate() {
            if self.stop.is_stopped() {
                return Ok(());
            }
            self.reporter
                .log(format!("  • Naming Group {}/{}...", ci + 1, clusters.len()));

            let cluster_files: Vec<FileEntry> = members.iter().map(|&i| valid_files[i].clone()).collect();
            let cluster_texts: Vec<String> = members.iter().map(|&i| excerpts[i].clone()).collect();
            let folder = namer.folder_name(&models, &cluster_files, &cluster_texts).await?;
            self.reporter
                .log(format!("    → {} ({} files)", folder, cluster_files.len()));

            for file in &cluster_files {
                if self.stop.is_stopped() {
                    return Ok(());
                }
                self.move_to_group(file, &folder)?;
            }

            self.reporter.progress(Self::phase_fraction(
                settings.embedding_end,
                1.0,
                ci + 1,
                clusters.len(),
            ));
            self.reporter.stats();
        }

        Ok(())
    }
}
