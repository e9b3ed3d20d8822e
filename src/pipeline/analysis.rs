// The analysis orchestrator.
//
// One call runs one request from archive to report:
//   stage archive -> extract PDFs -> clean -> vectorize -> fit -> metrics
//   -> identifier lookups
//
// The staging area belongs to the async frame of the run, not to the blocking
// task, so the temporary files go away as soon as the run ends: on success,
// on error, and when the deadline drops the run while the blocking task is
// still busy. The whole run sits under `tokio::time::timeout`; on expiry the
// blocking task is told to stop at its next stage boundary.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rayon::prelude::*;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use super::options::AnalysisOptions;
use super::report::AnalysisReport;
use super::stage::{Stage, StageObserver, StageReporter};
use crate::config::Config;
use crate::documents::archive::StagingArea;
use crate::documents::extractor::TextExtractor;
use crate::documents::metadata::DocumentMetadata;
use crate::documents::{CleaningPolicy, Corpus, CorpusDocument};
use crate::error::AnalysisError;
use crate::lookup::{self, IdentifierLookup, PaperQuery};
use crate::metrics::{self, TopPaperEntry};
use crate::topics::lda::LdaTrainer;
use crate::topics::traits::TopicModelTrainer;
use crate::topics::vocabulary::VocabularyBuilder;

/// Where the uploaded archive comes from.
enum ArchiveSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl ArchiveSource {
    fn stage(self, parent: &Path) -> Result<StagingArea, AnalysisError> {
        match self {
            ArchiveSource::Bytes(bytes) => StagingArea::from_bytes_in(&bytes, parent),
            ArchiveSource::Path(path) => StagingArea::from_path_in(&path, parent),
        }
    }
}

/// Output of the blocking half of a run.
struct Computed {
    report: AnalysisReport,
    /// Metadata of corpus documents, indexed like `TopPaperEntry::document_index`.
    metadata: Vec<DocumentMetadata>,
}

/// Runs analyses. Holds no per-request state, so one instance can serve
/// any number of concurrent requests.
#[derive(Clone)]
pub struct Pipeline {
    config: Config,
    trainer: Arc<dyn TopicModelTrainer>,
    lookup: Arc<dyn IdentifierLookup>,
    extractor: TextExtractor,
}

impl Pipeline {
    pub fn new(
        config: Config,
        trainer: Arc<dyn TopicModelTrainer>,
        lookup: Arc<dyn IdentifierLookup>,
    ) -> Self {
        Self {
            config,
            trainer,
            lookup,
            extractor: TextExtractor,
        }
    }

    /// The default pipeline: seeded LDA plus whatever lookup the config enables.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let trainer = Arc::new(LdaTrainer::new(config.seed, config.max_iter));
        let lookup = lookup::from_config(&config)?;
        Ok(Self::new(config, trainer, lookup))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyze an in-memory zip archive (e.g. an upload).
    pub async fn analyze_bytes(
        &self,
        archive: Vec<u8>,
        options: &AnalysisOptions,
        observer: Option<StageObserver>,
    ) -> Result<AnalysisReport, AnalysisError> {
        self.analyze(ArchiveSource::Bytes(archive), options, observer)
            .await
    }

    /// Analyze a zip archive on disk.
    pub async fn analyze_path(
        &self,
        archive: &Path,
        options: &AnalysisOptions,
        observer: Option<StageObserver>,
    ) -> Result<AnalysisReport, AnalysisError> {
        self.analyze(ArchiveSource::Path(archive.to_path_buf()), options, observer)
            .await
    }

    async fn analyze(
        &self,
        source: ArchiveSource,
        options: &AnalysisOptions,
        observer: Option<StageObserver>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let reporter = StageReporter::new(observer);
        reporter.enter(Stage::Idle);

        // Bad parameters are rejected before any file is touched.
        if let Err(e) = options.validate().and_then(|()| self.check_limits(options)) {
            reporter.enter(Stage::Failed);
            return Err(e);
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let run = self.run(source, options.clone(), reporter.clone(), Arc::clone(&cancelled));
        let result = match tokio::time::timeout(Duration::from_secs(self.config.timeout_secs), run).await {
            Ok(result) => result,
            Err(_) => {
                cancelled.store(true, Ordering::Relaxed);
                Err(AnalysisError::TimedOut(self.config.timeout_secs))
            }
        };

        match &result {
            Ok(report) => {
                reporter.enter(Stage::Done);
                info!(
                    documents = report.num_pdfs,
                    topics = report.num_topics,
                    skipped = report.skipped_documents,
                    "Analysis complete"
                );
            }
            Err(e) => {
                reporter.enter(Stage::Failed);
                warn!(kind = e.kind(), error = %e, "Analysis failed");
            }
        }
        result
    }

    /// Server-side limits on top of `AnalysisOptions::validate`.
    fn check_limits(&self, options: &AnalysisOptions) -> Result<(), AnalysisError> {
        if options.num_topics > self.config.max_topics {
            return Err(AnalysisError::invalid(
                "numTopics",
                format!(
                    "{} exceeds the maximum of {}",
                    options.num_topics, self.config.max_topics
                ),
            ));
        }
        Ok(())
    }

    async fn run(
        &self,
        source: ArchiveSource,
        options: AnalysisOptions,
        reporter: StageReporter,
        cancelled: Arc<AtomicBool>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let staging_dir = self.config.staging_dir.clone();
        let staging = tokio::task::spawn_blocking(move || source.stage(&staging_dir))
            .await
            .map_err(join_failure)??;
        info!(pdfs = staging.pdf_count(), "Archive staged");
        let paths = staging.pdf_paths()?;

        let config = self.config.clone();
        let trainer = Arc::clone(&self.trainer);
        let extractor = self.extractor;
        let computed = tokio::task::spawn_blocking(move || {
            compute(paths, &config, trainer.as_ref(), extractor, &options, &reporter, &cancelled)
        })
        .await
        .map_err(join_failure)??;
        drop(staging);

        let Computed {
            mut report,
            metadata,
        } = computed;
        attach_identifiers(self.lookup.as_ref(), &mut report.top_papers, &metadata).await;
        Ok(report)
    }
}

fn join_failure(e: JoinError) -> AnalysisError {
    if e.is_cancelled() {
        AnalysisError::Cancelled
    } else {
        AnalysisError::TaskFailed(e.to_string())
    }
}

fn checkpoint(cancelled: &AtomicBool) -> Result<(), AnalysisError> {
    if cancelled.load(Ordering::Relaxed) {
        Err(AnalysisError::Cancelled)
    } else {
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The synchronous body of a run, from extraction through metrics.
fn compute(
    paths: Vec<PathBuf>,
    config: &Config,
    trainer: &dyn TopicModelTrainer,
    extractor: TextExtractor,
    options: &AnalysisOptions,
    reporter: &StageReporter,
    cancelled: &AtomicBool,
) -> Result<Computed, AnalysisError> {
    checkpoint(cancelled)?;
    reporter.enter(Stage::Extracting);
    // par_iter + collect keeps the walk order, so row indices stay deterministic
    let extracted: Vec<(String, String)> = paths
        .par_iter()
        .map(|path| (file_name(path), extractor.extract_file(path)))
        .collect();

    checkpoint(cancelled)?;
    reporter.enter(Stage::Cleaning);
    let policy = CleaningPolicy::from_skip_bibliography(options.skip_bibliography);
    let cleaned: Vec<(String, String)> = extracted
        .into_par_iter()
        .map(|(name, raw)| {
            let text = if raw.trim().is_empty() {
                String::new()
            } else {
                policy.apply(&raw)
            };
            (name, text)
        })
        .collect();

    let mut skipped = 0;
    let mut documents = Vec::with_capacity(cleaned.len());
    for (file_name, cleaned_text) in cleaned {
        if cleaned_text.trim().is_empty() {
            warn!(file = %file_name, "No text extracted, skipping document");
            skipped += 1;
            continue;
        }
        let metadata = DocumentMetadata::parse(&file_name);
        if metadata.year.is_none() {
            debug!(file = %file_name, "File name doesn't follow 'author - year - title.pdf'");
        }
        documents.push(CorpusDocument {
            file_name,
            cleaned_text,
            metadata,
        });
    }
    let corpus = Corpus::new(documents);
    if corpus.is_empty() {
        return Err(AnalysisError::NoValidText);
    }

    checkpoint(cancelled)?;
    reporter.enter(Stage::Vectorizing);
    let builder = VocabularyBuilder::new(&options.additional_stopwords, config.max_df, config.min_df);
    let (vocabulary, matrix) = builder.build(&corpus.texts())?;

    checkpoint(cancelled)?;
    reporter.enter(Stage::Fitting);
    let model = trainer.fit(&matrix, options.num_topics)?;
    let components = model.components();
    if components.is_empty() {
        return Err(AnalysisError::ModelTrainingFailed);
    }
    let doc_topic = model.transform(&matrix);
    let score = model.score(&matrix);
    let perplexity = model.perplexity(&matrix);

    checkpoint(cancelled)?;
    reporter.enter(Stage::Summarizing);
    let metadata = corpus.metadata();
    let years = corpus.years();
    let decade_distribution = options
        .include_decade_analysis
        .then(|| metrics::group_by_decades(&years, &doc_topic));

    let generated_at = Utc::now();
    let report = AnalysisReport {
        topics: metrics::summarize_topics(components, vocabulary.feature_names(), options.num_words),
        num_words: options.num_words,
        num_pdfs: corpus.len(),
        num_topics: model.num_topics(),
        time_period: metrics::time_period(&years),
        model_loss: -score,
        perplexity,
        average_lift_per_topic: metrics::average_lift_per_topic(components),
        top_papers: metrics::top_papers(&doc_topic, &metadata, options.num_top_papers),
        num_top_papers: options.num_top_papers,
        decade_distribution,
        additional_stopwords: options.additional_stopwords.clone(),
        vectorizer_params: builder.report(),
        cleaning: policy,
        skipped_documents: skipped,
        cache_id: generated_at.timestamp(),
        generated_at,
    };

    Ok(Computed {
        report,
        metadata: metadata.into_iter().cloned().collect(),
    })
}

/// Fill in external identifiers for every ranked paper.
///
/// A document ranked under several topics is looked up once. Lookup errors
/// leave the identifier absent.
async fn attach_identifiers(
    lookup: &dyn IdentifierLookup,
    top_papers: &mut BTreeMap<usize, Vec<TopPaperEntry>>,
    metadata: &[DocumentMetadata],
) {
    let mut cache: HashMap<usize, Option<String>> = HashMap::new();

    for entry in top_papers.values_mut().flatten() {
        let index = entry.document_index;
        if let Some(cached) = cache.get(&index) {
            entry.pubmed_id = cached.clone();
            continue;
        }

        let query = metadata.get(index).and_then(PaperQuery::from_metadata);
        let id = match query {
            Some(query) => match lookup.lookup(&query).await {
                Ok(id) => id,
                Err(e) => {
                    debug!(title = %query.title, error = %e, "Identifier lookup failed");
                    None
                }
            },
            None => None,
        };
        entry.pubmed_id = id.clone();
        cache.insert(index, id);
    }
}
