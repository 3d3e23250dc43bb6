//! Load-or-build orchestration
//!
//! [`CollectionLoader::handle`] loads an existing artifact as-is unless a
//! rebuild is forced; otherwise it runs discovery, extraction, sequencing
//! and merging, then persists the result.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::cache::CacheFile;
use crate::error::CollectError;
use crate::graph::{
    Collision, DeclaredRegistry, DependencyExtractor, DependencyGraph, Sequence, Sequencer,
    UnitScanner, DEFAULT_RETRY_BUDGET,
};
use crate::introspect::{InternalTypes, SourceIntrospector, TypeIntrospector};
use crate::merge::{MergeEmitter, SourceRewriter};
use crate::source::{EntryWalker, FsWalker, Identity, UnitIdentifier};

/// Resolved loader settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub cache_path: PathBuf,
    pub reload: bool,
    pub strip_comments: bool,
    pub roots: Vec<PathBuf>,
    pub extensions: Vec<String>,
    /// Runtime-provided type names beyond the builtin list
    pub internal: Vec<String>,
    pub retry_budget: u32,
}

impl LoaderConfig {
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
            reload: false,
            strip_comments: true,
            roots: Vec::new(),
            extensions: vec!["php".to_string()],
            internal: Vec::new(),
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    pub fn with_reload(mut self, reload: bool) -> Self {
        self.reload = reload;
        self
    }

    pub fn with_strip_comments(mut self, strip_comments: bool) -> Self {
        self.strip_comments = strip_comments;
        self
    }
}

/// Sequenced graph, before anything is written.
#[derive(Debug, Clone)]
pub struct Plan {
    pub graph: DependencyGraph,
    pub sequence: Sequence,
    pub collisions: Vec<Collision>,
}

/// Summary of a completed build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub units: usize,
    pub sequence: Sequence,
    pub collisions: Vec<Collision>,
    pub blocks: usize,
    pub path: PathBuf,
}

impl BuildReport {
    pub fn circular(&self) -> impl Iterator<Item = &Identity> {
        self.sequence.circular.iter()
    }

    pub fn requeues(&self) -> usize {
        self.sequence.requeues
    }
}

/// What [`CollectionLoader::handle`] did.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// An existing artifact was used as-is
    Loaded { path: PathBuf, content: String },
    /// The pipeline ran and wrote a fresh artifact
    Built(BuildReport),
}

/// Runs the bundling pipeline for one configuration.
pub struct CollectionLoader {
    config: LoaderConfig,
    declared: DeclaredRegistry,
    introspector: Option<Box<dyn TypeIntrospector>>,
    walker: Box<dyn EntryWalker>,
}

impl CollectionLoader {
    /// `declared` is the host's snapshot of known identities; it is not
    /// consulted again after construction.
    pub fn new(config: LoaderConfig, declared: DeclaredRegistry) -> Self {
        Self {
            config,
            declared,
            introspector: None,
            walker: Box::new(FsWalker::default()),
        }
    }

    /// Replace the default source-backed introspection.
    pub fn with_introspector(mut self, introspector: Box<dyn TypeIntrospector>) -> Self {
        self.introspector = Some(introspector);
        self
    }

    pub fn with_walker(mut self, walker: Box<dyn EntryWalker>) -> Self {
        self.walker = walker;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn cache(&self) -> CacheFile {
        CacheFile::new(&self.config.cache_path)
    }

    /// Load the artifact, or build and persist it.
    pub fn handle(&self) -> Result<Outcome, CollectError> {
        let cache = self.cache();

        if cache.exists() && !self.config.reload {
            info!(path = %cache.path().display(), "cache artifact present, skipping build");
            let content = cache.load()?;
            return Ok(Outcome::Loaded {
                path: cache.path().to_path_buf(),
                content,
            });
        }

        let plan = self.order()?;
        let emitter = MergeEmitter::new(SourceRewriter::new(self.config.strip_comments));
        let document = emitter.emit(&plan.graph, &plan.sequence);
        cache.write(&document.render())?;

        Ok(Outcome::Built(BuildReport {
            units: plan.graph.len(),
            sequence: plan.sequence,
            collisions: plan.collisions,
            blocks: document.blocks.len(),
            path: cache.path().to_path_buf(),
        }))
    }

    /// Discover, extract and sequence without writing anything.
    pub fn order(&self) -> Result<Plan, CollectError> {
        let identifier = UnitIdentifier::new(self.config.extensions.clone());
        let scanner = UnitScanner::new(&identifier, self.walker.as_ref(), &self.declared);
        let mut discovery = scanner.scan(&self.config.roots)?;
        let collisions = std::mem::take(&mut discovery.collisions);
        debug!(units = discovery.len(), "discovery complete");

        let fallback;
        let introspector: &dyn TypeIntrospector = match &self.introspector {
            Some(custom) => custom.as_ref(),
            None => {
                fallback = SourceIntrospector::from_units(
                    discovery.units(),
                    InternalTypes::with_builtins(&self.config.internal),
                );
                &fallback
            }
        };

        let extractor = DependencyExtractor::new(introspector, &self.declared);
        let graph = DependencyGraph::build(discovery, &extractor);
        let sequence = Sequencer::new()
            .with_retry_budget(self.config.retry_budget)
            .sequence(&graph);

        info!(
            units = graph.len(),
            circular = sequence.circular.len(),
            requeues = sequence.requeues,
            "sequenced units"
        );

        Ok(Plan {
            graph,
            sequence,
            collisions,
        })
    }
}
