//! The table of registered tag definitions.
//!
//! A [`RegistryBuilder`] collects definitions in order; [`RegistryBuilder::build`]
//! freezes them into a [`Registry`], which is immutable and `Send + Sync` so
//! any number of threads can parse against it without locking.
//!
//! Registration order matters: when two definitions of equal standing match
//! at the same position, the one registered first wins. Nothing is
//! de-duplicated by name; registering a tag twice simply adds a second
//! candidate.
//!
//! # Process-wide registry
//!
//! Applications that want a single shared table call [`init`] once at
//! startup. Later calls are no-ops that return the table built the first
//! time.
//!
//! ```
//! use tagmark::{registry, TagDefinition};
//!
//! let table = registry::init(|builder| {
//!     builder.register(TagDefinition::paired("b", r"\[b\]", r"\[/b\]").build()?);
//!     Ok(())
//! })
//! .unwrap();
//!
//! assert!(registry::global().is_some());
//! assert_eq!(table.len(), registry::global().unwrap().len());
//! ```

use std::sync::Arc;

use once_cell::sync::OnceCell;
use regex::RegexSet;

use crate::definition::TagDefinition;
use crate::error::{Result, TagmarkError};

static GLOBAL: OnceCell<Registry> = OnceCell::new();

/// Initializes the process-wide registry exactly once.
///
/// `setup` runs only on the first successful call; every later call returns
/// the already-frozen registry. A failing `setup` leaves the registry
/// uninitialized so a corrected call can still succeed.
pub fn init<F>(setup: F) -> Result<&'static Registry>
where
    F: FnOnce(&mut RegistryBuilder) -> Result<()>,
{
    GLOBAL.get_or_try_init(|| {
        let mut builder = RegistryBuilder::new();
        setup(&mut builder)?;
        builder.build()
    })
}

/// The process-wide registry, if [`init`] has run.
pub fn global() -> Option<&'static Registry> {
    GLOBAL.get()
}

/// Collects tag definitions before freezing them.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    definitions: Vec<TagDefinition>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a definition after every previously registered one.
    pub fn register(&mut self, definition: TagDefinition) -> &mut Self {
        self.definitions.push(definition);
        self
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Freezes the definitions and compiles the open-pattern prefilter.
    pub fn build(self) -> Result<Registry> {
        let prefilter = RegexSet::new(
            self.definitions
                .iter()
                .map(|definition| definition.open_anchored().as_str()),
        )
        .map_err(TagmarkError::Prefilter)?;

        tracing::debug!(
            definitions = self.definitions.len(),
            names = ?self.definitions.iter().map(TagDefinition::name).collect::<Vec<_>>(),
            "tag registry built"
        );

        Ok(Registry {
            inner: Arc::new(RegistryInner {
                definitions: self.definitions.into_iter().map(Arc::new).collect(),
                prefilter,
            }),
        })
    }
}

#[derive(Debug)]
struct RegistryInner {
    definitions: Vec<Arc<TagDefinition>>,
    prefilter: RegexSet,
}

/// A frozen, cheaply clonable table of tag definitions.
#[derive(Debug, Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// All definitions in registration order.
    pub fn all(&self) -> &[Arc<TagDefinition>] {
        &self.inner.definitions
    }

    pub fn get(&self, index: usize) -> Option<&Arc<TagDefinition>> {
        self.inner.definitions.get(index)
    }

    /// Definitions registered under `name`, in registration order.
    pub fn named<'r>(&'r self, name: &'r str) -> impl Iterator<Item = &'r Arc<TagDefinition>> + 'r {
        self.inner
            .definitions
            .iter()
            .filter(move |definition| definition.name() == name)
    }

    pub fn len(&self) -> usize {
        self.inner.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.definitions.is_empty()
    }

    /// Indices of definitions whose open pattern matches at the start of
    /// `haystack`, in registration order.
    pub(crate) fn candidates(&self, haystack: &str) -> Vec<usize> {
        self.inner.prefilter.matches(haystack).into_iter().collect()
    }
}
