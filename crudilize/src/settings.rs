//! Settings for a crudilize run.

use crate::error::CrudilizeError;
use crate::fabricate::FabricateSettings;
use crate::template::cache::TemplateSource;
use crate::template::is_identifier;
use std::path::PathBuf;

/// Everything one run needs, independent of how it was configured.
///
/// The binary builds this from command-line arguments; library callers can
/// construct it directly.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Identifier interpolated into the template. Must be a valid identifier.
    pub slug: String,

    /// Schema file. `None` reads standard input.
    pub input: Option<PathBuf>,

    /// Output file. `None` writes standard output.
    pub output: Option<PathBuf>,

    /// Template file. `None` uses the bundled template.
    pub template: Option<PathBuf>,

    /// Recompile the template even when a compiled artifact exists.
    pub rebuild_cache: bool,

    /// Seed for a reproducible example model.
    pub seed: Option<u64>,

    /// Pretty-print the example model instead of emitting compact JSON.
    pub pretty: bool,
}

impl Settings {
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns `CrudilizeError::Argument` if the slug is not an identifier.
    pub fn check(&self) -> Result<(), CrudilizeError> {
        check_slug(&self.slug).map(|_| ())
    }

    #[must_use]
    pub fn template_source(&self) -> TemplateSource {
        self.template
            .clone()
            .map_or(TemplateSource::Bundled, TemplateSource::File)
    }

    #[must_use]
    pub fn fabricate_settings(&self) -> FabricateSettings {
        FabricateSettings {
            seed: self.seed,
            ..FabricateSettings::default()
        }
    }
}

/// Accepts `slug` if it matches `[A-Za-z_$][A-Za-z0-9_$]*`.
///
/// # Errors
///
/// Returns `CrudilizeError::Argument` describing the problem otherwise.
pub fn check_slug(slug: &str) -> Result<String, CrudilizeError> {
    if slug.is_empty() {
        return Err(CrudilizeError::Argument("the slug must not be empty".to_string()));
    }
    if !is_identifier(slug) {
        return Err(CrudilizeError::Argument(format!(
            "the slug `{slug}` must start with a letter, `_` or `$` and contain only letters, digits, `_` or `$`"
        )));
    }
    Ok(slug.to_string())
}
