//! Template loading with an on-disk compiled artifact.
//!
//! The compiled token list of `<template>` is stored next to it as
//! `<template>.compiled.json`. When that file exists it is used as-is: the
//! source is not read and no staleness check is made. Edit a template, then
//! delete its artifact (or pass `--rebuild-cache`) to pick up the change.

use super::{Template, Token};
use crate::error::CrudilizeError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Suffix appended to the template file name to form the artifact path.
pub const CACHE_SUFFIX: &str = ".compiled.json";

const ARTIFACT_VERSION: u32 = 1;

/// Express API stub shipped with the binary.
pub const BUNDLED_TEMPLATE: &str = include_str!("../../templates/express.txt");

/// Where a template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// The built-in template; compiled in memory, never cached.
    Bundled,
    File(PathBuf),
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheArtifact {
    version: u32,
    tokens: Vec<Token>,
}

/// Path of the compiled artifact for `template`.
#[must_use]
pub fn cache_path(template: &Path) -> PathBuf {
    let mut name = template.as_os_str().to_owned();
    name.push(CACHE_SUFFIX);
    PathBuf::from(name)
}

/// Loads a template, preferring an existing compiled artifact.
///
/// With `rebuild` set the artifact is ignored and overwritten. Failing to
/// write the artifact is logged and otherwise ignored.
///
/// # Errors
///
/// Returns `CrudilizeError::Io` if the artifact or source cannot be read,
/// `CrudilizeError::CorruptCache` if the artifact cannot be decoded, and
/// `CrudilizeError::TemplateSyntax` if the source does not compile.
pub fn load(source: &TemplateSource, rebuild: bool) -> Result<Template, CrudilizeError> {
    let path: &Path = match source {
        TemplateSource::Bundled => {
            tracing::debug!("compiling bundled template");
            return Ok(Template::compile(BUNDLED_TEMPLATE)?);
        }
        TemplateSource::File(path) => path,
    };

    let artifact_path: PathBuf = cache_path(path);
    if !rebuild && artifact_path.exists() {
        tracing::debug!(path = %artifact_path.display(), "using cached template");
        return read_artifact(&artifact_path);
    }

    let text: String =
        fs::read_to_string(path).map_err(|e| CrudilizeError::io(path.display(), e))?;
    let template: Template = Template::compile(&text)?;
    tracing::debug!(path = %path.display(), tokens = template.tokens().len(), "compiled template");

    if let Err(error) = write_artifact(&artifact_path, &template) {
        tracing::warn!(
            path = %artifact_path.display(),
            %error,
            "could not write template cache; the next run will recompile"
        );
    }
    Ok(template)
}

fn read_artifact(path: &Path) -> Result<Template, CrudilizeError> {
    let text: String =
        fs::read_to_string(path).map_err(|e| CrudilizeError::io(path.display(), e))?;
    let corrupt = |reason: String| CrudilizeError::CorruptCache {
        path: path.display().to_string(),
        reason,
    };
    let artifact: CacheArtifact = serde_json::from_str(&text).map_err(|e| corrupt(e.to_string()))?;
    if artifact.version != ARTIFACT_VERSION {
        return Err(corrupt(format!(
            "unsupported artifact version {}",
            artifact.version
        )));
    }
    Ok(Template::from_tokens(artifact.tokens))
}

fn write_artifact(path: &Path, template: &Template) -> io::Result<()> {
    let artifact = CacheArtifact {
        version: ARTIFACT_VERSION,
        tokens: template.tokens().to_vec(),
    };
    let json: String = serde_json::to_string(&artifact)?;
    fs::write(path, json)
}
