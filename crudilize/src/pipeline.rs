//! One crudilize run, stage by stage.
//!
//! Stages run strictly in order and each consumes the previous one's output:
//!
//! ```text
//! ParsingArgs -> LoadingTemplate -> LoadingInput -> Validating
//!     -> Fabricating -> Rendering -> Writing -> Done
//! ```
//!
//! The first error stops the run and is returned together with the stage it
//! happened in. Nothing is written unless every earlier stage succeeded.

use crate::error::CrudilizeError;
use crate::fabricate::fabricate;
use crate::input::load_input;
use crate::output::{FileSink, Sink, write_output};
use crate::settings::Settings;
use crate::template::{RenderContext, Template, cache};
use crate::validate::{SchemaDocument, lint, validate};
use serde_json::Value;
use std::error;
use std::fmt;
use std::io::Read;

/// Position of a run in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ParsingArgs,
    LoadingTemplate,
    LoadingInput,
    Validating,
    Fabricating,
    Rendering,
    Writing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &str = match self {
            Self::ParsingArgs => "parsing arguments",
            Self::LoadingTemplate => "loading template",
            Self::LoadingInput => "loading input",
            Self::Validating => "validating schema",
            Self::Fabricating => "fabricating example",
            Self::Rendering => "rendering template",
            Self::Writing => "writing output",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// A run that stopped at `stage`.
#[derive(Debug)]
pub struct Failed {
    pub stage: Stage,
    pub error: CrudilizeError,
}

impl Failed {
    fn at<E: Into<CrudilizeError>>(stage: Stage) -> impl FnOnce(E) -> Self {
        move |error| Self {
            stage,
            error: error.into(),
        }
    }
}

impl fmt::Display for Failed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl error::Error for Failed {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.error)
    }
}

fn enter(stage: Stage) -> Stage {
    tracing::debug!(%stage, "entering stage");
    stage
}

/// Runs the whole pipeline for `settings`.
///
/// `stdin` is read only when no input file is configured, and `stdout`
/// receives the output only when no output file is configured. The output
/// file is opened at the writing stage, so a failed run never truncates it.
///
/// # Errors
///
/// Returns the first error together with the stage that produced it.
pub fn run<R: Read>(settings: &Settings, stdin: R, stdout: &mut dyn Sink) -> Result<(), Failed> {
    let stage: Stage = enter(Stage::ParsingArgs);
    settings.check().map_err(Failed::at(stage))?;

    let stage: Stage = enter(Stage::LoadingTemplate);
    let template: Template =
        cache::load(&settings.template_source(), settings.rebuild_cache).map_err(Failed::at(stage))?;

    let stage: Stage = enter(Stage::LoadingInput);
    let text: String = load_input(settings.input.as_deref(), stdin).map_err(Failed::at(stage))?;

    let stage: Stage = enter(Stage::Validating);
    let document: SchemaDocument = validate(text).map_err(Failed::at(stage))?;
    for finding in lint(&document.value) {
        tracing::warn!(path = %finding.path, "{}", finding.message);
    }

    let stage: Stage = enter(Stage::Fabricating);
    let example: Value =
        fabricate(&document.value, &settings.fabricate_settings()).map_err(Failed::at(stage))?;
    let example_model: String = if settings.pretty {
        format!("{example:#}")
    } else {
        example.to_string()
    };

    let stage: Stage = enter(Stage::Rendering);
    let context = RenderContext::new(settings.slug.as_str(), document.text, example_model);
    let rendered: String = template.render(&context).map_err(Failed::at(stage))?;

    let stage: Stage = enter(Stage::Writing);
    match &settings.output {
        Some(path) => {
            let mut sink: FileSink = FileSink::create(path).map_err(Failed::at(stage))?;
            write_output(&rendered, &mut sink)
        }
        None => write_output(&rendered, stdout),
    }
    .map_err(Failed::at(stage))?;

    enter(Stage::Done);
    Ok(())
}
