//! Render code templates from a JSON Schema.
//!
//! A run reads a draft-04 JSON Schema, checks it against the meta-schema,
//! fabricates an example instance that satisfies it, and substitutes the
//! slug, the schema text and the example into a template:
//!
//! ```no_run
//! use crudilize::{Settings, StdoutSink, run};
//!
//! let mut settings = Settings::new("user");
//! settings.input = Some("user.schema.json".into());
//! settings.seed = Some(42);
//! run(&settings, std::io::stdin(), &mut StdoutSink).expect("render failed");
//! ```

pub mod cli;
mod error;
pub mod fabricate;
mod input;
pub mod json_pointer;
mod output;
mod pipeline;
mod settings;
pub mod template;
pub mod validate;

pub use error::{
    CrudilizeError, FabricationError, RenderError, SchemaValidationError, SchemaViolation,
    TemplateSyntaxError,
};
pub use input::{load_input, read_input};
pub use output::{FileSink, Sink, StdoutSink, write_output};
pub use pipeline::{Failed, Stage, run};
pub use settings::{Settings, check_slug};
