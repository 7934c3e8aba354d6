//! Command-line arguments.

use crate::settings::{Settings, check_slug};
use clap::{ArgAction, Parser, ValueHint};
use std::path::PathBuf;

/// Render a code template from a JSON Schema and a generated example
#[derive(Debug, Parser)]
#[command(name = "crudilize", version, about, long_about = None)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Object name interpolated into the template, e.g. `user`
    #[arg(value_name = "SLUG", value_parser = check_slug)]
    pub slug: String,

    /// JSON Schema file (default: stdin)
    #[arg(short = 'i', long = "in", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "out", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Template file (default: the bundled Express stub)
    #[arg(
        short,
        long,
        value_name = "PATH",
        value_hint = ValueHint::FilePath,
        env = "CRUDILIZE_TEMPLATE"
    )]
    pub template: Option<PathBuf>,

    /// Recompile the template and overwrite its `.compiled.json` cache
    #[arg(long)]
    pub rebuild_cache: bool,

    /// Seed for a reproducible example model
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Pretty-print the example model
    #[arg(long)]
    pub pretty: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

const AFTER_HELP: &str = "\
TEMPLATES:
  Placeholders are ${name}, <%= name %> (raw) and <%- name %> (HTML-escaped).
  Available names: slug, schema, exampleModel, slugPascal, slugCamel,
  slugSnake, slugKebab. Write \\${ for a literal ${.

  A compiled copy of the template is cached next to it as
  <template>.compiled.json and reused while it exists, even if the template
  changes. Delete it or pass --rebuild-cache after editing the template.

EXAMPLES:
  crudilize user < user.schema.json > user.js
  crudilize user --in user.schema.json --out user.js --seed 42
  crudilize order -t api.tpl -i order.json --rebuild-cache
";

impl Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    #[must_use]
    pub fn into_settings(self) -> Settings {
        Settings {
            slug: self.slug,
            input: self.input,
            output: self.output,
            template: self.template,
            rebuild_cache: self.rebuild_cache,
            seed: self.seed,
            pretty: self.pretty,
        }
    }
}
