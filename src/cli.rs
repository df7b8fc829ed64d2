//! Minimal CLI: catalog files → (schema | tool)
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use type_schema::{Catalog, DeriveOptions, Deriver, ToolSpecification, TypeRef};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// derive JSON schemas from type catalog files
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the schema of one catalog type
    Schema(SchemaOut),
    /// print a tool specification whose parameters are one catalog type
    Tool(ToolOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more catalog files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// type to derive
    #[arg(long)]
    root: String,

    /// maximum schema nesting depth
    #[arg(long, default_value_t = type_schema::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// allow self-containing types (fails on the depth limit instead)
    #[arg(long, default_value_t = false)]
    no_cycle_check: bool,
}

#[derive(Args, Debug, Clone)]
struct OutputSettings {
    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    output_settings: OutputSettings,

    /// description for the root schema, replacing the type's own
    #[arg(long)]
    description: Option<String>,
}

#[derive(clap::Parser, Debug)]
struct ToolOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    output_settings: OutputSettings,

    /// tool name
    #[arg(long)]
    name: String,

    /// tool description
    #[arg(long)]
    description: Option<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_catalog(&self) -> anyhow::Result<Catalog> {
        let mut catalog = Catalog::with_builtins();
        let count = catalog
            .load_patterns(&self.input)
            .context("failed to load type catalog")?;
        tracing::info!(count, total = catalog.len(), "catalog ready");
        Ok(catalog)
    }

    fn options(&self) -> DeriveOptions {
        DeriveOptions {
            max_depth: self.max_depth,
            detect_cycles: !self.no_cycle_check,
        }
    }

    fn root(&self) -> TypeRef {
        TypeRef::named(self.root.as_str())
    }
}

impl OutputSettings {
    fn emit<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let source = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        match self.out.as_ref() {
            Some(out) => {
                if let Some(parent) = out.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                std::fs::write(out, &source)
                    .with_context(|| format!("failed to write {}", out.display()))?;
            }
            None => println!("{source}"),
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Schema(target) => {
                let input = &target.input_settings;
                let catalog = input.load_catalog()?;
                let deriver = Deriver::new(&catalog).with_options(input.options());
                let schema = deriver
                    .derive_schema(&input.root(), &[], target.description.as_deref())
                    .with_context(|| format!("failed to derive schema for `{}`", input.root))?;
                target.output_settings.emit(&schema)
            }
            Command::Tool(target) => {
                let input = &target.input_settings;
                let catalog = input.load_catalog()?;
                let deriver = Deriver::new(&catalog).with_options(input.options());
                let tool = ToolSpecification::derive(
                    &deriver,
                    target.name.as_str(),
                    target.description.clone(),
                    &input.root(),
                )
                .with_context(|| format!("failed to derive parameters from `{}`", input.root))?;
                target.output_settings.emit(&tool)
            }
        }
    }
}
