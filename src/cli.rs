//! CLI: descriptor (+ value) → (html | validation report)
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::Value;

use struct_form::logging::{init_logging, LogConfig};
use struct_form::{descriptor, Auto, FormOpts, KindOptions, Options, Settings, Ty, Validation};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// build forms from JSON type descriptors, render them headlessly or validate values against them
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// debug-level logging (overridden by RUST_LOG)
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// build the root input for a descriptor and print its HTML
    Render(RenderOut),
    /// validate one or more JSON values against a descriptor
    Validate(ValidateOut),
}

#[derive(Args, Debug, Clone)]
struct TypeSettings {
    /// JSON type descriptor file
    #[arg(long = "type", short = 't')]
    type_path: PathBuf,
}

#[derive(clap::Parser, Debug)]
struct RenderOut {
    #[command(flatten)]
    type_settings: TypeSettings,

    /// initial value (.json file)
    #[arg(long)]
    value: Option<PathBuf>,

    /// settings file (registry overrides, optional text)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// label / placeholder synthesis, when the root is a form
    #[arg(long, value_enum)]
    auto: Option<AutoArg>,

    /// root label
    #[arg(long)]
    label: Option<String>,

    /// output .html file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ValidateOut {
    #[command(flatten)]
    type_settings: TypeSettings,

    /// One or more value files. May be literal paths or quoted glob patterns
    #[arg(long, num_args = 1.., required = true)]
    value: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum AutoArg {
    None,
    Placeholders,
    Labels,
}

impl From<AutoArg> for Auto {
    fn from(a: AutoArg) -> Self {
        match a {
            AutoArg::None => Auto::None,
            AutoArg::Placeholders => Auto::Placeholders,
            AutoArg::Labels => Auto::Labels,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeSettings {
    fn load(&self) -> Result<Ty> {
        descriptor::load(&self.type_path)
            .with_context(|| format!("failed to load type descriptor {}", self.type_path.display()))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<ExitCode> {
        init_logging(LogConfig { verbose: self.verbose, ansi: std::io::stderr().is_terminal() })?;
        match &self.cmd {
            Command::Render(target) => target.run(),
            Command::Validate(target) => target.run(),
        }
    }
}

impl RenderOut {
    fn run(&self) -> Result<ExitCode> {
        let ty = self.type_settings.load()?;
        let settings = match &self.settings {
            Some(path) => Settings::load(path)
                .with_context(|| format!("failed to load settings {}", path.display()))?,
            None => Settings::default(),
        };

        let factory = settings.inputs.resolve(&ty);
        let mut options = Options::new();
        if let Some(path) = &self.value {
            options.value = Some(read_json(path)?);
        }
        if let Some(label) = &self.label {
            options.label = Some(label.as_str().into());
        }
        if let Some(auto) = self.auto {
            if ty.fields().is_none() {
                bail!("--auto only applies to product types, `{}` is not one", ty.name());
            }
            options.kind = KindOptions::Form(FormOpts { auto: Some(auto.into()), ..Default::default() });
        }

        let class = factory
            .build(&ty, options, &settings)
            .with_context(|| format!("failed to build {} input for `{}`", factory.name(), ty.name()))?;
        let html = class.mount(None).render().to_html();

        if let Some(out) = self.out.as_ref() {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, &html).with_context(|| format!("failed to write {}", out.display()))?;
        } else {
            println!("{html}");
        }
        Ok(ExitCode::SUCCESS)
    }
}

impl ValidateOut {
    fn run(&self) -> Result<ExitCode> {
        let ty = self.type_settings.load()?;
        let mut failures = 0usize;
        for path in resolve_file_path_patterns(&self.value)? {
            let value = read_json(&path)?;
            let label = path.display().to_string();
            match struct_form::validate(&value, &ty) {
                Validation::Valid(value) => {
                    eprintln!("{} {}", "✓".green().bold(), label.bold());
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                Validation::Invalid(errors) => {
                    failures += 1;
                    eprintln!("{} {} ({} violations)", "✗".red().bold(), label.bold(), errors.len());
                    for error in errors.iter() {
                        eprintln!("  {} {}", error.pointer().yellow(), error.message);
                    }
                }
            }
        }
        Ok(if failures == 0 { ExitCode::SUCCESS } else { ExitCode::from(1) })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn read_json(path: &Path) -> Result<Value> {
    let source = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("failed to parse JSON file {}", path.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if has_glob_chars(pattern) {
            let before = out.len();
            for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern {pattern}"))? {
                out.push(entry?);
            }
            if out.len() == before {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }
    Ok(out)
}
