//! Smoke runner: builds the root input for every fixture under `fixtures/`,
//! replays its edits and checks the outcome.
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use serde::Deserialize;
use serde_json::Value;

use struct_form::{at_mut, descriptor, Entry, Options, Outcome, Settings};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Fixture {
    name: String,
    #[serde(rename = "type")]
    ty: Value,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    edits: Vec<Edit>,
    expect_valid: bool,
    /// expected error pointers, in order
    #[serde(default)]
    expect_paths: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Edit {
    path: Vec<String>,
    text: String,
}

fn run_fixture(path: &Path) -> Result<bool> {
    let source = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let fixture: Fixture = serde_json::from_str(&source).with_context(|| format!("bad fixture {}", path.display()))?;
    let ty = descriptor::from_value(fixture.ty)?;

    let settings = Settings::default();
    let factory = settings.inputs.resolve(&ty);
    let mut options = Options::new();
    options.value = fixture.value;
    let mut input = factory.build(&ty, options, &settings)?.mount(None);

    for edit in fixture.edits {
        let segments: Vec<&str> = edit.path.iter().map(String::as_str).collect();
        let target = at_mut(input.as_mut(), &segments)
            .ok_or_else(|| anyhow!("{}: no input at {:?}", fixture.name, edit.path))?;
        target.enter(Entry::Text(edit.text))?;
    }

    let outcome = input.get_value(1);
    let ok = match (&outcome, fixture.expect_valid) {
        (Outcome::Valid(_), true) => true,
        (Outcome::Invalid(errors), false) => fixture.expect_paths.as_ref().is_none_or(|p| *p == errors.paths()),
        _ => false,
    };

    let mark = if ok { "✓".green().bold() } else { "✗".red().bold() };
    eprintln!("{mark} {}", fixture.name.bold());
    match outcome {
        Outcome::Valid(value) => eprintln!("    {value}"),
        Outcome::Invalid(errors) => {
            for error in errors.iter() {
                eprintln!("    {} {}", error.pointer().yellow(), error.message);
            }
        }
        Outcome::Absent => eprintln!("    (absent)"),
    }
    Ok(ok)
}

fn fixture_paths() -> Result<Vec<PathBuf>> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures");
    let pattern = format!("{}/*.json", root.display());
    let mut paths = glob::glob(&pattern)?.collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
}

fn main() -> ExitCode {
    let paths = match fixture_paths() {
        Ok(paths) => paths,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };
    let mut failed = 0;
    for path in &paths {
        match run_fixture(path) {
            Ok(true) => {}
            Ok(false) => failed += 1,
            Err(error) => {
                failed += 1;
                eprintln!("{} {}: {error:#}", "error:".red().bold(), path.display());
            }
        }
    }
    eprintln!("{} fixtures, {} failed", paths.len(), failed);
    if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
