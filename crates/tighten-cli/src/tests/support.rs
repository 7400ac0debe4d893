//! Shared fixtures for CLI runtime tests.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use camino::Utf8PathBuf;
use tempfile::TempDir;
use tighten_config::Config;
use tighten_engine::ConfigurableVerifier;

use crate::{AppError, CliRunner, ConfigLoader};

/// Recipe demoting public functions, with a single `cargo check` step.
pub(super) const RECIPE: &str = r#"roots = ["src"]

[[rules]]
search = "pub fn"
replace = "pub(crate) fn"
exclusions = ["pub fn main()"]

[[verify]]
directory = "."
program = "cargo"
args = ["check"]
"#;

pub(super) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(super) const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// A temporary project holding a recipe and a `src/` tree.
pub(super) struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        fs::create_dir(dir.path().join("src")).expect("create src");
        fs::write(dir.path().join("tighten.toml"), RECIPE).expect("write recipe");
        Self { dir }
    }

    pub(super) fn root(&self) -> &Path {
        self.dir.path()
    }

    pub(super) fn recipe_path(&self) -> PathBuf {
        self.root().join("tighten.toml")
    }

    /// Writes `content` at `relative`, creating parent directories.
    pub(super) fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directories");
        }
        fs::write(&path, content).expect("write source");
        path
    }

    pub(super) fn config(&self) -> Config {
        let recipe = Utf8PathBuf::from_path_buf(self.recipe_path()).expect("utf8 temp path");
        Config::default().with_recipe_path(recipe)
    }
}

/// Captured result of one in-process invocation.
pub(super) struct Invocation {
    pub(super) exit: ExitCode,
    pub(super) stdout: String,
    pub(super) stderr: String,
}

pub(super) fn build_args(command: &str) -> Vec<OsString> {
    std::iter::once(OsString::from("tighten"))
        .chain(
            command
                .split_whitespace()
                .map(|token| OsString::from(token.trim_matches('"'))),
        )
        .collect()
}

/// Runs `command` against `config`, substituting `verifier` for real
/// processes.
pub(super) fn invoke(config: Config, verifier: &ConfigurableVerifier, command: &str) -> Invocation {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let loader = StaticConfigLoader::new(config);
    let exit = CliRunner::new(&mut stdout, &mut stderr, &loader)
        .with_verifier(verifier)
        .run(build_args(command));
    Invocation {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}
