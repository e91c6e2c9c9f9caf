use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::RevbenchError;
use crate::plan::pair_revisions;
use crate::types::{FailurePolicy, Revision};

pub const DEFAULT_CONFIG_PATH: &str = "revbench.toml";

/// Benchmark configuration, usually loaded from `revbench.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_repetitions")]
    pub repetitions: usize,
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default = "default_checkout")]
    pub checkout: String,
    #[serde(default = "default_shell")]
    pub shell: String,
    #[serde(default = "default_input")]
    pub input: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub workdir: Option<PathBuf>,
    #[serde(default)]
    pub on_failure: FailurePolicy,
    #[serde(default)]
    pub truncate_mismatched: bool,
    #[serde(default = "default_echo_output")]
    pub echo_output: bool,
    pub commits: Vec<String>,
    pub labels: Vec<String>,
}

fn default_title() -> String {
    "Nodes per Second".to_string()
}

fn default_repetitions() -> usize {
    10
}

fn default_command() -> String {
    "export BARITONE_AUTO_TEST=true; bash ./gradlew runClient --offline".to_string()
}

fn default_checkout() -> String {
    "git checkout".to_string()
}

fn default_shell() -> String {
    "sh".to_string()
}

fn default_input() -> PathBuf {
    PathBuf::from("run/baritone/autotest.txt")
}

fn default_output() -> PathBuf {
    PathBuf::from("results.csv")
}

fn default_echo_output() -> bool {
    true
}

impl BenchConfig {
    pub fn load(path: &Path) -> Result<BenchConfig, RevbenchError> {
        let text = std::fs::read_to_string(path).map_err(|source| RevbenchError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Parse config text; `path` is only used in error messages.
    pub fn from_toml(text: &str, path: &Path) -> Result<BenchConfig, RevbenchError> {
        toml::from_str(text).map_err(|e| RevbenchError::ConfigParse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Check the configuration once, before anything runs, and return the
    /// ordered revision list.
    pub fn validate(&self) -> Result<Vec<Revision>, RevbenchError> {
        if self.commits.len() != self.labels.len() {
            if !self.truncate_mismatched {
                return Err(RevbenchError::RevisionCountMismatch {
                    commits: self.commits.len(),
                    labels: self.labels.len(),
                });
            }
            tracing::warn!(
                commits = self.commits.len(),
                labels = self.labels.len(),
                "commit and label lists differ in length; pairing the shorter list"
            );
        }

        let revisions = pair_revisions(&self.commits, &self.labels);
        if revisions.is_empty() {
            return Err(RevbenchError::NoRevisions);
        }
        if self.repetitions == 0 {
            return Err(RevbenchError::ZeroRepetitions);
        }
        if self.command.trim().is_empty() {
            return Err(RevbenchError::EmptyCommand);
        }
        Ok(revisions)
    }

    /// Results file path, relative to `workdir` when one is set.
    pub fn input_path(&self) -> PathBuf {
        self.resolve(&self.input)
    }

    /// Report path, relative to `workdir` when one is set.
    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.output)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.workdir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

pub const CONFIG_TEMPLATE: &str = r#"# revbench configuration

title = "Nodes per Second"
repetitions = 10

# Runs through `sh -c` after each checkout. Export any flags the build needs here.
command = "export BARITONE_AUTO_TEST=true; bash ./gradlew runClient --offline"
checkout = "git checkout"

# Written by the command above, read after every run.
input = "run/baritone/autotest.txt"
output = "results.csv"

# Echo command output to stderr while it runs.
echo_output = true

# "continue" logs a failed command and keeps going, "abort" stops the run.
on_failure = "continue"

commits = [
    "1915d542d4f9cd1e1e22aacbd0a2c2303cab68b8",
    "7ee1ac771c46f51cb2811d1f19934e5aabe357e2",
    "5be1a3b45798c3c70ea9df2da4d40af189bfe5be",
]

labels = [
    "ArrayList",
    "ImmutableSet",
    "ImmutableList",
]
"#;
