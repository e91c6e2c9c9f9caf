use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum RevbenchError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {detail}")]
    ConfigParse { path: PathBuf, detail: String },

    #[error("Config lists {commits} commits but {labels} labels. Set truncate_mismatched = true to pair the shorter list")]
    RevisionCountMismatch { commits: usize, labels: usize },

    #[error("Config does not list any revisions to benchmark")]
    NoRevisions,

    #[error("repetitions must be at least 1")]
    ZeroRepetitions,

    #[error("Benchmark command is empty")]
    EmptyCommand,

    #[error("Failed to launch {step} command: {source}")]
    CommandSpawn {
        step: &'static str,
        source: std::io::Error,
    },

    #[error("Command `{command}` failed with {}", describe_code(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("Failed to read samples from {path}: {source}")]
    SamplesRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Run {label} produced no numeric samples")]
    NoNumericSamples { label: String },

    #[error("Failed to write report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Interrupted after {completed} completed runs")]
    Interrupted { completed: usize },

    #[error("Unknown command '{command}'. Usage: revbench [init|plan]")]
    UnknownCommand { command: String },
}

fn describe_code(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("exit status {}", code),
        None => "no exit status (terminated by signal)".to_string(),
    }
}
