use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;

use crate::config::BenchConfig;
use crate::errors::RevbenchError;
use crate::plan::plan_runs;
use crate::report::ReportWriter;
use crate::runner::{CommandOutcome, Runner};
use crate::samples::read_samples;
use crate::types::{FailurePolicy, Revision, Run, StatRecord};

/// Drives every run of a validated configuration and writes the report.
pub struct Pipeline<R: Runner> {
    config: BenchConfig,
    revisions: Vec<Revision>,
    runner: R,
}

impl<R: Runner> Pipeline<R> {
    /// Validate `config` and build the pipeline. Nothing is executed yet.
    pub fn new(config: BenchConfig, runner: R) -> Result<Self, RevbenchError> {
        let revisions = config.validate()?;
        Ok(Pipeline {
            config,
            revisions,
            runner,
        })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    /// The runs `run` would perform, in order.
    pub fn plan(&self) -> impl Iterator<Item = Run<'_>> {
        plan_runs(&self.revisions, self.config.repetitions)
    }

    /// Execute every run. The summary block is written for whatever runs
    /// completed, including when a run fails or `interrupt` is raised.
    pub fn run(&mut self, interrupt: &AtomicBool) -> Result<Vec<StatRecord>, RevbenchError> {
        let output = self.config.output_path();
        let mut report = ReportWriter::create(&output)?;
        let mut records = Vec::new();

        let result = self.run_all(&mut report, &mut records, interrupt);

        let summary = report
            .write_summary(&self.config.title, &records)
            .and_then(|()| report.finish().map(drop));

        result?;
        summary?;
        tracing::info!(
            runs = records.len(),
            report = %output.display(),
            "Benchmark finished"
        );
        Ok(records)
    }

    fn run_all<W: Write>(
        &mut self,
        report: &mut ReportWriter<W>,
        records: &mut Vec<StatRecord>,
        interrupt: &AtomicBool,
    ) -> Result<(), RevbenchError> {
        let Pipeline {
            config,
            revisions,
            runner,
        } = self;
        let input = config.input_path();

        for run in plan_runs(revisions, config.repetitions) {
            let interrupted = || RevbenchError::Interrupted {
                completed: records.len(),
            };
            if interrupt.load(Ordering::SeqCst) {
                return Err(interrupted());
            }

            tracing::info!(
                "Running {} / Repetition {}",
                run.revision.label,
                run.repetition
            );
            let started_at = Utc::now();

            let checkout = runner
                .checkout(run.revision)
                .map_err(|source| RevbenchError::CommandSpawn {
                    step: "checkout",
                    source,
                })?;
            if interrupt.load(Ordering::SeqCst) {
                return Err(interrupted());
            }
            apply_policy(&checkout, config.on_failure)?;

            let benchmark = runner
                .run_benchmark()
                .map_err(|source| RevbenchError::CommandSpawn {
                    step: "benchmark",
                    source,
                })?;
            // A Ctrl-C during the benchmark reaches the child too; its results are not trustworthy.
            if interrupt.load(Ordering::SeqCst) {
                return Err(interrupted());
            }
            apply_policy(&benchmark, config.on_failure)?;

            let lines = read_samples(&input)?;
            report.write_run(&run.revision.label, run.repetition, &lines)?;

            let record =
                StatRecord::from_lines(run.run_label(), &lines, started_at, Utc::now() - started_at)?;
            tracing::debug!(
                label = %record.label,
                mean = record.mean,
                samples = record.samples,
                "Run complete"
            );
            records.push(record);
        }
        Ok(())
    }
}

fn apply_policy(outcome: &CommandOutcome, policy: FailurePolicy) -> Result<(), RevbenchError> {
    tracing::debug!(
        command = %outcome.command,
        status = %outcome.status,
        stdout = %outcome.stdout,
        stderr = %outcome.stderr,
        "Command finished"
    );

    if let Err(err) = outcome.check() {
        match policy {
            FailurePolicy::Abort => return Err(err),
            FailurePolicy::Continue => tracing::warn!("{}; continuing", err),
        }
    }
    Ok(())
}
