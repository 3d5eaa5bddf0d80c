//! Runs checks and reports their outcome
//!
//! Checks run on the blocking pool, at most `jobs` at a time, each under its
//! own timeout. Results are printed in declaration order once everything
//! finished, so two runs over the same output tree print the same report.

use crate::check::{Check, Verdict};
use crate::config::ResolvedConfig;
use crate::error::CheckError;
use camino::Utf8PathBuf;
use owo_colors::OwoColorize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};
use tracing::{debug, warn};

/// Settings shared by every check in a run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub output_dir: Utf8PathBuf,
    pub jobs: usize,
    pub timeout: Duration,
    pub filter: Option<String>,
}

impl RunOptions {
    pub fn from_config(config: &ResolvedConfig, filter: Option<String>) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            jobs: config.jobs,
            timeout: config.timeout,
            filter,
        }
    }
}

/// What happened to one check
#[derive(Debug)]
pub enum Outcome {
    Skipped,
    Finished { verdict: Verdict, elapsed: Duration },
}

#[derive(Debug)]
pub struct CheckReport {
    pub name: String,
    pub outcome: Outcome,
}

/// Results of a whole run, in declaration order
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<CheckReport>,
}

impl RunSummary {
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Finished { verdict, .. } if verdict.passed()))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Finished { verdict, .. } if !verdict.passed()))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Runs one check to completion on a blocking thread
type Executor = Arc<dyn Fn(Check) -> Verdict + Send + Sync>;

/// Run every check selected by the filter
pub async fn run_checks(checks: Vec<Check>, options: &RunOptions) -> RunSummary {
    let root = Arc::new(options.output_dir.clone());
    let executor: Executor = Arc::new(move |check: Check| check.run(&root));
    run_with(checks, options, executor).await
}

async fn run_with(checks: Vec<Check>, options: &RunOptions, executor: Executor) -> RunSummary {
    let permits = Arc::new(Semaphore::new(options.jobs.max(1)));
    let mut set = JoinSet::new();
    let mut tasks: HashMap<Id, (usize, String)> = HashMap::new();
    let mut slots: Vec<Option<CheckReport>> = Vec::new();

    for check in checks {
        if !check.matches(options.filter.as_deref()) {
            continue;
        }

        let index = slots.len();
        if check.ignored {
            slots.push(Some(CheckReport {
                name: check.name,
                outcome: Outcome::Skipped,
            }));
            continue;
        }
        slots.push(None);

        let name = check.name.clone();
        let executor = Arc::clone(&executor);
        let permits = Arc::clone(&permits);
        let timeout = options.timeout;
        let handle = set.spawn(async move {
            // The semaphore is never closed
            let _permit = permits.acquire_owned().await.ok();
            let start = Instant::now();
            let verdict = run_one(check, executor, timeout).await;
            (verdict, start.elapsed())
        });
        tasks.insert(handle.id(), (index, name));
    }

    while let Some(joined) = set.join_next_with_id().await {
        let (id, verdict, elapsed) = match joined {
            Ok((id, (verdict, elapsed))) => (id, verdict, elapsed),
            Err(e) => {
                warn!("check task failed to join: {e}");
                let id = e.id();
                let verdict = Verdict::failed(CheckError::Panicked {
                    message: panic_message(e),
                });
                (id, verdict, Duration::ZERO)
            }
        };

        let Some((index, name)) = tasks.remove(&id) else {
            continue;
        };
        debug!("{name} finished in {:.3}s", elapsed.as_secs_f64());
        slots[index] = Some(CheckReport {
            name,
            outcome: Outcome::Finished { verdict, elapsed },
        });
    }

    RunSummary {
        reports: slots.into_iter().flatten().collect(),
    }
}

async fn run_one(check: Check, executor: Executor, timeout: Duration) -> Verdict {
    let name = check.name.clone();
    let task = tokio::task::spawn_blocking(move || executor(check));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(verdict)) => verdict,
        Ok(Err(e)) => Verdict::failed(CheckError::Panicked {
            message: panic_message(e),
        }),
        Err(_) => {
            warn!("{name} timed out after {:.1}s", timeout.as_secs_f64());
            Verdict::failed(CheckError::Timeout { limit: timeout })
        }
    }
}

fn panic_message(e: tokio::task::JoinError) -> String {
    match e.try_into_panic() {
        Ok(payload) => {
            if let Some(s) = payload.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            }
        }
        Err(e) => e.to_string(),
    }
}

/// Print one line per check plus failure details, then the totals
pub fn print_report(summary: &RunSummary) {
    for report in &summary.reports {
        match &report.outcome {
            Outcome::Skipped => {
                println!("{} {} ... {}", "test".bold(), report.name, "SKIP".yellow());
            }
            Outcome::Finished { verdict, elapsed } => {
                let status = if verdict.passed() {
                    "PASS".green().to_string()
                } else {
                    "FAIL".red().to_string()
                };
                println!(
                    "{} {} ... {} ({:.2}s)",
                    "test".bold(),
                    report.name,
                    status,
                    elapsed.as_secs_f64()
                );
                for failure in &verdict.failures {
                    println!("  {} {}", failure.kind().red().bold(), failure.to_string().red());
                }
            }
        }
    }

    let failed = summary.failed();
    println!();
    println!(
        "Results: {} passed, {} failed, {} skipped",
        summary.passed().to_string().green(),
        if failed > 0 {
            failed.to_string().red().to_string()
        } else {
            failed.to_string()
        },
        summary.skipped().to_string().yellow()
    );
}

/// Print check names without running them
pub fn list_checks(checks: &[Check], filter: Option<&str>) {
    for check in checks.iter().filter(|c| c.matches(filter)) {
        if check.ignored {
            println!("{} (ignored)", check.name);
        } else {
            println!("{}", check.name);
        }
    }
}
