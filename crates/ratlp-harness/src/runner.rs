use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use ratlp_model::LpInstance;
use ratlp_solver::{Oracle, OracleResult};
use tracing::{debug, info, warn};

use crate::compare::{Verdict, compare};
use crate::config::{HarnessConfig, PivotRule};
use crate::error::{HarnessError, TrialError};
use crate::output::{SolverReport, parse_output};
use crate::stats::{StatsLog, TrialRecord};

/// One (instance file, pivot rule) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trial {
    pub instance: PathBuf,
    pub rule: PivotRule,
}

impl Trial {
    fn instance_name(&self) -> String {
        self.instance
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.instance.display().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct TrialOutcome {
    pub trial: Trial,
    pub verdict: Verdict,
    pub report: SolverReport,
    pub expected: OracleResult,
    /// Wall-clock time of the solver subprocess
    pub elapsed: Duration,
}

/// Result of a full validation run
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub outcomes: Vec<TrialOutcome>,
    pub failures: Vec<TrialError>,
}

impl SuiteReport {
    pub fn total(&self) -> usize {
        self.outcomes.len() + self.failures.len()
    }

    pub fn passed(&self) -> usize {
        self.count(Verdict::Pass)
    }

    pub fn inconclusive(&self) -> usize {
        self.count(Verdict::Inconclusive)
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn count(&self, verdict: Verdict) -> usize {
        self.outcomes.iter().filter(|o| o.verdict == verdict).count()
    }
}

/// Runs the solver under test on one instance with one pivot rule and
/// checks its answer against `oracle`.
///
/// Every trial that reaches the solver is recorded in `log`, failures
/// included.
pub fn run_trial(
    config: &HarnessConfig,
    trial: &Trial,
    oracle: &dyn Oracle,
    log: Option<&StatsLog>,
) -> Result<TrialOutcome, TrialError> {
    let instance = LpInstance::load(&trial.instance).map_err(|source| TrialError::Instance {
        instance: trial.instance.clone(),
        source,
    })?;
    let expected = oracle.solve(&instance);

    let start = Instant::now();
    let output = Command::new(config.solver())
        .args(config.solver_args())
        .arg(&trial.instance)
        .arg("--pivot")
        .arg(trial.rule.as_str())
        .output()
        .map_err(|source| TrialError::Launch {
            instance: trial.instance.clone(),
            rule: trial.rule,
            solver: config.solver().to_path_buf(),
            source,
        })?;
    let elapsed = start.elapsed();

    if !output.status.success() {
        warn!(
            instance = %trial.instance.display(),
            rule = %trial.rule,
            status = %output.status,
            "solver exited unsuccessfully"
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed = parse_output(&stdout);
    let pivots = parsed.as_ref().ok().and_then(|report| report.pivots);
    let result = parsed
        .map_err(|source| TrialError::Output {
            instance: trial.instance.clone(),
            rule: trial.rule,
            source,
        })
        .and_then(|report| {
            let verdict =
                compare(&expected, &report, config.tolerance()).map_err(|discrepancy| TrialError::Disagreement {
                    instance: trial.instance.clone(),
                    rule: trial.rule,
                    discrepancy,
                })?;
            Ok(TrialOutcome {
                trial: trial.clone(),
                verdict,
                report,
                expected,
                elapsed,
            })
        });

    if let Ok(outcome) = &result {
        if outcome.verdict == Verdict::Inconclusive {
            warn!(
                instance = %trial.instance.display(),
                rule = %trial.rule,
                oracle = oracle.name(),
                "oracle hit its iteration limit, trial is inconclusive"
            );
        }
    }

    if let Some(log) = log {
        let record = TrialRecord {
            instance: trial.instance_name(),
            pivot_rule: trial.rule,
            pivots,
            elapsed_secs: elapsed.as_secs_f64(),
            expected: expected.status,
            verdict: result.as_ref().map_or("fail", |outcome| outcome.verdict.as_str()),
        };
        if let Err(err) = log.record(&record) {
            warn!(error = %err, "failed to write stats record");
        }
    }

    result
}

/// Serialized instances (`*.txt`) directly inside `dir`, sorted by path.
pub fn collect_instances(dir: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    let inputs_error = |source: std::io::Error| HarnessError::Inputs {
        path: dir.to_path_buf(),
        source,
    };
    let mut instances = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(inputs_error)? {
        let path = entry.map_err(inputs_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            instances.push(path);
        }
    }
    instances.sort();
    Ok(instances)
}

/// Runs every instance in the inputs directory under every configured
/// pivot rule. A failing trial never stops the run.
pub fn run_suite(
    config: &HarnessConfig,
    oracle: &dyn Oracle,
    log: Option<&StatsLog>,
) -> Result<SuiteReport, HarnessError> {
    let instances = collect_instances(config.inputs())?;
    let trials: Vec<Trial> = instances
        .iter()
        .flat_map(|path| {
            config.pivot_rules().iter().map(move |&rule| Trial {
                instance: path.clone(),
                rule,
            })
        })
        .collect();
    let workers = config.jobs().min(trials.len()).max(1);
    info!(
        instances = instances.len(),
        trials = trials.len(),
        workers,
        oracle = oracle.name(),
        solver = %config.solver().display(),
        "starting validation"
    );

    let next = AtomicUsize::new(0);
    let mut results: Vec<(usize, Result<TrialOutcome, TrialError>)> = thread::scope(|scope| {
        let next = &next;
        let trials = &trials;
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(trial) = trials.get(index) else {
                            break;
                        };
                        done.push((index, run_trial(config, trial, oracle, log)));
                    }
                    done
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });
    results.sort_by_key(|(index, _)| *index);

    let mut report = SuiteReport::default();
    for (_, result) in results {
        match result {
            Ok(outcome) => {
                debug!(
                    instance = %outcome.trial.instance.display(),
                    rule = %outcome.trial.rule,
                    verdict = outcome.verdict.as_str(),
                    elapsed_ms = outcome.elapsed.as_millis() as u64,
                    "trial finished"
                );
                report.outcomes.push(outcome);
            }
            Err(err) => {
                warn!(error = %err, "trial failed");
                report.failures.push(err);
            }
        }
    }
    info!(
        passed = report.passed(),
        inconclusive = report.inconclusive(),
        failed = report.failed(),
        "validation finished"
    );
    Ok(report)
}
