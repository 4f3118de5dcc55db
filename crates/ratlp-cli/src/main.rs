use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratlp_gen::GeneratedInstance;
use ratlp_harness::{HarnessConfig, PivotRule, StatsLog};
use ratlp_model::LpInstance;
use ratlp_solver::SimplexOracle;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ratlp")]
#[command(about = "Exact-rational LP instance generator and solver validation harness", long_about = None)]
struct Cli {
    /// Log debug events (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one feasible, one infeasible and one unbounded random instance
    Random {
        /// Number of variables
        #[arg(value_parser = positive())]
        n: usize,
        /// Number of constraints
        #[arg(value_parser = positive())]
        m: usize,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Write the Klee-Minty cube of dimension n
    KleeMinty {
        /// Dimension of the cube
        #[arg(value_parser = positive())]
        n: usize,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Write the vertex cover relaxation of a random graph
    VertexCover {
        /// Number of vertices
        #[arg(value_parser = positive())]
        n: usize,
        /// Number of edges
        #[arg(value_parser = positive())]
        m: usize,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run a solver on every instance and compare with the reference oracle
    Validate {
        /// Solver binary under test
        #[arg(short, long)]
        solver: PathBuf,
        /// Argument passed to the solver before the instance path, repeatable
        #[arg(long = "solver-arg", allow_hyphen_values = true)]
        solver_args: Vec<String>,
        /// Directory of serialized instances
        #[arg(short, long, default_value = "inputs")]
        inputs: PathBuf,
        /// Pivot rule to test, repeatable (default: all)
        #[arg(short, long = "pivot")]
        pivot: Vec<PivotRule>,
        /// Largest accepted relative objective difference
        #[arg(short, long, default_value_t = 0.01)]
        tolerance: f64,
        /// Append one JSON line per trial to this file
        #[arg(short, long)]
        log: Option<PathBuf>,
        /// Worker threads
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,
        /// Pivot limit for the reference oracle
        #[arg(long, default_value_t = 10_000)]
        max_iterations: usize,
        /// Zero threshold for the reference oracle's pivoting
        #[arg(long, default_value_t = 1e-9)]
        oracle_tolerance: f64,
    },
    /// Parse an instance file and print it
    Show {
        /// The instance file
        file: PathBuf,
        /// Output format (json, pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Directory the instance files are written to
    #[arg(short, long, default_value = "inputs")]
    out_dir: PathBuf,
    /// Seed for reproducible instances
    #[arg(short, long)]
    seed: Option<u64>,
}

impl OutputArgs {
    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn positive() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::new().range(1..)
}

/// Parses the command line, printing usage and returning the exit code on failure.
fn parse_args<I, T>(args: I) -> Result<Cli, i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(|e| {
        let _ = e.print();
        // help and version are not errors
        if e.use_stderr() { 1 } else { 0 }
    })
}

fn random_file_name(class: &str, n: usize, m: usize) -> String {
    format!("test_{}_{}x{}.txt", class, m, n)
}

fn klee_minty_file_name(n: usize) -> String {
    format!("test_klee_minty_{}.txt", n)
}

fn vertex_cover_file_name(n: usize, m: usize) -> String {
    format!("test_vertex_cover_{}x{}.txt", m, n)
}

fn main() {
    let cli = match parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(code) => std::process::exit(code),
    };
    init_logging(cli.verbose);

    match cli.command {
        Commands::Random { n, m, output } => {
            let mut rng = output.rng();
            let generated = [
                ("feasible", ratlp_gen::generate_feasible(&mut rng, n, m)),
                ("infeasible", ratlp_gen::generate_infeasible(&mut rng, n, m)),
                ("unbounded", ratlp_gen::generate_unbounded(&mut rng, n, m)),
            ];
            for (class, result) in generated {
                write_generated(&output.out_dir, &random_file_name(class, n, m), result);
            }
        }
        Commands::KleeMinty { n, output } => {
            let name = klee_minty_file_name(n);
            write_generated(&output.out_dir, &name, ratlp_gen::generate_klee_minty(n));
        }
        Commands::VertexCover { n, m, output } => {
            let mut rng = output.rng();
            let name = vertex_cover_file_name(n, m);
            write_generated(&output.out_dir, &name, ratlp_gen::generate_vertex_cover(&mut rng, n, m));
        }
        Commands::Validate {
            solver,
            solver_args,
            inputs,
            pivot,
            tolerance,
            log,
            jobs,
            max_iterations,
            oracle_tolerance,
        } => {
            let rules = if pivot.is_empty() { PivotRule::ALL.to_vec() } else { pivot };
            let config = HarnessConfig::new(solver)
                .with_solver_args(solver_args)
                .with_inputs(inputs)
                .with_pivot_rules(rules)
                .with_tolerance(tolerance)
                .with_jobs(jobs);
            let oracle = SimplexOracle::new()
                .with_max_iterations(max_iterations)
                .with_tolerance(oracle_tolerance);

            let log = match log.map(StatsLog::create).transpose() {
                Ok(log) => log,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            let report = match ratlp_harness::run_suite(&config, &oracle, log.as_ref()) {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            if let Some(log) = log {
                if let Err(e) = log.finish() {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }

            for failure in &report.failures {
                eprintln!("FAIL {}", failure);
            }
            println!(
                "{} trials: {} passed, {} inconclusive, {} failed",
                report.total(),
                report.passed(),
                report.inconclusive(),
                report.failed()
            );
            if !report.is_success() {
                std::process::exit(1);
            }
        }
        Commands::Show { file, format } => {
            let instance = match LpInstance::load(&file) {
                Ok(instance) => instance,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            if format == "json" {
                match serde_json::to_string_pretty(&instance) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                print!("{}", render(&instance));
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Checks the certificate and saves the instance, exiting on any error.
fn write_generated(out_dir: &Path, name: &str, result: Result<GeneratedInstance, ratlp_gen::GenError>) {
    let generated = match result {
        Ok(generated) => generated,
        Err(e) => {
            eprintln!("Generation error: {}", e);
            std::process::exit(1);
        }
    };
    if !generated.verify() {
        eprintln!("Generation error: {} instance {} failed its certificate check", generated.class, name);
        std::process::exit(1);
    }
    debug!(name, class = %generated.class, "certificate verified");

    if let Err(e) = std::fs::create_dir_all(out_dir) {
        eprintln!("Error creating {}: {}", out_dir.display(), e);
        std::process::exit(1);
    }
    let path = out_dir.join(name);
    if let Err(e) = generated.instance.save(&path) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    info!(
        path = %path.display(),
        class = %generated.class,
        variables = generated.instance.num_variables(),
        constraints = generated.instance.num_constraints(),
        "wrote instance"
    );
}

/// Human-readable form: `maximize` line, then one inequality per row.
fn render(instance: &LpInstance) -> String {
    let mut out = format!(
        "{} variables, {} constraints\nmaximize {}\nsubject to\n",
        instance.num_variables(),
        instance.num_constraints(),
        linear_form(instance.c())
    );
    for (row, rhs) in instance.a().iter().zip(instance.b()) {
        out.push_str(&format!("  {} <= {}\n", linear_form(row), rhs));
    }
    out.push_str("  x >= 0\n");
    out
}

fn linear_form(coefficients: &[ratlp_model::BigRational]) -> String {
    let terms: Vec<String> = coefficients
        .iter()
        .enumerate()
        .map(|(j, coef)| format!("{}*x{}", coef, j + 1))
        .collect();
    if terms.is_empty() { "0".to_string() } else { terms.join(" + ") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn exit_code(args: &[&str]) -> i32 {
        match parse_args(args) {
            Ok(_) => panic!("{:?} parsed", args),
            Err(code) => code,
        }
    }

    #[test]
    fn test_bad_arguments_exit_with_one() {
        assert_eq!(exit_code(&["ratlp", "random", "3"]), 1);
        assert_eq!(exit_code(&["ratlp", "random", "x", "2"]), 1);
        assert_eq!(exit_code(&["ratlp", "random", "3", "-2"]), 1);
        assert_eq!(exit_code(&["ratlp", "klee-minty", "0"]), 1);
        assert_eq!(exit_code(&["ratlp", "vertex-cover", "4", "0"]), 1);
        assert_eq!(exit_code(&["ratlp", "validate", "-s", "lp", "--pivot", "steepest"]), 1);
        assert_eq!(exit_code(&["ratlp"]), 1);
    }

    #[test]
    fn test_help_exits_with_zero() {
        assert_eq!(exit_code(&["ratlp", "--help"]), 0);
        assert_eq!(exit_code(&["ratlp", "random", "--help"]), 0);
    }

    #[test]
    fn test_rejected_sizes_write_nothing() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("inputs");
        let out_arg = out.display().to_string();
        assert_eq!(exit_code(&["ratlp", "klee-minty", "0", "-o", out_arg.as_str()]), 1);
        assert_eq!(exit_code(&["ratlp", "random", "0", "3", "-o", out_arg.as_str()]), 1);
        assert!(!out.exists());
    }

    #[test]
    fn test_file_names() {
        assert_eq!(random_file_name("feasible", 3, 2), "test_feasible_2x3.txt");
        assert_eq!(random_file_name("unbounded", 5, 1), "test_unbounded_1x5.txt");
        assert_eq!(klee_minty_file_name(4), "test_klee_minty_4.txt");
        assert_eq!(vertex_cover_file_name(6, 9), "test_vertex_cover_9x6.txt");
    }

    #[test]
    fn test_generated_instance_is_written() {
        let dir = tempdir().unwrap();
        let out_arg = dir.path().display().to_string();
        let cli = match parse_args(["ratlp", "klee-minty", "3", "-o", out_arg.as_str()]) {
            Ok(cli) => cli,
            Err(code) => panic!("exit code {}", code),
        };
        let Commands::KleeMinty { n, output } = cli.command else {
            panic!("wrong subcommand");
        };
        assert_eq!(n, 3);
        let name = klee_minty_file_name(n);
        write_generated(&output.out_dir, &name, ratlp_gen::generate_klee_minty(n));

        let loaded = LpInstance::load(dir.path().join("test_klee_minty_3.txt")).unwrap();
        assert_eq!(loaded.num_variables(), 3);
        assert_eq!(loaded.num_constraints(), 3);
    }
}
