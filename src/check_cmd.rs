//! Check command implementation

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use vetter::analyzers::clang_tidy;
use vetter::analyzers::config::AnalyzerConfig;
use vetter::output::{generate_execution_id, output_json, CheckResponse, JsonResponse};
use vetter::{
    load_build_actions, run_actions, AnalyzerKind, CancelToken, GlobSkipFilter, OutputFormat,
    ReportDir, RunContext, RunError,
};

pub struct CheckOptions {
    pub commands: PathBuf,
    pub workspace: PathBuf,
    pub name: String,
    pub jobs: Option<usize>,
    pub analyzer: AnalyzerKind,
    pub tidy_binary: Option<PathBuf>,
    pub sa_binary: Option<PathBuf>,
    pub skip: Option<PathBuf>,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    pub keep_tmp: bool,
    pub output_format: OutputFormat,
}

pub fn run_check(opts: CheckOptions) -> Result<()> {
    // Register signal handlers for SIGINT and SIGTERM
    let cancel = CancelToken::new();
    #[cfg(unix)]
    {
        use signal_hook::consts::signal;
        use signal_hook::iterator::Signals;

        let mut signals = Signals::new([signal::SIGTERM, signal::SIGINT])?;
        let cancel = cancel.clone();
        std::thread::spawn(move || {
            for _ in &mut signals {
                cancel.cancel();
                break;
            }
        });
    }

    let actions = load_build_actions(&opts.commands, opts.analyzer)?;
    let total_actions = actions.len();

    let binary = resolve_binary(opts.analyzer, &opts.tidy_binary, &opts.sa_binary);
    let mut config = AnalyzerConfig::new(&binary);
    if !opts.enable.is_empty() || !opts.disable.is_empty() {
        // Seed the checker table from the installed tool so prefix
        // enabling works; a binary that cannot be queried still accepts
        // the names given verbatim.
        if opts.analyzer == AnalyzerKind::ClangTidy {
            if let Ok(checkers) = clang_tidy::list_checkers(&binary, &[]) {
                for (name, description) in checkers {
                    config.add_checker(name, false, description);
                }
            }
        }
        for name in &opts.enable {
            if !config.has_checker(name) {
                config.add_checker(name.clone(), true, "");
            }
            config.enable_checker(name);
        }
        for name in &opts.disable {
            if !config.has_checker(name) {
                config.add_checker(name.clone(), false, "");
            }
            config.disable_checker(name);
        }
    }

    let report_dir = ReportDir::create(&opts.workspace, &opts.name, opts.keep_tmp)
        .context("cannot set up the report directory")?;

    let mut configs = HashMap::new();
    configs.insert(opts.analyzer, config);
    let mut ctx = RunContext::new(configs, report_dir.path().to_path_buf());
    ctx.keep_tmp = opts.keep_tmp;
    if let Some(skip) = &opts.skip {
        let filter = GlobSkipFilter::from_file(skip)
            .with_context(|| format!("cannot load skip file {}", skip.display()))?;
        ctx.skip_filter = Some(Box::new(filter));
    }

    let jobs = opts.jobs.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });

    if opts.output_format == OutputFormat::Human {
        println!(
            "Analyzing {} actions with {} ({} jobs)...",
            total_actions, opts.analyzer, jobs
        );
    }

    let summary = match run_actions(actions, Arc::new(ctx), jobs, &cancel) {
        Ok(summary) => summary,
        Err(RunError::Interrupted) => {
            anyhow::bail!("analysis interrupted");
        }
        Err(RunError::Other(e)) => return Err(e),
    };

    match opts.output_format {
        OutputFormat::Human => {
            summary.print();
            if opts.keep_tmp {
                println!("Reports kept in {}", report_dir.path().display());
            }
        }
        OutputFormat::Json => {
            let response = JsonResponse::new(
                "check",
                CheckResponse {
                    total: summary.total,
                    successful: summary.successful_total(),
                    failed: summary.failed_total(),
                    skipped: summary.skipped,
                    report_dir: opts
                        .keep_tmp
                        .then(|| report_dir.path().display().to_string()),
                },
                &generate_execution_id(),
            );
            output_json(&response)?;
        }
    }

    Ok(())
}

/// Pick the analyzer binary: an explicit flag wins, otherwise the family's
/// default name is resolved from PATH (kept as a bare name if not found, so
/// the spawn error names the missing tool).
fn resolve_binary(
    analyzer: AnalyzerKind,
    tidy_binary: &Option<PathBuf>,
    sa_binary: &Option<PathBuf>,
) -> PathBuf {
    let explicit = match analyzer {
        AnalyzerKind::ClangTidy => tidy_binary,
        AnalyzerKind::ClangSa => sa_binary,
    };
    if let Some(binary) = explicit {
        return binary.clone();
    }
    let name = analyzer.default_binary();
    which::which(name).unwrap_or_else(|_| PathBuf::from(name))
}
