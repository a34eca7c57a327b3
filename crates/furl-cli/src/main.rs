//! Furl - remove deployed Helm releases
//!
//! Usage:
//!   furl dismiss --env staging             # target derived from the git project
//!   furl dismiss -n web-prod --release web # explicit target
//!   furl dismiss --use-deploy-report       # target from the last deploy report

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use furl_core::commands::{DismissCommand, DismissReport, DismissRequest};
use furl_core::context::AppContext;
use furl_core::dismiss::DismissOutcome;
use furl_core::logging::log_running_time;

#[derive(Parser)]
#[command(name = "furl")]
#[command(about = "Remove deployed Helm releases", long_about = None)]
struct Cli {
    #[command(flatten)]
    log: LogArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Uninstall a release, and optionally its namespace
    ///
    /// The target comes from exactly one source:
    /// 1. the deploy report (--use-deploy-report)
    /// 2. the furl.toml of the surrounding git project
    /// 3. --namespace and --release
    Dismiss(Box<DismissArgs>),
}

#[derive(Args)]
struct LogArgs {
    /// Enable debug logs everywhere
    #[arg(long, global = true, env = "FURL_LOG_DEBUG")]
    log_debug: bool,

    /// Enable debug logs of furl itself
    #[arg(long, global = true, env = "FURL_LOG_VERBOSE")]
    log_verbose: bool,

    /// Only log errors and hide helm/kubectl output unless a step fails
    #[arg(long, global = true, env = "FURL_LOG_QUIET")]
    log_quiet: bool,

    /// When to color log output
    #[arg(long, global = true, env = "FURL_LOG_COLOR_MODE", default_value = "auto")]
    log_color_mode: ColorMode,

    /// Decorate process names with emoji
    #[arg(
        long,
        global = true,
        env = "FURL_LOG_PRETTY",
        default_value_t = true,
        action = ArgAction::Set
    )]
    log_pretty: bool,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum ColorMode {
    #[default]
    Auto,
    On,
    Off,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable summary
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// No output, exit status only
    Quiet,
}

#[derive(Args)]
struct DismissArgs {
    /// Working directory (default: current)
    #[arg(long, env = "FURL_DIR")]
    dir: Option<PathBuf>,

    /// Use this directory as the git work tree instead of discovering it
    #[arg(long, env = "FURL_GIT_WORK_TREE")]
    git_work_tree: Option<PathBuf>,

    /// Project config, relative to the work tree (default: furl.toml)
    #[arg(long, env = "FURL_CONFIG")]
    config: Option<PathBuf>,

    /// Environment used in namespace and release templates
    #[arg(long, env = "FURL_ENV")]
    env: Option<String>,

    /// Kubernetes namespace
    #[arg(short, long, env = "FURL_NAMESPACE")]
    namespace: Option<String>,

    /// Helm release
    #[arg(long, env = "FURL_RELEASE")]
    release: Option<String>,

    /// Take namespace and release from the deploy report
    #[arg(long, env = "FURL_USE_DEPLOY_REPORT")]
    use_deploy_report: bool,

    /// Deploy report location (default: .furl-deploy-report.json)
    #[arg(long, env = "FURL_DEPLOY_REPORT_PATH")]
    deploy_report_path: Option<PathBuf>,

    /// Delete the namespace as well
    #[arg(long, env = "FURL_WITH_NAMESPACE")]
    with_namespace: bool,

    /// Delete release hook resources as well
    #[arg(long, env = "FURL_WITH_HOOKS", default_value_t = true, action = ArgAction::Set)]
    with_hooks: bool,

    /// Kubernetes context
    #[arg(long, env = "FURL_KUBE_CONTEXT")]
    kube_context: Option<String>,

    /// Kubeconfig file
    #[arg(long, env = "FURL_KUBE_CONFIG")]
    kube_config: Option<PathBuf>,

    /// Kubeconfig content, base64 encoded
    #[arg(long, env = "FURL_KUBE_CONFIG_BASE64", hide_env_values = true)]
    kube_config_base64: Option<String>,

    /// Revisions fetched when checking the release (0 means all)
    #[arg(long, env = "FURL_RELEASES_HISTORY_MAX", default_value_t = 0)]
    releases_history_max: u32,

    /// helm binary
    #[arg(long, env = "FURL_HELM_BIN", default_value = "helm")]
    helm_bin: PathBuf,

    /// kubectl binary
    #[arg(long, env = "FURL_KUBECTL_BIN", default_value = "kubectl")]
    kubectl_bin: PathBuf,

    /// Furl state directory (locks)
    #[arg(long, env = "FURL_HOME")]
    home_dir: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, default_value = "table")]
    format: OutputFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    match cli.command {
        Commands::Dismiss(args) => log_running_time(|| run_dismiss(*args, &cli.log)),
    }
}

fn init_tracing(log: &LogArgs) {
    let ansi = match log.log_color_mode {
        ColorMode::Auto => console::colors_enabled_stderr(),
        ColorMode::On => true,
        ColorMode::Off => false,
    };
    match log.log_color_mode {
        ColorMode::Auto => {}
        ColorMode::On | ColorMode::Off => {
            console::set_colors_enabled(ansi);
            console::set_colors_enabled_stderr(ansi);
        }
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(log).into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(ansi)
                .with_target(log.log_debug)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn default_filter(log: &LogArgs) -> &'static str {
    if log.log_debug {
        "debug"
    } else if log.log_quiet {
        "error"
    } else if log.log_verbose {
        "furl=debug,furl_core=debug,warn"
    } else {
        "furl=info,furl_core=info,warn"
    }
}

fn run_dismiss(args: DismissArgs, log: &LogArgs) -> Result<()> {
    let ctx = AppContext::with_defaults(args.home_dir, args.dir)?;
    let request = DismissRequest {
        namespace: args.namespace,
        release: args.release,
        environment: args.env,
        use_deploy_report: args.use_deploy_report,
        deploy_report_path: args.deploy_report_path,
        config_path: args.config,
        git_work_tree: args.git_work_tree,
        with_namespace: args.with_namespace,
        with_hooks: args.with_hooks,
        kube_context: args.kube_context,
        kube_config: args.kube_config,
        kube_config_base64: args.kube_config_base64,
        releases_history_max: args.releases_history_max,
        helm_bin: args.helm_bin,
        kubectl_bin: args.kubectl_bin,
        pretty_log: log.log_pretty,
        quiet: log.log_quiet,
    };

    let report = DismissCommand::new(ctx).execute(&request)?;
    print_dismiss_result(args.format, &report)
}

fn print_dismiss_result(format: OutputFormat, report: &DismissReport) -> Result<()> {
    match format {
        OutputFormat::Table => {
            match report.outcome {
                DismissOutcome::Uninstalled => println!(
                    "{} Uninstalled release '{}' from namespace '{}'",
                    style("✓").green(),
                    report.release,
                    report.namespace
                ),
                DismissOutcome::NamespaceDeleted => println!(
                    "{} Deleted namespace '{}' with release '{}'",
                    style("✓").green(),
                    report.namespace,
                    report.release
                ),
                DismissOutcome::AlreadyAbsent => println!(
                    "{} Release '{}' not found in namespace '{}', nothing to do",
                    style("•").dim(),
                    report.release,
                    report.namespace
                ),
            }
            println!("  Source: {}", style(report.source).cyan());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Quiet => {}
    }

    Ok(())
}
