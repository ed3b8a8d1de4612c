use clap::Parser;
use daas_detector::{
    shared::{
        config::DEFAULT_SERVICE,
        render::{render_report, view_record},
    },
    ArtifactAggregator, CollectionEnvironment, DetectorConfig, DetectorError,
};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

/// Collects artifacts left by VDI/DaaS clients for the current user.
#[derive(Parser, Debug)]
#[command(name = "daas-detector", version)]
struct Args {
    /// YAML file with service profiles; built-in profiles are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Service to analyze
    #[arg(long, default_value = DEFAULT_SERVICE)]
    service: String,

    /// Override %LOCALAPPDATA% (e.g. a mounted image)
    #[arg(long)]
    local_app_data: Option<PathBuf>,

    /// Override %USERPROFILE%
    #[arg(long)]
    user_profile: Option<PathBuf>,

    /// List the configured services and exit
    #[arg(long)]
    list_services: bool,

    /// Print the full report as JSON
    #[arg(long, conflicts_with = "view")]
    json: bool,

    /// Print the content of one table row
    #[arg(long, value_name = "ROW")]
    view: Option<usize>,
}

fn environment(args: &Args) -> Result<CollectionEnvironment, DetectorError> {
    match (&args.local_app_data, &args.user_profile) {
        (Some(local), Some(profile)) => Ok(CollectionEnvironment::new(local, profile)),
        (local, profile) => {
            let mut env = CollectionEnvironment::from_process_env()?;
            if let Some(local) = local {
                env.local_app_data = local.clone();
            }
            if let Some(profile) = profile {
                env.user_profile = profile.clone();
            }
            Ok(env)
        }
    }
}

fn run(args: Args) -> Result<(), DetectorError> {
    let config = match &args.config {
        Some(path) => DetectorConfig::load(path)?,
        None => DetectorConfig::default(),
    };

    if args.list_services {
        for name in config.service_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let profile = config.service(&args.service)?;
    let environment = environment(&args)?;
    info!("Local application data: {}", environment.local_app_data.display());

    let report = ArtifactAggregator::new(environment, config.settings.clone()).collect(profile);
    info!(
        "Collected {} artifacts, {} collection failures",
        report.records.len(),
        report.failures.len()
    );

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(daas_detector::CollectionError::from)?;
        println!("{}", json);
    } else if let Some(row) = args.view {
        println!("{}", view_record(&report.records, row)?);
    } else {
        print!("{}", render_report(&report));
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
