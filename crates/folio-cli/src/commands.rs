use anyhow::{bail, Context, Result};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use folio::config::Config;
use folio::template::recommend_templates;
use folio::{GenerationJob, GenerationRequest, GenerationService, JobStatus, TemplateCatalog};

use crate::args::{GenerateArgs, TemplatesArgs};

/// Lowercase wire name of a config enum, as written in the file.
fn wire_name<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

pub fn check_config(config: &Config) -> Result<()> {
    let catalog = TemplateCatalog::with_overrides(config.templates.clone());

    println!("Configuration OK (version {})", config.version);
    println!(
        "  content:    {} (model {})",
        wire_name(&config.content.provider),
        config.content.model
    );
    println!(
        "  storage:    {} ({})",
        wire_name(&config.storage.provider),
        config.storage.public_base_url()
    );
    println!(
        "  deployment: {} (poll {} ms, timeout {} ms)",
        wire_name(&config.deployment.provider),
        config.deployment.poll_interval_ms,
        config.deployment.timeout_ms
    );
    println!(
        "  templates:  {} ({} from config, default '{}')",
        catalog.len(),
        config.templates.len(),
        config.pipeline.default_template
    );
    Ok(())
}

pub fn templates(config: &Config, args: &TemplatesArgs) -> Result<()> {
    let request = GenerationRequest::from_file(&args.request)?;
    let catalog = TemplateCatalog::with_overrides(config.templates.clone());
    let count = args.count.unwrap_or(config.pipeline.recommendations);

    let ranked = recommend_templates(&request.profile, catalog.templates(), count);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    for scored in &ranked {
        println!(
            "{:>3}  {:<20} {}",
            scored.score, scored.template.id, scored.template.name
        );
    }
    Ok(())
}

pub async fn generate(config: Config, args: &GenerateArgs) -> Result<()> {
    let request = GenerationRequest::from_file(&args.request)?;
    let config = if args.offline {
        config.into_offline()
    } else {
        config
    };

    let service =
        GenerationService::from_config(&config).context("Failed to set up the pipeline")?;
    let job = follow_job(&service, request).await?;

    println!("{}", serde_json::to_string_pretty(&job)?);

    match job.status {
        JobStatus::Completed => Ok(()),
        status => bail!(
            "Generation {}: {}",
            status,
            job.error.as_deref().unwrap_or("no error recorded")
        ),
    }
}

/// Starts the job and prints progress to stderr until it finishes. The first
/// Ctrl-C requests cancellation; the job still ends through the pipeline.
async fn follow_job(service: &GenerationService, request: GenerationRequest) -> Result<GenerationJob> {
    let mut events = service.subscribe();
    let job_id = service.generate(request).id;
    info!(job_id = %job_id, "Generation started");

    let mut cancel_requested = false;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) if event.job_id == job_id => {
                    eprintln!("[{:>3}%] {}", event.progress, event.message);
                    if event.is_terminal() {
                        return Ok(event.job);
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(_)) => {
                    let job = service.get_generation_status(&job_id)?;
                    if job.is_finished() {
                        return Ok(job);
                    }
                }
                Err(RecvError::Closed) => return Ok(service.get_generation_status(&job_id)?),
            },
            signal = tokio::signal::ctrl_c(), if !cancel_requested => {
                signal.context("Failed to listen for Ctrl-C")?;
                cancel_requested = true;
                match service.cancel(&job_id) {
                    Ok(_) => eprintln!("Cancelling after the current step..."),
                    Err(e) => warn!(error = %e, "Cancellation not possible"),
                }
            }
        }
    }
}
