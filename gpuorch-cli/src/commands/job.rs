//! Job command handlers
//!
//! Handles all job-related CLI commands: submission, inspection, listing,
//! waiting and cancellation.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::*;
use gpuorch_client::{Job, JobStatus, OrchestratorClient, WaitOptions};
use gpuorch_core::domain::artifact::{ArtifactKind, JobArtifact};
use gpuorch_core::domain::event::JobEvent;
use gpuorch_core::dto::job::ListJobsQuery;
use gpuorch_core::spec::SubmitJob;

use crate::config::Config;

/// Parameters shared by `submit` and `spec`
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Job name
    #[arg(long)]
    pub name: String,
    /// Training framework (e.g. pytorch_ddp, horovod, tensorflow_multiworker)
    #[arg(long)]
    pub framework: String,
    /// Location of the training script
    #[arg(long)]
    pub entrypoint: String,
    /// Location of the dataset
    #[arg(long)]
    pub dataset: String,
    /// Number of GPUs
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub gpus: u32,
    /// Maximum spend in USD
    #[arg(long)]
    pub budget: f64,
    /// Forbid spot (preemptible) capacity
    #[arg(long)]
    pub no_spot: bool,
    /// Expected runtime in hours
    #[arg(long, default_value_t = 10.0)]
    pub estimated_hours: f64,
}

impl SubmitArgs {
    pub fn to_submission(&self) -> SubmitJob {
        SubmitJob::new(
            &self.name,
            &self.framework,
            &self.entrypoint,
            &self.dataset,
            self.gpus,
            self.budget,
        )
        .allow_spot(!self.no_spot)
        .estimated_hours(self.estimated_hours)
    }
}

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Submit a training job
    Submit {
        #[command(flatten)]
        args: SubmitArgs,

        /// Wait for the job to finish after submitting
        #[arg(long)]
        wait: bool,

        /// Seconds between polls when waiting
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
        poll_interval: u64,
    },
    /// Print the job specification a submission would send
    Spec {
        #[command(flatten)]
        args: SubmitArgs,
    },
    /// Get job details
    Get {
        /// Job ID
        id: String,
    },
    /// List jobs
    List {
        /// Only jobs in this status
        #[arg(long)]
        status: Option<String>,

        /// Maximum number of jobs to return
        #[arg(long)]
        limit: Option<u32>,

        /// Cursor returned by a previous listing
        #[arg(long)]
        cursor: Option<String>,
    },
    /// Wait until a job completes, fails or is cancelled
    Wait {
        /// Job ID
        id: String,

        /// Seconds between polls
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
        poll_interval: u64,

        /// Give up after this many seconds (waits indefinitely by default)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Cancel a job
    Cancel {
        /// Job ID
        id: String,
    },
    /// Show the status transitions of a job
    Events {
        /// Job ID
        id: String,
    },
    /// List artifacts produced by a job
    Artifacts {
        /// Job ID
        id: String,

        /// Only artifacts of this type (checkpoint, log, output, metrics)
        #[arg(long = "type")]
        kind: Option<String>,
    },
}

/// Handle job commands
///
/// Routes job subcommands to their respective handlers.
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        JobCommands::Submit {
            args,
            wait,
            poll_interval,
        } => submit_job(&client, &args, wait.then(|| Duration::from_secs(poll_interval))).await,
        JobCommands::Spec { args } => print_spec(&args),
        JobCommands::Get { id } => get_job(&client, &id).await,
        JobCommands::List {
            status,
            limit,
            cursor,
        } => {
            let query = ListJobsQuery {
                status: status.map(JobStatus::from),
                limit,
                cursor,
            };
            list_jobs(&client, &query).await
        }
        JobCommands::Wait {
            id,
            poll_interval,
            timeout,
        } => {
            let mut options = WaitOptions::every(Duration::from_secs(poll_interval));
            if let Some(secs) = timeout {
                options = options.timeout(Duration::from_secs(secs));
            }
            let job = wait_for_job(&client, &id, options).await?;
            println!();
            print_job_details(&job);
            Ok(())
        }
        JobCommands::Cancel { id } => cancel_job(&client, &id).await,
        JobCommands::Events { id } => list_events(&client, &id).await,
        JobCommands::Artifacts { id, kind } => {
            list_artifacts(&client, &id, kind.map(ArtifactKind::from)).await
        }
    }
}

/// Submit a job, optionally waiting for it
async fn submit_job(
    client: &OrchestratorClient,
    args: &SubmitArgs,
    wait: Option<Duration>,
) -> Result<()> {
    let job = client
        .submit_job(&args.to_submission())
        .await
        .context("Failed to submit job")?;

    println!("{} Job submitted! ID: {}", "✓".green(), job.id.cyan());

    if let Some(poll_interval) = wait {
        let job = wait_for_job(client, &job.id, WaitOptions::every(poll_interval)).await?;
        println!();
        print_job_details(&job);
    }

    Ok(())
}

/// Print the rendered specification without submitting
fn print_spec(args: &SubmitArgs) -> Result<()> {
    let submission = args.to_submission();
    submission.validate()?;

    print!("{}", submission.to_spec().to_yaml()?);

    Ok(())
}

/// Get and display a single job
async fn get_job(client: &OrchestratorClient, id: &str) -> Result<()> {
    let job = client.get_job(id).await.context("Failed to get job")?;

    print_job_details(&job);

    Ok(())
}

/// List one page of jobs
async fn list_jobs(client: &OrchestratorClient, query: &ListJobsQuery) -> Result<()> {
    let page = client
        .list_jobs_page(query)
        .await
        .context("Failed to list jobs")?;

    if page.items.is_empty() {
        println!("{}", "No jobs found.".yellow());
    } else {
        println!("{}", format!("Found {} job(s):", page.items.len()).bold());
        println!();
        for job in &page.items {
            print_job_summary(job);
        }
    }

    if let Some(cursor) = page.next() {
        println!("{} --cursor {}", "More jobs available:".dimmed(), cursor);
    }

    Ok(())
}

/// Poll a job until it is terminal, printing each observed status
pub(crate) async fn wait_for_job(
    client: &OrchestratorClient,
    id: &str,
    options: WaitOptions,
) -> Result<Job> {
    println!("Waiting for job {} to complete...", id.cyan());

    client
        .wait_with(id, options, |job| {
            println!("Status: {}", colorize_status(&job.status));
        })
        .await
        .with_context(|| format!("Failed while waiting for job {}", id))
}

/// Cancel a job
async fn cancel_job(client: &OrchestratorClient, id: &str) -> Result<()> {
    let job = client.cancel_job(id).await.context("Failed to cancel job")?;

    println!(
        "{} Job {} is now {}",
        "✓".green(),
        job.id.cyan(),
        colorize_status(&job.status)
    );

    Ok(())
}

/// List the status transitions of a job
async fn list_events(client: &OrchestratorClient, id: &str) -> Result<()> {
    let events = client
        .job_events(id)
        .await
        .context("Failed to get job events")?;

    if events.is_empty() {
        println!("{}", "No events recorded for this job.".yellow());
    } else {
        println!("{}", format!("Events for job {}:", id).bold());
        println!("{}", "─".repeat(80).dimmed());
        for event in &events {
            print_event(event);
        }
        println!("{}", "─".repeat(80).dimmed());
    }

    Ok(())
}

/// List the artifacts of a job
async fn list_artifacts(
    client: &OrchestratorClient,
    id: &str,
    kind: Option<ArtifactKind>,
) -> Result<()> {
    let artifacts = client
        .job_artifacts(id, kind)
        .await
        .context("Failed to get job artifacts")?;

    if artifacts.is_empty() {
        println!("{}", "No artifacts found for this job.".yellow());
    } else {
        println!("{}", format!("Artifacts for job {}:", id).bold());
        println!();
        for artifact in &artifacts {
            print_artifact(artifact);
        }
    }

    Ok(())
}

/// Print a one-job summary for listings
fn print_job_summary(job: &Job) {
    println!("  {} Job {}", "▸".cyan(), job.id.dimmed());
    if let Some(name) = &job.name {
        println!("    Name:      {}", name);
    }
    println!("    Status:    {}", colorize_status(&job.status));
    if let Some(framework) = &job.framework {
        println!("    Framework: {}", framework.dimmed());
    }
    if let Some(created) = job.created_at {
        println!(
            "    Created:   {}",
            created.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }
    println!();
}

/// Print detailed job information
pub(crate) fn print_job_details(job: &Job) {
    println!("{}", "Job Details:".bold());
    println!("  ID:        {}", job.id.cyan());
    if let Some(name) = &job.name {
        println!("  Name:      {}", name);
    }
    println!("  Status:    {}", colorize_status(&job.status));
    if let Some(job_type) = &job.job_type {
        println!("  Type:      {}", job_type);
    }
    if let Some(framework) = &job.framework {
        println!("  Framework: {}", framework);
    }
    if let Some(mode) = &job.execution_mode {
        println!("  Execution: {}", mode);
    }
    println!("  Cost:      ${:.2}", job.running_cost_usd());
    if let Some(estimated) = job.cost.as_ref().and_then(|c| c.estimated_usd) {
        println!("  Estimated: ${:.2}", estimated);
    }

    if let Some(timestamps) = &job.timestamps {
        if let Some(created) = timestamps.created_at {
            println!("  Created:   {}", created.format("%Y-%m-%d %H:%M:%S"));
        }
        if let Some(started) = timestamps.started_at {
            println!("  Started:   {}", started.format("%Y-%m-%d %H:%M:%S"));
        }
        if let Some(finished) = timestamps.finished_at {
            println!("  Finished:  {}", finished.format("%Y-%m-%d %H:%M:%S"));

            if let Some(started) = timestamps.started_at {
                let duration = finished.signed_duration_since(started);
                println!("  Duration:  {}s", duration.num_seconds());
            }
        }
    }

    if let Some(selected) = &job.selected {
        println!("\n{}", "Placement:".bold());
        println!("  Provider:  {}", selected.provider.as_deref().unwrap_or("-"));
        println!("  Region:    {}", selected.region.as_deref().unwrap_or("-"));
        println!(
            "  Instance:  {}",
            selected.instance_type.as_deref().unwrap_or("-")
        );
        if let Some(backend) = &selected.backend {
            println!("  Backend:   {}", backend);
        }
        if let Some(spot) = selected.spot {
            println!("  Spot:      {}", if spot { "yes" } else { "no" });
        }
        if let Some(count) = selected.count {
            println!("  Count:     {}", count);
        }
    }
}

fn print_event(event: &JobEvent) {
    let transition = match &event.from_status {
        Some(from) => format!("{} → {}", from, colorize_status(&event.to_status)),
        None => colorize_status(&event.to_status).to_string(),
    };

    println!(
        "{} {} {}",
        event.at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
        transition,
        event.reason.dimmed()
    );
}

fn print_artifact(artifact: &JobArtifact) {
    println!(
        "  {} [{}] {} {}",
        "▸".cyan(),
        artifact.kind.to_string().yellow(),
        artifact.uri,
        artifact
            .created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> ColoredString {
    let status_str = status.as_str();
    match status {
        JobStatus::Pending | JobStatus::Submitted | JobStatus::Scheduled => status_str.yellow(),
        JobStatus::Provisioning | JobStatus::Running | JobStatus::Checkpointing => {
            status_str.cyan()
        }
        JobStatus::Completed => status_str.green(),
        JobStatus::Failed => status_str.red(),
        JobStatus::Cancelled => status_str.dimmed(),
        JobStatus::Other(_) => status_str.normal(),
    }
}
