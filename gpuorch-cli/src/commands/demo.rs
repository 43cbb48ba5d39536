//! Example end-to-end flow
//!
//! Submits a ResNet-50/ImageNet training job, waits for it to finish and
//! reports its cost and placement.

use anyhow::{Context, Result};
use colored::*;
use gpuorch_client::WaitOptions;
use gpuorch_core::spec::SubmitJob;

use crate::commands::job::{print_job_details, wait_for_job};
use crate::config::Config;

fn example_job() -> SubmitJob {
    SubmitJob::new(
        "resnet50-imagenet",
        "pytorch_ddp",
        "s3://my-bucket/train.py",
        "s3://datasets/imagenet",
        8,
        100.0,
    )
    .allow_spot(true)
    .estimated_hours(20.0)
}

pub async fn run(config: &Config) -> Result<()> {
    let client = config.client();

    println!("{}\n", "=== GPU Orchestration Platform Client ===".bold());

    println!("Submitting training job...");
    let job = client
        .submit_job(&example_job())
        .await
        .context("Failed to submit job")?;
    println!("Job submitted! ID: {}\n", job.id.cyan());

    let final_job = wait_for_job(&client, &job.id, WaitOptions::default()).await?;

    println!("\n{}", "=== Job Complete ===".bold());
    print_job_details(&final_job);

    Ok(())
}
