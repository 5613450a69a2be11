//! Batch command: many images from a JSONL job file
//!
//! Fonts are loaded once for the whole run. A failing job is reported and
//! skipped; the command fails at the end if any job did.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use captcha::error::{CaptchaError, Result};
use captcha::{Captcha, RngSource};

use super::pick_format;
use crate::cli::BatchArgs;

/// One line of the job file
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchJob {
    /// Text to draw
    pub text: String,
    /// Output file name, relative to the output directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Output format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Seed for a reproducible image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl BatchJob {
    /// Where this job writes, given its position in the file
    pub fn output_path(&self, dir: &Path, pattern: &str, job_number: usize) -> PathBuf {
        match &self.output {
            Some(name) => dir.join(name),
            None => {
                let format = pick_format(self.format.as_deref(), None);
                dir.join(format!("{}.{}", pattern.replace("{}", &job_number.to_string()), format))
            },
        }
    }
}

pub fn run(args: &BatchArgs) -> Result<()> {
    let captcha = Captcha::new(&args.generator.config(), args.generator.strategy())?;

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => {
            if !args.quiet {
                eprintln!("Reading jobs from stdin...");
            }
            Box::new(BufReader::new(io::stdin()))
        },
    };

    fs::create_dir_all(&args.output)?;

    let mut job_count = 0;
    let mut error_count = 0;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        job_count += 1;

        let job: BatchJob = match serde_json::from_str(&line) {
            Ok(job) => job,
            Err(e) => {
                log::warn!("line {}: invalid job: {}", line_num + 1, e);
                eprintln!("Error parsing job on line {}: {}", line_num + 1, e);
                error_count += 1;
                continue;
            },
        };

        let path = job.output_path(&args.output, &args.pattern, job_count);
        match process_job(&captcha, &job, &path) {
            Ok(bytes) => {
                if args.verbose {
                    eprintln!("Job {}: {:?} -> {} ({} bytes)", job_count, job.text, path.display(), bytes);
                }
            },
            Err(e) => {
                log::warn!("job {} ({:?}) failed: {}", job_count, job.text, e);
                eprintln!("Error processing job {}: {}", job_count, e);
                error_count += 1;
            },
        }
    }

    if !args.quiet {
        eprintln!(
            "Batch complete: {} jobs, {} succeeded, {} failed",
            job_count,
            job_count - error_count,
            error_count
        );
    }

    if error_count > 0 {
        Err(CaptchaError::Other(format!("{} of {} jobs failed", error_count, job_count)))
    } else {
        Ok(())
    }
}

fn process_job(captcha: &Captcha, job: &BatchJob, path: &Path) -> Result<usize> {
    let format = pick_format(job.format.as_deref(), Some(path));
    let encoded = match job.seed {
        Some(seed) => captcha.generate_with(&job.text, &format, &mut RngSource::seeded(seed))?,
        None => captcha.generate(&job.text, &format)?,
    };
    let bytes = encoded.into_inner();
    fs::write(path, &bytes)?;
    Ok(bytes.len())
}
