use anyhow::{Context, Result};
use clap::Parser;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target URL (e.g., http://localhost:8000)
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    /// Number of save events to generate
    #[arg(short, long, default_value_t = 100)]
    saves: usize,

    /// Number of concurrent requests
    #[arg(short, long, default_value_t = 10)]
    concurrency: usize,

    /// Admin email (must be on the server's allow-list)
    #[arg(short, long)]
    email: String,

    /// Admin password
    #[arg(short, long, default_value = "password")]
    password: String,
}

#[derive(Deserialize, Debug, Clone)]
struct Candidate {
    name: String,
    list_name: String,
}

#[derive(Serialize)]
struct AdminLoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct SelectionEntry {
    name: String,
    list_name: String,
}

#[derive(Serialize)]
struct SaveSelectionsRequest {
    selections: Vec<SelectionEntry>,
}

#[derive(Deserialize, Debug)]
struct SessionResponse {
    #[allow(dead_code)]
    group_id: String,
    selection_count: usize,
}

fn random_batch(candidates: &[Candidate]) -> Vec<SelectionEntry> {
    let mut rng = rand::thread_rng();
    let size = rng.gen_range(1..=candidates.len().min(9));

    let mut picks: Vec<&Candidate> = candidates.iter().collect();
    picks.shuffle(&mut rng);
    picks
        .into_iter()
        .take(size)
        .map(|c| SelectionEntry {
            name: c.name.clone(),
            list_name: c.list_name.clone(),
        })
        .collect()
}

async fn run_save(client: &Client, base_url: &str, candidates: &[Candidate]) -> Result<()> {
    let save_url = format!("{}/api/admin/selections", base_url);

    client
        .post(&save_url)
        .json(&SaveSelectionsRequest {
            selections: random_batch(candidates),
        })
        .send()
        .await
        .context("Failed to send save request")?
        .error_for_status()
        .context("Save failed")?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    println!("🚀 Starting load test against {}", args.url);
    println!("💾 Saves: {}", args.saves);
    println!("⚡ Concurrency: {}", args.concurrency);

    // All saves share one authenticated admin session
    let client = Client::builder()
        .cookie_store(true)
        .build()
        .context("Failed to build client")?;

    let login_url = format!("{}/api/admin/login", args.url);
    client
        .post(&login_url)
        .json(&AdminLoginRequest {
            email: args.email.clone(),
            password: args.password.clone(),
        })
        .send()
        .await
        .context("Failed to send login request")?
        .error_for_status()
        .context("Failed to login as admin")?;

    println!("🔑 Logged in as {}", args.email);

    // Fetch the rosters once
    let candidates_url = format!("{}/api/candidates", args.url);
    let candidates: Vec<Candidate> = client
        .get(&candidates_url)
        .send()
        .await
        .context("Failed to fetch candidates")?
        .json()
        .await
        .context("Failed to parse candidates")?;

    if candidates.is_empty() {
        anyhow::bail!("No candidates found on the server. Seed the rosters first.");
    }
    println!("📋 Found {} roster candidates", candidates.len());

    let candidates = Arc::new(candidates);
    let base_url = Arc::new(args.url.clone());
    let client = Arc::new(client);

    let success_count = Arc::new(AtomicUsize::new(0));
    let failure_count = Arc::new(AtomicUsize::new(0));

    let pb = ProgressBar::new(args.saves as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let start_time = Instant::now();

    let results = stream::iter(0..args.saves)
        .map(|_| {
            let base_url = base_url.clone();
            let candidates = candidates.clone();
            let client = client.clone();
            let success_count = success_count.clone();
            let failure_count = failure_count.clone();
            let pb = pb.clone();

            async move {
                match run_save(&client, &base_url, &candidates).await {
                    Ok(_) => {
                        success_count.fetch_add(1, Ordering::Relaxed);
                        pb.set_message(format!(
                            "Success: {}",
                            success_count.load(Ordering::Relaxed)
                        ));
                    }
                    Err(_e) => {
                        failure_count.fetch_add(1, Ordering::Relaxed);
                        pb.set_message(format!(
                            "Errors: {}",
                            failure_count.load(Ordering::Relaxed)
                        ));
                    }
                }
                pb.inc(1);
            }
        })
        .buffer_unordered(args.concurrency)
        .collect::<Vec<()>>();

    results.await;

    pb.finish_with_message("Done");

    let duration = start_time.elapsed();
    let successes = success_count.load(Ordering::Relaxed);
    let failures = failure_count.load(Ordering::Relaxed);
    let rps = successes as f64 / duration.as_secs_f64();

    // Concurrent saves land within the clustering window, so the server
    // may reconstruct fewer sessions than saves; report what it sees.
    let history_url = format!(
        "{}/api/viewer/{}/history",
        args.url,
        args.email.to_lowercase()
    );
    let history: Vec<SessionResponse> = client
        .get(&history_url)
        .send()
        .await
        .context("Failed to fetch history")?
        .json()
        .await
        .context("Failed to parse history")?;

    let rows: usize = history.iter().map(|s| s.selection_count).sum();

    println!("\n📊 Results:");
    println!("   Time taken: {:?}", duration);
    println!("   Total saves: {}", args.saves);
    println!("   Successful saves: {}", successes);
    println!("   Failed saves: {}", failures);
    println!("   Throughput: {:.2} saves/sec", rps);
    println!("   Reconstructed sessions: {}", history.len());
    println!("   Selection rows: {}", rows);

    Ok(())
}
