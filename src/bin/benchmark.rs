use chrono::{Duration as ChronoDuration, Utc};
use colored::*;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use uuid::Uuid;

const DURATION_SECS: u64 = 20;

struct Target {
    name: &'static str,
    method: &'static str,
    url: String,
    body: Option<serde_json::Value>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let base_url = env::var("BENCH_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let admin_email = env::var("ADMIN_EMAIL").expect("ADMIN_EMAIL must be set to the seeded admin account");
    let admin_password = env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD must be set");

    println!("{}", "Starting Benchmark Suite".bold().green());
    println!("Target URL: {}", base_url);

    let client = Client::builder()
        .pool_max_idle_per_host(1000)
        .timeout(Duration::from_secs(10))
        .cookie_store(true)
        .build()
        .expect("Failed to build HTTP client");

    if client.get(format!("{}/api/v1/health", base_url)).send().await.is_err() {
        eprintln!("{}", format!("Server is NOT reachable at {}. Please start it first.", base_url).red().bold());
        return;
    }

    println!("\n{}", "Setting up benchmark data...".yellow());
    let csrf_token = login(&client, &base_url, &admin_email, &admin_password).await;
    let event_id = setup_event(&client, &base_url, &csrf_token).await;

    let bench_email = format!("bench-{}@example.com", Uuid::new_v4());
    let bench_password = "bench-password";
    let res = client.post(format!("{}/api/v1/auth/register", base_url))
        .json(&json!({ "name": "Bench User", "email": bench_email, "password": bench_password }))
        .send()
        .await
        .expect("Failed to register benchmark user");
    assert!(res.status().is_success(), "Failed to register benchmark user: {}", res.status());

    println!("{}", "Data created successfully.".green());
    println!("   Event ID: {}", event_id);

    let targets = vec![
        Target {
            name: "Health Check (Public)",
            method: "GET",
            url: format!("{}/api/v1/health", base_url),
            body: None,
        },
        Target {
            name: "Search Events (Public Read)",
            method: "GET",
            url: format!("{}/api/v1/events?search=benchmark&sortBy=popularity", base_url),
            body: None,
        },
        Target {
            name: "Get Event Details (Public Read + views)",
            method: "GET",
            url: format!("{}/api/v1/events/{}", base_url, event_id),
            body: None,
        },
        Target {
            name: "Login Flow (Crypto Intensive)",
            method: "POST",
            url: format!("{}/api/v1/auth/login", base_url),
            body: Some(json!({ "email": bench_email, "password": bench_password })),
        },
    ];

    let rps_stages = vec![10, 50, 200, 1000];

    for target in targets {
        println!("\n{}", "=".repeat(60));
        println!("Benchmarking Endpoint: {}", target.name.cyan().bold());
        println!("URL: {}", target.url);
        println!("{}", "=".repeat(60));

        println!("{:<10} | {:<15} | {:<15} | {:<15}", "RPS", "Mean (ms)", "P99 (ms)", "Success Rate");
        println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<15}", "", "", "", "");

        for &rps in &rps_stages {
            run_stage(&client, &target, rps).await;
        }
    }
}

async fn login(client: &Client, base_url: &str, email: &str, password: &str) -> String {
    let res = client.post(format!("{}/api/v1/auth/login", base_url))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Login failed during setup");

    if !res.status().is_success() {
        panic!("Login failed. Status: {}", res.status());
    }

    let auth_body: Value = res.json().await.expect("Failed to parse login response");
    auth_body["csrfToken"].as_str().expect("No csrfToken").to_string()
}

async fn setup_event(client: &Client, base_url: &str, csrf_token: &str) -> String {
    let res = client.post(format!("{}/api/v1/categories", base_url))
        .header("X-CSRF-Token", csrf_token)
        .json(&json!({ "name": format!("Benchmark {}", Uuid::new_v4()) }))
        .send()
        .await
        .expect("Failed to create category");
    let category: Value = res.json().await.expect("Failed to parse category response");
    let category_id = category["id"].as_str().expect("No category id");

    let event_payload = json!({
        "title": "Benchmark Concert",
        "description": "Load testing the catalog",
        "date": (Utc::now() + ChronoDuration::days(30)).to_rfc3339(),
        "location": "Server Room",
        "categoryId": category_id,
        "price": 25.0,
        "capacity": 100000,
        "imageUrl": "http://localhost/benchmark.jpg",
        "isPublished": true,
        "tags": ["benchmark"]
    });

    let res = client.post(format!("{}/api/v1/events", base_url))
        .header("X-CSRF-Token", csrf_token)
        .json(&event_payload)
        .send()
        .await
        .expect("Failed to create event");

    if !res.status().is_success() {
        let status = res.status();
        let txt = res.text().await.unwrap_or_default();
        panic!("Failed to create event data. Status: {}. Body: {}", status, txt);
    }

    let event: Value = res.json().await.expect("Failed to parse event response");
    event["id"].as_str().expect("No event id").to_string()
}

async fn run_stage(client: &Client, target: &Target, rps: u32) {
    let limiter = Arc::new(RateLimiter::direct(
        Quota::per_second(NonZeroU32::new(rps).unwrap())
    ));

    let (tx, mut rx) = mpsc::channel(50000);
    let start_time = Instant::now();
    let duration = Duration::from_secs(DURATION_SECS);

    loop {
        if start_time.elapsed() > duration {
            break;
        }

        if limiter.check().is_ok() {
            let client = client.clone();
            let url = target.url.clone();
            let body = target.body.clone();
            let method = target.method;
            let tx = tx.clone();

            tokio::spawn(async move {
                let req_start = Instant::now();
                let res = match method {
                    "GET" => client.get(&url).send().await,
                    "POST" => {
                        let mut req = client.post(&url);
                        if let Some(b) = body {
                            req = req.json(&b);
                        }
                        req.send().await
                    },
                    _ => client.get(&url).send().await,
                };
                let latency = req_start.elapsed();

                let success = match res {
                    Ok(r) => r.status().is_success(),
                    Err(_) => false,
                };

                let _ = tx.send((latency, success)).await;
            });
        } else {
            tokio::task::yield_now().await;
        }
    }

    drop(tx);

    let mut histogram = Histogram::<u64>::new(3).unwrap();
    let mut successes = 0;
    let mut total = 0;

    while let Some((latency, success)) = rx.recv().await {
        total += 1;
        if success { successes += 1; }
        histogram.record(latency.as_micros() as u64).unwrap();
    }

    let mean_ms = histogram.mean() / 1000.0;
    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;
    let success_rate = if total > 0 { (successes as f64 / total as f64) * 100.0 } else { 0.0 };

    println!(
        "{:<10} | {:<15.2} | {:<15.2} | {:<14.1}%",
        rps,
        mean_ms,
        p99_ms,
        success_rate
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
}