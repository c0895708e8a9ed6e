mod ai;
mod api;
mod config;
mod models;
mod session;
mod weather;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use ai::gemini::GeminiClient;
use api::client::TempestClient;
use config::{AppConfig, Credentials};
use session::{LiveSource, Role, Session, SessionSettings, Snapshot};
use weather::alerts::NwsClient;

#[derive(Parser)]
#[command(name = "tempest-teacher", about = "Tempest weather dashboard with an AI meteorology teacher")]
struct Cli {
    /// Settings file
    #[arg(short, long, default_value = config::CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show alerts, live metrics, the hourly trend and the weekly outlook
    Dashboard {
        /// Skip generating the AI weekly outlook
        #[arg(long)]
        no_outlook: bool,
    },
    /// Print the AI weekly outlook
    Outlook,
    /// Ask the teacher a single question
    Ask {
        /// The question, e.g. "why is the pressure falling?"
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Interactive chat; /refresh reloads data, /metrics reprints cached readings, /outlook shows the outlook, /quit exits
    Chat {
        /// Write the conversation here as JSON when the chat ends
        #[arg(short, long)]
        transcript: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tempest_teacher=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load .env if present (override system env vars)
    dotenvy::dotenv_override().ok();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    let creds = Credentials::from_env()?;
    let mut session = build_session(&config, creds)?;

    match cli.command {
        Commands::Dashboard { no_outlook } => {
            let snapshot = session.load().await?;
            print_alerts(snapshot);
            print_metrics(snapshot);
            print_hourly(snapshot);
            print_daily(snapshot);
            if !no_outlook {
                print_outlook(session.outlook().await?);
            }
        }
        Commands::Outlook => {
            print_outlook(session.outlook().await?);
        }
        Commands::Ask { question } => {
            let answer = session.ask(&question.join(" ")).await?;
            println!("\n{}", answer);
        }
        Commands::Chat { transcript } => {
            let result = run_chat(&mut session).await;
            if let Some(path) = transcript {
                session.conversation().save(&path)?;
                info!("Transcript written to {}", path.display());
            }
            result?;
        }
    }

    Ok(())
}

fn build_session(config: &AppConfig, creds: Credentials) -> Result<Session<LiveSource>> {
    let timeout = config.http_timeout();
    let tempest = TempestClient::new(creds.tempest_token, &config.tempest_base_url, timeout)?;
    let nws = NwsClient::new(&config.user_agent, &config.nws_base_url, timeout)?;
    let gemini = GeminiClient::new(creds.gemini_api_key, &config.gemini_base_url, timeout)?;

    let chain = gemini.chain(&config.models);
    info!("Model fallback order: {}", chain.models().join(" -> "));

    Ok(Session::new(LiveSource::new(tempest, nws), chain, SessionSettings::from(config)))
}

async fn run_chat(session: &mut Session<LiveSource>) -> Result<()> {
    let snapshot = session.load().await?;
    println!("\n🎓 Tempest AI Meteorology Teacher · {}", snapshot.station.label());
    println!("   /refresh reloads data, /metrics shows readings, /outlook shows the week, /quit exits\n");
    for message in session.conversation().messages() {
        println!(
            "[{}] {}: {}\n",
            message.timestamp.with_timezone(&chrono::Local).format("%H:%M"),
            message.role,
            message.content
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("{}: ", Role::User);
        let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/refresh" => {
                session.invalidate();
                let snapshot = session.load().await?;
                println!("🔄 Data refreshed at {}", snapshot.fetched_at.with_timezone(&chrono::Local).format("%H:%M"));
                print_metrics(snapshot);
            }
            "/metrics" => match session.snapshot() {
                Some(snapshot) => print_metrics(snapshot),
                None => println!("No data loaded yet, try /refresh"),
            },
            "/outlook" => print_outlook(session.outlook().await?),
            question => {
                let answer = session.ask(question).await?;
                println!("\n{}: {}\n", Role::Assistant, answer);
            }
        }
    }

    Ok(())
}

fn print_alerts(snapshot: &Snapshot) {
    for alert in &snapshot.alerts {
        println!("\n⚠️  ACTIVE ALERT: {} ({})", alert.event, alert.severity);
        println!("   Source: {}", alert.sender_name);
        if let Some(headline) = &alert.headline {
            println!("   {}", headline);
        }
        for line in alert.description.lines().filter(|l| !l.trim().is_empty()) {
            println!("   {}", line.trim());
        }
    }
}

fn print_metrics(snapshot: &Snapshot) {
    let c = &snapshot.current;
    let pressure_delta = weather::pressure_delta(&c.pressure_trend_raw)
        .map(|d| format!("  {}", d))
        .unwrap_or_default();

    println!("\n📡 {}", snapshot.station.label());
    println!("{}", "-".repeat(60));
    println!("   {:<14} {}", "Condition", c.condition_text);
    println!("   {:<14} {:.1}°F", "Temperature", c.temperature_f);
    println!("   {:<14} {}%", "Humidity", weather::fmt_num(c.humidity_pct));
    println!("   {:<14} {:.2} inHg{}", "Pressure", c.pressure_inhg, pressure_delta);
    println!(
        "   {:<14} {:.1} mph ({})",
        "Wind", c.wind_speed_mph, weather::deg_to_compass(c.wind_direction_deg)
    );
    println!("   {:<14} {:.2} in", "Rain Today", c.rain_today_in);
}

fn print_hourly(snapshot: &Snapshot) {
    println!("\n📈 Hourly Trend ({})", snapshot.zone);
    if snapshot.hourly.is_empty() {
        println!("   No hourly forecast available");
        return;
    }
    println!("   {:<10} {:>10} {:>10}  {}", "Time", "Temp (°F)", "Rain (%)", "Conditions");
    println!("   {}", "-".repeat(56));
    for hour in &snapshot.hourly {
        println!(
            "   {:<10} {:>10.1} {:>10}  {}",
            hour.local_time.format("%a %I %p").to_string(),
            hour.temperature_f,
            weather::fmt_num(hour.rain_probability_pct),
            hour.condition_text,
        );
    }
}

fn print_daily(snapshot: &Snapshot) {
    match snapshot.daily.len() {
        0 => println!("\n🗓️  Daily Forecast"),
        n => println!("\n🗓️  {}-Day Forecast", n),
    }
    println!("{}", snapshot.summary.trim_end());
}

fn print_outlook(outlook: Option<&str>) {
    println!("\n📅 AI Weekly Strategy");
    println!("{}", "-".repeat(60));
    match outlook {
        Some(text) => println!("{}", text.trim()),
        None => println!("⚠️  Outlook unavailable right now, try again shortly."),
    }
}
