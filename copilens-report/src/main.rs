//! copilens-report - Copilot usage report CLI
//!
//! Loads the dashboard once and prints it as text, markdown or JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use copilens_core::analytics::{DashboardView, DistributionEntry};
use copilens_core::format::{format_count, format_long_date, format_percent};
use copilens_core::{build_provider, load_dashboard, Config};

#[derive(Parser, Debug)]
#[command(name = "copilens-report")]
#[command(about = "Copilot usage and adoption report")]
#[command(version)]
struct Args {
    /// Use seeded demo data instead of the GitHub API
    #[arg(long)]
    mock: bool,

    /// Seed for demo data (implies --mock)
    #[arg(long)]
    seed: Option<u64>,

    /// Config file (default: ~/.config/copilens/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Export format (md = markdown, json = JSON)
    #[arg(long)]
    export: Option<String>,

    /// Days in the trend window (overrides dashboard.trend_window)
    #[arg(long)]
    window: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config =
        Config::load_or_default(args.config.as_deref()).context("failed to load configuration")?;
    if args.mock || args.seed.is_some() {
        config.use_mock(args.seed);
    }
    if let Some(window) = args.window {
        config.dashboard.trend_window = window;
    }
    config.validate().context("invalid configuration")?;

    let _log_guard = copilens_core::logging::init(&config.logging).ok();
    tracing::info!(provider = ?config.provider.kind, "copilens-report starting");

    // Reject a bad format before doing any network work
    let format = match args.export.as_deref() {
        None => OutputFormat::Terminal,
        Some("md") => OutputFormat::Markdown,
        Some("json") => OutputFormat::Json,
        Some(other) => anyhow::bail!("Unknown export format: {}. Use 'md' or 'json'", other),
    };

    let provider = build_provider(&config).context("failed to create provider")?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let data = runtime
        .block_on(load_dashboard(provider.as_ref()))
        .context("failed to load dashboard")?;

    let view = DashboardView::new(&data, Utc::now(), config.dashboard);
    match format {
        OutputFormat::Terminal => print_terminal(&view),
        OutputFormat::Markdown => print_markdown(&view),
        OutputFormat::Json => print_json(&view)?,
    }

    Ok(())
}

enum OutputFormat {
    Terminal,
    Markdown,
    Json,
}

fn print_terminal(view: &DashboardView<'_>) {
    let summary = view.summary();
    let title = match summary.as_of {
        Some(date) => format!("Copilot Usage: {}", format_long_date(date)),
        None => "Copilot Usage".to_string(),
    };

    // Header
    println!();
    println!("╭{}╮", "─".repeat(60));
    println!("│{:^60}│", title);
    println!("╰{}╯", "─".repeat(60));
    println!();

    println!("SUMMARY");
    println!(
        "   Seats: {:<10} Assigned: {:<10} Unassigned: {}",
        format_count(summary.total_seats),
        format_count(summary.assigned_seats),
        format_count(summary.unassigned_seats)
    );
    println!(
        "   Active: {:<9} Engaged: {:<11} Adoption: {} ({})",
        format_count(summary.active_users),
        format_count(summary.engaged_users),
        format_percent(summary.adoption.ratio),
        summary.adoption.level.label()
    );
    println!();

    if summary.as_of.is_none() {
        println!("  No daily metrics available.");
        println!();
    } else {
        println!("FEATURES");
        for feature in view.features() {
            println!(
                "   {:<18} {:>7} {:>5}",
                feature.display_name,
                format_count(feature.engaged_users),
                format_percent(feature.rate(summary.engaged_users))
            );
        }
        println!();

        let active = view.active_users_detail();
        println!("ACTIVITY");
        println!(
            "   {}-day average: {}   Peak: {}",
            active.average_days,
            format_count(active.average_active),
            format_count(active.peak_active)
        );
        println!();

        println!("TREND");
        for point in view.trend() {
            println!(
                "   {:<8} {:>6} active {:>6} engaged",
                point.label,
                format_count(point.active),
                format_count(point.engaged)
            );
        }
        println!();
    }

    let seats = view.seats_overview();
    print_distribution("SEATS BY TEAM", &seats.by_team);
    print_distribution("SEATS BY EDITOR", &seats.by_editor);
    print_distribution("SEATS BY LAST ACTIVITY", &seats.by_activity);
}

fn print_distribution(title: &str, entries: &[DistributionEntry]) {
    println!("{}", title);
    if entries.is_empty() {
        println!("   (no seats)");
    }
    for entry in entries {
        println!("   {:<20} {:>6}", entry.label, format_count(entry.count));
    }
    println!();
}

fn print_markdown(view: &DashboardView<'_>) {
    let summary = view.summary();
    match summary.as_of {
        Some(date) => println!("# Copilot Usage: {}", format_long_date(date)),
        None => println!("# Copilot Usage"),
    }
    println!();

    // Summary table
    println!("## Summary");
    println!();
    println!("| Metric | Value |");
    println!("|--------|-------|");
    println!("| Total Seats | {} |", summary.total_seats);
    println!("| Assigned Seats | {} |", summary.assigned_seats);
    println!("| Unassigned Seats | {} |", summary.unassigned_seats);
    println!("| Active Users | {} |", summary.active_users);
    println!("| Engaged Users | {} |", summary.engaged_users);
    println!(
        "| Adoption Rate | {} ({}) |",
        format_percent(summary.adoption.ratio),
        summary.adoption.level.label()
    );
    println!();

    if summary.as_of.is_none() {
        println!("*No daily metrics available.*");
        println!();
    } else {
        println!("## Features");
        println!();
        println!("| Feature | Users | Rate |");
        println!("|---------|-------|------|");
        for feature in view.features() {
            println!(
                "| {} | {} | {} |",
                feature.display_name,
                feature.engaged_users,
                format_percent(feature.rate(summary.engaged_users))
            );
        }
        println!();

        println!("## Trend");
        println!();
        println!("| Date | Active | Engaged |");
        println!("|------|--------|---------|");
        for point in view.trend() {
            println!("| {} | {} | {} |", point.date, point.active, point.engaged);
        }
        println!();
    }

    let seats = view.seats_overview();
    for (title, entries) in [
        ("Seats by Team", &seats.by_team),
        ("Seats by Editor", &seats.by_editor),
        ("Seats by Last Activity", &seats.by_activity),
    ] {
        println!("## {}", title);
        println!();
        if entries.is_empty() {
            println!("*No seats assigned.*");
        } else {
            println!("| Group | Seats |");
            println!("|-------|-------|");
            for entry in entries {
                println!("| {} | {} |", entry.label, entry.count);
            }
        }
        println!();
    }
}

fn print_json(view: &DashboardView<'_>) -> Result<()> {
    let json = serde_json::json!({
        "generated_at": view.now,
        "summary": view.summary(),
        "features": view.features(),
        "active_users": view.active_users_detail(),
        "adoption": view.adoption_detail(),
        "seats": view.seats_overview(),
        "trend": view.trend(),
    });

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
