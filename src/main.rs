use std::env;
use std::fs;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use nearby_traveler::dates::parse_instant;
use nearby_traveler::{BucketKind, Clock, LocationView, SystemClock, TravelPlan, User};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <user.json> <plans.json> [now]", args[0]);
        eprintln!("  user.json: user profile as returned by /api/users/:id");
        eprintln!("  plans.json: array as returned by /api/travel-plans/:id");
        eprintln!("  now: RFC 3339 timestamp or YYYY-MM-DD (default: current time)");
        std::process::exit(1);
    }

    let user: User = read_json(&args[1])?;
    let plans: Vec<TravelPlan> = read_json(&args[2])?;

    let now = match args.get(3) {
        Some(raw) => parse_now(raw)?,
        None => SystemClock.now(),
    };

    let view = LocationView::build(&user, &plans, now);

    println!("User: {} ({}, {})", user.username, user.id, user.user_type);
    println!("As of: {}", now.to_rfc3339());
    println!("Hometown: {}", display_or_none(&view.resolved.hometown));

    match (&view.resolved.travel_to, view.resolved.is_traveling) {
        (Some(dest), true) => println!("Status: TRAVELING to {}", dest),
        _ => println!("Status: AT HOME"),
    }

    println!("Badge: {}", view.badge.label);
    for kind in [BucketKind::HereNow, BucketKind::Locals] {
        println!("Bucket '{}': {}", kind, display_or_none(view.buckets.get(kind)));
    }
    println!(
        "Weather lookup: {}",
        view.weather_location.as_deref().unwrap_or("N/A")
    );

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path))
}

fn parse_now(raw: &str) -> Result<DateTime<Utc>> {
    match parse_instant(raw) {
        Some(now) => Ok(now),
        None => bail!("Invalid 'now' value: {}", raw),
    }
}

fn display_or_none(s: &str) -> &str {
    if s.is_empty() { "N/A" } else { s }
}
