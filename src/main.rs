//! Sector Factions - headless turn runner
//!
//! Loads a scenario, cycles the turn phases with no automated decisions,
//! prints a faction summary and optionally writes the final save as JSON.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use sector_factions::catalog::StaticCatalog;
use sector_factions::scenario::Scenario;
use sector_factions::sector::Engine;

/// Run the faction turn cycle over a scenario
#[derive(Parser, Debug)]
#[command(name = "sector-factions")]
#[command(about = "Resolve faction turns for a scenario and report the outcome")]
struct Args {
    /// Scenario TOML (systems, factions, asset catalog, engine config)
    #[arg(long)]
    scenario: PathBuf,

    /// Number of full turns to run
    #[arg(long, default_value_t = 1)]
    turns: u32,

    /// Write the final save state as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sector_factions=info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = Scenario::load(&args.scenario)?;
    let mut engine = scenario.into_engine()?;
    tracing::info!(
        factions = engine.state().factions.len(),
        turns = args.turns,
        "scenario loaded"
    );

    // Four phases per turn
    for _ in 0..args.turns.saturating_mul(4) {
        engine.advance_phase()?;
        if engine.state().victor.is_some() {
            break;
        }
    }

    print_summary(&engine);

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&engine.save_state())?;
        fs::write(path, json)?;
        tracing::info!(path = %path.display(), "save written");
    }

    Ok(())
}

fn print_summary(engine: &Engine<StaticCatalog>) {
    let state = engine.state();
    println!("\n=== {} ===", state.sector.name);
    println!("Turn {} ({})", state.turn.turn, state.turn.phase);
    println!();
    println!(
        "{:<28} {:>7} {:>5} {:>3} {:>3} {:>3} {:>7} {:>6}",
        "Faction", "Credits", "HP", "F", "C", "W", "XP", "Assets"
    );
    for faction in &state.factions {
        let attrs = &faction.attributes;
        let status = if state.eliminated.contains(&faction.id) { " (eliminated)" } else { "" };
        println!(
            "{:<28} {:>7} {:>2}/{:<2} {:>3} {:>3} {:>3} {:>7} {:>6}{}",
            faction.name,
            faction.credits,
            attrs.hp,
            attrs.max_hp,
            attrs.force,
            attrs.cunning,
            attrs.wealth,
            faction.xp,
            faction.assets.len(),
            status
        );
    }
    println!();
    for faction in &state.factions {
        if let Some(goal) = &faction.goal {
            let status = if goal.is_completed {
                "completed".to_string()
            } else {
                format!("{} to go", goal.remaining())
            };
            println!(
                "{}: {} {}/{} ({})",
                faction.name,
                goal.kind.name(),
                goal.progress.current,
                goal.progress.target,
                status
            );
        }
    }
    if let Some(victor) = state.victor.and_then(|id| state.faction(id)) {
        println!("\nVictory: {}", victor.name);
    }
    println!(
        "\n{} events logged, {} this turn",
        state.log.len(),
        state.log.events_for_turn(state.turn.turn).count()
    );
}
