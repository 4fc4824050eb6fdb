use crate::domain::model::{assigned_first, DrawOutcome};
use crate::domain::ports::{DrawEvent, DrawObserver};

/// Prints draw progress to stdout for the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver;

impl DrawObserver for ConsoleObserver {
    fn on_event(&self, event: &DrawEvent) {
        match event {
            DrawEvent::Countdown { value, progress } => println!("⏳ {}... ({}%)", value, progress),
            DrawEvent::CountdownFinished { progress } => println!("🎲 Drawing! ({}%)", progress),
            DrawEvent::WinnerRevealed { rank, winner } => println!("🏆 #{} {}", rank, winner),
            DrawEvent::PairRevealed(result) => println!(
                "🤝 {} ← {}",
                result.team,
                result.candidate.as_deref().unwrap_or("-")
            ),
            DrawEvent::UnassignedRevealed { team } => println!("➖ {} (no candidate)", team),
            DrawEvent::Completed(outcome) => print_summary(outcome),
            DrawEvent::FocusResults => {}
            DrawEvent::Cancelled => println!("⛔ Draw cancelled"),
        }
    }
}

fn print_summary(outcome: &DrawOutcome) {
    println!("✅ Draw complete");
    match outcome {
        DrawOutcome::Winners(winners) => {
            for (index, winner) in winners.winners().iter().enumerate() {
                println!("  {}. {}", index + 1, winner);
            }
        }
        DrawOutcome::Matches(results) => {
            for result in assigned_first(results) {
                match result.candidate {
                    Some(candidate) => println!("  {} → {}", result.team, candidate),
                    None => println!("  {} → (empty)", result.team),
                }
            }
        }
    }
}
