use crate::domain::model::{assigned_first, DrawOutcome, MatchResult, WinnerSet};
use crate::utils::error::{RaffleError, Result};
use std::path::Path;

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| RaffleError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| RaffleError::persistence(e.to_string()))
}

/// `Rank,Winner`，名次從 1 開始
pub fn winners_csv(winners: &WinnerSet) -> Result<String> {
    let mut writer = csv_writer();
    writer.write_record(["Rank", "Winner"])?;
    for (index, winner) in winners.winners().iter().enumerate() {
        writer.write_record([(index + 1).to_string().as_str(), winner.as_str()])?;
    }
    finish(writer)
}

/// `Team,Candidate`; assigned pairs come first, unassigned teams get an empty
/// candidate cell.
pub fn matches_csv(results: &[MatchResult]) -> Result<String> {
    let mut writer = csv_writer();
    writer.write_record(["Team", "Candidate"])?;
    for result in assigned_first(results) {
        writer.write_record([result.team.as_str(), result.candidate.as_deref().unwrap_or("")])?;
    }
    finish(writer)
}

pub fn outcome_csv(outcome: &DrawOutcome) -> Result<String> {
    match outcome {
        DrawOutcome::Winners(winners) => winners_csv(winners),
        DrawOutcome::Matches(results) => matches_csv(results),
    }
}

pub async fn write_csv(path: &Path, outcome: &DrawOutcome) -> Result<()> {
    let content = outcome_csv(outcome)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, content).await?;
    tracing::info!("📁 Results exported to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Entry;

    #[test]
    fn test_winners_csv_ranks_in_draw_order() {
        let winners = WinnerSet(vec![
            Entry::new("Bob").unwrap(),
            Entry::new("Ann, Jr.").unwrap(),
        ]);
        let csv = winners_csv(&winners).unwrap();
        assert_eq!(csv, "Rank,Winner\n1,Bob\n2,\"Ann, Jr.\"\n");
    }

    #[test]
    fn test_matches_csv_lists_unassigned_last() {
        let results = vec![
            MatchResult { team: "T3".into(), candidate: None },
            MatchResult { team: "T1".into(), candidate: Some("C2".into()) },
        ];
        let csv = matches_csv(&results).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines, vec!["Team,Candidate", "T1,C2", "T3,"]);
    }
}
