use crate::core::shuffle::shuffled;
use crate::domain::model::{MatchResult, Pool};
use crate::utils::error::{Result, ValidationError};
use rand::Rng;

/// A finished matching draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPlan {
    /// 每個隊伍一筆，依隊伍洗牌後的順序
    pub results: Vec<MatchResult>,
    /// indices into `results` in the order candidates were handed out
    pub assignment_order: Vec<usize>,
}

impl MatchPlan {
    pub fn assigned_count(&self) -> usize {
        self.assignment_order.len()
    }
}

pub fn validate_matching(teams: &Pool, candidates: &Pool) -> Result<()> {
    if teams.is_empty() {
        return Err(ValidationError::EmptyTeams.into());
    }
    if candidates.is_empty() {
        return Err(ValidationError::EmptyCandidates.into());
    }
    Ok(())
}

/// Randomly pairs teams with candidates, leaving surplus teams unassigned.
///
/// The teams that receive a candidate are picked from an independently
/// shuffled index range, so being unmatched does not depend on a team's
/// position in the team shuffle.
pub fn plan_matches<R: Rng + ?Sized>(teams: &Pool, candidates: &Pool, rng: &mut R) -> Result<MatchPlan> {
    validate_matching(teams, candidates)?;

    let shuffled_teams = shuffled(teams.entries(), rng);
    let shuffled_candidates = shuffled(candidates.entries(), rng);
    let assign = teams.len().min(candidates.len());

    let mut results: Vec<MatchResult> = shuffled_teams
        .iter()
        .map(|team| MatchResult {
            team: team.as_str().to_string(),
            candidate: None,
        })
        .collect();

    let slots: Vec<usize> = (0..teams.len()).collect();
    let mut assignment_order = shuffled(&slots, rng);
    assignment_order.truncate(assign);

    for (slot, candidate) in assignment_order.iter().zip(shuffled_candidates.iter()) {
        results[*slot].candidate = Some(candidate.as_str().to_string());
    }

    tracing::debug!(
        "Matched {} of {} teams ({} candidates)",
        assign,
        teams.len(),
        candidates.len()
    );

    Ok(MatchPlan {
        results,
        assignment_order,
    })
}

pub fn match_teams_to_candidates<R: Rng + ?Sized>(
    teams: &Pool,
    candidates: &Pool,
    rng: &mut R,
) -> Result<Vec<MatchResult>> {
    plan_matches(teams, candidates, rng).map(|plan| plan.results)
}
