//! Staged draw: countdown, paced reveal, completion.
//!
//! The result is computed in full when the reveal phase starts; the reveal only
//! paces how it is disclosed to the observer. Pool edits and new draws are
//! accepted while the machine is idle or showing a finished draw.

use crate::config::leagues::LeagueCatalog;
use crate::core::history::HistoryStore;
use crate::core::matching::{plan_matches, validate_matching};
use crate::core::selection::{select_winners, validate_selection};
use crate::domain::model::{
    DrawOutcome, DrawRecord, Entry, HistoryRecord, MatchRecord, Pool, RaffleKind,
};
use crate::domain::ports::{DrawEvent, DrawObserver, LedgerStorage};
use crate::utils::error::{RaffleError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Countdown runs 3, 2, 1.
pub const COUNTDOWN_START: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawTiming {
    pub countdown_tick: Duration,
    pub winner_reveal: Duration,
    pub pair_reveal: Duration,
    pub unassigned_reveal: Duration,
    pub focus_delay: Duration,
}

impl Default for DrawTiming {
    fn default() -> Self {
        Self {
            countdown_tick: Duration::from_millis(1000),
            winner_reveal: Duration::from_millis(500),
            pair_reveal: Duration::from_millis(500),
            unassigned_reveal: Duration::from_millis(300),
            focus_delay: Duration::from_millis(300),
        }
    }
}

impl DrawTiming {
    /// 所有間隔為零，用於測試與 `--fast`
    pub fn instant() -> Self {
        Self {
            countdown_tick: Duration::ZERO,
            winner_reveal: Duration::ZERO,
            pair_reveal: Duration::ZERO,
            unassigned_reveal: Duration::ZERO,
            focus_delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPhase {
    Idle,
    CountingDown,
    Revealing,
    Complete,
    Cancelled,
}

impl DrawPhase {
    fn accepts_new_draw(self) -> bool {
        matches!(self, DrawPhase::Idle | DrawPhase::Complete)
    }
}

impl fmt::Display for DrawPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DrawPhase::Idle => "idle",
            DrawPhase::CountingDown => "counting down",
            DrawPhase::Revealing => "revealing",
            DrawPhase::Complete => "complete",
            DrawPhase::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// What a finished draw produced.
#[derive(Debug)]
pub struct DrawReport {
    pub outcome: DrawOutcome,
    pub record: HistoryRecord,
    /// 抽獎已完成但寫入歷史失敗時的錯誤
    pub persistence_error: Option<RaffleError>,
}

impl DrawReport {
    pub fn kind(&self) -> RaffleKind {
        self.record.kind()
    }

    pub fn persisted(&self) -> bool {
        self.persistence_error.is_none()
    }
}

pub struct DrawMachine<L: LedgerStorage, O: DrawObserver> {
    history: HistoryStore<L>,
    observer: O,
    timing: DrawTiming,
    rng: StdRng,
    phase: DrawPhase,
    entries: Pool,
    teams: Pool,
    candidates: Pool,
    winner_count: usize,
    outcome: Option<DrawOutcome>,
    cancel: CancellationToken,
}

impl<L: LedgerStorage, O: DrawObserver> DrawMachine<L, O> {
    pub fn new(history: HistoryStore<L>, observer: O) -> Self {
        Self {
            history,
            observer,
            timing: DrawTiming::default(),
            rng: StdRng::from_os_rng(),
            phase: DrawPhase::Idle,
            entries: Pool::new(),
            teams: Pool::new(),
            candidates: Pool::new(),
            winner_count: 1,
            outcome: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_timing(mut self, timing: DrawTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn phase(&self) -> DrawPhase {
        self.phase
    }

    pub fn entries(&self) -> &Pool {
        &self.entries
    }

    pub fn teams(&self) -> &Pool {
        &self.teams
    }

    pub fn candidates(&self) -> &Pool {
        &self.candidates
    }

    pub fn winner_count(&self) -> usize {
        self.winner_count
    }

    pub fn outcome(&self) -> Option<&DrawOutcome> {
        self.outcome.as_ref()
    }

    pub fn history(&self) -> &HistoryStore<L> {
        &self.history
    }

    /// Token that aborts the running draw at its next timed step.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.phase.accepts_new_draw() {
            Ok(())
        } else {
            Err(RaffleError::DrawNotReady {
                phase: self.phase.to_string(),
            })
        }
    }

    pub fn add_entry(&mut self, name: &str) -> Result<()> {
        self.ensure_ready()?;
        self.entries.add(name)?;
        Ok(())
    }

    pub fn remove_entry(&mut self, index: usize) -> Result<Entry> {
        self.ensure_ready()?;
        self.entries.remove(index)
    }

    pub fn add_team(&mut self, name: &str) -> Result<()> {
        self.ensure_ready()?;
        self.teams.add(name)?;
        Ok(())
    }

    pub fn remove_team(&mut self, index: usize) -> Result<Entry> {
        self.ensure_ready()?;
        self.teams.remove(index)
    }

    pub fn add_candidate(&mut self, name: &str) -> Result<()> {
        self.ensure_ready()?;
        self.candidates.add(name)?;
        Ok(())
    }

    pub fn remove_candidate(&mut self, index: usize) -> Result<Entry> {
        self.ensure_ready()?;
        self.candidates.remove(index)
    }

    /// 以聯賽的隊伍取代目前的隊伍清單
    pub fn select_league(&mut self, catalog: &LeagueCatalog, name: &str) -> Result<()> {
        self.ensure_ready()?;
        let teams = Pool::from_names(catalog.teams(name)?)?;
        tracing::info!("📋 Loaded {} teams from league '{}'", teams.len(), name);
        self.teams = teams;
        Ok(())
    }

    /// Checked against the pool when the draw starts.
    pub fn set_winner_count(&mut self, count: usize) -> Result<()> {
        self.ensure_ready()?;
        self.winner_count = count;
        Ok(())
    }

    /// Clears every pool and result and returns to `Idle`.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.teams.clear();
        self.candidates.clear();
        self.winner_count = 1;
        self.outcome = None;
        self.phase = DrawPhase::Idle;
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        tracing::debug!("Session reset");
    }

    pub async fn draw_regular(&mut self) -> Result<DrawReport> {
        self.ensure_ready()?;
        validate_selection(&self.entries, self.winner_count)?;

        self.countdown(RaffleKind::Regular).await?;

        self.phase = DrawPhase::Revealing;
        let winners = select_winners(&self.entries, self.winner_count, &mut self.rng)?;
        for (index, winner) in winners.winners().iter().enumerate() {
            self.step(self.timing.winner_reveal).await?;
            self.observer.on_event(&DrawEvent::WinnerRevealed {
                rank: index + 1,
                winner: winner.clone(),
            });
        }

        let record = HistoryRecord::Regular(DrawRecord::new(&self.entries, &winners));
        self.complete(DrawOutcome::Winners(winners), record).await
    }

    pub async fn draw_matching(&mut self) -> Result<DrawReport> {
        self.ensure_ready()?;
        validate_matching(&self.teams, &self.candidates)?;

        self.countdown(RaffleKind::TeamMatching).await?;

        self.phase = DrawPhase::Revealing;
        let plan = plan_matches(&self.teams, &self.candidates, &mut self.rng)?;
        for &slot in &plan.assignment_order {
            self.step(self.timing.pair_reveal).await?;
            self.observer
                .on_event(&DrawEvent::PairRevealed(plan.results[slot].clone()));
        }
        for result in plan.results.iter().filter(|r| !r.is_assigned()) {
            self.step(self.timing.unassigned_reveal).await?;
            self.observer.on_event(&DrawEvent::UnassignedRevealed {
                team: result.team.clone(),
            });
        }

        let record = HistoryRecord::TeamMatching(MatchRecord::new(
            &self.teams,
            &self.candidates,
            &plan.results,
        ));
        self.complete(DrawOutcome::Matches(plan.results), record).await
    }

    async fn countdown(&mut self, kind: RaffleKind) -> Result<()> {
        self.outcome = None;
        self.phase = DrawPhase::CountingDown;
        tracing::info!("🎬 Starting {} draw", kind);

        for value in (1..=COUNTDOWN_START).rev() {
            let progress = (u32::from(COUNTDOWN_START - value) * 100 / u32::from(COUNTDOWN_START)) as u8;
            self.observer.on_event(&DrawEvent::Countdown { value, progress });
            self.step(self.timing.countdown_tick).await?;
        }
        self.observer
            .on_event(&DrawEvent::CountdownFinished { progress: 100 });
        Ok(())
    }

    /// One timed step. Cancellation is checked before the wait, never during it.
    async fn step(&mut self, interval: Duration) -> Result<()> {
        if self.cancel.is_cancelled() {
            self.phase = DrawPhase::Cancelled;
            self.outcome = None;
            self.observer.on_event(&DrawEvent::Cancelled);
            tracing::warn!("⛔ Draw cancelled");
            return Err(RaffleError::Cancelled);
        }
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
        Ok(())
    }

    async fn complete(&mut self, outcome: DrawOutcome, record: HistoryRecord) -> Result<DrawReport> {
        self.phase = DrawPhase::Complete;
        self.outcome = Some(outcome.clone());
        self.observer.on_event(&DrawEvent::Completed(outcome.clone()));
        tracing::info!("✅ {} draw complete", record.kind());

        let persistence_error = match self.history.append(record.clone()).await {
            Ok(()) => None,
            Err(e) => {
                tracing::error!("❌ Error saving raffle history: {}", e);
                tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
                Some(e)
            }
        };

        if !self.timing.focus_delay.is_zero() {
            tokio::time::sleep(self.timing.focus_delay).await;
        }
        self.observer.on_event(&DrawEvent::FocusResults);

        Ok(DrawReport {
            outcome,
            record,
            persistence_error,
        })
    }
}
