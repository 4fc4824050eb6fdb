use crate::utils::error::{Result, ValidationError};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 去除前後空白後的非空字串
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry(String);

impl Entry {
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::BlankEntry.into());
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Entry {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An ordered set of entries. Insertion order is preserved and exact
/// (case-sensitive) duplicates are rejected at insert time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pool {
    entries: Vec<Entry>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// 依序加入，任何一筆不合法即整批失敗
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pool = Self::new();
        for name in names {
            pool.add(name.as_ref())?;
        }
        Ok(pool)
    }

    pub fn add(&mut self, raw: &str) -> Result<&Entry> {
        let entry = Entry::new(raw)?;
        if self.contains(entry.as_str()) {
            return Err(ValidationError::DuplicateEntry {
                entry: entry.as_str().to_string(),
            }
            .into());
        }
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn remove(&mut self, index: usize) -> Result<Entry> {
        if index >= self.entries.len() {
            return Err(ValidationError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            }
            .into());
        }
        Ok(self.entries.remove(index))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.as_str() == name)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.as_str().to_string()).collect()
    }
}

/// Winners in draw order; position 0 is the first winner drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerSet(pub(crate) Vec<Entry>);

impl WinnerSet {
    pub fn winners(&self) -> &[Entry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|e| e.as_str().to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub team: String,
    /// `None` 表示該隊伍沒有分配到候選人
    pub candidate: Option<String>,
}

impl MatchResult {
    pub fn is_assigned(&self) -> bool {
        self.candidate.is_some()
    }
}

/// 顯示用排序：已配對的在前，未配對的在後，各自維持原順序
pub fn assigned_first(results: &[MatchResult]) -> Vec<MatchResult> {
    let (mut assigned, unassigned): (Vec<_>, Vec<_>) =
        results.iter().cloned().partition(MatchResult::is_assigned);
    assigned.extend(unassigned);
    assigned
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RaffleKind {
    Regular,
    TeamMatching,
}

impl fmt::Display for RaffleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaffleKind::Regular => f.write_str("regular"),
            RaffleKind::TeamMatching => f.write_str("team-matching"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawRecord {
    pub id: String,
    pub date: String,
    /// snapshot of the pool at draw time
    pub items: Vec<String>,
    pub winner_count: usize,
    pub winners: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: String,
    pub date: String,
    pub teams: Vec<String>,
    pub candidates: Vec<String>,
    pub results: Vec<MatchResult>,
}

/// 記錄的 id 為建立時間 (epoch 毫秒)，date 為本地時間的可讀字串
fn record_stamp(now: DateTime<Local>) -> (String, String) {
    (
        now.timestamp_millis().to_string(),
        now.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

impl DrawRecord {
    pub fn new(pool: &Pool, winners: &WinnerSet) -> Self {
        let (id, date) = record_stamp(Local::now());
        Self {
            id,
            date,
            items: pool.names(),
            winner_count: winners.len(),
            winners: winners.names(),
        }
    }
}

impl MatchRecord {
    pub fn new(teams: &Pool, candidates: &Pool, results: &[MatchResult]) -> Self {
        let (id, date) = record_stamp(Local::now());
        Self {
            id,
            date,
            teams: teams.names(),
            candidates: candidates.names(),
            results: results.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryRecord {
    Regular(DrawRecord),
    TeamMatching(MatchRecord),
}

impl HistoryRecord {
    pub fn kind(&self) -> RaffleKind {
        match self {
            HistoryRecord::Regular(_) => RaffleKind::Regular,
            HistoryRecord::TeamMatching(_) => RaffleKind::TeamMatching,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            HistoryRecord::Regular(r) => &r.id,
            HistoryRecord::TeamMatching(r) => &r.id,
        }
    }
}

/// Unified history document. Each list is ordered newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryLedger {
    #[serde(default)]
    pub regular: Vec<DrawRecord>,
    #[serde(default)]
    pub team_matching: Vec<MatchRecord>,
}

impl HistoryLedger {
    pub fn prepend(&mut self, record: HistoryRecord) {
        match record {
            HistoryRecord::Regular(r) => self.regular.insert(0, r),
            HistoryRecord::TeamMatching(r) => self.team_matching.insert(0, r),
        }
    }

    pub fn len(&self, kind: RaffleKind) -> usize {
        match kind {
            RaffleKind::Regular => self.regular.len(),
            RaffleKind::TeamMatching => self.team_matching.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.regular.is_empty() && self.team_matching.is_empty()
    }
}

/// 抽獎完成後的最終結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    Winners(WinnerSet),
    Matches(Vec<MatchResult>),
}
