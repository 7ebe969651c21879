/// File-backed club records: players, matches, rating history and drafts.
///
/// The whole ledger is one JSON document, loaded at startup and written back
/// after a command changes it. A command either succeeds and saves, or fails
/// and leaves the file untouched.
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use fafmats_core::{
    DraftGrouping, EloConfig, EncounterHistory, MatchResult, Pairing, PairingRound, PlayerDirectory,
    PlayerId, RatingChange, rate_match,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    pub rating: f64,
    pub joined: DateTime<Utc>,
}

/// A stored match. The result is always normalized (A won or tied).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: i64,
    #[serde(flatten)]
    pub result: MatchResult,
    pub date: DateTime<Utc>,
}

/// One player's rating before and after a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub player: PlayerId,
    pub match_id: i64,
    pub rating_before: f64,
    pub rating_after: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRecord {
    pub id: i64,
    pub name: String,
    pub created: DateTime<Utc>,
    /// Seating from the last autopair, one list per table.
    #[serde(default)]
    pub tables: Vec<Vec<PlayerId>>,
    #[serde(default)]
    pub rounds: Vec<RoundRecord>,
}

/// Pairings at one table for one round of a draft. Tables are numbered from 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    pub table: usize,
    pub entries: Vec<Pairing>,
}

/// Player listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortMethod {
    #[value(name = "name", alias = "a")]
    NameAsc,
    #[value(name = "name-desc", alias = "A")]
    NameDesc,
    #[value(name = "rating", alias = "e")]
    RatingAsc,
    #[value(name = "rating-desc", alias = "E")]
    RatingDesc,
    #[value(name = "joined", alias = "d")]
    JoinedAsc,
    #[value(name = "joined-desc", alias = "D")]
    JoinedDesc,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub players: Vec<PlayerRecord>,
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
    #[serde(default)]
    pub drafts: Vec<DraftRecord>,
}

impl Ledger {
    /// Load from a file. A missing file is an empty club.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse club file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no club file yet, starting empty");
                Ok(Ledger::default())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read club file {}", path.display())),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize club")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write club file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "club saved");
        Ok(())
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&PlayerRecord> {
        let name = name.trim();
        self.players.iter().find(|p| p.name == name)
    }

    pub fn player_name(&self, id: PlayerId) -> &str {
        self.player(id).map_or("?", |p| p.name.as_str())
    }

    /// Look up every name, failing on the first one that isn't in the club.
    pub fn resolve_names(&self, names: &[String]) -> Result<Vec<PlayerId>> {
        names
            .iter()
            .map(|name| {
                self.player_by_name(name)
                    .map(|p| p.id)
                    .with_context(|| format!("Player \"{}\" does not exist", name.trim()))
            })
            .collect()
    }

    pub fn add_player(&mut self, name: &str, config: &EloConfig, now: DateTime<Utc>) -> Result<&PlayerRecord> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Name needed");
        }
        if self.player_by_name(name).is_some() {
            bail!("Name \"{name}\" already exists");
        }

        let id = self.players.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        self.players.push(PlayerRecord {
            id,
            name: name.to_string(),
            rating: config.starting_rating,
            joined: now,
        });
        tracing::info!(id, name, rating = config.starting_rating, "added player");
        Ok(&self.players[self.players.len() - 1])
    }

    /// Rating change a match would cause, without recording it.
    pub fn preview_match(&self, result: MatchResult, config: &EloConfig) -> Result<RatingChange> {
        if result.player_a == result.player_b {
            bail!("A player can't play against themselves");
        }
        let a = self.player(result.player_a).with_context(|| format!("Unknown player {}", result.player_a))?;
        let b = self.player(result.player_b).with_context(|| format!("Unknown player {}", result.player_b))?;
        Ok(rate_match(result, a.rating, b.rating, config))
    }

    /// Record a match: store it normalized, move both ratings and write the
    /// two history rows.
    pub fn record_match(&mut self, result: MatchResult, config: &EloConfig, now: DateTime<Utc>) -> Result<RatingChange> {
        let change = self.preview_match(result, config)?;
        let match_id = self.matches.iter().map(|m| m.id).max().unwrap_or(0) + 1;

        self.matches.push(MatchRecord {
            id: match_id,
            result: MatchResult::new(change.player_a, change.player_b, change.outcome),
            date: now,
        });
        for (player, before, after) in [
            (change.player_a, change.a_before, change.a_after),
            (change.player_b, change.b_before, change.b_after),
        ] {
            if let Some(p) = self.players.iter_mut().find(|p| p.id == player) {
                p.rating = after;
            }
            self.history.push(HistoryRecord {
                player,
                match_id,
                rating_before: before,
                rating_after: after,
            });
        }

        tracing::info!(match_id, delta = change.delta, outcome = %change.outcome, "recorded match");
        Ok(change)
    }

    pub fn add_draft(&mut self, name: &str, now: DateTime<Utc>) -> Result<&DraftRecord> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Draft name needed");
        }
        if self.drafts.iter().any(|d| d.name == name) {
            bail!("Draft \"{name}\" already exists");
        }
        let id = self.drafts.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        self.drafts.push(DraftRecord {
            id,
            name: name.to_string(),
            created: now,
            tables: Vec::new(),
            rounds: Vec::new(),
        });
        tracing::info!(id, name, "added draft");
        Ok(&self.drafts[self.drafts.len() - 1])
    }

    pub fn draft_by_name(&self, name: &str) -> Option<&DraftRecord> {
        let name = name.trim();
        self.drafts.iter().find(|d| d.name == name)
    }

    fn draft_mut(&mut self, name: &str) -> Result<&mut DraftRecord> {
        let name = name.trim();
        self.drafts
            .iter_mut()
            .find(|d| d.name == name)
            .with_context(|| format!("Draft \"{name}\" does not exist"))
    }

    /// Store a new seating. Rounds paired under the old seating are dropped.
    pub fn set_draft_tables(&mut self, name: &str, grouping: &DraftGrouping) -> Result<()> {
        let draft = self.draft_mut(name)?;
        draft.tables = grouping.tables.clone();
        let dropped = draft.rounds.len();
        draft.rounds.clear();
        tracing::info!(draft = %draft.name, tables = draft.tables.len(), dropped_rounds = dropped, "stored draft tables");
        Ok(())
    }

    /// Store the pairings for one table and round, replacing any earlier ones.
    pub fn record_round(&mut self, name: &str, round: u32, table: usize, pairing: &PairingRound) -> Result<()> {
        let draft = self.draft_mut(name)?;
        draft.rounds.retain(|r| !(r.round == round && r.table == table));
        draft.rounds.push(RoundRecord { round, table, entries: pairing.entries.clone() });
        draft.rounds.sort_by_key(|r| (r.round, r.table));
        tracing::info!(draft = %draft.name, round, table, "stored round pairings");
        Ok(())
    }

    /// Players seated at `table` (1-based) of a draft. `None` when the draft
    /// hasn't been autopaired yet.
    pub fn table_players(&self, name: &str, table: usize) -> Result<Option<Vec<PlayerId>>> {
        let draft = self.draft_by_name(name).with_context(|| format!("Draft \"{}\" does not exist", name.trim()))?;
        if draft.tables.is_empty() {
            return Ok(None);
        }
        match table.checked_sub(1).and_then(|i| draft.tables.get(i)) {
            Some(players) => Ok(Some(players.clone())),
            None => bail!("Draft \"{}\" has {} table(s), no table {table}", draft.name, draft.tables.len()),
        }
    }

    pub fn players_sorted(&self, method: SortMethod) -> Vec<&PlayerRecord> {
        let mut players: Vec<&PlayerRecord> = self.players.iter().collect();
        match method {
            SortMethod::NameAsc => players.sort_by(|a, b| a.name.cmp(&b.name)),
            SortMethod::NameDesc => players.sort_by(|a, b| b.name.cmp(&a.name)),
            SortMethod::RatingAsc => players.sort_by(|a, b| a.rating.total_cmp(&b.rating)),
            SortMethod::RatingDesc => players.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
            SortMethod::JoinedAsc => players.sort_by_key(|p| p.joined),
            SortMethod::JoinedDesc => players.sort_by(|a, b| b.joined.cmp(&a.joined)),
        }
        players
    }

    /// Matches in date order. With a player, only their matches, each
    /// re-expressed with that player as side A.
    pub fn matches_for(&self, player: Option<PlayerId>) -> Vec<(MatchResult, DateTime<Utc>)> {
        let mut rows: Vec<(MatchResult, DateTime<Utc>)> = self
            .matches
            .iter()
            .filter_map(|m| match player {
                Some(id) => m.result.from_perspective(id).map(|r| (r, m.date)),
                None => Some((m.result, m.date)),
            })
            .collect();
        rows.sort_by_key(|&(_, date)| date);
        rows
    }

    /// A player's rating after each of their matches, oldest first.
    pub fn history_for(&self, player: PlayerId) -> Vec<(MatchResult, DateTime<Utc>, f64)> {
        let mut rows: Vec<(MatchResult, DateTime<Utc>, f64)> = self
            .history
            .iter()
            .filter(|h| h.player == player)
            .filter_map(|h| {
                let m = self.matches.iter().find(|m| m.id == h.match_id)?;
                let result = m.result.from_perspective(player)?;
                Some((result, m.date, h.rating_after))
            })
            .collect();
        rows.sort_by_key(|&(_, date, _)| date);
        rows
    }

    /// Snapshot for the pairing engine.
    pub fn directory(&self) -> ClubDirectory<'_> {
        ClubDirectory {
            ledger: self,
            encounters: EncounterHistory::from_matches(self.matches.iter().map(|m| &m.result)),
        }
    }
}

/// Read-only view of a ledger with encounter counts precomputed.
pub struct ClubDirectory<'a> {
    ledger: &'a Ledger,
    encounters: EncounterHistory,
}

impl PlayerDirectory for ClubDirectory<'_> {
    /// Player names; empty selects the whole club. Unknown names are skipped.
    type Selection = [String];

    fn rating(&self, player: PlayerId) -> Option<f64> {
        self.ledger.player(player).map(|p| p.rating)
    }

    fn encounter_count(&self, a: PlayerId, b: PlayerId) -> u32 {
        self.encounters.count(a, b)
    }

    fn list_players(&self, selection: &[String]) -> Vec<PlayerId> {
        if selection.is_empty() {
            return self.ledger.players.iter().map(|p| p.id).collect();
        }
        selection
            .iter()
            .filter_map(|name| self.ledger.player_by_name(name).map(|p| p.id))
            .collect()
    }
}
