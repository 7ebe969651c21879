/// Output formatting: terminal tables and JSON.
use chrono::{DateTime, Utc};
use fafmats_core::{
    DraftGrouping, MatchResult, Pairing, PairingRound, PlayerId, RatingChange, SeriatedPlayers,
};
use serde::Serialize;

use crate::ledger::{DraftRecord, Ledger, PlayerRecord};

#[derive(Serialize)]
struct JsonTable {
    table: usize,
    players: Vec<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum JsonPairing {
    Match { players: [String; 2] },
    Suspended { suspended: String },
}

fn date(d: &DateTime<Utc>) -> String {
    d.format("%Y-%m-%d %H:%M").to_string()
}

fn signed(delta: f64) -> String {
    if delta >= 0.0 { format!("+ {:.1}", delta) } else { format!("- {:.1}", -delta) }
}

pub fn print_players(players: &[&PlayerRecord]) {
    let name_width = players.iter().map(|p| p.name.len()).max().unwrap_or(4).max(4);

    println!("{:<name_width$} | Rating |   ID | Joined", "Name");
    println!("{}-|--------|------|-----------------", "-".repeat(name_width));
    for p in players {
        println!("{:<name_width$} | {:>6.0} | {:>4} | {}", p.name, p.rating, p.id, date(&p.joined));
    }
}

pub fn print_matches(ledger: &Ledger, rows: &[(MatchResult, DateTime<Utc>)]) {
    let name_width = rows
        .iter()
        .flat_map(|(m, _)| [ledger.player_name(m.player_a).len(), ledger.player_name(m.player_b).len()])
        .max()
        .unwrap_or(6)
        .max(6);

    println!("{:<name_width$} | {:<name_width$} | Result  | Date", "Player", "Player");
    println!("{}-|-{}-|---------|-----------------", "-".repeat(name_width), "-".repeat(name_width));
    for (m, d) in rows {
        println!(
            "{:<name_width$} | {:<name_width$} | {:<7} | {}",
            ledger.player_name(m.player_a),
            ledger.player_name(m.player_b),
            m.outcome,
            date(d),
        );
    }
}

pub fn print_history(ledger: &Ledger, rows: &[(MatchResult, DateTime<Utc>, f64)]) {
    let name_width = rows
        .iter()
        .map(|(m, _, _)| ledger.player_name(m.player_b).len())
        .max()
        .unwrap_or(8)
        .max(8);

    println!("{:<name_width$} | Result  | Date             | Rating", "Opponent");
    println!("{}-|---------|------------------|-------", "-".repeat(name_width));
    for (m, d, rating) in rows {
        println!(
            "{:<name_width$} | {:<7} | {} | {:>6.0}",
            ledger.player_name(m.player_b),
            m.outcome,
            date(d),
            rating,
        );
    }
}

pub fn print_rating_change(ledger: &Ledger, change: &RatingChange) {
    println!(
        "{}: {:.1} {} = {:.1}",
        ledger.player_name(change.player_a),
        change.a_before,
        signed(change.delta),
        change.a_after,
    );
    println!(
        "{}: {:.1} {} = {:.1}",
        ledger.player_name(change.player_b),
        change.b_before,
        signed(-change.delta),
        change.b_after,
    );
}

fn names(ledger: &Ledger, ids: &[PlayerId]) -> Vec<String> {
    ids.iter().map(|&id| ledger.player_name(id).to_string()).collect()
}

pub fn print_draft(ledger: &Ledger, grouping: &DraftGrouping) {
    for (i, table) in grouping.tables.iter().enumerate() {
        println!("Table {} ({} players): {}", i + 1, table.len(), names(ledger, table).join(", "));
    }
}

pub fn print_round(ledger: &Ledger, round: &PairingRound) {
    for entry in &round.entries {
        match *entry {
            Pairing::Match(a, b) => println!("{} vs {}", ledger.player_name(a), ledger.player_name(b)),
            Pairing::Suspended(p) => println!("{} sits out", ledger.player_name(p)),
        }
    }
}

/// A stored draft: its seating, then every recorded round by table.
pub fn print_draft_record(ledger: &Ledger, draft: &DraftRecord) {
    println!("{} (created {})", draft.name, date(&draft.created));
    if draft.tables.is_empty() {
        println!("No tables assigned yet");
    } else {
        print_draft(ledger, &DraftGrouping { tables: draft.tables.clone() });
    }
    for record in &draft.rounds {
        println!();
        println!("Round {}, table {}:", record.round, record.table);
        print_round(ledger, &PairingRound { entries: record.entries.clone() });
    }
}

pub fn print_draft_json(ledger: &Ledger, grouping: &DraftGrouping) {
    let tables: Vec<JsonTable> = grouping
        .tables
        .iter()
        .enumerate()
        .map(|(i, t)| JsonTable { table: i + 1, players: names(ledger, t) })
        .collect();
    print_json(&tables);
}

pub fn print_round_json(ledger: &Ledger, round: &PairingRound) {
    let pairings: Vec<JsonPairing> = round
        .entries
        .iter()
        .map(|entry| match *entry {
            Pairing::Match(a, b) => JsonPairing::Match {
                players: [ledger.player_name(a).to_string(), ledger.player_name(b).to_string()],
            },
            Pairing::Suspended(p) => JsonPairing::Suspended { suspended: ledger.player_name(p).to_string() },
        })
        .collect();
    print_json(&pairings);
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => crate::bail(format!("Failed to serialize output: {e}")),
    }
}

/// Seriated affinity matrix, for eyeballing how the pairing clustered players.
pub fn print_matrix(ledger: &Ledger, seriated: &SeriatedPlayers) {
    let labels = names(ledger, &seriated.order);
    let label_width = labels.iter().map(String::len).max().unwrap_or(0);

    print!("{:<label_width$}", "");
    for i in 0..labels.len() {
        print!(" {:>5}", i + 1);
    }
    println!();
    for (i, label) in labels.iter().enumerate() {
        print!("{:<label_width$}", label);
        for value in seriated.matrix.row(i) {
            print!(" {:>5.2}", value);
        }
        println!();
    }
}
