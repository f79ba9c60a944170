use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::seed::{SeedTriple, sha256_hex};

/// Label assigned to a single tile by a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum TileVerdict {
    Safe,
    Bomb,
    Unknown,
}

impl TileVerdict {
    /// Symbol drawn on the tile overlay.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Safe => "✅",
            Self::Bomb => "💣",
            Self::Unknown => "❓",
        }
    }
}

impl fmt::Display for TileVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Everything a prediction knew when it was made.
///
/// Stored verbatim inside the [`GameRecord`] that eventually correlates with
/// it, so data-driven heuristics can later learn from past verdicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSnapshot {
    /// Display name of the heuristic that produced the verdicts
    pub heuristic: String,
    /// One verdict per tile, row-major, length `grid_size²`
    pub verdicts: Vec<TileVerdict>,
    /// Tiles already revealed when the prediction was made
    pub revealed: Vec<usize>,
    pub grid_size: usize,
    pub mine_count: usize,
    pub seeds: SeedTriple,
    pub created_at: DateTime<Utc>,
}

impl PredictionSnapshot {
    #[must_use]
    pub fn verdict_at(&self, tile: usize) -> Option<TileVerdict> {
        self.verdicts.get(tile).copied()
    }
}

/// Game-action endpoint that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum EventKind {
    #[display("start")]
    Start,
    #[display("reveal")]
    Reveal,
    #[display("cashout")]
    Cashout,
}

impl EventKind {
    pub const ALL: [Self; 3] = [Self::Start, Self::Reveal, Self::Cashout];

    /// URL path segment of the action, e.g. `/mines/reveal`.
    #[must_use]
    pub const fn action_path(self) -> &'static str {
        match self {
            Self::Start => "/mines/start",
            Self::Reveal => "/mines/reveal",
            Self::Cashout => "/mines/cashout",
        }
    }
}

/// Input parameters the host had set when a round was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundInputs {
    pub client_seed: String,
    pub server_seed: String,
    pub nonce: u64,
    pub grid_size: usize,
    pub mine_count: usize,
}

impl Default for RoundInputs {
    fn default() -> Self {
        Self {
            client_seed: String::new(),
            server_seed: String::new(),
            nonce: 0,
            grid_size: 5,
            mine_count: 3,
        }
    }
}

impl RoundInputs {
    #[must_use]
    pub const fn total_tiles(&self) -> usize {
        self.grid_size * self.grid_size
    }

    /// Moves on to the next round of the same seed pair.
    pub const fn advance_nonce(&mut self) {
        self.nonce += 1;
    }

    /// Hash of the client seed, when one is set.
    #[must_use]
    pub fn hashed_client_seed(&self) -> Option<String> {
        (!self.client_seed.is_empty()).then(|| sha256_hex(&self.client_seed))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartEvent {
    pub active_game_id: Option<serde_json::Value>,
    pub next_tile_multiplier: Option<f64>,
    pub next_tile_payout: Option<f64>,
    /// Round inputs the host reported at observation time
    pub round: Option<RoundInputs>,
    pub hashed_client_seed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealEvent {
    pub is_mine: Option<bool>,
    pub revealed_tiles: Option<serde_json::Value>,
    pub mine_positions: Option<Vec<usize>>,
    pub next_tile_multiplier: Option<f64>,
    pub next_tile_payout: Option<f64>,
    pub nonce: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashoutEvent {
    /// Success flag as reported by the server
    pub success: Option<bool>,
    pub payout: Option<f64>,
    pub final_multiplier: Option<f64>,
    pub nonce: Option<u64>,
}

/// Event-specific fields derived from an intercepted response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Start(StartEvent),
    Reveal(RevealEvent),
    Cashout(CashoutEvent),
}

impl GameEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Start(_) => EventKind::Start,
            Self::Reveal(_) => EventKind::Reveal,
            Self::Cashout(_) => EventKind::Cashout,
        }
    }

    /// Whether the observed outcome was favorable.
    ///
    /// A reveal is safe unless the response reports `isMine: true`; a
    /// response without the flag counts as safe. Only an explicit
    /// `success: true` counts as a successful cashout. A start event carries
    /// no outcome.
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            Self::Start(_) => false,
            Self::Reveal(reveal) => reveal.is_mine != Some(true),
            Self::Cashout(cashout) => cashout.success == Some(true),
        }
    }
}

/// One finalized observation of a game-action response.
///
/// Records are appended once and never modified afterwards; their position
/// in the history is their identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// When the response was correlated
    pub observed_at: DateTime<Utc>,
    /// The prediction that was pending when the response arrived, if any
    pub prediction: Option<PredictionSnapshot>,
    pub event: GameEvent,
    pub success: bool,
    /// Raw response document
    pub response: serde_json::Value,
}

impl GameRecord {
    #[must_use]
    pub fn new(
        prediction: Option<PredictionSnapshot>,
        event: GameEvent,
        response: serde_json::Value,
    ) -> Self {
        Self {
            observed_at: Utc::now(),
            prediction,
            success: event.is_success(),
            event,
            response,
        }
    }

    #[must_use]
    pub const fn event_kind(&self) -> EventKind {
        self.event.kind()
    }

    /// Name of the heuristic behind the correlated prediction.
    #[must_use]
    pub fn heuristic(&self) -> Option<&str> {
        self.prediction.as_ref().map(|p| p.heuristic.as_str())
    }

    /// Verdict the correlated prediction gave to `tile`.
    #[must_use]
    pub fn verdict_at(&self, tile: usize) -> Option<TileVerdict> {
        self.prediction.as_ref()?.verdict_at(tile)
    }
}
