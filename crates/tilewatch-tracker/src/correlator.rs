//! Classification of intercepted calls and extraction of game events.
//!
//! Only calls whose URL contains `/mines/` are game calls. Their action is
//! taken from the URL, and the event fields are read from the camelCase
//! response document the game server returns.

use serde_json::Value;
use tilewatch_record::{CashoutEvent, EventKind, GameEvent, RevealEvent, RoundInputs, StartEvent};

const GAME_PATH: &str = "/mines/";

/// Outcome of handing one intercepted call to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correlation {
    /// Not a game call
    Passthrough,
    /// The response body was not JSON
    Unparseable,
    /// A `/mines/` action other than start, reveal or cashout
    UnknownAction,
    /// A reveal or cashout arrived while no prediction was pending
    Dropped(EventKind),
    /// A record was appended at `index`
    Recorded {
        index: usize,
        kind: EventKind,
        success: bool,
        /// Whether a pending prediction was merged into the record
        correlated: bool,
    },
}

impl Correlation {
    #[must_use]
    pub const fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }
}

#[must_use]
pub fn is_game_call(url: &str) -> bool {
    url.contains(GAME_PATH)
}

/// Game action addressed by `url`, if it is one the tracker understands.
#[must_use]
pub fn classify(url: &str) -> Option<EventKind> {
    if !is_game_call(url) {
        return None;
    }
    EventKind::ALL
        .into_iter()
        .find(|kind| url.contains(kind.action_path()))
}

fn f64_field(body: &Value, key: &str) -> Option<f64> {
    body.get(key).and_then(Value::as_f64)
}

fn bool_field(body: &Value, key: &str) -> Option<bool> {
    body.get(key).and_then(Value::as_bool)
}

fn present(body: &Value, key: &str) -> Option<Value> {
    body.get(key).filter(|value| !value.is_null()).cloned()
}

/// Builds the event of `kind` from a parsed response.
///
/// `round` is the host's state when the response arrived; start events keep
/// a copy of it and the other events take their nonce from it.
#[must_use]
pub fn extract_event(kind: EventKind, body: &Value, round: &RoundInputs) -> GameEvent {
    match kind {
        EventKind::Start => GameEvent::Start(StartEvent {
            active_game_id: present(body, "activeGameId"),
            next_tile_multiplier: f64_field(body, "nextTileMultiplier"),
            next_tile_payout: f64_field(body, "nextTilePayout"),
            round: Some(round.clone()),
            hashed_client_seed: round.hashed_client_seed(),
        }),
        EventKind::Reveal => GameEvent::Reveal(RevealEvent {
            is_mine: bool_field(body, "isMine"),
            revealed_tiles: present(body, "revealedTiles"),
            mine_positions: body
                .get("minePositions")
                .and_then(|positions| serde_json::from_value(positions.clone()).ok()),
            next_tile_multiplier: f64_field(body, "nextTileMultiplier"),
            next_tile_payout: f64_field(body, "nextTilePayout"),
            nonce: Some(round.nonce),
        }),
        EventKind::Cashout => GameEvent::Cashout(CashoutEvent {
            success: bool_field(body, "success"),
            payout: f64_field(body, "payout"),
            final_multiplier: f64_field(body, "finalMultiplier"),
            nonce: Some(round.nonce),
        }),
    }
}
