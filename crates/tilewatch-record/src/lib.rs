//! Game records, their persistent store, and archive import/export.
//!
//! A [`GameRecord`](record::GameRecord) is one observed response of the game's
//! `start`, `reveal` or `cashout` endpoint, optionally merged with the
//! prediction that was pending when it arrived. Records are append-only; the
//! ordered history is what the ranking engine and the data-driven heuristics
//! learn from.
//!
//! # Data Structure
//!
//! ```text
//! Vec<GameRecord>
//! └─ GameRecord
//!     ├─ observed_at
//!     ├─ prediction: Option<PredictionSnapshot>
//!     │   ├─ heuristic, verdicts, revealed
//!     │   ├─ grid_size, mine_count
//!     │   └─ seeds (client, server, server hash, nonce)
//!     ├─ event: start | reveal | cashout (+ derived fields)
//!     ├─ success
//!     └─ response (raw JSON)
//! ```
//!
//! # Modules
//!
//! - [`record`]: the data model
//! - [`seed`]: seed triples and SHA-256 helpers
//! - [`store`]: [`RecordStore`](store::RecordStore) with file and in-memory backends
//! - [`archive`]: pretty JSON export and validated import

pub mod archive;
pub mod record;
pub mod seed;
pub mod store;

pub use self::record::{
    CashoutEvent, EventKind, GameEvent, GameRecord, PredictionSnapshot, RevealEvent, RoundInputs,
    StartEvent, TileVerdict,
};
pub use self::seed::SeedTriple;
