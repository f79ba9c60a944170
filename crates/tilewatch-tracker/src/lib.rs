//! Prediction staging and outcome correlation for a mines game host.
//!
//! A host drives one [`TrackerSession`]: it asks for predictions, which are
//! staged as the single pending prediction, and routes its network traffic
//! through [`TrackerSession::intercept`] so that game responses get merged
//! with the pending prediction into persisted records.
//!
//! ```text
//! predict() ──► registry (score) ──► labels ──► pending slot
//!                                                   │
//! Transport ──► Intercepting ──► observe() ◄────────┘
//!                                   │
//!                                   ▼
//!                     history + store ──► ranking
//! ```
//!
//! # Example
//!
//! ```
//! use tilewatch_heuristic::HeuristicRegistry;
//! use tilewatch_record::{RoundInputs, store::MemoryStore};
//! use tilewatch_tracker::{
//!     HttpRequest, HttpResponse, PredictRequest, TrackerSession, correlator::Correlation,
//! };
//!
//! let mut session = TrackerSession::new(HeuristicRegistry::builtin(), MemoryStore::new());
//! let round = RoundInputs {
//!     client_seed: "client".to_owned(),
//!     server_seed: "server".to_owned(),
//!     ..RoundInputs::default()
//! };
//! let prediction = session.predict(&PredictRequest::new(round.clone())).unwrap();
//! assert_eq!(prediction.verdicts.len(), 25);
//!
//! let request = HttpRequest::new("POST", "https://casino.test/api/mines/reveal");
//! let response = HttpResponse {
//!     status: 200,
//!     body: r#"{"isMine":false}"#.to_owned(),
//! };
//! let correlation = session.observe(&request, &response, &round);
//! assert!(matches!(correlation, Correlation::Recorded { success: true, .. }));
//! assert_eq!(session.status().to_string(), "Collected games: 1");
//! ```

pub mod correlator;
pub mod predict;
pub mod session;
pub mod transport;

pub use self::{
    predict::{HeuristicChoice, PredictError, PredictRequest, Prediction},
    session::{SessionError, TrackerSession, TrackerStatus},
    transport::{HttpRequest, HttpResponse, Intercepting, Transport},
};
