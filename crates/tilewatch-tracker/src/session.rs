use std::{fmt, io};

use chrono::Utc;
use rand::SeedableRng as _;
use rand_pcg::Pcg32;
use serde::Serialize;
use serde_json::Value;
use tilewatch_heuristic::{
    HeuristicRegistry, ScoringInput,
    ranking::{self, HeuristicRanking},
};
use tilewatch_record::{
    EventKind, GameRecord, PredictionSnapshot, RoundInputs, SeedTriple,
    archive::{self, ImportError},
    store::{RecordStore, StoreError},
};
use tracing::{debug, error, warn};

use crate::{
    correlator::{self, Correlation},
    predict::{self, PredictError, PredictRequest, Prediction},
    transport::{HttpRequest, HttpResponse, Intercepting, Transport},
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SessionError {
    #[display("failed to import record history")]
    Import { source: ImportError },
    #[display("failed to persist record history")]
    Store { source: StoreError },
}

/// Summary shown to the user after every change of the history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerStatus {
    pub history_size: usize,
    /// Names of the heuristics usable with the current history
    pub activatable: Vec<String>,
    pub ranking: Vec<HeuristicRanking>,
}

impl fmt::Display for TrackerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Collected games: {}", self.history_size)?;
        let mut sep = " | Ranked: ";
        for ranking in &self.ranking {
            write!(f, "{sep}{ranking}")?;
            sep = ", ";
        }
        Ok(())
    }
}

/// Tracking state of one host: the record history, its store, the pending
/// prediction and the cached ranking.
///
/// At most one prediction is pending at a time. Staging a new one replaces
/// the previous one, and the next correlated game response consumes it
/// whatever its event type.
#[derive(Debug)]
pub struct TrackerSession<S> {
    registry: HeuristicRegistry,
    store: S,
    history: Vec<GameRecord>,
    pending: Option<PredictionSnapshot>,
    ranking: Vec<HeuristicRanking>,
    rng: Pcg32,
}

impl<S> TrackerSession<S>
where
    S: RecordStore,
{
    /// Opens a session over the history persisted in `store`.
    pub fn new(registry: HeuristicRegistry, store: S) -> Self {
        Self::with_rng(registry, store, Pcg32::from_rng(&mut rand::rng()))
    }

    pub fn with_rng(registry: HeuristicRegistry, store: S, rng: Pcg32) -> Self {
        let history = store.load();
        debug!(records = history.len(), "loaded record history");
        let ranking = ranking::rank(&registry, &history);
        Self {
            registry,
            store,
            history,
            pending: None,
            ranking,
            rng,
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(store: S, seed: u64) -> Self {
        Self::with_rng(HeuristicRegistry::builtin(), store, Pcg32::seed_from_u64(seed))
    }

    /// Scores and labels the board, then stages the result as the pending
    /// prediction.
    ///
    /// Nothing is staged when the request is rejected.
    pub fn predict(&mut self, request: &PredictRequest) -> Result<Prediction, PredictError> {
        let total_tiles = request.validate()?;
        let round = &request.round;
        let heuristic = predict::resolve_heuristic(
            &self.registry,
            &self.ranking,
            self.history.len(),
            &request.heuristic,
            &mut self.rng,
        )?;

        let seeds = SeedTriple::new(&round.client_seed, &round.server_seed, round.nonce);
        let seed = seeds.seed_string();
        let input = ScoringInput {
            seed: &seed,
            mine_count: round.mine_count,
            total_tiles,
            revealed: &request.revealed,
            simulations: request.simulations,
            history: &self.history,
        };
        let scores = predict::normalize_scores(heuristic.score(&input, &mut self.rng), total_tiles);
        let verdicts = predict::label_tiles(&scores, &request.revealed, round.mine_count);
        let name = heuristic.name().to_owned();

        let snapshot = PredictionSnapshot {
            heuristic: name.clone(),
            verdicts: verdicts.clone(),
            revealed: request.revealed.clone(),
            grid_size: round.grid_size,
            mine_count: round.mine_count,
            seeds,
            created_at: Utc::now(),
        };
        if let Some(previous) = self.pending.replace(snapshot) {
            debug!(
                previous = %previous.heuristic,
                nonce = previous.seeds.nonce,
                "replacing pending prediction"
            );
        }
        debug!(heuristic = %name, nonce = round.nonce, "staged prediction");

        Ok(Prediction {
            heuristic: name,
            grid_size: round.grid_size,
            verdicts,
            scores,
        })
    }

    /// Correlates one completed network call with the pending prediction.
    ///
    /// `round` is the host's current round inputs; they are recorded with the
    /// event but never validated.
    pub fn observe(
        &mut self,
        request: &HttpRequest,
        response: &HttpResponse,
        round: &RoundInputs,
    ) -> Correlation {
        debug!(
            url = %request.url,
            method = %request.method,
            status = response.status,
            request_body = ?request.body,
            "intercepted call"
        );
        if !correlator::is_game_call(&request.url) {
            return Correlation::Passthrough;
        }

        let body: Value = match serde_json::from_str(&response.body) {
            Ok(body) => body,
            Err(error) => {
                warn!(url = %request.url, %error, "failed to parse game response");
                return Correlation::Unparseable;
            }
        };
        let Some(kind) = correlator::classify(&request.url) else {
            debug!(url = %request.url, "ignoring unrecognized game action");
            return Correlation::UnknownAction;
        };

        let event = correlator::extract_event(kind, &body, round);
        let prediction = self.pending.take();
        if prediction.is_none() && kind != EventKind::Start {
            debug!(%kind, "no pending prediction, dropping event");
            return Correlation::Dropped(kind);
        }

        let correlated = prediction.is_some();
        let record = GameRecord::new(prediction, event, body);
        let success = record.success;
        let index = self.append(record);
        debug!(index, %kind, success, correlated, "recorded game event");
        Correlation::Recorded {
            index,
            kind,
            success,
            correlated,
        }
    }

    /// Wraps `inner` so every call made through it is observed.
    pub fn intercept<'a, T>(&'a mut self, inner: T, round: &'a RoundInputs) -> Intercepting<'a, T, S>
    where
        T: Transport,
    {
        Intercepting::new(inner, self, round)
    }

    /// Replaces the history with the records of an exported document.
    ///
    /// On any failure neither the history nor the store changes.
    pub fn import(&mut self, document: &str) -> Result<usize, SessionError> {
        let records =
            archive::import_records(document).map_err(|source| SessionError::Import { source })?;
        self.store
            .save(&records)
            .map_err(|source| SessionError::Store { source })?;
        self.history = records;
        self.refresh_ranking();
        debug!(records = self.history.len(), "imported record history");
        Ok(self.history.len())
    }

    /// Drops the whole history, persisted copy included.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.store
            .save(&[])
            .map_err(|source| SessionError::Store { source })?;
        self.history.clear();
        self.pending = None;
        self.refresh_ranking();
        Ok(())
    }

    fn append(&mut self, record: GameRecord) -> usize {
        self.history.push(record);
        if let Err(error) = self.store.save(&self.history) {
            error!(%error, records = self.history.len(), "failed to persist record history");
        }
        self.refresh_ranking();
        self.history.len() - 1
    }

    fn refresh_ranking(&mut self) {
        self.ranking = ranking::rank(&self.registry, &self.history);
    }
}

impl<S> TrackerSession<S> {
    #[must_use]
    pub fn registry(&self) -> &HeuristicRegistry {
        &self.registry
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn history(&self) -> &[GameRecord] {
        &self.history
    }

    #[must_use]
    pub fn pending(&self) -> Option<&PredictionSnapshot> {
        self.pending.as_ref()
    }

    #[must_use]
    pub fn ranking(&self) -> &[HeuristicRanking] {
        &self.ranking
    }

    #[must_use]
    pub fn status(&self) -> TrackerStatus {
        TrackerStatus {
            history_size: self.history.len(),
            activatable: self
                .registry
                .list_activatable(self.history.len())
                .into_iter()
                .map(|h| h.name().to_owned())
                .collect(),
            ranking: self.ranking.clone(),
        }
    }

    /// Writes the history as an exported document.
    pub fn export<W>(&self, writer: W) -> io::Result<()>
    where
        W: io::Write,
    {
        archive::export_records(writer, &self.history)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;
    use tilewatch_heuristic::ACTIVATION_THRESHOLD;
    use tilewatch_record::{GameEvent, TileVerdict, store::MemoryStore};

    use super::*;
    use crate::predict::HeuristicChoice;

    fn session() -> TrackerSession<MemoryStore> {
        TrackerSession::for_tests(MemoryStore::new(), 42)
    }

    fn round() -> RoundInputs {
        RoundInputs {
            client_seed: "client".to_owned(),
            server_seed: "server".to_owned(),
            nonce: 0,
            grid_size: 5,
            mine_count: 3,
        }
    }

    fn request(heuristic: &str) -> PredictRequest {
        let mut request = PredictRequest::new(round());
        request.heuristic = heuristic.parse().unwrap();
        request.simulations = 200;
        request
    }

    fn call(action: &str, body: &Value) -> (HttpRequest, HttpResponse) {
        (
            HttpRequest::new("POST", &format!("https://casino.test/api/mines/{action}")),
            HttpResponse {
                status: 200,
                body: body.to_string(),
            },
        )
    }

    fn observe<S: RecordStore>(
        session: &mut TrackerSession<S>,
        action: &str,
        body: &Value,
    ) -> Correlation {
        let (request, response) = call(action, body);
        session.observe(&request, &response, &round())
    }

    /// Predicts with `heuristic` and reveals a tile with the given outcome.
    fn play<S: RecordStore>(session: &mut TrackerSession<S>, heuristic: &str, is_mine: bool) {
        session.predict(&request(heuristic)).unwrap();
        let correlation = observe(session, "reveal", &json!({ "isMine": is_mine }));
        assert!(correlation.is_recorded());
    }

    #[test]
    fn test_prediction_shape_on_standard_grid() {
        let mut session = session();
        for heuristic in ["Random", "MCTS", "Minimax", "Expectimax", "auto"] {
            let prediction = session.predict(&request(heuristic)).unwrap();
            assert_eq!(prediction.verdicts.len(), 25);
            assert_eq!(prediction.scores.len(), 25);
            assert_eq!(prediction.count(TileVerdict::Safe), 17, "{heuristic}");
            assert!(prediction.count(TileVerdict::Bomb) >= 3, "{heuristic}");
        }
        let pending = session.pending().unwrap();
        assert_eq!(pending.verdicts.len(), 25);
        assert_eq!(pending.seeds.server_seed_hash.len(), 64);
    }

    #[test]
    fn test_rejected_prediction_stages_nothing() {
        let mut session = session();
        let mut bad = request("Minimax");
        bad.round.client_seed.clear();
        assert!(matches!(session.predict(&bad), Err(PredictError::MissingSeeds)));
        assert!(matches!(
            session.predict(&request("Frequency Safe")),
            Err(PredictError::HeuristicLocked { .. })
        ));
        assert!(session.pending().is_none());
    }

    #[test]
    fn test_safe_reveal_is_recorded_as_success() {
        let mut session = session();
        session.predict(&request("Minimax")).unwrap();
        let correlation = observe(&mut session, "reveal", &json!({ "isMine": false }));
        assert_eq!(
            correlation,
            Correlation::Recorded {
                index: 0,
                kind: EventKind::Reveal,
                success: true,
                correlated: true,
            }
        );
        let record = &session.history()[0];
        assert_eq!(record.event_kind(), EventKind::Reveal);
        assert_eq!(record.heuristic(), Some("Minimax"));
        assert!(session.pending().is_none());

        let reloaded = TrackerSession::for_tests(session.store().clone(), 1);
        assert_eq!(reloaded.history(), session.history());
    }

    #[test]
    fn test_mine_reveal_is_recorded_as_failure() {
        let mut session = session();
        session.predict(&request("Minimax")).unwrap();
        observe(&mut session, "reveal", &json!({ "isMine": true }));
        assert!(!session.history()[0].success);
    }

    #[test]
    fn test_reveal_without_mine_flag_is_recorded_as_success() {
        let mut session = session();
        session.predict(&request("Minimax")).unwrap();
        let correlation = observe(&mut session, "reveal", &json!({ "revealedTiles": [3] }));
        assert_eq!(
            correlation,
            Correlation::Recorded {
                index: 0,
                kind: EventKind::Reveal,
                success: true,
                correlated: true,
            }
        );
    }

    #[test]
    fn test_cashout_consumes_pending_prediction() {
        let mut session = session();
        session.predict(&request("Expectimax")).unwrap();
        observe(&mut session, "cashout", &json!({ "success": true, "payout": 4.2 }));
        let record = &session.history()[0];
        assert!(record.success);
        assert!(matches!(record.event, GameEvent::Cashout(_)));
    }

    #[test]
    fn test_only_latest_prediction_is_recorded() {
        let mut session = session();
        session.predict(&request("Minimax")).unwrap();
        let mut second = request("Random");
        second.round.nonce = 1;
        session.predict(&second).unwrap();

        observe(&mut session, "reveal", &json!({ "isMine": false }));
        observe(&mut session, "reveal", &json!({ "isMine": false }));
        assert_eq!(session.history().len(), 1);
        let prediction = session.history()[0].prediction.as_ref().unwrap();
        assert_eq!(prediction.heuristic, "Random");
        assert_eq!(prediction.seeds.nonce, 1);
    }

    #[test]
    fn test_start_without_prediction_is_bare() {
        let mut session = session();
        let correlation = observe(&mut session, "start", &json!({ "activeGameId": "g-7" }));
        assert_eq!(
            correlation,
            Correlation::Recorded {
                index: 0,
                kind: EventKind::Start,
                success: false,
                correlated: false,
            }
        );
        let record = &session.history()[0];
        assert!(record.prediction.is_none());
        assert_eq!(record.response, json!({ "activeGameId": "g-7" }));
    }

    #[test]
    fn test_outcomes_without_prediction_are_dropped() {
        let mut session = session();
        assert_eq!(
            observe(&mut session, "reveal", &json!({ "isMine": false })),
            Correlation::Dropped(EventKind::Reveal)
        );
        assert_eq!(
            observe(&mut session, "cashout", &json!({ "success": true })),
            Correlation::Dropped(EventKind::Cashout)
        );
        assert!(session.history().is_empty());
        assert!(session.store().document().is_none());
    }

    #[test]
    fn test_unusable_responses_keep_pending_prediction() {
        let mut session = session();
        session.predict(&request("Minimax")).unwrap();
        assert_eq!(
            observe(&mut session, "history", &json!([])),
            Correlation::UnknownAction
        );
        let (request, mut response) = call("reveal", &json!({}));
        response.body = "Bad Gateway".to_owned();
        assert_eq!(
            session.observe(&request, &response, &round()),
            Correlation::Unparseable
        );
        assert!(session.pending().is_some());
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_ranking_appears_at_threshold() {
        let mut session = session();
        for i in 0..ACTIVATION_THRESHOLD - 1 {
            play(&mut session, "Minimax", i % 2 == 1);
        }
        assert!(session.ranking().is_empty());
        assert_eq!(session.status().activatable.len(), 4);
        assert_eq!(session.status().to_string(), "Collected games: 49");

        play(&mut session, "Minimax", true);
        let status = session.status();
        assert_eq!(status.activatable.len(), 9);
        assert!(
            status
                .to_string()
                .starts_with("Collected games: 50 | Ranked: Minimax (50.0%), Random (0.0%)")
        );

        // the top-ranked heuristic drives automatic selection
        let prediction = session.predict(&request("auto")).unwrap();
        assert_eq!(prediction.heuristic, "Minimax");
        let learned = session.predict(&request("Frequency Safe")).unwrap();
        assert_eq!(learned.verdicts.len(), 25);
    }

    #[test]
    fn test_import_replaces_history_wholesale() {
        let mut source = session();
        for _ in 0..3 {
            play(&mut source, "Random", false);
        }
        let mut document = Vec::new();
        source.export(&mut document).unwrap();
        let document = String::from_utf8(document).unwrap();

        let mut target = session();
        play(&mut target, "Minimax", false);
        assert_eq!(target.import(&document).unwrap(), 3);
        assert_eq!(target.history(), source.history());

        let persisted = target.store().document().unwrap().to_owned();
        assert!(matches!(
            target.import(r#"{"not": "a list"}"#),
            Err(SessionError::Import {
                source: ImportError::NotASequence { .. }
            })
        ));
        assert!(target.import(r#"[{"event": 1}]"#).is_err());
        assert_eq!(target.store().document(), Some(persisted.as_str()));
        assert_eq!(target.history().len(), 3);
    }

    #[test]
    fn test_clear_empties_history_and_store() {
        let mut session = session();
        play(&mut session, "Minimax", false);
        session.predict(&request("Minimax")).unwrap();
        session.clear().unwrap();
        assert!(session.history().is_empty());
        assert!(session.pending().is_none());
        assert_eq!(session.store().document(), Some("[]"));
    }

    #[derive(Debug)]
    struct ReadOnlyStore;

    impl RecordStore for ReadOnlyStore {
        fn load(&self) -> Vec<GameRecord> {
            Vec::new()
        }

        fn save(&mut self, _records: &[GameRecord]) -> Result<(), StoreError> {
            Err(StoreError::Write {
                path: PathBuf::from("/read-only/mines_predictor_data.json"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[test]
    fn test_store_failure_keeps_record_in_memory() {
        let mut session = TrackerSession::for_tests(ReadOnlyStore, 3);
        play(&mut session, "Minimax", false);
        assert_eq!(session.history().len(), 1);
        assert!(matches!(
            session.clear(),
            Err(SessionError::Store { .. })
        ));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_choice_parsing() {
        assert_eq!("AUTO".parse::<HeuristicChoice>().unwrap(), HeuristicChoice::Auto);
        assert_eq!(
            "PUCT".parse::<HeuristicChoice>().unwrap(),
            HeuristicChoice::Named("PUCT".to_owned())
        );
    }
}
