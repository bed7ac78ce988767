//! Recommendation ranking for guests.
//!
//! Two paths produce the same output shape:
//!
//! 1. An optional external ranking service, consulted when configured.
//! 2. The deterministic fallback implemented here: an additive score over
//!    a guest's declared interests and each candidate event's cuisine,
//!    date, and seat availability.
//!
//! The fallback contract is fixed: on service absence, unavailability, or
//! a malformed response, callers get `{recommendations: [{id, reason}]}`
//! computed locally, indistinguishable in shape from the external path.

use crate::types::EventId;
use chrono::{DateTime, NaiveDate, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Points for a cuisine tag appearing in the guest's interests
const CUISINE_MATCH_POINTS: u32 = 10;
/// Points for an event 0-7 days out
const WITHIN_WEEK_POINTS: u32 = 5;
/// Points for an event 8-14 days out
const WITHIN_FORTNIGHT_POINTS: u32 = 3;
/// Points for having seats available
const SEATS_AVAILABLE_POINTS: u32 = 2;

/// Number of recommendations returned
const TOP_N: usize = 5;

// ============================================================================
// Types
// ============================================================================

/// A candidate event offered to the ranker
///
/// Built by the caller from the visible catalog joined with the seat
/// ledger; the ranker itself never reads shared state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateEvent {
    /// Event identifier
    pub id: EventId,
    /// Cuisine tag (matched case-insensitively against interests)
    pub cuisine: String,
    /// Calendar date of the dinner
    pub date: NaiveDate,
    /// Seats still available
    pub seats_left: u32,
}

/// One ranked recommendation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Recommended event
    pub id: EventId,
    /// Templated explanation shown to the guest
    pub reason: String,
}

/// Wire shape shared by the external service and the fallback
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    /// Ranked recommendations, best first
    pub recommendations: Vec<Recommendation>,
}

/// Failures of the external ranking path
///
/// Never surfaced to guests: every variant downgrades to the local
/// fallback computation.
#[derive(Error, Debug)]
pub enum RankingError {
    /// Transport failure reaching the service
    #[error("ranking service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with something other than the expected shape
    #[error("ranking service returned a malformed response: {0}")]
    MalformedResponse(String),
}

// ============================================================================
// Deterministic fallback scoring
// ============================================================================

/// Additive score for one candidate
///
/// `+10` when the cuisine tag (lower-cased) appears in the interests,
/// `+5` when the event is 0-7 days from `today`, `+3` when 8-14 days out,
/// `+2` when seats remain. Past events collect no date points.
#[must_use]
pub fn score_event(candidate: &CandidateEvent, interests: &[String], today: NaiveDate) -> u32 {
    let mut score = 0;

    if !interests.is_empty() {
        let cuisine = candidate.cuisine.to_lowercase();
        if interests.iter().any(|i| i.to_lowercase() == cuisine) {
            score += CUISINE_MATCH_POINTS;
        }
    }

    let days_until = (candidate.date - today).num_days();
    if (0..=7).contains(&days_until) {
        score += WITHIN_WEEK_POINTS;
    } else if (8..=14).contains(&days_until) {
        score += WITHIN_FORTNIGHT_POINTS;
    }

    if candidate.seats_left > 0 {
        score += SEATS_AVAILABLE_POINTS;
    }

    score
}

/// Rank candidates with the deterministic fallback
///
/// Stable sort descending by score: ties keep their original relative
/// order (no secondary key is defined). Empty interests or an empty
/// candidate list never error; an empty candidate list yields an empty
/// result.
#[must_use]
pub fn rank(
    interests: &[String],
    candidates: &[CandidateEvent],
    now: DateTime<Utc>,
) -> RecommendationsResponse {
    let today = now.date_naive();

    let mut scored: Vec<(u32, &CandidateEvent)> = candidates
        .iter()
        .map(|c| (score_event(c, interests, today), c))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let recommendations = scored
        .into_iter()
        .take(TOP_N)
        .map(|(_, c)| Recommendation {
            id: c.id,
            reason: format!(
                "This {} event matches your interests and is coming up soon.",
                c.cuisine
            ),
        })
        .collect();

    RecommendationsResponse { recommendations }
}

// ============================================================================
// External ranking service
// ============================================================================

/// External ranking service consumed by the recommendation path
///
/// Returns `BoxFuture` instead of async fn to be dyn-compatible.
pub trait RankingService: Send + Sync {
    /// Ask the service to rank candidates against the guest's interests
    ///
    /// # Errors
    ///
    /// Returns [`RankingError`] on transport failure or a malformed
    /// response; callers fall back to [`rank`].
    fn rank<'a>(
        &'a self,
        interests: &'a [String],
        candidates: &'a [CandidateEvent],
    ) -> BoxFuture<'a, Result<RecommendationsResponse, RankingError>>;
}

/// HTTP client for a remote ranking service
pub struct HttpRankingService {
    client: reqwest::Client,
    url: String,
}

impl HttpRankingService {
    /// Creates a client targeting the given endpoint
    #[must_use]
    pub fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }
}

#[derive(Serialize)]
struct RankingPayload<'a> {
    interests: &'a [String],
    events: &'a [CandidateEvent],
}

impl RankingService for HttpRankingService {
    fn rank<'a>(
        &'a self,
        interests: &'a [String],
        candidates: &'a [CandidateEvent],
    ) -> BoxFuture<'a, Result<RecommendationsResponse, RankingError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.url)
                .json(&RankingPayload {
                    interests,
                    events: candidates,
                })
                .send()
                .await?
                .error_for_status()?;

            let body = response
                .json::<RecommendationsResponse>()
                .await
                .map_err(|e| RankingError::MalformedResponse(e.to_string()))?;

            Ok(body)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn candidate(cuisine: &str, days_out: i64, seats_left: u32) -> CandidateEvent {
        CandidateEvent {
            id: EventId::new(),
            cuisine: cuisine.to_string(),
            date: now().date_naive() + chrono::Duration::days(days_out),
            seats_left,
        }
    }

    #[test]
    fn matching_soon_available_event_scores_seventeen() {
        let c = candidate("Italian", 3, 4);
        let score = score_event(&c, &["Italian".to_string()], now().date_naive());
        assert_eq!(score, 17); // 10 + 5 + 2
    }

    #[test]
    fn distant_unmatched_sold_out_event_scores_zero() {
        let c = candidate("Japanese", 20, 0);
        let score = score_event(&c, &["Italian".to_string()], now().date_naive());
        assert_eq!(score, 0);
    }

    #[test]
    fn cuisine_match_is_case_insensitive() {
        let c = candidate("ITALIAN", 30, 0);
        let score = score_event(&c, &["italian".to_string()], now().date_naive());
        assert_eq!(score, 10);
    }

    #[test]
    fn fortnight_window_scores_three() {
        let c = candidate("Thai", 10, 0);
        assert_eq!(score_event(&c, &[], now().date_naive()), 3);
    }

    #[test]
    fn past_events_collect_no_date_points() {
        let c = candidate("Thai", -2, 5);
        assert_eq!(score_event(&c, &[], now().date_naive()), 2);
    }

    #[test]
    fn rank_orders_by_score_descending() {
        let italian = candidate("Italian", 3, 4);
        let japanese = candidate("Japanese", 20, 0);
        let italian_id = italian.id;

        let response = rank(
            &["Italian".to_string()],
            &[japanese, italian.clone()],
            now(),
        );

        assert_eq!(response.recommendations.len(), 2);
        assert_eq!(response.recommendations[0].id, italian_id);
        assert_eq!(
            response.recommendations[0].reason,
            "This Italian event matches your interests and is coming up soon."
        );
    }

    #[test]
    fn rank_returns_at_most_five() {
        let candidates: Vec<CandidateEvent> =
            (0..8).map(|_| candidate("Mexican", 2, 3)).collect();
        let response = rank(&[], &candidates, now());
        assert_eq!(response.recommendations.len(), 5);
    }

    #[test]
    fn ties_keep_original_relative_order() {
        let candidates: Vec<CandidateEvent> =
            (0..4).map(|_| candidate("Korean", 2, 1)).collect();
        let ids: Vec<EventId> = candidates.iter().map(|c| c.id).collect();

        let response = rank(&[], &candidates, now());
        let ranked: Vec<EventId> = response.recommendations.iter().map(|r| r.id).collect();

        assert_eq!(ranked, ids);
    }

    #[test]
    fn empty_inputs_never_error() {
        let response = rank(&[], &[], now());
        assert!(response.recommendations.is_empty());

        let c = candidate("Greek", 3, 1);
        let response = rank(&[], &[c], now());
        assert_eq!(response.recommendations.len(), 1);
    }
}
