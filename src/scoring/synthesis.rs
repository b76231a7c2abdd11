use tracing::debug;

use crate::scoring::pipeline::require_identity;
use crate::scoring::{AgencyBonusScorer, AgencyMentions, HistoryBonusScorer, RankingPipeline};
use crate::{rank_order, round1, AgencyResponse, Criteria, Expert, InterviewTags, RankedExpert};

const HISTORY_REASON: &str = "Aligned with past interview history tags.";
const FALLBACK_REASON: &str = "Matches core criteria.";

#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    pipeline: RankingPipeline,
    agency_scorer: AgencyBonusScorer,
    history_scorer: HistoryBonusScorer,
}

impl Synthesizer {
    pub fn new(
        pipeline: RankingPipeline,
        agency_scorer: AgencyBonusScorer,
        history_scorer: HistoryBonusScorer,
    ) -> Self {
        Self {
            pipeline,
            agency_scorer,
            history_scorer,
        }
    }

    /// Final ranking over the whole pool: base score plus agency and history bonuses.
    ///
    /// Without a base ranking one is computed from `criteria`. Experts missing from the
    /// base ranking start from zero.
    pub fn synthesize(
        &self,
        criteria: &Criteria,
        experts: &[Expert],
        base_ranking: Option<&[RankedExpert]>,
        responses: &[AgencyResponse],
        history: &[InterviewTags],
    ) -> Vec<RankedExpert> {
        let recomputed;
        let base_ranking = match base_ranking {
            Some(ranking) => ranking,
            None => {
                recomputed = self.pipeline.rank(criteria, experts);
                recomputed.as_slice()
            }
        };

        let mentions = AgencyMentions::collect(responses);

        let mut compiled: Vec<RankedExpert> = experts
            .iter()
            .map(|expert| {
                require_identity(expert);
                let base = base_ranking
                    .iter()
                    .find(|item| item.expert.id == expert.id)
                    .map(|item| item.score)
                    .unwrap_or(0.0);

                let mention_count = mentions.count(&expert.id);
                let agency_bonus = self.agency_scorer.bonus(mention_count);
                let history_bonus = self.history_scorer.bonus(expert, history);
                let score = round1(base + agency_bonus + history_bonus).clamp(0.0, 100.0);

                let mut match_reasons = Vec::new();
                if agency_bonus > 0.0 {
                    match_reasons.push(format!("Agency recommendations: {}", mention_count));
                    match_reasons.extend(mentions.reasons(&expert.id).iter().cloned());
                }
                if history_bonus > 0.0 {
                    match_reasons.push(HISTORY_REASON.to_string());
                }
                if match_reasons.is_empty() {
                    match_reasons.push(FALLBACK_REASON.to_string());
                }

                RankedExpert {
                    expert: expert.clone(),
                    score,
                    match_reasons,
                }
            })
            .collect();

        compiled.sort_by(rank_order);
        debug!(
            pool = experts.len(),
            agencies = responses.len(),
            history = history.len(),
            "synthesized ranking"
        );
        compiled
    }
}
