use tracing::debug;

use crate::scoring::MatchScorer;
use crate::{rank_order, Criteria, Expert, RankedExpert};

#[derive(Debug, Clone, Default)]
pub struct RankingPipeline {
    scorer: MatchScorer,
}

impl RankingPipeline {
    pub fn new(scorer: MatchScorer) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &MatchScorer {
        &self.scorer
    }

    /// Scores every expert in the pool and sorts by descending score, then id.
    pub fn rank(&self, criteria: &Criteria, experts: &[Expert]) -> Vec<RankedExpert> {
        let mut ranked: Vec<RankedExpert> = experts
            .iter()
            .map(|expert| {
                require_identity(expert);
                let (score, match_reasons) = self.scorer.score(criteria, expert);
                RankedExpert {
                    expert: expert.clone(),
                    score,
                    match_reasons,
                }
            })
            .collect();

        ranked.sort_by(rank_order);
        debug!(pool = experts.len(), top = ?ranked.first().map(|item| item.score), "ranked experts");
        ranked
    }
}

/// An expert without an id means the caller broke the pool contract.
pub(crate) fn require_identity(expert: &Expert) {
    assert!(
        !expert.id.trim().is_empty(),
        "expert pool entry is missing its id"
    );
}
