pub mod history;
pub mod matcher;
pub mod mentions;
pub mod pipeline;
pub mod synthesis;

pub use history::{HistoryBonusConfig, HistoryBonusScorer};
pub use matcher::{MatchScorer, MatchSignals, MatchWeights};
pub use mentions::{AgencyBonusConfig, AgencyBonusScorer, AgencyMentions};
pub use pipeline::RankingPipeline;
pub use synthesis::Synthesizer;

use crate::{AgencyResponse, Criteria, Expert, InterviewTags, RankedExpert};

pub fn score_expert(criteria: &Criteria, expert: &Expert) -> (f64, Vec<String>) {
    MatchScorer::default().score(criteria, expert)
}

pub fn rank_experts(criteria: &Criteria, experts: &[Expert]) -> Vec<RankedExpert> {
    RankingPipeline::default().rank(criteria, experts)
}

pub fn synthesize(
    criteria: &Criteria,
    experts: &[Expert],
    base_ranking: Option<&[RankedExpert]>,
    responses: &[AgencyResponse],
    history: &[InterviewTags],
) -> Vec<RankedExpert> {
    Synthesizer::default().synthesize(criteria, experts, base_ranking, responses, history)
}
