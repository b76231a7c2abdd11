//! Expert-network agency round trip: outreach draft, agency replies, synthesis note.
//!
//! Replies come from the text generator when it is available and returns well-formed
//! JSON; otherwise they are simulated from the current ranking.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::generation::join_or;
use crate::llm::{usable_text, TextGenerator};
use crate::text::summarize_profile_text;
use crate::{AgencyResponse, Criteria, Expert, InterviewTags, RankedExpert, Recommendation};

pub const DEFAULT_NETWORKS: [&str; 3] = ["NEXUS", "PRIME", "ALIGN"];

const SHORTLIST_WINDOW: usize = 6;
const OUTREACH_SHORTLIST: usize = 5;
const PROFILE_TERMS: usize = 8;
const AGENCY_MAX_TOKENS: u32 = 900;
const SYNTHESIS_MAX_TOKENS: u32 = 400;

const STRONG_FIT: &str = "Strong match on industry and function.";
const RECENT_FIT: &str = "Recent leadership experience with similar scope.";
pub const SYNTHESIS_FALLBACK: &str = "Synthesized recommendations prioritize experts with strong criteria match, agency endorsements, and alignment to recent interview themes.";

const SCREENING_QUESTIONS: [&str; 3] = [
    "Are you familiar with this market?",
    "Can you speak to major competitors?",
    "Can you discuss recent shifts in the industry?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailStyle {
    Brand,
    Short,
}

#[derive(Deserialize)]
struct AgencyEnvelope {
    agencies: Vec<AgencyResponse>,
}

/// Each network recommends the next pair from the top of the ranking. Networks run out
/// when the pair would reach past the shortlist.
pub fn simulate_agency_responses(ranked: &[RankedExpert], networks: &[String]) -> Vec<AgencyResponse> {
    let top = &ranked[..ranked.len().min(SHORTLIST_WINDOW)];
    let selected: Vec<String> = if networks.is_empty() {
        DEFAULT_NETWORKS.iter().map(|name| name.to_string()).collect()
    } else {
        networks.to_vec()
    };

    let mut responses = Vec::new();
    for (idx, network) in selected.iter().enumerate() {
        if idx * 2 + 1 >= top.len() {
            break;
        }
        let lead = &top[idx * 2].expert;
        let second = &top[idx * 2 + 1].expert;
        let style = if idx % 2 == 0 {
            EmailStyle::Brand
        } else {
            EmailStyle::Short
        };

        responses.push(AgencyResponse {
            agency_name: network.clone(),
            email_subject: "Re: Expert recommendations".to_string(),
            email_body: render_agency_email(style, lead, "Team"),
            recommended_experts: vec![
                recommend(lead, STRONG_FIT),
                recommend(second, RECENT_FIT),
            ],
        });
    }
    responses
}

fn recommend(expert: &Expert, fit_reason: &str) -> Recommendation {
    Recommendation {
        id: Some(expert.id.clone()),
        name: expert.name.clone(),
        fit_reason: fit_reason.to_string(),
        availability: expert.availability.clone(),
        rate: Some(expert.rate_per_hour),
    }
}

pub fn render_agency_email(style: EmailStyle, expert: &Expert, contact_name: &str) -> String {
    let availability = if expert.availability.trim().is_empty() {
        "This expert has not provided availability. We can expedite upon request.".to_string()
    } else {
        expert.availability.clone()
    };

    match style {
        EmailStyle::Brand => {
            let bio = format!(
                "{} is a former {} with {} years of experience. Their expertise spans {}.",
                expert.name,
                expert.headline,
                expert.years_experience,
                expert.topic_keywords.join(", ")
            );
            let geo = if expert.geography.is_empty() {
                "N/A"
            } else {
                expert.geography.as_str()
            };
            format!(
                "BRAND - EXPERTS\n\n{name} - Candidate\n\nFormer {headline}\n\nBIOGRAPHY\nGeo: {geo}\n\nCredit: TBD\n\n{bio}\n\n\
                 AVAILABILITY (WIB)\n{availability}\n\nSCREENING QUESTIONS\n\
                 1. {q1}\n\nI can cover these on call.\n\n\
                 2. {q2}\n\nCan cover this briefly.\n\n\
                 3. {q3}\n\nHappy to provide more detail on call.\n",
                name = expert.name,
                headline = expert.headline,
                geo = geo,
                bio = bio,
                availability = availability,
                q1 = SCREENING_QUESTIONS[0],
                q2 = SCREENING_QUESTIONS[1],
                q3 = SCREENING_QUESTIONS[2],
            )
        }
        EmailStyle::Short => {
            let availability_short = if availability.contains("Available") {
                "available for a call this week"
            } else {
                "pending availability"
            };
            let relevant_experience = if expert.industry_tags.is_empty() {
                expert.headline.clone()
            } else {
                expert.industry_tags.join("; ")
            };
            format!(
                "Hello {contact},\n\nJumping in for the team here. We have screened {name}, former {headline}, who is {availability}. \
                 Would you like to book them?\n\nAlso, checking in on your timeline for calls and any new priorities.\n\n\
                 Profile: {name} | {headline}\nRelevant experience: {relevant}\nScreened: Yes\n\nTop highlights:\n\
                 - Led initiatives in {functions}.\n- Experienced across {industries}.\n- Languages: {languages}.\n",
                contact = contact_name,
                name = expert.name,
                headline = expert.headline,
                availability = availability_short,
                relevant = relevant_experience,
                functions = expert.function_tags.join(", "),
                industries = expert.industry_tags.join(", "),
                languages = expert.languages.join(", "),
            )
        }
    }
}

/// Agency replies from the text generator, or simulated ones when it is unavailable or
/// its reply cannot be read as `{"agencies": [...]}`.
pub async fn collect_agency_responses<G: TextGenerator>(
    generator: &G,
    criteria: &Criteria,
    experts: &[Expert],
    ranked: &[RankedExpert],
    networks: &[String],
) -> Vec<AgencyResponse> {
    if generator.is_available() {
        let user = format!(
            "Simulate emails from the selected agencies. Return JSON with key 'agencies', an array of objects \
             with fields: agency_name, email_subject, email_body, recommended_experts (array). \
             Each recommended_expert must include id, name, fit_reason, availability, rate. \
             Use only the experts provided below by id/name.\n\n\
             Request criteria: {criteria}\n\
             Selected networks: {networks}\n\
             Experts: {experts}\n",
            criteria = serde_json::to_string(criteria).unwrap_or_default(),
            networks = join_or(networks, "All"),
            experts = expert_digest(experts),
        );
        let reply = generator
            .generate_json(
                "You are an expert-network agency responding to a consulting request.",
                &user,
                AGENCY_MAX_TOKENS,
            )
            .await;

        match reply.map(serde_json::from_value::<AgencyEnvelope>) {
            Some(Ok(envelope)) => {
                debug!(agencies = envelope.agencies.len(), "agency replies generated");
                return envelope.agencies;
            }
            Some(Err(err)) => warn!("agency reply was not usable: {}", err),
            None => warn!("text generator returned no agency replies"),
        }
    }

    simulate_agency_responses(ranked, networks)
}

fn expert_digest(experts: &[Expert]) -> String {
    let digest: Vec<serde_json::Value> = experts
        .iter()
        .map(|expert| {
            serde_json::json!({
                "id": expert.id,
                "name": expert.name,
                "headline": expert.headline,
                "industryTags": expert.industry_tags,
                "functionTags": expert.function_tags,
                "roleLevel": expert.role_level,
                "ratePerHour": expert.rate_per_hour,
                "availability": expert.availability,
                "complianceFlags": expert.compliance_flags,
            })
        })
        .collect();
    serde_json::to_string(&digest).unwrap_or_default()
}

/// Prose summary of the synthesized ranking.
pub async fn synthesis_note<G: TextGenerator>(
    generator: &G,
    criteria: &Criteria,
    responses: &[AgencyResponse],
    history: &[InterviewTags],
) -> String {
    if generator.is_available() {
        let user = format!(
            "Provide a concise synthesis of agency responses and past interview history. \
             Highlight why the top experts stand out and any gaps.\n\n\
             Criteria: {}\nAgency responses: {}\nRecent history tags: {}\n",
            serde_json::to_string(criteria).unwrap_or_default(),
            serde_json::to_string(responses).unwrap_or_default(),
            serde_json::to_string(history).unwrap_or_default(),
        );
        let note = generator
            .generate_text(
                "You are a consulting research lead synthesizing expert recommendations.",
                &user,
                SYNTHESIS_MAX_TOKENS,
            )
            .await;
        if let Some(note) = usable_text(note) {
            return note;
        }
    }
    SYNTHESIS_FALLBACK.to_string()
}

/// Deterministic outreach request to the selected networks.
pub fn draft_outreach_email(criteria: &Criteria, networks: &[String], ranked: &[RankedExpert]) -> String {
    let mut lines = vec![
        "Background / request".to_string(),
        if criteria.free_text.trim().is_empty() {
            "No additional context provided.".to_string()
        } else {
            criteria.free_text.trim().to_string()
        },
        String::new(),
        "Targeted populations".to_string(),
        format!("- Industries: {}", join_or(&criteria.industries, "General")),
        format!("- Functions: {}", join_or(&criteria.functions, "General")),
        format!("- Levels: {}", join_or(&criteria.levels, "Any level")),
        format!("- Geography: {}", criteria.geography),
        format!("- Budget: ${}/hr", criteria.budget),
        format!("- Networks: {}", join_or(networks, "All")),
    ];

    let profile_terms = summarize_profile_text(&criteria.profile_text, PROFILE_TERMS);
    if !criteria.linkedin_url.trim().is_empty() || !profile_terms.is_empty() {
        lines.push(String::new());
        lines.push("Profile signal".to_string());
        if !criteria.linkedin_url.trim().is_empty() {
            lines.push(format!("- LinkedIn URL: {}", criteria.linkedin_url.trim()));
        }
        if !profile_terms.is_empty() {
            lines.push(format!("- Profile keywords: {}", profile_terms.join(", ")));
        }
    }

    if !ranked.is_empty() {
        lines.push(String::new());
        lines.push("Proposed Expert Shortlist".to_string());
        for item in ranked.iter().take(OUTREACH_SHORTLIST) {
            let expert = &item.expert;
            lines.push(format!(
                "- {} ({}) | {} | {} yrs | Rate ${}/hr | Topics: {}",
                expert.name,
                expert.headline,
                expert.geography,
                expert.years_experience,
                expert.rate_per_hour,
                expert.topic_keywords.join(", ")
            ));
        }
    }

    lines.join("\n")
}
