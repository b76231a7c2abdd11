use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;

use crate::api::{
    ApiCaseResponse, ApiCaseUpdate, ApiInterviewQuery, ApiInterviewRequest, ApiNarrativeResponse,
    ApiRankRequest, ApiRankResponse, ApiRankedExpert, ApiSummaryResponse, ApiSynthesizeRequest,
    ApiSynthesizeResponse,
};
use crate::openai::LlmClient;
use expert_match::agency::{collect_agency_responses, draft_outreach_email, synthesis_note};
use expert_match::catalog::{find_expert, load_catalog};
use expert_match::config::AppConfig;
use expert_match::generation::Narrator;
use expert_match::session::{CaseContext, SummaryArtifact};
use expert_match::store::{CaseStore, InterviewLog, InterviewRecord, NewInterview};
use expert_match::{criteria_signature, restore_ranking, Criteria, Error, Expert};

const DEFAULT_INTERVIEW_LIMIT: usize = 20;

type ApiError = (StatusCode, String);

#[derive(Clone)]
struct AppState {
    config: Arc<AppConfig>,
    experts: Arc<Vec<Expert>>,
    narrator: Arc<Narrator<Option<LlmClient>>>,
    interviews: Arc<InterviewLog>,
    cases: Arc<CaseStore>,
}

pub async fn serve(args: crate::ServeArgs, config: AppConfig) -> Result<(), String> {
    let experts = load_catalog(&config.storage.catalog_path).map_err(|err| err.to_string())?;
    let interviews = InterviewLog::load(config.storage.interview_log_path.clone())
        .await
        .map_err(|err| err.to_string())?;
    let cases = CaseStore::load(config.storage.case_store_path.clone())
        .await
        .map_err(|err| err.to_string())?;
    let llm_client = LlmClient::from_env(&config.llm, None);
    match &llm_client {
        Some(client) => info!(model = client.model(), "LLM generation enabled"),
        None => info!("OPENAI_API_KEY not set; using deterministic generation"),
    }

    let state = AppState {
        config: Arc::new(config),
        experts: Arc::new(experts),
        narrator: Arc::new(Narrator::new(llm_client)),
        interviews: Arc::new(interviews),
        cases: Arc::new(cases),
    };

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/rank", post(rank_handler))
        .route("/api/synthesize", post(synthesize_handler))
        .route("/api/script", post(script_handler))
        .route("/api/transcript", post(transcript_handler))
        .route("/api/summary", post(summary_handler))
        .route("/api/cases/:code", get(get_case).put(put_case))
        .route("/api/interviews", get(list_interviews).post(add_interview))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;
    info!(%addr, "expert-match server listening");

    axum::serve(
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| format!("failed to bind server: {}", err))?,
        app,
    )
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn rank_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiRankRequest>,
) -> Result<Json<ApiRankResponse>, ApiError> {
    let ranked = state.config.pipeline().rank(&request.criteria, &state.experts);
    let networks = request
        .networks
        .clone()
        .unwrap_or_else(|| state.config.generation.networks.clone());

    if let Some(case) = open_case(&state, request.case_code.as_deref(), &request.criteria).await {
        state
            .cases
            .save(case.record_ranking(&ranked))
            .await
            .map_err(api_error)?;
    }

    Ok(Json(ApiRankResponse {
        criteria_signature: criteria_signature(&request.criteria),
        outreach_email: draft_outreach_email(&request.criteria, &networks, &ranked),
        results: ApiRankedExpert::list(&ranked, request.limit),
    }))
}

async fn synthesize_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiSynthesizeRequest>,
) -> Result<Json<ApiSynthesizeResponse>, ApiError> {
    let criteria = &request.criteria;
    let signature = criteria_signature(criteria);
    let case = open_case(&state, request.case_code.as_deref(), criteria).await;

    // a ranking stored under the current criteria is reused as the base
    let base = match case.as_ref() {
        Some(case) if case.search_signature.as_deref() == Some(signature.as_str()) => {
            restore_ranking(&case.search_results, &state.experts)
        }
        _ => state.config.pipeline().rank(criteria, &state.experts),
    };

    let networks = request
        .networks
        .clone()
        .unwrap_or_else(|| state.config.generation.networks.clone());
    let generator = state.narrator.generator();
    let responses = match request.agency_responses {
        Some(responses) => responses,
        None => {
            collect_agency_responses(generator, criteria, &state.experts, &base, &networks).await
        }
    };

    let history = state
        .interviews
        .history_tags(state.config.synthesis.history_limit)
        .await;
    let synthesized = state.config.synthesizer().synthesize(
        criteria,
        &state.experts,
        Some(&base),
        &responses,
        &history,
    );
    let note = synthesis_note(generator, criteria, &responses, &history).await;

    if let Some(case) = case {
        state
            .cases
            .save(case.record_agency(responses.clone(), &synthesized))
            .await
            .map_err(api_error)?;
    }

    Ok(Json(ApiSynthesizeResponse {
        criteria_signature: signature,
        agency_responses: responses,
        results: ApiRankedExpert::list(&synthesized, request.limit),
        note,
        history_records: history.len(),
    }))
}

async fn script_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiInterviewRequest>,
) -> Result<Json<ApiNarrativeResponse>, ApiError> {
    let expert = find_expert(&state.experts, &request.expert_id).map_err(api_error)?;
    let params = request
        .params(state.config.generation.params)
        .map_err(bad_request)?;
    let refine = request.refine();

    let narrative = state
        .narrator
        .script(&request.criteria, expert, &params, refine)
        .await;

    let case = match open_case(&state, request.case_code.as_deref(), &request.criteria).await {
        Some(case) => {
            let case = case.select_expert(expert.id.clone()).record_script(
                narrative.text.clone(),
                params,
                refine,
                narrative.source,
            );
            Some(state.cases.save(case).await.map_err(api_error)?)
        }
        None => None,
    };

    Ok(Json(ApiNarrativeResponse {
        text: narrative.text,
        source: narrative.source,
        criteria_signature: criteria_signature(&request.criteria),
        stage: case.as_ref().map(CaseContext::stage),
        stale: case.map(|case| case.stale_artifacts()).unwrap_or_default(),
    }))
}

async fn transcript_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiInterviewRequest>,
) -> Result<Json<ApiNarrativeResponse>, ApiError> {
    let expert = find_expert(&state.experts, &request.expert_id).map_err(api_error)?;
    let params = request
        .params(state.config.generation.params)
        .map_err(bad_request)?;
    let refine = request.refine();
    let case = open_case(&state, request.case_code.as_deref(), &request.criteria).await;

    let script_text = request
        .script_text
        .clone()
        .or_else(|| {
            case.as_ref()
                .and_then(|case| case.script.as_ref())
                .map(|script| script.content.clone())
        })
        .ok_or_else(|| bad_request("script_text is required".to_string()))?;

    let narrative = state
        .narrator
        .transcript(&request.criteria, expert, &script_text, &params, refine)
        .await;

    let case = match case {
        Some(case) => {
            let case = case
                .record_transcript(narrative.text.clone(), params, refine, narrative.source)
                .map_err(api_error)?;
            Some(state.cases.save(case).await.map_err(api_error)?)
        }
        None => None,
    };

    Ok(Json(ApiNarrativeResponse {
        text: narrative.text,
        source: narrative.source,
        criteria_signature: criteria_signature(&request.criteria),
        stage: case.as_ref().map(CaseContext::stage),
        stale: case.map(|case| case.stale_artifacts()).unwrap_or_default(),
    }))
}

async fn summary_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiInterviewRequest>,
) -> Result<Json<ApiSummaryResponse>, ApiError> {
    let expert = find_expert(&state.experts, &request.expert_id).map_err(api_error)?;
    let params = request
        .params(state.config.generation.params)
        .map_err(bad_request)?;
    let refine = request.refine();
    let case = open_case(&state, request.case_code.as_deref(), &request.criteria).await;

    let script_text = request
        .script_text
        .clone()
        .or_else(|| {
            case.as_ref()
                .and_then(|case| case.script.as_ref())
                .map(|script| script.content.clone())
        })
        .unwrap_or_default();
    let transcript_text = request
        .transcript_text
        .clone()
        .or_else(|| {
            case.as_ref()
                .and_then(|case| case.transcript.as_ref())
                .map(|transcript| transcript.content.clone())
        })
        .ok_or_else(|| bad_request("transcript_text is required".to_string()))?;

    let narrative = state
        .narrator
        .summary(&request.criteria, expert, &script_text, &transcript_text, refine)
        .await;

    let case = match case {
        Some(case) => {
            let artifact = SummaryArtifact {
                markdown: narrative.markdown.clone(),
                summary: narrative.summary.clone(),
            };
            let case = case
                .record_summary(artifact, params, refine, narrative.source)
                .map_err(api_error)?;
            Some(state.cases.save(case).await.map_err(api_error)?)
        }
        None => None,
    };

    Ok(Json(ApiSummaryResponse {
        markdown: narrative.markdown,
        summary: narrative.summary,
        source: narrative.source,
        criteria_signature: criteria_signature(&request.criteria),
        stage: case.as_ref().map(CaseContext::stage),
        stale: case.map(|case| case.stale_artifacts()).unwrap_or_default(),
    }))
}

async fn get_case(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ApiCaseResponse>, ApiError> {
    state
        .cases
        .load_case(&code)
        .await
        .map(|case| Json(ApiCaseResponse::from_case(case)))
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown case: {}", code)))
}

async fn put_case(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(update): Json<ApiCaseUpdate>,
) -> Result<Json<ApiCaseResponse>, ApiError> {
    let mut case = match state.cases.load_case(&code).await {
        Some(case) => case.with_criteria(update.criteria),
        None => CaseContext::new(code, update.criteria),
    };
    if let Some(expert_id) = update.selected_expert_id {
        find_expert(&state.experts, &expert_id).map_err(api_error)?;
        case = case.select_expert(expert_id);
    }
    let case = state.cases.save(case).await.map_err(api_error)?;
    Ok(Json(ApiCaseResponse::from_case(case)))
}

async fn list_interviews(
    State(state): State<AppState>,
    Query(query): Query<ApiInterviewQuery>,
) -> Json<Vec<InterviewRecord>> {
    let limit = query.limit.unwrap_or(DEFAULT_INTERVIEW_LIMIT);
    Json(state.interviews.recent(limit).await)
}

async fn add_interview(
    State(state): State<AppState>,
    Json(entry): Json<NewInterview>,
) -> Result<Json<InterviewRecord>, ApiError> {
    if entry.expert_id.trim().is_empty() {
        return Err(bad_request("expert_id is required".to_string()));
    }
    state
        .interviews
        .append(entry)
        .await
        .map(Json)
        .map_err(api_error)
}

/// Loads the named case, or starts one, aligned to `criteria`.
async fn open_case(
    state: &AppState,
    case_code: Option<&str>,
    criteria: &Criteria,
) -> Option<CaseContext> {
    let code = case_code.map(str::trim).filter(|code| !code.is_empty())?;
    let case = match state.cases.load_case(code).await {
        Some(case) if case.criteria_signature == criteria_signature(criteria) => case,
        Some(case) => case.with_criteria(criteria.clone()),
        None => CaseContext::new(code, criteria.clone()),
    };
    Some(case)
}

fn bad_request(message: String) -> ApiError {
    (StatusCode::BAD_REQUEST, message)
}

fn api_error(err: Error) -> ApiError {
    let status = match err {
        Error::UnknownExpert(_) => StatusCode::NOT_FOUND,
        Error::Stage(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}
