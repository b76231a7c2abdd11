mod api;
mod openai;
mod server;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use expert_match::agency::{collect_agency_responses, draft_outreach_email, synthesis_note};
use expert_match::catalog::{find_expert, load_catalog};
use expert_match::config::AppConfig;
use expert_match::generation::{Depth, Narrator, Tone};
use expert_match::store::{InterviewLog, NewInterview};
use expert_match::{format_float, format_rate, Criteria, Expert, InterviewTags, RankedExpert};

use openai::LlmClient;

#[derive(Parser)]
#[command(name = "expert-match", about = "Expert shortlist matching and interview preparation")]
struct Cli {
    /// Path to the TOML config (defaults to $EXPERT_MATCH_CONFIG or config/expert-match.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score and rank the expert catalog against a request
    Rank(RankArgs),
    /// Re-rank with agency recommendations and interview history
    Synthesize(SynthesizeArgs),
    /// Generate an interview script, transcript and summary for one expert
    Interview(InterviewArgs),
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct CriteriaArgs {
    #[arg(long = "industry")]
    industries: Vec<String>,
    #[arg(long = "function")]
    functions: Vec<String>,
    #[arg(long = "level")]
    levels: Vec<String>,
    #[arg(long)]
    free_text: Option<String>,
    #[arg(long)]
    budget: Option<f64>,
    #[arg(long)]
    geography: Option<String>,
    #[arg(long)]
    profile_text: Option<String>,
    #[arg(long)]
    linkedin_url: Option<String>,
    /// JSON file with the full request; flags override its fields
    #[arg(long)]
    criteria_file: Option<PathBuf>,
}

impl CriteriaArgs {
    fn into_criteria(self) -> Result<Criteria, String> {
        let mut criteria = match self.criteria_file.as_deref() {
            Some(path) => read_criteria_file(path)?,
            None => Criteria::default(),
        };
        if !self.industries.is_empty() {
            criteria.industries = self.industries;
        }
        if !self.functions.is_empty() {
            criteria.functions = self.functions;
        }
        if !self.levels.is_empty() {
            criteria.levels = self.levels;
        }
        if let Some(value) = self.free_text {
            criteria.free_text = value;
        }
        if let Some(value) = self.budget {
            criteria.budget = value;
        }
        if let Some(value) = self.geography {
            criteria.geography = value;
        }
        if let Some(value) = self.profile_text {
            criteria.profile_text = value;
        }
        if let Some(value) = self.linkedin_url {
            criteria.linkedin_url = value;
        }
        Ok(criteria)
    }
}

#[derive(Args, Debug, Clone)]
struct RankArgs {
    #[command(flatten)]
    criteria: CriteriaArgs,
    #[arg(long, default_value_t = 10)]
    limit: usize,
    /// Also print the outreach email for the selected networks
    #[arg(long)]
    outreach: bool,
    #[arg(long = "network")]
    networks: Vec<String>,
    #[arg(long)]
    details: bool,
}

#[derive(Args, Debug, Clone)]
struct SynthesizeArgs {
    #[command(flatten)]
    criteria: CriteriaArgs,
    #[arg(long, default_value_t = 10)]
    limit: usize,
    #[arg(long = "network")]
    networks: Vec<String>,
    /// Ask the LLM for agency replies and the synthesis note
    #[arg(long)]
    ai: bool,
    #[arg(long)]
    ai_model: Option<String>,
    /// Print the agency email bodies
    #[arg(long)]
    emails: bool,
}

#[derive(Args, Debug, Clone)]
struct InterviewArgs {
    #[command(flatten)]
    criteria: CriteriaArgs,
    #[arg(long)]
    expert_id: String,
    #[arg(long)]
    length: Option<u32>,
    #[arg(long)]
    tone: Option<String>,
    #[arg(long)]
    depth: Option<String>,
    #[arg(long, default_value = "")]
    refine: String,
    /// Last artifact to produce: script, transcript or summary
    #[arg(long, default_value = "summary")]
    stage: String,
    #[arg(long)]
    ai: bool,
    #[arg(long)]
    ai_model: Option<String>,
    /// Append the finished interview to the interview log
    #[arg(long)]
    record: bool,
    /// 1-5 rating stored with --record
    #[arg(long)]
    rating: Option<u8>,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8790)]
    port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum InterviewStage {
    Script,
    Transcript,
    Summary,
}

impl InterviewStage {
    fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "script" => Some(InterviewStage::Script),
            "transcript" => Some(InterviewStage::Transcript),
            "summary" => Some(InterviewStage::Summary),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let (config, _) = AppConfig::load(cli.config).map_err(|err| err.to_string())?;

    match cli.command {
        Command::Rank(args) => run_rank(args, &config),
        Command::Synthesize(args) => run_synthesize(args, &config).await,
        Command::Interview(args) => run_interview(args, &config).await,
        Command::Serve(args) => server::serve(args, config).await,
    }
}

fn run_rank(args: RankArgs, config: &AppConfig) -> Result<(), String> {
    let criteria = args.criteria.into_criteria()?;
    let experts = load_experts(config)?;
    let ranked = config.pipeline().rank(&criteria, &experts);

    print_ranking(&ranked, args.limit, args.details);

    if args.outreach {
        let networks = networks_or_default(args.networks, config);
        println!("\nOutreach email:\n");
        println!("{}", draft_outreach_email(&criteria, &networks, &ranked));
    }
    Ok(())
}

async fn run_synthesize(args: SynthesizeArgs, config: &AppConfig) -> Result<(), String> {
    let criteria = args.criteria.into_criteria()?;
    let experts = load_experts(config)?;
    let networks = networks_or_default(args.networks, config);
    let generator = llm_client(args.ai, args.ai_model, config)?;

    let base = config.pipeline().rank(&criteria, &experts);
    let responses = collect_agency_responses(&generator, &criteria, &experts, &base, &networks).await;
    let history = InterviewLog::load(config.storage.interview_log_path.clone())
        .await
        .map_err(|err| err.to_string())?
        .history_tags(config.synthesis.history_limit)
        .await;

    let synthesized =
        config
            .synthesizer()
            .synthesize(&criteria, &experts, Some(&base), &responses, &history);

    println!("Agency responses: {}", responses.len());
    for response in &responses {
        let names: Vec<&str> = response
            .recommended_experts
            .iter()
            .map(|item| item.name.as_str())
            .collect();
        println!("- {}: {}", response.agency_name, names.join(", "));
        if args.emails {
            println!("\n{}\n{}\n", response.email_subject, response.email_body);
        }
    }
    println!("History records: {}\n", history.len());

    print_ranking(&synthesized, args.limit, true);

    let note = synthesis_note(&generator, &criteria, &responses, &history).await;
    println!("\nSynthesis note:\n{}", note);
    Ok(())
}

async fn run_interview(args: InterviewArgs, config: &AppConfig) -> Result<(), String> {
    let stage = InterviewStage::from_str(&args.stage)
        .ok_or_else(|| format!("invalid stage: {}", args.stage))?;
    let mut params = config.generation.params;
    if let Some(length) = args.length {
        params.length_minutes = length;
    }
    if let Some(tone) = args.tone.as_deref() {
        params.tone = Tone::parse(tone);
    }
    if let Some(depth) = args.depth.as_deref() {
        params.depth = Depth::from_str(depth).ok_or_else(|| format!("invalid depth: {}", depth))?;
    }

    let criteria = args.criteria.into_criteria()?;
    let experts = load_experts(config)?;
    let expert = find_expert(&experts, &args.expert_id).map_err(|err| err.to_string())?;
    let narrator = Narrator::new(llm_client(args.ai, args.ai_model, config)?);
    let refine = args.refine.trim();

    let script = narrator.script(&criteria, expert, &params, refine).await;
    println!("{}", script.text);
    if stage == InterviewStage::Script {
        return Ok(());
    }

    let transcript = narrator
        .transcript(&criteria, expert, &script.text, &params, refine)
        .await;
    println!("\n---\n\n{}", transcript.text);

    let summary = if stage == InterviewStage::Summary {
        let summary = narrator
            .summary(&criteria, expert, &script.text, &transcript.text, refine)
            .await;
        println!("\n---\n\n{}", summary.markdown);
        Some(summary)
    } else {
        None
    };

    if args.record {
        let log = InterviewLog::load(config.storage.interview_log_path.clone())
            .await
            .map_err(|err| err.to_string())?;
        let (summary_text, tags) = match summary {
            Some(summary) => (summary.markdown, summary.summary.tags),
            None => (String::new(), criteria_tags(&criteria)),
        };
        let record = log
            .append(NewInterview {
                industries: criteria.industries.clone(),
                functions: criteria.functions.clone(),
                levels: criteria.levels.clone(),
                free_text: criteria.free_text.clone(),
                expert_id: expert.id.clone(),
                expert_name: expert.name.clone(),
                script_text: script.text,
                transcript_text: transcript.text,
                summary_text,
                tags,
                interview_rating: args.rating,
            })
            .await
            .map_err(|err| err.to_string())?;
        eprintln!("Recorded interview #{}", record.id);
    }
    Ok(())
}

fn print_ranking(ranked: &[RankedExpert], limit: usize, details: bool) {
    for (idx, item) in ranked.iter().take(limit).enumerate() {
        let expert = &item.expert;
        println!(
            "{}. {} [{}] score {} | {} | {}",
            idx + 1,
            expert.name,
            expert.id,
            format_float(item.score, 1),
            expert.headline,
            format_rate(expert.rate_per_hour)
        );
        if details {
            for reason in &item.match_reasons {
                println!("   - {}", reason);
            }
        }
    }
}

fn criteria_tags(criteria: &Criteria) -> InterviewTags {
    InterviewTags {
        industries: criteria.industries.clone(),
        functions: criteria.functions.clone(),
        levels: criteria.levels.clone(),
        topics: Vec::new(),
    }
}

fn llm_client(ai: bool, model: Option<String>, config: &AppConfig) -> Result<Option<LlmClient>, String> {
    if !ai {
        return Ok(None);
    }
    LlmClient::from_env(&config.llm, model)
        .map(Some)
        .ok_or_else(|| "OPENAI_API_KEY is not set".to_string())
}

fn networks_or_default(networks: Vec<String>, config: &AppConfig) -> Vec<String> {
    if networks.is_empty() {
        config.generation.networks.clone()
    } else {
        networks
    }
}

fn load_experts(config: &AppConfig) -> Result<Vec<Expert>, String> {
    load_catalog(&config.storage.catalog_path).map_err(|err| err.to_string())
}

fn read_criteria_file(path: &Path) -> Result<Criteria, String> {
    let data = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read criteria file: {}", err))?;
    serde_json::from_str(&data).map_err(|err| format!("failed to parse criteria file: {}", err))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
