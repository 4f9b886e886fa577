use crate::args::{Cli, Command};
use crate::exit_codes;
use gavel_core::config::{load_suite, SuiteConfig};
use gavel_core::engine::{resolve_seed, Router, RouterPolicy};
use gavel_core::model::PipelineMode;
use gavel_core::providers::embedder::{openai::OpenAIEmbedder, Embedder};
use gavel_core::providers::judge::{openai::OpenAIJudge, JudgeClient};
use gavel_core::providers::nli::{http::HttpNli, NliHandle, NliScorer};
use gavel_core::report::{console, json};
use gavel_core::sampling::SamplingController;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-small";
const DEFAULT_JUDGE_MODEL: &str = "gpt-4o";
const JUDGE_MAX_TOKENS: u32 = 512;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Command::Validate { suite } => {
            let cfg = load_suite(&suite)?;
            eprintln!("suite '{}' ok ({} cases)", cfg.suite, cfg.cases.len());
            Ok(exit_codes::SUCCESS)
        }
        Command::Run {
            suite,
            mode,
            seed,
            parallel,
            json,
            verbose,
        } => run(suite, mode, seed, parallel, json, verbose).await,
    }
}

async fn run(
    suite_path: PathBuf,
    mode: Option<PipelineMode>,
    seed: Option<u64>,
    parallel: Option<usize>,
    json_out: Option<PathBuf>,
    verbose: bool,
) -> anyhow::Result<i32> {
    let cfg = load_suite(&suite_path)?;
    let mode = mode.unwrap_or(cfg.mode);
    let seed = resolve_seed(seed.or(cfg.settings.seed));

    tracing::info!(suite = %cfg.suite, %mode, cases = cfg.cases.len(), "starting run");

    let router = build_router(&cfg, mode, seed, parallel)?;
    let artifacts = router.run_batch(&cfg.cases).await?;

    for v in &artifacts.verdicts {
        if verbose || !v.overall_passed {
            console::print_verdict(v);
        }
    }
    console::print_summary(&artifacts);

    if let Some(path) = json_out {
        json::write_json(&artifacts, &path)?;
        tracing::info!(path = %path.display(), "wrote JSON report");
    }

    Ok(if artifacts.any_failed() {
        exit_codes::CASES_FAILED
    } else {
        exit_codes::SUCCESS
    })
}

fn build_router(
    cfg: &SuiteConfig,
    mode: PipelineMode,
    seed: u64,
    parallel: Option<usize>,
) -> anyhow::Result<Router> {
    let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
        anyhow::anyhow!("config error: OPENAI_API_KEY is not set (required for embeddings and judge)")
    })?;

    let embedder: Arc<dyn Embedder> =
        Arc::new(OpenAIEmbedder::new(DEFAULT_EMBED_MODEL, api_key.clone()));
    let judge: Arc<dyn JudgeClient> =
        Arc::new(OpenAIJudge::new(DEFAULT_JUDGE_MODEL, api_key, JUDGE_MAX_TOKENS));

    // The NLI endpoint is only contacted when an audit is sampled in; a
    // missing endpoint therefore fails audited cases, not the whole run.
    let nli = Arc::new(NliHandle::new(|| async {
        let endpoint = std::env::var("GAVEL_NLI_ENDPOINT").map_err(|_| {
            anyhow::anyhow!("GAVEL_NLI_ENDPOINT is not set (required for the contradiction audit)")
        })?;
        let token = std::env::var("HF_API_TOKEN").ok();
        Ok(Arc::new(HttpNli::new(endpoint, token)) as Arc<dyn NliScorer>)
    }));

    let (guardrail, tier_a, tier_b) =
        gavel_checks::standard_pipelines(embedder, nli, judge, cfg.thresholds);

    Ok(Router {
        suite: cfg.suite.clone(),
        guardrail,
        tier_a,
        tier_b,
        sampler: SamplingController::new(mode, cfg.settings.sample_rate()),
        seed,
        policy: RouterPolicy {
            parallel: parallel.or(cfg.settings.parallel).unwrap_or(4),
            provider_timeout: Duration::from_secs(cfg.settings.timeout_seconds.unwrap_or(30)),
        },
    })
}
