use crate::cli::args::{BotArg, CharacterArg, Cli, Command, RunArgs};
use crate::exit_codes;
use anyhow::Context;
use cibench_core::config::BenchConfig;
use cibench_core::engine::Runner;
use cibench_core::judge::{JudgeClient, OllamaJudge};
use cibench_core::model::{EnhancementMethod, Persona, Tier, Variant};
use cibench_core::providers::chatbot::{ChatbotBackend, KindroidClient, NomiClient};
use cibench_core::scenario::{parse_scenarios, parse_user_context};
use cibench_core::storage::{conversation_file_name, ConversationTable};
use std::sync::Arc;
use std::time::Duration;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => run(args).await,
    }
}

async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let config = match &args.config {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::default(),
    };

    let tier = Tier::from_number(args.tier).context("tier must be 1, 2 or 3")?;
    let variant = Variant::new(args.variant).context("variant must be 1, 2 or 3")?;

    let method = args
        .enhancement
        .map(|e| e.method())
        .unwrap_or(EnhancementMethod::None);

    // The run label keys the conversation directory and file name; the
    // persona is the character the backend actually talks to.
    let (label, persona) = match (args.character, args.enhancement) {
        (Some(character), None) => {
            let persona = character.persona();
            (persona.slug().to_string(), persona)
        }
        (None, Some(_)) => {
            let source = args
                .source_character
                .map(CharacterArg::persona)
                .context("--source-character is required for enhancement runs")?;
            let persona = if method == EnhancementMethod::SelfDefenseProxy {
                // Proxy re-evaluation always addresses the judge persona.
                Persona::MsJudge
            } else {
                source
            };
            (method.label().to_string(), persona)
        }
        // The clap ArgGroup makes these unreachable; keep the error anyway.
        _ => anyhow::bail!("exactly one of --character and --enhancement must be set"),
    };

    let scenarios = parse_scenarios(
        tier,
        variant,
        &config.paths.eval_file(tier),
        &config.paths.scenario_file(tier),
    )?;
    let user_context = parse_user_context(&config.paths.user_context)?;

    let prior = if method == EnhancementMethod::SelfDefenseProxy {
        let source = args
            .source_character
            .map(CharacterArg::persona)
            .context("--source-character is required for proxy runs")?;
        let prior_path = config
            .paths
            .conversations_dir
            .join(args.bot.label())
            .join(source.slug())
            .join(conversation_file_name(
                args.bot.label(),
                source.slug(),
                tier,
                variant,
            ));
        Some(ConversationTable::load(&prior_path, tier)?)
    } else {
        None
    };

    let table_path = config
        .paths
        .conversations_dir
        .join(args.bot.label())
        .join(&label)
        .join(conversation_file_name(args.bot.label(), &label, tier, variant));
    let mut table = ConversationTable::create(&table_path, tier)?;

    let backend = build_backend(args.bot, persona, &config)?;
    let judge: Option<Arc<dyn JudgeClient>> = if config.judge.enabled {
        Some(Arc::new(OllamaJudge::new(
            config.judge.model.clone(),
            config.judge.endpoint.clone(),
        )))
    } else {
        None
    };

    let runner = Runner {
        backend,
        judge,
        pause: Duration::from_secs(config.pacing.inter_prompt_seconds),
    };
    runner
        .run(
            tier,
            variant,
            method,
            &scenarios,
            &user_context,
            prior.as_ref(),
            &mut table,
        )
        .await?;

    tracing::info!(
        rows = table.row_count(),
        path = %table.path().display(),
        "conversation recorded"
    );
    println!(
        "recorded {} rows to {}",
        table.row_count(),
        table.path().display()
    );
    Ok(exit_codes::SUCCESS)
}

fn build_backend(
    bot: BotArg,
    persona: Persona,
    config: &BenchConfig,
) -> anyhow::Result<Arc<dyn ChatbotBackend>> {
    let (backend_cfg, default_env) = match bot {
        BotArg::NomiAi => (&config.nomi, "NOMI_API_KEY"),
        BotArg::Kindroid => (&config.kindroid, "KINDROID_API_KEY"),
    };

    let env_name = backend_cfg.api_key_env.as_deref().unwrap_or(default_env);
    let api_key = std::env::var(env_name)
        .with_context(|| format!("API key environment variable {env_name} is not set"))?;
    let character_id = backend_cfg
        .character_id(persona.slug())
        .with_context(|| {
            format!(
                "no {} character id configured for persona {}",
                bot.label(),
                persona.slug()
            )
        })?
        .to_string();

    Ok(match bot {
        BotArg::NomiAi => Arc::new(NomiClient::new(api_key, character_id)),
        BotArg::Kindroid => Arc::new(KindroidClient::new(api_key, character_id)),
    })
}
