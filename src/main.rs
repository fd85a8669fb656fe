use anyhow::{Context, Result};
use clap::Parser;
use fs_err as fs;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod cli;
mod config;
mod enhance;
mod errors;
mod export;
mod feedback;
mod form;
mod prompt;
mod provider;
mod proxy;
mod usage;
mod ux;
mod wire;
mod wizard;

use cli::{Command, EnhanceArgs, FeedbackCommand};
use enhance::{ApplyMode, EnhancementOrchestrator};
use form::{DesignStyle, FormData, FEATURE_OPTIONS, PAGE_OPTIONS};
use prompt::GeneratedPrompt;
use usage::{Session, UsageGate};
use wizard::{FormStep, GuidedWizard, StepOutcome, WizardController, FORM_STEPS};

/// Everything one CLI invocation needs, built once from the config.
struct App {
    cfg: config::Config,
    session: Session,
    orchestrator: EnhancementOrchestrator,
    backend: provider::DynBackend,
}

impl App {
    fn new(cfg: config::Config) -> Result<Self> {
        let backend = provider::make_backend(&cfg)?;
        let session = Session::new(cfg.user_id.clone(), cfg.daily_limit);
        let orchestrator = EnhancementOrchestrator::new(
            UsageGate::new(backend.clone()),
            proxy::AiProxyClient::new(backend.clone()),
        );
        Ok(Self { cfg, session, orchestrator, backend })
    }

    async fn refresh_usage(&self) {
        if let Err(e) = self.orchestrator.gate().refresh(&self.session).await {
            debug!("could not refresh usage: {e}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();

    let filter = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cfg = config::Config::load(args.config.as_deref())?;
    let app = App::new(cfg)?;
    app.refresh_usage().await;

    match args.command {
        Command::Build { form, variant, enhance, out } => {
            let variant = variant.unwrap_or(app.cfg.default_variant);
            let form = match form {
                Some(path) => load_form(&path)?,
                None => match run_form_wizard(&app).await {
                    Some(f) => f,
                    None => {
                        println!("Aborted.");
                        return Ok(());
                    }
                },
            };
            let prompt = GeneratedPrompt::from_form(&form, variant);
            ux::show_prompt(&prompt);
            app.orchestrator.set_generated(prompt);
            finish(&app, &enhance, out.as_deref()).await?;
        }

        Command::Guided { enhance, out } => {
            let Some(answers) = run_guided_wizard() else {
                println!("Aborted.");
                return Ok(());
            };
            let pb = ux::spinner("Generating...");
            let report = app.orchestrator.generate_guided(&app.session, &answers).await;
            pb.finish_and_clear();
            ux::report(&report);
            if let Ok(prompt) = report.outcome {
                ux::show_prompt(&prompt);
                finish(&app, &enhance, out.as_deref()).await?;
            }
        }

        Command::Analyze { idea, apply, variant } => {
            let pb = ux::spinner("Analyzing...");
            let report = app.orchestrator.analyze_business(&app.session, &idea).await;
            pb.finish_and_clear();
            ux::report(&report);
            if let Ok(s) = report.outcome {
                ux::show_suggestions(&s);
                if apply {
                    let mut form = FormData { purpose: idea.trim().to_string(), ..FormData::default() };
                    form.apply_suggestions(&s);
                    let prompt = GeneratedPrompt::from_form(&form, variant.unwrap_or(app.cfg.default_variant));
                    ux::notify(&ux::Notification::success(
                        "Suggestions Applied!",
                        "Your form has been pre-filled with our suggestions.",
                    ));
                    ux::show_prompt(&prompt);
                }
            }
        }

        Command::Improve { prompt_file, kind, mode, out } => {
            let body = fs::read_to_string(&prompt_file)?;
            app.orchestrator.set_generated(GeneratedPrompt::from_text(body, &prompt_file));
            let args = EnhanceArgs { enhance: Some(kind), replace: mode == ApplyMode::Replace };
            finish(&app, &args, out.as_deref()).await?;
        }

        Command::Usage => {
            if app.session.user_id().is_none() {
                ux::notify(&errors::PromptError::NotAuthenticated.notification());
            }
            ux::show_usage(app.session.remaining(), app.session.daily_limit());
        }

        Command::Feedback(cmd) => {
            let store = feedback::FeedbackStore::new(app.backend.clone());
            match cmd {
                FeedbackCommand::Submit { name, email, kind, message } => {
                    let fb = feedback::NewFeedback { name, email, kind, message };
                    match store.submit(&fb).await {
                        Ok(()) => ux::notify(&ux::Notification::success(
                            "Thank you!",
                            "Your feedback has been submitted.",
                        )),
                        Err(e) => ux::notify(&e.notification()),
                    }
                }
                FeedbackCommand::List => match store.list().await {
                    Ok(entries) => ux::show_feedback(&entries),
                    Err(e) => ux::notify(&e.notification()),
                },
            }
        }
    }

    Ok(())
}

fn load_form(path: &Path) -> Result<FormData> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).with_context(|| format!("invalid form file {}", path.display()))
}

/// Optional enhancement, then display and export of the workspace.
async fn finish(app: &App, enhance: &EnhanceArgs, out: Option<&Path>) -> Result<()> {
    if let Some(kind) = enhance.enhance {
        let pb = ux::spinner("Improving...");
        let report = app.orchestrator.enhance(&app.session, kind, enhance.mode()).await;
        pb.finish_and_clear();
        ux::report(&report);
        ux::show_workspace(&app.orchestrator.workspace());
        ux::show_usage(app.session.remaining(), app.session.daily_limit());

        let ws = app.orchestrator.workspace();
        if ws.enhanced().is_some() && !ws.is_showing_enhanced() && ux::confirm("Replace the original with this version?") {
            ux::notify(&app.orchestrator.use_enhanced());
        } else if ws.is_showing_enhanced() && ux::confirm("Keep the original instead?") {
            ux::notify(&app.orchestrator.use_original());
        }
    }

    let ws = app.orchestrator.workspace();
    match out {
        Some(path) => {
            let saved = export::write_prompt(path, &ws)?;
            ux::notify(&ux::Notification::success(
                "Prompt Copied!",
                format!("Your AI prompt has been written to {}.", path.display()),
            ));
            ux::show_saved(&saved);
        }
        None if ws.enhanced().is_some() => {
            let saved = export::save_workspace(Path::new(&app.cfg.export_dir), &ws, Uuid::new_v4())?;
            info!("prompt saved under {}", saved.dir.display());
            println!("Saved prompt to {}", saved.prompt.display());
            ux::show_saved(&saved);
        }
        None => {}
    }
    Ok(())
}

async fn run_form_wizard(app: &App) -> Option<FormData> {
    let mut form = FormData::default();
    let mut steps = WizardController::new(FORM_STEPS);
    let mut offered_help = false;

    loop {
        let step = FormStep::at(steps.step())?;
        match step {
            FormStep::NameAndPurpose => {
                ux::step_header("Tell us about your website", steps.step(), steps.total(), steps.progress_percent());
                form.website_name = ux::ask("Website Name:", "e.g., Sarah's Portfolio, TechCorp Solutions")?;
                form.purpose = ux::ask(
                    "What's the purpose of your website?",
                    "e.g., Showcase my design portfolio, Sell handmade jewelry, Share my travel blog",
                )?;
                if form.is_blank() && !offered_help {
                    offered_help = true;
                    if ux::confirm("Need help getting started? Let AI suggest a structure") {
                        suggest_into(app, &mut form).await;
                    }
                }
            }
            FormStep::Audience => {
                ux::step_header("Who is your target audience?", steps.step(), steps.total(), steps.progress_percent());
                form.target_audience = ux::ask(
                    ">",
                    "e.g., Small business owners, Creative professionals, Young families",
                )?;
            }
            FormStep::Features => {
                ux::step_header("What features do you need?", steps.step(), steps.total(), steps.progress_percent());
                let picked = ux::choose_many(FEATURE_OPTIONS, &|o: &str| form.features.contains(o))?;
                for o in FEATURE_OPTIONS {
                    form.features.set(o, picked.iter().any(|p| p == o));
                }
            }
            FormStep::DesignStyle => {
                ux::step_header("Choose your design style", steps.step(), steps.total(), steps.progress_percent());
                let labels: Vec<&str> = DesignStyle::ALL.iter().map(|s| s.label()).collect();
                let current = form.design_style.and_then(|s| DesignStyle::ALL.iter().position(|x| *x == s));
                form.design_style = ux::choose_one(&labels, current)?.map(|i| DesignStyle::ALL[i]);
            }
            FormStep::Pages => {
                ux::step_header("Which pages do you need?", steps.step(), steps.total(), steps.progress_percent());
                let picked = ux::choose_many(PAGE_OPTIONS, &|o: &str| form.pages.contains(o))?;
                for o in PAGE_OPTIONS {
                    form.pages.set(o, picked.iter().any(|p| p == o));
                }
            }
            FormStep::AdditionalInfo => {
                ux::step_header("Any additional requirements?", steps.step(), steps.total(), steps.progress_percent());
                form.additional_info = ux::ask(
                    ">",
                    "e.g., Use blue and white colors, Include a hero video, Make it fun and engaging",
                )?;
            }
        }

        let nav = ux::ask("[Enter] next, [b] back, [q] quit:", "")?;
        match nav.as_str() {
            "q" => return None,
            "b" => {
                steps.prev();
            }
            _ => {
                if steps.next() == StepOutcome::Generate {
                    return Some(form);
                }
            }
        }
    }
}

async fn suggest_into(app: &App, form: &mut FormData) {
    let Some(idea) = ux::ask(
        "Describe your business or idea:",
        "e.g., I make handmade jewelry and want to sell online to young professionals",
    ) else {
        return;
    };
    let pb = ux::spinner("Analyzing...");
    let report = app.orchestrator.analyze_business(&app.session, &idea).await;
    pb.finish_and_clear();
    ux::report(&report);
    if let Ok(s) = report.outcome {
        ux::show_suggestions(&s);
        if ux::confirm("Use this as my starting point?") {
            form.apply_suggestions(&s);
            if form.purpose.trim().is_empty() {
                form.purpose = idea.trim().to_string();
            }
        }
    }
}

fn run_guided_wizard() -> Option<wizard::GuidedAnswers> {
    let mut g = GuidedWizard::new();
    loop {
        let q = g.question();
        ux::step_header(q.title, g.step(), g.total(), g.progress_percent());
        let label = if q.multiline { "(separate items with ';') >" } else { ">" };
        let answer = ux::ask(label, q.placeholder)?;
        match answer.as_str() {
            "q" => return None,
            "b" => {
                g.prev();
                continue;
            }
            _ => g.answer(answer),
        }
        match g.next() {
            StepOutcome::Generate => return Some(g.answers().clone()),
            StepOutcome::Blocked => println!("Please answer before continuing."),
            StepOutcome::Advanced(_) => {}
        }
    }
}
