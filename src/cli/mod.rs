use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::enhance::ApplyMode;
use crate::feedback::FeedbackType;
use crate::prompt::PromptVariant;
use crate::wire::ImprovementKind;

#[derive(Parser, Debug)]
#[command(name = "vibe_prompt", version, about = "Build prompts for AI website builders")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// TOML config file (defaults to ./vibe-prompt.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Step through the website form and assemble a prompt
    Build {
        /// Load answers from a JSON file instead of asking
        #[arg(long)]
        form: Option<PathBuf>,

        #[arg(long, value_enum)]
        variant: Option<PromptVariant>,

        #[command(flatten)]
        enhance: EnhanceArgs,

        /// Write the final prompt to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Answer five questions and let the AI write the prompt
    Guided {
        #[command(flatten)]
        enhance: EnhanceArgs,

        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Suggest pages, features and a style for a business idea
    Analyze {
        #[arg(long)]
        idea: String,

        /// Pre-fill a form with the suggestions and assemble it
        #[arg(long, default_value_t = false)]
        apply: bool,

        #[arg(long, value_enum)]
        variant: Option<PromptVariant>,
    },

    /// Enhance an existing prompt text with AI
    Improve {
        #[arg(long)]
        prompt_file: PathBuf,

        #[arg(long, value_enum, default_value_t = ImprovementKind::Clarity)]
        kind: ImprovementKind,

        #[arg(long, value_enum, default_value_t = ApplyMode::Alongside)]
        mode: ApplyMode,

        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Show today's remaining AI requests
    Usage,

    #[command(subcommand)]
    Feedback(FeedbackCommand),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct EnhanceArgs {
    /// Enhance the generated prompt with AI
    #[arg(long, value_enum)]
    pub enhance: Option<ImprovementKind>,

    /// Make the enhanced prompt the active one
    #[arg(long, default_value_t = false)]
    pub replace: bool,
}

impl EnhanceArgs {
    pub fn mode(&self) -> ApplyMode {
        if self.replace { ApplyMode::Replace } else { ApplyMode::Alongside }
    }
}

#[derive(Subcommand, Debug)]
pub enum FeedbackCommand {
    /// Send a review, issue report or suggestion
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long = "type", value_enum, default_value_t = FeedbackType::Review)]
        kind: FeedbackType,
        #[arg(long)]
        message: String,
    },
    /// List all feedback, newest first
    List,
}
