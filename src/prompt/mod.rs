use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::form::{DesignStyle, FormData};
use crate::wizard::GuidedAnswers;

const DEFAULT_PAGES: &[&str] = &["Home", "About", "Contact"];
const DEFAULT_FEATURES: &[&str] = &["Contact Form"];
const DEFAULT_NAME: &str = "My Website";
const DEFAULT_PURPOSE: &str = "a small business or personal brand";
const DEFAULT_AUDIENCE: &str = "General visitors";
const DEFAULT_ADDITIONAL: &str = "None specified";
const DEFAULT_STYLE: DesignStyle = DesignStyle::ModernProfessional;

const STYLE_GUIDANCE: &str =
    "Use modern layouts, appropriate color schemes, and ensure mobile responsiveness.";

const CLOSING: &str = "Please ensure the website is professional, user-friendly, and optimized \
for the target audience. Include proper navigation, clear call-to-action buttons, and maintain \
consistent branding throughout.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PromptVariant {
    Narrative,
    Structured,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptSource {
    Form(FormData),
    Guided(GuidedAnswers),
    /// Existing prompt text loaded from a file.
    Text(PathBuf),
}

/// A prompt produced by the form or guided wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPrompt {
    pub body: String,
    pub variant: PromptVariant,
    pub source: PromptSource,
}

impl GeneratedPrompt {
    pub fn from_form(form: &FormData, variant: PromptVariant) -> Self {
        Self {
            body: assemble(form, variant),
            variant,
            source: PromptSource::Form(form.clone()),
        }
    }

    /// Wraps text synthesized from guided answers.
    pub fn from_guided(body: String, answers: &GuidedAnswers) -> Self {
        Self {
            body,
            variant: PromptVariant::Narrative,
            source: PromptSource::Guided(answers.clone()),
        }
    }

    /// Wraps prompt text the user wrote elsewhere.
    pub fn from_text(body: String, path: &Path) -> Self {
        Self {
            body,
            variant: PromptVariant::Narrative,
            source: PromptSource::Text(path.to_path_buf()),
        }
    }

    pub fn purpose(&self) -> Option<&str> {
        match &self.source {
            PromptSource::Form(f) if !f.purpose.trim().is_empty() => Some(f.purpose.trim()),
            _ => None,
        }
    }
}

/// Resolved section values, with defaults substituted for blanks.
struct Sections<'a> {
    name: &'a str,
    purpose: &'a str,
    audience: &'a str,
    pages: Vec<&'a str>,
    features: Vec<&'a str>,
    style: DesignStyle,
    additional: &'a str,
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    let v = value.trim();
    if v.is_empty() { default } else { v }
}

impl<'a> Sections<'a> {
    fn resolve(form: &'a FormData) -> Self {
        let pages: Vec<&str> = if form.pages.is_empty() {
            DEFAULT_PAGES.to_vec()
        } else {
            form.pages.iter().collect()
        };
        let features: Vec<&str> = if form.features.is_empty() {
            DEFAULT_FEATURES.to_vec()
        } else {
            form.features.iter().collect()
        };
        Self {
            name: or_default(&form.website_name, DEFAULT_NAME),
            purpose: or_default(&form.purpose, DEFAULT_PURPOSE),
            audience: or_default(&form.target_audience, DEFAULT_AUDIENCE),
            pages,
            features,
            style: form.design_style.unwrap_or(DEFAULT_STYLE),
            additional: or_default(&form.additional_info, DEFAULT_ADDITIONAL),
        }
    }
}

/// Render `form` as a prompt. Pure; blank fields fall back to fixed defaults.
pub fn assemble(form: &FormData, variant: PromptVariant) -> String {
    let s = Sections::resolve(form);
    match variant {
        PromptVariant::Structured => structured(&s),
        PromptVariant::Narrative => narrative(&s),
    }
}

fn structured(s: &Sections) -> String {
    let bullets = |items: &[&str]| {
        items.iter().map(|i| format!("- {i}")).collect::<Vec<_>>().join("\n")
    };
    format!(
        "Create a {style_lc} website called \"{name}\" for {purpose}.\n\n\
Target Audience:\n- {audience}\n\n\
Required Pages:\n{pages}\n\n\
Key Features to Include:\n{features}\n\n\
Design Style:\n- {style} - {guidance}\n\n\
Additional Requirements:\n- {additional}\n\n\
{closing}",
        style_lc = s.style.label().to_lowercase(),
        name = s.name,
        purpose = s.purpose,
        audience = s.audience,
        pages = bullets(&s.pages),
        features = bullets(&s.features),
        style = s.style,
        guidance = STYLE_GUIDANCE,
        additional = s.additional,
        closing = CLOSING,
    )
}

fn narrative(s: &Sections) -> String {
    format!(
        "Create a website called \"{name}\" for {purpose}. \
It is aimed at the following audience: {audience}. \
The site should include these pages: {pages}. \
Key features to include are: {features}. \
The design style should be {style}; {guidance_lc} \
Additional requirements: {additional}.\n\n\
{closing}",
        name = s.name,
        purpose = s.purpose,
        audience = s.audience.trim_end_matches('.'),
        pages = s.pages.join(", "),
        features = s.features.join(", "),
        style = s.style,
        guidance_lc = lowercase_first(STYLE_GUIDANCE),
        additional = s.additional.trim_end_matches('.'),
        closing = CLOSING,
    )
}

fn lowercase_first(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        Some(f) => f.to_lowercase().chain(c).collect(),
        None => String::new(),
    }
}

/// Text block sent to the proxy for guided Q&A synthesis.
pub fn guided_qa_text(a: &GuidedAnswers) -> String {
    format!(
        "What you sell/offer: {}\n\
Target audience: {}\n\
Desired visitor action: {}\n\
Brand personality: {}\n\
Additional requirements: {}",
        a.what_you_sell.trim(),
        a.target_audience.trim(),
        a.desired_action.trim(),
        a.brand_personality.trim(),
        a.additional_info.trim(),
    )
}

/// Where to paste the prompt and what it will produce.
pub fn usage_instructions(prompt: &GeneratedPrompt) -> (String, String) {
    let purpose = "Paste this into Framer AI, Webflow AI, or similar tools to generate a website layout".to_string();
    let outcome = match prompt.purpose() {
        Some(p) => format!(
            "This will create a {} website with all specified features and sections",
            p.to_lowercase()
        ),
        None => "This will create a professional website with all your specified features and design preferences".to_string(),
    };
    (purpose, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{Catalog, Selection};

    fn nonnas() -> FormData {
        let mut form = FormData {
            website_name: "Nonna's".into(),
            purpose: "Italian restaurant".into(),
            design_style: Some(DesignStyle::ModernProfessional),
            ..FormData::default()
        };
        for p in ["Home", "Menu", "Contact"] {
            form.pages.insert(p);
        }
        form.features.insert("Booking System");
        form
    }

    #[test]
    fn structured_restaurant_prompt_has_all_answers() {
        let out = assemble(&nonnas(), PromptVariant::Structured);
        for needle in ["Nonna's", "Menu", "Booking System", "Modern & Professional"] {
            assert!(out.contains(needle), "missing {needle} in:\n{out}");
        }
    }

    #[test]
    fn each_page_and_feature_appears_once_in_order() {
        let mut form = FormData::default();
        for p in ["Pricing", "Team", "Portfolio"] {
            form.pages.insert(p);
        }
        for f in ["Analytics", "Chat Support", "Newsletter Signup"] {
            form.features.insert(f);
        }
        for variant in [PromptVariant::Structured, PromptVariant::Narrative] {
            let out = assemble(&form, variant);
            let mut last = 0;
            for name in ["Pricing", "Team", "Portfolio"] {
                assert_eq!(out.matches(name).count(), 1, "{name} in {variant:?}");
                let at = out.find(name).unwrap();
                assert!(at > last);
                last = at;
            }
            let mut last = 0;
            for name in ["Analytics", "Chat Support", "Newsletter Signup"] {
                assert_eq!(out.matches(name).count(), 1, "{name} in {variant:?}");
                let at = out.find(name).unwrap();
                assert!(at > last);
                last = at;
            }
        }
    }

    #[test]
    fn empty_pages_fall_back_to_default_list() {
        let mut form = nonnas();
        form.pages = Selection::new(Catalog::Pages);
        let narrative = assemble(&form, PromptVariant::Narrative);
        assert!(narrative.contains("Home, About, Contact"));
        let structured = assemble(&form, PromptVariant::Structured);
        assert!(structured.contains("Required Pages:\n- Home\n- About\n- Contact\n"));
    }

    #[test]
    fn blank_form_never_renders_empty_clauses() {
        let out = assemble(&FormData::default(), PromptVariant::Structured);
        assert!(out.contains("\"My Website\""));
        assert!(out.contains("- Contact Form"));
        assert!(out.contains("- None specified"));
        assert!(!out.contains(":\n\n"));
    }

    #[test]
    fn assembly_is_deterministic() {
        let form = nonnas();
        for variant in [PromptVariant::Structured, PromptVariant::Narrative] {
            assert_eq!(assemble(&form, variant), assemble(&form, variant));
        }
        assert_ne!(
            assemble(&form, PromptVariant::Structured),
            assemble(&form, PromptVariant::Narrative)
        );
    }

    #[test]
    fn loaded_text_records_its_file() {
        let p = GeneratedPrompt::from_text("Build a bakery site".into(), Path::new("drafts/bakery.txt"));
        assert_eq!(p.source, PromptSource::Text(PathBuf::from("drafts/bakery.txt")));
        assert_eq!(p.purpose(), None);
        let (_, outcome) = usage_instructions(&p);
        assert!(outcome.starts_with("This will create a professional website"));
    }

    #[test]
    fn usage_hint_mentions_purpose() {
        let p = GeneratedPrompt::from_form(&nonnas(), PromptVariant::Narrative);
        let (_, outcome) = usage_instructions(&p);
        assert!(outcome.contains("italian restaurant website"));
    }
}
