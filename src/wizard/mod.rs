use serde::{Deserialize, Serialize};

/// Number of screens in the form wizard.
pub const FORM_STEPS: usize = 6;

/// Result of pressing "Next".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced(usize),
    /// Already on the last step: the caller should generate.
    Generate,
    /// The current step has not been answered.
    Blocked,
}

/// Linear step machine over `1..=total`. Steps move by one and never leave
/// the range; pressing next on the last step asks for generation instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardController {
    step: usize,
    total: usize,
}

impl WizardController {
    pub fn new(total: usize) -> Self {
        Self { step: 1, total: total.max(1) }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn next(&mut self) -> StepOutcome {
        if self.step < self.total {
            self.step += 1;
            StepOutcome::Advanced(self.step)
        } else {
            StepOutcome::Generate
        }
    }

    pub fn prev(&mut self) -> usize {
        if self.step > 1 {
            self.step -= 1;
        }
        self.step
    }

    pub fn progress_percent(&self) -> u32 {
        ((self.step as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// What the form wizard lets the user edit on a given step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStep {
    NameAndPurpose,
    Audience,
    Features,
    DesignStyle,
    Pages,
    AdditionalInfo,
}

impl FormStep {
    pub fn at(step: usize) -> Option<Self> {
        match step {
            1 => Some(FormStep::NameAndPurpose),
            2 => Some(FormStep::Audience),
            3 => Some(FormStep::Features),
            4 => Some(FormStep::DesignStyle),
            5 => Some(FormStep::Pages),
            6 => Some(FormStep::AdditionalInfo),
            _ => None,
        }
    }
}

/// Answers collected by the guided question flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidedAnswers {
    pub what_you_sell: String,
    pub target_audience: String,
    pub desired_action: String,
    pub brand_personality: String,
    pub additional_info: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Question {
    pub title: &'static str,
    pub placeholder: &'static str,
    pub multiline: bool,
}

pub static GUIDED_QUESTIONS: [Question; 5] = [
    Question {
        title: "What do you sell or offer?",
        placeholder: "e.g., Handmade soaps, Web design services, Online courses",
        multiline: false,
    },
    Question {
        title: "Who is your ideal customer?",
        placeholder: "e.g., Eco-conscious millennials, Small business owners, College students",
        multiline: false,
    },
    Question {
        title: "What do you want visitors to do on your website?",
        placeholder: "e.g., Buy products, Contact me for services, Sign up for newsletter",
        multiline: false,
    },
    Question {
        title: "How would you describe your brand personality?",
        placeholder: "e.g., Fun and playful, Professional and trustworthy, Creative and artistic",
        multiline: false,
    },
    Question {
        title: "Any specific requirements or features you need?",
        placeholder: "e.g., Online booking, Image gallery, Blog section, customer reviews",
        multiline: true,
    },
];

/// The question/answer alternative to the form. A step can only be left
/// forward once its answer is non-blank.
#[derive(Debug, Clone)]
pub struct GuidedWizard {
    steps: WizardController,
    answers: GuidedAnswers,
}

impl Default for GuidedWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl GuidedWizard {
    pub fn new() -> Self {
        Self {
            steps: WizardController::new(GUIDED_QUESTIONS.len()),
            answers: GuidedAnswers::default(),
        }
    }

    pub fn step(&self) -> usize {
        self.steps.step()
    }

    pub fn total(&self) -> usize {
        self.steps.total()
    }

    pub fn progress_percent(&self) -> u32 {
        self.steps.progress_percent()
    }

    pub fn question(&self) -> &'static Question {
        &GUIDED_QUESTIONS[self.steps.step() - 1]
    }

    fn slot(&mut self) -> &mut String {
        match self.steps.step() {
            1 => &mut self.answers.what_you_sell,
            2 => &mut self.answers.target_audience,
            3 => &mut self.answers.desired_action,
            4 => &mut self.answers.brand_personality,
            _ => &mut self.answers.additional_info,
        }
    }

    pub fn answer(&mut self, value: impl Into<String>) {
        *self.slot() = value.into();
    }

    pub fn can_proceed(&mut self) -> bool {
        !self.slot().trim().is_empty()
    }

    pub fn next(&mut self) -> StepOutcome {
        if !self.can_proceed() {
            return StepOutcome::Blocked;
        }
        self.steps.next()
    }

    pub fn prev(&mut self) -> usize {
        self.steps.prev()
    }

    pub fn answers(&self) -> &GuidedAnswers {
        &self.answers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_reaches_last_step_then_requests_generation() {
        let mut w = WizardController::new(FORM_STEPS);
        for expected in 2..=FORM_STEPS {
            assert_eq!(w.next(), StepOutcome::Advanced(expected));
        }
        assert_eq!(w.step(), FORM_STEPS);
        assert_eq!(w.next(), StepOutcome::Generate);
        assert_eq!(w.step(), FORM_STEPS);
    }

    #[test]
    fn prev_is_clamped_at_first_step() {
        let mut w = WizardController::new(FORM_STEPS);
        assert_eq!(w.prev(), 1);
        w.next();
        w.next();
        assert_eq!(w.prev(), 2);
        assert_eq!(w.prev(), 1);
        assert_eq!(w.prev(), 1);
    }

    #[test]
    fn progress_rounds_like_the_progress_bar() {
        let mut w = WizardController::new(6);
        assert_eq!(w.progress_percent(), 17);
        w.next();
        w.next();
        assert_eq!(w.progress_percent(), 50);
    }

    #[test]
    fn form_steps_cover_every_screen() {
        assert!((1..=FORM_STEPS).all(|s| FormStep::at(s).is_some()));
        assert_eq!(FormStep::at(FORM_STEPS + 1), None);
    }

    #[test]
    fn guided_wizard_blocks_on_blank_answers() {
        let mut g = GuidedWizard::new();
        assert_eq!(g.progress_percent(), 20);
        assert_eq!(g.next(), StepOutcome::Blocked);
        g.answer("   ");
        assert_eq!(g.next(), StepOutcome::Blocked);
        g.answer("Handmade soaps");
        assert_eq!(g.next(), StepOutcome::Advanced(2));
        assert_eq!(g.question().title, "Who is your ideal customer?");
        assert_eq!(g.progress_percent(), 40);

        for a in ["Eco-conscious millennials", "Buy products", "Fun and playful"] {
            g.answer(a);
            g.next();
        }
        assert_eq!(g.step(), 5);
        assert_eq!(g.progress_percent(), 100);
        g.answer("Online booking");
        assert_eq!(g.next(), StepOutcome::Generate);
        assert_eq!(g.answers().what_you_sell, "Handmade soaps");
        assert_eq!(g.answers().additional_info, "Online booking");
    }
}
