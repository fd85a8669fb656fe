//! Gate, call, update, notify.
//!
//! Every AI action goes through the same sequence: claim the action's slot,
//! reserve quota on the server, call the proxy, and only then touch the
//! prompt workspace. Each action returns exactly one notification whatever
//! the outcome, and a failure leaves the workspace as it was.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use crate::errors::PromptError;
use crate::prompt::{guided_qa_text, GeneratedPrompt};
use crate::proxy::AiProxyClient;
use crate::usage::{Session, UsageGate};
use crate::ux::Notification;
use crate::wire::{BusinessSuggestions, ImprovementKind};
use crate::wizard::GuidedAnswers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ApplyMode {
    /// The enhanced text becomes the displayed prompt.
    Replace,
    /// The enhanced text is shown next to the unchanged original.
    Alongside,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enhancement {
    pub body: String,
    pub kind: ImprovementKind,
}

/// The prompt on screen. The original is never overwritten by an
/// enhancement; only a new generation replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptWorkspace {
    original: Option<GeneratedPrompt>,
    enhanced: Option<Enhancement>,
    showing_enhanced: bool,
}

impl PromptWorkspace {
    pub fn original(&self) -> Option<&GeneratedPrompt> {
        self.original.as_ref()
    }

    pub fn enhanced(&self) -> Option<&Enhancement> {
        self.enhanced.as_ref()
    }

    pub fn is_showing_enhanced(&self) -> bool {
        self.showing_enhanced && self.enhanced.is_some()
    }

    /// The text the user would copy right now.
    pub fn displayed(&self) -> Option<&str> {
        match (&self.enhanced, &self.original) {
            (Some(e), _) if self.showing_enhanced => Some(e.body.as_str()),
            (_, Some(o)) => Some(o.body.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSlot {
    Enhance,
    Analyze,
    Guided,
}

/// Outcome of one user action plus the single notification describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport<T> {
    pub notification: Notification,
    pub outcome: Result<T, PromptError>,
}

impl<T> ActionReport<T> {
    fn ok(value: T, notification: Notification) -> Self {
        Self { notification, outcome: Ok(value) }
    }

    fn failed(action: &str, e: PromptError) -> Self {
        warn!(action, error = %e, "AI action failed");
        Self { notification: e.notification(), outcome: Err(e) }
    }
}

struct SlotGuard<'a>(&'a AtomicBool);

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct EnhancementOrchestrator {
    gate: UsageGate,
    proxy: AiProxyClient,
    workspace: Mutex<PromptWorkspace>,
    slots: [AtomicBool; 3],
}

impl EnhancementOrchestrator {
    pub fn new(gate: UsageGate, proxy: AiProxyClient) -> Self {
        Self {
            gate,
            proxy,
            workspace: Mutex::new(PromptWorkspace::default()),
            slots: [AtomicBool::new(false), AtomicBool::new(false), AtomicBool::new(false)],
        }
    }

    pub fn gate(&self) -> &UsageGate {
        &self.gate
    }

    pub fn workspace(&self) -> PromptWorkspace {
        self.workspace.lock().clone()
    }

    #[cfg(test)]
    pub fn is_busy(&self, slot: ActionSlot) -> bool {
        self.slots[slot as usize].load(Ordering::Acquire)
    }

    /// Disables the slot until the guard drops, including when the
    /// caller abandons the future mid-request.
    fn claim(&self, slot: ActionSlot) -> Result<SlotGuard<'_>, PromptError> {
        let flag = &self.slots[slot as usize];
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| SlotGuard(flag))
            .map_err(|_| PromptError::Busy)
    }

    /// Start over with a freshly generated prompt.
    pub fn set_generated(&self, prompt: GeneratedPrompt) {
        let mut ws = self.workspace.lock();
        ws.original = Some(prompt);
        ws.enhanced = None;
        ws.showing_enhanced = false;
    }

    /// Make a kept enhancement the displayed prompt.
    pub fn use_enhanced(&self) -> Notification {
        let mut ws = self.workspace.lock();
        if ws.enhanced.is_none() {
            return Notification::info("Nothing to Replace", "Improve the prompt with AI first.");
        }
        ws.showing_enhanced = true;
        Notification::success(
            "Prompt Replaced!",
            "Original prompt has been replaced with the improved version.",
        )
    }

    /// Switch back to the original prompt; the enhancement stays available.
    pub fn use_original(&self) -> Notification {
        let mut ws = self.workspace.lock();
        ws.showing_enhanced = false;
        Notification::info("Original Restored", "You're viewing your original prompt again.")
    }

    pub async fn enhance(
        &self,
        session: &Session,
        kind: ImprovementKind,
        mode: ApplyMode,
    ) -> ActionReport<Enhancement> {
        let _slot = match self.claim(ActionSlot::Enhance) {
            Ok(g) => g,
            Err(e) => return ActionReport::failed("enhance", e),
        };
        let base = self.workspace.lock().displayed().map(str::to_string);
        let base = match base {
            Some(b) if !b.trim().is_empty() => b,
            _ => {
                return ActionReport::failed(
                    "enhance",
                    PromptError::MissingInput(
                        "Please generate a prompt first before trying to improve it.".into(),
                    ),
                )
            }
        };

        if let Err(d) = self.gate.check_and_reserve(session).await {
            return ActionReport::failed("enhance", d.into());
        }
        let body = match self.proxy.improve(&base, kind).await {
            Ok(b) => b,
            Err(e) => return ActionReport::failed("enhance", e),
        };

        let enhancement = Enhancement { body, kind };
        {
            let mut ws = self.workspace.lock();
            ws.enhanced = Some(enhancement.clone());
            ws.showing_enhanced = mode == ApplyMode::Replace;
        }
        info!(kind = %kind, ?mode, "prompt enhanced");
        let n = match mode {
            ApplyMode::Replace => Notification::success(
                "Prompt Improved!",
                "The enhanced prompt is now active. Your original is still available.",
            ),
            ApplyMode::Alongside => {
                Notification::success("Prompt Improved!", "Your prompt has been enhanced with AI.")
            }
        };
        ActionReport::ok(enhancement, n)
    }

    pub async fn analyze_business(
        &self,
        session: &Session,
        idea: &str,
    ) -> ActionReport<BusinessSuggestions> {
        let _slot = match self.claim(ActionSlot::Analyze) {
            Ok(g) => g,
            Err(e) => return ActionReport::failed("analyze", e),
        };
        if idea.trim().is_empty() {
            return ActionReport::failed(
                "analyze",
                PromptError::MissingInput("Enter at least one sentence about your business or idea.".into()),
            );
        }
        if let Err(d) = self.gate.check_and_reserve(session).await {
            return ActionReport::failed("analyze", d.into());
        }
        match self.proxy.analyze_business(idea).await {
            Ok(s) => ActionReport::ok(
                s,
                Notification::success(
                    "Analysis Complete!",
                    "We've generated suggestions based on your business idea.",
                ),
            ),
            Err(e @ PromptError::Validation(_)) => {
                warn!(error = %e, "analysis result failed validation");
                ActionReport {
                    notification: Notification::error(
                        "Analysis Failed",
                        "The AI suggestions were incomplete. Try the guided questions instead, \
                         or fill in the form step by step.",
                    ),
                    outcome: Err(e),
                }
            }
            Err(e) => ActionReport::failed("analyze", e),
        }
    }

    /// Synthesize a prompt from guided answers; on success it becomes the
    /// new original.
    pub async fn generate_guided(
        &self,
        session: &Session,
        answers: &GuidedAnswers,
    ) -> ActionReport<GeneratedPrompt> {
        let _slot = match self.claim(ActionSlot::Guided) {
            Ok(g) => g,
            Err(e) => return ActionReport::failed("guided", e),
        };
        if let Err(d) = self.gate.check_and_reserve(session).await {
            return ActionReport::failed("guided", d.into());
        }
        match self.proxy.synthesize_guided(&guided_qa_text(answers)).await {
            Ok(text) => {
                let prompt = GeneratedPrompt::from_guided(text, answers);
                self.set_generated(prompt.clone());
                ActionReport::ok(
                    prompt,
                    Notification::success(
                        "Prompt Generated!",
                        "Your personalized prompt has been created based on your answers.",
                    ),
                )
            }
            Err(e) => ActionReport {
                notification: Notification::error(
                    "Generation Failed",
                    "Unable to generate your prompt. Please try again.",
                ),
                outcome: Err(e),
            }
            .logged("guided"),
        }
    }
}

impl<T> ActionReport<T> {
    fn logged(self, action: &str) -> Self {
        if let Err(e) = &self.outcome {
            warn!(action, error = %e, "AI action failed");
        }
        self
    }
}
