//! Feedback section
//!
//! The section title rises in once when it reaches the bottom tenth of the
//! viewport. Below it, the testimonial feed lists what the provider returns
//! (newest first) and the form collects a new testimonial. Provider
//! failures never vanish: they end up as a status with a user-visible
//! message.

use chrono::{DateTime, Utc};
use reel_animation::{Keyframe, ScopeHandle, Timeline, TimelineHandle, ViewportTrigger};
use reel_core::{ElementId, Property, Rect, Stage, Viewport};
use tracing::{debug, warn};

use crate::config::RevealConfig;
use crate::error::{ProviderError, Result};
use crate::providers::{Testimonial, TestimonialDraft, TestimonialsProvider};

pub const MISSING_FIELDS_MESSAGE: &str = "Preencha todos os campos";
pub const RATING_RANGE_MESSAGE: &str = "Escolha uma avaliação de 1 a 5 estrelas";
pub const SUBMIT_SUCCESS_MESSAGE: &str = "Feedback enviado com sucesso!";
pub const SUBMIT_ERROR_MESSAGE: &str = "Erro ao enviar feedback.";
pub const LOAD_ERROR_MESSAGE: &str = "Erro ao buscar feedbacks.";

pub const MAX_RATING: u8 = 5;

// =============================================================================
// Elements and reveal
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeedbackElements {
    pub section: ElementId,
    pub title: ElementId,
    pub list: ElementId,
}

impl FeedbackElements {
    pub fn insert(stage: &mut Stage) -> Self {
        Self {
            section: stage.insert("feedback", Rect::ZERO),
            title: stage.insert("feedback.title", Rect::ZERO),
            list: stage.insert("feedback.list", Rect::ZERO),
        }
    }

    pub fn arrange(&self, stage: &mut Stage, top: f32, viewport: &Viewport) -> f32 {
        let (vw, vh) = (viewport.width, viewport.height);
        let height = vh * 1.5;
        stage.set_bounds(self.section, Rect::new(0.0, top, vw, height));
        stage.set_bounds(self.title, Rect::new(vw * 0.08, top + vh * 0.2, vw * 0.4, vh * 0.2));
        stage.set_bounds(self.list, Rect::new(vw * 0.52, top + vh * 0.2, vw * 0.4, vh * 1.1));
        height
    }
}

/// Schedule the title reveal: from 50 px below and transparent, once
pub fn mount_title_reveal(
    scope: &ScopeHandle,
    elements: &FeedbackElements,
    config: &RevealConfig,
) -> Result<TimelineHandle> {
    let handle = scope.schedule(
        Timeline::new()
            .label("feedback.title")
            .add(
                Keyframe::from(config.feedback_duration)
                    .set(elements.title, Property::TranslateY, 50.0)
                    .set(elements.title, Property::Opacity, 0.0)
                    .easing(config.feedback_easing),
            )
            .triggered_by(ViewportTrigger::new(elements.title).start_at(config.feedback_start)),
    )?;
    Ok(handle)
}

// =============================================================================
// Testimonial feed
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum FeedStatus {
    Loading,
    Loaded(Vec<Testimonial>),
    Failed(String),
}

/// The testimonial list as last fetched
#[derive(Debug)]
pub struct TestimonialFeed {
    status: FeedStatus,
}

impl Default for TestimonialFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl TestimonialFeed {
    pub fn new() -> Self {
        Self {
            status: FeedStatus::Loading,
        }
    }

    /// Fetch the list; keeps provider order
    pub fn refresh(&mut self, provider: &dyn TestimonialsProvider) -> &FeedStatus {
        self.status = match provider.list_testimonials() {
            Ok(list) => {
                debug!("TestimonialFeed: loaded {} testimonials", list.len());
                FeedStatus::Loaded(list)
            }
            Err(err) => {
                warn!("TestimonialFeed: could not load testimonials: {}", err);
                FeedStatus::Failed(LOAD_ERROR_MESSAGE.to_string())
            }
        };
        &self.status
    }

    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == FeedStatus::Loading
    }

    /// Loaded testimonials; empty while loading or after a failure
    pub fn items(&self) -> &[Testimonial] {
        match &self.status {
            FeedStatus::Loaded(list) => list,
            _ => &[],
        }
    }
}

/// Filled stars to draw for a stored rating
pub fn star_count(rating: u8) -> usize {
    rating.min(MAX_RATING) as usize
}

/// `dd/mm/yyyy`, as the feed shows creation dates
pub fn date_label(created_at: &DateTime<Utc>) -> String {
    created_at.format("%d/%m/%Y").to_string()
}

// =============================================================================
// Form
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftError {
    MissingFields,
    RatingOutOfRange(u8),
}

impl DraftError {
    pub fn message(&self) -> &'static str {
        match self {
            DraftError::MissingFields => MISSING_FIELDS_MESSAGE,
            DraftError::RatingOutOfRange(_) => RATING_RANGE_MESSAGE,
        }
    }
}

/// Check that every field is filled and the rating is 1 to 5
pub fn validate_draft(draft: &TestimonialDraft) -> std::result::Result<(), DraftError> {
    let blank = |s: &str| s.trim().is_empty();
    if blank(&draft.name) || blank(&draft.email) || blank(&draft.message) || draft.rating == 0 {
        return Err(DraftError::MissingFields);
    }
    if draft.rating > MAX_RATING {
        return Err(DraftError::RatingOutOfRange(draft.rating));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Submitting,
    Success(String),
    Error(String),
}

impl SubmitStatus {
    /// Message to show under the form
    pub fn message(&self) -> Option<&str> {
        match self {
            SubmitStatus::Success(message) | SubmitStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// The new-testimonial form
///
/// Submission is split in two so asynchronous hosts can show the
/// in-flight state: [`FeedbackForm::begin_submit`] validates and hands out
/// the draft, [`FeedbackForm::finish_submit`] records the outcome.
#[derive(Debug, Default)]
pub struct FeedbackForm {
    draft: TestimonialDraft,
    status: SubmitStatus,
}

impl FeedbackForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &TestimonialDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut TestimonialDraft {
        &mut self.draft
    }

    pub fn set_rating(&mut self, rating: u8) {
        self.draft.rating = rating;
    }

    pub fn status(&self) -> &SubmitStatus {
        &self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.status == SubmitStatus::Submitting
    }

    pub fn button_label(&self) -> &'static str {
        if self.is_submitting() {
            "ENVIANDO..."
        } else {
            "ENVIAR FEEDBACK"
        }
    }

    /// Validate and mark in flight; `None` if invalid or already submitting
    pub fn begin_submit(&mut self) -> Option<TestimonialDraft> {
        if self.is_submitting() {
            return None;
        }
        if let Err(err) = validate_draft(&self.draft) {
            debug!("FeedbackForm: rejected draft ({:?})", err);
            self.status = SubmitStatus::Error(err.message().to_string());
            return None;
        }
        self.status = SubmitStatus::Submitting;
        Some(self.draft.clone())
    }

    /// Record the provider's answer; returns true on success
    ///
    /// A successful submit clears the form.
    pub fn finish_submit(&mut self, outcome: std::result::Result<(), ProviderError>) -> bool {
        match outcome {
            Ok(()) => {
                self.status = SubmitStatus::Success(SUBMIT_SUCCESS_MESSAGE.to_string());
                self.draft = TestimonialDraft::default();
                true
            }
            Err(err) => {
                warn!("FeedbackForm: submit failed: {}", err);
                self.status = SubmitStatus::Error(SUBMIT_ERROR_MESSAGE.to_string());
                false
            }
        }
    }

    /// Submit synchronously and refresh `feed` on success
    pub fn submit(
        &mut self,
        provider: &dyn TestimonialsProvider,
        feed: &mut TestimonialFeed,
    ) -> &SubmitStatus {
        if let Some(draft) = self.begin_submit() {
            if self.finish_submit(provider.submit_testimonial(&draft)) {
                feed.refresh(provider);
            }
        }
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::JsonTestimonials;

    fn filled() -> TestimonialDraft {
        TestimonialDraft {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            rating: 5,
            message: "Excelente trabalho".into(),
        }
    }

    fn provider() -> JsonTestimonials {
        JsonTestimonials::from_json_str(
            r#"[{"id": 1, "name": "Caio", "rating": 4, "message": "Bom",
                 "created_at": "2024-03-10T12:00:00Z"}]"#,
        )
        .unwrap()
        .with_clock(|| "2024-04-01T09:30:00Z".parse().unwrap())
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(validate_draft(&filled()), Ok(()));

        let mut draft = filled();
        draft.email = "   ".into();
        assert_eq!(validate_draft(&draft), Err(DraftError::MissingFields));

        let mut draft = filled();
        draft.rating = 0;
        assert_eq!(
            validate_draft(&draft).unwrap_err().message(),
            "Preencha todos os campos"
        );

        let mut draft = filled();
        draft.rating = 6;
        assert_eq!(validate_draft(&draft), Err(DraftError::RatingOutOfRange(6)));
    }

    #[test]
    fn test_invalid_submit_reports_and_keeps_draft() {
        let provider = provider();
        let mut feed = TestimonialFeed::new();
        let mut form = FeedbackForm::new();
        form.draft_mut().name = "Ana".into();

        let status = form.submit(&provider, &mut feed).clone();
        assert_eq!(status, SubmitStatus::Error(MISSING_FIELDS_MESSAGE.into()));
        assert_eq!(form.draft().name, "Ana");
        assert_eq!(provider.len(), 1);
        assert!(feed.is_loading());
    }

    #[test]
    fn test_successful_submit_resets_and_refreshes() {
        let provider = provider();
        let mut feed = TestimonialFeed::new();
        feed.refresh(&provider);
        let mut form = FeedbackForm::new();
        *form.draft_mut() = filled();

        let status = form.submit(&provider, &mut feed).clone();
        assert_eq!(status, SubmitStatus::Success(SUBMIT_SUCCESS_MESSAGE.into()));
        assert_eq!(status.message(), Some("Feedback enviado com sucesso!"));
        assert_eq!(form.draft(), &TestimonialDraft::default());
        assert_eq!(feed.items().len(), 2);
        assert_eq!(feed.items()[0].name, "Ana");
    }

    #[test]
    fn test_provider_failure_becomes_status() {
        let offline = JsonTestimonials::new(Vec::new()).offline();
        let mut feed = TestimonialFeed::new();
        assert_eq!(
            feed.refresh(&offline),
            &FeedStatus::Failed(LOAD_ERROR_MESSAGE.into())
        );
        assert!(feed.items().is_empty());

        let mut form = FeedbackForm::new();
        *form.draft_mut() = filled();
        form.submit(&offline, &mut feed);
        assert_eq!(form.status().message(), Some("Erro ao enviar feedback."));
        // Nothing typed is lost on failure
        assert_eq!(form.draft(), &filled());
    }

    #[test]
    fn test_in_flight_state() {
        let mut form = FeedbackForm::new();
        *form.draft_mut() = filled();
        assert_eq!(form.button_label(), "ENVIAR FEEDBACK");

        let draft = form.begin_submit().unwrap();
        assert_eq!(draft, filled());
        assert!(form.is_submitting());
        assert_eq!(form.button_label(), "ENVIANDO...");
        assert!(form.begin_submit().is_none());

        assert!(!form.finish_submit(Err(ProviderError::Unavailable("down".into()))));
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_display_helpers() {
        let created: DateTime<Utc> = "2024-03-10T12:00:00Z".parse().unwrap();
        assert_eq!(date_label(&created), "10/03/2024");
        let late_east: DateTime<Utc> = "2024-03-11T01:00:00+03:00".parse().unwrap();
        assert_eq!(date_label(&late_east), "10/03/2024");
        assert_eq!(star_count(4), 4);
        assert_eq!(star_count(9), 5);
    }
}
