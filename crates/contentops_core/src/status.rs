use std::borrow::Cow;
use std::fmt;

/// Lifecycle status of a background job as reported by the server.
///
/// Unknown strings are kept verbatim in [`JobStatus::Other`] so that stages
/// added server-side still display instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Queued,
    Processing,
    FetchingSources,
    GeneratingCaption,
    GeneratingVisualPlan,
    GeneratingImage,
    GeneratingContent,
    QualityCheckCaption,
    QualityCheckVisual,
    Ready,
    Failed,
    Other(String),
}

/// Coarse presentation class used for styling rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Pending,
    Working,
    Succeeded,
    Failed,
}

impl JobStatus {
    /// Classifies a raw server status. Never fails.
    pub fn classify(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "queued" => Self::Queued,
            "processing" => Self::Processing,
            "fetching_sources" => Self::FetchingSources,
            "generating_caption" => Self::GeneratingCaption,
            "generating_visual_plan" => Self::GeneratingVisualPlan,
            "generating_image" => Self::GeneratingImage,
            "generating_content" => Self::GeneratingContent,
            "quality_check_caption" => Self::QualityCheckCaption,
            "quality_check_visual" => Self::QualityCheckVisual,
            "ready" => Self::Ready,
            "failed" => Self::Failed,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    /// Wire form of the status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::FetchingSources => "fetching_sources",
            Self::GeneratingCaption => "generating_caption",
            Self::GeneratingVisualPlan => "generating_visual_plan",
            Self::GeneratingImage => "generating_image",
            Self::GeneratingContent => "generating_content",
            Self::QualityCheckCaption => "quality_check_caption",
            Self::QualityCheckVisual => "quality_check_visual",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::Other(raw) => raw,
        }
    }

    /// Human readable label for the status column.
    pub fn label(&self) -> Cow<'_, str> {
        let label = match self {
            Self::Queued => "Queued",
            Self::Processing => "Processing",
            Self::FetchingSources => "Fetching sources",
            Self::GeneratingCaption => "Generating caption",
            Self::GeneratingVisualPlan => "Planning visual",
            Self::GeneratingImage => "Generating image",
            Self::GeneratingContent => "Generating content",
            Self::QualityCheckCaption => "Checking caption",
            Self::QualityCheckVisual => "Checking visual",
            Self::Ready => "Ready",
            Self::Failed => "Failed",
            Self::Other(raw) => return Cow::Owned(raw.replace('_', " ")),
        };
        Cow::Borrowed(label)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }

    /// True while the job still needs polling; drives the badge and cadence.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn class(&self) -> StatusClass {
        match self {
            Self::Queued => StatusClass::Pending,
            Self::Ready => StatusClass::Succeeded,
            Self::Failed => StatusClass::Failed,
            _ => StatusClass::Working,
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// Terminal states are absorbing and nothing returns to `queued` once it
    /// has started. Unknown labels are allowed anywhere.
    pub fn can_transition(&self, next: &JobStatus) -> bool {
        if self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        !(matches!(next, Self::Queued) && !matches!(self, Self::Other(_)))
    }
}

impl From<&str> for JobStatus {
    fn from(raw: &str) -> Self {
        Self::classify(raw)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_stages_round_trip_through_wire_form() {
        for raw in [
            "queued",
            "processing",
            "fetching_sources",
            "generating_caption",
            "generating_visual_plan",
            "generating_image",
            "generating_content",
            "quality_check_caption",
            "quality_check_visual",
            "ready",
            "failed",
        ] {
            let status = JobStatus::classify(raw);
            assert!(!matches!(status, JobStatus::Other(_)), "{raw}");
            assert_eq!(status.as_str(), raw);
        }
    }

    #[test]
    fn classification_ignores_case_and_whitespace() {
        assert_eq!(JobStatus::classify("  READY "), JobStatus::Ready);
        assert_eq!(JobStatus::from("Generating_Image"), JobStatus::GeneratingImage);
    }

    #[test]
    fn unknown_status_passes_through() {
        let status = JobStatus::classify("translating_caption");
        assert_eq!(status, JobStatus::Other("translating_caption".to_string()));
        assert_eq!(status.label(), "translating caption");
        assert!(status.is_active());
        assert_eq!(status.class(), StatusClass::Working);
    }

    #[test]
    fn only_ready_and_failed_are_terminal() {
        assert!(!JobStatus::Ready.is_active());
        assert!(!JobStatus::Failed.is_active());
        assert!(JobStatus::Queued.is_active());
        assert!(JobStatus::QualityCheckVisual.is_active());
    }

    #[test]
    fn terminal_states_are_absorbing() {
        assert!(!JobStatus::Ready.can_transition(&JobStatus::Processing));
        assert!(!JobStatus::Failed.can_transition(&JobStatus::Ready));
        assert!(JobStatus::Ready.can_transition(&JobStatus::Ready));
        assert!(JobStatus::Queued.can_transition(&JobStatus::GeneratingCaption));
        assert!(JobStatus::GeneratingImage.can_transition(&JobStatus::GeneratingCaption));
        assert!(!JobStatus::Processing.can_transition(&JobStatus::Queued));
    }
}
