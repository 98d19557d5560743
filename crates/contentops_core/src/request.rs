use serde_json::json;

use crate::JobPayload;

/// Parameters of a job the user can trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRequest {
    GeneratePost {
        headline: String,
        source_url: Option<String>,
    },
    GenerateBlog {
        topic: String,
        keywords: Vec<String>,
    },
}

impl JobRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GeneratePost { .. } => "post",
            Self::GenerateBlog { .. } => "blog",
        }
    }

    /// Body sent to the enqueue endpoint.
    pub fn params(&self) -> serde_json::Value {
        match self {
            Self::GeneratePost {
                headline,
                source_url,
            } => json!({ "headline": headline, "source_url": source_url }),
            Self::GenerateBlog { topic, keywords } => {
                json!({ "topic": topic, "keywords": keywords })
            }
        }
    }

    /// What the optimistic row shows until the server reports the job.
    pub fn display_payload(&self) -> JobPayload {
        JobPayload::from_json(self.kind(), self.params())
    }
}
