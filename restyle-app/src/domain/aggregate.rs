use super::VoteType;
use serde::{Deserialize, Serialize};

/// Running thumbs-up / thumbs-down tally for one filter.
///
/// `total_votes` always equals `thumbs_up + thumbs_down`; the constructors
/// and mutators below are the only way the counters change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleVoteAggregate {
    pub filter_name: String,
    pub thumbs_up: u32,
    pub thumbs_down: u32,
    pub total_votes: u32,
    pub last_modified: chrono::DateTime<chrono::Utc>,
}

impl StyleVoteAggregate {
    pub fn empty(filter_name: impl Into<String>) -> Self {
        Self {
            filter_name: filter_name.into(),
            thumbs_up: 0,
            thumbs_down: 0,
            total_votes: 0,
            last_modified: chrono::Utc::now(),
        }
    }

    pub fn with_counts(filter_name: impl Into<String>, thumbs_up: u32, thumbs_down: u32) -> Self {
        Self {
            thumbs_up,
            thumbs_down,
            total_votes: thumbs_up.saturating_add(thumbs_down),
            ..Self::empty(filter_name)
        }
    }

    pub fn record(&mut self, vote_type: VoteType) {
        match vote_type {
            VoteType::Up => self.thumbs_up += 1,
            VoteType::Down => self.thumbs_down += 1,
        }
        self.total_votes += 1;
        self.last_modified = chrono::Utc::now();
    }

    pub fn reset(&mut self) {
        self.thumbs_up = 0;
        self.thumbs_down = 0;
        self.total_votes = 0;
        self.last_modified = chrono::Utc::now();
    }

    pub fn negative_ratio(&self) -> f64 {
        if self.total_votes == 0 {
            return 0.0;
        }
        f64::from(self.thumbs_down) / f64::from(self.total_votes)
    }
}
