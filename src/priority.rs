use serde::Serialize;
use std::fmt;

/// Lead priority tier, ordered from least to most engaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    New,
    Cold,
    Warm,
    Hot,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::New => "NEW",
            Priority::Cold => "COLD",
            Priority::Warm => "WARM",
            Priority::Hot => "HOT",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify_priority(score: u8) -> Priority {
    match score {
        70.. => Priority::Hot,
        40..=69 => Priority::Warm,
        20..=39 => Priority::Cold,
        _ => Priority::New,
    }
}
