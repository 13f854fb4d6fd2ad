use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminator between the two parallel event taxonomies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Disrespect,
    Win,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Disrespect => "disrespect",
            EventKind::Win => "win",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "disrespect" => Some(EventKind::Disrespect),
            "win" => Some(EventKind::Win),
            _ => None,
        }
    }

    /// The fixed category set for this kind.
    pub fn categories(self) -> &'static [Category] {
        match self {
            EventKind::Disrespect => &[
                Category::CreditTheft,
                Category::ThrownUnderBus,
                Category::Ghosted,
                Category::GeneralClowning,
            ],
            EventKind::Win => &[
                Category::ClutchMoment,
                Category::HadYourBack,
                Category::RealTalk,
                Category::GoatBehavior,
            ],
        }
    }
}

/// One enum for both taxonomies; `kind()` tells them apart. Category sets
/// are fixed, not configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    // disrespect
    CreditTheft,
    ThrownUnderBus,
    Ghosted,
    GeneralClowning,
    // win
    ClutchMoment,
    HadYourBack,
    RealTalk,
    GoatBehavior,
}

impl Category {
    pub fn kind(self) -> EventKind {
        match self {
            Category::CreditTheft
            | Category::ThrownUnderBus
            | Category::Ghosted
            | Category::GeneralClowning => EventKind::Disrespect,
            Category::ClutchMoment
            | Category::HadYourBack
            | Category::RealTalk
            | Category::GoatBehavior => EventKind::Win,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::CreditTheft => "credit_theft",
            Category::ThrownUnderBus => "thrown_under_bus",
            Category::Ghosted => "ghosted",
            Category::GeneralClowning => "general_clowning",
            Category::ClutchMoment => "clutch_moment",
            Category::HadYourBack => "had_your_back",
            Category::RealTalk => "real_talk",
            Category::GoatBehavior => "goat_behavior",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "credit_theft" => Some(Category::CreditTheft),
            "thrown_under_bus" => Some(Category::ThrownUnderBus),
            "ghosted" => Some(Category::Ghosted),
            "general_clowning" => Some(Category::GeneralClowning),
            "clutch_moment" => Some(Category::ClutchMoment),
            "had_your_back" => Some(Category::HadYourBack),
            "real_talk" => Some(Category::RealTalk),
            "goat_behavior" => Some(Category::GoatBehavior),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::CreditTheft => "Credit Theft",
            Category::ThrownUnderBus => "Thrown Under Bus",
            Category::Ghosted => "Ghosted",
            Category::GeneralClowning => "General Clowning",
            Category::ClutchMoment => "Clutch Moment",
            Category::HadYourBack => "Had Your Back",
            Category::RealTalk => "Real Talk",
            Category::GoatBehavior => "GOAT Behavior",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Category::CreditTheft => "\u{1F3F4}\u{200D}\u{2620}\u{FE0F}",
            Category::ThrownUnderBus => "\u{1F68C}",
            Category::Ghosted => "\u{1F47B}",
            Category::GeneralClowning => "\u{1F921}",
            Category::ClutchMoment => "\u{1F525}",
            Category::HadYourBack => "\u{1F6E1}\u{FE0F}",
            Category::RealTalk => "\u{1F4AC}",
            Category::GoatBehavior => "\u{1F410}",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
}

impl FriendshipStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(FriendshipStatus::Pending),
            "accepted" => Some(FriendshipStatus::Accepted),
            _ => None,
        }
    }
}

/// A logged event. `week_start` is derived from `created_at` on the server
/// and is never client-writable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: EventKind,
    pub category: Category,
    pub note: Option<String>,
    pub is_shared: bool,
    pub week_start: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub name: String,
}
