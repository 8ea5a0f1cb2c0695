use std::net::IpAddr;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attendance {
    Attending,
    Declining,
}

impl Attendance {
    /// Canonical form token, also the value stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attending => "yes",
            Self::Declining => "no",
        }
    }

    #[must_use]
    pub const fn is_attending(self) -> bool {
        matches!(self, Self::Attending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    En,
    Fr,
    Ro,
}

impl Locale {
    /// Parses a locale tag, falling back to English for anything unsupported.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "fr" => Self::Fr,
            "ro" => Self::Ro,
            _ => Self::En,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
            Self::Ro => "ro",
        }
    }
}

/// Accompanying guest details, present only when the companion flag was set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Companion {
    pub first_name: String,
    pub last_name: String,
    pub vegetarian: bool,
}

/// One validated RSVP attempt. Constructed only by the validator and never
/// mutated afterwards; corrections arrive as new submissions.
#[derive(Debug, Clone)]
pub struct Submission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub attendance: Attendance,
    pub vegetarian: bool,
    pub plus_one: Option<Companion>,
    pub message: Option<String>,
    pub locale: Locale,
    pub submitted_at: OffsetDateTime,
    pub origin: IpAddr,
    pub user_agent: Option<String>,
}

impl Submission {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
