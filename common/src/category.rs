use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Kind of service being requested. Closed set; the form offers exactly these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceCategory {
    HomeRepair,
    Cleaning,
    Plumbing,
    Electrical,
    Landscaping,
    Moving,
    Tutoring,
    Other,
}

impl ServiceCategory {
    pub fn all() -> &'static [ServiceCategory] {
        &[
            ServiceCategory::HomeRepair,
            ServiceCategory::Cleaning,
            ServiceCategory::Plumbing,
            ServiceCategory::Electrical,
            ServiceCategory::Landscaping,
            ServiceCategory::Moving,
            ServiceCategory::Tutoring,
            ServiceCategory::Other,
        ]
    }

    /// Form value / wire slug, e.g. `home-repair`.
    pub fn slug(self) -> &'static str {
        match self {
            ServiceCategory::HomeRepair => "home-repair",
            ServiceCategory::Cleaning => "cleaning",
            ServiceCategory::Plumbing => "plumbing",
            ServiceCategory::Electrical => "electrical",
            ServiceCategory::Landscaping => "landscaping",
            ServiceCategory::Moving => "moving",
            ServiceCategory::Tutoring => "tutoring",
            ServiceCategory::Other => "other",
        }
    }

    /// Title-cased label for display: `home-repair` becomes `Home Repair`.
    pub fn label(self) -> String {
        self.slug()
            .split('-')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ServiceCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        ServiceCategory::all()
            .iter()
            .copied()
            .find(|c| c.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

/// Filter applied when listing requests. `All` matches every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(ServiceCategory),
}

impl CategoryFilter {
    pub fn matches(&self, category: ServiceCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

impl From<Option<ServiceCategory>> for CategoryFilter {
    fn from(category: Option<ServiceCategory>) -> Self {
        category.map_or(CategoryFilter::All, CategoryFilter::Only)
    }
}

impl FromStr for CategoryFilter {
    type Err = ValidationError;

    /// `"all"` or an empty selection means no filtering.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}
