//! Project categorization for the portfolio index
//!
//! Heuristic keyword classification. Exact slug overrides are checked first,
//! then an ordered rule table; the first matching rule decides. Keyword sets
//! overlap between rules, so table order is part of the behavior.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::project::Project;

/// Index grouping for a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Network automation and simulation
    Network,
    /// Signal processing, SDR and sensing hardware
    Signal,
    Astrophotography,
    Photography,
    /// AI and multi-agent systems
    Agents,
    /// Data tools and utilities
    Data,
    /// Wellness and sound
    Wellness,
    /// Catch-all when no rule matches
    Other,
}

impl Category {
    /// Every category in index display order.
    pub const DISPLAY_ORDER: [Category; 8] = [
        Self::Network,
        Self::Signal,
        Self::Astrophotography,
        Self::Photography,
        Self::Agents,
        Self::Data,
        Self::Wellness,
        Self::Other,
    ];

    /// Lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Signal => "signal",
            Self::Astrophotography => "astrophotography",
            Self::Photography => "photography",
            Self::Agents => "agents",
            Self::Data => "data",
            Self::Wellness => "wellness",
            Self::Other => "other",
        }
    }

    /// Heading used on the index page
    pub fn title(&self) -> &'static str {
        match self {
            Self::Network => "Network Engineering",
            Self::Signal => "Signal Processing & SDR",
            Self::Astrophotography => "Astrophotography",
            Self::Photography => "Photography",
            Self::Agents => "AI & Agents",
            Self::Data => "Data & Utilities",
            Self::Wellness => "Wellness & Sound",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::DISPLAY_ORDER
            .into_iter()
            .find(|category| category.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown category: {s}"))
    }
}

/// Which input a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleField {
    /// Lowercased project name
    Name,
    /// Project slug
    Slug,
    /// Lowercased text of every section
    Sections,
}

/// A keyword membership test that assigns a category.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub field: RuleField,
    pub keywords: &'static [&'static str],
    pub category: Category,
}

impl CategoryRule {
    const fn new(
        field: RuleField,
        keywords: &'static [&'static str],
        category: Category,
    ) -> Self {
        Self {
            field,
            keywords,
            category,
        }
    }

    /// First keyword found in the inspected input.
    fn matched_keyword(&self, input: &RuleInput<'_>) -> Option<&'static str> {
        let haystack = match self.field {
            RuleField::Name => input.name,
            RuleField::Slug => input.slug,
            RuleField::Sections => input.sections,
        };
        self.keywords
            .iter()
            .copied()
            .find(|keyword| haystack.contains(keyword))
    }
}

/// Slugs pinned to a category regardless of keywords.
pub const DEFAULT_OVERRIDES: &[(&str, Category)] = &[("healthypi", Category::Signal)];

/// Keyword rules in evaluation order.
pub const DEFAULT_RULES: &[CategoryRule] = &[
    CategoryRule::new(
        RuleField::Name,
        &["netvis", "ank", "topogen", "netsim", "autonetkit", "network"],
        Category::Network,
    ),
    CategoryRule::new(
        RuleField::Name,
        &["healthypi", "spectra", "passive", "radar", "kraken"],
        Category::Signal,
    ),
    CategoryRule::new(
        RuleField::Name,
        &["astro", "asiair"],
        Category::Astrophotography,
    ),
    CategoryRule::new(RuleField::Sections, &["astro"], Category::Astrophotography),
    CategoryRule::new(
        RuleField::Name,
        &["photo-tour", "photo tour"],
        Category::Photography,
    ),
    CategoryRule::new(
        RuleField::Name,
        &["agent", "multi-agent", "cycle"],
        Category::Agents,
    ),
    CategoryRule::new(
        RuleField::Name,
        &["cleanup", "tileserver", "tile"],
        Category::Data,
    ),
    CategoryRule::new(
        RuleField::Name,
        &["watch", "noise", "wave", "sleep", "health"],
        Category::Wellness,
    ),
];

/// Why a category was chosen (for debugging/audit)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchReason {
    /// The slug is in the override table
    Override,
    /// Rule at this index matched on this keyword
    Rule { index: usize, keyword: &'static str },
    /// Nothing matched
    CatchAll,
}

/// Result of categorization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMatch {
    pub category: Category,
    pub reason: MatchReason,
}

struct RuleInput<'a> {
    name: &'a str,
    slug: &'a str,
    sections: &'a str,
}

/// Override table plus ordered rule list.
#[derive(Debug, Clone)]
pub struct Categorizer {
    overrides: BTreeMap<String, Category>,
    rules: Vec<CategoryRule>,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self {
            overrides: DEFAULT_OVERRIDES
                .iter()
                .map(|(slug, category)| (slug.to_string(), *category))
                .collect(),
            rules: DEFAULT_RULES.to_vec(),
        }
    }
}

impl Categorizer {
    /// Built-in tables with additional slug overrides taking precedence.
    pub fn with_overrides(extra: &BTreeMap<String, Category>) -> Self {
        let mut categorizer = Self::default();
        categorizer
            .overrides
            .extend(extra.iter().map(|(slug, category)| (slug.clone(), *category)));
        categorizer
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Categorize a project. Never fails.
    pub fn categorize(&self, project: &Project) -> Category {
        self.explain(&project.name, &project.slug, &project.sections.concatenated())
            .category
    }

    /// Categorize raw inputs and report which rule decided.
    pub fn explain(&self, name: &str, slug: &str, sections: &str) -> CategoryMatch {
        if let Some(category) = self.overrides.get(slug) {
            return CategoryMatch {
                category: *category,
                reason: MatchReason::Override,
            };
        }

        let name = name.to_lowercase();
        let sections = sections.to_lowercase();
        let input = RuleInput {
            name: &name,
            slug,
            sections: &sections,
        };

        self.rules
            .iter()
            .enumerate()
            .find_map(|(index, rule)| {
                rule.matched_keyword(&input).map(|keyword| CategoryMatch {
                    category: rule.category,
                    reason: MatchReason::Rule { index, keyword },
                })
            })
            .unwrap_or(CategoryMatch {
                category: Category::Other,
                reason: MatchReason::CatchAll,
            })
    }

    /// Tag every project in place.
    pub fn categorize_all(&self, projects: &mut [Project]) {
        for project in projects.iter_mut() {
            project.category = self.categorize(project);
            tracing::debug!(
                slug = %project.slug,
                category = %project.category,
                "Categorized project"
            );
        }
    }
}
