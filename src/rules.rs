use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use crate::error::{OrganizerError, Result};

/// Label used for videos and playlists that match no category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A category and the keywords that select it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRule {
    /// Category name, unique within a rule set
    pub name: String,

    /// Case-insensitive substrings matched against title and description
    pub keywords: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Title used when a playlist is created or renamed for this category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_name: Option<String>,
}

impl CategoryRule {
    pub fn new<S: AsRef<str>>(name: impl Into<String>, keywords: &[S]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.as_ref().to_string()).collect(),
            description: None,
            suggested_name: None,
        }
    }

    pub fn with_suggested_name(mut self, suggested_name: impl Into<String>) -> Self {
        self.suggested_name = Some(suggested_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Title a new playlist for this category should get
    pub fn playlist_title(&self) -> &str {
        self.suggested_name.as_deref().unwrap_or(&self.name)
    }

    /// Lowercased words of the category name, used to recognise playlists
    /// whose title already names the category
    pub fn name_words(&self) -> Vec<String> {
        self.name
            .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
            .filter(|w| w.chars().count() >= 3)
            .map(str::to_lowercase)
            .collect()
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct RulesFile {
    #[serde(rename = "category", default)]
    categories: Vec<CategoryRule>,
}

/// Ordered, validated set of category rules
///
/// Keywords are trimmed and lowercased on construction and empty keywords
/// are dropped, so the classifier can match against them directly.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
}

impl CategoryRules {
    /// Build a rule set, normalizing keywords and rejecting bad names
    pub fn new(rules: Vec<CategoryRule>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(rules.len());

        for mut rule in rules {
            rule.name = rule.name.trim().to_string();
            if rule.name.is_empty() {
                return Err(OrganizerError::InvalidRule(
                    "category name must not be empty".to_string(),
                ));
            }
            if rule.name.eq_ignore_ascii_case(UNCATEGORIZED) {
                return Err(OrganizerError::InvalidRule(format!(
                    "'{}' is reserved for unmatched videos",
                    UNCATEGORIZED
                )));
            }
            if !seen.insert(rule.name.to_lowercase()) {
                return Err(OrganizerError::InvalidRule(format!(
                    "duplicate category '{}'",
                    rule.name
                )));
            }

            let mut keywords: Vec<String> = Vec::with_capacity(rule.keywords.len());
            for keyword in &rule.keywords {
                let keyword = keyword.trim().to_lowercase();
                if !keyword.is_empty() && !keywords.contains(&keyword) {
                    keywords.push(keyword);
                }
            }
            rule.keywords = keywords;
            normalized.push(rule);
        }

        Ok(Self { rules: normalized })
    }

    /// A rule set with no categories; everything classifies as uncategorized
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Parse rules from TOML (`[[category]]` tables)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RulesFile = toml::from_str(content)?;
        Self::new(file.categories)
    }

    /// Load rules from a TOML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let rules = Self::from_toml_str(&content)?;
        info!(
            "📚 Loaded {} category rules from: {}",
            rules.len(),
            path.as_ref().display()
        );
        Ok(rules)
    }

    /// Serialize rules back to the TOML file format
    pub fn to_toml_string(&self) -> Result<String> {
        let file = RulesFile {
            categories: self.rules.clone(),
        };
        Ok(toml::to_string_pretty(&file)?)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategoryRule> {
        self.rules.iter()
    }

    pub fn get(&self, name: &str) -> Option<&CategoryRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Get statistics about the rule set
    pub fn stats(&self) -> CategoryRulesStats {
        CategoryRulesStats {
            total_categories: self.rules.len(),
            total_keywords: self.rules.iter().map(|r| r.keywords.len()).sum(),
            keyword_counts: self
                .rules
                .iter()
                .map(|r| (r.name.clone(), r.keywords.len()))
                .collect(),
        }
    }

    fn default_rules() -> Vec<CategoryRule> {
        vec![
            CategoryRule::new(
                "AI_Programming",
                &["ai", "claude", "coding", "programming", "vibe coding", "cursor", "superclaude"],
            )
            .with_description("AI-assisted programming and development")
            .with_suggested_name("🤖 AI Programming"),
            CategoryRule::new(
                "Investment_Finance",
                &["bitcoin", "crypto", "investment", "finance", "trading", "加密", "投资"],
            )
            .with_description("Investing and personal finance")
            .with_suggested_name("💰 Investment & Finance"),
            CategoryRule::new(
                "Health_Wellness",
                &["康复", "健康", "筋膜", "物理治疗", "health", "wellness", "therapy"],
            )
            .with_description("Health, rehab and wellness")
            .with_suggested_name("🏥 Health & Wellness"),
            CategoryRule::new(
                "Gaming",
                &["黑神话", "游戏", "game", "gaming", "wukong", "攻略"],
            )
            .with_description("Games and walkthroughs")
            .with_suggested_name("🎮 Gaming"),
            CategoryRule::new(
                "Technology_Hardware",
                &["pc", "diy", "hardware", "tech", "computer", "rtx", "cpu"],
            )
            .with_description("PC building and hardware")
            .with_suggested_name("🔧 Technology & Hardware"),
            CategoryRule::new(
                "Music_Relaxation",
                &["music", "lo-fi", "lofi", "relaxation", "音乐", "放松", "jazz"],
            )
            .with_description("Music and relaxation")
            .with_suggested_name("🎵 Music & Relaxation"),
            CategoryRule::new(
                "Education_Learning",
                &["tutorial", "education", "learning", "教程", "学习", "课程"],
            )
            .with_description("Tutorials and courses")
            .with_suggested_name("📚 Education & Learning"),
        ]
    }
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            rules: Self::default_rules(),
        }
    }
}

impl<'a> IntoIterator for &'a CategoryRules {
    type Item = &'a CategoryRule;
    type IntoIter = std::slice::Iter<'a, CategoryRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Statistics about a rule set
#[derive(Debug, Clone)]
pub struct CategoryRulesStats {
    pub total_categories: usize,
    pub total_keywords: usize,
    pub keyword_counts: Vec<(String, usize)>,
}

impl CategoryRulesStats {
    /// Generate a summary string
    pub fn summary(&self) -> String {
        let per_category = self
            .keyword_counts
            .iter()
            .map(|(name, count)| format!("  - {}: {} keywords", name, count))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Category Rules:\n\
            - Categories: {}\n\
            - Total keywords: {}\n{}",
            self.total_categories, self.total_keywords, per_category
        )
    }
}
