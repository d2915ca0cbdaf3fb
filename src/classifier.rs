//! Keyword-based video classification

use serde::{Deserialize, Serialize};

use crate::model::VideoRef;
use crate::rules::{CategoryRule, CategoryRules, UNCATEGORIZED};

/// Weight of a title hit relative to a description hit
const TITLE_WEIGHT: usize = 2;

/// One category a video matched, with the evidence behind the score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryMatch {
    pub category: String,
    pub score: f64,
    pub title_hits: usize,
    pub description_hits: usize,
}

/// Classification of a single video
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult {
    pub video_id: String,

    /// Primary category, or `Uncategorized`
    pub category: String,

    /// Score of the primary category (0.0 when uncategorized)
    pub score: f64,

    /// Every category with a non-zero score, best first
    pub matches: Vec<CategoryMatch>,
}

impl ClassificationResult {
    pub fn is_uncategorized(&self) -> bool {
        self.category == UNCATEGORIZED
    }
}

/// Scores videos against an ordered rule set
#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    rules: &'a CategoryRules,
    min_score: f64,
}

impl<'a> Classifier<'a> {
    pub fn new(rules: &'a CategoryRules, min_score: f64) -> Self {
        Self { rules, min_score }
    }

    /// Classify one video
    ///
    /// Every category with at least one keyword hit is returned, sorted by
    /// descending score with ties broken by category name. The primary
    /// category is the first match if its score is strictly above the
    /// minimum score, otherwise the video is uncategorized.
    pub fn classify(&self, video: &VideoRef) -> ClassificationResult {
        let title = video.title.to_lowercase();
        let description = video.description.to_lowercase();

        let mut matches: Vec<CategoryMatch> = self
            .rules
            .iter()
            .filter_map(|rule| score_rule(rule, &title, &description))
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.category.cmp(&b.category))
        });

        let (category, score) = match matches.first() {
            Some(top) if top.score > self.min_score => (top.category.clone(), top.score),
            _ => (UNCATEGORIZED.to_string(), 0.0),
        };

        ClassificationResult {
            video_id: video.video_id.clone(),
            category,
            score,
            matches,
        }
    }
}

fn score_rule(rule: &CategoryRule, title: &str, description: &str) -> Option<CategoryMatch> {
    if rule.keywords.is_empty() {
        return None;
    }

    let title_hits: usize = rule.keywords.iter().map(|k| title.matches(k.as_str()).count()).sum();
    let description_hits: usize = rule
        .keywords
        .iter()
        .map(|k| description.matches(k.as_str()).count())
        .sum();

    if title_hits == 0 && description_hits == 0 {
        return None;
    }

    let weighted = (title_hits * TITLE_WEIGHT + description_hits) as f64;
    let max = (rule.keywords.len() * TITLE_WEIGHT) as f64;
    let score = (weighted / max).min(1.0);

    Some(CategoryMatch {
        category: rule.name.clone(),
        score,
        title_hits,
        description_hits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> CategoryRules {
        CategoryRules::new(vec![
            CategoryRule::new("music", &["guitar", "song"]),
            CategoryRule::new("education", &["tutorial", "education"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_tie_broken_by_category_name() {
        let rules = rules();
        let classifier = Classifier::new(&rules, 0.0);
        let result = classifier.classify(&VideoRef::new("v1", "Guitar Tutorial for Beginners"));

        let ranking: Vec<(&str, f64)> = result
            .matches
            .iter()
            .map(|m| (m.category.as_str(), m.score))
            .collect();
        assert_eq!(ranking, vec![("education", 0.5), ("music", 0.5)]);
        assert_eq!(result.category, "education");
        assert_eq!(result.score, 0.5);
    }

    #[test]
    fn test_title_weighs_more_than_description() {
        let rules = rules();
        let classifier = Classifier::new(&rules, 0.0);
        let video = VideoRef::new("v1", "My first song").with_description("a short tutorial");
        let result = classifier.classify(&video);

        assert_eq!(result.matches[0].category, "music");
        assert_eq!(result.matches[0].score, 0.5);
        assert_eq!(result.matches[1].category, "education");
        assert_eq!(result.matches[1].score, 0.25);
    }

    #[test]
    fn test_score_is_capped() {
        let rules = rules();
        let classifier = Classifier::new(&rules, 0.0);
        let video = VideoRef::new("v1", "song song song guitar guitar");
        let result = classifier.classify(&video);

        assert_eq!(result.score, 1.0);
        assert_eq!(result.matches[0].title_hits, 5);
    }

    #[test]
    fn test_empty_text_is_uncategorized() {
        let rules = rules();
        let classifier = Classifier::new(&rules, 0.0);
        let result = classifier.classify(&VideoRef::new("v1", ""));

        assert!(result.is_uncategorized());
        assert_eq!(result.score, 0.0);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn test_below_min_score_keeps_matches() {
        let rules = rules();
        let classifier = Classifier::new(&rules, 0.3);
        let video = VideoRef::new("v1", "Untitled").with_description("guitar");
        let result = classifier.classify(&video);

        assert!(result.is_uncategorized());
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].score, 0.25);
    }

    #[test]
    fn test_case_insensitive() {
        let rules = rules();
        let classifier = Classifier::new(&rules, 0.0);
        let result = classifier.classify(&VideoRef::new("v1", "EDUCATION"));
        assert_eq!(result.category, "education");
    }

    #[test]
    fn test_empty_rule_set() {
        let rules = CategoryRules::empty();
        let classifier = Classifier::new(&rules, 0.0);
        let result = classifier.classify(&VideoRef::new("v1", "Guitar Tutorial"));
        assert!(result.is_uncategorized());
    }

    #[test]
    fn test_scores_within_bounds() {
        let rules = CategoryRules::default();
        let classifier = Classifier::new(&rules, 0.0);
        let titles = [
            "AI coding with Claude in Cursor",
            "lofi jazz music for relaxation",
            "RTX 4090 PC build, DIY computer tech",
            "黑神话 悟空 游戏 攻略",
            "",
        ];

        for (i, title) in titles.iter().enumerate() {
            let result = classifier.classify(&VideoRef::new(format!("v{}", i), *title));
            for m in &result.matches {
                assert!(m.score > 0.0 && m.score <= 1.0);
                assert!(m.title_hits + m.description_hits > 0);
            }
        }
    }
}
