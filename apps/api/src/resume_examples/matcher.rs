//! Best-match retrieval over the resume example index.
//!
//! Score per record (all comparisons lowercased, partial similarity 0–100 each):
//!   role × role_weight + Σ tech × tech_weight + level × level_weight + Σ domain × domain_weight
//!
//! The highest total wins; ties keep the first record encountered. The winner is only
//! returned when its total reaches the acceptance threshold.

use crate::config::MatchSettings;
use crate::models::resume::{MatchResult, ResumeExample};
use crate::resume_examples::similarity::partial_ratio_chars;

/// Lowercased scored fields as chars, computed once at construction.
struct IndexedFields {
    role: Vec<char>,
    tech: Vec<Vec<char>>,
    level: Vec<char>,
    domain: Vec<Vec<char>>,
}

fn lowercase_chars(value: &str) -> Vec<char> {
    value.to_lowercase().chars().collect()
}

impl IndexedFields {
    fn from_example(example: &ResumeExample) -> Self {
        Self {
            role: lowercase_chars(&example.role),
            tech: example.tech.iter().map(|t| lowercase_chars(t)).collect(),
            level: lowercase_chars(&example.level),
            domain: example.domain.iter().map(|d| lowercase_chars(d)).collect(),
        }
    }
}

/// Read-only matcher over the resume corpus. Shared across requests without locking.
pub struct ResumeMatcher {
    examples: Vec<ResumeExample>,
    indexed: Vec<IndexedFields>,
    settings: MatchSettings,
}

impl ResumeMatcher {
    pub fn new(examples: Vec<ResumeExample>, settings: MatchSettings) -> Self {
        let indexed = examples.iter().map(IndexedFields::from_example).collect();
        Self {
            examples,
            indexed,
            settings,
        }
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Returns the best-scoring example for `query`, or no example when nothing
    /// reaches the threshold. Pure: same corpus and query give the same result.
    pub fn find_best_match(&self, query: &str) -> MatchResult<'_> {
        let query = lowercase_chars(query);

        let mut best: Option<(usize, f64)> = None;
        for (idx, fields) in self.indexed.iter().enumerate() {
            let score = self.score_fields(&query, fields);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((idx, score));
            }
        }

        match best {
            Some((idx, score)) if score >= self.settings.threshold => MatchResult {
                example: Some(&self.examples[idx]),
                score,
            },
            Some((_, score)) => MatchResult {
                example: None,
                score,
            },
            None => MatchResult {
                example: None,
                score: 0.0,
            },
        }
    }

    fn score_fields(&self, query: &[char], fields: &IndexedFields) -> f64 {
        let s = &self.settings;
        let mut score = 0.0;

        if !fields.role.is_empty() {
            score += partial_ratio_chars(query, &fields.role) * s.role_weight;
        }
        for tech in &fields.tech {
            score += partial_ratio_chars(query, tech) * s.tech_weight;
        }
        if !fields.level.is_empty() {
            score += partial_ratio_chars(query, &fields.level) * s.level_weight;
        }
        for domain in &fields.domain {
            score += partial_ratio_chars(query, domain) * s.domain_weight;
        }

        score
    }
}
