//! Response extraction — turns an untrusted textual model reply into a
//! validated list of recommendation records.
//!
//! Four strategies of decreasing confidence, first success wins:
//!
//! 1. a code-fenced JSON object with a `recommendations` array
//! 2. a bare brace-delimited JSON object anywhere in the text
//! 3. a heuristic line scan over enumerated titles
//! 4. the deterministic fallback catalogue
//!
//! Extraction never fails: any shortfall is padded from the catalogue, so
//! for `max_count > 0` the result always holds exactly `max_count` records.

use regex::Regex;
use tracing::debug;

use gamerec_core::types::Recommendation;

/// Platform names recognized by the heuristic line scan.
const PLATFORM_VOCABULARY: &[&str] = &[
    "PC",
    "PS4",
    "PS5",
    "Xbox One",
    "Xbox Series X",
    "Nintendo Switch",
];

/// Lowercase substrings that mark a line as platform information.
const PLATFORM_HINTS: &[&str] = &["pc", "ps", "xbox", "switch", "nintendo"];

/// Which strategy produced an extraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractionSource {
    FencedJson,
    BareJson,
    TextScan,
    Fallback,
}

/// Result of running the extraction pipeline.
#[derive(Clone, Debug)]
pub struct Extraction {
    pub records: Vec<Recommendation>,
    pub source: ExtractionSource,
}

/// Multi-stage extractor with precompiled patterns.
pub struct ResponseExtractor {
    fenced_json: Regex,
    bare_json: Regex,
    title_line: Regex,
}

impl Default for ResponseExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseExtractor {
    pub fn new() -> Self {
        Self {
            // Fenced block, optionally tagged "json", holding one object.
            fenced_json: Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```")
                .expect("fenced JSON pattern is valid"),
            // Greedy: first opening brace to last closing brace.
            bare_json: Regex::new(r"(?s)(\{.*\})").expect("bare JSON pattern is valid"),
            // Leading enumerator (digits/dashes/dots) then a capitalized title.
            title_line: Regex::new(r"^[\d\-\.]+\.?\s*([A-Z][^:]+)")
                .expect("title line pattern is valid"),
        }
    }

    /// Run the pipeline over a raw model reply.
    pub fn extract(&self, raw: &str, max_count: usize) -> Extraction {
        if let Some(mut records) = self.capture_json(&self.fenced_json, raw, max_count) {
            debug!(count = records.len(), "extracted recommendations from fenced JSON");
            pad_with_fallback(&mut records, max_count);
            return Extraction {
                records,
                source: ExtractionSource::FencedJson,
            };
        }

        if let Some(mut records) = self.capture_json(&self.bare_json, raw, max_count) {
            debug!(count = records.len(), "extracted recommendations from bare JSON");
            pad_with_fallback(&mut records, max_count);
            return Extraction {
                records,
                source: ExtractionSource::BareJson,
            };
        }

        let mut records = self.scan_text(raw, max_count);
        if !records.is_empty() {
            debug!(count = records.len(), "extracted recommendations from text scan");
            pad_with_fallback(&mut records, max_count);
            return Extraction {
                records,
                source: ExtractionSource::TextScan,
            };
        }

        debug!("reply had no extractable recommendations, using fallback catalogue");
        Extraction {
            records: fallback_recommendations(max_count),
            source: ExtractionSource::Fallback,
        }
    }

    /// Apply `pattern` to `raw` and parse the captured object.
    ///
    /// Decode errors and a missing `recommendations` key are treated as a
    /// parse failure (`None`), never propagated.
    fn capture_json(
        &self,
        pattern: &Regex,
        raw: &str,
        max_count: usize,
    ) -> Option<Vec<Recommendation>> {
        let captured = pattern.captures(raw)?.get(1)?.as_str();
        let value: serde_json::Value = serde_json::from_str(captured).ok()?;
        let items = value.get("recommendations")?.clone();
        let mut records: Vec<Recommendation> = serde_json::from_value(items).ok()?;
        records.truncate(max_count);
        Some(records.into_iter().map(Recommendation::clamp_rating).collect())
    }

    /// Heuristic line scan over enumerated titles.
    ///
    /// One candidate record is held at a time: an enumerator line flushes the
    /// previous candidate (if there is room) and starts a new one; other
    /// lines are classified by keyword and update the current candidate. The
    /// final candidate is flushed at end of input.
    fn scan_text(&self, raw: &str, max_count: usize) -> Vec<Recommendation> {
        let mut records: Vec<Recommendation> = Vec::new();
        let mut current: Option<Recommendation> = None;

        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let lower = line.to_lowercase();

            if let Some(caps) = self.title_line.captures(line) {
                if let Some(done) = current.take() {
                    if records.len() < max_count {
                        records.push(done);
                    }
                }
                current = Some(Recommendation {
                    title: caps[1].trim().to_string(),
                    genre: "Unknown".to_string(),
                    ..Default::default()
                });
            } else if lower.contains("genre") || lower.contains("type") {
                if let Some(rec) = current.as_mut() {
                    rec.genre = after_last_colon(line);
                }
            } else if lower.contains("description") || lower.contains("about") {
                if let Some(rec) = current.as_mut() {
                    rec.description = after_last_colon(line);
                }
            } else if PLATFORM_HINTS.iter().any(|hint| lower.contains(hint)) {
                if let Some(rec) = current.as_mut() {
                    let platforms: Vec<String> = PLATFORM_VOCABULARY
                        .iter()
                        .filter(|platform| lower.contains(&platform.to_lowercase()))
                        .map(|platform| platform.to_string())
                        .collect();
                    if !platforms.is_empty() {
                        rec.platforms = platforms;
                    }
                }
            }
        }

        if let Some(done) = current {
            if records.len() < max_count {
                records.push(done);
            }
        }

        records
    }
}

/// Text after the last colon, or the whole line when there is none.
fn after_last_colon(line: &str) -> String {
    line.rsplit_once(':')
        .map(|(_, tail)| tail.trim().to_string())
        .unwrap_or_else(|| line.trim().to_string())
}

// ─────────────────────────────────────────────
// Fallback catalogue
// ─────────────────────────────────────────────

/// The deterministic fallback catalogue, truncated or cycled to `max_count`.
pub fn fallback_recommendations(max_count: usize) -> Vec<Recommendation> {
    let catalogue = fallback_catalogue();
    catalogue.iter().cloned().cycle().take(max_count).collect()
}

/// Pad `records` from the catalogue until it holds exactly `max_count`.
fn pad_with_fallback(records: &mut Vec<Recommendation>, max_count: usize) {
    records.truncate(max_count);
    let catalogue = fallback_catalogue();
    let mut next = 0;
    while records.len() < max_count {
        records.push(catalogue[next % catalogue.len()].clone());
        next += 1;
    }
}

fn entry(
    title: &str,
    genre: &str,
    description: &str,
    why: &str,
    platforms: &[&str],
    rating: f64,
    release_year: &str,
) -> Recommendation {
    Recommendation {
        title: title.to_string(),
        genre: genre.to_string(),
        description: description.to_string(),
        why_recommended: why.to_string(),
        platforms: platforms.iter().map(|p| p.to_string()).collect(),
        rating,
        release_year: release_year.to_string(),
    }
}

/// Fixed, well-known titles served when no better data is obtainable.
fn fallback_catalogue() -> Vec<Recommendation> {
    vec![
        entry(
            "Cyberpunk 2077",
            "RPG",
            "Open-world action RPG set in Night City",
            "Matches your preference for action games with deep storytelling",
            &["PC", "PS4", "PS5", "Xbox One", "Xbox Series X"],
            8.5,
            "2020",
        ),
        entry(
            "The Witcher 3: Wild Hunt",
            "RPG",
            "Epic fantasy RPG with monster hunting",
            "Excellent action RPG with rich world and engaging combat",
            &["PC", "PS4", "PS5", "Xbox One", "Xbox Series X", "Nintendo Switch"],
            9.3,
            "2015",
        ),
        entry(
            "Elden Ring",
            "Action RPG",
            "Open-world action RPG with challenging combat",
            "Epic open-world game with deep combat mechanics",
            &["PC", "PS4", "PS5", "Xbox One", "Xbox Series X"],
            9.5,
            "2022",
        ),
        entry(
            "Red Dead Redemption 2",
            "Action-Adventure",
            "Western action-adventure game set in 1899",
            "Perfect for action game lovers with immersive storytelling",
            &["PC", "PS4", "PS5", "Xbox One", "Xbox Series X"],
            9.7,
            "2018",
        ),
        entry(
            "God of War (2018)",
            "Action-Adventure",
            "Epic action-adventure with Norse mythology",
            "Intense action combat with compelling narrative",
            &["PC", "PS4", "PS5"],
            9.4,
            "2018",
        ),
    ]
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
