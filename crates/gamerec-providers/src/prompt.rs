//! Instruction builders for the remote model.
//!
//! Each recommendation prompt embeds the caller's constraints and an
//! explicit "respond with only this JSON shape" template; the extraction
//! pipeline handles whatever the model actually sends back.

use gamerec_core::types::{LibraryRequest, PlayedGame, RecommendationRequest};

/// How many top-played titles count as "favorites" in the library prompt.
const FAVORITE_COUNT: usize = 5;

const JSON_TEMPLATE: &str = r#"{
    "recommendations": [
        {
            "title": "Game Title",
            "genre": "Game Genre",
            "description": "Brief description",
            "why_recommended": "Why this game matches preferences",
            "platforms": ["PC", "PS5", "Xbox"],
            "rating": 8.5,
            "release_year": "2023"
        }
    ]
}"#;

fn list_or_any(items: &[String]) -> String {
    if items.is_empty() {
        "Any".to_string()
    } else {
        items.join(", ")
    }
}

/// Instruction for a plain recommendation request.
pub fn recommendation_prompt(request: &RecommendationRequest) -> String {
    format!(
        "You are a game recommendation AI. Based on the following user preferences, \
         recommend {max} video games.\n\n\
         User Preferences: {preferences}\n\
         Preferred Genres: {genres}\n\
         Preferred Platforms: {platforms}\n\n\
         IMPORTANT: You must respond with ONLY valid JSON in this exact format, \
         no additional text:\n{template}\n\n\
         Focus on games that best match the user's preferences. \
         Do not include any text before or after the JSON.",
        max = request.max_recommendations,
        preferences = request.preferences,
        genres = list_or_any(&request.genres),
        platforms = list_or_any(&request.platforms),
        template = JSON_TEMPLATE,
    )
}

/// Instruction for a recommendation request with library context.
///
/// The library is ranked by total playtime; the top titles become
/// "favorites" and the model is asked for games similar to them but not
/// already owned.
pub fn library_prompt(request: &LibraryRequest) -> String {
    let favorites = top_played(&request.library, FAVORITE_COUNT);
    let favorite_summary = favorites
        .iter()
        .map(|game| format!("{} ({} hours)", game.name, game.playtime_forever))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are a game recommendation AI. Based on the following user information \
         and game library data, recommend {max} video games.\n\n\
         User Message: {message}\n\
         Selected Tags/Genres: {tags}\n\n\
         Library Analysis:\n\
         - Top played games: {favorites}\n\
         - Total games owned: {owned}\n\n\
         IMPORTANT: Recommend games that:\n\
         1. Match user's preferences from their message\n\
         2. Are similar to their most played games\n\
         3. Align with their selected tags\n\
         4. Are NOT already in their library\n\n\
         RESPOND WITH ONLY valid JSON in this exact format:\n{template}",
        max = request.max_recommendations,
        message = request.message,
        tags = list_or_any(&request.tags),
        favorites = favorite_summary,
        owned = request.library.len(),
        template = JSON_TEMPLATE,
    )
}

/// Instruction for a free-form chat exchange.
pub fn chat_prompt(message: &str, context: Option<&str>) -> String {
    format!(
        "Context: {context}\n\
         User Message: {message}\n\n\
         Please provide a helpful and informative response about video games, \
         gaming, or any related topic the user is asking about.",
        context = context.unwrap_or(""),
        message = message,
    )
}

/// The `count` most-played games, ordered by descending total playtime.
fn top_played(library: &[PlayedGame], count: usize) -> Vec<&PlayedGame> {
    let mut ranked: Vec<&PlayedGame> = library.iter().collect();
    ranked.sort_by(|a, b| b.playtime_forever.cmp(&a.playtime_forever));
    ranked.truncate(count);
    ranked
}
