//! Removal command parser
//!
//! Keyword heuristic, no NER involved:
//!
//! ```text
//! "please remove the highway layer for maharashtra"
//!          ^^^^^^     ^^^^^^^           ^^^^^^^^^^^
//!          keyword    category synonym  location (after marker "for")
//! ```
//!
//! Keywords and synonyms match as substrings of the lower-cased utterance;
//! the marker must be a whole token.

use nom::{
    bytes::complete::take_till1,
    character::complete::multispace0,
    multi::many0,
    sequence::{preceded, terminated},
    IResult,
};
use serde::{Deserialize, Serialize};

use super::grammar::RemovalGrammar;

/// A parsed removal request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalCommand {
    /// The removal keyword that triggered the command
    pub action: String,
    /// Category name from the grammar (e.g. `railway`)
    pub category: String,
    pub location: Option<String>,
}

impl RemovalCommand {
    /// Whether an active layer title is a target of this command
    pub fn matches_title(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        title.contains(&self.category)
            && self
                .location
                .as_ref()
                .map_or(true, |location| title.contains(location.as_str()))
    }
}

fn word(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, take_till1(char::is_whitespace))(input)
}

fn tokens(input: &str) -> IResult<&str, Vec<&str>> {
    terminated(many0(word), multispace0)(input)
}

/// Words after the first `marker` token, joined by single spaces
pub fn location_after_marker(text: &str, marker: &str) -> Option<String> {
    let (_, words) = tokens(text).ok()?;
    let position = words.iter().position(|w| *w == marker)?;
    let location = words[position + 1..].join(" ");
    if location.is_empty() {
        None
    } else {
        Some(location)
    }
}

/// Parse `text` as a removal command.
///
/// `None` when no removal keyword is present or no category synonym matches.
pub fn parse_removal_command(text: &str, grammar: &RemovalGrammar) -> Option<RemovalCommand> {
    let text = text.trim().to_lowercase();

    let action = grammar
        .keywords
        .iter()
        .find(|keyword| text.contains(keyword.to_lowercase().as_str()))?;

    let category = grammar.categories.iter().find(|category| {
        category
            .synonyms
            .iter()
            .any(|synonym| text.contains(synonym.to_lowercase().as_str()))
    })?;

    Some(RemovalCommand {
        action: action.to_lowercase(),
        category: category.name.to_lowercase(),
        location: location_after_marker(&text, &grammar.marker.to_lowercase()),
    })
}
