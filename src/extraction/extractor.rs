//! Phrase reconstruction from tagged wordpieces

use map_intent_types::SpatialAction;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tags::{EntityTag, Family, TaggedToken};

/// A reconstructed word and its family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPhrase {
    pub family: Family,
    pub text: String,
}

/// Words grouped per family, in utterance order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    pub layer: Vec<String>,
    pub location: Vec<String>,
}

impl ExtractedEntities {
    fn push(&mut self, phrase: ExtractedPhrase) {
        match phrase.family {
            Family::Layer => self.layer.push(phrase.text),
            Family::Location => self.location.push(phrase.text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.layer.is_empty() && self.location.is_empty()
    }

    /// Layer words joined into a single query string
    pub fn layer_query(&self) -> String {
        self.layer.join(" ")
    }

    /// Location words joined into a single place phrase
    pub fn location_query(&self) -> String {
        self.location.join(" ")
    }
}

/// Rebuild words from NER output and bucket them by family.
///
/// Continuation fragments (`##...`) are glued onto the open word. Any token
/// outside the `layer`/`location` families closes the open word.
pub fn extract_entities(tokens: &[TaggedToken]) -> ExtractedEntities {
    let mut entities = ExtractedEntities::default();
    let mut current: Option<ExtractedPhrase> = None;

    for token in tokens {
        let Some(family) = token.tag().family() else {
            if let Some(phrase) = current.take() {
                entities.push(phrase);
            }
            continue;
        };

        if let (Some(fragment), Some(open)) = (token.continuation(), current.as_mut()) {
            open.text.push_str(fragment);
            continue;
        }

        if let Some(phrase) = current.take() {
            entities.push(phrase);
        }
        current = Some(ExtractedPhrase {
            family,
            text: token.continuation().unwrap_or(&token.word).to_string(),
        });
    }

    if let Some(phrase) = current.take() {
        entities.push(phrase);
    }

    debug!(layer = ?entities.layer, location = ?entities.location, "Extracted entities");
    entities
}

/// Spatial-action entities in encounter order
pub fn collect_actions(tokens: &[TaggedToken]) -> Vec<SpatialAction> {
    tokens
        .iter()
        .filter_map(|token| match token.tag() {
            EntityTag::Action(action) => Some(action),
            _ => None,
        })
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_family() -> impl Strategy<Value = Family> {
        prop_oneof![Just(Family::Layer), Just(Family::Location)]
    }

    fn tag_for(family: Family) -> &'static str {
        match family {
            Family::Layer => "B-layer",
            Family::Location => "B-location",
        }
    }

    proptest! {
        /// Without continuation markers every tagged token becomes exactly
        /// one word in its own bucket, in order.
        #[test]
        fn one_word_per_token(items in prop::collection::vec((arb_family(), "[a-z]{1,8}"), 0..12)) {
            let tokens: Vec<TaggedToken> = items
                .iter()
                .map(|(family, word)| TaggedToken::new(tag_for(*family), word.clone()))
                .collect();
            let entities = extract_entities(&tokens);

            let expected_layer: Vec<String> = items
                .iter()
                .filter(|(f, _)| *f == Family::Layer)
                .map(|(_, w)| w.clone())
                .collect();
            let expected_location: Vec<String> = items
                .iter()
                .filter(|(f, _)| *f == Family::Location)
                .map(|(_, w)| w.clone())
                .collect();
            prop_assert_eq!(entities.layer, expected_layer);
            prop_assert_eq!(entities.location, expected_location);
        }

        /// A head fragment plus continuation fragments under one tag merge
        /// into their literal concatenation.
        #[test]
        fn continuations_concatenate(
            family in arb_family(),
            head in "[a-z]{1,6}",
            tails in prop::collection::vec("[a-z]{1,4}", 1..5),
        ) {
            let mut tokens = vec![TaggedToken::new(tag_for(family), head.clone())];
            tokens.extend(
                tails
                    .iter()
                    .map(|tail| TaggedToken::new(tag_for(family), format!("##{tail}"))),
            );
            let entities = extract_entities(&tokens);

            let expected = format!("{}{}", head, tails.concat());
            let bucket = match family {
                Family::Layer => &entities.layer,
                Family::Location => &entities.location,
            };
            prop_assert_eq!(bucket, &vec![expected]);
        }
    }
}
