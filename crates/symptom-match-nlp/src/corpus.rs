//! Training corpus for the symptom classifier.
//!
//! Every label needs phrases here before free text can map to it. Labels use
//! the same `_`-separated form as catalog symptom tokens.
//!
//! Phrases under [`BACKGROUND_LABEL`] describe everyday, symptom-free talk.
//! They compete with the symptom labels during classification and are never
//! reported.

use serde::{Deserialize, Serialize};

/// One labelled training phrase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainingExample {
    /// Example utterance as a user might type it
    pub phrase: String,
    /// Symptom label the phrase expresses
    pub label: String,
}

impl TrainingExample {
    pub fn new(phrase: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            label: label.into(),
        }
    }
}

/// Built-in (phrase, label) pairs.
pub const SYMPTOM_PHRASES: &[(&str, &str)] = &[
    // Headache
    ("I have a headache", "headache"),
    ("my head hurts", "headache"),
    ("my head is pounding", "headache"),
    ("throbbing pain in my head", "headache"),
    // Sore throat
    ("sore throat", "sore_throat"),
    ("my throat hurts", "sore_throat"),
    ("it hurts to swallow", "sore_throat"),
    ("scratchy throat", "sore_throat"),
    // Dizziness
    ("I feel dizzy", "dizziness"),
    ("the room is spinning", "dizziness"),
    ("I feel lightheaded", "dizziness"),
    ("dizziness when I stand up", "dizziness"),
    // Fever
    ("I have a fever", "fever"),
    ("I have a high temperature", "fever"),
    ("I feel hot and feverish", "fever"),
    ("chills and sweating", "fever"),
    // Cough
    ("I have a cough", "cough"),
    ("I keep coughing", "cough"),
    ("dry cough all night", "cough"),
    ("coughing up phlegm", "cough"),
    // Fatigue
    ("I feel tired", "fatigue"),
    ("I am exhausted all the time", "fatigue"),
    ("no energy", "fatigue"),
    ("constant fatigue", "fatigue"),
    // Nausea
    ("I feel nauseous", "nausea"),
    ("I feel sick to my stomach", "nausea"),
    ("I think I am going to throw up", "nausea"),
    ("nausea", "nausea"),
    // Difficulty breathing
    ("I can't breathe", "difficulty_breathing"),
    ("shortness of breath", "difficulty_breathing"),
    ("I am short of breath", "difficulty_breathing"),
    ("difficulty breathing", "difficulty_breathing"),
    // Runny nose
    ("runny nose", "runny_nose"),
    ("my nose is running", "runny_nose"),
    ("stuffy nose", "runny_nose"),
    ("I keep sneezing", "runny_nose"),
];

/// Label for symptom-free text. The leading `_` keeps it apart from catalog
/// symptom tokens, which never start with one.
pub const BACKGROUND_LABEL: &str = "_background";

/// Everyday phrases that should not map to any symptom.
pub const BACKGROUND_PHRASES: &[&str] = &[
    "what time is it",
    "see you at the meeting tomorrow",
    "the weather is nice",
    "I bought a new car",
    "we walked the dog in the park",
    "this is a great place",
    "I need to go home now",
    "thanks for your help",
    "how was your day",
    "let me know when you are free",
    "I am reading a good book",
    "the train was late again",
    "we had dinner at a restaurant last night",
    "my phone battery is low",
    "the kids are playing outside",
    "I am working from the office",
    "my room is a mess",
    "I went running in the morning",
    "that is a hard pill to swallow",
];

/// Words dropped by the tokenizer before counting.
pub const STOP_WORDS: &[&str] = &[
    "a", "all", "also", "am", "an", "and", "are", "at", "be", "been", "being", "bit", "can",
    "do", "feel", "feeling", "for", "from", "get", "getting", "going", "got", "had", "has",
    "have", "having", "i", "im", "in", "is", "it", "its", "just", "keep", "keeps", "like",
    "little", "lot", "m", "me", "my", "myself", "no", "of", "on", "or", "really", "s", "since",
    "so", "some", "t", "that", "the", "there", "think", "this", "to", "up", "very",
    "was", "were", "when", "with",
];

/// The built-in corpus as owned examples, symptom phrases first.
pub fn default_corpus() -> Vec<TrainingExample> {
    SYMPTOM_PHRASES
        .iter()
        .map(|(phrase, label)| TrainingExample::new(*phrase, *label))
        .chain(
            BACKGROUND_PHRASES
                .iter()
                .map(|phrase| TrainingExample::new(*phrase, BACKGROUND_LABEL)),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_corpus_matches_table() {
        let corpus = default_corpus();
        assert_eq!(corpus.len(), SYMPTOM_PHRASES.len() + BACKGROUND_PHRASES.len());
        assert_eq!(corpus[0], TrainingExample::new("I have a headache", "headache"));
        assert!(corpus[SYMPTOM_PHRASES.len()..]
            .iter()
            .all(|example| example.label == BACKGROUND_LABEL));
    }

    #[test]
    fn test_background_label_is_not_a_symptom() {
        assert!(BACKGROUND_LABEL.starts_with('_'));
        assert!(SYMPTOM_PHRASES.iter().all(|(_, label)| *label != BACKGROUND_LABEL));
    }

    #[test]
    fn test_labels_are_balanced() {
        // Equal phrase counts keep the class priors flat.
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for (_, label) in SYMPTOM_PHRASES {
            *counts.entry(*label).or_default() += 1;
        }
        assert!(counts.values().all(|&c| c == 4), "{:?}", counts);
    }

    #[test]
    fn test_labels_are_canonical() {
        for (_, label) in SYMPTOM_PHRASES {
            assert_eq!(*label, label.to_lowercase());
            assert!(!label.contains(' '));
        }
    }

    #[test]
    fn test_stop_words_sorted_and_lowercase() {
        let mut sorted = STOP_WORDS.to_vec();
        sorted.sort();
        assert_eq!(sorted, STOP_WORDS);
        assert!(STOP_WORDS.iter().all(|w| *w == w.to_lowercase()));
    }
}
