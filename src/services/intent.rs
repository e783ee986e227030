//! Rule-based language and intent detection for English, Hindi and Hinglish.

use crate::models::{Confidence, DetectedIntent, DetectedLanguage, DetectionResult};

/// Romanized Hindi markers. Two or more hits make an utterance Hinglish.
const HINGLISH_KEYWORDS: &[&str] = &[
    "mujhe", "hai", "chahiye", "karwana", "karna", "kar", "do", "karo", "booking", "service",
    "urgent", "jaldi", "abhi", "turant", "cancel", "status", "kab", "kahan", "kitne", "time",
    "change",
];

/// Intents in check order with their per-hit weight. The order breaks ties.
const INTENT_KEYWORDS: &[(DetectedIntent, u32, &[&[&str]])] = &[
    (
        DetectedIntent::Cancellation,
        3,
        &[
            &["cancel", "delete", "remove", "stop", "abort"],
            &["cancel", "band", "khatam", "nahi chahiye"],
            &["रद्द", "कैंसिल", "बंद"],
        ],
    ),
    (
        DetectedIntent::Reschedule,
        3,
        &[
            &[
                "reschedule",
                "change time",
                "change date",
                "postpone",
                "move",
                "shift",
                "different time",
            ],
            &["time change", "date change", "reschedule", "badalna", "shift"],
            &["समय बदलें", "तारीख बदलें", "टाल"],
        ],
    ),
    (
        DetectedIntent::Inquiry,
        2,
        &[
            &[
                "status",
                "check",
                "where",
                "when",
                "details",
                "info",
                "information",
                "my booking",
                "booking id",
            ],
            &["status", "kahan", "kab", "details", "info", "mera booking"],
            &["स्थिति", "कहाँ", "कब", "जानकारी", "डिटेल"],
        ],
    ),
    (
        DetectedIntent::NewBooking,
        1,
        &[
            &[
                "book", "need", "want", "schedule", "service", "cleaning", "plumbing",
                "electrical", "hvac", "handyman", "help", "fix", "repair",
            ],
            &["book", "chahiye", "karwana", "karna", "service", "clean", "fix", "repair"],
            &["बुक", "चाहिए", "सर्विस", "साफ", "ठीक", "मरम्मत"],
        ],
    ),
];

pub fn detect_intent_and_language(text: &str) -> DetectionResult {
    let language = detect_language(text);
    let (intent, confidence) = detect_intent(text);

    tracing::debug!(intent = ?intent, language = ?language, confidence = ?confidence, "classified utterance");

    DetectionResult {
        intent,
        language,
        confidence,
    }
}

pub fn detect_language(text: &str) -> DetectedLanguage {
    if contains_devanagari(text) {
        return DetectedLanguage::Hindi;
    }

    let lower = text.to_lowercase();
    let hits = HINGLISH_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .count();

    match hits {
        0 => DetectedLanguage::English,
        1 => DetectedLanguage::Mixed,
        _ => DetectedLanguage::Hinglish,
    }
}

pub fn detect_intent(text: &str) -> (DetectedIntent, Confidence) {
    let lower = text.to_lowercase();

    let mut best = DetectedIntent::Unknown;
    let mut max_score = 0;

    for (intent, weight, lists) in INTENT_KEYWORDS {
        let hits = lists
            .iter()
            .flat_map(|list| list.iter())
            .filter(|kw| lower.contains(*kw))
            .count() as u32;
        let score = hits * weight;

        if score > max_score {
            max_score = score;
            best = *intent;
        }
    }

    if best == DetectedIntent::Unknown {
        if text.trim().chars().count() > 5 {
            return (DetectedIntent::NewBooking, Confidence::Low);
        }
        return (DetectedIntent::Unknown, Confidence::Low);
    }

    (best, score_confidence(max_score))
}

fn score_confidence(score: u32) -> Confidence {
    match score {
        s if s >= 3 => Confidence::High,
        2 => Confidence::Medium,
        _ => Confidence::Low,
    }
}

fn contains_devanagari(text: &str) -> bool {
    text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c))
}
