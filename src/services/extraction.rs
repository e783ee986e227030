//! Heuristic entity extraction from a free-text booking request.

use crate::models::{
    Area, Confidence, ExtractedEntities, ExtractionResult, Priority, TimePreference,
};

const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Cleaning",
        &[
            "clean",
            "cleaning",
            "साफ",
            "safai",
            "saaf",
            "deep clean",
            "kitchen clean",
            "bathroom clean",
        ],
    ),
    (
        "Plumbing",
        &["plumb", "plumbing", "pipe", "leak", "tap", "नल", "पाइप", "leakage", "water"],
    ),
    (
        "Electrical",
        &["electric", "electrical", "wiring", "light", "switch", "बिजली", "bijli", "power", "socket"],
    ),
    (
        "HVAC",
        &["hvac", "ac", "air condition", "heating", "cooling", "एसी", "ठंडा", "thanda"],
    ),
    (
        "Handyman",
        &["handyman", "repair", "fix", "मरम्मत", "marammat", "ठीक", "theek"],
    ),
];

const AREA_KEYWORDS: &[(Area, &[&str])] = &[
    (Area::Kitchen, &["kitchen", "रसोई", "rasoi"]),
    (
        Area::Bathroom,
        &["bathroom", "bath", "toilet", "बाथरूम", "शौचालय"],
    ),
    (Area::Bedroom, &["bedroom", "bed room", "कमरा", "kamra"]),
    (Area::LivingRoom, &["living", "hall", "drawing", "बैठक"]),
    (
        Area::EntireHouse,
        &["house", "home", "full", "entire", "पूरा", "घर", "ghar"],
    ),
];

const PRIORITY_KEYWORDS: &[(Priority, &[&str])] = &[
    (
        Priority::Urgent,
        &[
            "urgent",
            "emergency",
            "asap",
            "immediately",
            "now",
            "turant",
            "तुरंत",
            "jaldi",
            "जल्दी",
            "abhi",
            "अभी",
        ],
    ),
    (Priority::High, &["soon", "quickly", "fast", "जल्द", "jald"]),
];

const TIME_KEYWORDS: &[(TimePreference, &[&str])] = &[
    (
        TimePreference::Asap,
        &["asap", "now", "immediately", "urgent", "abhi", "अभी", "turant", "तुरंत"],
    ),
    (TimePreference::Morning, &["morning", "सुबह", "subah", "am"]),
    (
        TimePreference::Afternoon,
        &["afternoon", "दोपहर", "dopahar", "noon", "pm"],
    ),
    (
        TimePreference::Evening,
        &["evening", "शाम", "shaam", "night", "रात"],
    ),
];

const LOCATION_INDICATORS: &[&str] = &["at", "in", "near", "address", "location", "पता", "pata"];

const CATEGORY_WEIGHT_HIGH: u32 = 3;
const CATEGORY_WEIGHT_MEDIUM: u32 = 2;
const CATEGORY_WEIGHT_LOW: u32 = 1;
const AREA_WEIGHT: u32 = 2;
const PRIORITY_WEIGHT: u32 = 3;
const TIME_WEIGHT: u32 = 2;
const LOCATION_WEIGHT: u32 = 1;

pub fn extract_entities(text: &str, categories: &[String]) -> ExtractionResult {
    let lower = text.to_lowercase();
    let mut entities = ExtractedEntities::default();
    let mut total = 0u32;
    let mut count = 0u32;

    if let Some((category, confidence)) = extract_service_category(&lower, categories) {
        entities.service_category = Some(category);
        total += match confidence {
            Confidence::High => CATEGORY_WEIGHT_HIGH,
            Confidence::Medium => CATEGORY_WEIGHT_MEDIUM,
            Confidence::Low => CATEGORY_WEIGHT_LOW,
        };
        count += 1;
    }

    if let Some(area) = first_tagged_match(&lower, AREA_KEYWORDS) {
        entities.area = Some(area);
        total += AREA_WEIGHT;
        count += 1;
    }

    if let Some(priority) = first_tagged_match(&lower, PRIORITY_KEYWORDS) {
        entities.priority = Some(priority);
        total += PRIORITY_WEIGHT;
        count += 1;
    }

    if let Some(pref) = first_tagged_match(&lower, TIME_KEYWORDS) {
        entities.time_preference = Some(pref);
        total += TIME_WEIGHT;
        count += 1;
    }

    if let Some(location) = extract_location(text) {
        entities.location = Some(location);
        total += LOCATION_WEIGHT;
        count += 1;
    }

    let average = if count > 0 {
        f64::from(total) / f64::from(count)
    } else {
        0.0
    };
    let confidence = if average >= 2.5 {
        Confidence::High
    } else if average >= 1.5 {
        Confidence::Medium
    } else {
        Confidence::Low
    };
    let ambiguous = count > 0 && confidence == Confidence::Low;

    tracing::debug!(entities = ?entities, confidence = ?confidence, "extracted entities");

    ExtractionResult {
        entities,
        confidence,
        ambiguous,
    }
}

/// Scores each catalog category by keyword hits. Ties keep the earlier catalog entry.
fn extract_service_category(lower: &str, categories: &[String]) -> Option<(String, Confidence)> {
    let mut best: Option<&String> = None;
    let mut max_score = 0;

    for category in categories {
        let score = category_keywords(category)
            .iter()
            .filter(|kw| lower.contains(&kw.to_lowercase()))
            .count();
        if score > max_score {
            max_score = score;
            best = Some(category);
        }
    }

    let confidence = match max_score {
        0 => return None,
        1 => Confidence::Medium,
        _ => Confidence::High,
    };
    best.map(|c| (c.clone(), confidence))
}

fn category_keywords(category: &str) -> &'static [&'static str] {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(category.trim()))
        .map(|(_, keywords)| *keywords)
        .unwrap_or(&[])
}

fn first_tagged_match<T: Copy>(lower: &str, table: &[(T, &[&str])]) -> Option<T> {
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(tag, _)| *tag)
}

/// Takes the text after the first location indicator that yields a plausible place.
fn extract_location(text: &str) -> Option<String> {
    for indicator in LOCATION_INDICATORS {
        let Some(end) = find_token(text, indicator) else {
            continue;
        };
        let candidate = text[end..]
            .trim()
            .split(|c: char| matches!(c, ',' | '.' | '\n'))
            .next()
            .unwrap_or_default()
            .trim();
        let len = candidate.chars().count();
        if len > 5 && len < 100 {
            return Some(candidate.to_string());
        }
    }
    None
}

/// Byte offset just past the first whole-word, case-insensitive occurrence of `token`.
fn find_token(text: &str, token: &str) -> Option<usize> {
    let mut word_start = None;
    for (i, c) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
        if c.is_alphanumeric() {
            word_start.get_or_insert(i);
        } else if let Some(start) = word_start.take() {
            if text[start..i].to_lowercase() == token {
                return Some(i);
            }
        }
    }
    None
}
