//! Locale definitions and speech-language mapping
//!
//! The assistant speaks Portuguese, English and French. Interface locales are
//! plain base languages ("pt"); the speech engine wants BCP-47 tags
//! ("pt-PT"). This module owns the mapping in both directions, voice
//! selection against whatever voices the platform reports, and the
//! auto-detect resolution used before every synthesis call.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Interface locales supported by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Pt,
    En,
    Fr,
}

impl Locale {
    /// Get ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Pt => "pt",
            Self::En => "en",
            Self::Fr => "fr",
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pt => "Portuguese",
            Self::En => "English",
            Self::Fr => "French",
        }
    }

    /// Parse from string (case-insensitive, accepts tags like "pt-PT")
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match base_language(s).as_str() {
            "pt" | "por" | "portuguese" | "português" => Some(Self::Pt),
            "en" | "eng" | "english" => Some(Self::En),
            "fr" | "fra" | "french" | "français" => Some(Self::Fr),
            _ => None,
        }
    }

    /// Get all supported locales
    pub fn all() -> &'static [Locale] {
        &[Self::Pt, Self::En, Self::Fr]
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Map a base language to the speech-engine tag.
///
/// Fixed table: `pt` → `pt-PT` (or `pt-BR` when the preferred region is
/// `BR`), `en` → `en-US` (or `en-GB` for region `GB`), `fr` → `fr-FR`.
/// Anything unknown falls back to `en-US`.
pub fn map_to_speech_lang(base_lang: &str, preferred_region: Option<&str>) -> &'static str {
    let region = preferred_region.map(|r| r.to_ascii_uppercase());
    match base_language(base_lang).as_str() {
        "pt" => {
            if region.as_deref() == Some("BR") {
                "pt-BR"
            } else {
                "pt-PT"
            }
        }
        "en" => {
            if region.as_deref() == Some("GB") {
                "en-GB"
            } else {
                "en-US"
            }
        }
        "fr" => "fr-FR",
        _ => "en-US",
    }
}

/// Extract the lowercase base language from a BCP-47 tag ("pt-PT" → "pt").
pub fn base_language(tag: &str) -> String {
    tag.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or("")
        .to_lowercase()
}

/// A synthesis voice as reported by the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceInfo {
    /// Voice name as reported by the engine
    pub name: String,
    /// Language tag of the voice
    pub lang: String,
    /// Whether the platform marks this as its default voice
    #[serde(default)]
    pub is_default: bool,
}

impl VoiceInfo {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            is_default: false,
        }
    }
}

/// Known European Portuguese voice names.
///
/// Platforms frequently report pt voices with a bare "pt" or "pt-BR" tag even
/// when the voice itself is European Portuguese, so a name heuristic is
/// needed when an exact `pt-PT` match is absent.
const PT_PT_VOICE_MARKERS: &[&str] = &["joana", "catarina", "fernanda", "duarte", "portugal"];

/// Vendor prefixes used to spot branded voices when tags are unreliable
const VENDOR_MARKERS: &[&str] = &["google", "microsoft"];

fn normalized_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_lowercase()
}

/// Select the best available synthesis voice for a target language tag.
///
/// Priority chain:
/// 1. exact tag match;
/// 2. for `pt-PT`, a named European Portuguese variant;
/// 3. any voice with the same base language;
/// 4. a vendor-branded voice whose name mentions the target language;
/// 5. `None` — the caller must tolerate an absent voice and let the platform
///    use its default.
pub fn select_best_voice<'a>(target: &str, voices: &'a [VoiceInfo]) -> Option<&'a VoiceInfo> {
    let target_tag = normalized_tag(target);
    let target_base = base_language(target);

    if let Some(v) = voices.iter().find(|v| normalized_tag(&v.lang) == target_tag) {
        return Some(v);
    }

    if target_tag == "pt-pt" {
        if let Some(v) = voices.iter().find(|v| {
            let name = v.name.to_lowercase();
            base_language(&v.lang) == "pt" && PT_PT_VOICE_MARKERS.iter().any(|m| name.contains(m))
        }) {
            return Some(v);
        }
    }

    if let Some(v) = voices
        .iter()
        .find(|v| base_language(&v.lang) == target_base)
    {
        return Some(v);
    }

    let lang_names: &[&str] = match target_base.as_str() {
        "pt" => &["portuguese", "português"],
        "en" => &["english"],
        "fr" => &["french", "français"],
        _ => &[],
    };
    voices.iter().find(|v| {
        let name = v.name.to_lowercase();
        VENDOR_MARKERS.iter().any(|m| name.contains(m))
            && lang_names.iter().any(|n| name.contains(n))
    })
}

/// How the speech language for an utterance was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageSource {
    /// Auto-detect disabled; interface locale used
    Interface,
    /// Detection confidence below threshold; interface locale used
    Fallback,
    /// Detected language equals the interface language
    Matched,
    /// Detected language differs and was used
    Detected,
}

/// Resolved speech language for one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechLangChoice {
    /// BCP-47 tag to hand to the speech engine
    pub speech_lang: String,
    /// How the decision was made
    pub source: LanguageSource,
}

/// Result of running a language detector over free text
#[derive(Debug, Clone)]
pub struct LanguageDetection {
    /// Detected base language ("pt", "en", "fr", ...)
    pub language: String,
    /// Detection confidence in `[0, 1]`
    pub confidence: f32,
}

/// Options for [`determine_speech_language`]
#[derive(Debug, Clone)]
pub struct DetectOptions {
    /// Whether to run detection at all
    pub auto_detect: bool,
    /// Minimum confidence before trusting a detection
    pub confidence_threshold: f32,
    /// Preferred region for ambiguous base languages ("BR", "GB")
    pub preferred_region: Option<String>,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            auto_detect: true,
            confidence_threshold: 0.5,
            preferred_region: None,
        }
    }
}

/// Decide which language tag an utterance should be spoken in.
///
/// With auto-detect off this is just the interface mapping. Otherwise the
/// injected detector runs over the text: a low-confidence result falls back
/// to the interface locale, a detection that agrees with the interface is
/// reported as `Matched`, and only a confident disagreement switches the
/// spoken language. Pure; exercised directly in tests without any speech
/// engine.
pub fn determine_speech_language<F>(
    text: &str,
    interface_lang: &str,
    detect_fn: F,
    opts: &DetectOptions,
) -> SpeechLangChoice
where
    F: Fn(&str, &str) -> LanguageDetection,
{
    let interface_base = base_language(interface_lang);
    let region = opts.preferred_region.as_deref();
    let interface_tag = map_to_speech_lang(&interface_base, region);

    if !opts.auto_detect {
        return SpeechLangChoice {
            speech_lang: interface_tag.to_string(),
            source: LanguageSource::Interface,
        };
    }

    let detection = detect_fn(text, &interface_base);

    if detection.confidence < opts.confidence_threshold {
        return SpeechLangChoice {
            speech_lang: interface_tag.to_string(),
            source: LanguageSource::Fallback,
        };
    }

    let detected_base = base_language(&detection.language);
    if detected_base == interface_base {
        return SpeechLangChoice {
            speech_lang: interface_tag.to_string(),
            source: LanguageSource::Matched,
        };
    }

    SpeechLangChoice {
        speech_lang: map_to_speech_lang(&detected_base, region).to_string(),
        source: LanguageSource::Detected,
    }
}

/// Stopword-frequency language detector for PT/EN/FR.
///
/// Counts hits against small per-locale marker-word lists and scores the
/// winner by its share of the text's words. Transcription noise keeps
/// confidence well under 1.0 on short utterances, which is what the
/// threshold in [`DetectOptions`] is for.
#[derive(Debug, Default)]
pub struct LanguageDetector;

const PT_MARKERS: &[&str] = &[
    "o", "a", "os", "as", "um", "uma", "de", "do", "da", "que", "não", "sim", "para", "com",
    "criar", "projeto", "novo", "nova", "cliente", "orçamento", "amanhã", "semana", "quero",
];
const EN_MARKERS: &[&str] = &[
    "the", "a", "an", "of", "to", "and", "is", "it", "that", "for", "with", "new", "create",
    "project", "client", "budget", "tomorrow", "week", "want", "yes", "no",
];
const FR_MARKERS: &[&str] = &[
    "le", "la", "les", "un", "une", "de", "du", "des", "que", "et", "est", "pour", "avec",
    "créer", "projet", "nouveau", "nouvelle", "client", "budget", "demain", "semaine", "oui",
];

impl LanguageDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detect the base language of `text`, falling back to `fallback_base`
    /// with zero confidence when the text has no usable words.
    pub fn detect(&self, text: &str, fallback_base: &str) -> LanguageDetection {
        let words: Vec<String> = text
            .unicode_words()
            .map(|w| w.to_lowercase())
            .collect();

        if words.is_empty() {
            return LanguageDetection {
                language: fallback_base.to_string(),
                confidence: 0.0,
            };
        }

        let count = |markers: &[&str]| {
            words
                .iter()
                .filter(|w| markers.contains(&w.as_str()))
                .count()
        };

        let scores = [
            ("pt", count(PT_MARKERS)),
            ("en", count(EN_MARKERS)),
            ("fr", count(FR_MARKERS)),
        ];

        let (best_lang, best_hits) = scores
            .iter()
            .max_by_key(|(_, hits)| *hits)
            .copied()
            .unwrap_or(("en", 0));

        if best_hits == 0 {
            return LanguageDetection {
                language: fallback_base.to_string(),
                confidence: 0.0,
            };
        }

        LanguageDetection {
            language: best_lang.to_string(),
            confidence: (best_hits as f32 / words.len() as f32).min(1.0),
        }
    }
}
