//! Localized keyword catalog.
//!
//! Two priority-ordered rule tables: one for classifying user utterances and
//! one for recognising the category of already-composed response text.
//! Every concept is listed in English, Devanagari and romanized Hindi.

use regex::Regex;
use std::sync::LazyLock;

use falcon_core::types::Category;

// =============================================================================
// Priorities (highest first)
// =============================================================================

const PRIORITY_EMERGENCY: u8 = 70;
const PRIORITY_WARNING: u8 = 60;
const PRIORITY_MYTH: u8 = 50;
const PRIORITY_VACCINATION: u8 = 40;
const PRIORITY_HOSPITAL: u8 = 30;
const PRIORITY_SYMPTOM: u8 = 20;
const PRIORITY_GENERAL: u8 = 10;

// =============================================================================
// Utterance keywords
// =============================================================================

static EMERGENCY_KEYWORDS: &[&str] = &[
    "emergency",
    "ambulance",
    "chest pain",
    "heart attack",
    "stroke",
    "unconscious",
    "fainted",
    "can't breathe",
    "cant breathe",
    "cannot breathe",
    "difficulty breathing",
    "difficulty in breathing",
    "breathing difficulty",
    "trouble breathing",
    "shortness of breath",
    "short of breath",
    "not breathing",
    "severe bleeding",
    "bleeding heavily",
    "seizure",
    "suicide",
    "accident",
    "poisoning",
    // Devanagari
    "आपातकाल",
    "एम्बुलेंस",
    "सीने में दर्द",
    "सीने का दर्द",
    "छाती में दर्द",
    "दिल का दौरा",
    "बेहोश",
    "सांस नहीं आ रही",
    "सांस फूल रही",
    "सांस लेने में तकलीफ",
    "सांस लेने में दिक्कत",
    "सांस की तकलीफ",
    "लकवा",
    "खून बह रहा",
    "बहुत खून",
    "आत्महत्या",
    "दुर्घटना",
    "दौरा पड़ना",
    "जहर",
    // Romanized
    "aapatkal",
    "seene mein dard",
    "seene me dard",
    "sine me dard",
    "seene ka dard",
    "chhati me dard",
    "dil ka daura",
    "behosh",
    "saans nahi",
    "saans phool",
    "saans lene mein takleef",
    "saans lene me takleef",
    "saans lene mein dikkat",
    "saans ki takleef",
    "lakwa",
    "khoon beh raha",
    "bahut khoon",
    "aatmahatya",
    "durghatna",
];

static WARNING_KEYWORDS: &[&str] = &[
    "warning",
    "high fever",
    "severe fever",
    "persistent fever",
    "3+ days",
    "3 days fever",
    "fever for 3 days",
    "fever since 3 days",
    "fever with rash",
    "very severe",
    "severe vomiting",
    "blood in vomit",
    "vomiting blood",
    "severe diarrhea",
    "severe diarrhoea",
    "dehydration",
    "blood in stool",
    "severe headache",
    "very weak",
    // Devanagari
    "चेतावनी",
    "3 दिन से तेज बुखार",
    "3+ दिन",
    "बहुत तेज",
    "तेज बुखार",
    "लगातार बुखार",
    "बहुत उल्टी",
    "खून की उल्टी",
    "बहुत दस्त",
    "खून के दस्त",
    "पानी की कमी",
    "तेज सिरदर्द",
    "बहुत कमजोरी",
    "बुखार और दाने",
    // Romanized
    "tez bukhar",
    "tej bukhar",
    "lagatar bukhar",
    "bahut ulti",
    "khoon ki ulti",
    "bahut dast",
    "pani ki kami",
    "tez sir dard",
    "bahut kamzori",
];

static MYTH_KEYWORDS: &[&str] = &[
    "myth",
    "is it true",
    "fake news",
    "rumour",
    "rumor",
    "cure",
    "home remedy",
    "turmeric",
    "cow urine",
    "autism",
    "antibiotics for cold",
    "antibiotic for cold",
    "antibiotics for flu",
    "spreads by touch",
    // Devanagari
    "मिथक",
    "गलत जानकारी",
    "अफवाह",
    "क्या यह सच है",
    "हल्दी",
    "गौमूत्र",
    "घरेलू नुस्खा",
    "छूने से",
    "एंटीबायोटिक",
    // Romanized
    "haldi",
    "gaumutra",
    "afwah",
    "sach hai kya",
    "gharelu nuskha",
    "chhune se",
];

static VACCINATION_KEYWORDS: &[&str] = &[
    "vaccine",
    "vaccination",
    "vaccinate",
    "immunization",
    "immunisation",
    "booster",
    "polio drops",
    "find centers",
    "find centres",
    // Devanagari
    "टीका",
    "टीकाकरण",
    "वैक्सीन",
    // Romanized
    "teeka",
    "tika",
    "tikakaran",
];

static HOSPITAL_KEYWORDS: &[&str] = &[
    "hospital",
    "clinic",
    "dispensary",
    "health centre",
    "health center",
    "find doctor",
    "nearest doctor",
    "doctor near",
    "talk to a doctor",
    // Devanagari
    "अस्पताल",
    "नजदीकी",
    "क्लिनिक",
    "दवाखाना",
    "डॉक्टर से बात",
    // Romanized
    "aspatal",
    "aspataal",
    "dawakhana",
    "doctor kaha",
];

static SYMPTOM_KEYWORDS: &[&str] = &[
    "symptom",
    "1-2 days",
    "fever",
    "cough",
    "headache",
    "cold",
    "sore throat",
    "vomit",
    "nausea",
    "diarrhea",
    "diarrhoea",
    "stomach",
    "pain",
    "ache",
    "rash",
    "fatigue",
    "tired",
    "weak",
    "dizzy",
    // Devanagari
    "लक्षण",
    "बुखार",
    "खांसी",
    "सिरदर्द",
    "दर्द",
    "उल्टी",
    "दस्त",
    "पेट",
    "जुकाम",
    "कमजोरी",
    "चक्कर",
    // Romanized
    "bukhar",
    "khansi",
    "sardi",
    "jukam",
    "zukam",
    "sir dard",
    "sirdard",
    "dard",
    "ulti ho",
    "pet dard",
    "kamzori",
    "chakkar",
];

static GENERAL_KEYWORDS: &[&str] = &[
    "help",
    "hello",
    "health",
    "tips",
    "नमस्ते",
    "स्वास्थ्य",
    "namaste",
    "sehat",
];

// =============================================================================
// Response-text markers
// =============================================================================

static EMERGENCY_MARKERS: &[&str] = &["🚨", "emergency", "आपातकाल"];
static WARNING_MARKERS: &[&str] = &["⚠", "warning", "चेतावनी"];
static MYTH_MARKERS: &[&str] = &["❌", "myth", "गलत"];
static VACCINATION_MARKERS: &[&str] = &["💉", "vaccine", "टीका"];
static HOSPITAL_MARKERS: &[&str] = &["🏥", "hospital", "अस्पताल"];
static SYMPTOM_MARKERS: &[&str] = &["🌡", "🤒", "symptom", "लक्षण"];

static UTTERANCE_CATALOG: LazyLock<KeywordCatalog> = LazyLock::new(|| {
    KeywordCatalog::new(vec![
        CategoryRule::new(Category::Emergency, PRIORITY_EMERGENCY, EMERGENCY_KEYWORDS),
        CategoryRule::new(Category::Warning, PRIORITY_WARNING, WARNING_KEYWORDS),
        CategoryRule::new(Category::Myth, PRIORITY_MYTH, MYTH_KEYWORDS),
        CategoryRule::new(Category::Vaccination, PRIORITY_VACCINATION, VACCINATION_KEYWORDS),
        CategoryRule::new(Category::Hospital, PRIORITY_HOSPITAL, HOSPITAL_KEYWORDS),
        CategoryRule::new(Category::Symptom, PRIORITY_SYMPTOM, SYMPTOM_KEYWORDS),
        CategoryRule::new(Category::General, PRIORITY_GENERAL, GENERAL_KEYWORDS),
    ])
});

static RESPONSE_MARKERS: LazyLock<KeywordCatalog> = LazyLock::new(|| {
    KeywordCatalog::new(vec![
        CategoryRule::new(Category::Emergency, PRIORITY_EMERGENCY, EMERGENCY_MARKERS),
        CategoryRule::new(Category::Warning, PRIORITY_WARNING, WARNING_MARKERS),
        CategoryRule::new(Category::Myth, PRIORITY_MYTH, MYTH_MARKERS),
        CategoryRule::new(Category::Vaccination, PRIORITY_VACCINATION, VACCINATION_MARKERS),
        CategoryRule::new(Category::Hospital, PRIORITY_HOSPITAL, HOSPITAL_MARKERS),
        CategoryRule::new(Category::Symptom, PRIORITY_SYMPTOM, SYMPTOM_MARKERS),
    ])
});

// =============================================================================
// CategoryRule
// =============================================================================

/// One catalog entry: a category, its priority and its keyword set.
///
/// Keywords are stored lower-cased and compiled into a single
/// case-insensitive alternation of escaped literals, so a rule matches when
/// any keyword occurs anywhere in the text.
pub struct CategoryRule {
    pub category: Category,
    pub priority: u8,
    keywords: Vec<String>,
    matcher: Regex,
}

impl CategoryRule {
    /// Build a rule. `keywords` must be non-empty.
    pub fn new(category: Category, priority: u8, keywords: &[&str]) -> Self {
        assert!(!keywords.is_empty(), "catalog rule for {} has no keywords", category);
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        let alts: Vec<String> = keywords.iter().map(|k| regex::escape(k)).collect();
        let matcher = Regex::new(&format!(r"(?i)(?:{})", alts.join("|")))
            .expect("Invalid catalog keyword regex");
        Self {
            category,
            priority,
            keywords,
            matcher,
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Whether any keyword occurs in the (already normalized) text.
    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }

    /// Every keyword of this rule contained in the (already normalized) text.
    pub fn matching_keywords<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.keywords
            .iter()
            .filter(move |k| text.contains(k.as_str()))
            .map(String::as_str)
    }
}

// =============================================================================
// KeywordCatalog
// =============================================================================

/// A rule table ordered by descending priority.
pub struct KeywordCatalog {
    rules: Vec<CategoryRule>,
}

impl KeywordCatalog {
    /// Build a catalog. Rules are sorted by descending priority.
    pub fn new(mut rules: Vec<CategoryRule>) -> Self {
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { rules }
    }

    /// The shared table used to classify user utterances.
    pub fn utterances() -> &'static KeywordCatalog {
        &UTTERANCE_CATALOG
    }

    /// The shared table used to infer the category of composed reply text.
    pub fn response_markers() -> &'static KeywordCatalog {
        &RESPONSE_MARKERS
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Category of the highest-priority rule that matches, if any.
    pub fn first_match(&self, text: &str) -> Option<Category> {
        self.rules
            .iter()
            .find(|rule| rule.is_match(text))
            .map(|rule| rule.category)
    }

    pub fn rule_for(&self, category: Category) -> Option<&CategoryRule> {
        self.rules.iter().find(|rule| rule.category == category)
    }
}
