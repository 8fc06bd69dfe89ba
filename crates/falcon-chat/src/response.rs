//! Bilingual reply templates and structured response resolution.
//!
//! Composes a [`ResponsePayload`] from a category and its escalation without
//! any model call. The user's raw text is never interpolated.

use falcon_core::config::EmergencyConfig;
use falcon_core::types::{Button, Category, ResponsePayload};

use crate::error::ChatError;
use crate::escalation::{Escalation, RequiredAction};

// =============================================================================
// Templates
// =============================================================================

/// Static reply body. `{ambulance}` and `{emergency}` in `text` are replaced
/// with the configured numbers.
struct Template {
    text: &'static str,
    buttons: &'static [(&'static str, &'static str)],
    suggestions: &'static [&'static str],
}

const FIND_HOSPITAL_TITLE: &str = "🏥 Find Hospital / नजदीकी अस्पताल";
const FIND_HOSPITAL_PAYLOAD: &str = "find hospital";

static EMERGENCY: Template = Template {
    text: "🚨 **EMERGENCY / आपातकाल**\n\n\
           This may be life-threatening. Act now:\n\
           📞 Call {ambulance} for an ambulance\n\
           📞 Call {emergency} for emergency services\n\
           🏥 Go to the nearest hospital\n\n\
           **तुरंत करें:**\n\
           📞 एम्बुलेंस के लिए {ambulance} पर कॉल करें\n\
           📞 आपातकालीन सेवा के लिए {emergency} पर कॉल करें\n\
           🏥 नजदीकी अस्पताल जाएं\n\n\
           Do not wait for it to pass. / इंतजार न करें।",
    buttons: &[],
    suggestions: &[],
};

static WARNING: Template = Template {
    text: "⚠️ **Warning Signs / चेतावनी**\n\n\
           These symptoms need a doctor's attention today:\n\
           • Get checked at a hospital or clinic\n\
           • Keep drinking fluids and ORS\n\
           • Call {ambulance} if things get worse\n\n\
           **ध्यान दें:**\n\
           • आज ही डॉक्टर को दिखाएं\n\
           • पानी और ओआरएस पीते रहें\n\
           • हालत बिगड़े तो {ambulance} पर कॉल करें",
    buttons: &[],
    suggestions: &[],
};

static MYTH: Template = Template {
    text: "❌ **Myth Detection Alert**\n\n\
           This sounds like health misinformation.\n\n\
           **सावधान:**\n\
           • केवल डॉक्टर की सलाह मानें\n\
           • घरेलू नुस्खों पर भरोसा न करें\n\
           • सरकारी स्रोतों से जानकारी लें\n\n\
           **Trust only:**\n\
           • Government health sources\n\
           • Licensed doctors",
    buttons: &[
        ("Find Doctor", "find doctor"),
        ("Government Info", "government health info"),
    ],
    suggestions: &[],
};

static VACCINATION: Template = Template {
    text: "💉 **Vaccination Information / टीकाकरण**\n\n\
           I can help you find:\n\
           • COVID vaccine centers\n\
           • Child vaccination schedule\n\
           • Nearby vaccination facilities\n\n\
           **टीकाकरण की जानकारी:**\n\
           • कोविड वैक्सीन केंद्र\n\
           • बच्चों का टीकाकरण\n\
           • पास के केंद्र",
    buttons: &[],
    suggestions: &["COVID vaccine", "Child vaccines", "Find centers"],
};

static HOSPITAL: Template = Template {
    text: "🏥 **Find a Hospital / नजदीकी अस्पताल**\n\n\
           • Government hospitals and PHCs treat you free of cost\n\
           • Carry an ID and any old prescriptions\n\
           • For an ambulance call {ambulance}\n\n\
           **अस्पताल खोजें:**\n\
           • सरकारी अस्पताल में मुफ्त इलाज\n\
           • पहचान पत्र और पुरानी पर्चियां साथ रखें\n\
           • एम्बुलेंस के लिए {ambulance} पर कॉल करें",
    buttons: &[],
    suggestions: &["Nearest clinic", "Government hospitals"],
};

static SYMPTOM: Template = Template {
    text: "🌡️ **Symptom Check / लक्षण जांच**\n\n\
           I understand you are not feeling well. Let me help:\n\
           • How long have you had this?\n\
           • Is it mild or severe?\n\
           • Any other problems?\n\n\
           **लक्षण की जांच:**\n\
           • कब से परेशानी है?\n\
           • हल्की है या तेज?\n\
           • और कोई परेशानी?",
    buttons: &[
        ("1-2 days / 1-2 दिन", "1-2 days"),
        ("3+ days / 3+ दिन", "3+ days"),
        ("Very severe / बहुत तेज", "very severe"),
    ],
    suggestions: &[],
};

static GENERAL: Template = Template {
    text: "मैं FalconCare हूं। मैं इन चीजों में मदद कर सकता हूं:\n\n\
           🤒 **Symptoms** - बुखार, खांसी, दर्द\n\
           💉 **Vaccines** - टीकाकरण की जानकारी\n\
           🏥 **Hospitals** - नजदीकी अस्पताल\n\
           🚨 **Emergency** - आपातकालीन मदद\n\
           ❌ **Myth Check** - गलत जानकारी की पहचान\n\n\
           What's your health concern? / आपकी क्या समस्या है?",
    buttons: &[
        ("🤒 Check Symptoms", "I have symptoms"),
        ("💉 Vaccination", "vaccination info"),
        ("🏥 Find Hospital", "find hospital"),
        ("🚨 Emergency", "emergency help"),
    ],
    suggestions: &[],
};

const GREETING_TEXT: &str = "🙏 नमस्ते! मैं FalconCare हूं - आपका डिजिटल स्वास्थ्य सहायक।\n\n\
     I can help you with:\n\
     • 🤒 Symptom checking (लक्षण जांच)\n\
     • 💉 Vaccination info (टीकाकरण)\n\
     • 🏥 Find hospitals (अस्पताल खोजें)\n\
     • 🚨 Emergency help (आपातकाल)\n\
     • ❌ Myth-busting (गलत जानकारी की पहचान)\n\n\
     How can I help you today? / आज मैं आपकी कैसे मदद करूं?";

const APOLOGY_TEXT: &str = "😔 Sorry, I couldn't process that right now. Please try again.\n\
     माफ़ कीजिए, अभी जवाब नहीं दे पाया। कृपया फिर से कोशिश करें।\n\n\
     If this is urgent, call {ambulance}.";

fn template(category: Category) -> Option<&'static Template> {
    match category {
        Category::Emergency => Some(&EMERGENCY),
        Category::Warning => Some(&WARNING),
        Category::Myth => Some(&MYTH),
        Category::Vaccination => Some(&VACCINATION),
        Category::Hospital => Some(&HOSPITAL),
        Category::Symptom => Some(&SYMPTOM),
        Category::General => Some(&GENERAL),
        Category::Greeting | Category::Fallback => None,
    }
}

// =============================================================================
// ResponseResolver
// =============================================================================

/// Turns a category and its escalation into a structured reply.
#[derive(Debug, Clone)]
pub struct ResponseResolver {
    emergency: EmergencyConfig,
}

impl ResponseResolver {
    pub fn new(emergency: &EmergencyConfig) -> Self {
        Self {
            emergency: emergency.sanitized(),
        }
    }

    /// Resolve the reply for `category`.
    ///
    /// Escalation buttons come first in policy order, then the template's own
    /// buttons. Buttons with a payload already present are dropped, as are
    /// repeated suggestions. The utterance is never echoed.
    pub fn resolve(
        &self,
        category: Category,
        escalation: &Escalation,
        _utterance: &str,
    ) -> Result<ResponsePayload, ChatError> {
        let template = template(category).ok_or(ChatError::TemplateMissing(category))?;

        let mut buttons: Vec<Button> = Vec::new();
        let policy_buttons = escalation.actionable().filter_map(action_button);
        let template_buttons = template
            .buttons
            .iter()
            .map(|(title, payload)| Button::new(*title, *payload));
        for button in policy_buttons.chain(template_buttons) {
            if !buttons.iter().any(|b| b.payload == button.payload) {
                buttons.push(button);
            }
        }

        let mut suggestions: Vec<String> = Vec::new();
        for suggestion in escalation
            .suggestions()
            .chain(template.suggestions.iter().copied())
        {
            if !suggestions.iter().any(|s| s == suggestion) {
                suggestions.push(suggestion.to_string());
            }
        }

        Ok(ResponsePayload::new(self.fill(template.text), category)
            .with_buttons(buttons)
            .with_suggestions(suggestions))
    }

    /// The welcome message that seeds every transcript.
    pub fn greeting(&self) -> ResponsePayload {
        ResponsePayload::new(GREETING_TEXT, Category::Greeting)
    }

    /// Static reply used when local synthesis itself fails.
    pub fn apology(&self) -> ResponsePayload {
        ResponsePayload::new(self.fill(APOLOGY_TEXT), Category::Fallback)
    }

    fn fill(&self, text: &str) -> String {
        text.replace("{ambulance}", &self.emergency.ambulance_number)
            .replace("{emergency}", &self.emergency.emergency_number)
    }
}

fn action_button(action: &RequiredAction) -> Option<Button> {
    match action {
        RequiredAction::Dial { number } => Some(Button::dial(format!("📞 Call {}", number), number)),
        RequiredAction::FindHospital => Some(Button::new(FIND_HOSPITAL_TITLE, FIND_HOSPITAL_PAYLOAD)),
        RequiredAction::Suggest(_) => None,
    }
}
