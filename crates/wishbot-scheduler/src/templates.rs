//! Greeting templates.
//!
//! Two fixed sets: English for the primary audience and Hindi for people
//! above the age threshold. Placeholders: `{name}`, `{sender_name}`,
//! `{sender_number}`.

use rand::Rng;
use rand::seq::SliceRandom;
use wishbot_core::config::TemplateConfig;
use wishbot_core::types::SenderIdentity;

pub const PRIMARY_TEMPLATES: &[&str] = &[
    "🎉 Happy Birthday, श्री {name} जी! 🎂\n\nWishing you a day filled with happiness and positivity. Hope the year ahead is fantastic. 🎈\n\n--{sender_name} ({sender_number})",
    "🌟 Happy Birthday, श्री {name} जी! 🎊\n\nMay your special day bring enduring joy and memorable moments. Here's to another remarkable year ahead! 🥳\n\n--{sender_name} ({sender_number})",
    "🎂 Warmest wishes on your special day, श्री {name} जी! 🎉\n\nWishing you every success and happiness in the coming year. May your ambitions continue to soar. 🎁\n\n--{sender_name} ({sender_number})",
    "🎈 Happy Birthday, श्री {name} जी! 🌈\n\nMay laughter and good health accompany you today and always. Wishing you happiness and fulfillment throughout the year! 🥳\n\n--{sender_name} ({sender_number})",
    "🎊 Wishing you a truly happy birthday, श्री {name} जी! 🎂\n\nMay this year be filled with rewarding experiences and cherished moments. You deserve the very best each day. 🎉\n\n--{sender_name} ({sender_number})",
    "🎁 Happy Birthday, श्री {name} जी! 🎈\n\nSending you heartfelt wishes for growth and happiness. May this year bring you closer to your aspirations. 🥳\n\n--{sender_name} ({sender_number})",
    "🌺 Warm birthday greetings to someone exceptional, श्री {name} जी! 🎂\n\nMay your year ahead be filled with achievements and bright opportunities. 🎉\n\n--{sender_name} ({sender_number})",
];

pub const SECONDARY_TEMPLATES: &[&str] = &[
    "🎉 जन्मदिन मुबारक हो, श्री {name} जी! 🎂\n\nआपका दिन खुशियों और सकारात्मकता से भरा हो। आशा है आने वाला साल आपके लिए शानदार रहेगा। 🎈\n\n--{sender_name} ({sender_number})",
    "🌟 जन्मदिन की शुभकामनाएँ, श्री {name} जी! 🎊\n\nयह खास दिन आपके लिए खुशियाँ और सुंदर यादें लेकर आए। आपके जीवन के एक और अद्भुत वर्ष के लिए शुभकामनाएँ! 🥳\n\n--{sender_name} ({sender_number})",
    "🎂 आपके खास दिन पर हार्दिक शुभकामनाएँ, श्री {name} जी! 🎉\n\nआने वाले साल में आपको सफलता और खुशी मिले। आपके सपने और भी ऊँचे हों। 🎁\n\n--{sender_name} ({sender_number})",
    "🎈 जन्मदिन मुबारक हो, श्री {name} जी! 🌈\n\nहँसी और अच्छे स्वास्थ्य का साथ हमेशा आपके साथ रहे। नए साल में आपको आनंद और उपलब्धियों की शुभकामनाएँ! 🥳\n\n--{sender_name} ({sender_number})",
    "🎁 जन्मदिन मुबारक हो, श्री {name} जी! 🎈\n\nआपको खुशियों व उन्नति की शुभकामनाएँ। आने वाला साल आपके लक्ष्य के और करीब लाए। 🥳\n\n--{sender_name} ({sender_number})",
];

/// Which template set a greeting was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSet {
    Primary,
    Secondary,
}

impl std::fmt::Display for TemplateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateSet::Primary => write!(f, "English"),
            TemplateSet::Secondary => write!(f, "Hindi"),
        }
    }
}

/// The two template sets plus the age threshold that chooses between them.
#[derive(Debug, Clone)]
pub struct TemplateBook {
    primary: Vec<String>,
    secondary: Vec<String>,
    age_threshold: i32,
}

impl Default for TemplateBook {
    fn default() -> Self {
        Self {
            primary: PRIMARY_TEMPLATES.iter().map(|s| s.to_string()).collect(),
            secondary: SECONDARY_TEMPLATES.iter().map(|s| s.to_string()).collect(),
            age_threshold: 40,
        }
    }
}

impl TemplateBook {
    /// Built-in sets, replaced by any non-empty configured set.
    pub fn from_config(config: &TemplateConfig, age_threshold: i32) -> Self {
        let mut book = Self::default().with_age_threshold(age_threshold);
        if !config.primary.is_empty() {
            book.primary = config.primary.clone();
        }
        if !config.secondary.is_empty() {
            book.secondary = config.secondary.clone();
        }
        book
    }

    pub fn with_age_threshold(mut self, age_threshold: i32) -> Self {
        self.age_threshold = age_threshold;
        self
    }

    pub fn age_threshold(&self) -> i32 {
        self.age_threshold
    }

    pub fn set_for_age(&self, age: i32) -> TemplateSet {
        if age > self.age_threshold {
            TemplateSet::Secondary
        } else {
            TemplateSet::Primary
        }
    }

    pub fn templates(&self, set: TemplateSet) -> &[String] {
        match set {
            TemplateSet::Primary => &self.primary,
            TemplateSet::Secondary => &self.secondary,
        }
    }

    /// Draw a template uniformly at random from the set matching `age`.
    pub fn pick<R: Rng + ?Sized>(&self, age: i32, rng: &mut R) -> (TemplateSet, &str) {
        let set = self.set_for_age(age);
        let template = self
            .templates(set)
            .choose(rng)
            .map(String::as_str)
            .unwrap_or("🎉 Happy Birthday, {name}!\n\n--{sender_name} ({sender_number})");
        (set, template)
    }
}

/// Fill in a template.
pub fn render(template: &str, name: &str, sender: &SenderIdentity) -> String {
    template
        .replace("{name}", name)
        .replace("{sender_name}", &sender.name)
        .replace("{sender_number}", &sender.number)
}
