//! Chat intent classification
//!
//! Decides whether a chat message asks for a new render or for advice.

/// Words that signal the client wants the image changed
pub const IMAGE_KEYWORDS: &[&str] = &[
    "generate", "change", "add", "remove", "replace", "make it", "show me", "update", "put", "plant",
];

/// What a chat message is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Produce a new render from the original photo
    ModifyImage,
    /// Answer in text about the current render
    Advice,
}

impl Intent {
    /// Classify by case-insensitive substring match against [`IMAGE_KEYWORDS`]
    ///
    /// Substring matching means "address" counts as "add" and "planted" as
    /// "plant"; the false positive costs a render, never a lost request.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if IMAGE_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
            Intent::ModifyImage
        } else {
            Intent::Advice
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_modify_requests() {
        assert_eq!(Intent::classify("Add a fire pit"), Intent::ModifyImage);
        assert_eq!(Intent::classify("please REMOVE the bushes"), Intent::ModifyImage);
        assert_eq!(Intent::classify("Show me it with roses"), Intent::ModifyImage);
        assert_eq!(Intent::classify("Make it more colorful"), Intent::ModifyImage);
    }

    #[test]
    fn test_advice_requests() {
        assert_eq!(Intent::classify("Why did you choose boxwood?"), Intent::Advice);
        assert_eq!(Intent::classify("Is this drought tolerant?"), Intent::Advice);
        // "make the" is not "make it"
        assert_eq!(Intent::classify("Can you make the patio bigger?"), Intent::Advice);
        assert_eq!(Intent::classify(""), Intent::Advice);
    }

    #[test]
    fn test_substring_matches() {
        assert_eq!(Intent::classify("What's the address of your nursery?"), Intent::ModifyImage);
        assert_eq!(Intent::classify("Which shrubs are planted there?"), Intent::ModifyImage);
    }

    proptest! {
        #[test]
        fn keyword_anywhere_means_modify(prefix in ".{0,20}", suffix in ".{0,20}", idx in 0..IMAGE_KEYWORDS.len()) {
            let message = format!("{}{}{}", prefix, IMAGE_KEYWORDS[idx].to_uppercase(), suffix);
            prop_assert_eq!(Intent::classify(&message), Intent::ModifyImage);
        }

        #[test]
        fn vowel_free_text_is_advice(message in "[b-df-hj-np-tv-zB-DF-HJ-NP-TV-Z0-9 ?!.,]{0,40}") {
            // Every keyword contains a vowel
            prop_assert_eq!(Intent::classify(&message), Intent::Advice);
        }
    }
}
