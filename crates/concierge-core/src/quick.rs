//! Canned quick prompts

/// Prompts offered as one-key shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuickPrompt {
    Morning,
    Budget,
    Family,
}

impl QuickPrompt {
    /// Every prompt in display order
    pub const ALL: [QuickPrompt; 3] = [QuickPrompt::Morning, QuickPrompt::Budget, QuickPrompt::Family];

    /// Text placed in the input buffer and sent
    pub fn text(&self) -> &'static str {
        match self {
            QuickPrompt::Morning => "Recommend 3 morning activities",
            QuickPrompt::Budget => "Budget friendly things to do",
            QuickPrompt::Family => "Kid friendly ideas",
        }
    }

    /// Short button label
    pub fn label(&self) -> &'static str {
        match self {
            QuickPrompt::Morning => "Morning",
            QuickPrompt::Budget => "Budget",
            QuickPrompt::Family => "Family",
        }
    }

    /// Look up a prompt by label, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(name.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(QuickPrompt::from_name("morning"), Some(QuickPrompt::Morning));
        assert_eq!(QuickPrompt::from_name(" FAMILY "), Some(QuickPrompt::Family));
        assert_eq!(QuickPrompt::from_name("brunch"), None);
    }

    #[test]
    fn test_texts_are_distinct() {
        let texts: std::collections::HashSet<_> = QuickPrompt::ALL.iter().map(|p| p.text()).collect();
        assert_eq!(texts.len(), QuickPrompt::ALL.len());
    }
}
