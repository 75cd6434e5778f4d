// src/find_replace.rs

use crate::error::Result;
use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Options of a find / replace request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFlags {
    pub match_case: bool,
    /// The whole text has to equal the pattern.
    pub whole_word: bool,
    /// `*` and `?` in the pattern act as wildcards.
    pub wildcards: bool,
    pub regex: bool,
    pub wrap: bool,
    pub search_down: bool,
    /// Search every component field, not only reference and value.
    pub search_all_fields: bool,
    pub search_all_pins: bool,
    pub current_sheet_only: bool,
    pub replace_references: bool,
}

impl Default for SearchFlags {
    fn default() -> Self {
        SearchFlags {
            match_case: false,
            whole_word: false,
            wildcards: false,
            regex: false,
            wrap: true,
            search_down: true,
            search_all_fields: false,
            search_all_pins: false,
            current_sheet_only: false,
            replace_references: false,
        }
    }
}

impl SearchFlags {
    /// Flags that change which items match; wrap and direction only affect navigation.
    fn compare_key(&self) -> SearchFlags {
        SearchFlags {
            wrap: false,
            search_down: false,
            ..*self
        }
    }
}

/// Search criteria of the find / replace collector.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FindReplaceData {
    pub find_string: String,
    pub replace_string: String,
    pub flags: SearchFlags,
}

impl FindReplaceData {
    pub fn new(find: &str) -> Self {
        FindReplaceData {
            find_string: find.to_string(),
            ..Default::default()
        }
    }

    pub fn with_replace(mut self, replace: &str) -> Self {
        self.replace_string = replace.to_string();
        self
    }

    pub fn with_flags(mut self, flags: SearchFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_wrapping(&self) -> bool {
        self.flags.wrap
    }

    /// True when `other` would produce a different set of matches.
    pub fn changes_compare(&self, other: &FindReplaceData) -> bool {
        self.find_string != other.find_string
            || self.flags.compare_key() != other.flags.compare_key()
    }

    pub fn matcher(&self) -> Result<TextMatcher> {
        TextMatcher::new(self)
    }
}

/// Compiled form of the criteria used to test and rewrite item text.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    regex: Regex,
    replace: String,
    expand_groups: bool,
    flags: SearchFlags,
}

impl TextMatcher {
    pub fn new(data: &FindReplaceData) -> Result<Self> {
        let body = if data.flags.regex {
            data.find_string.clone()
        } else if data.flags.wildcards {
            wildcard_to_regex(&data.find_string)
        } else {
            regex::escape(&data.find_string)
        };
        let pattern = if data.flags.whole_word {
            format!("^(?:{})$", body)
        } else {
            body
        };
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(!data.flags.match_case)
            .build()?;

        Ok(TextMatcher {
            regex,
            replace: data.replace_string.clone(),
            expand_groups: data.flags.regex,
            flags: data.flags,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Replace the first match in `text`, `None` when nothing matches.
    pub fn replace(&self, text: &str) -> Option<String> {
        if !self.regex.is_match(text) {
            return None;
        }
        let replaced = if self.expand_groups {
            self.regex.replacen(text, 1, self.replace.as_str())
        } else {
            self.regex.replacen(text, 1, NoExpand(&self.replace))
        };
        Some(replaced.into_owned())
    }

    pub fn search_all_pins(&self) -> bool {
        self.flags.search_all_pins
    }

    pub fn search_all_fields(&self) -> bool {
        self.flags.search_all_fields
    }

    pub fn replace_references(&self) -> bool {
        self.flags.replace_references
    }
}

fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out
}
