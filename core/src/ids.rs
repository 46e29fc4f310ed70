//! # Curriculum Identifiers
//!
//! Typed forms of the identifier schemes carried in graph and progress
//! payloads. Knowledge nodes use `"<chapter>_<section>"`, a chapter test uses
//! `"<chapter>_end"`, and the progress store may also record a passed chapter
//! as `"chapter<chapter>"`. The last two denote the same milestone and parse
//! to the same [`TopicRef::ChapterTest`].
//!
//! Content-tag prefixes (`text_`, `structure_`, ...) are a separate taxonomy
//! and are modelled by [`ContentTag`]; they never decide whether a node is a
//! chapter or a knowledge node.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Chapter number, rendered as `chapter<N>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChapterId(pub u32);

impl ChapterId {
    /// Chapter number
    pub fn number(self) -> u32 {
        self.0
    }

    /// Id of this chapter's test milestone (`<N>_end`)
    pub fn test_id(self) -> String {
        format!("{}_end", self.0)
    }

    /// The chapter before this one, if any
    pub fn previous(self) -> Option<ChapterId> {
        if self.0 > 1 {
            Some(ChapterId(self.0 - 1))
        } else {
            None
        }
    }

    /// First knowledge node of this chapter
    pub fn first_section(self) -> KnowledgeId {
        KnowledgeId::new(self.0, 1)
    }

    /// Parse `chapter<N>`, `<N>_end` or a bare chapter number
    pub fn parse(raw: &str) -> Option<ChapterId> {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix("chapter") {
            return parse_positive(rest).map(ChapterId);
        }
        if let Some(rest) = raw.strip_suffix("_end") {
            return parse_positive(rest).map(ChapterId);
        }
        parse_positive(raw).map(ChapterId)
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chapter{}", self.0)
    }
}

/// Knowledge node position, rendered as `<chapter>_<section>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KnowledgeId {
    pub chapter: u32,
    pub section: u32,
}

impl KnowledgeId {
    pub fn new(chapter: u32, section: u32) -> Self {
        Self { chapter, section }
    }

    /// Owning chapter
    pub fn chapter_id(self) -> ChapterId {
        ChapterId(self.chapter)
    }

    /// Same-chapter predecessor, `None` for section 1
    pub fn previous_in_chapter(self) -> Option<KnowledgeId> {
        if self.section > 1 {
            Some(KnowledgeId::new(self.chapter, self.section - 1))
        } else {
            None
        }
    }

    pub fn is_first(self) -> bool {
        self.chapter == 1 && self.section == 1
    }
}

impl fmt::Display for KnowledgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.chapter, self.section)
    }
}

impl FromStr for KnowledgeId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chapter, section) = s.trim().split_once('_').ok_or(())?;
        let chapter = parse_positive(chapter).ok_or(())?;
        let section = parse_positive(section).ok_or(())?;
        Ok(KnowledgeId::new(chapter, section))
    }
}

/// A progression target: a knowledge node or a chapter-test milestone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopicRef {
    Knowledge(KnowledgeId),
    ChapterTest(ChapterId),
}

impl TopicRef {
    /// Parse a raw topic id; `chapterN` and `N_end` both yield a chapter test
    pub fn parse(raw: &str) -> Option<TopicRef> {
        let raw = raw.trim();
        if raw.starts_with("chapter") || raw.ends_with("_end") {
            return ChapterId::parse(raw).map(TopicRef::ChapterTest);
        }
        raw.parse::<KnowledgeId>().ok().map(TopicRef::Knowledge)
    }

    /// Normalize then parse; the entry point for ids from outside the crate
    pub fn resolve(raw: &str) -> Option<TopicRef> {
        normalize_topic_id(raw).and_then(|id| TopicRef::parse(&id))
    }

    pub fn chapter(self) -> ChapterId {
        match self {
            TopicRef::Knowledge(k) => k.chapter_id(),
            TopicRef::ChapterTest(c) => c,
        }
    }

    pub fn is_chapter_test(self) -> bool {
        matches!(self, TopicRef::ChapterTest(_))
    }

    /// Canonical id string (`c_s` or `c_end`)
    pub fn canonical(self) -> String {
        match self {
            TopicRef::Knowledge(k) => k.to_string(),
            TopicRef::ChapterTest(c) => c.test_id(),
        }
    }
}

impl fmt::Display for TopicRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Normalize a topic id as found in progress records, URLs or storage.
///
/// Hyphens become underscores, an embedded `<n>_<m>` / `<n>_end` token is
/// extracted, and `chapter<n>` becomes `<n>_end`. Anything unrecognised is
/// returned trimmed. Empty input yields `None`.
pub fn normalize_topic_id(raw: &str) -> Option<String> {
    let s = raw.trim().replace('-', "_");
    if s.is_empty() {
        return None;
    }
    if let Some(token) = extract_topic_token(&s) {
        return Some(token);
    }
    if let Some(rest) = s.strip_prefix("chapter") {
        if let Some(n) = parse_positive(rest) {
            return Some(format!("{}_end", n));
        }
    }
    Some(s)
}

/// First `<digits>_<digits|end>` token in `s`
fn extract_topic_token(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'_' {
            let rest = &s[i + 1..];
            if rest.starts_with("end") {
                return Some(format!("{}_end", &s[start..i]));
            }
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            if digits > 0 {
                return Some(format!("{}_{}", &s[start..i], &rest[..digits]));
            }
        }
    }
    None
}

fn parse_positive(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u32>().ok().filter(|n| *n > 0)
}

/// Content-tag taxonomy carried by tag-style node ids (`text_`, `js_`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentTag {
    Text,
    Structure,
    Form,
    Style,
    Media,
    Js,
}

impl ContentTag {
    const PREFIXES: [(&'static str, ContentTag); 6] = [
        ("text_", ContentTag::Text),
        ("structure_", ContentTag::Structure),
        ("form_", ContentTag::Form),
        ("style_", ContentTag::Style),
        ("media_", ContentTag::Media),
        ("js_", ContentTag::Js),
    ];

    /// Classify a node id by its content-tag prefix
    pub fn from_node_id(id: &str) -> Option<ContentTag> {
        Self::PREFIXES
            .iter()
            .find(|(prefix, _)| id.starts_with(prefix))
            .map(|(_, tag)| *tag)
    }

    pub fn prefix(self) -> &'static str {
        Self::PREFIXES
            .iter()
            .find(|(_, tag)| *tag == self)
            .map(|(prefix, _)| *prefix)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knowledge_id_parsing() {
        assert_eq!("2_3".parse::<KnowledgeId>(), Ok(KnowledgeId::new(2, 3)));
        assert!("2_end".parse::<KnowledgeId>().is_err());
        assert!("0_1".parse::<KnowledgeId>().is_err());
        assert!("text_intro".parse::<KnowledgeId>().is_err());
        assert_eq!(KnowledgeId::new(4, 2).to_string(), "4_2");
    }

    #[test]
    fn test_chapter_forms_are_equivalent() {
        assert_eq!(TopicRef::parse("chapter3"), TopicRef::parse("3_end"));
        assert_eq!(
            TopicRef::parse("chapter3"),
            Some(TopicRef::ChapterTest(ChapterId(3)))
        );
        assert_eq!(ChapterId(3).test_id(), "3_end");
        assert_eq!(ChapterId(3).to_string(), "chapter3");
        assert_eq!(TopicRef::parse("1_1"), Some(TopicRef::Knowledge(KnowledgeId::new(1, 1))));
        assert_eq!(TopicRef::parse("chapterX"), None);
    }

    #[test]
    fn test_normalize_topic_id() {
        assert_eq!(normalize_topic_id(" 3-1 ").as_deref(), Some("3_1"));
        assert_eq!(normalize_topic_id("chapter2").as_deref(), Some("2_end"));
        assert_eq!(
            normalize_topic_id("/pages/test_page.html?topic=4_end").as_deref(),
            Some("4_end")
        );
        assert_eq!(normalize_topic_id("lesson_12_3_extra").as_deref(), Some("12_3"));
        assert_eq!(normalize_topic_id("text_intro").as_deref(), Some("text_intro"));
        assert_eq!(normalize_topic_id("   "), None);
    }

    #[test]
    fn test_content_tags_are_separate_from_chapter_scheme() {
        assert_eq!(ContentTag::from_node_id("style_flex"), Some(ContentTag::Style));
        assert_eq!(ContentTag::from_node_id("js_events"), Some(ContentTag::Js));
        assert_eq!(ContentTag::from_node_id("2_1"), None);
        assert_eq!(ContentTag::from_node_id("chapter1"), None);
        assert_eq!(ContentTag::Media.prefix(), "media_");
    }
}
