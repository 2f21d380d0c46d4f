//! Prompt construction for the magazine editor model.
//!
//! Two static tables drive everything here:
//!
//! 1. [`CONTENT_TYPE_KEYWORDS`] — coarse topical labels detected by keyword
//!    presence in the extracted text.
//! 2. [`SUGGESTED_SECTIONS`] — section headings suggested to the model for
//!    each detected label.
//!
//! Adding a label or a section is a one-line table edit; no branch in
//! [`build_prompt`] knows about individual labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse topical label of the input text. Only shapes the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Sports,
    Academic,
    Cultural,
    Infrastructure,
    Events,
    /// Returned alone when no other label matches.
    General,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Sports => "sports",
            ContentType::Academic => "academic",
            ContentType::Cultural => "cultural",
            ContentType::Infrastructure => "infrastructure",
            ContentType::Events => "events",
            ContentType::General => "general",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keywords per content type. Matching is a case-insensitive substring test.
pub static CONTENT_TYPE_KEYWORDS: &[(ContentType, &[&str])] = &[
    (
        ContentType::Sports,
        &["sports", "tournament", "championship", "medal", "athlete", "competition"],
    ),
    (
        ContentType::Academic,
        &["academic", "achievement", "scholarship", "cgpa", "research", "publication"],
    ),
    (
        ContentType::Cultural,
        &["cultural", "festival", "music", "dance", "drama", "art", "performance"],
    ),
    (
        ContentType::Infrastructure,
        &["infrastructure", "facility", "laboratory", "building", "construction"],
    ),
    (
        ContentType::Events,
        &["event", "conference", "seminar", "workshop", "celebration"],
    ),
];

/// Section headings suggested to the model per content type.
pub static SUGGESTED_SECTIONS: &[(ContentType, &[&str])] = &[
    (
        ContentType::Sports,
        &[
            "Event Overview (date, location, participants, theme)",
            "Competition Results (actual results from the content)",
            "Achievements & Winners (medals, championships, records)",
            "Event Highlights (key moments, special features)",
            "Participant Feedback (testimonials from students/faculty)",
            "Future Plans (mentioned future developments)",
        ],
    ),
    (
        ContentType::Academic,
        &[
            "Academic Excellence (top performers, CGPA, awards)",
            "Student Achievements (projects, research, publications)",
            "Department Highlights (placement rates, patents, facilities)",
            "Scholarships & Awards (financial support, merit scholarships)",
            "Faculty Achievements (research papers, awards)",
            "Upcoming Events (mentioned future activities)",
        ],
    ),
    (
        ContentType::Cultural,
        &[
            "Event Overview",
            "Competition Results",
            "Performances & Highlights",
            "Organizing Team",
            "Participant Feedback",
            "Future Events",
        ],
    ),
    (
        ContentType::Infrastructure,
        &[
            "New Facilities",
            "Infrastructure Updates",
            "Technology Enhancements",
            "Future Developments",
            "Impact on Students",
        ],
    ),
];

/// Detect content types by keyword presence.
///
/// Labels come back in table order; `[General]` when nothing matches.
pub fn detect_content_types(text: &str) -> Vec<ContentType> {
    let lower = text.to_lowercase();
    let detected: Vec<ContentType> = CONTENT_TYPE_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(ct, _)| *ct)
        .collect();

    if detected.is_empty() {
        vec![ContentType::General]
    } else {
        detected
    }
}

/// Editorial rules shared by every prompt.
pub const EDITORIAL_RULES: &str = r#"CRITICAL INSTRUCTIONS:
1. Create an appropriate magazine title based on the content
2. Extract and organize ONLY the information provided in the input - do not add external information
3. Structure the content into logical sections based on the detected content types
4. Use bullet points for lists and achievements
5. Keep the language engaging and professional
6. Fix any typos in the original content (e.g., 'Winers' → 'Winners', 'gamings' → 'gaming')
7. Maintain accuracy - if something isn't mentioned, don't add it
8. Focus on the actual events, achievements, and details from the provided content"#;

/// Formatting rules and the reply layout the section parser understands.
pub const OUTPUT_FORMAT: &str = r#"FORMATTING RULES:
- Use proper capitalization and punctuation
- Correct spelling errors from the original content
- Organize information chronologically or by importance
- Use clear section headers
- Keep the content concise but comprehensive
- End with a positive conclusion based on the actual content

OUTPUT FORMAT: Create a well-structured magazine article that accurately reflects ONLY the provided content. Use this exact format, with every header on its own line wrapped in double asterisks:

**[Magazine Title containing the word Magazine]**

**[Section Header 1]**
[Content for section 1, one paragraph or bullet point per line]

**[Section Header 2]**
[Content for section 2]

**Conclusion**
[Final thoughts]"#;

/// Build the instruction prompt sent to the model.
///
/// # Arguments
/// * `content`       — combined extracted text of all inputs
/// * `content_types` — output of [`detect_content_types`]
/// * `file_names`    — base names of the input files, in command-line order
pub fn build_prompt(content: &str, content_types: &[ContentType], file_names: &[String]) -> String {
    let types = content_types
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = format!(
        "Please analyze the following content from files: {}\n\n\
         CONTENT TO ANALYZE:\n{}\n\n\
         DETECTED CONTENT TYPES: {}\n\n\
         {}\n\n\
         REQUIRED SECTIONS:",
        file_names.join(", "),
        content,
        types,
        EDITORIAL_RULES,
    );

    for (ct, sections) in SUGGESTED_SECTIONS {
        if content_types.contains(ct) {
            for section in *sections {
                prompt.push_str("\n- ");
                prompt.push_str(section);
            }
        }
    }

    prompt.push_str("\n\n");
    prompt.push_str(OUTPUT_FORMAT);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_multiple_types_in_table_order() {
        let text = "The Annual Sports Meet featured a dance performance and a research SEMINAR.";
        assert_eq!(
            detect_content_types(text),
            vec![
                ContentType::Sports,
                ContentType::Academic,
                ContentType::Cultural,
                ContentType::Events,
            ]
        );
    }

    #[test]
    fn falls_back_to_general() {
        assert_eq!(
            detect_content_types("Minutes of the budget meeting."),
            vec![ContentType::General]
        );
        assert_eq!(detect_content_types(""), vec![ContentType::General]);
    }

    #[test]
    fn keyword_match_is_substring() {
        // "smart" contains "art"
        assert_eq!(detect_content_types("smart"), vec![ContentType::Cultural]);
    }

    #[test]
    fn prompt_lists_sections_for_detected_types_only() {
        let prompt = build_prompt(
            "Gold medal at the state championship",
            &[ContentType::Sports],
            &["report.txt".to_string(), "scan.png".to_string()],
        );
        assert!(prompt.contains("files: report.txt, scan.png"));
        assert!(prompt.contains("DETECTED CONTENT TYPES: sports"));
        assert!(prompt.contains("- Competition Results"));
        assert!(!prompt.contains("- New Facilities"));
        assert!(prompt.contains("Gold medal at the state championship"));
    }

    #[test]
    fn events_and_general_add_no_sections() {
        let prompt = build_prompt("x", &[ContentType::Events], &[]);
        let required = prompt
            .split("REQUIRED SECTIONS:")
            .nth(1)
            .and_then(|rest| rest.split("FORMATTING RULES:").next())
            .unwrap();
        assert!(!required.contains("\n- "), "got: {required:?}");
    }

    #[test]
    fn prompt_asks_for_asterisk_headers() {
        let prompt = build_prompt("x", &[ContentType::General], &[]);
        assert!(prompt.contains("**Conclusion**"));
    }
}
