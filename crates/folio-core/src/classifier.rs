//! Heuristic résumé / portfolio detection from extracted text and filenames.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Texts shorter than this (in characters) are never classified.
pub const MIN_CLASSIFIABLE_CHARS: usize = 50;

const FILENAME_CONFIDENCE: f64 = 0.8;
const TEXT_CONFIDENCE_THRESHOLD: f64 = 0.5;

const RESUME_KEYWORDS: &[&str] = &[
    "objective",
    "summary",
    "experience",
    "education",
    "skills",
    "employment",
    "work history",
    "qualifications",
    "professional summary",
    "career objective",
    "references",
    "certifications",
    "languages spoken",
];

const PORTFOLIO_KEYWORDS: &[&str] = &[
    "case study",
    "project",
    "design process",
    "user research",
    "wireframe",
    "prototype",
    "user flow",
    "information architecture",
    "usability testing",
    "persona",
    "journey map",
    "design system",
    "problem statement",
    "solution",
    "outcome",
    "impact",
];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b").expect("valid email regex")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{3}[-.\s]?\d{3}[-.\s]?\d{4}\b").expect("valid phone regex")
});

static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[•\-*]\s").expect("valid bullet regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Resume,
    Portfolio,
    Unknown,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resume => "resume",
            Self::Portfolio => "portfolio",
            Self::Unknown => "unknown",
        }
    }

    /// Human-facing label used in replies.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Resume => "résumé",
            Self::Portfolio => "portfolio",
            Self::Unknown => "document",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationResult {
    pub category: Category,
    /// Self-reported certainty in `[0, 1]`.
    pub confidence: f64,
}

impl ClassificationResult {
    const UNKNOWN: Self = Self {
        category: Category::Unknown,
        confidence: 0.0,
    };

    fn new(category: Category, confidence: f64) -> Self {
        Self {
            category,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Structural features pulled out of the text before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextSignals {
    pub resume_score: usize,
    pub portfolio_score: usize,
    pub bullet_points: usize,
    pub paragraphs: usize,
    pub has_email: bool,
    pub has_phone: bool,
}

impl TextSignals {
    #[must_use]
    pub fn scan(text: &str) -> Self {
        let lower = text.to_lowercase();
        let mut signals = Self {
            resume_score: count_terms(&lower, RESUME_KEYWORDS),
            portfolio_score: count_terms(&lower, PORTFOLIO_KEYWORDS),
            bullet_points: BULLET_RE.find_iter(text).count(),
            paragraphs: text.matches("\n\n").count(),
            has_email: EMAIL_RE.is_match(text),
            has_phone: PHONE_RE.is_match(text),
        };

        if signals.has_contact_details() {
            signals.resume_score += 3;
        }
        if signals.bullet_points > 10 {
            signals.resume_score += 2;
        }
        if signals.paragraphs > 5 {
            signals.portfolio_score += 2;
        }
        signals
    }

    #[must_use]
    pub fn has_contact_details(&self) -> bool {
        self.has_email && self.has_phone
    }
}

fn count_terms(haystack: &str, terms: &[&str]) -> usize {
    terms.iter().filter(|t| haystack.contains(*t)).count()
}

/// Classify `text` on keyword and structure signals alone.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn classify_text(text: &str) -> ClassificationResult {
    if text.chars().count() < MIN_CLASSIFIABLE_CHARS {
        return ClassificationResult::UNKNOWN;
    }

    let signals = TextSignals::scan(text);
    let total = signals.resume_score + signals.portfolio_score;
    if total == 0 {
        return ClassificationResult::UNKNOWN;
    }

    let ratio = |score: usize| (score as f64 / total as f64).min(1.0);

    match signals.resume_score.cmp(&signals.portfolio_score) {
        std::cmp::Ordering::Greater => {
            ClassificationResult::new(Category::Resume, ratio(signals.resume_score))
        }
        std::cmp::Ordering::Less => {
            ClassificationResult::new(Category::Portfolio, ratio(signals.portfolio_score))
        }
        std::cmp::Ordering::Equal => {
            if signals.has_contact_details() {
                ClassificationResult::new(Category::Resume, 0.5)
            } else if signals.paragraphs > signals.bullet_points {
                ClassificationResult::new(Category::Portfolio, 0.5)
            } else {
                ClassificationResult::new(Category::Unknown, 0.3)
            }
        }
    }
}

/// Guess the category from the upload's filename.
#[must_use]
pub fn classify_filename(filename: &str) -> ClassificationResult {
    let lower = filename.to_lowercase();
    if lower.contains("resume") || lower.contains("cv") {
        ClassificationResult::new(Category::Resume, FILENAME_CONFIDENCE)
    } else if lower.contains("portfolio") {
        ClassificationResult::new(Category::Portfolio, FILENAME_CONFIDENCE)
    } else {
        ClassificationResult::UNKNOWN
    }
}

/// Combine filename and text signals into a single decision.
///
/// When neither signal is usable the result falls back to `Portfolio`.
#[must_use]
pub fn classify(text: &str, filename: &str) -> ClassificationResult {
    let by_name = classify_filename(filename);
    let by_text = classify_text(text);

    tracing::debug!(
        filename_category = %by_name.category,
        filename_confidence = by_name.confidence,
        text_category = %by_text.category,
        text_confidence = by_text.confidence,
        "classification signals"
    );

    if by_name.confidence >= FILENAME_CONFIDENCE {
        by_name
    } else if by_text.confidence >= TEXT_CONFIDENCE_THRESHOLD {
        by_text
    } else if by_name.confidence > 0.0 && by_text.category == by_name.category {
        by_name
    } else if by_text.confidence > by_name.confidence {
        by_text
    } else if by_text.category == Category::Unknown {
        ClassificationResult::new(Category::Portfolio, by_text.confidence)
    } else {
        by_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME_TEXT: &str = "John Doe\njohn.doe@email.com | 555-123-4567\n\nOBJECTIVE\n\
Seeking entry-level UX Designer position\n\nEXPERIENCE\nUX Design Intern - Company A\n\
- Created wireframes in Figma\n- Conducted user interviews\n\nEDUCATION\n\
BS in Human-Computer Interaction\n\nSKILLS\nFigma, Adobe XD, User Research, Usability Testing\n";

    const PORTFOLIO_TEXT: &str = "Case Study: E-commerce Redesign\n\nProblem Statement\n\
Users were abandoning their shopping carts at a 60% rate.\n\nUser Research\n\
Conducted interviews with 15 users and usability testing sessions.\n\
Created personas based on research findings.\n\nDesign Process\n\
1. Information architecture review\n2. Wireframing and prototyping\n\
3. Iterative design with user feedback\n4. Usability testing\n\nSolution\n\
Redesigned checkout flow with clear progress indicators\n\nOutcome\n\
Reduced cart abandonment by 40%\nIncreased conversion rate by 25%\n";

    #[test]
    fn short_text_is_unknown() {
        let r = classify_text("Experience, education, skills.");
        assert_eq!(r, ClassificationResult::UNKNOWN);
    }

    #[test]
    fn short_text_counts_characters_not_bytes() {
        // 49 two-byte characters: 98 bytes but still below the threshold.
        let text = "é".repeat(49);
        assert_eq!(classify_text(&text).confidence, 0.0);
    }

    #[test]
    fn no_keywords_is_unknown() {
        let text = "The quick brown fox jumps over the lazy dog again and again and again.";
        assert_eq!(classify_text(text), ClassificationResult::UNKNOWN);
    }

    #[test]
    fn pure_resume_keywords_give_full_confidence() {
        let text = "Objective: join a great team.\nExperience: five years at Acme.\n\
Education: State University.\nCertifications: Google UX.";
        let r = classify_text(text);
        assert_eq!(r.category, Category::Resume);
        assert!((r.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn contact_details_boost_resume() {
        let signals = TextSignals::scan(RESUME_TEXT);
        assert!(signals.has_email);
        assert!(signals.has_phone);
        // objective, experience, education, skills + 3 contact bonus
        assert_eq!(signals.resume_score, 7);
    }

    #[test]
    fn resume_fixture_classified_by_text() {
        let r = classify_text(RESUME_TEXT);
        assert_eq!(r.category, Category::Resume);
        assert!(r.confidence >= 0.5);
    }

    #[test]
    fn portfolio_fixture_classified_by_text() {
        let r = classify_text(PORTFOLIO_TEXT);
        assert_eq!(r.category, Category::Portfolio);
        assert!((r.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tie_with_contact_details_is_resume() {
        // resume: "skills" + 3 contact bonus; portfolio: four keywords
        let text = "Skills and a project list. Reach me at jane@example.com or 555.987.6543. \
Also a case study, a prototype and a wireframe.";
        let signals = TextSignals::scan(text);
        assert_eq!(signals.resume_score, signals.portfolio_score);
        let r = classify_text(text);
        assert_eq!(r.category, Category::Resume);
        assert!((r.confidence - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn tie_with_more_paragraphs_is_portfolio() {
        let text = "My skills\n\nA project\n\nmore words here to pass the minimum length threshold";
        let signals = TextSignals::scan(text);
        assert_eq!(signals.resume_score, signals.portfolio_score);
        assert!(signals.paragraphs > signals.bullet_points);
        let r = classify_text(text);
        assert_eq!(r.category, Category::Portfolio);
        assert!((r.confidence - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn tie_without_signals_is_unknown() {
        let text = "My skills and one project, described in a single paragraph of plain prose.";
        let r = classify_text(text);
        assert_eq!(r.category, Category::Unknown);
        assert!((r.confidence - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn bullets_over_ten_boost_resume() {
        let text = "- a\n".repeat(11) + "trailing filler text to make this long enough";
        let signals = TextSignals::scan(&text);
        assert_eq!(signals.bullet_points, 11);
        assert_eq!(signals.resume_score, 2);
    }

    #[test]
    fn paragraphs_over_five_boost_portfolio() {
        let text = "para\n\n".repeat(6);
        let signals = TextSignals::scan(&text);
        assert_eq!(signals.paragraphs, 6);
        assert_eq!(signals.portfolio_score, 2);
    }

    #[test]
    fn filename_resume_and_cv() {
        assert_eq!(classify_filename("John_Resume.pdf").category, Category::Resume);
        assert_eq!(classify_filename("my-CV-2024.pdf").category, Category::Resume);
        assert!((classify_filename("cv.pdf").confidence - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn filename_portfolio() {
        let r = classify_filename("Jane Portfolio.pdf");
        assert_eq!(r.category, Category::Portfolio);
        assert!((r.confidence - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn filename_without_hint_is_unknown() {
        assert_eq!(classify_filename("upload.pdf"), ClassificationResult::UNKNOWN);
    }

    #[test]
    fn filename_signal_overrides_text() {
        let r = classify(PORTFOLIO_TEXT, "john_resume.pdf");
        assert_eq!(r.category, Category::Resume);
        assert!((r.confidence - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn fixtures_classify_with_their_filenames() {
        assert_eq!(classify(RESUME_TEXT, "john_resume.pdf").category, Category::Resume);
        assert_eq!(
            classify(PORTFOLIO_TEXT, "jane_portfolio.pdf").category,
            Category::Portfolio
        );
    }

    #[test]
    fn text_signal_used_without_filename_hint() {
        assert_eq!(classify(RESUME_TEXT, "upload.pdf").category, Category::Resume);
        assert_eq!(classify(PORTFOLIO_TEXT, "").category, Category::Portfolio);
    }

    #[test]
    fn uncertain_defaults_to_portfolio() {
        let r = classify("too short", "upload.pdf");
        assert_eq!(r.category, Category::Portfolio);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn weak_tie_keeps_unknown() {
        let text = "My skills and one project, described in a single paragraph of plain prose.";
        let r = classify(text, "upload.pdf");
        assert_eq!(r.category, Category::Unknown);
    }

    #[test]
    fn category_display() {
        assert_eq!(Category::Resume.to_string(), "resume");
        assert_eq!(Category::Portfolio.label(), "portfolio");
    }
}
