//! Cheap résumé completeness check, run without the model.

const EXPERIENCE_TERMS: &[&str] = &["experience", "work history", "employment"];
const UX_TOOLS: &[&str] = &[
    "figma",
    "sketch",
    "adobe xd",
    "invision",
    "axure",
    "miro",
    "framer",
];
const RESEARCH_METHODS: &[&str] = &[
    "user research",
    "usability testing",
    "interviews",
    "surveys",
    "personas",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuickCheck {
    pub has_experience: bool,
    pub has_education: bool,
    pub has_skills: bool,
    /// An `@` anywhere in the text.
    pub has_contact: bool,
    pub has_ux_tools: bool,
    pub has_research_methods: bool,
    pub word_count: usize,
    /// Fraction of experience, education, skills and contact present.
    pub completeness_score: f64,
}

#[must_use]
pub fn quick_check(text: &str) -> QuickCheck {
    let lower = text.to_lowercase();
    let mentions = |terms: &[&str]| terms.iter().any(|t| lower.contains(t));

    let has_experience = mentions(EXPERIENCE_TERMS);
    let has_education = lower.contains("education");
    let has_skills = lower.contains("skills");
    let has_contact = text.contains('@');

    let core_sections = [has_experience, has_education, has_skills, has_contact]
        .into_iter()
        .filter(|present| *present)
        .count();
    #[allow(clippy::cast_precision_loss)]
    let completeness_score = core_sections as f64 / 4.0;

    QuickCheck {
        has_experience,
        has_education,
        has_skills,
        has_contact,
        has_ux_tools: mentions(UX_TOOLS),
        has_research_methods: mentions(RESEARCH_METHODS),
        word_count: text.split_whitespace().count(),
        completeness_score,
    }
}
