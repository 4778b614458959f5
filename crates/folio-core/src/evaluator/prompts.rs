//! Review instructions sent to the model, keyed by content category and evaluation mode.

use crate::classifier::Category;

const CONTENT_SLOT: &str = "{content}";

/// How the subject reaches the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    Text,
    Visual,
    Hybrid,
}

impl EvalMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Visual => "visual",
            Self::Hybrid => "hybrid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    EntryLevelUxResume,
    GeneralResume,
    UxPortfolioText,
    UxPortfolioVisual,
    GeneralVisual,
    HybridPortfolio,
}

impl PromptTemplate {
    #[must_use]
    pub fn select(category: Category, mode: EvalMode) -> Self {
        match (category, mode) {
            (Category::Resume, EvalMode::Text) => Self::EntryLevelUxResume,
            (Category::Unknown, EvalMode::Text) => Self::GeneralResume,
            (Category::Portfolio, EvalMode::Text) => Self::UxPortfolioText,
            (Category::Portfolio, EvalMode::Visual) => Self::UxPortfolioVisual,
            (Category::Resume | Category::Unknown, EvalMode::Visual) => Self::GeneralVisual,
            (_, EvalMode::Hybrid) => Self::HybridPortfolio,
        }
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::EntryLevelUxResume => "entry_level_ux",
            Self::GeneralResume => "general",
            Self::UxPortfolioText => "ux_text",
            Self::UxPortfolioVisual => "ux_visual",
            Self::GeneralVisual => "general_visual",
            Self::HybridPortfolio => "hybrid",
        }
    }

    fn body(self) -> &'static str {
        match self {
            Self::EntryLevelUxResume => ENTRY_LEVEL_UX_RESUME,
            Self::GeneralResume => GENERAL_RESUME,
            Self::UxPortfolioText => UX_PORTFOLIO_TEXT,
            Self::UxPortfolioVisual => UX_PORTFOLIO_VISUAL,
            Self::GeneralVisual => GENERAL_VISUAL,
            Self::HybridPortfolio => HYBRID_PORTFOLIO,
        }
    }

    /// Whether the template embeds document text.
    #[cfg(test)]
    fn takes_content(self) -> bool {
        self.body().contains(CONTENT_SLOT)
    }

    /// Final instruction text with `content` substituted in.
    ///
    /// Templates without a content slot ignore `content`.
    #[must_use]
    pub fn render(self, content: &str) -> String {
        self.body().replacen(CONTENT_SLOT, content, 1)
    }
}

const ENTRY_LEVEL_UX_RESUME: &str = "\
You are a UX hiring manager reviewing a resume for an entry-level UX Designer position.\n\
\n\
Review this resume and provide constructive feedback focused on:\n\
\n\
1. **Relevant Skills & Tools**: Does the candidate demonstrate proficiency with UX tools (Figma, Sketch, Adobe XD, etc.), research methods, and design thinking?\n\
\n\
2. **Project Experience**: Are UX projects clearly described? Do they show understanding of the design process (research, ideation, prototyping, testing)?\n\
\n\
3. **Education & Learning**: Is relevant education/coursework highlighted? Are there certificates, bootcamps, or self-directed learning shown?\n\
\n\
4. **Presentation & Format**: Is the resume scannable and well-organized? Are achievements quantified where possible?\n\
\n\
5. **Red Flags & Gaps**: Are there any concerning gaps, unclear descriptions, or missing elements that would hurt their chances?\n\
\n\
6. **Competitive Positioning**: In a competitive, AI-disrupted job market, what makes this candidate stand out (or not)?\n\
\n\
**Tone**: Direct but supportive. These are anxious entry-level candidates who need honest, actionable feedback.\n\
\n\
**Format**: Use clear sections with bullet points. Be specific about what to improve.\n\
\n\
**Length**: 400-600 words.\n\
\n\
Resume content:\n\
{content}";

const GENERAL_RESUME: &str = "\
You are a career advisor reviewing a resume for a creative/design position.\n\
\n\
Provide feedback on:\n\
\n\
1. **Content Quality**: Are skills, experience, and achievements clearly communicated?\n\
2. **Format & Readability**: Is the resume well-structured and easy to scan?\n\
3. **Strengths**: What are the strongest elements?\n\
4. **Areas for Improvement**: What needs work?\n\
5. **Next Steps**: Specific actions to improve this resume.\n\
\n\
Resume content:\n\
{content}";

const UX_PORTFOLIO_TEXT: &str = "\
You are a UX portfolio reviewer for university students entering a competitive job market affected by AI disruption.\n\
\n\
Review this portfolio and provide constructive feedback in these areas:\n\
\n\
1. **Case Study Structure**: Are problems clearly defined? Is the design process visible?\n\
2. **Visual Presentation**: Based on described content, does it seem professional and polished?\n\
3. **Outcomes & Impact**: Are results quantified? Is business/user impact clear?\n\
4. **Storytelling**: Does it show thinking and process, not just deliverables?\n\
5. **Standout Strengths**: What's working well that they should emphasize?\n\
6. **Priority Improvements**: Top 3 changes that would strengthen this portfolio most\n\
\n\
Tone: Supportive but honest. These are anxious students who need actionable, specific advice.\n\
Format: Use clear sections with bullet points. Be encouraging while being real about what needs work.\n\
Length: 400-600 words.\n\
\n\
Portfolio content:\n\
{content}";

const UX_PORTFOLIO_VISUAL: &str = "\
You are a UX hiring manager reviewing a portfolio for an entry-level UX Designer position. You're looking at a visual representation of their portfolio.\n\
\n\
Based on what you see in this portfolio, evaluate it as you would during a hiring review:\n\
\n\
1. **Visual Presentation & Polish**: Does the portfolio look professional? Is there a cohesive visual identity? Are images and layouts clean and well-organized?\n\
\n\
2. **Case Study Structure**: Can you identify clear case studies? Do they appear to follow a structured format (problem → process → solution → outcome)?\n\
\n\
3. **Evidence of UX Process**: Can you see evidence of:\n\
\x20  - User research (personas, interviews, surveys)\n\
\x20  - Ideation (sketches, wireframes, information architecture)\n\
\x20  - Prototyping and iteration\n\
\x20  - Usability testing and validation\n\
\x20  - Final designs with clear rationale\n\
\n\
4. **Project Quality Over Quantity**: Are there 2-4 deep, well-documented projects rather than many shallow ones?\n\
\n\
5. **Clarity of Contributions**: Is it clear what the candidate personally contributed vs. team work?\n\
\n\
6. **Measurable Outcomes**: Are results quantified? (e.g., \"Improved task completion by 40%\")\n\
\n\
7. **Accessibility & Responsiveness**: Is there evidence they considered accessibility and responsive design?\n\
\n\
8. **Storytelling**: Does the portfolio tell a compelling story about their design thinking and problem-solving?\n\
\n\
**Critical Assessment**:\n\
- What works well that they should emphasize in interviews?\n\
- What are the top 3 improvements that would make this portfolio stand out in a competitive job market?\n\
- Are there any red flags (unclear process, lack of user research, only visual design)?\n\
\n\
**Tone**: Supportive but honest. Students need to know what hiring managers really look for.\n\
\n\
**Format**: Use clear sections with bullet points. Be specific and actionable.\n\
\n\
**Length**: 500-700 words.\n\
\n\
Analyze the portfolio image(s) provided.";

const GENERAL_VISUAL: &str = "\
You are reviewing a creative portfolio. Analyze the visual presentation and provide feedback on:\n\
\n\
1. **Overall Impression**: Professional quality, visual coherence, presentation\n\
2. **Strengths**: What stands out positively?\n\
3. **Areas for Improvement**: What needs work?\n\
4. **Recommendations**: Specific next steps\n\
\n\
Analyze the portfolio image(s) provided.";

const HYBRID_PORTFOLIO: &str = "\
You are a UX hiring manager reviewing a portfolio. You have both visual and text content to analyze.\n\
\n\
Visual content is shown in the images above.\n\
\n\
Text content from the portfolio:\n\
{content}\n\
\n\
Provide comprehensive feedback considering both the visual presentation and the written case study content. Focus on:\n\
1. Visual presentation quality and professionalism\n\
2. Case study structure and clarity\n\
3. Evidence of UX process and user-centered design\n\
4. Measurable outcomes and impact\n\
5. Areas of strength and opportunities for improvement\n\
\n\
Format: Clear sections with bullet points, 500-700 words.";
