// LLM prompt templates for the portfolio pipeline.
// Placeholders are filled with `str::replace`; `{theme}` first, the embedded content last,
// so braces inside resume text are never re-interpreted.

/// Stage 1: resume text → structured website content.
/// Replace `{theme}` and `{resume_text}` before sending.
pub const STRUCTURE_PROMPT_TEMPLATE: &str = r#"You are a senior web designer.
Convert the following resume into a structured portfolio website specification.

Extract:
- Name
- Professional summary
- Skills
- Experience
- Projects
- Education
- Achievements

Design theme: {theme}

Resume Content:
{resume_text}

Return clean structured content only.
"#;

/// Stage 2: structured content → HTML/CSS/JS in three fenced blocks.
/// Replace `{theme}` and `{structured_spec}` before sending.
pub const CODE_PROMPT_TEMPLATE: &str = r#"Generate a modern, responsive portfolio website using ONLY:
- HTML
- CSS
- JavaScript

Theme: {theme}

Rules:
- Output MUST contain three fenced code blocks
- Use EXACT labels: ```html, ```css, ```js
- The HTML must link style.css and script.js
- No explanations, no markdown text outside code blocks

Content:
{structured_spec}
"#;
