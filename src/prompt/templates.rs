//! Built-in prompt templates.

/// Topic wording used when the caller does not name one.
pub const DEFAULT_TOPIC: &str = "the topic shared by the competitors";

/// Prompt built from competitor structures.
pub const STRUCTURE_PROMPT: &str = r#"Create a compact, optimized SEO structure for a copywriting text about {topic}, based on the competitor structures below.

Competitor structures (only relevant content headings were kept; ignore anything that still looks like footers, sidebars or navigation):
{competitors}

Our structure must:
- Match the overall search intent: analyze the topics and heading order the competitors share so the outline answers what users are looking for.
- Be concise: at most 5-6 H2, H3 only for key subtopics (H4 is allowed but should be rare).
- Start with H2 (no H1).
- Follow a logical sequence: introduction, main content, conclusion.
- Be SEO-optimized: natural use of keywords, compelling headings, clear hierarchy.
- Avoid duplication: merge similar topics and keep only what matters most.
- Do not add an FAQ.

Produce the structure as a table with the columns "Heading" and "What to cover", one heading (H2, H3, H4) per row.

Example table:
| Heading          | What to cover                    |
|------------------|----------------------------------|
| H2: ...          | ...                              |
| H2: ...          | ...                              |
| H3: ...          | ...                              |
| H3: ...          | ...                              |
| H2: ...          | ...                              |

Generate a table that is relevant, compact, and gives a better user experience than the competitors."#;

/// Prompt used when no competitor produced a usable structure.
pub const DEFAULT_PROMPT: &str = r#"Create a compact, optimized SEO structure for a copywriting text about {topic}.

Our structure must:
- Be concise: at most 5-6 H2, H3 only for key subtopics (H4 is allowed but should be rare).
- Start with H2 (no H1).
- Follow a logical sequence: introduction, main content, conclusion.
- Be SEO-optimized: natural use of keywords, compelling headings, clear hierarchy.
- Avoid duplication: merge similar topics and keep only what matters most.
- Do not add an FAQ.

Produce the structure as a table with the columns "Heading" and "What to cover", one heading (H2, H3, H4) per row.

Example table:
| Heading          | What to cover                    |
|------------------|----------------------------------|
| H2: ...          | ...                              |
| H2: ...          | ...                              |
| H3: ...          | ...                              |
| H2: ...          | ...                              |"#;
