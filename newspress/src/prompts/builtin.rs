// Built-in prompt catalog. Registration order is the order listed by `available_tasks`.

use super::PromptTemplate;

const SUMMARIZE: &str = r#"You are a news article summarizer. Create a concise, informative summary.

IMPORTANT INSTRUCTIONS:
1. IGNORE all markdown formatting (###, **, __, etc.) - extract only text content
2. Create a REAL summary of the key points (not just the first few lines)
3. Be concise but capture the essential information from the ENTIRE article
4. KEEP THE ORIGINAL LANGUAGE - do not translate

Answer with 3 to 5 sentences of plain text.

ARTICLE TO SUMMARIZE:
{content}
"#;

const TRANSLATE: &str = r#"Translate the following news article into Simplified Chinese.

Keep names, numbers, quotes and paragraph breaks intact. Do not add commentary,
notes or a title of your own. Output only the translation.

ARTICLE:
{content}
"#;

const REWRITE: &str = r#"Rewrite the following news article for publication on our site.

RULES:
1. Keep every fact, figure, name and date exactly as given
2. Use neutral, journalistic language and short paragraphs
3. Do not copy sentences verbatim from the source
4. Output HTML paragraphs (<p>...</p>) only, no headings

SOURCE ARTICLE:
{content}
"#;

const CLASSIFY: &str = r#"Classify this article into categories (max 3).

Categories: politics, economy, technology, sports, culture, science,
local_news, international, health, environment

Return only category names, comma-separated.

ARTICLE:
{content}
"#;

const EXTRACT_KEYWORDS: &str = r#"Extract 5 to 10 keywords that best describe the following article.
Prefer proper nouns and specific topics over generic words.

Return only the keywords, comma-separated, in the article's language.

ARTICLE:
{content}
"#;

const GENERATE_TITLE: &str = r#"Write one headline for the following news article.

The headline must be factual, at most 80 characters, in the article's language,
and must not end with punctuation. Output only the headline.

ARTICLE:
{content}
"#;

pub(super) fn templates() -> Vec<PromptTemplate> {
    vec![
        PromptTemplate::new("summarize", "Summarize an article in a few sentences", SUMMARIZE),
        PromptTemplate::new("translate", "Translate an article into Chinese", TRANSLATE),
        PromptTemplate::new(
            "rewrite",
            "Rewrite an article as original copy ready to publish",
            REWRITE,
        ),
        PromptTemplate::new("classify", "Assign up to three topic categories", CLASSIFY),
        PromptTemplate::new(
            "extract_keywords",
            "Extract keywords for tagging",
            EXTRACT_KEYWORDS,
        ),
        PromptTemplate::new("generate_title", "Write a headline", GENERATE_TITLE),
    ]
}
