use std::sync::Arc;

use ns_core::{ArticleType, CompletionRequest, CompletionService, LanguageInfo, SummaryRequest};
use tracing::{debug, warn};

use crate::normalizer::normalize;

/// Reply meaning "the article does not state the author's role".
pub const NO_ROLE: &str = "NO_ROLE";

pub const SUMMARY_MAX_TOKENS: u32 = 1024;
const ROLE_MAX_TOKENS: u32 = 100;

pub const SYSTEM_PROMPT: &str = "You are an expert news summariser writing for a UK audience. \
Aim for sentences of around 15 words each; go slightly longer or shorter when grammar requires it. \
Write the summary as one continuous paragraph with no line breaks, headings or bullet points. \
Never alter currencies, amounts or figures when changing spelling conventions: keep £, $ and € values exactly as they appear in the article. \
Do not prefix UK entities with 'UK' (write 'the Treasury', not 'the UK Treasury'), \
but always prefix foreign entities with their country or institution of origin (write 'the US Federal Reserve' or 'German carmaker Volkswagen').";

/// System and user prompt for one summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
}

impl ComposedPrompt {
    pub fn into_completion(self) -> CompletionRequest {
        CompletionRequest::new(self.user, SUMMARY_MAX_TOKENS).with_system(self.system)
    }
}

/// Builds the prompts for `request`. `author_role` only matters for op-eds.
pub fn compose(
    request: &SummaryRequest,
    language: Option<&LanguageInfo>,
    author_role: Option<&str>,
) -> ComposedPrompt {
    let n = request.sentence_count;
    let rest = n.saturating_sub(1);
    let publication = request.publication.trim();
    let author = request.author_name().unwrap_or_default();
    let text = request.article_text.trim();

    let clauses = format!(
        "{}{}{}",
        language_clause(language),
        instructions_clause(request.instructions()),
        request
            .client()
            .map(|(name, count)| client_clause(name, count))
            .unwrap_or_default()
    );

    let user = match request.article_type {
        ArticleType::News => format!(
            "Summarise this news article in exactly {n} *short* sentences. Do NOT use 'we' in the summary. \
             Be specific where applicable. Full sentences only, no lists.{clauses} \
             You MUST begin with '{publication} reports that'.\n\nArticle: {text}"
        ),
        ArticleType::Interview => format!(
            "Summarise this interview article in exactly {n} *concise* sentences that flow. \
             Do NOT use 'we' in the summary. Be specific where applicable.{clauses} \
             For your first sentence: Begin with '{publication} carries an interview with {author}' \
             and include a brief overview of the main topic discussed. \
             For the remaining {rest} sentences, begin them like \
             '[interviewee last name] argues/highlights/describes/discusses/notes/cites that'.\n\nArticle: {text}"
        ),
        ArticleType::OpEd => {
            let intro = author_intro(author, author_role);
            format!(
                "Summarise this op-ed article in exactly {n} *concise* sentences that flow. \
                 Do NOT use 'we' in the summary. Be specific where applicable.{clauses} \
                 For your first sentence: Begin with '{publication} carries an op-ed by {intro}' \
                 and include a brief overview of their main argument. \
                 For the remaining {rest} sentences, begin them like \
                 '[author last name] argues/highlights/describes/discusses/notes/cites that'.\n\nArticle: {text}"
            )
        }
        ArticleType::Feature => format!(
            "Summarise this feature article in exactly {n} sentences. Where applicable begin sentences like \
             'The article (also) highlights/cites/notes/discusses/examines/suggests'. \
             Do NOT use 'we' in the summary. Be specific where applicable and make sure to convey \
             the broad points of the piece.{clauses} \
             You MUST begin with '{publication} carries a feature'.\n\nArticle: {text}"
        ),
    };

    ComposedPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}

fn author_intro(author: &str, role: Option<&str>) -> String {
    match role.map(str::trim).filter(|r| !r.is_empty()) {
        Some(role) => format!("{}, {}", author, role),
        None => author.to_string(),
    }
}

fn language_clause(language: Option<&LanguageInfo>) -> String {
    match language {
        Some(info) if !info.is_english => format!(
            " The article is written in {}: translate it and write the summary in British English, \
             keeping proper nouns, currencies and figures exactly as in the original.",
            info.language
        ),
        _ => " Use British English spelling throughout, converting any American spellings, \
              but keep currencies, units, figures and proper nouns exactly as written."
            .to_string(),
    }
}

fn instructions_clause(instructions: Option<&str>) -> String {
    instructions
        .map(|i| format!(" Pay special attention to the following aspects: {}.", i.trim_end_matches('.')))
        .unwrap_or_default()
}

/// Prominence guidance scaled to how often the client appears.
fn client_clause(name: &str, count: usize) -> String {
    match count {
        0 => String::new(),
        1 => format!(
            " The client {name} is mentioned once in the article: include them only where relevant, \
             with a brief mention proportional to their minor role, describing them accurately as the article does."
        ),
        2..=3 => format!(
            " The client {name} is mentioned {count} times in the article: make sure they appear in the summary \
             with moderate prominence that reflects their supporting role, describing their involvement accurately \
             rather than inserting the name mechanically."
        ),
        _ => format!(
            " The client {name} is mentioned {count} times in the article and is central to it: feature them \
             prominently in the summary, describing their role accurately and in context rather than \
             repeating the name mechanically."
        ),
    }
}

/// Looks up an op-ed author's role or credentials with one auxiliary call.
#[derive(Debug, Clone)]
pub struct AuthorRoleExtractor {
    service: Arc<dyn CompletionService>,
}

impl AuthorRoleExtractor {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self { service }
    }

    /// `None` when the article states no role or the lookup fails.
    pub async fn extract(&self, article_text: &str, author: &str) -> Option<String> {
        let prompt = format!(
            "From this article, extract ONLY the author's role or credentials if mentioned \
             (like their job title, position, or expertise). Do NOT include the author's name in your response. \
             If no role is mentioned, respond with '{NO_ROLE}'. Don't include any other text in your response:\n\n{}",
            article_text.trim()
        );
        let request = CompletionRequest::new(prompt, ROLE_MAX_TOKENS).fast();

        match self.service.complete(&request).await {
            Ok(reply) => {
                let role = clean_role(&reply, author);
                debug!("Author role for {}: {:?}", author, role);
                role
            }
            Err(e) => {
                warn!("Author role lookup failed, using the bare name: {}", e);
                None
            }
        }
    }
}

/// Strips the author's own name and edge punctuation from a role reply.
pub fn clean_role(reply: &str, author: &str) -> Option<String> {
    let reply = normalize(reply);
    if reply.is_empty() || reply.contains(NO_ROLE) {
        return None;
    }

    let author = author.trim();
    let role = if author.is_empty() {
        reply
    } else {
        reply.replace(author, "")
    };
    let role = role
        .trim_matches(|c: char| c.is_whitespace() || c == ',' || c == '.')
        .to_string();

    (!role.is_empty()).then_some(role)
}
