use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{CompletionRequest, LlmService, Responder},
    DomainError,
};

pub const NO_INFORMATION_MESSAGE: &str = "I don't have information about that specific item.

**I can help you with:**
• Smartphones (iPhone, Samsung, Google)
• Laptops (MacBook, Dell, Surface)
• Tablets (iPad, Android tablets)
• Audio devices (AirPods, headphones)
• Smartwatches

Please ask about one of these categories.";

pub const PRICING_MESSAGE: &str =
    "I don't have pricing information available. Please contact our sales team for current prices.";

pub const COULDNT_GENERATE_MESSAGE: &str =
    "I couldn't generate a proper response. Please rephrase your question.";

pub const COULDNT_FORMAT_MESSAGE: &str =
    "I found some information but couldn't format it properly. Please ask about specific products.";

const GREETINGS: &[&str] = &["hi", "hello", "hey", "hola"];
const PRICING_KEYWORDS: &[&str] = &["price", "cost", "expensive", "cheap", "$"];
const LISTING_KEYWORDS: &[&str] = &[
    "products",
    "list",
    "show me",
    "what do you have",
    "available",
];

/// Lines of model output containing any of these are prompt echoes.
const LEAK_INDICATORS: &[&str] = &[
    "instructions:",
    "customer question:",
    "products available:",
    "response:",
    "assistant",
    "system",
    "prompt",
];

/// Product categories in priority order; a document lands in the first
/// category with a matching keyword.
const CATEGORIES: &[(&str, &[&str])] = &[
    ("Smartphones", &["phone", "iphone", "galaxy", "pixel"]),
    ("Laptops", &["laptop", "macbook", "surface"]),
    ("Tablets", &["tablet", "ipad"]),
    ("Audio", &["airpods", "headphones", "earbuds"]),
    ("Wearables", &["watch"]),
];
const OTHER_CATEGORY: &str = "Electronics";

const LISTING_LIMIT: usize = 5;
const LISTING_DESCRIPTION_CHARS: usize = 150;
const CONTEXT_DOCUMENTS: usize = 2;
const CONTEXT_DOCUMENT_CHARS: usize = 300;
const FALLBACK_DESCRIPTION_CHARS: usize = 100;
const FALLBACK_TEXT_CHARS: usize = 150;

const COMPLETION_MAX_TOKENS: u32 = 150;
const COMPLETION_TEMPERATURE: f32 = 0.1;
const MIN_COMPLETION_CHARS: usize = 5;
const MIN_LINE_CHARS: usize = 4;
const MAX_ANSWER_LINES: usize = 5;
const MAX_ANSWER_CHARS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStrategy {
    NoDocuments,
    Greeting,
    PricingDeflection,
    Listing,
    FreeForm,
}

/// Picks the response branch. Rules are checked in order against the
/// lower-cased, trimmed query.
pub fn select_strategy(query: &str, documents: &[String]) -> ResponseStrategy {
    if documents.is_empty() {
        return ResponseStrategy::NoDocuments;
    }

    let query = query.trim().to_lowercase();
    if GREETINGS.contains(&query.as_str()) {
        ResponseStrategy::Greeting
    } else if contains_any(&query, PRICING_KEYWORDS) {
        ResponseStrategy::PricingDeflection
    } else if contains_any(&query, LISTING_KEYWORDS) {
        ResponseStrategy::Listing
    } else {
        ResponseStrategy::FreeForm
    }
}

/// Builds answers from retrieved documents, calling the LLM only for
/// free-form questions.
pub struct ResponderAgent {
    llm: Arc<dyn LlmService>,
}

impl ResponderAgent {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self { llm }
    }

    #[instrument(skip(self, documents), fields(documents = documents.len()))]
    pub async fn generate_response(&self, query: &str, documents: &[String]) -> String {
        let strategy = select_strategy(query, documents);
        tracing::debug!(?strategy, "selected response strategy");

        match strategy {
            ResponseStrategy::NoDocuments => NO_INFORMATION_MESSAGE.to_string(),
            ResponseStrategy::Greeting => greeting_response(documents),
            ResponseStrategy::PricingDeflection => PRICING_MESSAGE.to_string(),
            ResponseStrategy::Listing => product_listing(documents),
            ResponseStrategy::FreeForm => self.llm_response(query, documents).await,
        }
    }

    async fn llm_response(&self, query: &str, documents: &[String]) -> String {
        let request = CompletionRequest::new(build_prompt(query, documents))
            .with_max_tokens(COMPLETION_MAX_TOKENS)
            .with_temperature(COMPLETION_TEMPERATURE);

        match self.llm.complete(&request).await {
            Ok(raw) => sanitize_completion(&raw),
            Err(e) => {
                tracing::error!(error = %e, "LLM generation failed, using document summary");
                fallback_response(documents)
            }
        }
    }
}

#[async_trait]
impl Responder for ResponderAgent {
    async fn respond(&self, query: &str, documents: &[String]) -> Result<String, DomainError> {
        Ok(self.generate_response(query, documents).await)
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn category_of(document: &str) -> &'static str {
    let document = document.to_lowercase();
    CATEGORIES
        .iter()
        .find(|(_, keywords)| contains_any(&document, keywords))
        .map(|(name, _)| *name)
        .unwrap_or(OTHER_CATEGORY)
}

/// Per-category document counts in table order, zero counts omitted.
fn category_counts(documents: &[String]) -> Vec<(&'static str, usize)> {
    let names = CATEGORIES
        .iter()
        .map(|(name, _)| *name)
        .chain(std::iter::once(OTHER_CATEGORY));

    let assigned: Vec<&str> = documents.iter().map(|d| category_of(d)).collect();
    names
        .map(|name| (name, assigned.iter().filter(|c| **c == name).count()))
        .filter(|(_, count)| *count > 0)
        .collect()
}

fn greeting_response(documents: &[String]) -> String {
    let mut response = String::from("Hello! Welcome to our electronics store. 👋\n\n");
    response.push_str(&format!(
        "We have **{} products** available:\n",
        documents.len()
    ));
    for (category, count) in category_counts(documents) {
        response.push_str(&format!("• {category}: {count} available\n"));
    }
    response.push_str("\nWhat can I help you find today?");
    response
}

fn product_listing(documents: &[String]) -> String {
    let shown = &documents[..documents.len().min(LISTING_LIMIT)];
    let mut response = format!(
        "Here are our available products ({} shown):\n\n",
        shown.len()
    );

    for (i, doc) in shown.iter().enumerate() {
        let (name, description) = match doc.split_once(':') {
            Some((name, description)) => (name.trim(), description.trim()),
            None => ("Product", doc.trim()),
        };
        response.push_str(&format!(
            "**{}. {}**\n{}\n\n",
            i + 1,
            name,
            truncate_with_ellipsis(description, LISTING_DESCRIPTION_CHARS)
        ));
    }

    response.push_str("Would you like more details about any specific product?");
    response
}

fn build_prompt(query: &str, documents: &[String]) -> String {
    let context: String = documents
        .iter()
        .take(CONTEXT_DOCUMENTS)
        .enumerate()
        .map(|(i, doc)| {
            let doc: String = doc.trim().chars().take(CONTEXT_DOCUMENT_CHARS).collect();
            format!("Product {}: {}\n\n", i + 1, doc)
        })
        .collect();

    format!(
        "You are a helpful electronics store assistant.

Products available:
{context}
Customer question: {query}

Instructions:
- Answer using ONLY the product information above
- Be specific and helpful
- Use markdown with **bold** for product names
- Keep response under 100 words
- Do not mention prices
- If you can't answer from the information, say so

Response:"
    )
}

/// Strips prompt echoes and bounds the answer to a few short lines.
fn sanitize_completion(raw: &str) -> String {
    let raw = raw.trim();
    if raw.chars().count() < MIN_COMPLETION_CHARS {
        return COULDNT_GENERATE_MESSAGE.to_string();
    }

    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !contains_any(&line.to_lowercase(), LEAK_INDICATORS))
        .filter(|line| line.chars().count() >= MIN_LINE_CHARS)
        .take(MAX_ANSWER_LINES)
        .collect();

    if lines.is_empty() {
        return COULDNT_FORMAT_MESSAGE.to_string();
    }

    truncate_with_ellipsis(&lines.join("\n"), MAX_ANSWER_CHARS)
}

/// Single-document summary used when the LLM is unavailable.
fn fallback_response(documents: &[String]) -> String {
    let Some(doc) = documents.first() else {
        return NO_INFORMATION_MESSAGE.to_string();
    };

    match doc.split_once(':') {
        Some((name, description)) => format!(
            "**{}**\n\n{}\n\nWould you like to know more?",
            name.trim(),
            truncate_with_ellipsis(description.trim(), FALLBACK_DESCRIPTION_CHARS)
        ),
        None => format!(
            "I found this product:\n\n{}\n\nCan I help with anything specific?",
            truncate_with_ellipsis(doc.trim(), FALLBACK_TEXT_CHARS)
        ),
    }
}

/// Cuts `text` to at most `max_chars` characters, ellipsis included.
fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    const ELLIPSIS: &str = "...";

    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replies with a canned completion, or fails when `reply` is `None`.
    struct StubLlm {
        reply: Option<String>,
        calls: AtomicUsize,
        last_request: Mutex<Option<CompletionRequest>>,
    }

    impl StubLlm {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl LlmService for StubLlm {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.reply
                .clone()
                .ok_or_else(|| DomainError::unavailable("llm-service down"))
        }

        async fn health(&self) -> Result<(), DomainError> {
            Ok(())
        }
    }

    fn docs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn catalog() -> Vec<String> {
        docs(&[
            "iPhone 15 Pro: Premium smartphone with A17 Pro chip and titanium design.",
            "Samsung Galaxy S24 Ultra: Flagship Android phone with 200MP camera.",
            "MacBook Air M3: Ultra-thin laptop with M3 chip.",
        ])
    }

    #[test]
    fn test_strategy_order() {
        let docs = catalog();
        assert_eq!(select_strategy("hi", &[]), ResponseStrategy::NoDocuments);
        assert_eq!(select_strategy("  HeLLo ", &docs), ResponseStrategy::Greeting);
        assert_eq!(
            select_strategy("Show me the price list", &docs),
            ResponseStrategy::PricingDeflection
        );
        assert_eq!(
            select_strategy("What do you have?", &docs),
            ResponseStrategy::Listing
        );
        assert_eq!(
            select_strategy("Which phone has the best camera?", &docs),
            ResponseStrategy::FreeForm
        );
    }

    #[test]
    fn test_greeting_requires_exact_match() {
        assert_eq!(
            select_strategy("hi there", &catalog()),
            ResponseStrategy::FreeForm
        );
    }

    #[tokio::test]
    async fn test_no_documents_for_any_query() {
        let llm = StubLlm::replying("unused");
        let agent = ResponderAgent::new(llm.clone());

        for query in ["hi", "what is the price", "list products", "tell me about phones"] {
            assert_eq!(
                agent.generate_response(query, &[]).await,
                NO_INFORMATION_MESSAGE
            );
        }
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_greeting_counts_categories() {
        let agent = ResponderAgent::new(StubLlm::replying("unused"));
        let response = agent.generate_response("Hi", &catalog()).await;

        assert!(response.contains("We have **3 products** available"));
        assert!(response.contains("Smartphones: 2"));
        assert!(response.contains("Laptops: 1"));
        assert!(!response.contains("Tablets"));
    }

    #[test]
    fn test_category_counts_sum_to_document_count() {
        let documents = docs(&[
            "iPad Air: tablet",
            "Apple Watch Series 9: smartwatch",
            "AirPods Pro: earbuds",
            "Kindle: e-reader",
            "Google Pixel 8 Pro: smartphone",
            "Microsoft Surface Pro 9: 2-in-1 laptop tablet",
        ]);
        let counts = category_counts(&documents);

        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), documents.len());
        assert!(counts.contains(&("Laptops", 1)));
        assert!(counts.contains(&("Tablets", 1)));
        assert!(counts.contains(&("Electronics", 1)));
    }

    #[tokio::test]
    async fn test_pricing_never_calls_llm() {
        let llm = StubLlm::replying("unused");
        let agent = ResponderAgent::new(llm.clone());

        let response = agent.generate_response("what is the price", &catalog()).await;

        assert_eq!(response, PRICING_MESSAGE);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_listing_formats_up_to_five_documents() {
        let agent = ResponderAgent::new(StubLlm::replying("unused"));
        let long_description = "x".repeat(400);
        let mut documents: Vec<String> = (1..=7).map(|i| format!("Item {i}: short")).collect();
        documents[0] = format!("Item 1: {long_description}");
        documents[1] = "Unnamed gadget without a separator".to_string();

        let response = agent.generate_response("list products", &documents).await;

        assert!(response.starts_with("Here are our available products (5 shown):"));
        assert!(response.contains("**1. Item 1**"));
        assert!(response.contains("**2. Product**\nUnnamed gadget without a separator"));
        assert!(response.contains("**5. Item 5**"));
        assert!(!response.contains("Item 6"));
        let truncated = format!("{}...", "x".repeat(147));
        assert!(response.contains(&format!("{truncated}\n")));
    }

    #[tokio::test]
    async fn test_free_form_prompt_and_parameters() {
        let llm = StubLlm::replying("The **iPhone 15 Pro** has a titanium design.");
        let agent = ResponderAgent::new(llm.clone());
        let mut documents = catalog();
        documents[0] = format!("iPhone 15 Pro: {}", "y".repeat(500));

        let response = agent
            .generate_response("Tell me about the iPhone", &documents)
            .await;

        assert_eq!(response, "The **iPhone 15 Pro** has a titanium design.");
        let request = llm.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.max_tokens, Some(150));
        assert_eq!(request.temperature, Some(0.1));
        assert!(request.prompt.contains("Customer question: Tell me about the iPhone"));
        assert!(request.prompt.contains("Product 2: Samsung Galaxy"));
        assert!(!request.prompt.contains("MacBook"));
        assert!(!request.prompt.contains(&"y".repeat(300)));
    }

    #[tokio::test]
    async fn test_free_form_output_is_bounded_and_clean() {
        let outputs = [
            "Response: Here you go\nThe Galaxy has a great camera.\nSystem prompt leaked\nok\nAssistant: hi",
            &format!("{}\n{}", "a".repeat(250), "b".repeat(250)),
            "Line one is fine\nLine two is fine\nLine three is fine\nLine four is fine\nLine five is fine\nLine six is dropped",
            "Instructions: answer\nCustomer question: what?\nProducts available: none",
        ];

        for output in outputs {
            let agent = ResponderAgent::new(StubLlm::replying(output));
            let response = agent
                .generate_response("Which one has the best camera?", &catalog())
                .await;

            assert!(response.chars().count() <= 300, "too long: {response}");
            let lower = response.to_lowercase();
            for indicator in LEAK_INDICATORS {
                assert!(!lower.contains(indicator), "leaked {indicator}: {response}");
            }
        }
    }

    #[test]
    fn test_sanitize_rules() {
        assert_eq!(
            sanitize_completion("Response: x\nThe Galaxy has a great camera.\nok"),
            "The Galaxy has a great camera."
        );
        assert_eq!(sanitize_completion("   "), COULDNT_GENERATE_MESSAGE);
        assert_eq!(
            sanitize_completion("Assistant: hello\nabc"),
            COULDNT_FORMAT_MESSAGE
        );
        assert_eq!(
            sanitize_completion("one1\ntwo2\nthree\nfour\nfive\nsix6").lines().count(),
            5
        );
        let long = sanitize_completion(&"z".repeat(400));
        assert_eq!(long.chars().count(), 300);
        assert!(long.ends_with("..."));
    }

    #[tokio::test]
    async fn test_llm_failure_falls_back_to_first_document() {
        let agent = ResponderAgent::new(StubLlm::failing());

        let response = agent
            .generate_response("Tell me about the iPhone", &catalog())
            .await;

        assert!(response.starts_with("**iPhone 15 Pro**"));
        assert!(response.ends_with("Would you like to know more?"));
    }

    #[test]
    fn test_fallback_without_separator() {
        let response = fallback_response(&docs(&["A mystery gadget"]));
        assert!(response.starts_with("I found this product:\n\nA mystery gadget"));
    }

    #[test]
    fn test_truncate_with_ellipsis_counts_characters() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("ééééééé", 6), "ééé...");
    }

    fn completion_line() -> impl Strategy<Value = String> {
        prop_oneof![
            any::<String>(),
            "[A-Za-z0-9 .,!?]{0,120}",
            (
                "[A-Za-z ]{0,20}",
                prop::sample::select(LEAK_INDICATORS.to_vec()),
                "[A-Za-z ]{0,20}"
            )
                .prop_map(|(head, indicator, tail)| format!(
                    "{head}{}{tail}",
                    indicator.to_uppercase()
                )),
        ]
    }

    fn document() -> impl Strategy<Value = String> {
        prop_oneof![
            any::<String>(),
            (
                prop::sample::select(vec![
                    "iPhone", "Galaxy", "MacBook", "iPad", "AirPods", "Watch", "Kindle",
                    "headphones", "Surface tablet",
                ]),
                "[A-Za-z0-9 ]{0,60}"
            )
                .prop_map(|(name, rest)| format!("{name}: {rest}")),
        ]
    }

    #[test]
    fn prop_sanitized_completion_is_bounded_and_clean() {
        proptest!(|(lines in prop::collection::vec(completion_line(), 0..12))| {
            let answer = sanitize_completion(&lines.join("\n"));
            let lowered = answer.to_lowercase();

            prop_assert!(answer.chars().count() <= MAX_ANSWER_CHARS);
            for indicator in LEAK_INDICATORS {
                prop_assert!(!lowered.contains(indicator), "leaked {:?} in {:?}", indicator, answer);
            }
        });
    }

    #[test]
    fn prop_no_documents_means_no_information() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let llm = StubLlm::replying("never used");
        let agent = ResponderAgent::new(llm.clone());

        proptest!(|(query in any::<String>())| {
            let response = runtime.block_on(agent.generate_response(&query, &[]));
            prop_assert_eq!(response, NO_INFORMATION_MESSAGE);
        });

        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn prop_category_counts_sum_to_document_count() {
        proptest!(|(documents in prop::collection::vec(document(), 0..30))| {
            let counts = category_counts(&documents);
            let total: usize = counts.iter().map(|(_, n)| n).sum();

            prop_assert_eq!(total, documents.len());
            prop_assert!(counts.iter().all(|(_, n)| *n > 0));
        });
    }
}
