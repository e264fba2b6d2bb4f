use super::*;
use crate::corpus::Chunk;
use crate::testing::KeywordEmbedder;
use std::sync::Arc;

fn chunk(text: &str, source: &str, chunk_index: usize) -> Chunk {
    Chunk {
        text: text.to_string(),
        source: source.to_string(),
        chunk_index,
    }
}

fn knowledge_base() -> KnowledgeBase {
    let corpus = vec![
        chunk("Dialysis filters the blood when kidneys fail.", "treatment.pdf", 0),
        chunk(
            "PKD is a genetic kidney disorder in which cysts grow in the kidneys.",
            "overview.pdf",
            0,
        ),
        chunk("High blood pressure is common and should be controlled.", "overview.pdf", 1),
    ];
    KnowledgeBase::from_chunks(corpus, Arc::new(KeywordEmbedder::default()))
        .expect("should build knowledge base")
}

#[test]
fn augmented_query_contains_directives() {
    let augmented = PromptBuilder::augment_query("  What is PKD?  ");

    assert!(augmented.starts_with("What is PKD? "));
    assert!(augmented.contains(STYLE_DIRECTIVE));
    assert!(augmented.contains(REFUSAL_MESSAGE));
    assert!(augmented.contains("under 150 words"));
}

#[test]
fn prompt_contains_question_and_retrieved_chunk() {
    let knowledge = knowledge_base();
    let builder = PromptBuilder::default();

    let prompt = builder
        .build_prompt(&knowledge, "What is PKD?")
        .expect("should build prompt");

    assert!(prompt.text.contains("What is PKD?"));
    assert!(
        prompt
            .text
            .contains("PKD is a genetic kidney disorder in which cysts grow in the kidneys.")
    );
    assert!(prompt.text.starts_with("Context:\n"));
    assert!(prompt.text.contains("\n\nQuestion: What is PKD?"));
    assert_eq!(prompt.contexts.len(), 1);
    assert_eq!(prompt.contexts[0].chunk.source, "overview.pdf");
}

#[test]
fn default_retrieves_single_chunk() {
    assert_eq!(PromptBuilder::default().k(), 1);
    assert_eq!(PromptBuilder::new(&RetrievalConfig::default()).k(), 1);
}

#[test]
fn multiple_chunks_are_ordered_by_distance() {
    let knowledge = knowledge_base();
    let builder = PromptBuilder::new(&RetrievalConfig {
        k: 2,
        max_distance: None,
    });

    let prompt = builder
        .build_prompt(&knowledge, "Does PKD raise blood pressure?")
        .expect("should build prompt");

    assert_eq!(prompt.contexts.len(), 2);
    assert!(prompt.contexts[0].distance <= prompt.contexts[1].distance);

    let first = prompt
        .text
        .find(&prompt.contexts[0].chunk.text)
        .expect("first chunk in prompt");
    let second = prompt
        .text
        .find(&prompt.contexts[1].chunk.text)
        .expect("second chunk in prompt");
    assert!(first < second);
}

#[test]
fn k_larger_than_corpus_is_clamped() {
    let knowledge = knowledge_base();
    let builder = PromptBuilder::new(&RetrievalConfig {
        k: 10,
        max_distance: None,
    });

    let prompt = builder
        .build_prompt(&knowledge, "What is PKD?")
        .expect("should build prompt");
    assert_eq!(prompt.contexts.len(), 3);
}

#[test]
fn building_is_repeatable() {
    let knowledge = knowledge_base();
    let builder = PromptBuilder::default();

    let first = builder
        .build_prompt(&knowledge, "What is PKD?")
        .expect("should build prompt");
    let second = builder
        .build_prompt(&knowledge, "What is PKD?")
        .expect("should build prompt");
    assert_eq!(first, second);
}

#[test]
fn out_of_domain_uses_best_distance() {
    let knowledge = knowledge_base();
    let prompt = PromptBuilder::default()
        .build_prompt(&knowledge, "Who won the football match?")
        .expect("should build prompt");

    let best = prompt.best_distance().expect("has a best distance");
    assert!(best > 0.0);
    assert!(prompt.is_out_of_domain(Some(best / 2.0)));
    assert!(!prompt.is_out_of_domain(Some(best)));
    assert!(!prompt.is_out_of_domain(None));
}

#[test]
fn refusal_is_recognised_despite_rewording() {
    assert!(is_refusal(REFUSAL_MESSAGE));
    assert!(is_refusal(&format!("{}.", REFUSAL_MESSAGE)));
    assert!(is_refusal(&format!("\u{201c}{}\u{201d}", REFUSAL_MESSAGE)));
    assert!(is_refusal(
        "Sorry unable to provide the answer.  The question that you asked is OUTSIDE my\n\
         knowledge-base."
    ));
}

#[test]
fn ordinary_answers_are_not_refusals() {
    assert!(!is_refusal("PKD is a genetic condition that causes cysts in the kidneys."));
    assert!(!is_refusal("Your kidneys are outside the chest cavity."));
    assert!(!is_refusal(""));
}
