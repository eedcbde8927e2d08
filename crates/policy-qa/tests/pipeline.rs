//! End-to-end session tests with a scripted model and a plain-text PDF backend

mod common;

use common::{assistant, assistant_with, paragraph_config, ScriptedLlm, HANDBOOK};
use policy_qa::{AppConfig, DocumentLoad, Error, Role, Session};

#[tokio::test]
async fn test_handbook_is_split_per_paragraph() {
    let llm = ScriptedLlm::new();
    let mut session = Session::new(assistant(llm.clone()));

    let load = session
        .load_document("handbook.pdf", HANDBOOK.as_bytes().to_vec())
        .await
        .unwrap();
    assert_eq!(load, DocumentLoad::Processed);

    let doc = session.document().unwrap();
    assert_eq!(doc.total_pages, 2);
    assert_eq!(doc.pages_with_text, 2);
    assert_eq!(doc.chunks.len(), 4);
    assert!(doc.chunks[0].starts_with("Annual leave policy"));
    assert!(doc.chunks[1].starts_with("Office hours"));
    assert!(doc.chunks[2].starts_with("Sick leave rules"));
    assert!(doc.chunks[3].starts_with("Dress code"));

    // Ingestion never calls the model
    assert!(llm.requests().is_empty());
}

#[tokio::test]
async fn test_question_selects_matching_chunks() {
    let llm = ScriptedLlm::new();
    llm.reply("Vacation, Leave")
        .reply("You receive 25 days of paid leave per year.");
    let mut session = Session::new(assistant(llm.clone()));
    session
        .load_document("handbook.pdf", HANDBOOK.as_bytes().to_vec())
        .await
        .unwrap();

    let response = session.ask("How much vacation do I get?").await.unwrap();

    assert!(!response.is_error);
    assert_eq!(response.answer, "You receive 25 days of paid leave per year.");
    assert_eq!(response.key_terms, vec!["vacation", "leave"]);
    assert_eq!(response.selected_chunks, vec![0, 2]);
    assert!(!response.used_fallback);

    let requests = llm.requests();
    assert_eq!(requests.len(), 2);

    // Key-term call: question is the only user input
    assert_eq!(requests[0].temperature, 0.0);
    assert_eq!(requests[0].model, "gpt-4o");
    assert_eq!(requests[0].messages.len(), 2);
    assert_eq!(requests[0].messages[1].content, "How much vacation do I get?");

    // Answer call: context carries chunks 0 and 2 only
    let system = &requests[1].messages[0].content;
    assert!(system.contains("Annual leave policy"));
    assert!(system.contains("Sick leave rules"));
    assert!(!system.contains("Office hours"));
    assert!(!system.contains("Dress code"));
    assert_eq!(requests[1].messages[1].role, Role::User);

    let turns = session.transcript().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[1].role, Role::Assistant);
    assert_eq!(turns[1].content, response.answer);
}

#[tokio::test]
async fn test_fallback_sends_first_three_chunks() {
    let llm = ScriptedLlm::new();
    llm.reply("pension retirement contributions")
        .reply("I don't know.");
    let mut session = Session::new(assistant(llm.clone()));
    session
        .load_document("handbook.pdf", HANDBOOK.as_bytes().to_vec())
        .await
        .unwrap();

    let response = session.ask("What about my pension?").await.unwrap();

    assert!(response.used_fallback);
    assert_eq!(response.selected_chunks, vec![0, 1, 2]);

    let doc = session.document().unwrap();
    let expected_context = doc.chunks[..3].join("\n\n");
    let system = &llm.requests()[1].messages[0].content;
    assert!(system.contains(&expected_context));
    assert!(!system.contains("Dress code"));
}

#[tokio::test]
async fn test_key_term_failure_becomes_error_turn() {
    let llm = ScriptedLlm::new();
    llm.fail("quota exceeded");
    let mut session = Session::new(assistant(llm.clone()));
    session
        .load_document("handbook.pdf", HANDBOOK.as_bytes().to_vec())
        .await
        .unwrap();

    let response = session.ask("How much vacation?").await.unwrap();

    assert!(response.is_error);
    assert!(response
        .answer
        .starts_with("Sorry, I encountered an error while processing your question:"));
    assert!(response.answer.contains("quota exceeded"));
    // The answer call is never made
    assert_eq!(llm.requests().len(), 1);

    let last = session.transcript().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(last.is_error);
}

#[tokio::test]
async fn test_failed_question_keeps_history_and_session_usable() {
    let llm = ScriptedLlm::new();
    llm.reply("leave")
        .reply("25 days.")
        .reply("sick")
        .fail("connection reset")
        .reply("dress")
        .reply("Business casual.");
    let mut session = Session::new(assistant(llm.clone()));
    session
        .load_document("handbook.pdf", HANDBOOK.as_bytes().to_vec())
        .await
        .unwrap();

    let first = session.ask("How much leave?").await.unwrap();
    let second = session.ask("Sick leave?").await.unwrap();
    let third = session.ask("Dress code?").await.unwrap();

    assert!(!first.is_error);
    assert!(second.is_error);
    assert!(!third.is_error);
    assert_eq!(third.answer, "Business casual.");

    let contents: Vec<&str> = session
        .transcript()
        .turns()
        .iter()
        .map(|t| t.content.as_str())
        .collect();
    assert_eq!(contents.len(), 6);
    assert_eq!(contents[0], "How much leave?");
    assert_eq!(contents[1], "25 days.");
    assert!(contents[3].contains("connection reset"));
    assert_eq!(contents[5], "Business casual.");
}

#[tokio::test]
async fn test_question_without_document_is_rejected_before_any_call() {
    let llm = ScriptedLlm::new();
    let mut session = Session::new(assistant(llm.clone()));

    let outcome = session.ask("How much leave?").await;

    assert!(matches!(outcome, Err(Error::NoDocument)));
    assert!(session.transcript().is_empty());
    assert!(llm.requests().is_empty());
}

#[tokio::test]
async fn test_blank_question_is_ignored() {
    let llm = ScriptedLlm::new();
    let mut session = Session::new(assistant(llm.clone()));
    session
        .load_document("handbook.pdf", HANDBOOK.as_bytes().to_vec())
        .await
        .unwrap();

    assert!(matches!(session.ask("   ").await, Err(Error::EmptyQuestion)));
    assert!(session.transcript().is_empty());
}

#[tokio::test]
async fn test_empty_document_short_circuits() {
    let llm = ScriptedLlm::new();
    let mut session = Session::new(assistant(llm.clone()));

    let outcome = session
        .load_document("scan.pdf", b"\x0c  \x0c\n".to_vec())
        .await;

    assert!(matches!(outcome, Err(Error::NoExtractableText(_))));
    assert!(session.document().is_none());
    assert!(matches!(
        session.ask("Anything?").await,
        Err(Error::NoDocument)
    ));
    assert!(llm.requests().is_empty());
}

#[tokio::test]
async fn test_same_bytes_reuse_cache() {
    let llm = ScriptedLlm::new();
    let mut session = Session::new(assistant(llm));

    session
        .load_document("handbook.pdf", HANDBOOK.as_bytes().to_vec())
        .await
        .unwrap();
    let first_id = session.document().unwrap().id;

    let load = session
        .load_document("handbook.pdf", HANDBOOK.as_bytes().to_vec())
        .await
        .unwrap();

    assert_eq!(load, DocumentLoad::Cached);
    assert_eq!(session.document().unwrap().id, first_id);
}

#[tokio::test]
async fn test_new_document_invalidates_cache() {
    let llm = ScriptedLlm::new();
    let mut session = Session::new(assistant(llm));

    session
        .load_document("handbook.pdf", HANDBOOK.as_bytes().to_vec())
        .await
        .unwrap();
    let first_id = session.document().unwrap().id;

    let revised = HANDBOOK.replace("25 days", "30 days");
    let load = session
        .load_document("handbook-v2.pdf", revised.into_bytes())
        .await
        .unwrap();

    assert_eq!(load, DocumentLoad::Processed);
    let doc = session.document().unwrap();
    assert_ne!(doc.id, first_id);
    assert_eq!(doc.filename, "handbook-v2.pdf");
    assert!(doc.chunks[0].contains("30 days"));
}

#[tokio::test]
async fn test_failed_replacement_drops_stale_document() {
    let llm = ScriptedLlm::new();
    let mut session = Session::new(assistant(llm));

    session
        .load_document("handbook.pdf", HANDBOOK.as_bytes().to_vec())
        .await
        .unwrap();
    let outcome = session.load_document("scan.pdf", b"   ".to_vec()).await;

    assert!(matches!(outcome, Err(Error::NoExtractableText(_))));
    assert!(session.document().is_none());
}

#[tokio::test]
async fn test_reextraction_is_idempotent() {
    let config = AppConfig::default();
    let mut first = Session::new(assistant_with(&config, ScriptedLlm::new()));
    let mut second = Session::new(assistant_with(&config, ScriptedLlm::new()));

    first
        .load_document("handbook.pdf", HANDBOOK.as_bytes().to_vec())
        .await
        .unwrap();
    second
        .load_document("handbook.pdf", HANDBOOK.as_bytes().to_vec())
        .await
        .unwrap();

    let (a, b) = (first.document().unwrap(), second.document().unwrap());
    assert_eq!(a.text, b.text);
    assert_eq!(a.chunks, b.chunks);
    assert_eq!(a.source_hash, b.source_hash);
}

#[tokio::test]
async fn test_organization_appears_in_prompts() {
    let mut config = paragraph_config();
    config.assistant.organization = "Acme".to_string();
    let llm = ScriptedLlm::new();
    llm.reply("leave").reply("25 days.");
    let mut session = Session::new(assistant_with(&config, llm.clone()));
    session
        .load_document("handbook.pdf", HANDBOOK.as_bytes().to_vec())
        .await
        .unwrap();

    session.ask("How much leave?").await.unwrap();

    let requests = llm.requests();
    assert!(requests[0].messages[0].content.contains("Acme HR policy"));
    assert!(requests[1].messages[0].content.contains("Acme's HR policies"));
}
