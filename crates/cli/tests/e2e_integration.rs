//! End-to-end tests for the Tensive repair assistant.
//!
//! These run the full pipeline from utterance to normalized response:
//! retrieval over the built-in corpus, prompt assembly, a scripted model,
//! tool dispatch, and the HTTP gateway on top.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tensive_agent::footer::{self, SAFETY};
use tensive_agent::orchestrator::{CONNECTION_APOLOGY, RESTATE_REQUEST};
use tensive_agent::reply::IMAGE_ONLY_QUERY;
use tensive_agent::{ChatSession, Mode, NormalizedResponse, Orchestrator, Utterance};
use tensive_core::error::ProviderError;
use tensive_core::message::{Message, MessageToolCall, Role};
use tensive_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use tensive_gateway::{GatewayState, build_router};
use tensive_knowledge::KnowledgeStore;
use tensive_tools::CalculatorField;
use tower::ServiceExt;

// ── Mock Provider ────────────────────────────────────────────────────────

/// Returns scripted responses in sequence and records each request.
struct ScriptedProvider {
    responses: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(text_response(t))).collect())
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn system_prompt(&self, call: usize) -> String {
        let requests = self.requests.lock().unwrap();
        let first = &requests[call].messages[0];
        assert_eq!(first.role, Role::System);
        first.content.clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            panic!("ScriptedProvider exhausted after {} calls", self.calls());
        }
        responses.remove(0)
    }
}

fn response(message: Message) -> ProviderResponse {
    ProviderResponse {
        message,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock".into(),
    }
}

fn text_response(text: &str) -> ProviderResponse {
    response(Message::assistant(text))
}

fn tool_response(content: &str, name: &str, args: serde_json::Value) -> ProviderResponse {
    let mut msg = Message::assistant(content);
    msg.tool_calls = vec![MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: args.to_string(),
    }];
    response(msg)
}

fn session_with(provider: Arc<ScriptedProvider>) -> ChatSession {
    let knowledge = Arc::new(KnowledgeStore::builtin().unwrap());
    let orchestrator = Arc::new(Orchestrator::new(provider, "mock", knowledge));
    ChatSession::new(orchestrator)
}

// ── Retrieval grounding ──────────────────────────────────────────────────

#[tokio::test]
async fn e2e_blister_question_is_grounded_and_releases_assets() {
    let provider = Arc::new(ScriptedProvider::texts(&[
        "Cut it open, dry it, then patch it.\n\n[[SAFETY: Take care with blades on a pitched edge.]]",
    ]));
    let session = session_with(provider.clone());

    let reply = session
        .process_message(Utterance::text("How do I fix blister repair on my roof?").unwrap())
        .await;

    let prompt = provider.system_prompt(0);
    assert!(prompt.contains("RELEVANT TOPICS FOUND:"));
    assert!(prompt.contains("*** FULL KNOWLEDGE BASE ENTRY LOADED ***"));
    assert!(prompt.contains("Title: Blister Repair"));

    let NormalizedResponse::Text { text, assets, .. } = reply else {
        panic!("expected text response");
    };
    let assets = assets.expect("assets released for a strong match");
    assert_eq!(assets.pdf.as_deref(), Some("/docs/blister-repair-guide.pdf"));

    let tagged = footer::parse(&text);
    assert_eq!(tagged.body, "Cut it open, dry it, then patch it.");
    assert_eq!(
        tagged.payloads(SAFETY).collect::<Vec<_>>(),
        vec!["Take care with blades on a pitched edge."]
    );
}

#[tokio::test]
async fn e2e_unrelated_question_lists_topics_without_entry() {
    let provider = Arc::new(ScriptedProvider::texts(&["Hello there."]));
    let session = session_with(provider.clone());

    let reply = session
        .process_message(Utterance::text("hi").unwrap())
        .await;

    let prompt = provider.system_prompt(0);
    assert!(prompt.contains("RELEVANT TOPICS FOUND:"));
    assert!(!prompt.contains("FULL KNOWLEDGE BASE ENTRY LOADED"));
    assert_eq!(
        reply,
        NormalizedResponse::Text {
            text: "Hello there.".into(),
            options: vec![],
            assets: None,
        }
    );
}

// ── Tool dispatch ────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_model_calls_spot_repair_calculator() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(tool_response(
        "",
        "calculate_spot_repair",
        serde_json::json!({"length": 10, "width": 5, "count": 3}),
    ))]));
    let session = session_with(provider.clone());

    let reply = session
        .process_message(Utterance::text("I have three 10 by 5 foot patches to do").unwrap())
        .await;

    let NormalizedResponse::CalculationResult { text, data } = reply else {
        panic!("expected calculation result");
    };
    assert_eq!(text, "I've calculated the materials for a 10' x 5' patch (3 count).");
    assert_eq!(data.total_area, 150.0);
    let quantities: Vec<u32> = data.materials.iter().map(|m| m.quantity).collect();
    assert_eq!(quantities, vec![3, 3, 1]);

    let tools: Vec<String> = provider.requests.lock().unwrap()[0]
        .tools
        .iter()
        .map(|t| t.name.clone())
        .collect();
    assert_eq!(tools, vec!["calculate_spot_repair", "suggest_next_steps"]);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn e2e_count_defaults_to_one() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(tool_response(
        "",
        "calculate_spot_repair",
        serde_json::json!({"length": 8, "width": 4}),
    ))]));
    let session = session_with(provider);

    let reply = session
        .process_message(Utterance::text("one patch, 8 by 4").unwrap())
        .await;

    let NormalizedResponse::CalculationResult { data, .. } = reply else {
        panic!("expected calculation result");
    };
    assert_eq!(data.total_area, 32.0);
}

#[tokio::test]
async fn e2e_invalid_tool_arguments_ask_for_restatement() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(tool_response(
        "",
        "calculate_spot_repair",
        serde_json::json!({"length": -3, "width": 4}),
    ))]));
    let session = session_with(provider);

    let reply = session
        .process_message(Utterance::text("minus three by four").unwrap())
        .await;
    assert_eq!(reply, NormalizedResponse::text(RESTATE_REQUEST));
}

#[tokio::test]
async fn e2e_model_suggests_next_steps() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(tool_response(
        "",
        "suggest_next_steps",
        serde_json::json!({
            "message": "What is the roof covered with?",
            "options": ["EPDM", "TPO", "Felt"]
        }),
    ))]));
    let session = session_with(provider);

    let reply = session
        .process_message(Utterance::text("my flat roof leaks").unwrap())
        .await;

    let NormalizedResponse::Text { text, options, .. } = reply else {
        panic!("expected text with options");
    };
    assert_eq!(text, "What is the roof covered with?");
    let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["EPDM", "TPO", "Felt"]);
}

// ── Failures and history ─────────────────────────────────────────────────

#[tokio::test]
async fn e2e_transport_failure_apologizes_and_keeps_user_turn() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(text_response("First answer.")),
        Err(ProviderError::Network("connection reset".into())),
    ]));
    let session = session_with(provider);

    session
        .process_message(Utterance::text("first").unwrap())
        .await;
    let reply = session
        .process_message(Utterance::text("second").unwrap())
        .await;
    assert_eq!(reply, NormalizedResponse::text(CONNECTION_APOLOGY));

    let state = session.snapshot().await;
    let contents: Vec<&str> = state.history().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "First answer.", "second"]);
}

#[tokio::test]
async fn e2e_history_window_evicts_oldest_turns() {
    let answers: Vec<String> = (0..6).map(|i| format!("answer {i}")).collect();
    let refs: Vec<&str> = answers.iter().map(String::as_str).collect();
    let provider = Arc::new(ScriptedProvider::texts(&refs));
    let session = session_with(provider.clone());

    for i in 0..6 {
        session
            .process_message(Utterance::text(format!("question {i}")).unwrap())
            .await;
    }

    let state = session.snapshot().await;
    assert_eq!(state.history_len(), 10);
    assert_eq!(state.history().next().unwrap().content, "question 1");

    // System framing plus at most ten history turns reach the model.
    let last = provider.requests.lock().unwrap().last().unwrap().messages.len();
    assert_eq!(last, 11);
}

#[tokio::test]
async fn e2e_clear_history_starts_fresh() {
    let provider = Arc::new(ScriptedProvider::texts(&["one", "two"]));
    let session = session_with(provider.clone());

    session
        .process_message(Utterance::text("remember this").unwrap())
        .await;
    session.clear_history().await;
    session
        .process_message(Utterance::text("new topic").unwrap())
        .await;

    let requests = provider.requests.lock().unwrap();
    assert_eq!(requests[1].messages.len(), 2);
    assert_eq!(requests[1].messages[1].content, "new topic");
}

#[tokio::test]
async fn e2e_image_only_utterance_reaches_model() {
    let provider = Arc::new(ScriptedProvider::texts(&["That looks like a split seam."]));
    let session = session_with(provider.clone());

    let utterance = Utterance::new(None, Some("data:image/jpeg;base64,AAAA".into())).unwrap();
    session.process_message(utterance).await;

    let requests = provider.requests.lock().unwrap();
    let user = &requests[0].messages[1];
    assert_eq!(user.content, IMAGE_ONLY_QUERY);
    assert!(user.has_image());
}

// ── Guided estimator ─────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_guided_estimate_from_free_text() {
    let provider = Arc::new(ScriptedProvider::texts(&[]));
    let session = session_with(provider.clone());

    let first = session.advance_calculator("").await;
    let NormalizedResponse::Question { options, .. } = first else {
        panic!("expected repair type question");
    };
    assert_eq!(options.len(), 3);

    session.advance_calculator("a spot patch").await;
    let unclear = session.advance_calculator("not sure yet").await;
    assert!(unclear.display_text().contains("dimensions"));

    session.advance_calculator("12 by 6").await;
    let result = session.advance_calculator("2").await;

    let NormalizedResponse::CalculationResult { data, .. } = result else {
        panic!("expected calculation result");
    };
    assert_eq!(data.total_area, 144.0);

    let state = session.snapshot().await;
    assert!(state.calculator.is_empty());
    assert_eq!(state.mode, Mode::General);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn e2e_guided_estimate_rejects_out_of_order_selection() {
    let session = session_with(Arc::new(ScriptedProvider::texts(&[])));

    let err = session
        .update_calculator(CalculatorField::Count(4))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("repair_type"));
    assert!(session.snapshot().await.calculator.is_empty());
}

// ── Gateway ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_gateway_chat_round_trip() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(text_response("Clean the seam first.")),
        Ok(tool_response(
            "",
            "calculate_spot_repair",
            serde_json::json!({"length": 2, "width": 2}),
        )),
    ]));
    let knowledge = Arc::new(KnowledgeStore::builtin().unwrap());
    let orchestrator = Arc::new(Orchestrator::new(provider.clone(), "mock", knowledge));
    let state = Arc::new(GatewayState::new(orchestrator));

    let send = |body: serde_json::Value| {
        let app = build_router(state.clone(), &[]);
        async move {
            let req = Request::builder()
                .method("POST")
                .uri("/v1/chat")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            let resp = app.oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            let bytes = resp.into_body().collect().await.unwrap().to_bytes();
            serde_json::from_slice::<serde_json::Value>(&bytes).unwrap()
        }
    };

    let first = send(serde_json::json!({"message": "my seam split"})).await;
    assert_eq!(first["response"]["type"], "text");
    let id = first["session_id"].as_str().unwrap().to_string();

    let second = send(serde_json::json!({"session_id": id, "message": "2 by 2"})).await;
    assert_eq!(second["session_id"], id.as_str());
    assert_eq!(second["response"]["type"], "calculation_result");
    assert_eq!(second["response"]["data"]["totalArea"], 4.0);

    // The second request carried the first exchange.
    let requests = provider.requests.lock().unwrap();
    assert_eq!(requests[1].messages.len(), 4);
}

// ── Custom knowledge file ────────────────────────────────────────────────

#[tokio::test]
async fn e2e_custom_knowledge_file_replaces_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kb.toml");
    std::fs::write(
        &path,
        r#"
[[entries]]
title = "Gutter Outlet Sealing"
keywords = ["GUTTER", "outlet"]
content = "Seal the outlet collar with reinforced base coat."
"#,
    )
    .unwrap();

    let knowledge = Arc::new(KnowledgeStore::load(Some(path.as_path())).unwrap());
    assert_eq!(knowledge.len(), 1);

    let provider = Arc::new(ScriptedProvider::texts(&["Seal the collar."]));
    let orchestrator = Arc::new(Orchestrator::new(provider.clone(), "mock", knowledge));
    let session = ChatSession::new(orchestrator);

    session
        .process_message(Utterance::text("my gutter outlet leaks").unwrap())
        .await;

    let prompt = provider.system_prompt(0);
    assert!(prompt.contains("Title: Gutter Outlet Sealing"));
}
