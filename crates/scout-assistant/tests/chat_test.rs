use std::sync::Arc;
use std::time::Duration;

use scout_assistant::{
    ChatError, ChatSession, ChatState, ModelError, ModelSession, ModelTurn, NavigationLog,
    ScriptedModel, ToolCall, ToolRouter, TurnInput,
};
use scout_core::settings::Configuration;
use scout_core::types::Sender;
use scout_data::{ClientOptions, DataClient, Latency};
use serde_json::json;

fn mock_client() -> Arc<DataClient> {
    Arc::new(DataClient::new(
        &Configuration::default(),
        ClientOptions {
            latency: Latency::none(),
            ..Default::default()
        },
    ))
}

fn session(model: ScriptedModel, data: Arc<DataClient>) -> (ChatSession, Arc<NavigationLog>) {
    let nav = Arc::new(NavigationLog::new());
    let tools = ToolRouter::new(data, nav.clone());
    let boxed: Box<dyn ModelSession> = Box::new(model);
    (ChatSession::new(Ok(boxed), tools), nav)
}

fn tool_results(input: &TurnInput) -> &[scout_assistant::ToolResponse] {
    match input {
        TurnInput::ToolResults(results) => results,
        other => panic!("expected tool results, got {other:?}"),
    }
}

#[tokio::test]
async fn greeting_is_first_message() {
    let (chat, _) = session(ScriptedModel::new(), mock_client());
    assert!(chat.is_enabled());
    assert_eq!(chat.messages().len(), 1);
    assert_eq!(chat.messages()[0].sender, Sender::Assistant);
    assert!(chat.messages()[0].text.contains("Sentinel Scout"));
    assert_eq!(chat.state(), ChatState::AwaitingUserInput);
}

#[tokio::test]
async fn high_severity_question_runs_one_tool_and_answers_once() {
    let model = ScriptedModel::new()
        .with_turn(ModelTurn::tool_calls(vec![ToolCall::new(
            "listFindings",
            json!({ "severity": "High" }),
        )]))
        .with_turn(ModelTurn::text("There are 3 high severity findings."));
    let inputs = model.inputs();
    let (mut chat, _) = session(model, mock_client());

    let reply = chat
        .submit("What are my high-severity issues?")
        .await
        .unwrap()
        .unwrap()
        .clone();
    assert_eq!(reply.sender, Sender::Assistant);
    assert_eq!(reply.text, "There are 3 high severity findings.");

    // greeting, user, answer
    assert_eq!(chat.messages().len(), 3);
    assert_eq!(chat.messages()[1].sender, Sender::User);
    assert_eq!(chat.state(), ChatState::AwaitingUserInput);

    let inputs = inputs.lock().unwrap();
    assert_eq!(inputs.len(), 2);
    assert_eq!(
        inputs[0],
        TurnInput::UserText("What are my high-severity issues?".into())
    );
    let results = tool_results(&inputs[1]);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "listFindings");
    let items = results[0].response["result"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|i| i["severity"] == "High"));
}

#[tokio::test]
async fn multiple_calls_run_in_order_and_return_together() {
    let model = ScriptedModel::new()
        .with_turn(ModelTurn::tool_calls(vec![
            ToolCall::new("navigate", json!({ "page": "findings" })),
            ToolCall::new("getTrend", json!({})),
            ToolCall::new("navigate", json!({ "page": "reports" })),
        ]))
        .with_turn(ModelTurn::text("Done."));
    let inputs = model.inputs();
    let (mut chat, nav) = session(model, mock_client());

    chat.submit("show me around").await.unwrap();

    assert_eq!(nav.routes(), ["/findings", "/reports"]);
    assert_eq!(nav.current().as_deref(), Some("/reports"));

    let inputs = inputs.lock().unwrap();
    let results = tool_results(&inputs[1]);
    let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["navigate", "getTrend", "navigate"]);
    assert_eq!(results[0].response["navigated_to"], "/findings");
}

#[tokio::test]
async fn tool_rounds_chain_until_text() {
    let model = ScriptedModel::new()
        .with_turn(ModelTurn::tool_calls(vec![ToolCall::new("triggerScan", json!({}))]))
        .with_turn(ModelTurn::tool_calls(vec![ToolCall::new(
            "navigate",
            json!({ "page": "dashboard" }),
        )]))
        .with_turn(ModelTurn::text("Scan started."));
    let inputs = model.inputs();
    let (mut chat, nav) = session(model, mock_client());

    let reply = chat.submit("scan now").await.unwrap().unwrap();
    assert_eq!(reply.text, "Scan started.");
    assert_eq!(inputs.lock().unwrap().len(), 3);
    assert_eq!(nav.routes(), ["/dashboard"]);
}

#[tokio::test]
async fn model_failure_becomes_system_error_and_chat_continues() {
    let model = ScriptedModel::new().with_error(ModelError::Api {
        status: 429,
        message: "quota exceeded".into(),
    });
    let (mut chat, _) = session(model, mock_client());

    let reply = chat.submit("hello").await.unwrap().unwrap();
    assert!(reply.text.starts_with("System Error:"));
    assert!(reply.text.contains("quota exceeded"));
    assert_eq!(chat.state(), ChatState::AwaitingUserInput);

    // The next submission falls through to the scripted default.
    let next = chat.submit("hello again").await.unwrap().unwrap();
    assert_eq!(next.text, "Mock response");
    assert_eq!(chat.messages().len(), 5);
}

#[tokio::test]
async fn data_failure_is_returned_to_model_as_error_object() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead = format!("http://{}/api", listener.local_addr().unwrap());
    drop(listener);
    let data = Arc::new(DataClient::new(
        &Configuration::remote(dead),
        ClientOptions {
            request_timeout: Duration::from_secs(2),
            latency: Latency::none(),
        },
    ));

    let model = ScriptedModel::new()
        .with_turn(ModelTurn::tool_calls(vec![ToolCall::new("getTrend", json!({}))]))
        .with_turn(ModelTurn::text("The backend is unreachable."));
    let inputs = model.inputs();
    let (mut chat, _) = session(model, data);

    let reply = chat.submit("trend?").await.unwrap().unwrap();
    assert_eq!(reply.text, "The backend is unreachable.");

    let inputs = inputs.lock().unwrap();
    let results = tool_results(&inputs[1]);
    let error = results[0].response["error"].as_str().unwrap();
    assert!(error.starts_with("Failed to fetch trend"));
}

#[tokio::test]
async fn runaway_tool_loop_is_cut_off() {
    let mut model = ScriptedModel::new();
    for _ in 0..5 {
        model = model.with_turn(ModelTurn::tool_calls(vec![ToolCall::new("getTrend", json!({}))]));
    }
    let inputs = model.inputs();
    let abandoned = model.abandoned();
    let (chat, _) = session(model, mock_client());
    let mut chat = chat.with_max_tool_rounds(2);

    let reply = chat.submit("loop").await.unwrap().unwrap();
    assert!(reply.text.starts_with("System Error:"));
    // First send plus two rounds of results.
    assert_eq!(inputs.lock().unwrap().len(), 3);
    assert_eq!(*abandoned.lock().unwrap(), 1);
}

#[tokio::test]
async fn failed_submission_abandons_the_model_turn_only_on_error() {
    let model = ScriptedModel::new()
        .with_turn(ModelTurn::tool_calls(vec![ToolCall::new("getTrend", json!({}))]))
        .with_error(ModelError::Timeout)
        .with_turn(ModelTurn::text("ok"));
    let abandoned = model.abandoned();
    let (mut chat, _) = session(model, mock_client());

    let reply = chat.submit("trend?").await.unwrap().unwrap();
    assert_eq!(reply.text, "System Error: request timed out");
    assert_eq!(*abandoned.lock().unwrap(), 1);

    let reply = chat.submit("again").await.unwrap().unwrap();
    assert_eq!(reply.text, "ok");
    assert_eq!(*abandoned.lock().unwrap(), 1);
}

#[tokio::test]
async fn blank_input_is_ignored() {
    let model = ScriptedModel::new();
    let inputs = model.inputs();
    let (mut chat, _) = session(model, mock_client());

    assert!(chat.submit("   ").await.unwrap().is_none());
    assert_eq!(chat.messages().len(), 1);
    assert!(inputs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_credential_disables_chat() {
    let tools = ToolRouter::new(mock_client(), Arc::new(NavigationLog::new()));
    let mut chat = ChatSession::new(Err(ModelError::MissingCredential("API_KEY".into())), tools);

    assert!(!chat.is_enabled());
    assert_eq!(chat.messages().len(), 2);
    assert!(chat.messages()[1].text.contains("API_KEY is missing"));

    let err = chat.submit("hello").await.unwrap_err();
    assert!(matches!(err, ChatError::Disabled));
    assert_eq!(chat.messages().len(), 2);
}

#[tokio::test]
async fn other_start_failure_shows_initialization_error() {
    let tools = ToolRouter::new(mock_client(), Arc::new(NavigationLog::new()));
    let chat = ChatSession::new(Err(ModelError::Http("tls handshake".into())), tools);

    assert!(!chat.is_enabled());
    assert!(chat.messages()[1].text.starts_with("Initialization Error"));
    assert!(chat.messages()[1].text.contains("tls handshake"));
}
