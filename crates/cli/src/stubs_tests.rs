use super::*;

#[tokio::test]
async fn unconfigured_llm_client_reports_no_provider() {
    let client = UnconfiguredLlmClient;
    let err = client.step(&[]).await.expect_err("no provider configured");
    assert!(matches!(err, LlmError::Provider(_)));
}

#[tokio::test]
async fn unconfigured_tool_runner_fails_every_call() {
    let runner = UnconfiguredToolRunner;
    let outcome = runner.call("search", &Value::Null).await;
    assert!(outcome.error.is_some());
    assert_eq!(outcome.result, Value::Null);
}
