use super::*;

struct EchoRunner;

#[async_trait]
impl ToolRunner for EchoRunner {
    async fn call(&self, name: &str, arguments: &Value) -> ToolOutcome {
        if name == "fail" {
            return ToolOutcome::failed("forced failure");
        }
        ToolOutcome::ok(serde_json::json!({"name": name, "echoed": arguments}))
    }
}

#[tokio::test]
async fn echo_runner_reports_success() {
    let runner = EchoRunner;
    let outcome = runner.call("echo", &serde_json::json!({"x": 1})).await;
    assert!(outcome.error.is_none());
    assert_eq!(outcome.result["name"], "echo");
}

#[tokio::test]
async fn echo_runner_can_report_failure() {
    let runner = EchoRunner;
    let outcome = runner.call("fail", &Value::Null).await;
    assert_eq!(outcome.error.as_deref(), Some("forced failure"));
}
