use super::*;

#[tokio::test]
async fn run_always_succeeds() {
    assert!(run(SkillsArgs::default()).await.is_ok());
}
