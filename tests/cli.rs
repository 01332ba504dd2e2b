use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = "<html><body><h1>Title</h1><p>A.</p><p>B.</p></body></html>";

fn command(workdir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_summurai"));
    cmd.current_dir(workdir)
        .env_remove("OPENAI_BASE_URL")
        .env_remove("OPENAI_MAX_RETRIES")
        .env("RUST_LOG", "off");
    cmd
}

async fn run_blocking(mut cmd: Command, stdin: Option<&'static str>) -> Output {
    tokio::task::spawn_blocking(move || {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = cmd.spawn().expect("failed to spawn summurai binary");
        let mut pipe = child.stdin.take().expect("stdin should be piped");
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes())
                .expect("failed to write stdin");
        }
        drop(pipe);
        child.wait_with_output().expect("failed to wait for summurai")
    })
    .await
    .expect("blocking task should join")
}

fn completion(content: &str) -> serde_json::Value {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
}

async fn mount_article(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE))
        .mount(server)
        .await;
}

#[test]
fn missing_api_key_exits_with_status_one() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let output = command(dir.path())
        .args(["https://example.com", "--no-render"])
        .output()
        .expect("failed to run summurai binary");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("You must provide an OpenAI API key"),
        "unexpected stderr:\n{stderr}"
    );
}

#[test]
fn missing_pdf_exits_with_status_one_and_names_the_path() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let output = command(dir.path())
        .args(["--api-key", "sk-test", "--pdf", "no-such-file.pdf"])
        .output()
        .expect("failed to run summurai binary");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Could not find PDF file: no-such-file.pdf"),
        "unexpected stderr:\n{stderr}"
    );
}

#[test]
fn url_and_pdf_together_is_a_usage_error() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let output = command(dir.path())
        .args(["-a", "sk-test", "-u", "https://example.com", "-p", "paper.pdf"])
        .output()
        .expect("failed to run summurai binary");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("Reading PDF"), "unexpected stderr:\n{stderr}");
}

#[test]
fn no_input_source_is_a_usage_error() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let output = command(dir.path())
        .args(["-a", "sk-test"])
        .output()
        .expect("failed to run summurai binary");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("either a URL or a PDF file"),
        "unexpected stderr:\n{stderr}"
    );
}

#[test]
fn help_exits_successfully() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let output = command(dir.path())
        .arg("--help")
        .output()
        .expect("failed to run summurai binary");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--skip-summary"));
    assert!(stdout.contains("--interactive"));
}

#[tokio::test(flavor = "multi_thread")]
async fn summarizes_a_webpage_using_the_config_file() {
    let server = MockServer::start().await;
    mount_article(&server).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-file"))
        .and(body_partial_json(json!({
            "model": "gpt-file",
            "messages": [{"role": "system"}, {"role": "user", "content": "Title\n\nA.\n\nB.\n\n"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("THE SUMMARY")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir should be created");
    std::fs::write(
        dir.path().join("summurai.conf"),
        "openai_api_key=sk-file\nopenai_chat_model=gpt-file\n",
    )
    .expect("failed to write config");

    let url = format!("{}/article", server.uri());
    let mut cmd = command(dir.path());
    cmd.env("OPENAI_BASE_URL", server.uri())
        .args([url.as_str(), "--no-render"]);
    let output = run_blocking(cmd, None).await;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(0), "stderr:\n{stderr}");
    assert!(stdout.contains("THE SUMMARY"), "stdout:\n{stdout}");
    assert!(stdout.contains("Generated by summurai"));
    assert!(stdout.contains(&format!("Webpage URL: {url}")));
    assert!(stdout.contains("Summarized using: gpt-file"));
    assert!(stderr.contains("Retrieving webpage content..."));
    assert!(stderr.contains("Summarizing content..."));
}

#[tokio::test(flavor = "multi_thread")]
async fn interactive_mode_answers_follow_ups_until_exit() {
    let server = MockServer::start().await;
    mount_article(&server).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("THE SUMMARY")))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system"},
                {"role": "user"},
                {"role": "assistant", "content": "THE SUMMARY"},
                {"role": "user", "content": "Who wrote it?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("FOLLOW UP")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir should be created");
    let url = format!("{}/article", server.uri());
    let mut cmd = command(dir.path());
    cmd.env("OPENAI_BASE_URL", server.uri())
        .args([url.as_str(), "--no-render", "-a", "sk-test", "-i", "-s"]);
    let output = run_blocking(cmd, Some("Who wrote it?\nEXIT\n")).await;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(0), "stderr:\n{stderr}");
    assert!(!stdout.contains("THE SUMMARY"), "summary should be skipped:\n{stdout}");
    assert!(stdout.contains("FOLLOW UP"), "stdout:\n{stdout}");
    assert!(stderr.contains("Interactive mode."));
    assert!(stdout.contains("Summarized using: gpt-4-turbo-preview"));
}

#[tokio::test(flavor = "multi_thread")]
async fn interactive_mode_fails_when_input_ends() {
    let server = MockServer::start().await;
    mount_article(&server).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("THE SUMMARY")))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir should be created");
    let url = format!("{}/article", server.uri());
    let mut cmd = command(dir.path());
    cmd.env("OPENAI_BASE_URL", server.uri())
        .args([url.as_str(), "--no-render", "-a", "sk-test", "-i"]);
    let output = run_blocking(cmd, None).await;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Input closed"), "stderr:\n{stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn chat_api_errors_exit_with_status_one() {
    let server = MockServer::start().await;
    mount_article(&server).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir should be created");
    let url = format!("{}/article", server.uri());
    let mut cmd = command(dir.path());
    cmd.env("OPENAI_BASE_URL", server.uri())
        .args([url.as_str(), "--no-render", "-a", "sk-bad"]);
    let output = run_blocking(cmd, None).await;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("401"), "stderr:\n{stderr}");
    assert!(stderr.contains("invalid api key"), "stderr:\n{stderr}");
}
