use anyhow::Result;
use httpmock::prelude::*;
use lti_outcomes_export::adapters::gradebook::load_for_action;
use lti_outcomes_export::{
    Action, CliConfig, CsvGradebook, ExportEngine, InMemoryGradebook, LocalStorage, LtiError,
    LtiExportPlugin,
};
use tempfile::TempDir;

const GRADES_CSV: &str = "\
assignment,duedate,timestamp,student_id,last_name,first_name,email,raw_score,late_submission_penalty,score,max_score
ps1,,,bar,,,,0.75,0.0,0.75,1.0
ps2,,,foo,,,,0.0,0.0,0.0,1.0
";

const READ_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<imsx_POXEnvelopeResponse xmlns="http://www.imsglobal.org/services/ltiv1p1/xsd/imsoms_v1p0">
  <imsx_POXHeader>
    <imsx_POXResponseHeaderInfo>
      <imsx_version>V1.0</imsx_version>
      <imsx_messageIdentifier>4560</imsx_messageIdentifier>
      <imsx_statusInfo>
        <imsx_codeMajor>success</imsx_codeMajor>
        <imsx_severity>status</imsx_severity>
        <imsx_description>Result read</imsx_description>
        <imsx_operationRefIdentifier>readResult</imsx_operationRefIdentifier>
      </imsx_statusInfo>
    </imsx_POXResponseHeaderInfo>
  </imsx_POXHeader>
  <imsx_POXBody>
    <readResultResponse>
      <result><resultScore><language>en</language><textString>0</textString></resultScore></result>
    </readResultResponse>
  </imsx_POXBody>
</imsx_POXEnvelopeResponse>
"#;

fn status_response(code_major: &str, operation: &str, description: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<imsx_POXEnvelopeResponse xmlns="http://www.imsglobal.org/services/ltiv1p1/xsd/imsoms_v1p0">
  <imsx_POXHeader><imsx_POXResponseHeaderInfo>
    <imsx_version>V1.0</imsx_version>
    <imsx_messageIdentifier>4561</imsx_messageIdentifier>
    <imsx_statusInfo>
      <imsx_codeMajor>{code_major}</imsx_codeMajor>
      <imsx_severity>status</imsx_severity>
      <imsx_description>{description}</imsx_description>
    </imsx_statusInfo>
  </imsx_POXResponseHeaderInfo></imsx_POXHeader>
  <imsx_POXBody><{operation}/></imsx_POXBody>
</imsx_POXEnvelopeResponse>"#
    )
}

fn cli_config(url: String, action: &str, to: Option<String>) -> CliConfig {
    CliConfig {
        key: "key".to_string(),
        secret: "secret".to_string(),
        lis_outcome_service_url: url,
        lis_result_sourcedid: "abcdef".to_string(),
        assignment: "ps2".to_string(),
        student_id: "foo".to_string(),
        user_id: Some("foo".to_string()),
        action: action.to_string(),
        to,
        gradebook: "grades.csv".to_string(),
        timeout_seconds: 5,
        normalize_score: false,
        verbose: false,
        json_logs: false,
    }
}

#[tokio::test]
async fn test_read_writes_raw_response_verbatim() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let read_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/outcomes")
            .header("content-type", "application/xml")
            .header_exists("authorization")
            .body_contains("<readResultRequest>")
            .body_contains("<sourcedId>abcdef</sourcedId>");
        then.status(200)
            .header("Content-Type", "application/xml")
            .body(READ_RESPONSE);
    });
    let mutate_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/outcomes")
            .body_contains("<replaceResultRequest>");
        then.status(500);
    });

    let storage = LocalStorage::new(base.clone());
    let config = cli_config(server.url("/outcomes"), "read", Some("lti.xml".to_string()));
    let engine = ExportEngine::new(LtiExportPlugin::new(storage, config));

    let report = engine.run(&InMemoryGradebook::new()).await?;

    read_mock.assert();
    assert_eq!(mutate_mock.hits(), 0);
    assert_eq!(report.action, Action::Read);
    assert_eq!(report.score_sent, None);
    // 伺服器上的 0 分要保留
    assert_eq!(report.score_returned, Some(0.0));

    let written = std::fs::read_to_string(temp_dir.path().join("lti.xml"))?;
    assert_eq!(written, READ_RESPONSE);
    Ok(())
}

#[tokio::test]
async fn test_replace_sends_gradebook_score_unmodified() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base = temp_dir.path().to_str().unwrap().to_string();
    std::fs::write(temp_dir.path().join("grades.csv"), GRADES_CSV)?;

    let server = MockServer::start();
    let replace_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/outcomes")
            .body_contains("<replaceResultRequest>")
            .body_contains("<textString>0</textString>");
        then.status(200)
            .body(status_response("success", "replaceResultResponse", "Score replaced"));
    });

    let storage = LocalStorage::new(base.clone());
    let gradebook = load_for_action(&storage, "grades.csv", Action::Replace).await?;
    let config = cli_config(server.url("/outcomes"), "replace", None);
    let engine = ExportEngine::new(LtiExportPlugin::new(storage, config));

    let report = engine.run(gradebook.as_ref()).await?;

    replace_mock.assert();
    assert_eq!(report.score_sent, Some(0.0));
    assert_eq!(report.code_major.as_deref(), Some("success"));
    assert_eq!(report.output_path, None);

    // 沒有指定輸出檔時不建立任何檔案
    let entries: Vec<_> = std::fs::read_dir(temp_dir.path())?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(entries, vec!["grades.csv".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_replace_other_student_score() -> Result<()> {
    let server = MockServer::start();
    let replace_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/outcomes")
            .body_contains("<textString>0.75</textString>");
        then.status(200)
            .body(status_response("success", "replaceResultResponse", "ok"));
    });

    let gradebook = CsvGradebook::from_csv_str(GRADES_CSV)?;
    let mut config = cli_config(server.url("/outcomes"), " replace ", None);
    config.assignment = "ps1".to_string();
    config.student_id = "bar".to_string();

    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let engine = ExportEngine::new(LtiExportPlugin::new(storage, config));

    let report = engine.run(&gradebook).await?;

    replace_mock.assert();
    assert_eq!(report.score_sent, Some(0.75));
    Ok(())
}

#[tokio::test]
async fn test_delete_needs_no_score() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let delete_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/outcomes")
            .body_contains("<deleteResultRequest>");
        then.status(200)
            .body(status_response("success", "deleteResultResponse", "Score deleted"));
    });

    // grades.csv 不存在；delete 不應讀取成績簿
    let storage = LocalStorage::new(base.clone());
    let gradebook = load_for_action(&storage, "grades.csv", Action::Delete).await?;
    let config = cli_config(server.url("/outcomes"), "delete", None);
    let engine = ExportEngine::new(LtiExportPlugin::new(storage, config));

    let report = engine.run(gradebook.as_ref()).await?;

    delete_mock.assert();
    assert_eq!(report.action, Action::Delete);
    assert_eq!(report.score_sent, None);
    Ok(())
}

#[tokio::test]
async fn test_unrecognised_action_makes_no_request() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let any_mock = server.mock(|when, then| {
        when.method(POST).path("/outcomes");
        then.status(200).body(READ_RESPONSE);
    });

    let storage = LocalStorage::new(base.clone());
    let config = cli_config(server.url("/outcomes"), "upsert", Some("lti.xml".to_string()));
    let engine = ExportEngine::new(LtiExportPlugin::new(storage, config));

    let err = engine.run(&InMemoryGradebook::new()).await.unwrap_err();

    assert!(matches!(err, LtiError::UnrecognisedAction { ref action } if action == "upsert"));
    assert_eq!(any_mock.hits(), 0);
    assert!(!temp_dir.path().join("lti.xml").exists());
    Ok(())
}

#[tokio::test]
async fn test_remote_failure_is_reported() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base = temp_dir.path().to_str().unwrap().to_string();
    let body = status_response("failure", "replaceResultResponse", "Unknown sourcedid");

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/outcomes");
        then.status(200).body(body.clone());
    });

    let storage = LocalStorage::new(base.clone());
    let config = cli_config(
        server.url("/outcomes"),
        "replace",
        Some("out/lti.xml".to_string()),
    );
    let engine = ExportEngine::new(LtiExportPlugin::new(storage, config));
    let gradebook = InMemoryGradebook::new().with_score("ps2", "foo", 1.0);

    let err = engine.run(&gradebook).await.unwrap_err();

    match &err {
        LtiError::OutcomeFailed {
            code_major,
            description,
        } => {
            assert_eq!(code_major, "failure");
            assert_eq!(description, "Unknown sourcedid");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.exit_code(), 1);

    // 失敗的回應仍會寫入檔案，方便排查
    let written = std::fs::read_to_string(temp_dir.path().join("out/lti.xml"))?;
    assert_eq!(written, body);
    Ok(())
}

#[tokio::test]
async fn test_unauthorized_html_response() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/outcomes");
        then.status(401).body("<html><body>Invalid OAuth signature</body></html>");
    });

    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let config = cli_config(server.url("/outcomes"), "read", Some("lti.xml".to_string()));
    let engine = ExportEngine::new(LtiExportPlugin::new(storage, config));

    let err = engine.run(&InMemoryGradebook::new()).await.unwrap_err();

    assert!(matches!(err, LtiError::InvalidResponse { status: 401, .. }));
    assert!(err.recovery_suggestion().contains("key and secret"));

    // 非 outcomes 回應也要原文寫檔
    let written = std::fs::read_to_string(temp_dir.path().join("lti.xml"))?;
    assert_eq!(written, "<html><body>Invalid OAuth signature</body></html>");
    Ok(())
}
