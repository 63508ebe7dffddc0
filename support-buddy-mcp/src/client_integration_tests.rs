use super::test_mocks::*;
use super::*;

use std::sync::Arc;

use rmcp::ServiceExt;
use rmcp::model::CallToolRequestParams;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type ClientHandles = (
    rmcp::service::RunningService<rmcp::RoleClient, ()>,
    tokio::task::JoinHandle<anyhow::Result<()>>,
);

/// Spawn a MCP server and connect a client via in-memory duplex transport.
///
/// The client derefs to `Peer<RoleClient>` so you can call
/// `list_all_tools()`, `call_tool()`, `peer_info()`, etc.
async fn spawn_client_server(server: SupportBuddyMcp) -> ClientHandles {
    let (server_transport, client_transport) = tokio::io::duplex(4096);

    let server_handle = tokio::spawn(async move {
        server.serve(server_transport).await?.waiting().await?;
        anyhow::Ok(())
    });

    let client = ().serve(client_transport).await.unwrap();
    (client, server_handle)
}

async fn spawn_default() -> ClientHandles {
    spawn_client_server(offline_server()).await
}

fn call_params(name: &str, args: &serde_json::Value) -> CallToolRequestParams {
    CallToolRequestParams {
        meta: None,
        name: name.to_string().into(),
        arguments: args.as_object().cloned(),
        task: None,
    }
}

fn extract_text(result: &rmcp::model::CallToolResult) -> &str {
    result
        .content
        .first()
        .and_then(|c| c.raw.as_text())
        .map(|t| t.text.as_str())
        .expect("expected text content in result")
}

// ===========================================================================
// Scenario 1: initialize handshake
// ===========================================================================

#[tokio::test]
async fn client_connects_and_receives_server_info() -> anyhow::Result<()> {
    let (client, server_handle) = spawn_default().await;

    let server_info = client
        .peer_info()
        .expect("server info should be set after handshake");

    assert_eq!(server_info.protocol_version, ProtocolVersion::LATEST);
    assert!(
        server_info.capabilities.tools.is_some(),
        "server should advertise tool capability"
    );

    let instructions = server_info.instructions.as_deref().unwrap_or("");
    assert!(instructions.contains("classify_ticket"));
    assert!(instructions.contains("AI is not configured"));

    client.cancel().await?;
    server_handle.await??;
    Ok(())
}

// ===========================================================================
// Scenario 2: tools/list
// ===========================================================================

const EXPECTED_TOOL_NAMES: &[&str] = &[
    "extract_registrar_sections",
    "registrar_lookup",
    "ng_registration_report",
    "dns_lookup",
    "live_name_servers",
    "dnssec_status",
    "ip_lookup",
    "http_status",
    "redirect_chain",
    "https_redirect",
    "mixed_content",
    "ssl_check",
    "whois_lookup",
    "ns_authority_check",
    "email_auth_check",
    "classify_ticket",
    "analyze_ticket",
    "search_kb",
    "password_strength",
    "generate_password",
    "convert_case",
    "line_tools",
    "text_stats",
    "file_permissions",
    "email_headers",
    "validate_email",
    "convert_storage",
];

#[tokio::test]
async fn tools_list_returns_every_tool() -> anyhow::Result<()> {
    let (client, server_handle) = spawn_default().await;

    let tools = client.list_all_tools().await?;

    assert_eq!(tools.len(), EXPECTED_TOOL_NAMES.len());

    let names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
    for expected in EXPECTED_TOOL_NAMES {
        assert!(names.contains(expected), "missing tool: {expected}");
    }

    client.cancel().await?;
    server_handle.await??;
    Ok(())
}

#[tokio::test]
async fn each_tool_has_description_and_object_schema() -> anyhow::Result<()> {
    let (client, server_handle) = spawn_default().await;

    let tools = client.list_all_tools().await?;

    for tool in &tools {
        assert!(
            tool.description.is_some(),
            "tool '{}' missing description",
            tool.name
        );

        assert_eq!(
            tool.input_schema.get("type").and_then(|v| v.as_str()),
            Some("object"),
            "tool '{}' input_schema type must be 'object'",
            tool.name
        );

        assert!(
            tool.input_schema.contains_key("properties"),
            "tool '{}' input_schema must have 'properties'",
            tool.name
        );
    }

    client.cancel().await?;
    server_handle.await??;
    Ok(())
}

#[tokio::test]
async fn tools_with_required_params_declare_them_in_schema() -> anyhow::Result<()> {
    let (client, server_handle) = spawn_default().await;

    let tools = client.list_all_tools().await?;
    let required_of = |name: &str| -> Vec<String> {
        tools
            .iter()
            .find(|t| t.name == name)
            .and_then(|t| t.input_schema.get("required").cloned())
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    };

    assert_eq!(required_of("extract_registrar_sections"), vec!["html"]);
    assert_eq!(required_of("analyze_ticket"), vec!["ticket"]);

    let dns = required_of("dns_lookup");
    assert!(dns.iter().any(|v| v == "domain"));
    assert!(dns.iter().any(|v| v == "record_type"));

    assert!(required_of("generate_password").is_empty());

    client.cancel().await?;
    server_handle.await??;
    Ok(())
}

// ===========================================================================
// Scenario 3: tools/call
// ===========================================================================

#[tokio::test]
async fn call_classify_ticket_returns_analysis() -> anyhow::Result<()> {
    let (client, server_handle) = spawn_default().await;

    let result = client
        .call_tool(call_params(
            "classify_ticket",
            &serde_json::json!({
                "ticket": "Outlook keeps asking for my email password\nIP Address: 102.89.1.7"
            }),
        ))
        .await?;

    assert_ne!(result.is_error, Some(true));
    let parsed: serde_json::Value = serde_json::from_str(extract_text(&result))?;
    assert_eq!(parsed["issueType"], "Email Issue");
    assert!(!parsed["checks"].as_array().unwrap().is_empty());
    assert!(parsed["kbArticles"].as_array().unwrap().len() <= 3);

    client.cancel().await?;
    server_handle.await??;
    Ok(())
}

#[tokio::test]
async fn call_analyze_ticket_with_ai_returns_ai_analysis() -> anyhow::Result<()> {
    let analyzer = Arc::new(MockTicketAnalyzer::default());
    let server = build_server(
        Arc::new(MockToolboxGateway::default()),
        Some(analyzer as Arc<dyn TicketAnalyzer>),
        SlidingWindowLimiter::default(),
        ToolTimeouts::default(),
    );
    let (client, server_handle) = spawn_client_server(server).await;

    let result = client
        .call_tool(call_params(
            "analyze_ticket",
            &serde_json::json!({ "ticket": "White screen on the homepage" }),
        ))
        .await?;

    assert_ne!(result.is_error, Some(true));
    let parsed: serde_json::Value = serde_json::from_str(extract_text(&result))?;
    assert_eq!(parsed["source"], "ai");

    client.cancel().await?;
    server_handle.await??;
    Ok(())
}

#[tokio::test]
async fn call_ng_registration_report_returns_report() -> anyhow::Result<()> {
    let (client, server_handle) = spawn_default().await;

    let result = client
        .call_tool(call_params(
            "ng_registration_report",
            &serde_json::json!({"domain": "example.com.ng"}),
        ))
        .await?;

    assert_ne!(result.is_error, Some(true));
    let parsed: serde_json::Value = serde_json::from_str(extract_text(&result))?;
    assert_eq!(parsed["domain"], "example.com.ng");
    assert_eq!(
        parsed["registration"]["Domain Information"]["Status"],
        "active"
    );

    client.cancel().await?;
    server_handle.await??;
    Ok(())
}

#[tokio::test]
async fn call_dns_lookup_returns_lookup_result() -> anyhow::Result<()> {
    let (client, server_handle) = spawn_default().await;

    let result = client
        .call_tool(call_params(
            "dns_lookup",
            &serde_json::json!({"domain": "example.com", "record_type": "a"}),
        ))
        .await?;

    assert_ne!(result.is_error, Some(true));
    let parsed: serde_json::Value = serde_json::from_str(extract_text(&result))?;
    assert_eq!(parsed["recordType"], "A");
    assert!(parsed.get("records").is_some());

    client.cancel().await?;
    server_handle.await??;
    Ok(())
}

#[tokio::test]
async fn call_ns_authority_check_takes_server_list() -> anyhow::Result<()> {
    let (client, server_handle) = spawn_default().await;

    let result = client
        .call_tool(call_params(
            "ns_authority_check",
            &serde_json::json!({
                "domain": "example.com.ng",
                "expected_name_servers": ["ns1.mockhost.ng"]
            }),
        ))
        .await?;

    assert_ne!(result.is_error, Some(true));
    let parsed: serde_json::Value = serde_json::from_str(extract_text(&result))?;
    assert_eq!(parsed["allMatch"], true);
    assert_eq!(parsed["live"][0], "ns1.mockhost.ng");

    client.cancel().await?;
    server_handle.await??;
    Ok(())
}

#[tokio::test]
async fn call_password_strength_returns_score() -> anyhow::Result<()> {
    let (client, server_handle) = spawn_default().await;

    let result = client
        .call_tool(call_params(
            "password_strength",
            &serde_json::json!({"password": "Tr0ub4dor&3xyz"}),
        ))
        .await?;

    assert_ne!(result.is_error, Some(true));
    let parsed: serde_json::Value = serde_json::from_str(extract_text(&result))?;
    assert_eq!(parsed["strength"], "Strong");
    assert_eq!(parsed["score"], 6);

    client.cancel().await?;
    server_handle.await??;
    Ok(())
}

// ===========================================================================
// Scenario 4: error handling
// ===========================================================================

#[tokio::test]
async fn call_nonexistent_tool_returns_error() -> anyhow::Result<()> {
    let (client, server_handle) = spawn_default().await;

    let result = client
        .call_tool(call_params("nonexistent_tool", &serde_json::json!({})))
        .await;

    assert!(result.is_err(), "calling nonexistent tool should fail");
    let err = result.unwrap_err().to_string();
    assert!(
        err.contains("tool not found"),
        "error should mention 'tool not found', got: {err}"
    );

    client.cancel().await?;
    server_handle.await??;
    Ok(())
}

#[tokio::test]
async fn call_tool_with_missing_required_params_returns_error() -> anyhow::Result<()> {
    let (client, server_handle) = spawn_default().await;

    let result = client
        .call_tool(call_params("classify_ticket", &serde_json::json!({})))
        .await;

    assert!(result.is_err(), "missing required param should fail");

    client.cancel().await?;
    server_handle.await??;
    Ok(())
}

#[tokio::test]
async fn call_toolbox_tool_with_gateway_error_returns_error() -> anyhow::Result<()> {
    let toolbox = Arc::new(MockToolboxGateway::default());
    toolbox
        .set_error(Some("connection refused".to_string()))
        .await;
    let server = build_server(
        Arc::clone(&toolbox) as Arc<dyn ToolboxGateway>,
        None,
        SlidingWindowLimiter::default(),
        ToolTimeouts::default(),
    );
    let (client, server_handle) = spawn_client_server(server).await;

    let result = client
        .call_tool(call_params(
            "ip_lookup",
            &serde_json::json!({"ip": "41.203.14.2"}),
        ))
        .await;

    assert!(result.is_err(), "toolbox error should propagate");
    let err = result.unwrap_err().to_string();
    assert!(
        err.contains("connection refused"),
        "error should contain toolbox error, got: {err}"
    );

    client.cancel().await?;
    server_handle.await??;
    Ok(())
}
