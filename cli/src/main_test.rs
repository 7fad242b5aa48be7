use super::*;
use clap::CommandFactory;
use serde_json::json;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn parse_pair_splits_on_first_equals() {
    assert_eq!(parse_pair("q=a=b").unwrap(), ("q".to_owned(), "a=b".to_owned()));
    assert_eq!(parse_pair("empty=").unwrap(), ("empty".to_owned(), String::new()));
    assert!(matches!(parse_pair("novalue"), Err(CliError::InvalidQuery(_))));
}

#[test]
fn header_flags_use_name_colon_value() {
    let headers = parse_header_flags(&["X-One: 1".to_owned(), "Accept: application/json".to_owned()]).unwrap();
    assert_eq!(headers.get("X-One").map(String::as_str), Some("1"));
    assert_eq!(headers.get("Accept").map(String::as_str), Some("application/json"));

    assert!(matches!(parse_header_flags(&["X-One=1".to_owned()]), Err(CliError::InvalidHeader(_))));
}

#[test]
fn global_flags_and_query_parse() {
    let cli = Cli::try_parse_from([
        "lavaboom",
        "--base-url",
        "http://localhost:5000",
        "--transport",
        "http",
        "--header",
        "X-Debug: on",
        "get",
        "/emails",
        "--query",
        "sort=-date",
    ])
    .unwrap();

    assert_eq!(cli.base_url, "http://localhost:5000");
    assert_eq!(cli.transport, TransportMode::Http);
    assert_eq!(cli.headers, vec!["X-Debug: on"]);
    let Command::Get(args) = cli.command else {
        panic!("expected get");
    };
    assert_eq!(args.path, "/emails");
    assert_eq!(args.query, vec![("sort".to_owned(), "-date".to_owned())]);
}

#[test]
fn unknown_transport_is_rejected() {
    assert!(Cli::try_parse_from(["lavaboom", "--transport", "carrier-pigeon", "info"]).is_err());
}

#[test]
fn rejection_renders_status_and_body() {
    let response = Response { status: 404, headers: Headers::new(), body: Body::Json(json!({"message": "nope"})) };
    let error = CliError::from(RequestError::Rejected(response));
    assert!(matches!(error, CliError::Rejected { status: 404, .. }));
    assert!(error.to_string().contains("nope"));
}

#[test]
fn malformed_body_renders_raw_text() {
    let body = Body::Malformed { raw: "<html>".into(), error: "expected value".into() };
    assert_eq!(render_body(&body), "<html>");
}
