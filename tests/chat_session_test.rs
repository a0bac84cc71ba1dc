mod common;

use std::io::Cursor;

use common::{router_with, FakeCompletion, FakeGeocoder};
use geochat::chat::run_session;
use geochat::Role;

#[tokio::test]
async fn test_session_runs_turns_until_quit() {
    let geocoder = FakeGeocoder::found(-27.6, 153.05);
    let completion = FakeCompletion::answering("Knock knock.");
    let router = router_with(geocoder.clone(), completion.clone());
    let input = Cursor::new("Show me Shailer Park\n\nTell me a joke\n/quit\nnever read\n");
    let mut output = Vec::new();

    let transcript = run_session(&router, "gsk_test", input, &mut output).await.unwrap();

    let printed = String::from_utf8(output).unwrap();
    assert!(printed.contains("📍 **Shailer Park** is at:\n- Latitude: -27.6000\n- Longitude: 153.0500"));
    assert!(printed.contains("openstreetmap.org"));
    assert!(printed.contains("Knock knock."));

    assert_eq!(transcript.len(), 4);
    assert_eq!(transcript.messages()[2].role(), Role::User);
    assert_eq!(transcript.messages()[2].content(), "Tell me a joke");
    assert_eq!(completion.prompts(), vec!["Tell me a joke"]);
}

#[tokio::test]
async fn test_session_ends_at_eof() {
    let router = router_with(FakeGeocoder::empty(), FakeCompletion::answering("It's a myth."));
    let input = Cursor::new("where is atlantis");
    let mut output = Vec::new();

    let transcript = run_session(&router, "gsk_test", input, &mut output).await.unwrap();

    let printed = String::from_utf8(output).unwrap();
    assert!(printed.contains("❌ Could not locate on map. Here's what I found instead:\n\nIt's a myth."));
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript.messages()[1].content(), "It's a myth.");
}

#[tokio::test]
async fn test_session_without_credential_makes_no_calls() {
    let geocoder = FakeGeocoder::found(1.0, 2.0);
    let completion = FakeCompletion::answering("unused");
    let router = router_with(geocoder.clone(), completion.clone());
    let input = Cursor::new("Show me Paris\nTell me a joke\n");
    let mut output = Vec::new();

    let transcript = run_session(&router, "", input, &mut output).await.unwrap();

    let printed = String::from_utf8(output).unwrap();
    assert!(printed.contains("Please enter your Groq API key to continue."));
    assert!(transcript.is_empty());
    assert!(geocoder.queries().is_empty());
    assert!(completion.prompts().is_empty());
}

#[tokio::test]
async fn test_session_keeps_message_padding() {
    let completion = FakeCompletion::answering("4");
    let router = router_with(FakeGeocoder::empty(), completion.clone());
    let input = Cursor::new("  What's 2 + 2?  \r\n   \n  /quit  \n");
    let mut output = Vec::new();

    let transcript = run_session(&router, "gsk_test", input, &mut output).await.unwrap();

    assert_eq!(completion.prompts(), vec!["  What's 2 + 2?  "]);
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript.messages()[0].content(), "  What's 2 + 2?  ");
}
