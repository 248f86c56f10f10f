//! Tests that image content can only be constructed from a validated
//! `ImageBlock`.
//!
//! `ContentBlock::Image` only ever wraps an `ImageBlock`, and `ImageBlock`
//! can only be built via `from_url`/`from_base64`, both of which validate
//! the scheme/MIME type. There is no public constructor that lets a
//! `javascript:` or `file:` URI reach a `Message` — the type system is
//! the enforcement mechanism, not a runtime check downstream.

use prism_stream::{ContentBlock, ImageBlock, Message, MessageRole};

#[test]
fn test_validated_imageblock_round_trips_through_a_message() {
    let image_block = ImageBlock::from_url("https://example.com/image.jpg").expect("Valid HTTPS URL should pass");

    let msg = Message::new(MessageRole::User, vec![ContentBlock::Image(image_block)]);
    let json = serde_json::to_value(&msg).expect("Should serialize");

    let image_json = &json["content"][0];
    assert_eq!(image_json["type"], "image");
    assert_eq!(image_json["url"], "https://example.com/image.jpg");
}

#[test]
fn test_javascript_uri_cannot_bypass_validation() {
    let result = ImageBlock::from_url("javascript:alert('XSS')");
    assert!(result.is_err(), "JavaScript URI should be rejected");

    // There is no public path from a rejected URL to a `ContentBlock::Image` —
    // this is the desired behavior, validation cannot be bypassed.
}

#[test]
fn test_file_uri_cannot_bypass_validation() {
    let result = ImageBlock::from_url("file:///etc/passwd");
    assert!(result.is_err(), "File URI should be rejected");
}

#[test]
fn test_data_uri_with_validated_base64_round_trips() {
    let base64_data = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";
    let image_block = ImageBlock::from_base64(base64_data, "image/png").expect("Valid base64 should pass");

    let msg = Message::new(MessageRole::User, vec![ContentBlock::Image(image_block)]);
    let json = serde_json::to_value(&msg).expect("Should serialize");

    let url = json["content"][0]["url"].as_str().unwrap();
    assert!(url.starts_with("data:image/png;base64,"));
}
