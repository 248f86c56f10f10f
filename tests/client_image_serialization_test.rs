//! Image content block tests
//!
//! These verify that `ImageBlock` validation and serialization behave
//! correctly throughout the message lifecycle a conversation's history
//! actually goes through: HTTP URLs, base64 data URIs, and detail levels
//! all need to survive being stored in a `Message`.

use prism_stream::{ContentBlock, ImageBlock, ImageDetail, Message, MessageRole, TextBlock};

#[test]
fn test_preserves_http_image_url() {
    let image_url = "https://example.com/test.jpg";
    let image = ImageBlock::from_url(image_url).expect("Valid HTTPS URL");
    let msg = Message::new(MessageRole::User, vec![ContentBlock::Text(TextBlock::new("Here's an image:")), ContentBlock::Image(image)]);

    assert_eq!(msg.content.len(), 2, "Should have 2 content blocks");

    match &msg.content[1] {
        ContentBlock::Image(img) => {
            assert_eq!(img.url(), image_url, "Image URL should be preserved");
            assert_eq!(img.detail(), ImageDetail::Auto, "Default detail should be Auto");
        }
        _ => panic!("Expected Image content block"),
    }
}

#[test]
fn test_preserves_base64_data_uri() {
    let base64_data = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";
    let image = ImageBlock::from_base64(base64_data, "image/png").expect("Valid base64");
    let msg = Message::new(MessageRole::User, vec![ContentBlock::Image(image)]);

    assert_eq!(msg.content.len(), 1, "Should have 1 content block");

    match &msg.content[0] {
        ContentBlock::Image(img) => {
            let url = img.url();
            assert!(url.starts_with("data:image/png;base64,"), "Base64 image should use data URI format, got: {}", url);
            assert!(url.contains(base64_data), "Should contain original base64 data");
        }
        _ => panic!("Expected Image content block"),
    }
}

#[test]
fn test_preserves_image_detail_level() {
    let test_cases = vec![(ImageDetail::Low, "Low detail"), (ImageDetail::High, "High detail"), (ImageDetail::Auto, "Auto detail")];

    let mut history = Vec::new();
    for (detail, _description) in &test_cases {
        let image = ImageBlock::from_url("https://example.com/image.jpg").expect("Valid URL").with_detail(*detail);
        history.push(Message::new(MessageRole::User, vec![ContentBlock::Image(image)]));
    }

    for (i, (expected_detail, description)) in test_cases.iter().enumerate() {
        match &history[i].content[0] {
            ContentBlock::Image(img) => {
                assert_eq!(img.detail(), *expected_detail, "{} should be preserved", description);
            }
            _ => panic!("Expected Image content block"),
        }
    }
}

#[test]
fn test_preserves_validation_in_conversation() {
    let mut history = Vec::new();

    let image_url = "https://trusted-cdn.example.com/image.png";
    let image = ImageBlock::from_url(image_url).expect("Valid URL").with_detail(ImageDetail::High);
    history.push(Message::new(MessageRole::User, vec![ContentBlock::Text(TextBlock::new("What's in this image?")), ContentBlock::Image(image)]));

    history.push(Message::new(MessageRole::Assistant, vec![ContentBlock::Text(TextBlock::new("I see the image"))]));

    history.push(Message::new(MessageRole::User, vec![ContentBlock::Text(TextBlock::new("Can you describe it?"))]));

    assert_eq!(history.len(), 3, "Should have 3 messages in history");

    let user_msg_1 = &history[0];
    assert_eq!(user_msg_1.content.len(), 2, "First message should have 2 blocks");
    match &user_msg_1.content[1] {
        ContentBlock::Image(img) => {
            assert_eq!(img.url(), image_url, "Image URL should be preserved");
            assert_eq!(img.detail(), ImageDetail::High, "Detail level should be preserved");
        }
        _ => panic!("Expected Image content block"),
    }

    let assistant_msg = &history[1];
    assert_eq!(assistant_msg.content.len(), 1, "Assistant message should have 1 block");
    match &assistant_msg.content[0] {
        ContentBlock::Text(text) => {
            assert_eq!(text.text, "I see the image");
        }
        _ => panic!("Expected Text content block"),
    }

    let user_msg_2 = &history[2];
    assert_eq!(user_msg_2.content.len(), 1, "Second user message should have 1 block");
    match &user_msg_2.content[0] {
        ContentBlock::Text(text) => {
            assert_eq!(text.text, "Can you describe it?");
        }
        _ => panic!("Expected Text content block"),
    }
}
