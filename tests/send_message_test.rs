//! Tests for the `Message` image-construction helpers.
//!
//! `Message::user_with_image`/`user_with_base64_image`/
//! `user_with_image_detail` build a ready-to-append user turn from an
//! image in one call instead of composing `ContentBlock::Image` by hand.
//! Image content blocks are an ambient, untouched-by-the-core-driver
//! feature (see DESIGN.md) — these tests exercise the construction
//! helpers directly rather than through `Client::send`, which only
//! accepts a plain text prompt.

use prism_stream::{ContentBlock, ImageDetail, Message};

#[test]
fn test_user_with_image_defaults_to_auto_detail() {
    let msg = Message::user_with_image("What's in this image?", "https://example.com/photo.jpg").expect("Valid image URL");

    assert_eq!(msg.content.len(), 2);
    match &msg.content[1] {
        ContentBlock::Image(img) => {
            assert_eq!(img.url(), "https://example.com/photo.jpg");
            assert_eq!(img.detail(), ImageDetail::Auto);
        }
        other => panic!("expected Image, got {other:?}"),
    }
}

#[test]
fn test_user_with_base64_image_builds_data_uri() {
    let base64_data = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";
    let msg = Message::user_with_base64_image("Analyze this image", base64_data, "image/png").expect("Valid base64");

    assert_eq!(msg.content.len(), 2);
    match &msg.content[1] {
        ContentBlock::Image(img) => assert!(img.url().starts_with("data:image/png;base64,")),
        other => panic!("expected Image, got {other:?}"),
    }
}

#[test]
fn test_user_with_image_detail_preserves_requested_level() {
    let msg = Message::user_with_image_detail("Analyze this diagram in detail", "https://example.com/diagram.png", ImageDetail::High).expect("Valid image URL");

    match &msg.content[1] {
        ContentBlock::Image(img) => assert_eq!(img.detail(), ImageDetail::High),
        other => panic!("expected Image, got {other:?}"),
    }
}

#[test]
fn test_invalid_image_url_propagates_the_error() {
    let err = Message::user_with_image("bad image", "javascript:alert(1)").unwrap_err();
    assert!(matches!(err, prism_stream::Error::InvalidInput(_)));
}

#[test]
fn test_manually_constructed_multi_image_message() {
    use prism_stream::{ImageBlock, MessageRole, TextBlock};

    let image1 = ImageBlock::from_url("https://example.com/img1.jpg").expect("Valid URL");
    let image2 = ImageBlock::from_url("https://example.com/img2.jpg").expect("Valid URL");

    let msg = Message::new(MessageRole::User, vec![ContentBlock::Text(TextBlock::new("Compare these images:")), ContentBlock::Image(image1), ContentBlock::Image(image2)]);

    assert_eq!(msg.content.len(), 3);
}
