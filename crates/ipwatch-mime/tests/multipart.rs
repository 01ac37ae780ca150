//! Structural tests for serialized messages.
//!
//! The serialized output is split back into its parts with a minimal
//! multipart reader and checked for layout, boundaries and payloads.

#![allow(clippy::unwrap_used)]

use ipwatch_mime::encoding::{decode_base64, decode_quoted_printable};
use ipwatch_mime::{ContentType, FileAttachment, HtmlEncoding, Message, MessageBuilder};
use proptest::prelude::*;

/// One entity: header lines and raw body.
struct Entity<'a> {
    headers: Vec<(&'a str, &'a str)>,
    body: &'a str,
}

impl<'a> Entity<'a> {
    fn parse(text: &'a str) -> Self {
        let (head, body) = text.split_once("\r\n\r\n").unwrap();
        let headers = head
            .split("\r\n")
            .map(|line| line.split_once(": ").unwrap())
            .collect();
        Self { headers, body }
    }

    fn header(&self, name: &str) -> Option<&'a str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| *v)
    }

    fn content_type(&self) -> ContentType {
        ContentType::parse(self.header("Content-Type").unwrap()).unwrap()
    }

    /// Splits a multipart body into its part entities.
    fn parts(&self) -> Vec<Entity<'a>> {
        let boundary = self.content_type().boundary().unwrap().to_string();
        let close = format!("\r\n--{boundary}--\r\n");
        let inner = self.body.strip_suffix(close.as_str()).unwrap();
        let inner = inner.strip_prefix(format!("--{boundary}\r\n").as_str()).unwrap();

        inner
            .split(format!("\r\n--{boundary}\r\n").as_str())
            .map(Entity::parse)
            .collect()
    }

    fn decoded_body(&self) -> Vec<u8> {
        match self.header("Content-Transfer-Encoding").unwrap() {
            "base64" => decode_base64(self.body).unwrap(),
            "quoted-printable" => decode_quoted_printable(self.body).unwrap(),
            other => panic!("unexpected transfer encoding {other}"),
        }
    }
}

fn is_boundary(s: &str) -> bool {
    s.len() == 60 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn scenario() -> MessageBuilder {
    Message::builder()
        .from("Alice", "a@x.com")
        .to("b@y.com")
        .to("c@z.com")
        .subject("Hi")
        .text_body("hello")
}

#[test]
fn alternative_scenario() {
    let text = scenario().build().unwrap().to_text().unwrap();
    let top = Entity::parse(&text);

    assert!(text.contains("From: \"Alice\" <a@x.com>\r\n"));
    assert!(text.contains("To: b@y.com,c@z.com\r\n"));
    assert!(text.contains("Subject: Hi\r\n"));
    assert_eq!(top.header("MIME-Version"), Some("1.0"));
    assert_eq!(top.content_type().essence(), "multipart/alternative");
    assert!(is_boundary(top.content_type().boundary().unwrap()));

    let parts = top.parts();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].header("Content-Type"), Some("text/plain; charset=UTF-8"));
    assert_eq!(parts[0].decoded_body(), b"hello");
}

#[test]
fn mixed_scenario() {
    let text = scenario()
        .attach(FileAttachment::new("report.txt", "data123"))
        .build()
        .unwrap()
        .to_text()
        .unwrap();
    let top = Entity::parse(&text);
    assert_eq!(top.content_type().essence(), "multipart/mixed");

    let parts = top.parts();
    assert_eq!(parts.len(), 2);

    let nested = &parts[0];
    assert_eq!(nested.content_type().essence(), "multipart/alternative");
    assert_ne!(nested.content_type().boundary(), top.content_type().boundary());
    let alternatives = nested.parts();
    assert_eq!(alternatives.len(), 1);
    assert_eq!(alternatives[0].decoded_body(), b"hello");

    let file = &parts[1];
    assert_eq!(
        file.header("Content-Disposition"),
        Some("attachment; filename==?UTF-8?B?cmVwb3J0LnR4dA==?=")
    );
    assert_eq!(file.header("Content-Transfer-Encoding"), Some("base64"));
    assert_eq!(file.content_type().essence(), "text/plain");
    assert_eq!(file.decoded_body(), b"data123");
}

#[test]
fn content_order_is_preserved() {
    let text = Message::builder()
        .from("", "a@x.com")
        .to("b@y.com")
        .html_body("<b>first</b>")
        .text_body("second")
        .build()
        .unwrap()
        .to_text()
        .unwrap();

    let parts = Entity::parse(&text).parts();
    assert_eq!(parts[0].content_type().essence(), "text/html");
    assert_eq!(parts[0].decoded_body(), b"<b>first</b>");
    assert_eq!(parts[1].content_type().essence(), "text/plain");
    assert_eq!(parts[1].decoded_body(), b"second");
}

#[test]
fn html_passthrough_keeps_raw_markup() {
    let markup = "<p class=\"x\">caf\u{e9}</p>";
    let text = Message::builder()
        .from("", "a@x.com")
        .to("b@y.com")
        .html_body(markup)
        .html_encoding(HtmlEncoding::Passthrough)
        .build()
        .unwrap()
        .to_text()
        .unwrap();

    let parts = Entity::parse(&text).parts();
    assert_eq!(parts[0].header("Content-Transfer-Encoding"), Some("quoted-printable"));
    assert_eq!(parts[0].body, markup);
}

#[test]
fn large_attachment_lines_are_wrapped() {
    let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    let text = scenario()
        .attach(FileAttachment::new("blob.bin", data.clone()))
        .build()
        .unwrap()
        .to_text()
        .unwrap();

    assert!(text.split("\r\n").all(|line| line.len() <= 998));
    let parts = Entity::parse(&text).parts();
    assert_eq!(parts[1].content_type().to_string(), "application/octet-stream");
    assert_eq!(parts[1].decoded_body(), data);
}

fn attachment_strategy() -> impl Strategy<Value = FileAttachment> {
    (
        "[a-z]{1,8}\\.(txt|pdf|png|html|zzqx)",
        proptest::collection::vec(any::<u8>(), 0..300),
    )
        .prop_map(|(name, data)| FileAttachment::new(name, data))
}

fn content_strategy() -> impl Strategy<Value = (bool, String)> {
    (any::<bool>(), "[^\r\n]{0,120}")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn layout_follows_attachments(
        contents in proptest::collection::vec(content_strategy(), 1..4),
        attachments in proptest::collection::vec(attachment_strategy(), 0..4),
    ) {
        let mut builder = Message::builder().from("Prop", "p@x.com").to("q@y.com");
        for (is_html, text) in &contents {
            builder = if *is_html {
                builder.html_body(text.clone())
            } else {
                builder.text_body(text.clone())
            };
        }
        for file in &attachments {
            builder = builder.attach(file.clone());
        }

        let text = builder.build().unwrap().to_text().unwrap();
        let top = Entity::parse(&text);
        let top_type = top.content_type();
        prop_assert!(is_boundary(top_type.boundary().unwrap()));

        let alternatives = if attachments.is_empty() {
            prop_assert_eq!(top_type.essence(), "multipart/alternative");
            top.parts()
        } else {
            prop_assert_eq!(top_type.essence(), "multipart/mixed");
            let parts = top.parts();
            prop_assert_eq!(parts.len(), attachments.len() + 1);

            let nested_type = parts[0].content_type();
            prop_assert_eq!(nested_type.essence(), "multipart/alternative");
            prop_assert!(is_boundary(nested_type.boundary().unwrap()));
            prop_assert_ne!(nested_type.boundary(), top_type.boundary());

            for (part, file) in parts[1..].iter().zip(&attachments) {
                prop_assert_eq!(part.content_type(), ContentType::from_filename(file.name()));
                prop_assert_eq!(part.decoded_body(), file.data());
            }
            parts[0].parts()
        };

        prop_assert_eq!(alternatives.len(), contents.len());
        for (part, (is_html, text)) in alternatives.iter().zip(&contents) {
            let expected = if *is_html { "text/html" } else { "text/plain" };
            prop_assert_eq!(part.content_type().essence(), expected);
            prop_assert_eq!(part.decoded_body(), text.as_bytes());
        }
    }
}
