//! AUTH LOGIN exchanges against a scripted local server.
//!
//! The server greets, then answers each received line with the next
//! scripted reply and records what it got. After a 354 reply it reads the
//! whole message up to the terminating `.` as one entry.

#![allow(clippy::unwrap_used)]

use ipwatch_smtp::connection::connect;
use ipwatch_smtp::{Address, Client, Error, LoginAuth, LoginState};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_test::{assert_err, assert_ok};

const EHLO_REPLY: &str = "250-mx.test greets client.test\r\n250-AUTH PLAIN LOGIN\r\n250 8BITMIME\r\n";

async fn fake_server(script: Vec<&'static str>) -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (reader, mut writer) = socket.into_split();
        let mut reader = BufReader::new(reader);
        writer.write_all(b"220 mx.test ESMTP\r\n").await.unwrap();

        let mut received = Vec::new();
        let mut in_data = false;
        for reply in script {
            let Some(entry) = read_entry(&mut reader, in_data).await else {
                break;
            };
            received.push(entry);
            writer.write_all(reply.as_bytes()).await.unwrap();
            in_data = reply.starts_with("354");
        }
        received
    });

    (port, handle)
}

async fn read_entry<R>(reader: &mut BufReader<R>, in_data: bool) -> Option<String>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await.unwrap() == 0 {
            return None;
        }
        let line = line.trim_end_matches("\r\n").to_string();
        if !in_data {
            return Some(line);
        }
        if line == "." {
            return Some(lines.join("\n"));
        }
        lines.push(line);
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn greeted(port: u16) -> Client<ipwatch_smtp::Connected> {
    init_tracing();
    let stream = assert_ok!(connect("127.0.0.1", port).await);
    let client = assert_ok!(Client::from_stream(stream).await);
    assert_ok!(client.ehlo("client.test").await)
}

#[tokio::test]
async fn login_then_deliver() {
    let (port, server) = fake_server(vec![
        EHLO_REPLY,
        "334 UGFzc3dvcmQ6\r\n",
        "235 2.7.0 Accepted\r\n",
        "250 2.1.0 OK\r\n",
        "250 2.1.5 OK\r\n",
        "354 Go ahead\r\n",
        "250 2.0.0 Queued\r\n",
        "221 2.0.0 Bye\r\n",
    ])
    .await;

    let client = greeted(port).await;
    assert_eq!(client.server_info().hostname, "mx.test");

    let mut auth = LoginAuth::new("user", "pass");
    let client = assert_ok!(client.authenticate(&mut auth).await);
    assert_eq!(auth.state(), LoginState::Done);

    let from = Address::new("alerts@example.com").unwrap();
    let to = Address::new("ops@example.com").unwrap();
    let client = assert_ok!(client.mail_from(&from).await);
    let client = assert_ok!(client.rcpt_to(&to).await);
    let client = assert_ok!(client.data().await);
    let client = assert_ok!(
        client
            .send_message(b"Subject: hi\r\n\r\n.hidden\r\n")
            .await
    );
    assert_ok!(client.quit().await);

    let received = server.await.unwrap();
    assert_eq!(
        received,
        vec![
            "EHLO client.test",
            "AUTH LOGIN dXNlcg==",
            "cGFzcw==",
            "MAIL FROM:<alerts@example.com>",
            "RCPT TO:<ops@example.com>",
            "DATA",
            "Subject: hi\n\n..hidden",
            "QUIT",
        ]
    );
}

#[tokio::test]
async fn server_asks_for_username_again() {
    let (port, server) = fake_server(vec![
        EHLO_REPLY,
        "334 VXNlcm5hbWU6\r\n",
        "334 UGFzc3dvcmQ6\r\n",
        "235 2.7.0 Accepted\r\n",
    ])
    .await;

    let client = greeted(port).await;
    let mut auth = LoginAuth::new("user", "pass");
    assert_ok!(client.authenticate(&mut auth).await);

    let received = server.await.unwrap();
    assert_eq!(received[1..], ["AUTH LOGIN dXNlcg==", "dXNlcg==", "cGFzcw=="]);
}

#[tokio::test]
async fn unrecognized_prompt_cancels_exchange() {
    let (port, server) = fake_server(vec![
        EHLO_REPLY,
        "334 R2FyYmFnZQ==\r\n",
        "501 5.7.0 Authentication aborted\r\n",
    ])
    .await;

    let client = greeted(port).await;
    let mut auth = LoginAuth::new("user", "pass");
    let err = assert_err!(client.authenticate(&mut auth).await);

    assert!(matches!(err, Error::UnrecognizedChallenge(ref text) if text == "Garbage"));
    assert_eq!(auth.state(), LoginState::Failed);

    let received = server.await.unwrap();
    assert_eq!(received.last().map(String::as_str), Some("*"));
}

#[tokio::test]
async fn rejected_credentials() {
    let (port, server) = fake_server(vec![
        EHLO_REPLY,
        "334 UGFzc3dvcmQ6\r\n",
        "535 5.7.8 Bad credentials\r\n",
    ])
    .await;

    let client = greeted(port).await;
    let mut auth = LoginAuth::new("user", "wrong");
    let err = assert_err!(client.authenticate(&mut auth).await);

    assert!(matches!(err, Error::AuthFailed { code: 535, .. }));
    assert!(err.is_permanent());
    server.await.unwrap();
}

#[tokio::test]
async fn login_not_advertised() {
    let (port, server) = fake_server(vec!["250-mx.test\r\n250 AUTH PLAIN\r\n"]).await;

    let client = greeted(port).await;
    let mut auth = LoginAuth::new("user", "pass");
    let err = assert_err!(client.authenticate(&mut auth).await);

    assert!(matches!(err, Error::NotSupported(_)));
    assert_eq!(server.await.unwrap(), vec!["EHLO client.test"]);
}
