use pheroclass_storage::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve one canned HTTP response and return the request that was received
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/pinning/pinFileToIPFS", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let headers = text[..header_end].to_lowercase();
                if headers.contains("transfer-encoding: chunked") {
                    if text.ends_with("0\r\n\r\n") {
                        break;
                    }
                    continue;
                }
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if request.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!(
            "{}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&request).to_string()
    });

    (url, handle)
}

#[tokio::test]
async fn test_upload_returns_cid() {
    let (url, server) = serve_once("HTTP/1.1 200 OK", r#"{"IpfsHash":"QmNotesCid","PinSize":42}"#).await;
    let client = IpfsClient::with_config(StorageConfig {
        upload_url: url,
        gateway: "ipfs.io".to_string(),
        jwt: Some("test-jwt".to_string()),
    });

    let cid = client
        .upload("lecture-1.pdf", "application/pdf", b"%PDF-1.4 test".to_vec())
        .await
        .unwrap();
    assert_eq!(cid, "QmNotesCid");
    assert_eq!(client.gateway_url(&cid), "https://ipfs.io/ipfs/QmNotesCid");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /pinning/pinFileToIPFS"));
    assert!(request.to_lowercase().contains("authorization: bearer test-jwt"));
    assert!(request.contains("filename=\"lecture-1.pdf\""));
}

#[tokio::test]
async fn test_upload_rejected_is_reported() {
    let (url, _server) = serve_once("HTTP/1.1 401 Unauthorized", r#"{"error":"bad jwt"}"#).await;
    let client = IpfsClient::with_config(StorageConfig {
        upload_url: url,
        ..Default::default()
    });

    let err = client
        .upload("notes.pdf", "application/pdf", b"%PDF".to_vec())
        .await
        .unwrap_err();
    match err {
        StorageError::Rejected { status, .. } => assert_eq!(status, 401),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_empty_file_not_sent() {
    let client = IpfsClient::with_config(StorageConfig {
        upload_url: "http://127.0.0.1:1/never".to_string(),
        ..Default::default()
    });
    let err = client.upload("empty.pdf", "application/pdf", Vec::new()).await.unwrap_err();
    assert!(matches!(err, StorageError::EmptyFile(_)));
}

#[test]
fn test_default_gateway_urls() {
    assert_eq!(StorageConfig::default().gateway, pheroclass_storage::DEFAULT_GATEWAY);
    assert_eq!(
        gateway_url(pheroclass_storage::DEFAULT_GATEWAY, "ipfs://bafy1"),
        "https://ipfs.io/ipfs/bafy1"
    );
}
