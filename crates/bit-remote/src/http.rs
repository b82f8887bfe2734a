use crate::{BlobKind, RemoteError, ScopeBackend};
use std::io::Read;

/// HTTP scope backend.
///
/// Expects a simple REST API:
/// - `PUT  /manifests/<key>`: upload a manifest blob
/// - `GET  /manifests/<key>`: download a manifest blob
/// - `HEAD /manifests/<key>`: check existence
/// - `GET  /manifests/`: list keys (JSON array of strings)
/// - Same pattern for `/sources/`
/// - `PUT  /index` and `GET /index`: the scope index
pub struct HttpBackend {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            agent: ureq::Agent::new_with_defaults(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, kind: BlobKind, key: &str) -> String {
        format!("{}/{}/{}", self.base_url, kind.dir_name(), key)
    }

    fn do_put(&self, url: &str, content_type: &str, data: &[u8]) -> Result<(), RemoteError> {
        self.agent
            .put(url)
            .header("Content-Type", content_type)
            .header("X-Bit-Protocol", &crate::PROTOCOL_VERSION.to_string())
            .send(data)
            .map_err(|e| RemoteError::Http(e.to_string()))?;
        Ok(())
    }

    fn do_get(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        let resp = match self
            .agent
            .get(url)
            .header("X-Bit-Protocol", &crate::PROTOCOL_VERSION.to_string())
            .call()
        {
            Ok(r) => r,
            Err(ureq::Error::StatusCode(404)) => {
                return Err(RemoteError::NotFound(url.to_owned()));
            }
            Err(ureq::Error::StatusCode(code)) => {
                return Err(RemoteError::Http(format!("HTTP {code} for {url}")));
            }
            Err(e) => return Err(RemoteError::Http(e.to_string())),
        };

        let mut body = Vec::new();
        resp.into_body()
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| RemoteError::Http(e.to_string()))?;
        Ok(body)
    }

    fn do_head(&self, url: &str) -> Result<u16, RemoteError> {
        match self
            .agent
            .head(url)
            .header("X-Bit-Protocol", &crate::PROTOCOL_VERSION.to_string())
            .call()
        {
            Ok(resp) => Ok(resp.status().into()),
            Err(ureq::Error::StatusCode(code)) => Ok(code),
            Err(e) => Err(RemoteError::Http(e.to_string())),
        }
    }
}

impl ScopeBackend for HttpBackend {
    fn put_blob(&self, kind: BlobKind, key: &str, data: &[u8]) -> Result<(), RemoteError> {
        let url = self.url(kind, key);
        tracing::debug!("PUT {url} ({} bytes)", data.len());
        self.do_put(&url, "application/octet-stream", data)
    }

    fn get_blob(&self, kind: BlobKind, key: &str) -> Result<Vec<u8>, RemoteError> {
        let url = self.url(kind, key);
        tracing::debug!("GET {url}");
        self.do_get(&url)
    }

    fn has_blob(&self, kind: BlobKind, key: &str) -> Result<bool, RemoteError> {
        let url = self.url(kind, key);
        tracing::debug!("HEAD {url}");
        match self.do_head(&url)? {
            200 => Ok(true),
            404 => Ok(false),
            code => Err(RemoteError::Http(format!("HTTP {code} for HEAD {url}"))),
        }
    }

    fn put_index(&self, data: &[u8]) -> Result<(), RemoteError> {
        let url = format!("{}/index", self.base_url);
        tracing::debug!("PUT {url} ({} bytes)", data.len());
        self.do_put(&url, "application/json", data)
    }

    fn get_index(&self) -> Result<Vec<u8>, RemoteError> {
        let url = format!("{}/index", self.base_url);
        tracing::debug!("GET {url}");
        self.do_get(&url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    struct CapturedRequest {
        method: String,
        headers: HashMap<String, String>,
    }

    /// Minimal in-process HTTP server storing PUT bodies by path.
    struct MockServer {
        addr: String,
        _handle: std::thread::JoinHandle<()>,
        requests: Arc<Mutex<Vec<CapturedRequest>>>,
    }

    impl MockServer {
        fn start() -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = format!("http://{}", listener.local_addr().unwrap());
            let store: Arc<Mutex<HashMap<String, Vec<u8>>>> = Arc::new(Mutex::new(HashMap::new()));
            let requests: Arc<Mutex<Vec<CapturedRequest>>> = Arc::new(Mutex::new(Vec::new()));

            let store_clone = Arc::clone(&store);
            let requests_clone = Arc::clone(&requests);
            let handle = std::thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(mut stream) = stream else { break };
                    let store = Arc::clone(&store_clone);
                    let reqs = Arc::clone(&requests_clone);

                    std::thread::spawn(move || {
                        let mut reader = BufReader::new(stream.try_clone().unwrap());
                        let mut request_line = String::new();
                        if reader.read_line(&mut request_line).is_err() {
                            return;
                        }
                        let parts: Vec<&str> = request_line.trim().splitn(3, ' ').collect();
                        if parts.len() < 2 {
                            return;
                        }
                        let method = parts[0].to_owned();
                        let path = parts[1].to_owned();

                        let mut content_length: usize = 0;
                        let mut headers = HashMap::new();
                        loop {
                            let mut line = String::new();
                            if reader.read_line(&mut line).is_err() || line.trim().is_empty() {
                                break;
                            }
                            if let Some((k, v)) = line.trim().split_once(": ") {
                                headers.insert(k.to_lowercase(), v.to_owned());
                            }
                            let lower = line.to_lowercase();
                            if let Some(val) = lower.strip_prefix("content-length: ") {
                                content_length = val.trim().parse().unwrap_or(0);
                            }
                        }

                        reqs.lock().unwrap().push(CapturedRequest {
                            method: method.clone(),
                            headers,
                        });

                        let mut body = vec![0u8; content_length];
                        if content_length > 0 {
                            let _ = reader.read_exact(&mut body);
                        }

                        let mut data = store.lock().unwrap();
                        let not_found =
                            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
                        let ok_empty = "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
                        let response = match method.as_str() {
                            "PUT" => {
                                data.insert(path.clone(), body);
                                ok_empty.to_owned()
                            }
                            "GET" => match data.get(&path) {
                                Some(val) => format!(
                                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                                    val.len()
                                ),
                                None => not_found.to_owned(),
                            },
                            "HEAD" => {
                                if data.contains_key(&path) {
                                    ok_empty.to_owned()
                                } else {
                                    not_found.to_owned()
                                }
                            }
                            _ => "HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                                .to_owned(),
                        };

                        let _ = stream.write_all(response.as_bytes());
                        if method == "GET" {
                            if let Some(val) = data.get(&path) {
                                let _ = stream.write_all(val);
                            }
                        }
                        let _ = stream.flush();
                    });
                }
            });

            MockServer {
                addr,
                _handle: handle,
                requests,
            }
        }

        fn captured_requests(&self) -> Vec<CapturedRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[test]
    fn http_put_and_get_blob() {
        let server = MockServer::start();
        let backend = HttpBackend::new(&server.addr);
        backend
            .put_blob(BlobKind::Manifest, "utils/a/1", b"{}")
            .unwrap();
        let data = backend.get_blob(BlobKind::Manifest, "utils/a/1").unwrap();
        assert_eq!(data, b"{}");
    }

    #[test]
    fn http_has_blob_true_and_false() {
        let server = MockServer::start();
        let backend = HttpBackend::new(&server.addr);
        assert!(!backend.has_blob(BlobKind::Source, "missing").unwrap());
        backend.put_blob(BlobKind::Source, "exists", b"data").unwrap();
        assert!(backend.has_blob(BlobKind::Source, "exists").unwrap());
    }

    #[test]
    fn http_get_nonexistent_is_not_found() {
        let server = MockServer::start();
        let backend = HttpBackend::new(&server.addr);
        let result = backend.get_blob(BlobKind::Source, "nonexistent");
        assert!(matches!(result, Err(RemoteError::NotFound(_))));
    }

    #[test]
    fn http_put_and_get_index() {
        let server = MockServer::start();
        let backend = HttpBackend::new(&server.addr);
        let index = b"{\"entries\":{}}";
        backend.put_index(index).unwrap();
        assert_eq!(backend.get_index().unwrap(), index);
    }

    #[test]
    fn http_connection_refused_returns_error() {
        let backend = HttpBackend::new("http://127.0.0.1:1");
        let result = backend.put_blob(BlobKind::Source, "key", b"data");
        assert!(matches!(result, Err(RemoteError::Http(_))));
    }

    #[test]
    fn http_trims_trailing_slash() {
        let backend = HttpBackend::new("http://scopes.example.com/acme/");
        assert_eq!(backend.base_url(), "http://scopes.example.com/acme");
    }

    #[test]
    fn http_requests_include_protocol_header() {
        let server = MockServer::start();
        let backend = HttpBackend::new(&server.addr);

        backend.put_blob(BlobKind::Source, "h1", b"data").unwrap();
        let _ = backend.get_blob(BlobKind::Source, "h1");
        let _ = backend.has_blob(BlobKind::Source, "h1");

        std::thread::sleep(std::time::Duration::from_millis(50));

        let reqs = server.captured_requests();
        assert!(reqs.len() >= 3, "expected at least 3 requests, got {}", reqs.len());
        for req in &reqs {
            assert_eq!(
                req.headers.get("x-bit-protocol"),
                Some(&"1".to_owned()),
                "{} missing X-Bit-Protocol header",
                req.method
            );
        }
    }
}
