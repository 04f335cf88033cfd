use crate::query::MedicineQuery;
use crate::webhook::{Webhook, WebhookError, WebhookReply};
use async_trait::async_trait;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    content_type: Option<String>,
    body: Bytes,
    delay: Duration,
}

/// Webhook stand-in listening on an ephemeral local port.
pub struct MockWebhookServer {
    addr: SocketAddr,
    canned: Arc<Mutex<Canned>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockWebhookServer {
    pub async fn start(status: StatusCode, content_type: Option<&str>, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().unwrap();

        let canned = Arc::new(Mutex::new(Canned {
            status,
            content_type: content_type.map(str::to_owned),
            body: Bytes::from(body.to_owned()),
            delay: Duration::ZERO,
        }));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let server_canned = canned.clone();
        let server_requests = requests.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let io = TokioIo::new(stream);
                let canned = server_canned.clone();
                let requests = server_requests.clone();

                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        respond(req, canned.clone(), requests.clone())
                    });
                    if let Err(err) =
                        hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                            .serve_connection(io, service)
                            .await
                    {
                        eprintln!("Error serving connection: {:?}", err);
                    }
                });
            }
        });

        MockWebhookServer {
            addr,
            canned,
            requests,
        }
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.canned.lock().unwrap().delay = delay;
        self
    }

    pub fn url(&self) -> String {
        format!("http://{}/webhook/medicine", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn respond(
    req: Request<Incoming>,
    canned: Arc<Mutex<Canned>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = body
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .unwrap_or_default();

    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        content_type: parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        body,
    };
    requests.lock().unwrap().push(recorded);

    let canned = canned.lock().unwrap().clone();
    if !canned.delay.is_zero() {
        tokio::time::sleep(canned.delay).await;
    }

    let mut response = Response::new(Full::new(canned.body));
    *response.status_mut() = canned.status;
    if let Some(content_type) = canned.content_type {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_str(&content_type).unwrap());
    }
    Ok(response)
}

/// URL of a local port nothing listens on
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/webhook/medicine")
}

/// In-memory webhook that counts calls. `None` simulates a timeout.
pub struct StubWebhook {
    reply: Option<WebhookReply>,
    calls: AtomicUsize,
    last_query: Mutex<Option<MedicineQuery>>,
}

impl StubWebhook {
    pub fn replying(status: StatusCode, content_type: Option<&str>, body: &str) -> Arc<Self> {
        Arc::new(StubWebhook {
            reply: Some(WebhookReply {
                status,
                content_type: content_type.map(str::to_owned),
                body: Bytes::from(body.to_owned()),
            }),
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        })
    }

    pub fn timing_out() -> Arc<Self> {
        Arc::new(StubWebhook {
            reply: None,
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<MedicineQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl Webhook for StubWebhook {
    fn target(&self) -> &str {
        "stub"
    }

    async fn post(&self, query: &MedicineQuery) -> Result<WebhookReply, WebhookError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());

        self.reply
            .clone()
            .ok_or_else(|| WebhookError::Timeout(self.target().to_string()))
    }
}
