//! In-process stand-in for the coin history API.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use axum::{
    Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;

/// What the mock answers for one request.
#[derive(Clone, Debug)]
pub enum Reply {
    Price(f64),
    /// 200 with a JSON body that has no `usd` price.
    Unpriced,
    /// 200 with a body that is not JSON.
    Garbage,
    Status(StatusCode),
    RateLimited { retry_after: Option<&'static str> },
    Delayed(Duration, Box<Reply>),
}

/// Decides the reply from `(coin, date as DD-MM-YYYY, zero-based call index for that date)`.
pub type Script = Arc<dyn Fn(&str, &str, usize) -> Reply + Send + Sync>;

struct MockState {
    script: Script,
    hits: Mutex<HashMap<String, usize>>,
    arrivals: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[derive(Deserialize)]
struct HistoryQuery {
    date: String,
}

pub struct MockApi {
    /// Base URL including the `/api/v3` prefix.
    pub base_url: String,
    state: Arc<MockState>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockApi {
    pub async fn start(script: impl Fn(&str, &str, usize) -> Reply + Send + Sync + 'static) -> Self {
        let state = Arc::new(MockState {
            script: Arc::new(script),
            hits: Mutex::new(HashMap::new()),
            arrivals: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/api/v3/coins/:coin/history", get(history_handler))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr: SocketAddr = listener.local_addr().expect("listener addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock api");
        });

        Self {
            base_url: format!("http://{addr}/api/v3"),
            state,
            _handle: handle,
        }
    }

    /// Always answers with the same price.
    pub async fn priced(price: f64) -> Self {
        Self::start(move |_, _, _| Reply::Price(price)).await
    }

    pub fn hits(&self, api_date: &str) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .get(api_date)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.state.hits.lock().unwrap().values().sum()
    }

    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }

    /// Dates in the order their first request arrived.
    pub fn arrival_order(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for (date, _) in self.state.arrivals.lock().unwrap().iter() {
            if !seen.contains(date) {
                seen.push(date.clone());
            }
        }
        seen
    }
}

async fn history_handler(
    State(state): State<Arc<MockState>>,
    Path(coin): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let call = {
        let mut hits = state.hits.lock().unwrap();
        let n = hits.entry(query.date.clone()).or_insert(0);
        *n += 1;
        *n - 1
    };
    state
        .arrivals
        .lock()
        .unwrap()
        .push((query.date.clone(), Instant::now()));

    let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.max_in_flight.fetch_max(now, Ordering::SeqCst);

    let reply = (state.script)(&coin, &query.date, call);
    let response = render(&coin, reply).await;

    state.in_flight.fetch_sub(1, Ordering::SeqCst);
    response
}

async fn render(coin: &str, mut reply: Reply) -> Response {
    while let Reply::Delayed(wait, inner) = reply {
        tokio::time::sleep(wait).await;
        reply = *inner;
    }

    match reply {
        Reply::Price(price) => axum::Json(json!({
            "id": coin,
            "symbol": coin.chars().take(3).collect::<String>(),
            "market_data": { "current_price": { "usd": price, "eur": price * 0.9 } }
        }))
        .into_response(),
        Reply::Unpriced => axum::Json(json!({ "id": coin, "market_data": {} })).into_response(),
        Reply::Garbage => (StatusCode::OK, "<html>not json</html>").into_response(),
        Reply::Status(status) => (status, "error").into_response(),
        Reply::RateLimited { retry_after } => match retry_after {
            Some(value) => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, value)],
                "slow down",
            )
                .into_response(),
            None => (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response(),
        },
        Reply::Delayed(..) => unreachable!("unwrapped above"),
    }
}

/// A base URL nothing is listening on.
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("listener addr");
    drop(listener);
    format!("http://{addr}/api/v3")
}
