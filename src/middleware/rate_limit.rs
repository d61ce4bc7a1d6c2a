use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::auth::resolve_user_id;
use crate::config::RateLimitConfig;
use rocket::http::{Method, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{RefOr, Response as OpenApiResponse, Responses};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RateLimitBucket {
    Read,
    Mutation,
}

impl RateLimitBucket {
    fn from_method(method: Method) -> Self {
        match method {
            Method::Post | Method::Put | Method::Patch | Method::Delete => RateLimitBucket::Mutation,
            _ => RateLimitBucket::Read,
        }
    }
}

/// Signed-in callers are counted by subject id, everyone else by address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RateLimitIdentity {
    User(String),
    Ip(String),
    Unknown,
}

#[derive(Debug, Clone)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter shared across all workers.
#[derive(Debug)]
pub(crate) struct RateLimiter {
    config: RateLimitConfig,
    window: Duration,
    windows: Mutex<HashMap<(RateLimitIdentity, RateLimitBucket), Window>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RateLimitDecision {
    Allow,
    Limited { retry_after: Duration },
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let window = Duration::from_secs(config.window_seconds.max(1));
        Self {
            config,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn spawn_cleanup_task(self: Arc<Self>) {
        let interval = Duration::from_secs(self.config.cleanup_interval_seconds.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let now = Instant::now();
                self.windows.lock().await.retain(|_, w| now.duration_since(w.started) < self.window);
            }
        });
    }

    fn limit(&self, bucket: RateLimitBucket) -> u32 {
        match bucket {
            RateLimitBucket::Read => self.config.read_limit,
            RateLimitBucket::Mutation => self.config.mutation_limit,
        }
    }

    async fn check(&self, identity: RateLimitIdentity, bucket: RateLimitBucket) -> RateLimitDecision {
        let limit = self.limit(bucket);
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let window = windows.entry((identity, bucket)).or_insert(Window { started: now, count: 0 });

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        // Rejected requests are not counted.
        if window.count >= limit {
            let retry_after = self.window.saturating_sub(now.duration_since(window.started));
            return RateLimitDecision::Limited { retry_after };
        }

        window.count += 1;
        RateLimitDecision::Allow
    }
}

/// Guard that counts the request against the caller's read or mutation budget.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RateLimit;

/// Seconds until the caller's window resets; read by the 429 catcher.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RateLimitRetryAfter(pub u64);

fn identify(request: &Request<'_>) -> RateLimitIdentity {
    if let Some(user_id) = resolve_user_id(request) {
        return RateLimitIdentity::User(user_id);
    }
    match request.client_ip() {
        Some(ip) => RateLimitIdentity::Ip(ip.to_string()),
        None => RateLimitIdentity::Unknown,
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RateLimit {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(limiter) = request.rocket().state::<Arc<RateLimiter>>() else {
            return Outcome::Success(RateLimit);
        };

        let bucket = RateLimitBucket::from_method(request.method());
        match limiter.check(identify(request), bucket).await {
            RateLimitDecision::Allow => Outcome::Success(RateLimit),
            RateLimitDecision::Limited { retry_after } => {
                let retry_after_secs = retry_after.as_secs().max(1);
                request.local_cache(|| Some(RateLimitRetryAfter(retry_after_secs)));
                warn!(
                    method = %request.method(),
                    uri = %request.uri(),
                    bucket = ?bucket,
                    retry_after_secs = %retry_after_secs,
                    "rate limit exceeded"
                );
                Outcome::Error((Status::TooManyRequests, ()))
            }
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for RateLimit {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        let mut responses = Responses::default();
        responses.responses.insert(
            "429".to_string(),
            RefOr::Object(OpenApiResponse {
                description: "Too Many Requests".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}
