use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinError;
use tracing::{debug, trace};
use zengine_rpc::RpcTransport;

use crate::config::FetchConfig;
use crate::error::{FetchError, Result};
use crate::request::FetchInput;
use crate::response::Response;
use crate::signal::AbortSignal;
use crate::status::FetchStatus;
use crate::wire::{WireRequest, WireResponse};

/// What the abort watcher saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WatchOutcome {
    Aborted,
    Completed,
}

enum Settled {
    Call(zengine_rpc::Result<Value>),
    Watcher(std::result::Result<WatchOutcome, JoinError>),
}

/// Perform a fetch through the host frame.
///
/// The request is sent as a single `znFetch` call. While it is in flight a
/// watcher task polls `init.signal`; if the signal is seen aborted before
/// the host replies, this returns [`FetchError::Aborted`] and the host's
/// eventual reply is discarded. The host-side request itself keeps running.
/// A signal that is already aborted fails the fetch before anything is sent.
///
/// Must be called from within a tokio runtime.
pub async fn zn_fetch<T: RpcTransport>(
    transport: &T,
    input: impl Into<FetchInput>,
    config: &FetchConfig,
) -> Result<Response> {
    fetch_with_status(transport, input.into(), config, Arc::new(FetchStatus::new())).await
}

pub(crate) async fn fetch_with_status<T: RpcTransport>(
    transport: &T,
    input: FetchInput,
    config: &FetchConfig,
    status: Arc<FetchStatus>,
) -> Result<Response> {
    let (url, mut init) = input.into_parts();
    let signal = init.signal.take();

    let call = WireRequest::new(url.clone(), init, &config.api_version)
        .into_call()
        .map_err(FetchError::InvalidRequest)?;

    // A reply can be ready on its first poll, so an abort that already
    // happened has to be settled before the race.
    if signal.as_ref().is_some_and(AbortSignal::aborted) {
        let first = status.mark_complete();
        debug_assert!(first, "fetch status completed twice");
        debug!(url = %url, "signal already aborted; not dispatching");
        return Err(FetchError::Aborted { url });
    }
    debug!(url = %url, "dispatching bridged fetch");

    // Stops the watcher even if this future is dropped mid-race.
    let _complete_on_drop = CompleteOnDrop(status.clone());
    let mut watcher = tokio::spawn(watch_abort_or_completion(
        signal,
        status.clone(),
        config.poll_interval,
        config.completion_grace,
    ));
    let call = transport.call(call);
    tokio::pin!(call);

    let settled = tokio::select! {
        biased;
        reply = &mut call => Settled::Call(reply),
        watched = &mut watcher => Settled::Watcher(watched),
    };

    // The watcher only reports completion after this flag is set, so it
    // cannot win with `Completed`; if it ever does, the call is the answer.
    let settled = match settled {
        Settled::Watcher(Ok(WatchOutcome::Completed)) => Settled::Call(call.await),
        other => other,
    };

    // Starves a still-running watcher on its next tick.
    let first = status.mark_complete();
    debug_assert!(first, "fetch status completed twice");

    match settled {
        Settled::Watcher(Ok(_)) => {
            debug!(url = %url, "bridged fetch aborted by signal");
            Err(FetchError::Aborted { url })
        }
        Settled::Watcher(Err(err)) => Err(FetchError::Watcher(err)),
        Settled::Call(reply) => {
            let wire: WireResponse =
                serde_json::from_value(reply?).map_err(FetchError::InvalidResponse)?;
            if wire.fetch_signal_aborted {
                debug!(url = %url, "host reported bridged fetch aborted");
                return Err(FetchError::Aborted { url });
            }
            debug!(url = %url, status = wire.status, "bridged fetch completed");
            wire.into_response()
        }
    }
}

struct CompleteOnDrop(Arc<FetchStatus>);

impl Drop for CompleteOnDrop {
    fn drop(&mut self) {
        self.0.mark_complete();
    }
}

/// Poll until the fetch completes or the signal is aborted.
///
/// On seeing completion it sleeps `grace` before yielding so that it loses
/// any race against the real result.
pub(crate) async fn watch_abort_or_completion(
    signal: Option<AbortSignal>,
    status: Arc<FetchStatus>,
    poll_interval: Duration,
    grace: Duration,
) -> WatchOutcome {
    loop {
        if status.is_complete() {
            tokio::time::sleep(grace).await;
            return WatchOutcome::Completed;
        }
        if signal.as_ref().is_some_and(AbortSignal::aborted) {
            return WatchOutcome::Aborted;
        }
        trace!(?poll_interval, "abort signal idle; polling again");
        tokio::time::sleep(poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::Mutex;

    use serde_json::json;
    use tokio::time::Instant;
    use zengine_rpc::{RpcCall, RpcError};

    use super::*;
    use crate::error::FetchErrorKind;
    use crate::request::{FetchInit, Request, RequestCredentials};
    use crate::signal::AbortController;

    const URL: &str = "https://api.zenginehq.com/graphql";

    struct ScriptedTransport {
        reply: zengine_rpc::Result<Value>,
        delay: Duration,
        calls: Mutex<Vec<RpcCall>>,
    }

    impl ScriptedTransport {
        fn replying(reply: zengine_rpc::Result<Value>, delay: Duration) -> Self {
            Self {
                reply,
                delay,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn ok_after(delay: Duration) -> Self {
            Self::replying(
                Ok(json!({
                    "body": "{\"data\":{}}",
                    "headers": { "content-type": "application/json" },
                    "status": 200,
                    "statusText": "OK"
                })),
                delay,
            )
        }

        fn calls(&self) -> Vec<RpcCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RpcTransport for ScriptedTransport {
        fn call(&self, call: RpcCall) -> impl Future<Output = zengine_rpc::Result<Value>> + Send {
            self.calls.lock().unwrap().push(call);
            let reply = self.reply.clone();
            let delay = self.delay;
            async move {
                tokio::time::sleep(delay).await;
                reply
            }
        }
    }

    struct SilentTransport;

    /// Answers on the first poll, with no suspension at all.
    struct ReadyTransport {
        calls: Mutex<Vec<RpcCall>>,
    }

    impl RpcTransport for ReadyTransport {
        fn call(&self, call: RpcCall) -> impl Future<Output = zengine_rpc::Result<Value>> + Send {
            self.calls.lock().unwrap().push(call);
            std::future::ready(Ok(json!({ "body": "late", "status": 200 })))
        }
    }

    impl RpcTransport for SilentTransport {
        fn call(&self, _call: RpcCall) -> impl Future<Output = zengine_rpc::Result<Value>> + Send {
            std::future::pending()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn returns_rebuilt_response() {
        let transport = ScriptedTransport::ok_after(Duration::from_millis(5));
        let response = zn_fetch(&transport, URL, &FetchConfig::default())
            .await
            .unwrap();

        assert!(response.ok());
        assert_eq!(response.status_text(), "OK");
        assert_eq!(
            response.headers().get("Content-Type").as_deref(),
            Some("application/json")
        );
        assert_eq!(response.json::<Value>().unwrap(), json!({ "data": {} }));
    }

    #[tokio::test(start_paused = true)]
    async fn url_and_request_forms_send_identical_calls() {
        let init = || {
            FetchInit::new()
                .method("POST")
                .header("X-Id", "1")
                .and_then(|init| init.header("X-Id", "2"))
                .unwrap()
                .body("{}")
        };

        let transport = ScriptedTransport::ok_after(Duration::ZERO);
        let config = FetchConfig::default();
        zn_fetch(&transport, (URL, init()), &config).await.unwrap();
        zn_fetch(&transport, Request::new(URL, init()), &config)
            .await
            .unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
        assert_eq!(calls[0].args["fetchOptions"]["headers"]["x-id"], "1, 2");
        assert_eq!(calls[0].args["options"]["apiVersion"], "1");
    }

    #[tokio::test(start_paused = true)]
    async fn passthrough_fields_reach_the_host_unchanged() {
        let transport = ScriptedTransport::ok_after(Duration::ZERO);
        let controller = AbortController::new();
        let init = FetchInit::new()
            .method("PUT")
            .credentials(RequestCredentials::SameOrigin)
            .signal(controller.signal())
            .extra("cache", json!("no-store"));
        zn_fetch(&transport, (URL, init), &FetchConfig::default())
            .await
            .unwrap();

        let options = &transport.calls()[0].args["fetchOptions"];
        assert_eq!(options["method"], "PUT");
        assert_eq!(options["credentials"], "same-origin");
        assert_eq!(options["cache"], "no-store");
        assert!(options.get("signal").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn completed_call_beats_late_abort() {
        let transport = ScriptedTransport::ok_after(Duration::from_millis(5));
        let config = FetchConfig {
            poll_interval: Duration::from_secs(60),
            ..FetchConfig::default()
        };
        let controller = AbortController::new();
        let abort_later = {
            let controller = controller.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(6)).await;
                controller.abort();
            })
        };

        let response = zn_fetch(&transport, (URL, FetchInit::new().signal(controller.signal())), &config)
            .await
            .expect("completed call must win");
        assert_eq!(response.status(), http::StatusCode::OK);
        abort_later.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn pre_aborted_signal_rejects_without_waiting_for_host() {
        let start = Instant::now();
        let err = zn_fetch(
            &SilentTransport,
            (URL, FetchInit::new().signal(AbortSignal::aborted_signal())),
            &FetchConfig::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), FetchErrorKind::Abort);
        assert_eq!(err.name(), "AbortError");
        assert!(err.to_string().contains(URL));
        assert!(start.elapsed() < FetchConfig::default().poll_interval);
    }

    #[tokio::test(start_paused = true)]
    async fn abort_mid_flight_is_seen_within_one_tick() {
        let transport = ScriptedTransport::ok_after(Duration::from_secs(5));
        let controller = AbortController::new();
        let aborter = controller.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(120)).await;
            aborter.abort();
        });

        let start = Instant::now();
        let err = zn_fetch(
            &transport,
            (URL, FetchInit::new().signal(controller.signal())),
            &FetchConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(err.is_abort());
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(120));
        assert!(elapsed <= Duration::from_millis(170));
    }

    #[tokio::test(start_paused = true)]
    async fn transport_errors_pass_through() {
        let inner = RpcError::Timeout {
            method: "znFetch".to_string(),
            timeout: Duration::from_secs(30),
        };
        let transport = ScriptedTransport::replying(Err(inner.clone()), Duration::ZERO);
        let err = zn_fetch(&transport, URL, &FetchConfig::default())
            .await
            .unwrap_err();

        match err {
            FetchError::Transport(got) => assert_eq!(got, inner),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn host_reported_abort_is_an_abort() {
        let transport = ScriptedTransport::replying(
            Ok(json!({ "fetchSignalAborted": true })),
            Duration::ZERO,
        );
        let err = zn_fetch(&transport, URL, &FetchConfig::default())
            .await
            .unwrap_err();
        assert!(err.is_abort());
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_host_reply_is_rejected() {
        let transport = ScriptedTransport::replying(Ok(json!("not a response")), Duration::ZERO);
        let err = zn_fetch(&transport, URL, &FetchConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::InvalidResponse);
    }

    #[tokio::test(start_paused = true)]
    async fn status_completes_exactly_once_on_either_branch() {
        let config = FetchConfig::default();

        let status = Arc::new(FetchStatus::new());
        let transport = ScriptedTransport::ok_after(Duration::from_millis(75));
        fetch_with_status(&transport, URL.into(), &config, status.clone())
            .await
            .unwrap();
        assert!(status.is_complete());
        assert!(!status.mark_complete());

        let status = Arc::new(FetchStatus::new());
        let input = FetchInput::from((URL, FetchInit::new().signal(AbortSignal::aborted_signal())));
        fetch_with_status(&SilentTransport, input, &config, status.clone())
            .await
            .unwrap_err();
        assert!(status.is_complete());
        assert!(!status.mark_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn watcher_stops_one_tick_after_completion() {
        let status = Arc::new(FetchStatus::new());
        let poll = Duration::from_millis(50);
        let grace = Duration::from_millis(10);
        let start = Instant::now();
        let watcher = tokio::spawn(watch_abort_or_completion(None, status.clone(), poll, grace));

        tokio::time::sleep(Duration::from_millis(20)).await;
        status.mark_complete();

        assert_eq!(watcher.await.unwrap(), WatchOutcome::Completed);
        assert!(start.elapsed() <= poll + grace);
    }

    #[tokio::test(start_paused = true)]
    async fn pre_aborted_signal_beats_an_immediate_reply() {
        let transport = ReadyTransport {
            calls: Mutex::new(Vec::new()),
        };
        let err = zn_fetch(
            &transport,
            (URL, FetchInit::new().signal(AbortSignal::aborted_signal())),
            &FetchConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(err.is_abort());
        assert!(transport.calls.lock().unwrap().is_empty());

        // Without the abort, the same transport answers.
        let response = zn_fetch(&transport, URL, &FetchConfig::default())
            .await
            .unwrap();
        assert_eq!(response.text(), "late");
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_fetch_stops_the_watcher() {
        let config = FetchConfig::default();
        let status = Arc::new(FetchStatus::new());
        let controller = AbortController::new();
        let input = FetchInput::from((URL, FetchInit::new().signal(controller.signal())));

        let abandoned = tokio::time::timeout(
            Duration::from_millis(100),
            fetch_with_status(&SilentTransport, input, &config, status.clone()),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(status.is_complete());

        // The watcher sees completion on its next tick and releases its handle.
        tokio::time::sleep(config.poll_interval + config.completion_grace + Duration::from_millis(1)).await;
        assert_eq!(Arc::strong_count(&status), 1);
    }
}
