//! In-memory stand-ins for the network used across the unit tests.
use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::Value;

use crate::api::{error::ApiError, Api, Params};
use crate::error::FetchError;
use crate::fetch::Transport;

#[derive(Debug, Default)]
struct Route {
    failures_left: u32,
    body: Option<Bytes>,
    calls: u32,
}

/// Serves canned bodies per URL, optionally failing the first few requests.
/// Unknown URLs always fail.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, Route>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, body: &[u8]) {
        self.fail_then_serve(url, 0, body);
    }

    pub fn fail_then_serve(&self, url: &str, failures: u32, body: &[u8]) {
        self.routes.lock().insert(
            url.to_string(),
            Route {
                failures_left: failures,
                body: Some(Bytes::copy_from_slice(body)),
                calls: 0,
            },
        );
    }

    pub fn calls(&self, url: &str) -> u32 {
        self.routes.lock().get(url).map_or(0, |r| r.calls)
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &str) -> Result<Bytes, FetchError> {
        let mut routes = self.routes.lock();
        let route = routes.entry(url.to_string()).or_default();
        route.calls += 1;

        if route.failures_left > 0 {
            route.failures_left -= 1;
            return Err(FetchError::BadStatus { status: 503 });
        }

        route.body.clone().ok_or_else(|| FetchError::Transport {
            message: format!("no route to {url}"),
        })
    }
}

/// Answers API calls from a table keyed by method name and a subset of params.
#[derive(Debug, Default)]
pub struct FakeApi {
    responses: Vec<(String, Params, Result<Value, String>)>,
    calls: Mutex<Vec<(String, Params)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a response for `method` whenever the request carries every `params` pair.
    pub fn on(mut self, method: &str, params: &[(&str, &str)], response: Value) -> Self {
        self.responses
            .push((method.to_string(), to_params(params), Ok(response)));
        self
    }

    pub fn fail_on(mut self, method: &str, params: &[(&str, &str)], message: &str) -> Self {
        self.responses
            .push((method.to_string(), to_params(params), Err(message.to_string())));
        self
    }

    pub fn calls(&self) -> Vec<(String, Params)> {
        self.calls.lock().clone()
    }
}

fn to_params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

impl Api for FakeApi {
    fn request(&self, method: &str, params: &Params) -> Result<Value, ApiError> {
        self.calls.lock().push((method.to_string(), params.clone()));

        let hit = self.responses.iter().find(|(m, wanted, _)| {
            m == method && wanted.iter().all(|(k, v)| params.get(k) == Some(v))
        });

        match hit {
            Some((_, _, Ok(value))) => Ok(value.clone()),
            Some((_, _, Err(message))) => Err(ApiError::Remote {
                code: 1,
                message: message.clone(),
            }),
            None => Err(ApiError::InvalidServerResponse),
        }
    }
}
