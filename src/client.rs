// Copyright 2020 Cognite AS
//! The primary interface for users of the library.
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use log::{debug, trace, warn};
use serde::de::DeserializeOwned;
use url::Url;

use crate::codec::{encode, Ack, Expect, Json};
use crate::completion::{self, CompletionSink, InFlight};
use crate::config::EnvironmentConfig;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::http::{HttpClient, HttpVerb, RawResponse, HTTP};
use crate::model::{Action, Model, Route};
use crate::resolve::resolve;
use crate::version;

// ----------------- ClientBuilder

pub struct ClientBuilder {
    user_agent: String,
}

impl ClientBuilder {
    /// Start from the defaults, overridden by whatever the environment set.
    pub fn from_config(config: &EnvironmentConfig) -> Self {
        let builder = Self::default();
        match &config.user_agent {
            Some(user_agent) => builder.user_agent(user_agent),
            None => builder,
        }
    }

    pub fn into_client<C>(self, endpoint: impl Endpoint + 'static) -> Result<Client<C>, C::Error>
    where
        C: HttpClient + Default,
    {
        self.with_http_client(C::default(), endpoint)
    }

    /// Use an already configured HTTP client, e.g. one with timeouts or a
    /// proxy set.
    pub fn with_http_client<C>(
        self,
        client: C,
        endpoint: impl Endpoint + 'static,
    ) -> Result<Client<C>, C::Error>
    where
        C: HttpClient,
    {
        Ok(Client {
            endpoint: Arc::new(endpoint),
            http: Arc::new(HTTP::with_client(client, self.user_agent)?),
        })
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for ClientBuilder {
    fn default() -> ClientBuilder {
        ClientBuilder {
            user_agent: version::get_sdk_version().into(),
        }
    }
}

// ----------------- Client

/// Builds requests for models against one endpoint.
///
/// Every operation resolves its URL and encodes its body up front, so
/// template, URL and encoding faults are returned immediately. The returned
/// [`Request`] is then either awaited with [`Request::send`] or handed to
/// [`Request::dispatch`].
///
/// Cloning is cheap; clones share the endpoint and HTTP client.
pub struct Client<C: HttpClient> {
    endpoint: Arc<dyn Endpoint>,
    http: Arc<HTTP<C>>,
}

impl<C: HttpClient> Clone for Client<C> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            http: self.http.clone(),
        }
    }
}

impl<C: HttpClient> Client<C> {
    pub fn endpoint(&self) -> &dyn Endpoint {
        self.endpoint.as_ref()
    }

    /// The URL a request for `T` along `route` would be sent to.
    pub fn url_for<T: Model>(&self, route: &Route) -> Result<Url, Error> {
        resolve(self.endpoint.as_ref(), T::TYPE_NAME, route, None)
    }

    /// Fetch a `T`.
    pub fn get<T: Model>(&self, route: &Route) -> Result<Request<C, Json<T>>, Error> {
        let url = self.url_for::<T>(route)?;
        Ok(self.request(HttpVerb::Get, url, None))
    }

    /// Create `model`; only success or failure is reported.
    pub fn post<T: Model>(&self, model: &T, route: &Route) -> Result<Request<C, Ack>, Error> {
        self.with_body(HttpVerb::Post, model, route, None)
    }

    /// Create `model` and decode the response as `R`.
    pub fn post_returning<T, R>(
        &self,
        model: &T,
        route: &Route,
    ) -> Result<Request<C, Json<R>>, Error>
    where
        T: Model,
        R: DeserializeOwned,
    {
        self.with_body(HttpVerb::Post, model, route, None)
    }

    /// Post `model` to one of its actions.
    pub fn post_action<T, A>(
        &self,
        model: &T,
        action: A,
        route: &Route,
    ) -> Result<Request<C, Ack>, Error>
    where
        T: Model,
        A: Action,
    {
        self.with_body(HttpVerb::Post, model, route, Some(action.raw_value()))
    }

    /// Post `model`, optionally to one of its actions, and decode the
    /// response as `R`.
    pub fn post_action_returning<T, A, R>(
        &self,
        model: &T,
        action: Option<A>,
        route: &Route,
    ) -> Result<Request<C, Json<R>>, Error>
    where
        T: Model,
        A: Action,
        R: DeserializeOwned,
    {
        let action = action.as_ref().map(Action::raw_value);
        self.with_body(HttpVerb::Post, model, route, action)
    }

    /// Replace `model`; only success or failure is reported.
    pub fn put<T: Model>(&self, model: &T, route: &Route) -> Result<Request<C, Ack>, Error> {
        self.with_body(HttpVerb::Put, model, route, None)
    }

    /// Delete a `T`, usually selected through path variables.
    pub fn delete<T: Model>(&self, route: &Route) -> Result<Request<C, Ack>, Error> {
        let url = self.url_for::<T>(route)?;
        Ok(self.request(HttpVerb::Delete, url, None))
    }

    /// A request to an arbitrary URL, for calls the model routing does not
    /// cover. `body` must already be JSON.
    pub fn request<E: Expect>(
        &self,
        verb: HttpVerb,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Request<C, E> {
        Request {
            http: self.http.clone(),
            verb,
            url,
            body,
            _expect: PhantomData,
        }
    }

    fn with_body<T, E>(
        &self,
        verb: HttpVerb,
        model: &T,
        route: &Route,
        action: Option<i32>,
    ) -> Result<Request<C, E>, Error>
    where
        T: Model,
        E: Expect,
    {
        let url = resolve(self.endpoint.as_ref(), T::TYPE_NAME, route, action)?;
        let body = encode(model)?;
        Ok(self.request(verb, url, Some(body)))
    }
}

// ----------------- Request

/// A fully built request. Nothing is sent until it is awaited or dispatched;
/// dropping it sends nothing.
pub struct Request<C: HttpClient, E: Expect> {
    http: Arc<HTTP<C>>,
    verb: HttpVerb,
    url: Url,
    body: Option<Vec<u8>>,
    _expect: PhantomData<fn() -> E>,
}

impl<C: HttpClient, E: Expect> fmt::Debug for Request<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("verb", &self.verb)
            .field("url", &self.url.as_str())
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

impl<C: HttpClient, E: Expect> Request<C, E> {
    pub fn verb(&self) -> HttpVerb {
        self.verb
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Perform the request. Only a 200 response counts as success.
    pub async fn send(self) -> Result<E::Output, Error> {
        debug!("{} {}", self.verb, self.url);
        let response = self
            .http
            .execute(self.verb, &self.url, self.body)
            .await
            .map_err(|err| {
                warn!("{} {}: transport failure: {}", self.verb, self.url, err);
                Error::Transport(Box::new(err))
            })?;
        interpret::<E>(self.verb, &self.url, response)
    }

    /// Start the request and deliver its outcome, mapped through `wrap`, into
    /// the queue behind `sink`. The returned [`InFlight`] must be spawned or
    /// awaited to make progress.
    pub fn dispatch<M, F>(self, sink: &CompletionSink<M>, wrap: F) -> InFlight
    where
        C: 'static,
        E: 'static,
        E::Output: 'static,
        M: Send + 'static,
        F: FnOnce(Result<E::Output, Error>) -> M + Send + 'static,
    {
        completion::in_flight(self.send(), sink, wrap)
    }
}

fn interpret<E: Expect>(
    verb: HttpVerb,
    url: &Url,
    response: RawResponse,
) -> Result<E::Output, Error> {
    trace!(
        "{verb} {url}: {} {}",
        response.status,
        String::from_utf8_lossy(&response.body)
    );
    if response.status != 200 {
        warn!("{verb} {url}: status {}", response.status);
        return Err(Error::NonSuccessStatus {
            status: response.status,
            body: response.body,
        });
    }
    E::decode(&response.body).map_err(|err| {
        debug!("{verb} {url}: {err}");
        err
    })
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};

    use super::{interpret, ClientBuilder};
    use crate::codec::{Ack, Json};
    use crate::config::EnvironmentConfig;
    use crate::endpoint::RouteTable;
    use crate::error::Error;
    use crate::http::{HttpClient, HttpVerb, RawResponse};
    use crate::model::{Model, QueryParams, Route};

    #[derive(Clone, Debug, Default)]
    struct Sent {
        verb: &'static str,
        uri: String,
        headers: Vec<(String, String)>,
        body: Option<Vec<u8>>,
    }

    /// Replies to everything with the same canned response, recording what
    /// was sent. A zero status simulates a connection failure.
    #[derive(Clone, Default)]
    struct Canned {
        reply: RawResponse,
        log: Arc<Mutex<Vec<Sent>>>,
    }

    struct Pending {
        sent: Sent,
        reply: RawResponse,
        log: Arc<Mutex<Vec<Sent>>>,
    }

    impl Canned {
        fn replying(status: u16, body: &str) -> Self {
            Canned {
                reply: RawResponse {
                    status,
                    body: body.as_bytes().to_vec(),
                },
                ..Default::default()
            }
        }

        fn start(&self, verb: &'static str, uri: &str) -> Pending {
            Pending {
                sent: Sent {
                    verb,
                    uri: uri.into(),
                    ..Default::default()
                },
                reply: self.reply.clone(),
                log: self.log.clone(),
            }
        }

        fn sent(&self) -> Vec<Sent> {
            self.log.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClient for Canned {
        type HeaderName = &'static str;
        type Error = io::Error;
        type RequestBuilder = Pending;

        fn build_header(name: &'static str) -> Result<Self::HeaderName, Self::Error> {
            Ok(name)
        }

        fn get(&self, uri: &str) -> Pending {
            self.start("GET", uri)
        }

        fn post(&self, uri: &str) -> Pending {
            self.start("POST", uri)
        }

        fn put(&self, uri: &str) -> Pending {
            self.start("PUT", uri)
        }

        fn delete(&self, uri: &str) -> Pending {
            self.start("DELETE", uri)
        }

        fn header(mut builder: Pending, key: &&'static str, value: &str) -> Pending {
            builder.sent.headers.push((key.to_string(), value.into()));
            builder
        }

        fn body(mut builder: Pending, body: Vec<u8>) -> Pending {
            builder.sent.body = Some(body);
            builder
        }

        async fn send(req: Pending) -> Result<RawResponse, io::Error> {
            req.log.lock().unwrap().push(req.sent);
            if req.reply.status == 0 {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            Ok(req.reply)
        }
    }

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct User {
        id: u64,
        name: String,
    }

    impl Model for User {
        const TYPE_NAME: &'static str = "User";
    }

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Order {
        sku: String,
    }

    impl Model for Order {
        const TYPE_NAME: &'static str = "Order";
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Receipt {
        number: u32,
    }

    enum OrderAction {
        Cancel = 3,
    }

    impl crate::model::Action for OrderAction {
        fn raw_value(&self) -> i32 {
            match self {
                OrderAction::Cancel => OrderAction::Cancel as i32,
            }
        }
    }

    fn client(http: Canned) -> super::Client<Canned> {
        let endpoint = RouteTable::new("https://api.example.com/v1")
            .unwrap()
            .route("Order", "users/%@/orders");
        ClientBuilder::default()
            .user_agent("tests/1.0")
            .with_http_client(http, endpoint)
            .unwrap()
    }

    fn ada() -> User {
        User {
            id: 1,
            name: "Ada".into(),
        }
    }

    #[test]
    fn get_builds_plain_request() {
        let c = client(Canned::default());
        let req = c.get::<User>(&Route::new()).unwrap();
        assert_eq!(HttpVerb::Get, req.verb());
        assert_eq!("https://api.example.com/v1/users", req.url().as_str());
        assert!(req.body().is_none());
    }

    #[test]
    fn post_encodes_model() {
        let c = client(Canned::default());
        let req = c.post(&ada(), &Route::new()).unwrap();
        assert_eq!(HttpVerb::Post, req.verb());
        let body: serde_json::Value = serde_json::from_slice(req.body().unwrap()).unwrap();
        assert_eq!(body["name"], "Ada");
        assert_eq!(body["id"], 1);
    }

    #[test]
    fn action_variants_resolve_urls() {
        let c = client(Canned::default());
        let order = Order { sku: "A1".into() };
        let route = Route::new().path_var(42);
        let req = c.post_action(&order, OrderAction::Cancel, &route).unwrap();
        assert_eq!(
            "https://api.example.com/v1/users/42/orders/3",
            req.url().as_str()
        );
        let req = c
            .post_action_returning::<_, OrderAction, Receipt>(&order, None, &route)
            .unwrap();
        assert_eq!(
            "https://api.example.com/v1/users/42/orders",
            req.url().as_str()
        );
        let req = c
            .post_action_returning::<_, _, Receipt>(&order, Some(7), &route)
            .unwrap();
        assert_eq!(
            "https://api.example.com/v1/users/42/orders/7",
            req.url().as_str()
        );
    }

    #[test]
    fn construction_faults_are_immediate() {
        let http = Canned::default();
        let c = client(http.clone());
        let order = Order { sku: "A1".into() };
        let err = c.put(&order, &Route::new()).unwrap_err();
        assert!(matches!(err, Error::MalformedTemplate { .. }));
        let err = c.get::<Order>(&Route::new().path_var(1).path_var(2)).unwrap_err();
        assert!(matches!(err, Error::MalformedTemplate { .. }));
        assert!(http.sent().is_empty());
    }

    #[tokio::test]
    async fn headers_and_body_reach_transport() {
        let http = Canned::replying(200, "");
        let c = client(http.clone());
        let query = QueryParams::new().param("notify", &true).unwrap();
        c.put(&ada(), &Route::new().query(query))
            .unwrap()
            .send()
            .await
            .unwrap();
        let sent = http.sent();
        assert_eq!(1, sent.len());
        assert_eq!("PUT", sent[0].verb);
        assert_eq!("https://api.example.com/v1/users?notify=true", sent[0].uri);
        assert_eq!(
            vec![
                ("user-agent".to_string(), "tests/1.0".to_string()),
                ("accept".to_string(), "application/json".to_string()),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            sent[0].headers
        );
        assert_eq!(Some(br#"{"id":1,"name":"Ada"}"#.to_vec()), sent[0].body);
    }

    #[tokio::test]
    async fn configured_user_agent_is_sent() {
        let http = Canned::replying(200, "");
        let config = EnvironmentConfig {
            api_url: "https://api.example.com/v1".into(),
            user_agent: Some("inventory-sync/2.1".into()),
            ..Default::default()
        };
        let c = ClientBuilder::from_config(&config)
            .with_http_client(http.clone(), RouteTable::from_config(&config).unwrap())
            .unwrap();
        c.delete::<User>(&Route::new()).unwrap().send().await.unwrap();
        let sent = http.sent();
        assert_eq!(
            ("user-agent".to_string(), "inventory-sync/2.1".to_string()),
            sent[0].headers[0]
        );

        let http = Canned::replying(200, "");
        let config = EnvironmentConfig {
            user_agent: None,
            ..config
        };
        let c = ClientBuilder::from_config(&config)
            .with_http_client(http.clone(), RouteTable::from_config(&config).unwrap())
            .unwrap();
        c.delete::<User>(&Route::new()).unwrap().send().await.unwrap();
        assert_eq!(crate::version::get_sdk_version(), http.sent()[0].headers[0].1);
    }

    #[tokio::test]
    async fn get_without_body_has_no_content_type() {
        let http = Canned::replying(200, r#"{"id": 1, "name": "Ada"}"#);
        let c = client(http.clone());
        let user = c.get::<User>(&Route::new()).unwrap().send().await.unwrap();
        assert_eq!(ada(), user);
        let sent = http.sent();
        assert!(sent[0].headers.iter().all(|(k, _)| k != "content-type"));
        assert!(sent[0].body.is_none());
    }

    #[tokio::test]
    async fn post_returning_decodes() {
        let c = client(Canned::replying(200, r#"{"number": 12}"#));
        let receipt = c
            .post_returning::<_, Receipt>(&ada(), &Route::new())
            .unwrap()
            .send()
            .await
            .unwrap();
        assert_eq!(Receipt { number: 12 }, receipt);
    }

    #[tokio::test]
    async fn transport_fault_is_reported() {
        let c = client(Canned::replying(0, ""));
        let err = c.delete::<User>(&Route::new()).unwrap().send().await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[test]
    fn only_200_is_success() {
        let url = url::Url::parse("https://api.example.com/v1/users").unwrap();
        for status in [201, 204, 301, 404, 500] {
            let response = RawResponse {
                status,
                body: b"{}".to_vec(),
            };
            let err = interpret::<Ack>(HttpVerb::Post, &url, response).unwrap_err();
            assert_eq!(Some(status), err.status());
        }
        let ok = RawResponse {
            status: 200,
            body: vec![],
        };
        interpret::<Ack>(HttpVerb::Post, &url, ok).unwrap();
    }

    #[test]
    fn decode_mismatch_on_200() {
        let url = url::Url::parse("https://api.example.com/v1/users").unwrap();
        let response = RawResponse {
            status: 200,
            body: br#"{"id": "x"}"#.to_vec(),
        };
        assert!(matches!(
            interpret::<Json<User>>(HttpVerb::Get, &url, response),
            Err(Error::DecodeMismatch(_))
        ));
    }
}
