//! Network seam between a host and the game server.
//!
//! A host performs every request through a [`Transport`]. Wrapping that
//! transport in [`Intercepting`] lets a [`TrackerSession`] observe each
//! response after it was delivered, without altering what the caller gets.

use std::fmt;

use serde::{Deserialize, Serialize};
use tilewatch_record::{RoundInputs, store::RecordStore};

use crate::session::TrackerSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub url: String,
    pub method: String,
    pub body: Option<String>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            url: url.to_owned(),
            method: method.to_owned(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Something that can carry a request to the game server.
pub trait Transport {
    type Error;

    fn send(&mut self, request: &HttpRequest) -> Result<HttpResponse, Self::Error>;
}

impl<T> Transport for &mut T
where
    T: Transport + ?Sized,
{
    type Error = T::Error;

    fn send(&mut self, request: &HttpRequest) -> Result<HttpResponse, Self::Error> {
        (**self).send(request)
    }
}

/// Transport middleware that forwards every call and then lets the session
/// correlate the response.
///
/// Created by [`TrackerSession::intercept`]. The round inputs are the host's
/// state at the time of the call; they only feed the recorded event fields.
#[derive(Debug)]
pub struct Intercepting<'a, T, S> {
    inner: T,
    session: &'a mut TrackerSession<S>,
    round: &'a RoundInputs,
}

impl<'a, T, S> Intercepting<'a, T, S> {
    pub(crate) fn new(inner: T, session: &'a mut TrackerSession<S>, round: &'a RoundInputs) -> Self {
        Self {
            inner,
            session,
            round,
        }
    }
}

impl<T, S> Transport for Intercepting<'_, T, S>
where
    T: Transport,
    S: RecordStore,
{
    type Error = T::Error;

    fn send(&mut self, request: &HttpRequest) -> Result<HttpResponse, Self::Error> {
        let response = self.inner.send(request)?;
        self.session.observe(request, &response, self.round);
        Ok(response)
    }
}
