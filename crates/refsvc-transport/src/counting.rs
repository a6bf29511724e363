//! A transport wrapper that records every call before forwarding it.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use refsvc_protocol::{Method, RefRequest, RefResponse};

use crate::error::TransportResult;
use crate::options::CallOptions;
use crate::transport::{ResponseStream, Transport};

/// One call seen by a [`CountingTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCall {
    pub storage: String,
    pub method: Method,
    pub timeout: Option<Duration>,
}

/// Wraps a transport and keeps a log of the calls made through it.
#[derive(Debug)]
pub struct CountingTransport<T> {
    inner: T,
    calls: Mutex<Vec<RecordedCall>>,
}

impl<T> CountingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Every call so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|c| c.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    pub fn calls_to(&self, method: Method) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }

    fn record(&self, storage: &str, method: Method, options: &CallOptions) {
        let call = RecordedCall {
            storage: storage.to_string(),
            method,
            timeout: options.timeout,
        };
        match self.calls.lock() {
            Ok(mut calls) => calls.push(call),
            Err(e) => e.into_inner().push(call),
        }
    }
}

#[async_trait]
impl<T: Transport> Transport for CountingTransport<T> {
    async fn unary(
        &self,
        storage: &str,
        method: Method,
        request: RefRequest,
        options: &CallOptions,
    ) -> TransportResult<RefResponse> {
        self.record(storage, method, options);
        self.inner.unary(storage, method, request, options).await
    }

    async fn server_streaming(
        &self,
        storage: &str,
        method: Method,
        request: RefRequest,
        options: &CallOptions,
    ) -> TransportResult<ResponseStream> {
        self.record(storage, method, options);
        self.inner.server_streaming(storage, method, request, options).await
    }
}
