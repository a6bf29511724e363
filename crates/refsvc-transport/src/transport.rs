use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use refsvc_protocol::{Method, RefRequest, RefResponse};

use crate::error::TransportResult;
use crate::options::CallOptions;

/// Finite, lazily produced response chunks of a server-streaming call.
///
/// An `Err` item ends the stream early; the client stops reading at the first
/// one.
pub type ResponseStream = BoxStream<'static, TransportResult<RefResponse>>;

/// Performs calls against the backend reference service.
///
/// `storage` is the backend address (the repository's storage name) and
/// `method` names the service method; both are passed alongside the request so
/// transports can route without inspecting the payload.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Call a method that answers with exactly one response.
    async fn unary(
        &self,
        storage: &str,
        method: Method,
        request: RefRequest,
        options: &CallOptions,
    ) -> TransportResult<RefResponse>;

    /// Call a method that answers with a stream of response chunks.
    async fn server_streaming(
        &self,
        storage: &str,
        method: Method,
        request: RefRequest,
        options: &CallOptions,
    ) -> TransportResult<ResponseStream>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn unary(
        &self,
        storage: &str,
        method: Method,
        request: RefRequest,
        options: &CallOptions,
    ) -> TransportResult<RefResponse> {
        (**self).unary(storage, method, request, options).await
    }

    async fn server_streaming(
        &self,
        storage: &str,
        method: Method,
        request: RefRequest,
        options: &CallOptions,
    ) -> TransportResult<ResponseStream> {
        (**self).server_streaming(storage, method, request, options).await
    }
}
