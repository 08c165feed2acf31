//! Response body.
//!
//! Three shapes cover every endpoint: nothing, one buffer, or one buffer
//! written several times. The repeated shape is what the download endpoint
//! uses: the random chunk is generated once and each frame is a cheap
//! [`Bytes`] clone (a refcount bump, no copy).
//!
//! Every shape reports an exact [`SizeHint`], so hyper writes a
//! `Content-Length` header instead of falling back to chunked encoding.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use hyper::body::{Frame, SizeHint};

/// The body type carried by every [`Response`](crate::Response).
#[derive(Debug)]
pub struct Body {
    kind: Kind,
}

#[derive(Debug)]
enum Kind {
    Empty,
    Full(Option<Bytes>),
    Repeat { chunk: Bytes, remaining: usize },
}

impl Body {
    pub fn empty() -> Self {
        Self { kind: Kind::Empty }
    }

    pub fn full(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        if data.is_empty() {
            return Self::empty();
        }
        Self { kind: Kind::Full(Some(data)) }
    }

    /// A body that yields `chunk` exactly `count` times.
    pub fn repeat(chunk: Bytes, count: usize) -> Self {
        if chunk.is_empty() || count == 0 {
            return Self::empty();
        }
        Self { kind: Kind::Repeat { chunk, remaining: count } }
    }

    /// Bytes still to be produced.
    pub fn remaining(&self) -> u64 {
        match &self.kind {
            Kind::Empty => 0,
            Kind::Full(data) => data.as_ref().map_or(0, |d| d.len() as u64),
            Kind::Repeat { chunk, remaining } => chunk.len() as u64 * *remaining as u64,
        }
    }
}

impl Default for Body {
    fn default() -> Self { Self::empty() }
}

impl hyper::body::Body for Body {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        // Every variant is `Unpin`, so the pin can be dropped.
        let this = self.get_mut();
        let frame = match &mut this.kind {
            Kind::Empty => None,
            Kind::Full(data) => data.take().map(Frame::data),
            Kind::Repeat { remaining: 0, .. } => None,
            Kind::Repeat { chunk, remaining } => {
                *remaining -= 1;
                Some(Frame::data(chunk.clone()))
            }
        };
        Poll::Ready(frame.map(Ok))
    }

    fn is_end_stream(&self) -> bool {
        self.remaining() == 0
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.remaining())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::body::Body as _;

    #[tokio::test]
    async fn repeat_yields_the_same_chunk_count_times() {
        let chunk = Bytes::from_static(b"abcd");
        let mut body = Body::repeat(chunk.clone(), 3);
        assert_eq!(body.size_hint().exact(), Some(12));

        let mut frames = 0;
        while let Some(frame) = body.frame().await {
            let data = frame.unwrap().into_data().unwrap();
            assert_eq!(data, chunk);
            frames += 1;
        }
        assert_eq!(frames, 3);
        assert!(body.is_end_stream());
    }

    #[tokio::test]
    async fn full_body_collects_to_its_bytes() {
        let body = Body::full("hello");
        assert_eq!(body.size_hint().exact(), Some(5));
        let bytes = body.collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"hello");
    }

    #[test]
    fn degenerate_inputs_are_empty() {
        assert!(Body::full(Vec::new()).is_end_stream());
        assert!(Body::repeat(Bytes::new(), 4).is_end_stream());
        assert!(Body::repeat(Bytes::from_static(b"x"), 0).is_end_stream());
        assert_eq!(Body::default().size_hint().exact(), Some(0));
    }
}
