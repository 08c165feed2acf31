//! Download generator.
//!
//! The client downloads `ckSize` MiB of random bytes [`CHUNK_COUNT`] times
//! and divides by the elapsed time. Only the size and the timing matter, so
//! the buffer is filled once with a fast non-cryptographic generator and the
//! same [`Bytes`] is written for every chunk.
//!
//! `ckSize` is client input. Anything above the configured [`ChunkLimit`] is
//! refused with `400 Bad Request` before a single byte is allocated.

use std::collections::TryReserveError;

use bytes::Bytes;
use http::header::{CONTENT_DISPOSITION, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, error, warn};

use crate::request::Request;
use crate::response::{ContentType, Response};

/// One mebibyte, the unit of `ckSize`.
pub const MIB: u64 = 1_048_576;
/// Chunk size used when `ckSize` is absent or unusable.
pub const DEFAULT_CHUNK_MB: u64 = 1;
/// Writes per response. Fixed server-side; the client cannot change it.
pub const CHUNK_COUNT: usize = 4;
/// Query parameter carrying the chunk size in MiB.
pub const CHUNK_SIZE_PARAM: &str = "ckSize";

const FILL_BLOCK: usize = 16 * 1024;

const CONTENT_DESCRIPTION: HeaderName = HeaderName::from_static("content-description");
const CONTENT_TRANSFER_ENCODING: HeaderName = HeaderName::from_static("content-transfer-encoding");

/// Upper bound on the chunk size a client may request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChunkLimit {
    max_mb: u64,
}

impl ChunkLimit {
    /// 1 GiB per chunk, 4 GiB per response. The stock client asks for 100.
    pub const DEFAULT_MAX_MB: u64 = 1024;

    pub const fn new(max_mb: u64) -> Self {
        Self { max_mb }
    }

    pub const fn max_mb(self) -> u64 {
        self.max_mb
    }

    /// Byte length of a `chunk_mb` chunk, or `None` if it exceeds the limit,
    /// does not fit in memory addressing on this platform, or the whole
    /// response (`CHUNK_COUNT` chunks) would overflow a `u64`.
    ///
    /// This is the guard that keeps client input from exhausting memory.
    pub fn chunk_bytes(self, chunk_mb: u64) -> Option<usize> {
        if chunk_mb > self.max_mb {
            return None;
        }
        let bytes = chunk_mb.checked_mul(MIB)?;
        bytes.checked_mul(CHUNK_COUNT as u64)?;
        usize::try_from(bytes).ok()
    }
}

impl Default for ChunkLimit {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_MB)
    }
}

/// Resolves the raw `ckSize` value to a chunk size in MiB.
///
/// Positive integers are taken as-is. Missing, zero, negative or
/// non-numeric values fall back to [`DEFAULT_CHUNK_MB`] so a sloppy client
/// still gets a measurement.
pub fn requested_chunk_mb(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.parse::<u64>().ok())
        .filter(|&mb| mb > 0)
        .unwrap_or(DEFAULT_CHUNK_MB)
}

/// Allocates `len` bytes and fills them with pseudorandom content.
///
/// `try_reserve_exact` only catches sizes the allocator refuses outright
/// (capacity overflow, address-space exhaustion). With memory overcommit a
/// large reservation succeeds and the cost lands when pages are written, so
/// [`ChunkLimit`] is what bounds memory use.
///
/// The buffer is written once: random bytes go through a small stack block
/// straight into the reserved capacity.
pub fn random_chunk(len: usize) -> Result<Bytes, TryReserveError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)?;

    let mut rng = SmallRng::from_entropy();
    let mut block = [0u8; FILL_BLOCK];
    while buf.len() < len {
        let n = FILL_BLOCK.min(len - buf.len());
        rng.fill_bytes(&mut block[..n]);
        buf.extend_from_slice(&block[..n]);
    }
    Ok(Bytes::from(buf))
}

/// Handler for the download endpoint.
pub async fn download(req: Request, limit: ChunkLimit) -> Response {
    let res = Response::builder().cors();

    if req.method() == Method::OPTIONS {
        return res.no_body();
    }

    let chunk_mb = requested_chunk_mb(req.query(CHUNK_SIZE_PARAM).as_deref());
    let Some(len) = limit.chunk_bytes(chunk_mb) else {
        warn!(chunk_mb, max_mb = limit.max_mb(), "refusing oversized download");
        return res.status(StatusCode::BAD_REQUEST).no_body();
    };

    let res = res
        .header(CONTENT_DESCRIPTION, HeaderValue::from_static("File Transfer"))
        .header(CONTENT_DISPOSITION, HeaderValue::from_static("attachment; filename=random.dat"))
        .header(CONTENT_TRANSFER_ENCODING, HeaderValue::from_static("binary"));

    // HEAD gets the same headers and length without paying for the chunk.
    if req.method() == Method::HEAD {
        let total = len as u64 * CHUNK_COUNT as u64;
        return res.head_only(ContentType::OctetStream, total);
    }

    // Filling hundreds of MiB takes long enough to stall a worker thread.
    let chunk = match tokio::task::spawn_blocking(move || random_chunk(len)).await {
        Ok(Ok(chunk)) => chunk,
        Ok(Err(e)) => {
            warn!(len, "cannot allocate download chunk: {e}");
            return res.status(StatusCode::BAD_REQUEST).no_body();
        }
        Err(e) => {
            error!("chunk generation task failed: {e}");
            return res.status(StatusCode::INTERNAL_SERVER_ERROR).no_body();
        }
    };

    debug!(chunk_mb, chunks = CHUNK_COUNT, "streaming download");

    res.repeat(ContentType::OctetStream, chunk, CHUNK_COUNT)
}
