use std::path::Path;

use anyhow::{Context, Result};
use mcap_stream::ReaderTransport;
use tokio::io::AsyncRead;
use tracing::debug;

pub type InputReader = Box<dyn AsyncRead + Unpin + Send>;

/// Open `path` as a transport. `-` reads stdin.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub async fn open(path: &Path, chunk_size: usize) -> Result<ReaderTransport<InputReader>> {
    let reader: InputReader = if path == Path::new("-") {
        debug!(chunk_size, "reading stdin");
        Box::new(tokio::io::stdin())
    } else {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("cannot open {}", path.display()))?;
        debug!(path = %path.display(), chunk_size, "reading file");
        Box::new(file)
    };
    Ok(ReaderTransport::new(reader, chunk_size))
}
