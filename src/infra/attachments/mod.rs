// Attachment infra layer.
// - `http_fetcher.rs` downloads attachment bytes with a bounded timeout.

#[path = "http_fetcher.rs"]
pub mod http_fetcher;

pub use http_fetcher::AttachmentFetcher;
