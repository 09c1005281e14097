/// Delivers the outcome document to the pre-signed `ResponseURL`.
/// Returns the HTTP status code of the response.
pub trait CallbackTransport {
    fn put_callback(&self, url: &str, body: &[u8]) -> Result<u16, String>;
}
