//! User agent sent with every request.

const USER_AGENT: &str = concat!(
    "gdelt-doc-api/",
    env!("CARGO_PKG_VERSION"),
    " (Rust client for the GDELT DOC 2.0 API)"
);

pub(crate) fn get_user_agent() -> &'static str {
    USER_AGENT
}
