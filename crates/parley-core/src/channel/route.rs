/// Route prefix of the chat screen; the trailing segment is the channel id.
pub const CHAT_ROUTE_PREFIX: &str = "/chat/";

/// Route prefix of the call screen; shares the chat screen's channel id.
pub const CALL_ROUTE_PREFIX: &str = "/call/";

/// Extract the channel id following `prefix` in a route path.
///
/// The remainder is used verbatim apart from a trailing slash. Returns `None`
/// when the prefix is absent or nothing follows it.
pub fn channel_id_from_route<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let (_, rest) = path.split_once(prefix)?;
    let id = rest.trim_end_matches('/');

    if id.is_empty() { None } else { Some(id) }
}
