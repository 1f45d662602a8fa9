//! Gateway endpoints.

/// Processing endpoint of the live server. The query string is appended as is.
pub const SERVER_LIVE: &str = "https://process.safecharge.com/service.asmx/Process?";

/// Processing endpoint of the test server.
pub const SERVER_TEST: &str = "https://test.safecharge.com/service.asmx/Process?";

/// Returns the live or test endpoint.
#[must_use]
pub const fn server_url(live: bool) -> &'static str {
    if live { SERVER_LIVE } else { SERVER_TEST }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_selection() {
        assert_eq!(server_url(true), SERVER_LIVE);
        assert_eq!(server_url(false), SERVER_TEST);
        assert!(SERVER_LIVE.ends_with('?'));
        assert!(SERVER_TEST.ends_with('?'));
    }
}
