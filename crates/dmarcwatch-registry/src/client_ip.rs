//! Client address resolution for vote requests behind proxies.

use std::net::IpAddr;

/// Identity used when no client address is known
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Headers consulted, highest precedence first
const FORWARDING_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "x-client-ip"];

/// Resolve the voting client's address.
///
/// Precedence: first `X-Forwarded-For` hop, then `X-Real-IP`, then
/// `X-Client-IP`, then the peer address. Header names match
/// case-insensitively and blank values are skipped.
pub fn resolve_client_ip<'a, I>(headers: I, peer: Option<IpAddr>) -> Option<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let headers: Vec<(&str, &str)> = headers.into_iter().collect();

    FORWARDING_HEADERS
        .iter()
        .find_map(|wanted| {
            headers
                .iter()
                .filter(|(name, _)| name.eq_ignore_ascii_case(wanted))
                .find_map(|(_, value)| first_hop(value))
        })
        .or_else(|| peer.map(|ip| ip.to_string()))
}

fn first_hop(value: &str) -> Option<String> {
    let hop = value.split(',').next()?.trim();
    (!hop.is_empty()).then(|| hop.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const PEER: Option<IpAddr> = Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)));

    #[test]
    fn test_forwarded_for_first_hop_wins() {
        let headers = [
            ("X-Real-IP", "198.51.100.2"),
            ("X-Forwarded-For", " 203.0.113.7 , 10.0.0.1"),
        ];
        assert_eq!(
            resolve_client_ip(headers, PEER).as_deref(),
            Some("203.0.113.7")
        );
    }

    #[test]
    fn test_precedence_falls_through() {
        let real = [("x-client-ip", "198.51.100.9"), ("X-REAL-IP", "198.51.100.2")];
        assert_eq!(resolve_client_ip(real, PEER).as_deref(), Some("198.51.100.2"));

        let client = [("X-Client-IP", "198.51.100.9")];
        assert_eq!(resolve_client_ip(client, PEER).as_deref(), Some("198.51.100.9"));
    }

    #[test]
    fn test_blank_headers_are_skipped() {
        let headers = [("X-Forwarded-For", "  "), ("X-Real-IP", "")];
        assert_eq!(resolve_client_ip(headers, PEER).as_deref(), Some("192.0.2.1"));
    }

    #[test]
    fn test_nothing_known() {
        assert_eq!(resolve_client_ip([("Accept", "*/*")], None), None);
    }
}
