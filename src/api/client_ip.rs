use axum::http::HeaderMap;
use ipnetwork::IpNetwork;
use std::net::IpAddr;

/// Resolves the real client address. `X-Forwarded-For` is honored only when
/// the peer itself is a trusted proxy; the chain is walked right to left and
/// the first address outside our own infrastructure wins.
#[must_use]
pub fn resolve(headers: &HeaderMap, peer_addr: IpAddr, trusted_proxies: &[IpNetwork]) -> IpAddr {
    let is_trusted = |ip: &IpAddr| trusted_proxies.iter().any(|net| net.contains(*ip));

    if !is_trusted(&peer_addr) {
        return peer_addr;
    }

    let xff = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok());

    if let Some(xff_val) = xff
        && let Some(real_ip) =
            xff_val.rsplit(',').filter_map(|s| s.trim().parse::<IpAddr>().ok()).find(|ip| !is_trusted(ip))
    {
        return real_ip;
    }

    peer_addr
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn proxies() -> Vec<IpNetwork> {
        vec!["10.0.0.0/8".parse().expect("valid cidr"), "127.0.0.1/32".parse().expect("valid cidr")]
    }

    #[test]
    fn ignores_forwarded_header_from_untrusted_peers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "198.51.100.4".parse().expect("header"));
        let peer = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));

        assert_eq!(resolve(&headers, peer, &proxies()), peer);
    }

    #[test]
    fn walks_the_chain_past_trusted_hops() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "198.51.100.4, 10.0.0.2".parse().expect("header"));
        let peer = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));

        assert_eq!(resolve(&headers, peer, &proxies()), IpAddr::V4(Ipv4Addr::new(198, 51, 100, 4)));
    }

    #[test]
    fn falls_back_to_peer_without_a_header() {
        let peer = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
        assert_eq!(resolve(&HeaderMap::new(), peer, &proxies()), peer);
    }
}
