//! Access records: one per completed request.

use std::net::IpAddr;

use http::StatusCode;
use http::header::HeaderName;

use crate::field::Field;
use crate::logger::Logger;
use crate::middleware::correlation::CorrelationIds;
use crate::request::Request;

/// Client address set by cluster load balancers.
pub const CLUSTER_CLIENT_IP: HeaderName = HeaderName::from_static("x-cluster-client-ip");
/// Client address set by nginx and most reverse proxies.
pub const REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

impl Logger {
    /// Emits the access record for `req`, answered with `status`.
    ///
    /// ```text
    /// {"level":"INFO", …, "message":"404 ->GET /missing", "type":"access", "event":"request",
    ///  "remote_ip":"10.0.0.7", "host":"api.test", "url_path":"/missing", "method":"GET",
    ///  "status_code":404, "correlation_id":"…", "user_correlation_id":"…"}
    /// ```
    pub fn log_request(&self, req: &Request, status: StatusCode) {
        let ids = CorrelationIds::from_request(req);
        let message = format!("{} ->{} {}", status.as_u16(), req.method(), req.request_uri());

        self.info(&message, &[
            Field::string("type", "access"),
            Field::string("event", "request"),
            Field::string("remote_ip", remote_ip(req)),
            Field::string("host", req.host()),
            Field::string("url_path", req.request_uri()),
            Field::string("method", req.method().as_str()),
            Field::uint("status_code", status.as_u16().into()),
            Field::string("correlation_id", ids.correlation_id),
            Field::string("user_correlation_id", ids.user_correlation_id),
        ]);
    }
}

/// Best guess at the client's address.
///
/// Proxy headers win over the socket peer: `X-Cluster-Client-Ip`, then
/// `X-Real-Ip`, then the host part of the peer address.
pub fn remote_ip(req: &Request) -> &str {
    [CLUSTER_CLIENT_IP, REAL_IP]
        .iter()
        .find_map(|name| req.header(name.as_str()).filter(|v| !v.is_empty()))
        .unwrap_or_else(|| peer_host(req.remote_addr()))
}

fn peer_host(addr: &str) -> &str {
    if addr.parse::<IpAddr>().is_ok() {
        return addr;
    }
    let unbracketed = addr.trim_start_matches('[').trim_end_matches(']');
    if unbracketed.parse::<IpAddr>().is_ok() {
        return unbracketed;
    }
    match addr.rsplit_once(':') {
        Some((host, _port)) => host.trim_start_matches('[').trim_end_matches(']'),
        None => addr,
    }
}

#[cfg(test)]
mod tests {
    use http::header::{HOST, HeaderValue};
    use http::Method;
    use serde_json::json;

    use super::*;
    use crate::level::Level;
    use crate::middleware::correlation::{CORRELATION_ID, USER_CORRELATION_ID};
    use crate::sink::MemorySink;

    fn get(uri: &str) -> Request {
        Request::new(Method::GET, uri.parse().unwrap())
    }

    #[test]
    fn cluster_header_wins() {
        let req = get("http://testurl.com")
            .with_header(CLUSTER_CLIENT_IP, HeaderValue::from_static("1.2.3.4"))
            .with_header(REAL_IP, HeaderValue::from_static("5.6.7.8"))
            .with_remote_addr("9.9.9.9:1234");
        assert_eq!(remote_ip(&req), "1.2.3.4");
    }

    #[test]
    fn real_ip_is_second() {
        let req = get("http://testurl.com")
            .with_header(REAL_IP, HeaderValue::from_static("1.2.3.4"))
            .with_remote_addr("9.9.9.9:1234");
        assert_eq!(remote_ip(&req), "1.2.3.4");
    }

    #[test]
    fn empty_headers_fall_through_to_the_peer() {
        let req = get("http://testurl.com")
            .with_header(CLUSTER_CLIENT_IP, HeaderValue::from_static(""))
            .with_remote_addr("1.2.3.4:8080");
        assert_eq!(remote_ip(&req), "1.2.3.4");
    }

    #[test]
    fn peer_address_forms() {
        assert_eq!(peer_host("1.2.3.4:8080"), "1.2.3.4");
        assert_eq!(peer_host("127.0.0.1"), "127.0.0.1");
        assert_eq!(peer_host("[::1]:8080"), "::1");
        assert_eq!(peer_host("::1"), "::1");
        assert_eq!(peer_host("[::1]"), "::1");
        assert_eq!(peer_host("[fe80::1]:443"), "fe80::1");
        assert_eq!(peer_host(""), "");
    }

    #[test]
    fn access_record_schema() {
        let memory = MemorySink::new();
        let logger = Logger::with_writer(Level::Info, memory.clone());

        let req = get("http://testurl.com/test/path?x=1")
            .with_header(HOST, HeaderValue::from_static("testurl.com"))
            .with_remote_addr("127.0.0.1");
        logger.log_request(&req, StatusCode::OK);

        let record = &memory.records()[0];
        assert_eq!(record["message"], json!("200 ->GET /test/path?x=1"));
        assert_eq!(record["level"], json!("INFO"));
        assert_eq!(record["type"], json!("access"));
        assert_eq!(record["event"], json!("request"));
        assert_eq!(record["remote_ip"], json!("127.0.0.1"));
        assert_eq!(record["host"], json!("testurl.com"));
        assert_eq!(record["url_path"], json!("/test/path?x=1"));
        assert_eq!(record["method"], json!("GET"));
        assert_eq!(record["status_code"], json!(200));
        assert_eq!(record["correlation_id"], json!(""));
        assert_eq!(record["user_correlation_id"], json!(""));
    }

    #[test]
    fn access_record_carries_correlation_headers() {
        let memory = MemorySink::new();
        let logger = Logger::with_writer(Level::Info, memory.clone());

        let req = get("/orders")
            .with_header(CORRELATION_ID, HeaderValue::from_static("corr-1"))
            .with_header(USER_CORRELATION_ID, HeaderValue::from_static("user-1"));
        logger.log_request(&req, StatusCode::NOT_FOUND);

        let record = &memory.records()[0];
        assert_eq!(record["correlation_id"], json!("corr-1"));
        assert_eq!(record["user_correlation_id"], json!("user-1"));
    }

    #[test]
    fn access_records_respect_the_threshold() {
        let memory = MemorySink::new();
        let logger = Logger::with_writer(Level::Warn, memory.clone());
        logger.log_request(&get("/"), StatusCode::OK);
        assert!(memory.records().is_empty());
    }
}
