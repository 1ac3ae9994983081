//! Rate limiting middleware using token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

const AUTH_PER_SECOND: u64 = 1;
const AUTH_BURST: u32 = 10;

/// Creates a rate limiter for credential submissions (login and sign-up).
///
/// # Limits
///
/// - **Rate**: 1 request per second
/// - **Burst**: 10 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Key Extraction
///
/// Rate limits are applied per client IP address extracted from the
/// socket peer address, so the server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>`.
pub fn auth_layer()
-> GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(AUTH_PER_SECOND)
            .burst_size(AUTH_BURST)
            .finish()
            .expect("non-zero rate limit constants"),
    );

    GovernorLayer::new(governor_conf)
}
