//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use actix_web::cookie::Key;
use ideahub::inbound::http::session_config::SessionSettings;
use ideahub::inbound::http::state::HttpState;

/// Everything [`super::create_server`] needs beyond the health state.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
}

impl ServerConfig {
    /// Combine session settings, the listen address and the wired ports.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, http_state: HttpState) -> Self {
        let SessionSettings { key, cookie_secure } = session;
        Self {
            key,
            cookie_secure,
            bind_addr,
            http_state,
        }
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
