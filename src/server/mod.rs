// Server module - Pingora HTTP server setup

use pingora::server::configuration::Opt as ServerOpt;
use pingora_core::server::Server;

use crate::config::Config;
use crate::proxy::ClearmarkProxy;

/// Process-level switches passed through to Pingora
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunMode {
    /// Detach from the terminal
    pub daemon: bool,
    /// Validate configuration and exit
    pub test: bool,
}

impl RunMode {
    /// Pingora server options for this run mode
    pub fn server_opt(&self) -> ServerOpt {
        ServerOpt {
            daemon: self.daemon,
            test: self.test,
            upgrade: false,
            ..Default::default()
        }
    }
}

/// Build the Pingora server with the proxy service registered on the
/// configured listen address. The caller decides whether to run it.
pub fn build_server(config: &Config, mode: RunMode) -> anyhow::Result<Server> {
    let mut server = Server::new(Some(mode.server_opt()))?;
    server.bootstrap();

    let proxy = ClearmarkProxy::new(config)?;
    let mut proxy_service = pingora_proxy::http_proxy_service(&server.configuration, proxy);
    proxy_service.threads = Some(config.server.threads);

    let listen_addr = config.server.listen_addr();
    proxy_service.add_tcp(&listen_addr);

    tracing::info!(
        address = %listen_addr,
        threads = config.server.threads,
        max_upload_bytes = config.server.max_upload_bytes,
        "Proxy service configured"
    );

    server.add_service(proxy_service);
    Ok(server)
}
