use crate::domain::HealthProbe;
use anyhow::{Context, Result};
use tokio::net::TcpStream;

/// Probe that considers a dependency up if a TCP connection can be opened.
///
/// The connection is dropped immediately; no protocol handshake is attempted.
pub struct TcpProbe {
    name: String,
    addr: String,
    required: bool,
}

impl TcpProbe {
    pub fn new(name: impl Into<String>, addr: impl Into<String>, required: bool) -> Self {
        TcpProbe {
            name: name.into(),
            addr: addr.into(),
            required,
        }
    }
}

#[async_trait::async_trait]
impl HealthProbe for TcpProbe {
    // ---
    fn name(&self) -> &str {
        &self.name
    }

    fn required(&self) -> bool {
        self.required
    }

    async fn check(&self) -> Result<()> {
        TcpStream::connect(&self.addr)
            .await
            .with_context(|| format!("connect to {} ({})", self.name, self.addr))?;
        Ok(())
    }
}
