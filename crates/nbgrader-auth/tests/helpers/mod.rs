//! Shared test helpers for access-control integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use tracing::subscriber::DefaultGuard;

use nbgrader_auth::AccessAuthorizer;
use nbgrader_auth::hub::StaticEnv;
use nbgrader_auth::testing::MockTransport;
use nbgrader_core::config::AppConfig;
use nbgrader_core::config::access::AccessBackend;

/// Name the hub reports as the authenticated user.
pub const INSTRUCTOR: &str = "instructor";

/// Authorizer wired to an in-memory hub.
pub struct TestHub {
    /// The authorizer under test.
    pub authorizer: AccessAuthorizer,
    /// The fake hub behind it.
    pub transport: Arc<MockTransport>,
}

impl TestHub {
    /// Hub-backed authorizer with valid credentials.
    pub fn new(transport: MockTransport) -> Self {
        Self::with_env(transport, hub_env())
    }

    /// Hub-backed authorizer with an explicit environment.
    pub fn with_env(transport: MockTransport, env: StaticEnv) -> Self {
        let transport = Arc::new(transport);
        let mut config = AppConfig::default();
        config.auth.backend = AccessBackend::Hub;
        let authorizer = AccessAuthorizer::select(&config, Arc::new(env), transport.clone());
        Self {
            authorizer,
            transport,
        }
    }
}

/// Environment of a single-user server spawned by the hub.
pub fn hub_env() -> StaticEnv {
    StaticEnv::new()
        .with("JUPYTERHUB_API_TOKEN", "secret-token")
        .with("JUPYTERHUB_API_URL", "http://hub:8081/hub/api")
        .with("JUPYTERHUB_USER", INSTRUCTOR)
}

/// Captured log output for the current thread.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Everything logged so far.
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Routes this thread's logs into a buffer until the guard is dropped.
pub fn capture_logs() -> (LogBuffer, DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
