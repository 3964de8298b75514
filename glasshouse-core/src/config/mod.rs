mod loader;
mod root;
mod telemetry;
mod timeout;
mod tls;

pub use loader::load_from_path;
pub use root::{AnalyticsConfig, Config};
pub use telemetry::{LoggingConfig, TelemetryConfig};
pub use timeout::{KeepAliveConfig, TimeoutConfig};
pub use tls::{ClientAuth, SessionResumptionConfig, TlsConfig, TlsOptions, TlsVersion};
