pub mod clipboard;
pub mod console;
pub mod metrics;

use config::Environment;

/// Install the global tracing subscriber.
///
/// Logs go to stderr so stdout stays free for command output. Production emits JSON lines.
pub fn init_tracing(environment: Environment) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match environment {
        Environment::Production => builder.json().init(),
        Environment::Development | Environment::Test => builder.init(),
    }
}
