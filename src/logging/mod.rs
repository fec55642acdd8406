use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` refines the default
/// `logocreator=info`; `LOGOCREATOR_LOG_FORMAT=json` switches to JSON lines.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy()
        .add_directive(
            "logocreator=info"
                .parse()
                .expect("static directive is valid"),
        );

    let json = std::env::var("LOGOCREATOR_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
