//! Test/bin-only logger initializer, kept out of the library's runtime
//! critical path. `env_logger` driven by `RUST_LOG`, one line per record
//! with level/target/file/line.

#[cfg(test)]
pub fn init_log() {
    use env_logger::Builder;
    use std::io::Write;
    use std::sync::Once;

    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let mut builder = Builder::from_default_env();
        builder
            .format_timestamp_secs()
            .is_test(true)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{} - {}] [{}:{}] {}",
                    record.level(),
                    record.target(),
                    record.file().unwrap_or("?"),
                    record.line().unwrap_or(0),
                    record.args()
                )
            })
            .init();
    });
}
