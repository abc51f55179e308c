use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

pub fn init_logger_exe() {
    let name = std::env::current_exe()
        .ok()
        .and_then(|path| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    init_logger(name);
}

pub fn init_logger(name: impl Into<String>) {
    let filters = std::env::var("RUST_LOG").ok();
    logger_builder(name, filters.as_deref()).init();
}

/// Default levels first, then the operator's directives, so `RUST_LOG` wins.
fn logger_builder(name: impl Into<String>, filters: Option<&str>) -> Builder {
    let crate_name = name.into().replace('-', "_");

    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .filter(Some(&crate_name), LevelFilter::Trace)
        .filter(Some("qalam"), LevelFilter::Info);
    if let Some(filters) = filters {
        builder.parse_filters(filters);
    }

    builder.format(move |f, rec| {
        let now = humantime::format_rfc3339_millis(std::time::SystemTime::now());
        let module = rec.module_path().unwrap_or("<unknown>");
        let line = rec.line().unwrap_or(u32::MIN);
        let level = rec.level();

        writeln!(
            f,
            "[{} {} {} {}:{}] {}",
            level,
            crate_name,
            now,
            module,
            line,
            rec.args()
        )
    });
    builder
}
