use std::io::Write;

use anstyle::{AnsiColor, Color, RgbColor, Style};

/// 以默认的 `Info` 级别初始化日志
pub fn init_log() {
    init_log_with_level(log::LevelFilter::Info);
}

/// 初始化全局 logger
///
/// 输出格式：`[时间] 级别 [文件:行号] 内容`，warn / error 使用醒目的颜色。
/// 重复调用时保留第一次的设置，不会 panic。
pub fn init_log_with_level(level: log::LevelFilter) {
    if builder(level).try_init().is_err() {
        log::debug!("logger already initialized, keep the existing one");
    }
}

fn level_color(level: log::Level) -> Option<Color> {
    match level {
        log::Level::Error => Some(Color::Ansi(AnsiColor::Red)),
        log::Level::Warn => Some(Color::Ansi(AnsiColor::Yellow)),
        log::Level::Info => Some(Color::Ansi(AnsiColor::Green)),
        log::Level::Debug | log::Level::Trace => None,
    }
}

fn builder(level: log::LevelFilter) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .format(|buf, record| {
            let level = record.level();
            let level_style = match level_color(level) {
                Some(color) => buf.default_level_style(level).fg_color(Some(color)),
                None => buf.default_level_style(level),
            };
            let location_style = Style::new().fg_color(Some(Color::Rgb(RgbColor(110, 110, 110))));

            // 只保留文件名，兼容 Windows 路径
            let file = record.file().unwrap_or("").rsplit(['/', '\\']).next().unwrap_or("");
            let line = record.line().unwrap_or(0);
            let time = chrono::Local::now().format("%H:%M:%S");

            writeln!(
                buf,
                "{level_style}[{time}] {level:<5}{level_style:#} {location_style}[{file}:{line}]{location_style:#} {}",
                record.args()
            )
        })
        .filter_level(level);
    builder
}
