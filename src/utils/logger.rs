/// 日志初始化
/// 统一格式: [时间] [级别] [模块] 消息
use std::io::Write;

/// 日志级别优先级: 命令行 > 配置文件 > RUST_LOG > info
pub fn resolve_log_level(cli_level: Option<&str>, config_level: Option<&str>) -> String {
    cli_level
        .or(config_level)
        .map(|s| s.to_string())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "info".to_string())
}

/// 初始化 env_logger，重复初始化时返回错误而不是 panic
pub fn init_logger(log_level: &str) -> Result<(), log::SetLoggerError> {
    let env = env_logger::Env::default().default_filter_or(log_level.to_lowercase());

    env_logger::Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
}
