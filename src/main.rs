use anyhow::{anyhow, Context, Result};
use astercta::{
    core::{
        config::{load_yaml, ExchangeConfig},
        exchange::Exchange,
    },
    exchanges::AsterExchange,
    strategies::common::{run_to_completion, ShutdownSignal},
    strategies::*,
    utils::{init_logger, resolve_log_level},
};
use clap::{Arg, Command};
use std::sync::Arc;

/// 从环境变量读取密钥并创建交易所客户端
fn build_exchange(config: ExchangeConfig) -> Result<Arc<dyn Exchange>> {
    let exchange = AsterExchange::from_env(config).context("创建交易所客户端失败")?;
    Ok(Arc::new(exchange))
}

fn parse_config<T: serde::de::DeserializeOwned>(raw: serde_yaml::Value) -> Result<T> {
    serde_yaml::from_value(raw).context("策略配置格式错误")
}

#[tokio::main]
async fn main() -> Result<()> {
    // 加载环境变量
    dotenv::dotenv().ok();

    // 解析命令行参数
    let matches = Command::new("AsterCTA")
        .version(env!("CARGO_PKG_VERSION"))
        .about("AsterDEX 期货自动化交易工具")
        .arg(
            Arg::new("strategy")
                .short('s')
                .long("strategy")
                .value_name("STRATEGY")
                .help("策略类型: log_grid, bid_cancel, volume")
                .value_parser(["log_grid", "bid_cancel", "volume"])
                .required(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径")
                .required(true),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别，覆盖配置文件中的 strategy.log_level"),
        )
        .get_matches();

    let strategy_type = matches
        .get_one::<String>("strategy")
        .ok_or_else(|| anyhow!("缺少策略类型"))?;
    let config_file = matches
        .get_one::<String>("config")
        .ok_or_else(|| anyhow!("缺少配置文件路径"))?;

    // 读取策略配置文件获取日志级别
    let raw_config: serde_yaml::Value = load_yaml(config_file)?;
    let config_level = raw_config
        .get("strategy")
        .and_then(|s| s.get("log_level"))
        .and_then(|l| l.as_str());
    let log_level = resolve_log_level(
        matches.get_one::<String>("log-level").map(String::as_str),
        config_level,
    );
    init_logger(&log_level)?;

    log::info!(
        "启动策略: {} with config: {}, 日志级别: {}",
        strategy_type,
        config_file,
        log_level
    );

    let shutdown = ShutdownSignal::new();
    shutdown.listen_ctrl_c();

    // 根据策略类型启动
    match strategy_type.as_str() {
        "log_grid" => {
            let config: LogGridConfig = parse_config(raw_config)?;
            let exchange = build_exchange(config.exchange_config())?;
            let strategy = LogGridStrategy::new(config, exchange)?;
            log::info!("对数网格策略已创建，开始运行...");

            run_to_completion(&strategy, shutdown).await?;
        }
        "bid_cancel" => {
            let config: BidCancelConfig = parse_config(raw_config)?;
            let exchange = build_exchange(config.exchange_config())?;
            let strategy = BidCancelStrategy::new(config, exchange)?;
            log::info!("盘口挂撤单策略已创建，开始运行...");

            run_to_completion(&strategy, shutdown).await?;
        }
        "volume" => {
            let config: VolumeConfig = parse_config(raw_config)?;
            let exchange = build_exchange(config.exchange_config())?;
            let strategy = VolumeStrategy::new(config, exchange)?;
            log::info!("市价买卖循环策略已创建，开始运行...");

            run_to_completion(&strategy, shutdown).await?;
        }
        other => {
            log::error!("未知策略类型: {}", other);
            return Err(anyhow!("未知策略类型: {}", other));
        }
    }

    Ok(())
}
