/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::config::Config;
use crate::models::BatchSummary;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 投注单自动提交");
    info!("🎯 平台地址: {}", config.home_url);
    info!(
        "💰 默认注额: {} (上限提示: {})",
        config.default_unit_size, config.max_unit_size
    );
    info!(
        "🤖 自动下注: {}",
        if config.auto_place_bets { "开启" } else { "关闭（仅校验链接）" }
    );
    info!("{}", "=".repeat(60));
}

/// 打印批量处理统计
///
/// # 参数
/// - `summary`: 统计信息
/// - `results_path`: 结果文件路径（如已保存）
pub fn log_batch_summary(summary: &BatchSummary, results_path: Option<&str>) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("🔗 已处理链接: {}", summary.total_processed);
    info!("✅ 成功: {}", summary.successful_bets);
    info!("❔ 其中未确认: {}", summary.unconfirmed_bets);
    info!("❌ 失败: {}", summary.failed_bets);
    info!("📈 成功率: {:.1}%", summary.success_rate * 100.0);
    info!("{}", "=".repeat(60));
    if let Some(path) = results_path {
        info!("\n结果已保存至: {}", path);
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
