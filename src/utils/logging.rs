use anyhow::Result;
/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use std::fs;
use tracing::info;

use crate::models::BatchStats;

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n批量截图处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(model_name: &str, headless: bool) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 顺序批量处理模式");
    info!("🤖 模型: {}", model_name);
    info!(
        "🌐 浏览器: {}",
        if headless { "无头模式" } else { "连接已有浏览器" }
    );
    info!("{}", "=".repeat(60));
}

/// 记录条目加载信息
pub fn log_items_loaded(total: usize) {
    info!("✓ 找到 {} 个待处理的文件", total);
    info!("📋 将逐个处理，每个条目之间保持间隔\n");
}

/// 记录批次开始信息
///
/// # 参数
/// - `pending`: 本次需要处理的条目数
/// - `total`: 条目总数
pub fn log_batch_start(pending: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始批量处理: 待处理 {} / 共 {} 个", pending, total);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &BatchStats, archive_path: &str, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}", stats.completed);
    info!("❌ 失败: {}", stats.failed);
    info!("⏭️ 跳过: {}", stats.skipped);
    info!("{}", "=".repeat(60));
    info!("\n压缩包已保存至: {}", archive_path);
    info!("日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
