//! 命名引擎 - 业务能力层
//!
//! 根据命名模板生成文件夹名和截图名。纯函数，不做文件系统安全处理：
//! 模板里含有 `/` 等字符时，生成的名字同样会包含这些字符。

use std::sync::LazyLock;

use regex::Regex;

use crate::models::NamingConfig;

/// `[index]` 以及紧随其后的一个可选分隔符
static INDEX_WITH_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[index\][_\- ]?").expect("静态正则表达式无效"));

/// 按模板生成名字
///
/// 占位符按以下顺序全局替换：
/// 1. `[name]` - 去掉最后一个扩展名的文件名（没有 `.` 时为整个文件名）
/// 2. `[ext]`  - 最后一个 `.` 之后的部分（没有时为空）
/// 3. `[full]` - 原始文件名
/// 4. `[index]` - 启用编号时为 `start_index + index`，
///    否则连同其后的一个 `_`、`-` 或空格一起删除
///
/// 其他方括号内容原样保留。
///
/// # 示例
/// ```
/// # use snapshot_submit::models::NamingConfig;
/// # use snapshot_submit::services::naming::format_name;
/// let config = NamingConfig::default();
/// assert_eq!(format_name("[index]_[name]", "a.py", 0, &config), "1_a");
/// ```
pub fn format_name(pattern: &str, file_name: &str, index: usize, config: &NamingConfig) -> String {
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) => (stem, ext),
        None => (file_name, ""),
    };

    let named = pattern
        .replace("[name]", stem)
        .replace("[ext]", ext)
        .replace("[full]", file_name);

    if config.numbering_enabled {
        let number = config.start_index + index as i64;
        named.replace("[index]", &number.to_string())
    } else {
        INDEX_WITH_SEPARATOR.replace_all(&named, "").into_owned()
    }
}
