//! 终端视图 - 业务能力层
//!
//! 把条目的输出渲染成一个独立的 HTML 页面：
//! 普通程序显示为深色终端窗口，标记语言显示为浅色浏览器窗口。
//! 截图时只截取 [`SNAPSHOT_SELECTOR`] 对应的元素。

use crate::models::Item;

/// 截图目标元素
pub const SNAPSHOT_SELECTOR: &str = "#snapshot-root";

/// 待截图的视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalView {
    /// 窗口标题（文件名）
    pub title: String,
    pub language: String,
    pub output: String,
    pub is_markup: bool,
}

impl TerminalView {
    pub fn from_item(item: &Item) -> Self {
        Self {
            title: item.name.clone(),
            language: item.language.clone(),
            output: item.output.clone().unwrap_or_default(),
            is_markup: item.is_markup(),
        }
    }

    /// 生成完整的 HTML 文档
    pub fn render_html(&self) -> String {
        let (frame_class, caption) = if self.is_markup {
            ("browser", format!("file:///{}", self.title))
        } else {
            ("terminal", format!("{} — {}", self.language, self.title))
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
  body {{ margin: 0; padding: 24px; background: #e5e7eb; }}
  #snapshot-root {{ display: inline-block; min-width: 640px; max-width: 1100px;
    border-radius: 8px; overflow: hidden; box-shadow: 0 6px 24px rgba(0,0,0,.35); }}
  .bar {{ display: flex; align-items: center; gap: 8px; padding: 8px 12px;
    font: 13px -apple-system, "Segoe UI", sans-serif; }}
  .dot {{ width: 12px; height: 12px; border-radius: 50%; }}
  .caption {{ margin-left: 8px; }}
  pre {{ margin: 0; padding: 16px; white-space: pre-wrap; word-break: break-word;
    font: 14px/1.45 Consolas, "Cascadia Mono", Menlo, monospace; }}
  .terminal .bar {{ background: #2d2d2d; color: #cccccc; }}
  .terminal pre {{ background: #0c0c0c; color: #e6e6e6; }}
  .browser .bar {{ background: #f1f3f4; color: #3c4043; border-bottom: 1px solid #dadce0; }}
  .browser .caption {{ flex: 1; background: #fff; border-radius: 12px; padding: 3px 12px; }}
  .browser pre {{ background: #ffffff; color: #202124; font-family: Georgia, serif; }}
</style>
</head>
<body>
<div id="snapshot-root" class="{frame_class}">
  <div class="bar">
    <span class="dot" style="background:#ff5f56"></span>
    <span class="dot" style="background:#ffbd2e"></span>
    <span class="dot" style="background:#27c93f"></span>
    <span class="caption">{caption}</span>
  </div>
  <pre>{output}</pre>
</div>
</body>
</html>"#,
            frame_class = frame_class,
            caption = escape_html(&caption),
            output = escape_html(&self.output),
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(name: &str, output: &str) -> TerminalView {
        let mut item = Item::new(name);
        item.output = Some(output.to_string());
        TerminalView::from_item(&item)
    }

    #[test]
    fn test_terminal_frame_for_programs() {
        let html = view("main.py", "0\n1\n4").render_html();
        assert!(html.contains(r#"class="terminal""#));
        assert!(html.contains("py — main.py"));
        assert!(html.contains("<pre>0\n1\n4</pre>"));
    }

    #[test]
    fn test_browser_frame_for_markup() {
        let html = view("index.html", "Hello").render_html();
        assert!(html.contains(r#"class="browser""#));
        assert!(html.contains("file:///index.html"));
    }

    #[test]
    fn test_output_is_escaped() {
        let html = view("a.c", "<script>alert('x') & \"y\"</script>").render_html();
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;) &amp; &quot;y&quot;&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
