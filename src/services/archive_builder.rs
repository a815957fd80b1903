//! 打包服务 - 业务能力层
//!
//! 把整批条目打成一个内存中的 zip：每个条目一个文件夹，
//! 里面放原始源文件，有截图时再放一张 `<截图名>.png`。
//!
//! 两个条目生成相同文件夹名时不做去重：文件夹会合并，
//! 同名文件以后面的条目为准。

use std::io::{Cursor, Write};

use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::ArchiveError;
use crate::models::{Item, NamingConfig};
use crate::services::naming::format_name;

/// 压缩包中的一个文件夹
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFolder {
    pub name: String,
    /// (文件名, 内容)，按写入顺序排列
    pub files: Vec<(String, Vec<u8>)>,
}

impl ArchiveFolder {
    fn put(&mut self, file_name: String, bytes: Vec<u8>) {
        match self.files.iter_mut().find(|(name, _)| *name == file_name) {
            Some(slot) => {
                warn!("⚠️ 文件 {}/{} 被后面的条目覆盖", self.name, file_name);
                slot.1 = bytes;
            }
            None => self.files.push((file_name, bytes)),
        }
    }
}

/// 计算压缩包的目录结构
pub fn plan_layout(items: &[Item], naming: &NamingConfig) -> Vec<ArchiveFolder> {
    let mut folders: Vec<ArchiveFolder> = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let folder_name = non_empty(
            format_name(&naming.folder_pattern, &item.name, index, naming),
            item,
            "文件夹",
        );

        let position = match folders.iter().position(|f| f.name == folder_name) {
            Some(position) => {
                warn!("⚠️ 文件夹名重复: {}（条目 {} 将与前面的条目合并）", folder_name, item.name);
                position
            }
            None => {
                folders.push(ArchiveFolder {
                    name: folder_name,
                    files: Vec::new(),
                });
                folders.len() - 1
            }
        };
        let folder = &mut folders[position];

        if let Some(text) = item.content.text() {
            folder.put(item.name.clone(), text.as_bytes().to_vec());
        }

        if let Some(image) = &item.image {
            let shot_name = non_empty(
                format_name(&naming.screenshot_pattern, &item.name, index, naming),
                item,
                "截图",
            );
            folder.put(format!("{}.png", shot_name), image.clone());
        }
    }

    folders
}

/// 生成的名字为空时改用原文件名，避免出现 `/` 开头的条目
fn non_empty(generated: String, item: &Item, kind: &str) -> String {
    if !generated.trim().is_empty() {
        return generated;
    }
    warn!("⚠️ 生成的{}名为空（条目 {}），改用原文件名", kind, item.name);
    item.name.clone()
}

/// 生成 zip 数据
pub fn build_archive(items: &[Item], naming: &NamingConfig) -> Result<Vec<u8>, ArchiveError> {
    let folders = plan_layout(items, naming);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for folder in &folders {
        let dir_entry = format!("{}/", folder.name);
        writer
            .add_directory(dir_entry.as_str(), options)
            .map_err(|source| ArchiveError::EntryFailed {
                entry: dir_entry.clone(),
                source,
            })?;

        for (file_name, bytes) in &folder.files {
            let entry = format!("{}/{}", folder.name, file_name);
            writer
                .start_file(entry.as_str(), options)
                .map_err(|source| ArchiveError::EntryFailed {
                    entry: entry.clone(),
                    source,
                })?;
            writer
                .write_all(bytes)
                .map_err(|source| ArchiveError::WriteFailed {
                    entry: entry.clone(),
                    source,
                })?;
            debug!("已写入: {} ({} 字节)", entry, bytes.len());
        }
    }

    let archive = writer.finish().map_err(ArchiveError::FinishFailed)?.into_inner();
    info!("📦 压缩包生成完成: {} 个文件夹, {} 字节", folders.len(), archive.len());
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentState, ItemStatus};
    use std::collections::BTreeMap;
    use zip::ZipArchive;

    fn item(name: &str, content: Option<&str>, image: Option<&[u8]>) -> Item {
        let mut item = Item::new(name);
        if let Some(text) = content {
            item.content = ContentState::Ready(text.to_string());
        }
        item.output = Some("out".to_string());
        item.status = ItemStatus::Completed;
        item.image = image.map(|bytes| bytes.to_vec());
        item
    }

    /// 按顶层文件夹统计文件（不含目录条目）
    fn read_tree(bytes: Vec<u8>) -> BTreeMap<String, Vec<String>> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut tree: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for i in 0..archive.len() {
            let entry = archive.by_index(i).unwrap();
            let name = entry.name().to_string();
            let (folder, rest) = name.split_once('/').unwrap();
            let files = tree.entry(folder.to_string()).or_default();
            if !rest.is_empty() {
                files.push(rest.to_string());
            }
        }
        tree
    }

    #[test]
    fn test_two_items_one_with_image() {
        let items = vec![
            item("main.py", Some("print(1)"), Some(b"\x89PNG")),
            item("Hello.java", Some("class Hello {}"), None),
        ];
        let bytes = build_archive(&items, &NamingConfig::default()).unwrap();
        let tree = read_tree(bytes);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree["1_main"], vec!["main.py", "main_output.png"]);
        assert_eq!(tree["2_Hello"], vec!["Hello.java"]);
    }

    #[test]
    fn test_item_without_content_or_image_still_gets_folder() {
        let items = vec![item("empty.rs", None, None)];
        let tree = read_tree(build_archive(&items, &NamingConfig::default()).unwrap());
        assert_eq!(tree.len(), 1);
        assert!(tree["1_empty"].is_empty());
    }

    #[test]
    fn test_file_contents_are_preserved() {
        let items = vec![item("main.py", Some("print('é')"), Some(&[1, 2, 3]))];
        let bytes = build_archive(&items, &NamingConfig::default()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        let mut source = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("1_main/main.py").unwrap(), &mut source)
            .unwrap();
        assert_eq!(source, "print('é')");

        let mut image = Vec::new();
        std::io::Read::read_to_end(
            &mut archive.by_name("1_main/main_output.png").unwrap(),
            &mut image,
        )
        .unwrap();
        assert_eq!(image, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_generated_names_fall_back_to_file_name() {
        let naming = NamingConfig {
            folder_pattern: "[index]".to_string(),
            screenshot_pattern: "[index]".to_string(),
            numbering_enabled: false,
            ..NamingConfig::default()
        };
        let items = vec![item("main.py", Some("print(1)"), Some(&[1]))];

        let bytes = build_archive(&items, &naming).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["main.py/", "main.py/main.py", "main.py/main.py.png"]);
    }

    #[test]
    fn test_colliding_folders_are_merged_and_later_wins() {
        let naming = NamingConfig {
            folder_pattern: "[ext]".to_string(),
            screenshot_pattern: "shot".to_string(),
            ..NamingConfig::default()
        };
        let items = vec![
            item("a.py", Some("a"), Some(&[1])),
            item("b.py", Some("b"), Some(&[2])),
        ];

        let layout = plan_layout(&items, &naming);
        assert_eq!(layout.len(), 1);
        let files: Vec<_> = layout[0].files.iter().map(|(n, b)| (n.as_str(), b.clone())).collect();
        assert_eq!(
            files,
            vec![("a.py", b"a".to_vec()), ("shot.png", vec![2]), ("b.py", b"b".to_vec())]
        );

        let tree = read_tree(build_archive(&items, &naming).unwrap());
        assert_eq!(tree["py"].len(), 3);
    }
}
