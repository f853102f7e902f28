//! # 文件收集器
//!
//! 根据输入路径和模式收集待处理的谱文件列表。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - glob 模式匹配（逗号分隔多模式）
//! - 递归目录搜索
//! - 结果按路径排序，保证输出顺序稳定
//!
//! ## 依赖关系
//! - 被 `commands/spectrum.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配文件名

use crate::error::{XpsError, Result};

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    /// 输入路径
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<Pattern>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器（默认匹配所有文件）
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: Vec::new(),
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns = pattern
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                Pattern::new(s)
                    .map_err(|e| XpsError::InvalidArgument(format!("bad pattern '{}': {}", s, e)))
            })
            .collect::<Result<_>>()?;
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件
    pub fn collect(&self) -> Vec<PathBuf> {
        if self.input.is_file() {
            return vec![self.input.clone()];
        }

        if !self.input.is_dir() {
            return vec![];
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|entry| self.matches_patterns(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        files
    }

    /// 检查文件名是否匹配任一模式
    fn matches_patterns(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return true;
        }

        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        self.patterns.iter().any(|p| p.matches(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, "BE,I\n1,1\n2,2\n").unwrap();
    }

    #[test]
    fn test_pattern_matching() {
        let c = FileCollector::new(PathBuf::from("."))
            .with_pattern("*.csv, *.txt")
            .unwrap();
        assert!(c.matches_patterns(Path::new("dir/sample_01.csv")));
        assert!(c.matches_patterns(Path::new("O1s.txt")));
        assert!(!c.matches_patterns(Path::new("notes.md")));

        let any = FileCollector::new(PathBuf::from("."));
        assert!(any.matches_patterns(Path::new("anything")));

        assert!(FileCollector::new(PathBuf::from(".")).with_pattern("[").is_err());
    }

    #[test]
    fn test_collect_directory() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.csv"));
        touch(&dir.path().join("a.csv"));
        touch(&dir.path().join("readme.md"));
        fs::create_dir(dir.path().join("nested")).unwrap();
        touch(&dir.path().join("nested").join("c.csv"));

        let flat = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("*.csv")
            .unwrap()
            .collect();
        let names: Vec<_> = flat
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);

        let deep = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("*.csv")
            .unwrap()
            .recursive(true)
            .collect();
        assert_eq!(deep.len(), 3);
    }

    #[test]
    fn test_collect_single_file_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("one.dat");
        touch(&file);

        let c = FileCollector::new(file.clone()).with_pattern("*.csv").unwrap();
        assert_eq!(c.collect(), vec![file]);

        assert!(FileCollector::new(dir.path().join("missing")).collect().is_empty());
    }
}
