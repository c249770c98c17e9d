//! 外部脚本加载器
//!
//! 线性的四阶段状态机，无重试：
//!
//! 1. **Validate** - 空路径立即失败 (`Empty filePath`)
//! 2. **Normalize** - 反斜杠转换为正斜杠
//! 3. **Resolve** - 文件不存在时失败 (`JSX not found: <path>`)
//! 4. **Execute** - 在宿主的持久上下文中求值，异常转换为失败
//!
//! 求值不是按调用隔离的：脚本定义的函数和对象在之后的命令中仍然可用，
//! 同名定义以最后一次加载为准。

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::core::error::{LoadError, LoadResult};

/// 宿主脚本运行时提供的文件系统原语
pub trait ScriptSource: Send + Sync {
    /// 规范化路径上是否存在文件
    fn exists(&self, path: &str) -> bool;

    /// 读取文件的文本内容
    fn read_to_string(&self, path: &str) -> io::Result<String>;
}

/// 本地文件系统
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl ScriptSource for LocalFileSystem {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn read_to_string(&self, path: &str) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// 在宿主持久上下文中求值源码的能力
///
/// 错误值为异常的文本表示。
pub trait ScriptEvaluator {
    fn evaluate(&self, source: &str) -> Result<(), String>;
}

/// 加载阶段，用于日志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Validate,
    Normalize,
    Resolve,
    Execute,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            LoadStage::Validate => "validate",
            LoadStage::Normalize => "normalize",
            LoadStage::Resolve => "resolve",
            LoadStage::Execute => "execute",
        };
        f.write_str(name)
    }
}

/// 脚本加载器
pub struct ScriptLoader<'a> {
    source: &'a dyn ScriptSource,
}

impl<'a> ScriptLoader<'a> {
    pub fn new(source: &'a dyn ScriptSource) -> Self {
        Self { source }
    }

    /// 依次执行四个阶段，成功时返回规范化后的路径
    pub fn load<E>(&self, path: Option<&str>, evaluator: &E) -> LoadResult<String>
    where
        E: ScriptEvaluator + ?Sized,
    {
        let path = match path {
            Some(p) if !p.is_empty() => p,
            _ => {
                tracing::debug!(target: "host.loader", stage = %LoadStage::Validate, "Rejected empty path");
                return Err(LoadError::EmptyPath);
            }
        };

        let normalized = path.replace('\\', "/");
        tracing::trace!(target: "host.loader", stage = %LoadStage::Normalize, path = %normalized);

        if !self.source.exists(&normalized) {
            tracing::debug!(target: "host.loader", stage = %LoadStage::Resolve, path = %normalized, "Script not found");
            return Err(LoadError::NotFound(normalized));
        }

        let code = self
            .source
            .read_to_string(&normalized)
            .map_err(|e| LoadError::Unreadable {
                path: normalized.clone(),
                reason: e.to_string(),
            })?;

        evaluator.evaluate(&code).map_err(|message| {
            tracing::debug!(target: "host.loader", stage = %LoadStage::Execute, path = %normalized, error = %message, "Script raised");
            LoadError::Evaluation(message)
        })?;

        tracing::info!(target: "host.loader", path = %normalized, "Script loaded");
        Ok(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// 记录查询过的路径的内存文件系统
    #[derive(Default)]
    struct MemorySource {
        files: HashMap<String, String>,
        queried: Mutex<Vec<String>>,
    }

    impl MemorySource {
        fn with_file(path: &str, code: &str) -> Self {
            let mut source = Self::default();
            source.files.insert(path.to_string(), code.to_string());
            source
        }
    }

    impl ScriptSource for MemorySource {
        fn exists(&self, path: &str) -> bool {
            self.queried.lock().unwrap().push(path.to_string());
            self.files.contains_key(path)
        }

        fn read_to_string(&self, path: &str) -> io::Result<String> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "missing"))
        }
    }

    #[derive(Default)]
    struct RecordingEvaluator {
        evaluated: RefCell<Vec<String>>,
        fail_with: Option<String>,
    }

    impl ScriptEvaluator for RecordingEvaluator {
        fn evaluate(&self, source: &str) -> Result<(), String> {
            self.evaluated.borrow_mut().push(source.to_string());
            match &self.fail_with {
                Some(message) => Err(message.clone()),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn test_empty_path_never_touches_filesystem() {
        let source = MemorySource::default();
        let evaluator = RecordingEvaluator::default();
        let loader = ScriptLoader::new(&source);

        assert_eq!(loader.load(None, &evaluator), Err(LoadError::EmptyPath));
        assert_eq!(loader.load(Some(""), &evaluator), Err(LoadError::EmptyPath));
        assert!(source.queried.lock().unwrap().is_empty());
        assert!(evaluator.evaluated.borrow().is_empty());
    }

    #[test]
    fn test_backslashes_normalized_before_resolve() {
        let source = MemorySource::with_file("C:/panel/jsx/run.jsx", "var x = 1;");
        let evaluator = RecordingEvaluator::default();
        let loader = ScriptLoader::new(&source);

        let loaded = loader.load(Some("C:\\panel\\jsx\\run.jsx"), &evaluator).unwrap();
        assert_eq!(loaded, "C:/panel/jsx/run.jsx");
        assert_eq!(
            source.queried.lock().unwrap().as_slice(),
            ["C:/panel/jsx/run.jsx".to_string()]
        );
        assert_eq!(evaluator.evaluated.borrow().as_slice(), ["var x = 1;".to_string()]);
    }

    #[test]
    fn test_missing_file_reports_normalized_path() {
        let source = MemorySource::default();
        let evaluator = RecordingEvaluator::default();
        let loader = ScriptLoader::new(&source);

        let err = loader.load(Some("\\tmp\\does-not-exist.ext"), &evaluator).unwrap_err();
        assert_eq!(err, LoadError::NotFound("/tmp/does-not-exist.ext".to_string()));
        assert!(evaluator.evaluated.borrow().is_empty());
    }

    #[test]
    fn test_evaluation_fault_is_captured() {
        let source = MemorySource::with_file("/s.jsx", "throw new Error('boom')");
        let evaluator = RecordingEvaluator {
            fail_with: Some("Error: boom".to_string()),
            ..Default::default()
        };
        let loader = ScriptLoader::new(&source);

        let err = loader.load(Some("/s.jsx"), &evaluator).unwrap_err();
        assert_eq!(err, LoadError::Evaluation("Error: boom".to_string()));
    }

    #[test]
    fn test_local_filesystem_ignores_directories() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFileSystem;
        assert!(!fs.exists(&dir.path().to_string_lossy()));

        let file = dir.path().join("a.jsx");
        std::fs::write(&file, "1;").unwrap();
        assert!(fs.exists(&file.to_string_lossy()));
    }
}
