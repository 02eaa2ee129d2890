use std::path::{Path, PathBuf};

/// 单个转换任务：输入路径与输出路径。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPair {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// 一次批处理的任务计划。
///
/// 输出路径 = 输出目录 + 输入文件名。创建后不可修改，由转换器按值消费。
#[derive(Debug, Clone)]
pub struct BatchJob {
    pairs: Vec<JobPair>,
}

impl BatchJob {
    /// 根据已发现的输入文件生成计划；没有文件名的路径被忽略。
    pub fn plan(inputs: Vec<PathBuf>, output_dir: &Path) -> Self {
        let pairs = inputs
            .into_iter()
            .filter_map(|input| {
                let name = input.file_name()?.to_owned();
                Some(JobPair {
                    output: output_dir.join(name),
                    input,
                })
            })
            .collect();
        Self { pairs }
    }

    pub fn pairs(&self) -> &[JobPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub(crate) fn into_pairs(self) -> Vec<JobPair> {
        self.pairs
    }
}
