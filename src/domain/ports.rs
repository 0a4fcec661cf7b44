use crate::domain::model::{CommandOutput, CommandSpec};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 外部命令的執行介面，測試時用假實作錄下所有呼叫
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// 執行命令並收集完整輸出，命令本身跑失敗（非零退出碼）不算 Err，
    /// 只有無法啟動子行程才回傳錯誤
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}
