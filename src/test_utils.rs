//! テスト用ユーティリティ
//!
//! 複数のテストモジュールで使用される共通のヘルパーとテスト用ソースを提供します。
#![cfg(test)]

use std::sync::Arc;
use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{
    Barrier,
    Notify,
    watch,
};

use crate::model::{
    Snapshot,
    TranslationUnit,
};
use crate::source::{
    Source,
    SourceError,
};

/// テスト用の Snapshot を作成する
///
/// # Arguments
/// * `locales` - ロケール名と (キー, 値) のリスト
pub(crate) fn snapshot(locales: &[(&str, &[(&str, &str)])]) -> Snapshot {
    locales
        .iter()
        .map(|(locale, entries)| {
            ((*locale).to_string(), entries.iter().copied().collect::<TranslationUnit>())
        })
        .collect()
}

/// 読み込み回数を数えるソース
#[derive(Debug)]
pub(crate) struct CountingSource {
    /// 返す Snapshot
    pub(crate) snapshot: Snapshot,
    /// `load` の呼び出し回数
    pub(crate) loads: AtomicUsize,
}

impl CountingSource {
    pub(crate) const fn new(snapshot: Snapshot) -> Self {
        Self { snapshot, loads: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl Source for CountingSource {
    async fn load(&self) -> Result<Snapshot, SourceError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot.clone())
    }
}

/// 常に失敗するソース
#[derive(Debug)]
pub(crate) struct FailingSource;

#[async_trait]
impl Source for FailingSource {
    async fn load(&self) -> Result<Snapshot, SourceError> {
        Err(SourceError::NotADirectory("/nonexistent".to_string()))
    }
}

/// 読み込み中に panic するソース
#[derive(Debug)]
pub(crate) struct PanickingSource;

#[async_trait]
impl Source for PanickingSource {
    #[allow(clippy::panic)]
    async fn load(&self) -> Result<Snapshot, SourceError> {
        panic!("source exploded");
    }
}

/// 最初の `failures` 回だけ失敗するソース
#[derive(Debug)]
pub(crate) struct FlakySource {
    /// 失敗させる回数
    failures: usize,
    /// 成功時に返す Snapshot
    pub(crate) snapshot: Snapshot,
    /// `load` の呼び出し回数
    pub(crate) attempts: AtomicUsize,
}

impl FlakySource {
    pub(crate) const fn new(failures: usize, snapshot: Snapshot) -> Self {
        Self { failures, snapshot, attempts: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl Source for FlakySource {
    async fn load(&self) -> Result<Snapshot, SourceError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(SourceError::Io(std::io::Error::other("temporarily unavailable")));
        }
        Ok(self.snapshot.clone())
    }
}

/// 全ソースがそろうまで待機するソース
///
/// 逐次的に読み込まれるとバリアを通過できない。
#[derive(Debug)]
pub(crate) struct BarrierSource {
    /// 共有バリア
    barrier: Arc<Barrier>,
    /// 返す Snapshot
    snapshot: Snapshot,
}

impl BarrierSource {
    pub(crate) const fn new(barrier: Arc<Barrier>, snapshot: Snapshot) -> Self {
        Self { barrier, snapshot }
    }
}

#[async_trait]
impl Source for BarrierSource {
    async fn load(&self) -> Result<Snapshot, SourceError> {
        self.barrier.wait().await;
        Ok(self.snapshot.clone())
    }
}

/// 一定時間後に完了するソース
#[derive(Debug)]
pub(crate) struct DelayedSource {
    /// 待機時間
    delay: Duration,
    /// 返す Snapshot
    snapshot: Snapshot,
}

impl DelayedSource {
    pub(crate) const fn new(delay: Duration, snapshot: Snapshot) -> Self {
        Self { delay, snapshot }
    }
}

#[async_trait]
impl Source for DelayedSource {
    async fn load(&self) -> Result<Snapshot, SourceError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.snapshot.clone())
    }
}

/// `open` されるまで完了しないソース
#[derive(Debug)]
pub(crate) struct GatedSource {
    /// 読み込み開始の通知
    started: Notify,
    /// ゲートの開閉状態
    gate: watch::Sender<bool>,
    /// 返す Snapshot
    snapshot: Snapshot,
}

impl GatedSource {
    pub(crate) fn new(snapshot: Snapshot) -> Self {
        Self { started: Notify::new(), gate: watch::Sender::new(false), snapshot }
    }

    /// 読み込みが開始されるまで待つ
    pub(crate) async fn wait_started(&self) {
        self.started.notified().await;
    }

    /// 待機中および以降の読み込みを完了させる
    pub(crate) fn open(&self) {
        self.gate.send_replace(true);
    }
}

#[async_trait]
impl Source for GatedSource {
    async fn load(&self) -> Result<Snapshot, SourceError> {
        self.started.notify_one();
        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;
        Ok(self.snapshot.clone())
    }
}
