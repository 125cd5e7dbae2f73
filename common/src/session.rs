//! セッション状態
//!
//! アップロード → 解析 → 表示の流れを1つの状態として持つ。
//! 解析ごとに世代番号を発行し、完了時に世代が一致しない結果は破棄する
//! （後から選び直した画像の表示が古い解析結果で上書きされないようにする）。
//! 画像の読み込みも同様に選択番号で管理し、最後に選んだ画像だけを反映する。

use crate::error::Error;
use crate::markup::Markup;
use crate::orchestrator::AttemptReport;
use crate::payload::to_data_url;
use crate::types::{ExtractionResult, UploadedImage};

/// 現在の状態
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Failed(String),
}

impl SessionStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionStatus::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SessionStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Loading => "loading",
            SessionStatus::Success => "success",
            SessionStatus::Failed(_) => "failed",
        }
    }
}

/// 解析1回分の世代番号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptTicket {
    generation: u64,
}

impl AttemptTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// 画像選択1回分の番号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionTicket {
    selection: u64,
}

/// 開始された解析（世代番号 + 送信する画像）
#[derive(Debug, Clone)]
pub struct PendingAttempt {
    pub ticket: AttemptTicket,
    pub image: UploadedImage,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    image: Option<UploadedImage>,
    preview_url: Option<String>,
    status: SessionStatus,
    result: Option<ExtractionResult>,
    explanation: Option<Markup>,
    summary_error: Option<String>,
    generation: u64,
    selection: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// 画像を選択する
    ///
    /// 前回の結果・エラーを消し、実行中の解析は無効にする
    pub fn select(&mut self, image: UploadedImage) {
        self.preview_url = Some(to_data_url(&image));
        self.image = Some(image);
        self.reset_outcome();
        self.status = SessionStatus::Idle;
        self.generation += 1;
    }

    /// 画像の読み込みを開始する
    pub fn begin_selection(&mut self) -> SelectionTicket {
        self.selection += 1;
        SelectionTicket {
            selection: self.selection,
        }
    }

    /// 読み込み結果を反映する
    ///
    /// 後から別の選択が始まっていれば何もせず false
    pub fn finish_selection(
        &mut self,
        ticket: SelectionTicket,
        outcome: crate::error::Result<UploadedImage>,
    ) -> bool {
        if ticket.selection != self.selection {
            tracing::debug!(
                ticket = ticket.selection,
                current = self.selection,
                "discarding superseded file read"
            );
            return false;
        }

        match outcome {
            Ok(image) => self.select(image),
            Err(e) => self.reject_selection(&e),
        }
        true
    }

    /// 画像の読み込みに失敗した
    pub fn reject_selection(&mut self, error: &Error) {
        self.image = None;
        self.preview_url = None;
        self.reset_outcome();
        self.status = SessionStatus::Failed(error.user_message());
        self.generation += 1;
    }

    /// 解析を開始する
    ///
    /// 画像が未選択なら Failed(InputMissing) にして None
    pub fn begin_attempt(&mut self) -> Option<PendingAttempt> {
        let Some(image) = self.image.clone() else {
            self.status = SessionStatus::Failed(Error::InputMissing.user_message());
            return None;
        };

        self.generation += 1;
        self.reset_outcome();
        self.status = SessionStatus::Loading;

        Some(PendingAttempt {
            ticket: AttemptTicket {
                generation: self.generation,
            },
            image,
        })
    }

    /// 解析結果を反映する
    ///
    /// 世代が古ければ何もせず false
    pub fn complete(
        &mut self,
        ticket: AttemptTicket,
        outcome: crate::error::Result<AttemptReport>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale attempt"
            );
            return false;
        }

        match outcome {
            Ok(report) => {
                self.result = Some(report.result);
                self.explanation = report.explanation;
                self.summary_error = report.explanation_error.map(|e| e.user_message());
                self.status = SessionStatus::Success;
            }
            Err(e) => {
                self.reset_outcome();
                self.status = SessionStatus::Failed(e.user_message());
            }
        }
        true
    }

    fn reset_outcome(&mut self) {
        self.result = None;
        self.explanation = None;
        self.summary_error = None;
    }

    /// 解析ボタンを押せるか
    pub fn can_trigger(&self) -> bool {
        self.image.is_some() && !self.status.is_loading()
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref()
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    pub fn result(&self) -> Option<&ExtractionResult> {
        self.result.as_ref()
    }

    pub fn explanation(&self) -> Option<&Markup> {
        self.explanation.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.status.error_message()
    }

    pub fn summary_error(&self) -> Option<&str> {
        self.summary_error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
