//! medreport-ai: 医療レポート画像のAI構造化抽出（CLI + APIキー中継サーバ）

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod proxy;
pub mod report;
pub mod upload;
