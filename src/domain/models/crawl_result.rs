// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::domain::models::batch::Job;

/// 爬取结果
///
/// 由工作器创建后不再修改，附带原始批次的别名和关联ID，
/// 交给输出端后由其负责
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    /// 目标URL
    pub url: String,
    /// 调用方提供的别名
    pub alias: String,
    /// 批次关联ID
    pub correlation_id: String,
    /// 结果生成时间
    pub completed_at: DateTime<Utc>,
    /// 成功响应或失败原因
    pub outcome: Outcome,
}

impl CrawlResult {
    pub fn success(job: &Job, response: ParsedResponse) -> Self {
        Self::with_outcome(job, Outcome::Success(Box::new(response)))
    }

    pub fn failure(job: &Job, reason: FailureReason, error: impl Into<String>) -> Self {
        Self::with_outcome(
            job,
            Outcome::Failure(Failure {
                reason,
                error: error.into(),
            }),
        )
    }

    fn with_outcome(job: &Job, outcome: Outcome) -> Self {
        Self {
            url: job.url().to_string(),
            alias: job.alias().to_string(),
            correlation_id: job.correlation_id().to_string(),
            completed_at: Utc::now(),
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match &self.outcome {
            Outcome::Failure(f) => Some(f.reason),
            Outcome::Success(_) => None,
        }
    }

    pub fn response(&self) -> Option<&ParsedResponse> {
        match &self.outcome {
            Outcome::Success(resp) => Some(resp),
            Outcome::Failure(_) => None,
        }
    }
}

/// 结果内容
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success(Box<ParsedResponse>),
    Failure(Failure),
}

/// 单个任务的失败记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Failure {
    pub reason: FailureReason,
    pub error: String,
}

/// 失败原因分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// 抓取超时
    Timeout,
    /// 爬取能力返回错误
    CrawlError,
    /// 没有拿到响应
    NoResponse,
    /// URL 无法解析
    InvalidUrl,
    /// 调度被取消，任务未执行
    Cancelled,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::Timeout => "timeout",
            FailureReason::CrawlError => "crawl_error",
            FailureReason::NoResponse => "no_response",
            FailureReason::InvalidUrl => "invalid_url",
            FailureReason::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 解析后的响应
///
/// 按基本信息、响应头、响应体分组，可选字段为空时不序列化
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedResponse {
    pub basic_info: BasicInfo,
    pub headers: HeadersInfo,
    pub body: BodyInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forms: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub xhr_requests: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_response_path: Option<String>,
}

impl ParsedResponse {
    pub fn status_code(&self) -> u16 {
        self.basic_info.status_code
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicInfo {
    pub url: String,
    pub alias: String,
    pub status_code: u16,
    pub content_length: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeadersInfo {
    pub entries: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BodyInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
}
