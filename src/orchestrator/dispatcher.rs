//! 链接队列
//!
//! 采集层可以随时提交链接；后台任务独占会话，逐条运行流程并把结果送回提交方。

use std::num::NonZeroU32;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, EnvironmentError};
use crate::models::{CandidateLink, ResultLog, WorkflowResult};
use crate::services::SessionManager;
use crate::workflow::SlipFlow;

/// 队列中的一项
struct LinkRequest {
    link: CandidateLink,
    unit: NonZeroU32,
    reply: oneshot::Sender<WorkflowResult>,
}

/// 提交链接的句柄，可以克隆给多个生产者
#[derive(Clone)]
pub struct DispatcherHandle {
    tx: mpsc::Sender<LinkRequest>,
}

impl DispatcherHandle {
    /// 提交链接并等待结果
    pub async fn submit(&self, link: CandidateLink, unit: NonZeroU32) -> AppResult<WorkflowResult> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(LinkRequest { link, unit, reply })
            .await
            .map_err(|_| AppError::Environment(EnvironmentError::SessionClosed))?;
        rx.await
            .map_err(|_| AppError::Environment(EnvironmentError::SessionClosed))
    }
}

pub struct LinkDispatcher;

impl LinkDispatcher {
    /// 启动后台任务
    ///
    /// 所有句柄被丢弃后任务结束，返回会话管理器和结果日志
    pub fn spawn(
        mut manager: SessionManager,
        flow: SlipFlow,
        inter_bet_delay: Duration,
        capacity: usize,
    ) -> (DispatcherHandle, JoinHandle<(SessionManager, ResultLog)>) {
        let (tx, mut rx) = mpsc::channel::<LinkRequest>(capacity.max(1));

        let worker = tokio::spawn(async move {
            let mut log = ResultLog::new();
            while let Some(request) = rx.recv().await {
                if !log.is_empty() {
                    sleep(inter_bet_delay).await;
                }
                let result = match manager.session_mut() {
                    Ok(session) => flow.run(session, &request.link, request.unit).await,
                    Err(e) => WorkflowResult::failed(
                        &request.link,
                        request.unit.get(),
                        "environment",
                        e.to_string(),
                    ),
                };
                log.push(result.clone());
                if request.reply.send(result).is_err() {
                    debug!("提交方已放弃等待结果: {}", request.link.link);
                }
            }
            info!("📭 链接队列已关闭，共处理 {} 条", log.len());
            (manager, log)
        });

        (DispatcherHandle { tx }, worker)
    }
}
