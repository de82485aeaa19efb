//! 探測 Session 模組
//!
//! 驅動讀取迴圈：過濾 telnet 協商、累積 banner、比對提示樣式，
//! 在期限內判定遠端目前停在登入提示、密碼提示，還是即將斷線

use std::time::Duration;

use bytes::BytesMut;
use tokio::time::Instant;
use tracing::debug;

use super::negotiator::TelnetNegotiator;
use super::transport::{TelnetError, Transport};
use crate::patterns::{PromptKind, PromptPatterns};
use crate::trace::TraceBuffer;

/// 探測設定
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// 等待 banner 的總期限
    pub banner_timeout: Duration,
    /// 單次讀取逾時
    pub telnet_timeout: Duration,
    /// trace / recvd 診斷緩衝區容量
    pub trace_capacity: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            banner_timeout: Duration::from_secs(25),
            telnet_timeout: Duration::from_secs(10),
            trace_capacity: 256 * 1024,
        }
    }
}

/// 讀取迴圈的終止狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 比對到提示樣式
    Matched(PromptKind),
    /// 期限內沒有任何樣式成立
    TimedOut,
}

/// 單次探測結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptReport {
    /// 偵測結束時累積的 banner（已去除前後空白）
    pub banner: Vec<u8>,
    /// 終止原因
    pub outcome: ProbeOutcome,
}

impl PromptReport {
    /// banner 的文字表示（無效的 UTF-8 以替代字元呈現）
    pub fn banner_text(&self) -> String {
        String::from_utf8_lossy(&self.banner).into_owned()
    }
}

/// 連線層分類結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeVerdict {
    /// 成功讀完 banner
    Connected(PromptReport),
    /// 遠端拒絕連線
    Refused,
}

/// 探測 Session
///
/// 每個 Session 擁有獨立的協商器、樣式與診斷緩衝區，多個
/// Session 可以在不同 task 上並行，彼此不需要協調。`trace` 與
/// `recvd` 跨多次 `probe` 保留（重連排查用），`banner` 則在
/// 每次 `probe` 開頭歸零
pub struct ProbeSession {
    config: ProbeConfig,
    patterns: PromptPatterns,
    negotiator: TelnetNegotiator,
    /// 收到的所有原始位元組
    trace: TraceBuffer,
    /// 過濾後的所有位元組
    recvd: TraceBuffer,
    /// 本次探測累積的 banner
    banner: BytesMut,
}

impl ProbeSession {
    /// 創建新的探測 Session
    pub fn new(config: ProbeConfig, patterns: PromptPatterns) -> Self {
        let trace_capacity = config.trace_capacity;
        Self {
            config,
            patterns,
            negotiator: TelnetNegotiator::new(),
            trace: TraceBuffer::new(trace_capacity),
            recvd: TraceBuffer::new(trace_capacity),
            banner: BytesMut::new(),
        }
    }

    /// 原始位元組的診斷緩衝區
    pub fn trace(&self) -> &TraceBuffer {
        &self.trace
    }

    /// 過濾後位元組的診斷緩衝區
    pub fn recvd(&self) -> &TraceBuffer {
        &self.recvd
    }

    /// 讀取 banner 直到比對到提示樣式或期限到期
    ///
    /// 期限是迴圈內的合作式檢查，不會中斷正在進行的讀寫；
    /// 單次讀取最多等 `telnet_timeout`，且不會超過剩餘期限。
    /// 讀不到新資料（逾時、對端正常關閉）視為「暫無資料」，
    /// 迴圈繼續；期限到期不是錯誤，回傳當下累積的 banner
    pub async fn probe<T: Transport>(
        &mut self,
        transport: &mut T,
    ) -> Result<PromptReport, TelnetError> {
        self.banner.clear();
        let deadline = Instant::now() + self.config.banner_timeout;
        let mut outcome = ProbeOutcome::TimedOut;

        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let wait = self.config.telnet_timeout.min(deadline - now);

            let data = match transport.read(wait).await? {
                Some(data) => data,
                None => continue,
            };

            self.trace.extend(&data);
            let clean = self.negotiator.filter(transport, &data).await?;
            if clean.is_empty() {
                continue;
            }
            self.recvd.extend(&clean);
            self.banner.extend_from_slice(&clean);

            if let Some(kind) = self.patterns.classify(&self.banner) {
                debug!("比對到 {:?} 提示", kind);
                outcome = ProbeOutcome::Matched(kind);
                break;
            }
        }

        let banner = self.banner.trim_ascii().to_vec();
        Ok(PromptReport { banner, outcome })
    }

    /// 探測並把「連線被拒絕」歸類為獨立結果
    ///
    /// 其他傳輸層錯誤原樣傳回，由呼叫端決定這次嘗試怎麼收場
    pub async fn probe_or_refused<T: Transport>(
        &mut self,
        transport: &mut T,
    ) -> Result<ProbeVerdict, TelnetError> {
        match self.probe(transport).await {
            Ok(report) => Ok(ProbeVerdict::Connected(report)),
            Err(TelnetError::ConnectionRefused) => Ok(ProbeVerdict::Refused),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::transport::testing::{MockTransport, ReadStep};
    use super::*;
    use crate::telnet::protocol::IAC;

    fn quick_config() -> ProbeConfig {
        ProbeConfig {
            banner_timeout: Duration::from_millis(200),
            telnet_timeout: Duration::from_millis(20),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_login_prompt_detection() {
        let mut session = ProbeSession::new(quick_config(), PromptPatterns::default());
        let mut transport = MockTransport::with_chunks(vec![
            b"Welcome\r\n".to_vec(),
            vec![IAC, 253, 0], // IAC DO BINARY
            b"login: ".to_vec(),
        ]);

        let report = session.probe(&mut transport).await.unwrap();

        assert_eq!(report.outcome, ProbeOutcome::Matched(PromptKind::Login));
        assert_eq!(report.banner, b"Welcome\nlogin:");
        // 恰好一筆回覆：IAC WILL BINARY
        assert_eq!(transport.written, vec![vec![IAC, 251, 0]]);
    }

    #[tokio::test]
    async fn test_password_prompt_detection() {
        let mut session = ProbeSession::new(quick_config(), PromptPatterns::default());
        let mut transport = MockTransport::with_chunks(vec![b"Password: ".to_vec()]);

        let report = session.probe(&mut transport).await.unwrap();
        assert_eq!(report.outcome, ProbeOutcome::Matched(PromptKind::Password));
    }

    #[tokio::test]
    async fn test_busy_pattern_stops_loop() {
        let mut session = ProbeSession::new(quick_config(), PromptPatterns::default());
        let mut transport =
            MockTransport::with_chunks(vec![b"Console busy, try again later\r\n".to_vec()]);

        let report = session.probe(&mut transport).await.unwrap();
        assert_eq!(report.outcome, ProbeOutcome::Matched(PromptKind::Busy));
    }

    #[tokio::test]
    async fn test_timeout_returns_accumulated_banner() {
        let mut session = ProbeSession::new(quick_config(), PromptPatterns::default());
        let mut transport = MockTransport::with_chunks(vec![b"still booting".to_vec()]);

        let start = Instant::now();
        let report = session.probe(&mut transport).await.unwrap();

        assert_eq!(report.outcome, ProbeOutcome::TimedOut);
        assert_eq!(report.banner, b"still booting");
        // 期限 200ms，加上些許排程誤差
        assert!(start.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_timeout_with_no_data_at_all() {
        let mut session = ProbeSession::new(quick_config(), PromptPatterns::default());
        let mut transport = MockTransport::default();

        let report = session.probe(&mut transport).await.unwrap();
        assert_eq!(report.outcome, ProbeOutcome::TimedOut);
        assert!(report.banner.is_empty());
    }

    #[tokio::test]
    async fn test_quiet_reads_are_not_fatal() {
        let mut session = ProbeSession::new(quick_config(), PromptPatterns::default());
        let mut transport = MockTransport {
            reads: vec![
                ReadStep::Quiet,
                ReadStep::Data(b"node login:".to_vec()),
            ]
            .into(),
            ..Default::default()
        };

        let report = session.probe(&mut transport).await.unwrap();
        assert_eq!(report.outcome, ProbeOutcome::Matched(PromptKind::Login));
    }

    #[tokio::test]
    async fn test_banner_resets_between_probes_but_buffers_persist() {
        let mut session = ProbeSession::new(quick_config(), PromptPatterns::default());

        let mut first = MockTransport::with_chunks(vec![
            vec![IAC, 253, 0],
            b"login: ".to_vec(),
        ]);
        let report = session.probe(&mut first).await.unwrap();
        assert_eq!(report.banner, b"login:");

        let trace_after_first = session.trace().len();
        let recvd_after_first = session.recvd().len();
        assert!(trace_after_first > recvd_after_first); // trace 含 IAC 序列

        let mut second = MockTransport::with_chunks(vec![b"Password: ".to_vec()]);
        let report = session.probe(&mut second).await.unwrap();
        // banner 只剩第二次的內容
        assert_eq!(report.banner, b"Password:");
        // 診斷緩衝區跨探測累積
        assert!(session.trace().len() > trace_after_first);
        assert!(session.trace().len() >= session.recvd().len());
    }

    #[tokio::test]
    async fn test_probe_or_refused_classifies_refusal() {
        let mut session = ProbeSession::new(quick_config(), PromptPatterns::default());
        let mut transport = MockTransport {
            reads: vec![ReadStep::Refused].into(),
            ..Default::default()
        };

        let verdict = session.probe_or_refused(&mut transport).await.unwrap();
        assert_eq!(verdict, ProbeVerdict::Refused);
    }

    #[tokio::test]
    async fn test_probe_or_refused_connected() {
        let mut session = ProbeSession::new(quick_config(), PromptPatterns::default());
        let mut transport = MockTransport::with_chunks(vec![b"login: ".to_vec()]);

        let verdict = session.probe_or_refused(&mut transport).await.unwrap();
        match verdict {
            ProbeVerdict::Connected(report) => {
                assert_eq!(report.outcome, ProbeOutcome::Matched(PromptKind::Login));
            }
            other => panic!("預期 Connected，得到 {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_other_faults_propagate() {
        let mut session = ProbeSession::new(quick_config(), PromptPatterns::default());
        let mut transport = MockTransport {
            reads: vec![ReadStep::Fatal].into(),
            ..Default::default()
        };

        let result = session.probe_or_refused(&mut transport).await;
        assert!(matches!(result, Err(TelnetError::ConnectionFailed(_))));
    }
}
