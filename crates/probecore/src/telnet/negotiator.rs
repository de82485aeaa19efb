//! Telnet 選項協商過濾器
//!
//! 從原始位元組流剝離 IAC 控制序列，依策略同步回覆協商命令，
//! 並回傳可供樣式比對的乾淨位元組

use bytes::BytesMut;
use tracing::{debug, warn};

use super::protocol::{self, TelnetCommand, TelnetOption, IAC};
use super::transport::{TelnetError, Transport};

/// 待處理緩衝區上限，超過即把未完成的序列當作一般資料沖出
const MAX_PENDING: usize = 64 * 1024;

/// Telnet 選項協商器
///
/// 每個連線持有一個實例。跨越讀取邊界的不完整控制序列會留在
/// `pending` 中，等下一個 chunk 到齊後重組；行尾正規化則逐
/// chunk 進行，不跨邊界
#[derive(Debug, Default)]
pub struct TelnetNegotiator {
    /// 尚未消化完的位元組（只會是不完整序列的尾端）
    pending: BytesMut,
}

impl TelnetNegotiator {
    /// 創建新的協商器
    pub fn new() -> Self {
        Self::default()
    }

    /// 過濾一段剛讀進來的原始位元組
    ///
    /// 辨識三種 IAC 序列（單一命令、DO/DONT/WILL/WONT 協商、
    /// 子協商區塊）並全部剝離；每個被辨識的序列最多寫出一筆
    /// 回覆，依遭遇順序送出。不符合任何形狀的位元組原樣保留。
    /// 回傳值是本次產出的乾淨位元組
    pub async fn filter<T: Transport>(
        &mut self,
        transport: &mut T,
        chunk: &[u8],
    ) -> Result<Vec<u8>, TelnetError> {
        let normalized = protocol::normalize_line_endings(chunk);
        self.pending.extend_from_slice(&normalized);

        let mut clean = Vec::with_capacity(self.pending.len());
        let mut replies: Vec<Vec<u8>> = Vec::new();

        let buf = &self.pending;
        let len = buf.len();
        let mut i = 0;

        while i < len {
            if buf[i] != IAC {
                clean.push(buf[i]);
                i += 1;
                continue;
            }

            if i + 1 >= len {
                break; // 序列還沒到齊，留待下個 chunk
            }

            let cmd = buf[i + 1];
            if cmd == IAC {
                // IAC IAC 是跳脫的資料位元組 0xFF
                clean.push(IAC);
                i += 2;
                continue;
            }

            match TelnetCommand::from_byte(cmd) {
                Some(TelnetCommand::AreYouThere) => {
                    let mut reply = b"YES".to_vec();
                    reply.extend_from_slice(protocol::EOL);
                    replies.push(reply);
                    i += 2;
                }
                Some(TelnetCommand::AbortOutput)
                | Some(TelnetCommand::InterruptProcess)
                | Some(TelnetCommand::DataMark)
                | Some(TelnetCommand::Nop) => {
                    i += 2;
                }
                Some(
                    verb @ (TelnetCommand::Do
                    | TelnetCommand::Dont
                    | TelnetCommand::Will
                    | TelnetCommand::Wont),
                ) => {
                    if i + 2 >= len {
                        break; // 選項位元組還沒到
                    }
                    let opt = buf[i + 2];
                    if protocol::is_negotiable_option(opt) {
                        replies.push(protocol::negotiate_reply(verb, TelnetOption::from_byte(opt)));
                        i += 3;
                    } else {
                        // 選項不在可協商範圍，整組原樣保留
                        clean.push(IAC);
                        i += 1;
                    }
                }
                Some(TelnetCommand::Sb) => {
                    // 子協商 body 內的第一個 IAC 必須緊跟 SE
                    let body_start = i + 2;
                    match buf[body_start..].iter().position(|&b| b == IAC) {
                        None => break, // 終止序列還沒到
                        Some(off) => {
                            let j = body_start + off;
                            if j + 1 >= len {
                                break; // IAC 之後的位元組還沒到
                            }
                            if buf[j + 1] == TelnetCommand::Se.as_byte() {
                                i = j + 2; // 整段丟棄，不回覆
                            } else {
                                clean.push(IAC);
                                i += 1;
                            }
                        }
                    }
                }
                _ => {
                    // 其他命令不屬於三種已知形狀，原樣保留
                    clean.push(IAC);
                    i += 1;
                }
            }
        }

        let _ = self.pending.split_to(i);

        if self.pending.len() > MAX_PENDING {
            warn!(
                "未完成的控制序列超過 {} 位元組，當作一般資料沖出",
                MAX_PENDING
            );
            clean.extend_from_slice(&self.pending);
            self.pending.clear();
        }

        if !replies.is_empty() {
            debug!("寫出 {} 筆協商回覆", replies.len());
        }

        for reply in replies {
            match transport.write(&reply).await {
                Ok(()) => {}
                Err(TelnetError::ConnectionClosed) => {
                    // 對端已斷線，回覆寫不出去不影響已過濾的資料
                    warn!("寫出協商回覆時連線已關閉");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(clean)
    }
}
