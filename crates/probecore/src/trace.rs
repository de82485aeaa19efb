//! 診斷用位元組緩衝區
//!
//! 以固定容量的環形緩衝區保存最近收發的位元組，供事後排查。
//! 超過容量時最舊的位元組會被丟棄，不會無上限成長

use std::collections::VecDeque;

/// 診斷緩衝區 - 保存最近的原始/過濾後位元組
#[derive(Debug, Clone)]
pub struct TraceBuffer {
    bytes: VecDeque<u8>,
    capacity: usize,
    /// 歷來追加過的總位元組數（含已被丟棄的部分）
    total: u64,
}

impl TraceBuffer {
    /// 創建新的診斷緩衝區
    ///
    /// # Arguments
    /// * `capacity` - 緩衝區最大容量（位元組）
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
            total: 0,
        }
    }

    /// 追加位元組
    ///
    /// 超過容量時，最舊的位元組會被移除
    pub fn extend(&mut self, data: &[u8]) {
        for &b in data {
            if self.bytes.len() >= self.capacity {
                self.bytes.pop_front();
            }
            self.bytes.push_back(b);
        }
        self.total += data.len() as u64;
    }

    /// 目前保留的位元組數
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// 檢查緩衝區是否為空
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 緩衝區容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 歷來追加過的總位元組數
    pub fn total(&self) -> u64 {
        self.total
    }

    /// 複製出目前保留的位元組
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.iter().copied().collect()
    }

    /// 清空緩衝區（總位元組數不歸零）
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// 以十六進位傾印最後 `limit` 個位元組
    pub fn hex_dump(&self, limit: usize) -> String {
        let start = self.bytes.len().saturating_sub(limit);
        self.bytes
            .iter()
            .skip(start)
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::new(256 * 1024) // 預設容量 256 KiB
    }
}
