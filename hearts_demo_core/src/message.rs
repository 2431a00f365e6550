use crate::card::Card;
use crate::state::{Phase, PerSeat, RoundId, Seat};
use serde::{Deserialize, Serialize};

// --- 渲染层 -> 引擎 的指令 ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 人类请求打出手牌中第 `index` 张 (底层手牌顺序)
    PlayCard { seat: Seat, index: usize },
    /// 重新开始一局，`None` 沿用配置中的种子
    Restart { seed: Option<u32> },
}

// --- 引擎 -> 渲染层 的事件 ---
// 每次状态变化后返回，供渲染和日志使用。

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// 新的一局已发牌
    HandDealt { round_id: RoundId, seed: u32 },
    PhaseChanged { phase: Phase },
    CardPlayed { seat: Seat, card: Card },
    /// 红心第一次被打出
    HeartsBroken { by: Seat },
    /// 一墩结算完成，`trick_no` 从 1 开始
    TrickWon { winner: Seat, points: u32, trick_no: usize },
    HandFinished { scores: PerSeat<u32> },
}
